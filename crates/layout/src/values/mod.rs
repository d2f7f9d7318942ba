//! Computed CSS value types consumed by the layout engines
//!
//! Everything in here is a *computed* value: css-wide keywords have already
//! been resolved by the style computer, but percentages and `auto` survive
//! until used-value time because they depend on the containing block.

mod auto;
mod background;
mod border;
mod color;
mod display;
mod length;
mod position;

pub use auto::AutoOr;
pub use background::BackgroundImage;
pub use border::{LineStyle, LineWidth};
pub use color::{Color, Rgba};
pub use display::{Display, Float};
pub use length::{LengthPercentage, MaxSize, Percentage};
pub use position::Position;

/// <https://drafts.csswg.org/css2/#z-index>
pub type ZIndex = AutoOr<i32>;
