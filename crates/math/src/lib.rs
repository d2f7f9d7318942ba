//! Common geometry primitives used by the layout crates

mod rect;
mod sides;
mod size;
mod vec2d;

pub use rect::Rectangle;
pub use sides::Sides;
pub use size::Size;
pub use vec2d::Vec2D;
