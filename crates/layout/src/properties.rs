//! Property groups and the cascaded value store
//!
//! The cascade itself (selector matching, specificity, origin sorting) is an
//! external collaborator. What arrives here is the *cascaded value* per
//! element and property group, possibly still a css-wide keyword. The
//! [style computer](crate::style_computer::StyleComputer) turns these into
//! computed values.
//!
//! Properties are grouped the way layout consumes them; one aggregate per
//! group keeps the store columnar and the computation loops short.

use std::collections::HashMap;

use crate::{
    element_tree::ElementId,
    fonts::FontId,
    values::{
        AutoOr, BackgroundImage, Color, Display, Float, LengthPercentage, LineStyle, LineWidth,
        MaxSize, Position, Rgba, ZIndex,
    },
};

/// <https://drafts.csswg.org/css-cascade/#defaulting-keywords>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CssWideKeyword {
    Initial,
    Inherit,
    Unset,
}

/// A cascaded value: either a concrete declaration or a css-wide keyword
///
/// Undeclared properties behave exactly like `unset`
/// (<https://drafts.csswg.org/css-cascade/#defaulting>), so they share the
/// variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cascaded<T> {
    Value(T),
    Initial,
    Inherit,
    #[default]
    Unset,
}

impl<T> Cascaded<T> {
    #[inline]
    #[must_use]
    pub const fn is_declared(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

/// Resolve a single cascaded sub-value into its computed value
///
/// `parent` is the computed value on the inheritance stack, if any;
/// the property's initial value applies at the tree root.
fn compute_value<T: Copy>(
    cascaded: Cascaded<T>,
    all: Option<CssWideKeyword>,
    is_inherited: bool,
    parent: Option<T>,
    initial: T,
) -> T {
    let keyword = match cascaded {
        Cascaded::Value(value) => return value,
        Cascaded::Initial => CssWideKeyword::Initial,
        Cascaded::Inherit => CssWideKeyword::Inherit,
        // `all` stands in for every longhand the element did not declare
        // itself (the collaborator has already cascaded declared values
        // past it)
        Cascaded::Unset => all.unwrap_or(CssWideKeyword::Unset),
    };

    let keyword = match keyword {
        CssWideKeyword::Unset if is_inherited => CssWideKeyword::Inherit,
        CssWideKeyword::Unset => CssWideKeyword::Initial,
        other => other,
    };

    match keyword {
        CssWideKeyword::Inherit => parent.unwrap_or(initial),
        _ => initial,
    }
}

/// Defines one property group: the computed aggregate, its cascaded
/// counterpart and the keyword resolution between them
macro_rules! style_group {
    (
        $(#[$meta:meta])*
        $computed:ident ($cascaded:ident, $inherited:literal) {
            $( $(#[$field_meta:meta])* $field:ident: $ty:ty = $initial:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub struct $computed {
            $( $(#[$field_meta])* pub $field: $ty, )*
        }

        impl $computed {
            /// Whether this group's properties inherit by default
            pub const IS_INHERITED: bool = $inherited;

            pub const INITIAL: Self = Self {
                $( $field: $initial, )*
            };
        }

        impl Default for $computed {
            fn default() -> Self {
                Self::INITIAL
            }
        }

        #[doc = concat!("Cascaded counterpart of [", stringify!($computed), "]")]
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        pub struct $cascaded {
            $( pub $field: Cascaded<$ty>, )*
        }

        impl $cascaded {
            pub fn compute(
                &self,
                all: Option<CssWideKeyword>,
                parent: Option<&$computed>,
            ) -> $computed {
                $computed {
                    $(
                        $field: compute_value(
                            self.$field,
                            all,
                            $computed::IS_INHERITED,
                            parent.map(|parent| parent.$field),
                            $computed::INITIAL.$field,
                        ),
                    )*
                }
            }
        }
    };
}

style_group! {
    /// The outer and inner display type together with the positioning scheme
    BoxStyle (CascadedBoxStyle, false) {
        /// <https://drafts.csswg.org/css-display/#the-display-properties>
        display: Display = Display::Inline,
        /// <https://drafts.csswg.org/css-position/#position-property>
        position: Position = Position::Static,
        /// <https://drafts.csswg.org/css2/#propdef-float>
        float: Float = Float::None,
    }
}

style_group! {
    /// Size constraints on the inline axis
    ContentWidth (CascadedContentWidth, false) {
        width: AutoOr<LengthPercentage> = AutoOr::Auto,
        min_width: LengthPercentage = LengthPercentage::ZERO,
        max_width: MaxSize = MaxSize::None,
    }
}

style_group! {
    /// Size constraints on the block axis
    ContentHeight (CascadedContentHeight, false) {
        height: AutoOr<LengthPercentage> = AutoOr::Auto,
        min_height: LengthPercentage = LengthPercentage::ZERO,
        max_height: MaxSize = MaxSize::None,
    }
}

style_group! {
    /// Margin, border width and padding on the inline axis
    HorizontalEdges (CascadedHorizontalEdges, false) {
        margin_left: AutoOr<LengthPercentage> = AutoOr::NotAuto(LengthPercentage::ZERO),
        margin_right: AutoOr<LengthPercentage> = AutoOr::NotAuto(LengthPercentage::ZERO),
        border_left: LineWidth = LineWidth::Medium,
        border_right: LineWidth = LineWidth::Medium,
        padding_left: LengthPercentage = LengthPercentage::ZERO,
        padding_right: LengthPercentage = LengthPercentage::ZERO,
    }
}

style_group! {
    /// Margin, border width and padding on the block axis
    VerticalEdges (CascadedVerticalEdges, false) {
        margin_top: AutoOr<LengthPercentage> = AutoOr::NotAuto(LengthPercentage::ZERO),
        margin_bottom: AutoOr<LengthPercentage> = AutoOr::NotAuto(LengthPercentage::ZERO),
        border_top: LineWidth = LineWidth::Medium,
        border_bottom: LineWidth = LineWidth::Medium,
        padding_top: LengthPercentage = LengthPercentage::ZERO,
        padding_bottom: LengthPercentage = LengthPercentage::ZERO,
    }
}

style_group! {
    /// <https://drafts.csswg.org/css-backgrounds/#border-style>
    BorderStyles (CascadedBorderStyles, false) {
        left: LineStyle = LineStyle::None,
        right: LineStyle = LineStyle::None,
        top: LineStyle = LineStyle::None,
        bottom: LineStyle = LineStyle::None,
    }
}

style_group! {
    /// <https://drafts.csswg.org/css-backgrounds/#border-color>
    BorderColors (CascadedBorderColors, false) {
        left: Color = Color::CurrentColor,
        right: Color = Color::CurrentColor,
        top: Color = Color::CurrentColor,
        bottom: Color = Color::CurrentColor,
    }
}

style_group! {
    /// <https://drafts.csswg.org/css-backgrounds/#backgrounds>
    Background (CascadedBackground, false) {
        color: Color = Color::Rgba(Rgba::TRANSPARENT),
        image: BackgroundImage = BackgroundImage::None,
    }
}

style_group! {
    /// <https://drafts.csswg.org/css-position/#insets>
    Insets (CascadedInsets, false) {
        left: AutoOr<LengthPercentage> = AutoOr::Auto,
        right: AutoOr<LengthPercentage> = AutoOr::Auto,
        top: AutoOr<LengthPercentage> = AutoOr::Auto,
        bottom: AutoOr<LengthPercentage> = AutoOr::Auto,
    }
}

style_group! {
    /// <https://drafts.csswg.org/css2/#z-index>
    ZIndexStyle (CascadedZIndexStyle, false) {
        z_index: ZIndex = AutoOr::Auto,
    }
}

/// The `color` property
/// <https://drafts.csswg.org/css-color/#the-color-property>
///
/// Not macro-generated because `currentColor` on `color` itself computes to
/// the inherited value
/// (<https://drafts.csswg.org/css-color/#resolving-other-colors>).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStyle {
    pub color: Color,
}

impl ColorStyle {
    pub const IS_INHERITED: bool = true;

    pub const INITIAL: Self = Self {
        color: Color::Rgba(Rgba::BLACK),
    };
}

impl Default for ColorStyle {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Cascaded counterpart of [ColorStyle]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CascadedColorStyle {
    pub color: Cascaded<Color>,
}

impl CascadedColorStyle {
    pub fn compute(&self, all: Option<CssWideKeyword>, parent: Option<&ColorStyle>) -> ColorStyle {
        let cascaded = match self.color {
            Cascaded::Value(Color::CurrentColor) => Cascaded::Inherit,
            other => other,
        };
        ColorStyle {
            color: compute_value(
                cascaded,
                all,
                ColorStyle::IS_INHERITED,
                parent.map(|parent| parent.color),
                ColorStyle::INITIAL.color,
            ),
        }
    }
}

style_group! {
    /// The font used to shape the element's text
    FontStyle (CascadedFontStyle, true) {
        font: FontId = FontId(0),
    }
}

/// Per-element cascaded values, one column per property group
///
/// Elements without an entry in a column have declared nothing in that
/// group; every sub-value defaults like `unset`.
#[derive(Clone, Debug, Default)]
pub struct CascadedValueStore {
    pub box_style: HashMap<ElementId, CascadedBoxStyle>,
    pub content_width: HashMap<ElementId, CascadedContentWidth>,
    pub content_height: HashMap<ElementId, CascadedContentHeight>,
    pub horizontal_edges: HashMap<ElementId, CascadedHorizontalEdges>,
    pub vertical_edges: HashMap<ElementId, CascadedVerticalEdges>,
    pub border_styles: HashMap<ElementId, CascadedBorderStyles>,
    pub border_colors: HashMap<ElementId, CascadedBorderColors>,
    pub background: HashMap<ElementId, CascadedBackground>,
    pub insets: HashMap<ElementId, CascadedInsets>,
    pub z_index: HashMap<ElementId, CascadedZIndexStyle>,
    pub color: HashMap<ElementId, CascadedColorStyle>,
    pub font: HashMap<ElementId, CascadedFontStyle>,

    /// The `all` shorthand, which stands in for every undeclared longhand
    /// except `direction` and `unicode-bidi` (neither of which this engine
    /// models)
    pub all: HashMap<ElementId, CssWideKeyword>,
}

impl CascadedValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
