//! Resolution of specified sizes into used sizes
//!
//! Implements the width computation of CSS 2.2 §10.3.3 and the height
//! scaffolding of §10.6.3. The four fields that can be `auto`
//! (`inline_size`, both inline margins and `block_size`) are tagged through
//! a small bitfield instead of widening every field to an `Option`.

use bitflags::bitflags;

use crate::{
    error::LayoutError,
    properties::{BorderStyles, ContentHeight, ContentWidth, HorizontalEdges, VerticalEdges},
    units::Subpixels,
    values::{AutoOr, LengthPercentage, LineStyle, LineWidth, MaxSize},
};

use super::ContainingBlock;

bitflags! {
    /// Which of the taggable fields currently hold `auto`
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AutoFields: u8 {
        const INLINE_SIZE = 1 << 0;
        const MARGIN_INLINE_START = 1 << 1;
        const MARGIN_INLINE_END = 1 << 2;
        const BLOCK_SIZE = 1 << 3;
    }
}

/// Used border, padding, margin and size values of one block
///
/// Taggable fields are zero while their auto bit is set; `set_*` clears the
/// bit, `set_*_auto` sets it, `*()` reads back an `Option`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockUsedSizes {
    pub border_inline_start: Subpixels,
    pub border_inline_end: Subpixels,
    pub padding_inline_start: Subpixels,
    pub padding_inline_end: Subpixels,
    margin_inline_start: Subpixels,
    margin_inline_end: Subpixels,
    inline_size: Subpixels,
    pub min_inline_size: Subpixels,
    pub max_inline_size: Subpixels,

    pub border_block_start: Subpixels,
    pub border_block_end: Subpixels,
    pub padding_block_start: Subpixels,
    pub padding_block_end: Subpixels,
    pub margin_block_start: Subpixels,
    pub margin_block_end: Subpixels,
    block_size: Subpixels,
    pub min_block_size: Subpixels,
    pub max_block_size: Subpixels,

    auto: AutoFields,
}

macro_rules! tagged_auto_field {
    ($get:ident, $set:ident, $set_auto:ident, $field:ident, $flag:ident) => {
        #[inline]
        #[must_use]
        pub fn $get(&self) -> Option<Subpixels> {
            if self.auto.contains(AutoFields::$flag) {
                None
            } else {
                Some(self.$field)
            }
        }

        #[inline]
        pub fn $set(&mut self, value: Subpixels) {
            self.auto.remove(AutoFields::$flag);
            self.$field = value;
        }

        #[inline]
        pub fn $set_auto(&mut self) {
            self.auto.insert(AutoFields::$flag);
            self.$field = Subpixels::ZERO;
        }
    };
}

impl BlockUsedSizes {
    #[must_use]
    pub fn new() -> Self {
        Self {
            auto: AutoFields::all(),
            max_inline_size: Subpixels::MAX,
            max_block_size: Subpixels::MAX,
            ..Self::default()
        }
    }

    tagged_auto_field!(inline_size, set_inline_size, set_inline_size_auto, inline_size, INLINE_SIZE);
    tagged_auto_field!(
        margin_inline_start,
        set_margin_inline_start,
        set_margin_inline_start_auto,
        margin_inline_start,
        MARGIN_INLINE_START
    );
    tagged_auto_field!(
        margin_inline_end,
        set_margin_inline_end,
        set_margin_inline_end_auto,
        margin_inline_end,
        MARGIN_INLINE_END
    );
    tagged_auto_field!(block_size, set_block_size, set_block_size_auto, block_size, BLOCK_SIZE);

    /// Border and padding on the inline axis
    #[must_use]
    pub fn inline_edge_sum(&self) -> Subpixels {
        self.border_inline_start
            + self.padding_inline_start
            + self.padding_inline_end
            + self.border_inline_end
    }

    /// Border and padding on the block axis
    #[must_use]
    pub fn block_edge_sum(&self) -> Subpixels {
        self.border_block_start
            + self.padding_block_start
            + self.padding_block_end
            + self.border_block_end
    }

    #[must_use]
    pub fn clamp_inline(&self, size: Subpixels) -> Subpixels {
        size.clamp(self.min_inline_size, self.max_inline_size)
    }

    #[must_use]
    pub fn clamp_block(&self, size: Subpixels) -> Subpixels {
        size.clamp(self.min_block_size, self.max_block_size)
    }

    /// Margin box width with auto margins counted as zero, as
    /// shrink-to-fit measures children
    #[must_use]
    pub fn outer_inline_size(&self) -> Subpixels {
        self.inline_size().unwrap_or(Subpixels::ZERO)
            + self.inline_edge_sum()
            + self.margin_inline_start().unwrap_or(Subpixels::ZERO)
            + self.margin_inline_end().unwrap_or(Subpixels::ZERO)
    }
}

fn non_negative(value: Subpixels) -> Result<Subpixels, LayoutError> {
    if value.is_negative() {
        Err(LayoutError::InvalidValue)
    } else {
        Ok(value)
    }
}

fn used_border_width(width: LineWidth, style: LineStyle) -> Result<Subpixels, LayoutError> {
    if style.nullifies_width() {
        return Ok(Subpixels::ZERO);
    }
    non_negative(width.to_subpixels())
}

fn resolve_margin(
    margin: AutoOr<LengthPercentage>,
    base: Subpixels,
) -> AutoOr<Subpixels> {
    margin.map(|margin| margin.resolve_against(base))
}

/// Resolve everything about a block's sizes that does not require knowing
/// the final inline layout: edges, clamped specified sizes and margins
///
/// Auto margins survive as tags; [resolve_inline_axis] or the caller's
/// margin policy turns them into values.
pub(crate) fn solve_used_sizes(
    widths: &ContentWidth,
    heights: &ContentHeight,
    horizontal: &HorizontalEdges,
    vertical: &VerticalEdges,
    styles: &BorderStyles,
    containing_block: ContainingBlock,
) -> Result<BlockUsedSizes, LayoutError> {
    let base = containing_block.width();
    let mut used = BlockUsedSizes::new();

    // Inline axis edges
    used.border_inline_start = used_border_width(horizontal.border_left, styles.left)?;
    used.border_inline_end = used_border_width(horizontal.border_right, styles.right)?;
    used.padding_inline_start = non_negative(horizontal.padding_left.resolve_against(base))?;
    used.padding_inline_end = non_negative(horizontal.padding_right.resolve_against(base))?;

    match resolve_margin(horizontal.margin_left, base) {
        AutoOr::NotAuto(margin) => used.set_margin_inline_start(margin),
        AutoOr::Auto => used.set_margin_inline_start_auto(),
    }
    match resolve_margin(horizontal.margin_right, base) {
        AutoOr::NotAuto(margin) => used.set_margin_inline_end(margin),
        AutoOr::Auto => used.set_margin_inline_end_auto(),
    }

    used.min_inline_size = non_negative(widths.min_width.resolve_against(base))?;
    used.max_inline_size = match widths.max_width {
        MaxSize::None => Subpixels::MAX,
        MaxSize::LengthPercentage(max) => non_negative(max.resolve_against(base))?,
    };
    // An inverted range resolves in favor of the minimum
    used.max_inline_size = used.max_inline_size.max(used.min_inline_size);

    match widths.width {
        AutoOr::NotAuto(width) => {
            let width = non_negative(width.resolve_against(base))?;
            used.set_inline_size(used.clamp_inline(width));
        },
        AutoOr::Auto => used.set_inline_size_auto(),
    }

    // Block axis edges; note that percentages on the block axis still
    // resolve against the *inline* size of the containing block
    used.border_block_start = used_border_width(vertical.border_top, styles.top)?;
    used.border_block_end = used_border_width(vertical.border_bottom, styles.bottom)?;
    used.padding_block_start = non_negative(vertical.padding_top.resolve_against(base))?;
    used.padding_block_end = non_negative(vertical.padding_bottom.resolve_against(base))?;

    // Block-axis auto margins are used as zero; there is no margin
    // collapsing in this engine
    used.margin_block_start = resolve_margin(vertical.margin_top, base).unwrap_or(Subpixels::ZERO);
    used.margin_block_end = resolve_margin(vertical.margin_bottom, base).unwrap_or(Subpixels::ZERO);

    let height_base = containing_block.height();
    used.min_block_size = match heights.min_height.try_resolve_against(height_base) {
        Some(min) => non_negative(min)?,
        None => Subpixels::ZERO,
    };
    used.max_block_size = match heights.max_height {
        MaxSize::None => Subpixels::MAX,
        MaxSize::LengthPercentage(max) => match max.try_resolve_against(height_base) {
            Some(max) => non_negative(max)?,
            None => Subpixels::MAX,
        },
    };
    used.max_block_size = used.max_block_size.max(used.min_block_size);

    // A percentage height against an unknown base behaves like auto
    match resolve_specified_height(heights.height, height_base)? {
        Some(height) => used.set_block_size(height),
        None => used.set_block_size_auto(),
    }

    Ok(used)
}

fn resolve_specified_height(
    height: AutoOr<LengthPercentage>,
    base: Option<Subpixels>,
) -> Result<Option<Subpixels>, LayoutError> {
    match height {
        AutoOr::Auto => Ok(None),
        AutoOr::NotAuto(height) => match height.try_resolve_against(base) {
            Some(height) => Ok(Some(non_negative(height)?)),
            None => Ok(None),
        },
    }
}

/// The constraint `margin_start + border + padding + inline_size +
/// margin_end = containing block width` of CSS 2.2 §10.3.3
///
/// Exactly one of three shapes applies:
/// - nothing is auto: the end margin absorbs the error, sign permitted
/// - only margins are auto: they share the non-negative leftover, the end
///   margin taking the odd unit
/// - the size is auto: it takes the leftover (clamped), auto margins
///   become zero
pub(crate) fn resolve_inline_axis(used: &mut BlockUsedSizes, available: Subpixels) {
    let edges = used.inline_edge_sum();

    match (
        used.inline_size(),
        used.margin_inline_start(),
        used.margin_inline_end(),
    ) {
        (Some(size), Some(start), Some(_)) => {
            used.set_margin_inline_end(available - edges - size - start);
        },
        (Some(size), start, end) => {
            let current = start.unwrap_or(Subpixels::ZERO) + end.unwrap_or(Subpixels::ZERO);
            let leftover = (available - edges - size - current).max(Subpixels::ZERO);
            match (start, end) {
                (None, None) => {
                    used.set_margin_inline_start(leftover / 2);
                    used.set_margin_inline_end(leftover / 2 + leftover % 2);
                },
                (None, Some(_)) => used.set_margin_inline_start(leftover),
                (Some(_), None) => used.set_margin_inline_end(leftover),
                (Some(_), Some(_)) => unreachable!("handled by the previous arm"),
            }
        },
        (None, start, end) => {
            let start = start.unwrap_or(Subpixels::ZERO);
            let end = end.unwrap_or(Subpixels::ZERO);
            used.set_margin_inline_start(start);
            used.set_margin_inline_end(end);
            let size = available - edges - start - end;
            used.set_inline_size(used.clamp_inline(size));
        },
    }
}

/// Margin policy for boxes that never stretch: any auto margin is zero
/// (CSS 2.2 §10.3.9, inline-blocks and shrink-to-fit roots)
pub(crate) fn resolve_margins_auto_is_zero(used: &mut BlockUsedSizes) {
    if used.margin_inline_start().is_none() {
        used.set_margin_inline_start(Subpixels::ZERO);
    }
    if used.margin_inline_end().is_none() {
        used.set_margin_inline_end(Subpixels::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{BorderStyles, ContentHeight, ContentWidth, HorizontalEdges, VerticalEdges};
    use crate::values::LineStyle;

    fn px(pixels: i32) -> Subpixels {
        Subpixels::from_pixels(pixels)
    }

    fn solve(
        widths: ContentWidth,
        horizontal: HorizontalEdges,
        styles: BorderStyles,
        width: Subpixels,
    ) -> BlockUsedSizes {
        let mut used = solve_used_sizes(
            &widths,
            &ContentHeight::INITIAL,
            &horizontal,
            &VerticalEdges::INITIAL,
            &styles,
            ContainingBlock::new(width),
        )
        .unwrap();
        resolve_inline_axis(&mut used, width);
        used
    }

    #[test]
    fn auto_width_takes_the_leftover() {
        // width auto, margins 10/20, border 5 solid, padding 15
        let widths = ContentWidth::INITIAL;
        let horizontal = HorizontalEdges {
            margin_left: AutoOr::NotAuto(LengthPercentage::pixels(10)),
            margin_right: AutoOr::NotAuto(LengthPercentage::pixels(20)),
            border_left: LineWidth::Length(px(5)),
            border_right: LineWidth::Length(px(5)),
            padding_left: LengthPercentage::pixels(15),
            padding_right: LengthPercentage::pixels(15),
        };
        let styles = BorderStyles {
            left: LineStyle::Solid,
            right: LineStyle::Solid,
            ..BorderStyles::INITIAL
        };

        let used = solve(widths, horizontal, styles, px(400));
        assert_eq!(used.inline_size(), Some(px(330)));
        assert_eq!(used.margin_inline_start(), Some(px(10)));
        assert_eq!(used.margin_inline_end(), Some(px(20)));
    }

    #[test]
    fn auto_margins_split_the_leftover() {
        let widths = ContentWidth {
            width: AutoOr::NotAuto(LengthPercentage::pixels(200)),
            ..ContentWidth::INITIAL
        };
        let horizontal = HorizontalEdges {
            margin_left: AutoOr::Auto,
            margin_right: AutoOr::Auto,
            ..HorizontalEdges::INITIAL
        };
        let styles = BorderStyles::INITIAL;

        let used = solve(widths, horizontal, styles, px(800));
        assert_eq!(used.inline_size(), Some(px(200)));
        assert_eq!(used.margin_inline_start(), Some(px(300)));
        assert_eq!(used.margin_inline_end(), Some(px(300)));
    }

    #[test]
    fn odd_leftover_goes_to_the_end_margin() {
        let widths = ContentWidth {
            width: AutoOr::NotAuto(LengthPercentage::Length(Subpixels(101))),
            ..ContentWidth::INITIAL
        };
        let horizontal = HorizontalEdges {
            margin_left: AutoOr::Auto,
            margin_right: AutoOr::Auto,
            ..HorizontalEdges::INITIAL
        };

        let used = solve(widths, horizontal, BorderStyles::INITIAL, Subpixels(200));
        assert_eq!(used.margin_inline_start(), Some(Subpixels(49)));
        assert_eq!(used.margin_inline_end(), Some(Subpixels(50)));
    }

    #[test]
    fn specified_width_clamps_before_margins_resolve() {
        // width 200 clamped up to min-width 300, auto margins split 200
        let widths = ContentWidth {
            width: AutoOr::NotAuto(LengthPercentage::pixels(200)),
            min_width: LengthPercentage::pixels(300),
            max_width: MaxSize::pixels(400),
        };
        let horizontal = HorizontalEdges {
            margin_left: AutoOr::Auto,
            margin_right: AutoOr::Auto,
            ..HorizontalEdges::INITIAL
        };

        let used = solve(widths, horizontal, BorderStyles::INITIAL, px(500));
        assert_eq!(used.inline_size(), Some(px(300)));
        assert_eq!(used.margin_inline_start(), Some(px(100)));
        assert_eq!(used.margin_inline_end(), Some(px(100)));
    }

    #[test]
    fn overconstrained_blocks_push_the_error_into_the_end_margin() {
        let widths = ContentWidth {
            width: AutoOr::NotAuto(LengthPercentage::pixels(300)),
            ..ContentWidth::INITIAL
        };
        let horizontal = HorizontalEdges {
            margin_left: AutoOr::NotAuto(LengthPercentage::pixels(50)),
            margin_right: AutoOr::NotAuto(LengthPercentage::pixels(50)),
            ..HorizontalEdges::INITIAL
        };

        let used = solve(widths, horizontal, BorderStyles::INITIAL, px(200));
        // 200 - 300 - 50 = -150, sign permitted
        assert_eq!(used.margin_inline_end(), Some(px(-150)));
        // margin law: start + size + end = containing block
        assert_eq!(
            used.margin_inline_start().unwrap()
                + used.inline_size().unwrap()
                + used.margin_inline_end().unwrap(),
            px(200)
        );
    }

    #[test]
    fn hidden_border_style_zeroes_the_width() {
        let horizontal = HorizontalEdges {
            border_left: LineWidth::Thick,
            border_right: LineWidth::Thick,
            ..HorizontalEdges::INITIAL
        };
        let styles = BorderStyles {
            left: LineStyle::Hidden,
            right: LineStyle::Solid,
            ..BorderStyles::INITIAL
        };

        let used = solve(ContentWidth::INITIAL, horizontal, styles, px(100));
        assert_eq!(used.border_inline_start, Subpixels::ZERO);
        assert_eq!(used.border_inline_end, px(5));
    }

    #[test]
    fn negative_padding_is_rejected() {
        let horizontal = HorizontalEdges {
            padding_left: LengthPercentage::pixels(-1),
            ..HorizontalEdges::INITIAL
        };
        let result = solve_used_sizes(
            &ContentWidth::INITIAL,
            &ContentHeight::INITIAL,
            &horizontal,
            &VerticalEdges::INITIAL,
            &BorderStyles::INITIAL,
            ContainingBlock::new(px(100)),
        );
        assert_eq!(result, Err(LayoutError::InvalidValue));
    }

    #[test]
    fn percentage_height_without_a_base_is_auto() {
        let heights = ContentHeight {
            height: AutoOr::NotAuto(LengthPercentage::Percentage(
                crate::values::Percentage::from_fraction(0.5),
            )),
            ..ContentHeight::INITIAL
        };
        let used = solve_used_sizes(
            &ContentWidth::INITIAL,
            &heights,
            &HorizontalEdges::INITIAL,
            &VerticalEdges::INITIAL,
            &BorderStyles::INITIAL,
            ContainingBlock::new(px(100)),
        )
        .unwrap();
        assert_eq!(used.block_size(), None);

        let used = solve_used_sizes(
            &ContentWidth::INITIAL,
            &heights,
            &HorizontalEdges::INITIAL,
            &VerticalEdges::INITIAL,
            &BorderStyles::INITIAL,
            ContainingBlock::new(px(100)).with_height(px(600)),
        )
        .unwrap();
        assert_eq!(used.block_size(), Some(px(300)));
    }
}
