//! Normal flow layout and its sub-engines
//!
//! The block engine walks the element tree and stacks block-level boxes;
//! shrink-to-fit sizes auto-width inline-blocks; the inline builder
//! produces inline formatting contexts. They recurse into each other
//! through the shared [LayoutContext], which owns the box tree under
//! construction.

pub(crate) mod block;
pub(crate) mod inline;
pub(crate) mod shrink_to_fit;
pub mod used_sizes;

use math::{Sides, Size, Vec2D};

use crate::{
    box_tree::{BlockIndex, BlockRef, BoxTree, StackingContextInfo, SubtreeId, UsedBackground},
    element_tree::ElementTree,
    error::LayoutError,
    fonts::FontSource,
    images::ImageSource,
    properties::{BoxStyle, Insets},
    style_computer::StyleComputer,
    units::Subpixels,
    values::{AutoOr, Display, LengthPercentage, Rgba},
};

use used_sizes::BlockUsedSizes;

/// The rectangle sizes and auto-margins resolve against
///
/// The inline size of a containing block is always known; the block size
/// may depend on content that has not been laid out yet.
#[derive(Clone, Copy, Debug)]
pub struct ContainingBlock {
    width: Subpixels,
    height: Option<Subpixels>,
}

impl ContainingBlock {
    #[inline]
    #[must_use]
    pub const fn new(width: Subpixels) -> Self {
        Self {
            width,
            height: None,
        }
    }

    #[must_use]
    pub const fn with_height(mut self, height: Subpixels) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub const fn with_optional_height(mut self, height: Option<Subpixels>) -> Self {
        self.height = height;
        self
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> Subpixels {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> Option<Subpixels> {
        self.height
    }
}

/// Everything the layout engines share while a pass runs
///
/// The context owns the box tree under construction; engines address blocks
/// through indices, never through references into the growing columns.
pub struct LayoutContext<'a> {
    pub element_tree: &'a ElementTree,
    pub computer: StyleComputer<'a>,
    pub fonts: &'a dyn FontSource,
    pub images: &'a dyn ImageSource,
    pub box_tree: BoxTree,
    /// The chain of positioned ancestors and their generated blocks, for
    /// absolutely positioned descendants
    pub absolute_containers: Vec<BlockRef>,
}

impl LayoutContext<'_> {
    /// The effective display of an element, applying the root switch of
    /// CSS 2.2 §9.7
    #[must_use]
    pub(crate) fn effective_display(display: Display, is_root: bool) -> Display {
        if is_root {
            display.used_value_for_root()
        } else {
            display
        }
    }

    /// Stacking participation of a block-level box
    #[must_use]
    pub(crate) fn stacking_info(
        box_style: &BoxStyle,
        z_index: AutoOr<i32>,
        is_layout_root: bool,
    ) -> StackingContextInfo {
        if is_layout_root {
            return StackingContextInfo::Parent(0);
        }
        if box_style.position.is_relative() {
            return match z_index {
                AutoOr::NotAuto(z_index) => StackingContextInfo::Parent(z_index),
                AutoOr::Auto => StackingContextInfo::NonParent(0),
            };
        }
        StackingContextInfo::None
    }

    /// Reject features the engine knows about but does not lay out
    pub(crate) fn check_unsupported(box_style: &BoxStyle) -> Result<(), LayoutError> {
        if !box_style.float.is_none() {
            return Err(LayoutError::Unimplemented("floats"));
        }
        if box_style.position.is_out_of_flow() {
            return Err(LayoutError::Unimplemented("absolute positioning"));
        }
        Ok(())
    }

    /// Resolve the paint-relevant columns of a block from the current
    /// element's computed style
    pub(crate) fn resolve_appearance(
        &mut self,
        containing_block: ContainingBlock,
    ) -> BlockAppearance {
        let current_color = self.computer.current_color();
        let border_colors = self.computer.border_colors();
        let background = self.computer.background();
        let insets = self.computer.insets();
        let position = self.computer.box_style().position;

        let image = background.image.handle().map(|handle| {
            let natural_size = match self.images.natural_size(handle) {
                Some(size) => Size {
                    width: Subpixels::from_pixels(size.width),
                    height: Subpixels::from_pixels(size.height),
                },
                None => {
                    log::warn!("Background image has no natural size yet, sizing it to zero");
                    Size::default()
                },
            };
            (handle, natural_size)
        });

        BlockAppearance {
            border_colors: Sides {
                top: border_colors.top.resolve_against(current_color),
                right: border_colors.right.resolve_against(current_color),
                bottom: border_colors.bottom.resolve_against(current_color),
                left: border_colors.left.resolve_against(current_color),
            },
            background: UsedBackground {
                color: background.color.resolve_against(current_color),
                image,
            },
            insets: if position.is_relative() {
                resolve_relative_insets(&insets, containing_block)
            } else {
                Vec2D::default()
            },
        }
    }
}

/// Resolved paint data written during the part-1 visit of a block
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BlockAppearance {
    pub border_colors: Sides<Rgba>,
    pub background: UsedBackground,
    pub insets: Vec2D<Subpixels>,
}

/// Used offset of a relatively positioned box
///
/// `left` wins over `right` and `top` over `bottom`; percentages resolve
/// against the containing block, with an unknown block size making the
/// vertical insets zero.
fn resolve_relative_insets(insets: &Insets, containing_block: ContainingBlock) -> Vec2D<Subpixels> {
    let horizontal = match (insets.left, insets.right) {
        (AutoOr::NotAuto(left), _) => left.resolve_against(containing_block.width()),
        (AutoOr::Auto, AutoOr::NotAuto(right)) => -right.resolve_against(containing_block.width()),
        (AutoOr::Auto, AutoOr::Auto) => Subpixels::ZERO,
    };
    let resolve_vertical = |inset: &LengthPercentage| {
        inset
            .try_resolve_against(containing_block.height())
            .unwrap_or(Subpixels::ZERO)
    };
    let vertical = match (insets.top, insets.bottom) {
        (AutoOr::NotAuto(top), _) => resolve_vertical(&top),
        (AutoOr::Auto, AutoOr::NotAuto(bottom)) => -resolve_vertical(&bottom),
        (AutoOr::Auto, AutoOr::Auto) => Subpixels::ZERO,
    };
    Vec2D {
        x: horizontal,
        y: vertical,
    }
}

/// Write everything about a block that is known before its children are
/// laid out: edges, inline geometry and paint data
///
/// The block's final position within the parent is not known yet; the
/// border position temporarily holds the margin offsets until
/// [add_block_to_flow] shifts it into place. The content height and the
/// skip stay open for [finalize_block_height].
pub(crate) fn write_block_part1(
    box_tree: &mut BoxTree,
    subtree: SubtreeId,
    block: BlockIndex,
    used: &BlockUsedSizes,
    appearance: &BlockAppearance,
) {
    let subtree = box_tree.subtree_mut(subtree);

    let borders = Sides {
        top: used.border_block_start,
        right: used.border_inline_end,
        bottom: used.border_block_end,
        left: used.border_inline_start,
    };
    let margins = Sides {
        top: used.margin_block_start,
        right: used.margin_inline_end().unwrap_or(Subpixels::ZERO),
        bottom: used.margin_block_end,
        left: used.margin_inline_start().unwrap_or(Subpixels::ZERO),
    };
    let inline_size = used.inline_size().unwrap_or(Subpixels::ZERO);

    subtree.set_borders(block, borders);
    subtree.set_margins(block, margins);
    subtree.set_insets(block, appearance.insets);
    subtree.set_border_colors(block, appearance.border_colors);
    subtree.set_background(block, appearance.background);

    let offsets = subtree.box_offsets_mut(block);
    offsets.border_pos = Vec2D {
        x: margins.left,
        y: margins.top,
    };
    offsets.content_pos = Vec2D {
        x: borders.left + used.padding_inline_start,
        y: borders.top + used.padding_block_start,
    };
    offsets.content_size.width = inline_size;
    offsets.border_size.width =
        offsets.content_pos.x + inline_size + used.padding_inline_end + borders.right;
    // the block-axis part so far; the content height joins in part 2
    offsets.border_size.height =
        offsets.content_pos.y + used.padding_block_end + borders.bottom;
}

/// The part-2 visit: the content height is known, close the geometry
pub(crate) fn finalize_block_height(
    box_tree: &mut BoxTree,
    subtree: SubtreeId,
    block: BlockIndex,
    skip: u16,
    content_height: Subpixels,
) {
    let subtree = box_tree.subtree_mut(subtree);
    subtree.set_skip(block, skip);
    let offsets = subtree.box_offsets_mut(block);
    offsets.content_size.height = content_height;
    offsets.border_size.height += content_height;
}

/// Place a finished block into its parent's flow
///
/// The border position staged by [write_block_part1] holds the margin
/// offsets; the block-axis flow position is added on top, then any relative
/// offset. Returns the new accumulated auto height of the parent.
pub(crate) fn add_block_to_flow(
    box_tree: &mut BoxTree,
    subtree: SubtreeId,
    block: BlockIndex,
    parent_auto_height: Subpixels,
) -> Result<Subpixels, LayoutError> {
    let subtree = box_tree.subtree_mut(subtree);
    let margins = subtree.margins(block);
    let insets = subtree.insets(block);

    let offsets = subtree.box_offsets_mut(block);
    let margin_top = offsets.border_pos.y;
    offsets.border_pos.y += parent_auto_height;
    // Relative offsets move the box after placement; they do not
    // participate in the flow
    offsets.border_pos += insets;

    let outer_height = offsets
        .border_size
        .height
        .checked_add(margin_top)
        .and_then(|height| height.checked_add(margins.bottom))
        .ok_or(LayoutError::Overflow)?;
    parent_auto_height
        .checked_add(outer_height)
        .ok_or(LayoutError::Overflow)
}
