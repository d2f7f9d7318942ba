//! Shared fixtures for the integration tests
#![allow(dead_code)] // not every test binary uses every fixture

use layout::box_tree::{BlockIndex, BoxTree, SubtreeId};
use layout::fonts::{FontExtents, FontId, FontSource, GlyphExtents, GlyphId, ShapedGlyph};
use layout::properties::{
    Cascaded, CascadedBoxStyle, CascadedContentHeight, CascadedContentWidth,
    CascadedHorizontalEdges,
};
use layout::values::{AutoOr, Display, LengthPercentage};
use layout::{LayoutParams, Subpixels};
use math::Size;

/// A font with fixed, easily predictable metrics
///
/// The em is 16 px: ascender 12 px, descender -4 px, no line gap, so every
/// line is exactly 16 px tall. Each glyph advances 8 px, except `W`, which
/// is 73 px wide. Spaces advance but have no visible width.
pub struct TestFont;

const WIDE_GLYPH: u16 = b'W' as u16;
const SPACE_GLYPH: u16 = b' ' as u16;

impl FontSource for TestFont {
    fn shape(&self, text: &str, _: FontId) -> Vec<ShapedGlyph> {
        text.chars()
            .map(|c| ShapedGlyph {
                glyph: GlyphId(c as u16),
            })
            .collect()
    }

    fn glyph_extents(&self, _: FontId, glyph: GlyphId) -> GlyphExtents {
        let width = match glyph.0 {
            SPACE_GLYPH => 0,
            WIDE_GLYPH => 73 * 64,
            _ => 8 * 64,
        };
        GlyphExtents {
            x_bearing: 0,
            width,
        }
    }

    fn glyph_h_advance(&self, _: FontId, glyph: GlyphId) -> i32 {
        match glyph.0 {
            WIDE_GLYPH => 73 * 64,
            _ => 8 * 64,
        }
    }

    fn font_h_extents(&self, _: FontId) -> FontExtents {
        FontExtents {
            ascender: 12 * 64,
            descender: -4 * 64,
            line_gap: 0,
        }
    }
}

pub fn px(pixels: i32) -> Subpixels {
    Subpixels::from_pixels(pixels)
}

pub fn viewport_800x600() -> LayoutParams {
    LayoutParams {
        viewport: Size {
            width: px(800),
            height: px(600),
        },
    }
}

pub fn block_style() -> CascadedBoxStyle {
    CascadedBoxStyle {
        display: Cascaded::Value(Display::Block),
        ..CascadedBoxStyle::default()
    }
}

pub fn inline_block_style() -> CascadedBoxStyle {
    CascadedBoxStyle {
        display: Cascaded::Value(Display::InlineBlock),
        ..CascadedBoxStyle::default()
    }
}

pub fn width_px(pixels: i32) -> CascadedContentWidth {
    CascadedContentWidth {
        width: Cascaded::Value(AutoOr::NotAuto(LengthPercentage::pixels(pixels))),
        ..CascadedContentWidth::default()
    }
}

pub fn height_px(pixels: i32) -> CascadedContentHeight {
    CascadedContentHeight {
        height: Cascaded::Value(AutoOr::NotAuto(LengthPercentage::pixels(pixels))),
        ..CascadedContentHeight::default()
    }
}

pub fn auto_horizontal_margins() -> CascadedHorizontalEdges {
    CascadedHorizontalEdges {
        margin_left: Cascaded::Value(AutoOr::Auto),
        margin_right: Cascaded::Value(AutoOr::Auto),
        ..CascadedHorizontalEdges::default()
    }
}

/// Check that every subtree's skips describe a well-formed pre-order
/// forest: children of a block partition its subtree range exactly
pub fn check_skip_integrity(tree: &BoxTree) {
    fn check_range(tree: &BoxTree, subtree: SubtreeId, start: usize, end: usize) {
        let columns = tree.subtree(subtree);
        let mut index = start;
        while index < end {
            let skip = columns.skip(BlockIndex(index as u16)) as usize;
            assert!(skip >= 1, "skips are at least 1");
            assert!(
                index + skip <= end,
                "subtree {subtree:?}: block {index} overflows its parent range"
            );
            check_range(tree, subtree, index + 1, index + skip);
            index += skip;
        }
        assert_eq!(index, end, "children must cover the range exactly");
    }

    for id in 0..tree.subtree_count() {
        let subtree = SubtreeId(id as u16);
        let len = tree.subtree(subtree).len();
        check_range(tree, subtree, 0, len);
    }
}

/// Check that sibling stacking contexts are ordered by ascending z-index
/// on every level
pub fn check_paint_order(tree: &BoxTree) {
    fn check_range(tree: &BoxTree, start: usize, end: usize) {
        let contexts = tree.stacking_contexts();
        let mut previous_z = None;
        let mut index = start;
        while index < end {
            let z_index = contexts.contexts()[index].z_index;
            if let Some(previous) = previous_z {
                assert!(
                    previous <= z_index,
                    "sibling stacking contexts out of paint order"
                );
            }
            previous_z = Some(z_index);
            let skip = contexts.skip(index) as usize;
            check_range(tree, index + 1, index + skip);
            index += skip;
        }
    }

    check_range(tree, 0, tree.stacking_contexts().len());
}
