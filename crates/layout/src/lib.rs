//! The visual formatting core of a CSS layout engine
//!
//! Consumes a tree of styled elements and produces a [BoxTree]: a forest of
//! positioned, sized block boxes in columnar storage, together with the
//! inline formatting contexts and the stacking context tree needed to paint
//! them in the right order.
//!
//! Parsing, selector matching, cascading, text shaping and painting are all
//! external collaborators; their contracts live in [element_tree],
//! [properties], [fonts] and [images].
//!
//! ```
//! use layout::{do_layout, LayoutParams, Subpixels};
//! use layout::element_tree::ElementTreeBuilder;
//! use layout::fonts::{FontExtents, FontId, FontSource, GlyphExtents, GlyphId, ShapedGlyph};
//! use layout::images::NoImages;
//! use layout::properties::CascadedValueStore;
//! use math::Size;
//!
//! struct NoText;
//!
//! impl FontSource for NoText {
//!     fn shape(&self, _: &str, _: FontId) -> Vec<ShapedGlyph> {
//!         Vec::new()
//!     }
//!     fn glyph_extents(&self, _: FontId, _: GlyphId) -> GlyphExtents {
//!         GlyphExtents::default()
//!     }
//!     fn glyph_h_advance(&self, _: FontId, _: GlyphId) -> i32 {
//!         0
//!     }
//!     fn font_h_extents(&self, _: FontId) -> FontExtents {
//!         FontExtents::default()
//!     }
//! }
//!
//! let mut builder = ElementTreeBuilder::new();
//! builder.open_element().unwrap();
//! builder.close_element();
//! let tree = builder.finish();
//!
//! let params = LayoutParams {
//!     viewport: Size {
//!         width: Subpixels::from_pixels(800),
//!         height: Subpixels::from_pixels(600),
//!     },
//! };
//! let box_tree = do_layout(&tree, &CascadedValueStore::new(), &NoText, &NoImages, &params).unwrap();
//! assert_eq!(box_tree.subtree_count(), 1);
//! ```

pub mod box_tree;
pub mod element_tree;
mod error;
pub mod flow;
pub mod fonts;
pub mod images;
pub mod properties;
pub mod style_computer;
mod units;
pub mod values;

pub use box_tree::BoxTree;
pub use error::LayoutError;
pub use units::{Subpixels, SUBPIXELS_PER_PIXEL};

use math::Size;

use box_tree::StackingContextInfo;
use element_tree::{ElementId, ElementTree};
use flow::{
    block::{self, RootMarginPolicy},
    ContainingBlock, LayoutContext,
};
use fonts::FontSource;
use images::ImageSource;
use properties::CascadedValueStore;
use style_computer::StyleComputer;

/// Tab stops are this many space advances apart in preformatted inline
/// content; collapsible whitespace never reaches them
pub const TAB_SIZE: u32 = 8;

/// The element tree index type bounds the tree size
pub const MAX_ELEMENT_COUNT: usize = u16::MAX as usize;

/// Per-pass configuration
#[derive(Clone, Copy, Debug)]
pub struct LayoutParams {
    /// Size of the initial containing block
    pub viewport: Size<Subpixels>,
}

/// Run a complete layout pass
///
/// Runs to completion or to a terminal error; on error the partially built
/// box tree is discarded and nothing is observable. The returned tree is
/// immutable from the caller's point of view and ready for painting.
pub fn do_layout(
    element_tree: &ElementTree,
    cascaded_values: &CascadedValueStore,
    fonts: &dyn FontSource,
    images: &dyn ImageSource,
    params: &LayoutParams,
) -> Result<BoxTree, LayoutError> {
    let mut ctx = LayoutContext {
        element_tree,
        computer: StyleComputer::new(cascaded_values),
        fonts,
        images,
        box_tree: BoxTree::new(),
        absolute_containers: Vec::new(),
    };

    if element_tree.is_empty() {
        return Ok(ctx.box_tree);
    }

    let root = ElementId::ROOT;
    ctx.computer.set_current_element(root);
    let box_style = ctx.computer.box_style();
    let display = LayoutContext::effective_display(box_style.display, true);
    if display.is_none() {
        // The root generates no box at all; an empty tree is a valid result
        return Ok(ctx.box_tree);
    }
    LayoutContext::check_unsupported(&box_style)?;

    let initial_containing_block =
        ContainingBlock::new(params.viewport.width).with_height(params.viewport.height);
    let subtree = ctx.box_tree.new_subtree(None)?;
    block::lay_out_block_tree(
        &mut ctx,
        subtree,
        root,
        initial_containing_block,
        RootMarginPolicy::Flow,
        // The root box always establishes the root stacking context
        StackingContextInfo::Parent(0),
    )?;

    debug_assert!(
        ctx.absolute_containers.is_empty(),
        "positioned ancestor stack must unwind"
    );
    Ok(ctx.box_tree)
}
