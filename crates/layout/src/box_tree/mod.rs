//! The output of layout: a forest of block subtrees in columnar storage
//!
//! Geometry lives in parallel arrays indexed by [BlockIndex]; the tree shape
//! is encoded through per-block skips (pre-order subtree sizes), never
//! through pointers. Subtrees compose through [proxy](BlockKind::SubtreeProxy)
//! leaves, which lets shrink-to-fit build children in isolation and attach
//! them without renumbering anything.
//!
//! All columns are append-only for the duration of a layout pass.

mod debug;
pub mod inline;
pub mod stacking_context;

pub use inline::{
    GlyphMetrics, GlyphSlot, IfcId, InlineBox, InlineBoxIndex, InlineFormattingContext, LineBox,
    Special, SpecialKind,
};
pub use stacking_context::{
    StackingContext, StackingContextId, StackingContextInfo, StackingContextTree,
};

use std::collections::HashMap;

use math::{Rectangle, Sides, Size, Vec2D};

use crate::{
    element_tree::ElementId, error::LayoutError, images::ImageHandle, units::Subpixels,
    values::Rgba,
};

/// Identifies a subtree within a [BoxTree]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubtreeId(pub u16);

/// Index of a block within its subtree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockIndex(pub u16);

impl BlockIndex {
    #[inline]
    #[must_use]
    const fn to_index(self) -> usize {
        self.0 as usize
    }
}

/// A block box anywhere in the forest
///
/// Back references between components are always expressed as this pair,
/// never as references into the growing columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockRef {
    pub subtree: SubtreeId,
    pub index: BlockIndex,
}

/// What a block entry represents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// An ordinary block box
    Block {
        stacking_context: Option<StackingContextId>,
    },
    /// A block containing an inline formatting context; its children in
    /// this subtree are the inline-blocks of that context
    IfcContainer { ifc: IfcId },
    /// A leaf standing in for the root of another subtree
    SubtreeProxy { subtree: SubtreeId },
}

/// Border box and content box geometry of one block
///
/// The border position is relative to the parent's content box; the content
/// position is relative to the block's own border box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoxOffsets {
    pub border_pos: Vec2D<Subpixels>,
    pub border_size: Size<Subpixels>,
    pub content_pos: Vec2D<Subpixels>,
    pub content_size: Size<Subpixels>,
}

impl BoxOffsets {
    /// The border box rectangle, given the origin of the parent's content
    /// box in the consumer's coordinate space
    #[must_use]
    pub fn border_rect(&self, parent_content_origin: Vec2D<Subpixels>) -> Rectangle<Subpixels> {
        self.border_size
            .at_position(parent_content_origin + self.border_pos)
    }

    /// The content box rectangle, in the same coordinate space as
    /// [border_rect](Self::border_rect)
    #[must_use]
    pub fn content_rect(&self, parent_content_origin: Vec2D<Subpixels>) -> Rectangle<Subpixels> {
        self.content_size
            .at_position(parent_content_origin + self.border_pos + self.content_pos)
    }
}

/// Used background of one block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsedBackground {
    pub color: Rgba,
    /// The image together with its natural size in subpixels, if it is
    /// known to the image collaborator
    pub image: Option<(ImageHandle, Size<Subpixels>)>,
}

impl Default for BlockKind {
    fn default() -> Self {
        Self::Block {
            stacking_context: None,
        }
    }
}

/// One subtree of blocks in parallel columnar arrays
#[derive(Clone, Debug, Default)]
pub struct Subtree {
    /// The proxy hosting this subtree, if it is not the root subtree
    parent: Option<BlockRef>,
    skips: Vec<u16>,
    kinds: Vec<BlockKind>,
    box_offsets: Vec<BoxOffsets>,
    borders: Vec<Sides<Subpixels>>,
    margins: Vec<Sides<Subpixels>>,
    insets: Vec<Vec2D<Subpixels>>,
    border_colors: Vec<Sides<Rgba>>,
    backgrounds: Vec<UsedBackground>,
}

impl Subtree {
    #[must_use]
    pub fn len(&self) -> usize {
        self.skips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skips.is_empty()
    }

    #[must_use]
    pub fn parent(&self) -> Option<BlockRef> {
        self.parent
    }

    /// Append a new block with default geometry, to be filled in by the
    /// part-1/part-2 writes of the layout engines
    pub fn push_block(&mut self, kind: BlockKind) -> Result<BlockIndex, LayoutError> {
        if self.skips.len() >= u16::MAX as usize {
            return Err(LayoutError::Overflow);
        }
        self.skips.try_reserve(1)?;
        self.kinds.try_reserve(1)?;
        self.box_offsets.try_reserve(1)?;
        self.borders.try_reserve(1)?;
        self.margins.try_reserve(1)?;
        self.insets.try_reserve(1)?;
        self.border_colors.try_reserve(1)?;
        self.backgrounds.try_reserve(1)?;

        let index = BlockIndex(self.skips.len() as u16);
        self.skips.push(1);
        self.kinds.push(kind);
        self.box_offsets.push(BoxOffsets::default());
        self.borders.push(Sides::all(Subpixels::ZERO));
        self.margins.push(Sides::all(Subpixels::ZERO));
        self.insets.push(Vec2D::default());
        self.border_colors.push(Sides::all(Rgba::TRANSPARENT));
        self.backgrounds.push(UsedBackground::default());
        Ok(index)
    }

    #[must_use]
    pub fn skip(&self, block: BlockIndex) -> u16 {
        self.skips[block.to_index()]
    }

    pub fn set_skip(&mut self, block: BlockIndex, skip: u16) {
        self.skips[block.to_index()] = skip;
    }

    #[must_use]
    pub fn kind(&self, block: BlockIndex) -> BlockKind {
        self.kinds[block.to_index()]
    }

    pub fn set_kind(&mut self, block: BlockIndex, kind: BlockKind) {
        self.kinds[block.to_index()] = kind;
    }

    #[must_use]
    pub fn box_offsets(&self, block: BlockIndex) -> BoxOffsets {
        self.box_offsets[block.to_index()]
    }

    pub fn box_offsets_mut(&mut self, block: BlockIndex) -> &mut BoxOffsets {
        &mut self.box_offsets[block.to_index()]
    }

    #[must_use]
    pub fn borders(&self, block: BlockIndex) -> Sides<Subpixels> {
        self.borders[block.to_index()]
    }

    pub fn set_borders(&mut self, block: BlockIndex, borders: Sides<Subpixels>) {
        self.borders[block.to_index()] = borders;
    }

    #[must_use]
    pub fn margins(&self, block: BlockIndex) -> Sides<Subpixels> {
        self.margins[block.to_index()]
    }

    pub fn set_margins(&mut self, block: BlockIndex, margins: Sides<Subpixels>) {
        self.margins[block.to_index()] = margins;
    }

    #[must_use]
    pub fn insets(&self, block: BlockIndex) -> Vec2D<Subpixels> {
        self.insets[block.to_index()]
    }

    pub fn set_insets(&mut self, block: BlockIndex, insets: Vec2D<Subpixels>) {
        self.insets[block.to_index()] = insets;
    }

    #[must_use]
    pub fn border_colors(&self, block: BlockIndex) -> Sides<Rgba> {
        self.border_colors[block.to_index()]
    }

    pub fn set_border_colors(&mut self, block: BlockIndex, colors: Sides<Rgba>) {
        self.border_colors[block.to_index()] = colors;
    }

    #[must_use]
    pub fn background(&self, block: BlockIndex) -> UsedBackground {
        self.backgrounds[block.to_index()]
    }

    pub fn set_background(&mut self, block: BlockIndex, background: UsedBackground) {
        self.backgrounds[block.to_index()] = background;
    }
}

/// The box an element generated, if any
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratedBox {
    BlockBox(BlockRef),
    InlineBox { ifc: IfcId, index: InlineBoxIndex },
    Text,
}

/// The complete output of a layout pass
#[derive(Clone, Default)]
pub struct BoxTree {
    subtrees: Vec<Subtree>,
    ifcs: Vec<InlineFormattingContext>,
    stacking_contexts: StackingContextTree,
    element_to_box: HashMap<ElementId, GeneratedBox>,
}

impl BoxTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_subtree(&mut self, parent: Option<BlockRef>) -> Result<SubtreeId, LayoutError> {
        if self.subtrees.len() >= u16::MAX as usize {
            return Err(LayoutError::Overflow);
        }
        self.subtrees.try_reserve(1)?;
        let id = SubtreeId(self.subtrees.len() as u16);
        self.subtrees.push(Subtree {
            parent,
            ..Subtree::default()
        });
        Ok(id)
    }

    #[must_use]
    pub fn subtree(&self, id: SubtreeId) -> &Subtree {
        &self.subtrees[id.0 as usize]
    }

    pub fn subtree_mut(&mut self, id: SubtreeId) -> &mut Subtree {
        &mut self.subtrees[id.0 as usize]
    }

    /// Fill in a proxy's owner after shrink-to-fit attaches the subtree
    pub fn set_subtree_parent(&mut self, id: SubtreeId, parent: BlockRef) {
        self.subtrees[id.0 as usize].parent = Some(parent);
    }

    #[must_use]
    pub fn subtree_count(&self) -> usize {
        self.subtrees.len()
    }

    pub fn new_ifc(&mut self) -> Result<IfcId, LayoutError> {
        if self.ifcs.len() >= u16::MAX as usize {
            return Err(LayoutError::Overflow);
        }
        self.ifcs.try_reserve(1)?;
        let id = IfcId(self.ifcs.len() as u16);
        self.ifcs.push(InlineFormattingContext::new());
        Ok(id)
    }

    #[must_use]
    pub fn ifc(&self, id: IfcId) -> &InlineFormattingContext {
        &self.ifcs[id.0 as usize]
    }

    pub fn ifc_mut(&mut self, id: IfcId) -> &mut InlineFormattingContext {
        &mut self.ifcs[id.0 as usize]
    }

    #[must_use]
    pub fn ifc_count(&self) -> usize {
        self.ifcs.len()
    }

    #[must_use]
    pub fn stacking_contexts(&self) -> &StackingContextTree {
        &self.stacking_contexts
    }

    pub fn stacking_contexts_mut(&mut self) -> &mut StackingContextTree {
        &mut self.stacking_contexts
    }

    /// Record which box an element generated
    ///
    /// Elements with `display: none` are never recorded.
    pub fn map_element_to_box(&mut self, element: ElementId, generated: GeneratedBox) {
        let previous = self.element_to_box.insert(element, generated);
        debug_assert!(previous.is_none(), "element mapped to two boxes");
    }

    #[must_use]
    pub fn generated_box(&self, element: ElementId) -> Option<GeneratedBox> {
        self.element_to_box.get(&element).copied()
    }

    #[must_use]
    pub fn element_map_len(&self) -> usize {
        self.element_to_box.len()
    }
}
