//! Building and line-splitting inline formatting contexts
//!
//! The run builder walks a maximal sequence of inline-level siblings,
//! shaping text through the font collaborator and emitting the glyph
//! stream with its special markers. Inline-blocks are laid out through
//! shrink-to-fit *before* line splitting so their outer width is known.
//! A second pass splits the finished stream into line boxes, greedy and
//! left-to-right.

use crate::{
    box_tree::{
        BlockIndex, GeneratedBox, GlyphMetrics, GlyphSlot, IfcId, InlineBox, InlineBoxIndex,
        LineBox, Special, SpecialKind, SubtreeId,
    },
    element_tree::{Category, ElementId},
    error::LayoutError,
    fonts::FontId,
    units::Subpixels,
    values::{Display, LineStyle, LineWidth},
};

use super::{shrink_to_fit, ContainingBlock, LayoutContext};

/// What the run builder hands back to the engine that reserved the
/// container entry
pub(crate) struct InlineRunResult {
    /// Blocks the run appended to the container's subtree (the
    /// inline-blocks and their descendants)
    pub total_inline_block_skip: u16,
    /// Length of the longest line box, the run's contribution to
    /// shrink-to-fit widths
    pub longest_line: Subpixels,
    /// Total block-axis extent of all line boxes
    pub height: Subpixels,
    /// The first sibling that is not part of the run, if any
    pub next_element: Option<ElementId>,
}

/// Ascent above and descent below the baseline contributed by one slot
#[derive(Clone, Copy, Debug, Default)]
struct SlotHeight {
    above: Subpixels,
    below: Subpixels,
}

struct OpenInlineBox {
    element: ElementId,
    index: InlineBoxIndex,
    subtree_end: u16,
}

/// Build and lay out the inline formatting context for the run of
/// inline-level siblings starting at `first`
///
/// `subtree` is the container's subtree, where inline-block boxes land.
/// The available inline size is the width of `containing_block`.
pub(crate) fn lay_out_inline_run(
    ctx: &mut LayoutContext<'_>,
    subtree: SubtreeId,
    ifc: IfcId,
    first: ElementId,
    run_end: u16,
    containing_block: ContainingBlock,
) -> Result<InlineRunResult, LayoutError> {
    let mut builder = RunBuilder {
        ctx: &mut *ctx,
        subtree,
        ifc,
        containing_block,
        slot_heights: Vec::new(),
        total_inline_block_skip: 0,
        previous_was_space: true,
    };
    let next_element = builder.traverse(first, run_end)?;
    let slot_heights = builder.slot_heights;
    let total_inline_block_skip = builder.total_inline_block_skip;

    let (longest_line, height) = split_into_lines(ctx, subtree, ifc, &slot_heights, containing_block)?;

    Ok(InlineRunResult {
        total_inline_block_skip,
        longest_line,
        height,
        next_element,
    })
}

struct RunBuilder<'c, 'a> {
    ctx: &'c mut LayoutContext<'a>,
    subtree: SubtreeId,
    ifc: IfcId,
    containing_block: ContainingBlock,
    /// Parallel to the raw glyph slots
    slot_heights: Vec<SlotHeight>,
    total_inline_block_skip: u16,
    /// Whitespace collapsing state, carried across text elements; starts
    /// true so leading whitespace of the run disappears
    previous_was_space: bool,
}

impl RunBuilder<'_, '_> {
    /// Walk the run, returning the first sibling that ends it
    fn traverse(&mut self, first: ElementId, run_end: u16) -> Result<Option<ElementId>, LayoutError> {
        let mut open_boxes: Vec<OpenInlineBox> = Vec::new();
        let mut cursor = Some(first);

        loop {
            let bound = open_boxes.last().map_or(run_end, |open| open.subtree_end);
            match cursor {
                Some(element) => match self.ctx.element_tree.category_of(element) {
                    Category::Text => {
                        self.push_text(element);
                        cursor = self.ctx.element_tree.next_sibling(element, bound);
                    },
                    Category::Element => {
                        self.ctx.computer.set_current_element(element);
                        let box_style = self.ctx.computer.box_style();
                        match box_style.display {
                            Display::None => {
                                cursor = self.ctx.element_tree.next_sibling(element, bound);
                            },
                            Display::Inline => {
                                LayoutContext::check_unsupported(&box_style)?;
                                let index = self.open_inline_box(element);
                                open_boxes.push(OpenInlineBox {
                                    element,
                                    index,
                                    subtree_end: self.ctx.element_tree.subtree_end(element),
                                });
                                cursor = self.ctx.element_tree.first_child(element);
                            },
                            Display::InlineBlock => {
                                LayoutContext::check_unsupported(&box_style)?;
                                self.push_inline_block(element)?;
                                cursor = self.ctx.element_tree.next_sibling(element, bound);
                            },
                            Display::Block => {
                                if open_boxes.is_empty() {
                                    // A block-level sibling ends the run
                                    return Ok(Some(element));
                                }
                                // Splitting inline boxes around a block
                                // requires continuation boxes
                                return Err(LayoutError::Unimplemented(
                                    "block boxes inside inline boxes",
                                ));
                            },
                        }
                    },
                },
                None => match open_boxes.pop() {
                    Some(open) => {
                        self.close_inline_box(open.index);
                        self.ctx.computer.pop_element();
                        let bound = open_boxes.last().map_or(run_end, |o| o.subtree_end);
                        cursor = self.ctx.element_tree.next_sibling(open.element, bound);
                    },
                    None => return Ok(None),
                },
            }
        }
    }

    /// Keep the per-slot height column parallel to the raw stream
    fn sync_slot_heights(&mut self, height: SlotHeight) {
        let slots = self.ctx.box_tree.ifc(self.ifc).slot_count();
        self.slot_heights.resize(slots, height);
    }

    fn push_text(&mut self, element: ElementId) {
        let font = self.ctx.computer.inherited_font().font;
        let text = collapse_whitespace(
            self.ctx.element_tree.text_of(element),
            &mut self.previous_was_space,
        );
        // A text element at the layout root is already mapped to the block
        // box wrapping it
        if self.ctx.box_tree.generated_box(element).is_none() {
            self.ctx
                .box_tree
                .map_element_to_box(element, GeneratedBox::Text);
        }
        if text.is_empty() {
            return;
        }

        let height = line_height_contribution(self.ctx, font);
        for shaped in self.ctx.fonts.shape(&text, font) {
            let advance =
                Subpixels::from_font_units(self.ctx.fonts.glyph_h_advance(font, shaped.glyph));
            let extents = self.ctx.fonts.glyph_extents(font, shaped.glyph);
            let metrics = GlyphMetrics {
                offset: Subpixels::from_font_units(extents.x_bearing),
                advance,
                width: Subpixels::from_font_units(extents.width),
            };
            self.ctx
                .box_tree
                .ifc_mut(self.ifc)
                .push_glyph(shaped.glyph, metrics);
            self.sync_slot_heights(height);
        }
    }

    /// Start an inline box: resolve its edges, emit the `BoxStart` marker
    /// and push the element's style scope
    fn open_inline_box(&mut self, element: ElementId) -> InlineBoxIndex {
        let base = self.containing_block.width();
        let horizontal = self.ctx.computer.horizontal_edges();
        let styles = self.ctx.computer.border_styles();
        let current_color = self.ctx.computer.current_color();
        let background = self.ctx.computer.background();

        let border_width = |width: LineWidth, style: LineStyle| {
            if style.nullifies_width() {
                Subpixels::ZERO
            } else {
                width.to_subpixels()
            }
        };
        let inline_box = InlineBox {
            element: Some(element),
            margin_start: horizontal
                .margin_left
                .map(|margin| margin.resolve_against(base))
                .unwrap_or(Subpixels::ZERO),
            margin_end: horizontal
                .margin_right
                .map(|margin| margin.resolve_against(base))
                .unwrap_or(Subpixels::ZERO),
            border_start: border_width(horizontal.border_left, styles.left),
            border_end: border_width(horizontal.border_right, styles.right),
            padding_start: horizontal.padding_left.resolve_against(base),
            padding_end: horizontal.padding_right.resolve_against(base),
            background_color: background.color.resolve_against(current_color),
        };

        let ifc = self.ctx.box_tree.ifc_mut(self.ifc);
        let index = ifc.push_inline_box(inline_box);
        ifc.push_special(
            Special::box_start(index),
            GlyphMetrics {
                offset: Subpixels::ZERO,
                advance: inline_box.margin_start + inline_box.border_start + inline_box.padding_start,
                width: Subpixels::ZERO,
            },
        );
        self.sync_slot_heights(SlotHeight::default());

        self.ctx
            .box_tree
            .map_element_to_box(element, GeneratedBox::InlineBox { ifc: self.ifc, index });
        self.ctx.computer.push_element();
        index
    }

    fn close_inline_box(&mut self, index: InlineBoxIndex) {
        let ifc = self.ctx.box_tree.ifc_mut(self.ifc);
        let data = *ifc.inline_box(index);
        ifc.push_special(
            Special::box_end(index),
            GlyphMetrics {
                offset: Subpixels::ZERO,
                advance: data.padding_end + data.border_end + data.margin_end,
                width: Subpixels::ZERO,
            },
        );
        self.sync_slot_heights(SlotHeight::default());
    }

    /// Lay out an inline-block through shrink-to-fit and emit its marker
    ///
    /// The marker's metrics carry the margin box width, so line splitting
    /// can treat the box like one wide glyph.
    fn push_inline_block(&mut self, element: ElementId) -> Result<(), LayoutError> {
        let result = shrink_to_fit::lay_out_inline_block(
            self.ctx,
            self.subtree,
            element,
            self.containing_block,
        )?;
        self.total_inline_block_skip += result.skip;

        self.ctx.box_tree.ifc_mut(self.ifc).push_special(
            Special::inline_block(result.block),
            GlyphMetrics {
                offset: Subpixels::ZERO,
                advance: result.margin_box_width,
                width: result.margin_box_width,
            },
        );
        self.sync_slot_heights(SlotHeight {
            above: result.margin_box_height,
            below: Subpixels::ZERO,
        });
        // Content after an atomic inline is not at a whitespace boundary
        self.previous_was_space = false;
        Ok(())
    }
}

/// The ascent and descent a glyph of `font` gives its line
///
/// Half the line gap goes above the ascender (taking the odd unit) and
/// half below the descender.
fn line_height_contribution(ctx: &LayoutContext<'_>, font: FontId) -> SlotHeight {
    let extents = ctx.fonts.font_h_extents(font);
    let ascender = Subpixels::from_font_units(extents.ascender);
    let descender = Subpixels::from_font_units(extents.descender);
    let line_gap = Subpixels::from_font_units(extents.line_gap);
    SlotHeight {
        above: ascender + line_gap / 2 + line_gap % 2,
        below: -descender + line_gap / 2,
    }
}

/// Collapse whitespace runs into single spaces
/// (<https://drafts.csswg.org/css2/#white-space-model>, `white-space: normal`)
fn collapse_whitespace(text: &str, previous_was_space: &mut bool) -> String {
    let mut collapsed = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_whitespace() {
            if !*previous_was_space {
                collapsed.push(' ');
                *previous_was_space = true;
            }
        } else {
            collapsed.push(c);
            *previous_was_space = false;
        }
    }
    collapsed
}

/// Greedy left-to-right line splitting over the finished stream
///
/// A contentful slot wraps when it no longer fits, provided the line
/// already has content and the slot has a positive width. Returns the
/// longest line length and the total height.
fn split_into_lines(
    ctx: &mut LayoutContext<'_>,
    subtree: SubtreeId,
    ifc: IfcId,
    slot_heights: &[SlotHeight],
    containing_block: ContainingBlock,
) -> Result<(Subpixels, Subpixels), LayoutError> {
    let available = containing_block.width();

    struct LineState {
        start_slot: usize,
        first_inline_box: InlineBoxIndex,
        cursor: Subpixels,
        max_above: Subpixels,
        max_below: Subpixels,
        has_content: bool,
        /// Inline-blocks on this line, placed once the baseline is known
        pending_blocks: Vec<(BlockIndex, Subpixels)>,
    }

    let mut y = Subpixels::ZERO;
    let mut longest_line = Subpixels::ZERO;
    let mut open_boxes: Vec<InlineBoxIndex> = Vec::new();
    let mut line = LineState {
        start_slot: 0,
        first_inline_box: InlineBoxIndex::ROOT,
        cursor: Subpixels::ZERO,
        max_above: Subpixels::ZERO,
        max_below: Subpixels::ZERO,
        has_content: false,
        pending_blocks: Vec::new(),
    };

    let finish_line = |line: &mut LineState,
                           y: &mut Subpixels,
                           longest_line: &mut Subpixels,
                           end_slot: usize,
                           ctx: &mut LayoutContext<'_>,
                           next_first_box: InlineBoxIndex|
     -> Result<(), LayoutError> {
        let baseline = y.checked_add(line.max_above).ok_or(LayoutError::Overflow)?;
        ctx.box_tree.ifc_mut(ifc).push_line_box(LineBox {
            baseline,
            range: line.start_slot..end_slot,
            first_inline_box: line.first_inline_box,
        });

        for &(block, x) in &line.pending_blocks {
            let tree = ctx.box_tree.subtree_mut(subtree);
            let margins = tree.margins(block);
            let insets = tree.insets(block);
            let margin_box_height =
                tree.box_offsets(block).border_size.height + margins.vertical_sum();
            let offsets = tree.box_offsets_mut(block);
            offsets.border_pos.x = x + margins.left + insets.x;
            offsets.border_pos.y = baseline - margin_box_height + margins.top + insets.y;
        }

        *longest_line = (*longest_line).max(line.cursor);
        *y = baseline + line.max_below;
        *line = LineState {
            start_slot: end_slot,
            first_inline_box: next_first_box,
            cursor: Subpixels::ZERO,
            max_above: Subpixels::ZERO,
            max_below: Subpixels::ZERO,
            has_content: false,
            pending_blocks: Vec::new(),
        };
        Ok(())
    };

    // Decoding borrows the IFC, so gather the entries first
    let entries: Vec<_> = ctx.box_tree.ifc(ifc).slots().collect();
    for (slot, entry) in entries {
        let metrics = ctx.box_tree.ifc(ifc).metrics(slot);

        let contentful = match entry {
            GlyphSlot::Glyph(_) => true,
            GlyphSlot::Special(special) => matches!(
                special.kind,
                SpecialKind::ZeroGlyph | SpecialKind::InlineBlock
            ),
        };

        if contentful
            && line.has_content
            && metrics.width > Subpixels::ZERO
            && line.cursor + metrics.offset + metrics.width > available
        {
            let next_first_box = open_boxes.last().copied().unwrap_or(InlineBoxIndex::ROOT);
            finish_line(&mut line, &mut y, &mut longest_line, slot, ctx, next_first_box)?;
        }

        match entry {
            GlyphSlot::Glyph(_) => line.has_content = true,
            GlyphSlot::Special(special) => match special.kind {
                SpecialKind::ZeroGlyph => line.has_content = true,
                SpecialKind::BoxStart => open_boxes.push(InlineBoxIndex(special.data)),
                SpecialKind::BoxEnd => {
                    open_boxes.pop();
                },
                SpecialKind::InlineBlock => {
                    line.has_content = true;
                    line.pending_blocks
                        .push((BlockIndex(special.data), line.cursor + metrics.offset));
                },
                SpecialKind::LineBreak => {
                    line.cursor += metrics.advance;
                    let next_first_box =
                        open_boxes.last().copied().unwrap_or(InlineBoxIndex::ROOT);
                    finish_line(&mut line, &mut y, &mut longest_line, slot + 2, ctx, next_first_box)?;
                    continue;
                },
            },
        }

        let height = slot_heights.get(slot).copied().unwrap_or_default();
        line.max_above = line.max_above.max(height.above);
        line.max_below = line.max_below.max(height.below);
        line.cursor += metrics.advance;
    }

    let slot_count = ctx.box_tree.ifc(ifc).slot_count();
    if slot_count > line.start_slot {
        finish_line(
            &mut line,
            &mut y,
            &mut longest_line,
            slot_count,
            ctx,
            InlineBoxIndex::ROOT,
        )?;
    }

    Ok((longest_line, y))
}
