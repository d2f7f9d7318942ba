//! Storage for inline formatting contexts
//!
//! An IFC is two parallel arrays: a stream of 32-bit glyph slots and the
//! per-slot [GlyphMetrics]. Slot value 0 is a sentinel meaning "the next
//! slot is a [Special] marker" — a 16-bit kind in the high half and a
//! 16-bit payload in the low half. The sentinel slot carries the marker's
//! metrics (e.g. the advance of an inline box's leading edges); the marker
//! slot's metrics are unused. This keeps the stream compact and trivially
//! traversable.

use std::ops::Range;

use crate::{
    element_tree::ElementId,
    fonts::GlyphId,
    units::Subpixels,
    values::Rgba,
};

use super::{BlockIndex, BlockRef};

/// Identifies an inline formatting context within the box tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IfcId(pub u16);

/// Index of an inline box within its IFC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InlineBoxIndex(pub u16);

impl InlineBoxIndex {
    /// The root inline box every IFC has
    pub const ROOT: Self = Self(0);
}

/// Horizontal metrics of one glyph slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Distance from the pen position to the glyph's left edge
    pub offset: Subpixels,
    /// How far the pen moves after this slot
    pub advance: Subpixels,
    /// Visible width; zero-width slots never cause line breaks
    pub width: Subpixels,
}

/// Kinds of non-glyph events in the glyph stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum SpecialKind {
    /// An actual glyph with index 0, escaped to avoid the sentinel
    ZeroGlyph = 1,
    /// An inline box opens; payload is the [InlineBoxIndex]
    BoxStart = 2,
    /// An inline box closes; payload is the [InlineBoxIndex]
    BoxEnd = 3,
    /// An inline-block sits here; payload is its [BlockIndex] in the
    /// subtree of the IFC's container block
    InlineBlock = 4,
    /// A forced line break
    LineBreak = 5,
}

/// A decoded special marker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Special {
    pub kind: SpecialKind,
    pub data: u16,
}

impl Special {
    #[must_use]
    pub const fn zero_glyph() -> Self {
        Self {
            kind: SpecialKind::ZeroGlyph,
            data: 0,
        }
    }

    #[must_use]
    pub const fn box_start(inline_box: InlineBoxIndex) -> Self {
        Self {
            kind: SpecialKind::BoxStart,
            data: inline_box.0,
        }
    }

    #[must_use]
    pub const fn box_end(inline_box: InlineBoxIndex) -> Self {
        Self {
            kind: SpecialKind::BoxEnd,
            data: inline_box.0,
        }
    }

    #[must_use]
    pub const fn inline_block(block: BlockIndex) -> Self {
        Self {
            kind: SpecialKind::InlineBlock,
            data: block.0,
        }
    }

    #[must_use]
    pub const fn line_break() -> Self {
        Self {
            kind: SpecialKind::LineBreak,
            data: 0,
        }
    }

    #[must_use]
    pub const fn encode(self) -> u32 {
        ((self.kind as u32) << 16) | self.data as u32
    }

    #[must_use]
    pub fn decode(raw: u32) -> Self {
        let kind = match (raw >> 16) as u16 {
            1 => SpecialKind::ZeroGlyph,
            2 => SpecialKind::BoxStart,
            3 => SpecialKind::BoxEnd,
            4 => SpecialKind::InlineBlock,
            5 => SpecialKind::LineBreak,
            other => panic!("corrupt special marker kind {other}"),
        };
        Self {
            kind,
            data: raw as u16,
        }
    }
}

/// One decoded entry of the glyph stream
///
/// A special occupies two raw slots; `slot` in [slots](InlineFormattingContext::slots)
/// is always the index of the entry's *first* slot, whose metrics apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphSlot {
    Glyph(GlyphId),
    Special(Special),
}

/// A maximal run of glyphs sharing one baseline
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineBox {
    /// Baseline position relative to the IFC origin
    pub baseline: Subpixels,
    /// The raw slot range making up this line
    pub range: Range<usize>,
    /// The innermost inline box open when the line starts; lets painters
    /// resume box backgrounds across line breaks
    pub first_inline_box: InlineBoxIndex,
}

/// Paint-relevant data of one inline box
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InlineBox {
    /// The element that generated this box; the root inline box has none
    pub element: Option<ElementId>,
    pub margin_start: Subpixels,
    pub margin_end: Subpixels,
    pub border_start: Subpixels,
    pub border_end: Subpixels,
    pub padding_start: Subpixels,
    pub padding_end: Subpixels,
    pub background_color: Rgba,
}

#[derive(Clone, Debug, Default)]
pub struct InlineFormattingContext {
    /// The block containing this IFC; set when the container is finalized
    container: Option<BlockRef>,
    glyphs: Vec<u32>,
    metrics: Vec<GlyphMetrics>,
    line_boxes: Vec<LineBox>,
    inline_boxes: Vec<InlineBox>,
}

impl InlineFormattingContext {
    /// Create an empty IFC with its root inline box
    #[must_use]
    pub fn new() -> Self {
        Self {
            container: None,
            glyphs: Vec::new(),
            metrics: Vec::new(),
            line_boxes: Vec::new(),
            // The root inline box has no edges by definition
            inline_boxes: vec![InlineBox::default()],
        }
    }

    #[must_use]
    pub fn container(&self) -> Option<BlockRef> {
        self.container
    }

    pub fn set_container(&mut self, container: BlockRef) {
        self.container = Some(container);
    }

    /// Number of raw slots in the stream
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.glyphs.len()
    }

    #[must_use]
    pub fn metrics(&self, slot: usize) -> GlyphMetrics {
        self.metrics[slot]
    }

    pub fn metrics_mut(&mut self, slot: usize) -> &mut GlyphMetrics {
        &mut self.metrics[slot]
    }

    #[must_use]
    pub fn line_boxes(&self) -> &[LineBox] {
        &self.line_boxes
    }

    pub fn push_line_box(&mut self, line_box: LineBox) {
        self.line_boxes.push(line_box);
    }

    #[must_use]
    pub fn inline_boxes(&self) -> &[InlineBox] {
        &self.inline_boxes
    }

    #[must_use]
    pub fn inline_box(&self, index: InlineBoxIndex) -> &InlineBox {
        &self.inline_boxes[index.0 as usize]
    }

    pub fn push_inline_box(&mut self, inline_box: InlineBox) -> InlineBoxIndex {
        let index = InlineBoxIndex(self.inline_boxes.len() as u16);
        self.inline_boxes.push(inline_box);
        index
    }

    /// Append a glyph, escaping the reserved index 0
    pub fn push_glyph(&mut self, glyph: GlyphId, metrics: GlyphMetrics) {
        if glyph.0 == 0 {
            self.push_special(Special::zero_glyph(), metrics);
        } else {
            self.glyphs.push(glyph.0 as u32);
            self.metrics.push(metrics);
        }
    }

    /// Append a special marker: a sentinel slot carrying `metrics`,
    /// followed by the encoded marker
    pub fn push_special(&mut self, special: Special, metrics: GlyphMetrics) {
        self.glyphs.push(0);
        self.metrics.push(metrics);
        self.glyphs.push(special.encode());
        self.metrics.push(GlyphMetrics::default());
    }

    /// Decode the stream into `(first_slot, entry)` pairs
    pub fn slots(&self) -> impl Iterator<Item = (usize, GlyphSlot)> + '_ {
        let mut slot = 0;
        std::iter::from_fn(move || {
            let raw = *self.glyphs.get(slot)?;
            let first_slot = slot;
            let decoded = if raw == 0 {
                let marker = self.glyphs[slot + 1];
                slot += 2;
                GlyphSlot::Special(Special::decode(marker))
            } else {
                slot += 1;
                GlyphSlot::Glyph(GlyphId(raw as u16))
            };
            Some((first_slot, decoded))
        })
    }

    /// Decode the slots of one line box
    pub fn slots_in(&self, range: Range<usize>) -> impl Iterator<Item = (usize, GlyphSlot)> + '_ {
        self.slots()
            .skip_while(move |(slot, _)| *slot < range.start)
            .take_while(move |(slot, _)| *slot < range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(advance: i32) -> GlyphMetrics {
        GlyphMetrics {
            offset: Subpixels::ZERO,
            advance: Subpixels(advance),
            width: Subpixels(advance),
        }
    }

    #[test]
    fn special_encoding_is_kind_high_data_low() {
        let special = Special::inline_block(BlockIndex(7));
        let raw = special.encode();
        assert_eq!(raw >> 16, SpecialKind::InlineBlock as u32);
        assert_eq!(raw & 0xffff, 7);
        assert_eq!(Special::decode(raw), special);
    }

    #[test]
    fn glyph_zero_is_escaped() {
        let mut ifc = InlineFormattingContext::new();
        ifc.push_glyph(GlyphId(0), metrics(10));
        ifc.push_glyph(GlyphId(42), metrics(12));

        let decoded: Vec<GlyphSlot> = ifc.slots().map(|(_, slot)| slot).collect();
        assert_eq!(
            decoded,
            vec![
                GlyphSlot::Special(Special::zero_glyph()),
                GlyphSlot::Glyph(GlyphId(42)),
            ]
        );
        // the sentinel slot carries the glyph's metrics
        assert_eq!(ifc.metrics(0).advance, Subpixels(10));
        assert_eq!(ifc.slot_count(), 3);
    }

    #[test]
    fn every_ifc_has_a_root_inline_box() {
        let ifc = InlineFormattingContext::new();
        let root = ifc.inline_box(InlineBoxIndex::ROOT);
        assert_eq!(root.margin_start, Subpixels::ZERO);
        assert_eq!(root.border_start, Subpixels::ZERO);
        assert_eq!(root.padding_start, Subpixels::ZERO);
        assert_eq!(root.element, None);
    }
}
