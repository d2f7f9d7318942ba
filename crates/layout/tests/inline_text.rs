//! Inline formatting: glyph streams, line splitting and baselines

mod common;

use common::*;

use layout::box_tree::{BlockKind, GeneratedBox, GlyphSlot, IfcId, InlineBoxIndex, SpecialKind};
use layout::element_tree::ElementTreeBuilder;
use layout::images::NoImages;
use layout::properties::{
    Cascaded, CascadedHorizontalEdges, CascadedValueStore,
};
use layout::values::{AutoOr, Display, LengthPercentage, LineStyle, LineWidth};
use layout::{do_layout, Subpixels};

#[test]
fn text_wraps_greedily_at_the_available_width() {
    // 40px wide container; "aaaa bbbb" at 8px per glyph becomes two lines
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    builder.text("aaaa bbbb").unwrap();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());
    store.content_width.insert(root, width_px(40));

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    let ifc = tree.ifc(IfcId(0));
    assert_eq!(ifc.slot_count(), 9);

    let lines = ifc.line_boxes();
    assert_eq!(lines.len(), 2);
    // ascender 12px, descender 4px, no line gap: 16px per line
    assert_eq!(lines[0].baseline, px(12));
    assert_eq!(lines[1].baseline, px(28));
    assert_eq!(lines[0].range, 0..5);
    assert_eq!(lines[1].range, 5..9);
    assert_eq!(lines[0].first_inline_box, InlineBoxIndex::ROOT);

    // the container is as tall as both lines
    let root_ref = match tree.generated_box(root) {
        Some(GeneratedBox::BlockBox(block_ref)) => block_ref,
        other => panic!("expected block box, got {other:?}"),
    };
    let columns = tree.subtree(root_ref.subtree);
    assert_eq!(columns.box_offsets(root_ref.index).content_size.height, px(32));

    // the container entry sits right below the root block
    let container = layout::box_tree::BlockIndex(root_ref.index.0 + 1);
    assert!(matches!(
        columns.kind(container),
        BlockKind::IfcContainer { ifc } if ifc == IfcId(0)
    ));
    assert_eq!(columns.box_offsets(container).content_size.height, px(32));
}

#[test]
fn whitespace_collapses_across_text_elements() {
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    builder.text("  a\n").unwrap();
    builder.text("\t b").unwrap();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    // leading whitespace disappears, the interior run collapses to one
    // space: "a b"
    let ifc = tree.ifc(IfcId(0));
    let glyphs: Vec<u16> = ifc
        .slots()
        .filter_map(|(_, slot)| match slot {
            GlyphSlot::Glyph(glyph) => Some(glyph.0),
            GlyphSlot::Special(_) => None,
        })
        .collect();
    assert_eq!(glyphs, vec![b'a' as u16, b' ' as u16, b'b' as u16]);
}

#[test]
fn inline_boxes_carry_their_edges_into_the_stream() {
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    let span = builder.open_element().unwrap();
    builder.text("aa").unwrap();
    builder.close_element();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());
    store.box_style.insert(
        span,
        layout::properties::CascadedBoxStyle {
            display: Cascaded::Value(Display::Inline),
            ..layout::properties::CascadedBoxStyle::default()
        },
    );
    store.horizontal_edges.insert(
        span,
        CascadedHorizontalEdges {
            margin_left: Cascaded::Value(AutoOr::NotAuto(LengthPercentage::pixels(2))),
            border_left: Cascaded::Value(LineWidth::Length(px(1))),
            padding_left: Cascaded::Value(LengthPercentage::pixels(3)),
            padding_right: Cascaded::Value(LengthPercentage::pixels(4)),
            ..CascadedHorizontalEdges::default()
        },
    );
    store.border_styles.insert(
        span,
        layout::properties::CascadedBorderStyles {
            left: Cascaded::Value(LineStyle::Solid),
            ..layout::properties::CascadedBorderStyles::default()
        },
    );

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    let ifc = tree.ifc(IfcId(0));
    let entries: Vec<GlyphSlot> = ifc.slots().map(|(_, slot)| slot).collect();
    assert_eq!(entries.len(), 4, "box start, two glyphs, box end");
    let GlyphSlot::Special(start) = entries[0] else {
        panic!("expected a box start marker");
    };
    assert_eq!(start.kind, SpecialKind::BoxStart);
    let GlyphSlot::Special(end) = entries[3] else {
        panic!("expected a box end marker");
    };
    assert_eq!(end.kind, SpecialKind::BoxEnd);

    // the sentinel slot of the start marker advances by the leading edges
    assert_eq!(ifc.metrics(0).advance, px(2 + 1 + 3));
    // the end marker advances by the trailing edges (padding only here)
    let (end_slot, _) = ifc
        .slots()
        .find(|(_, slot)| matches!(slot, GlyphSlot::Special(s) if s.kind == SpecialKind::BoxEnd))
        .unwrap();
    assert_eq!(ifc.metrics(end_slot).advance, px(4));

    // the inline box is recorded with its edges and the element maps to it
    let index = InlineBoxIndex(start.data);
    let inline_box = ifc.inline_box(index);
    assert_eq!(inline_box.margin_start, px(2));
    assert_eq!(inline_box.border_start, px(1));
    assert_eq!(inline_box.padding_start, px(3));
    assert_eq!(inline_box.padding_end, px(4));
    assert_eq!(
        tree.generated_box(span),
        Some(GeneratedBox::InlineBox {
            ifc: IfcId(0),
            index,
        })
    );
}

#[test]
fn inline_blocks_sit_on_the_baseline() {
    // "aa" (16px tall line) next to a 10x10 inline-block: the block's
    // bottom margin edge rests on the baseline
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    builder.text("aa").unwrap();
    let inline_block = builder.open_element().unwrap();
    builder.close_element();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());
    store.box_style.insert(inline_block, inline_block_style());
    store.content_width.insert(inline_block, width_px(10));
    store.content_height.insert(inline_block, height_px(10));

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    let block_ref = match tree.generated_box(inline_block) {
        Some(GeneratedBox::BlockBox(block_ref)) => block_ref,
        other => panic!("expected block box, got {other:?}"),
    };
    let offsets = tree.subtree(block_ref.subtree).box_offsets(block_ref.index);
    // two glyphs advance 16px before the block
    assert_eq!(offsets.border_pos.x, px(16));
    // baseline at 12px, block is 10px tall
    assert_eq!(offsets.border_pos.y, px(2));

    check_skip_integrity(&tree);
}

#[test]
fn whitespace_only_text_produces_an_empty_context() {
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    let text = builder.text("   \n\t").unwrap();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    let ifc = tree.ifc(IfcId(0));
    assert_eq!(ifc.slot_count(), 0);
    assert!(ifc.line_boxes().is_empty());
    assert_eq!(tree.generated_box(text), Some(GeneratedBox::Text));

    let root_ref = match tree.generated_box(root) {
        Some(GeneratedBox::BlockBox(block_ref)) => block_ref,
        other => panic!("expected block box, got {other:?}"),
    };
    assert_eq!(
        tree.subtree(root_ref.subtree)
            .box_offsets(root_ref.index)
            .content_size
            .height,
        Subpixels::ZERO
    );
}
