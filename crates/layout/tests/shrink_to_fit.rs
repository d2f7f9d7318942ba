//! Shrink-to-fit width scenarios for inline-blocks

mod common;

use common::*;

use layout::box_tree::{BlockIndex, BlockKind, GeneratedBox};
use layout::element_tree::{ElementId, ElementTreeBuilder};
use layout::images::NoImages;
use layout::properties::CascadedValueStore;
use layout::{do_layout, BoxTree};

fn block_ref(tree: &BoxTree, element: ElementId) -> layout::box_tree::BlockRef {
    match tree.generated_box(element) {
        Some(GeneratedBox::BlockBox(block_ref)) => block_ref,
        other => panic!("expected a block box for {element:?}, got {other:?}"),
    }
}

#[test]
fn auto_width_is_the_widest_child() {
    // S4: auto-width inline-block with 200px available, containing a text
    // run 73px long and a 150px block sibling
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    let inline_block = builder.open_element().unwrap();
    let text = builder.text("W").unwrap();
    let fixed = builder.open_element().unwrap();
    builder.close_element();
    builder.close_element();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());
    store.content_width.insert(root, width_px(200));
    store.box_style.insert(inline_block, inline_block_style());
    store.box_style.insert(fixed, block_style());
    store.content_width.insert(fixed, width_px(150));
    store.content_height.insert(fixed, height_px(30));

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    // the shrink-to-fit width is max(73, 150) = 150
    let stf_ref = block_ref(&tree, inline_block);
    let columns = tree.subtree(stf_ref.subtree);
    let offsets = columns.box_offsets(stf_ref.index);
    assert_eq!(offsets.content_size.width, px(150));

    // height: one 16px text line plus the 30px block
    assert_eq!(offsets.content_size.height, px(46));

    // the text run became its own element mapping
    assert_eq!(tree.generated_box(text), Some(GeneratedBox::Text));

    // the definite-width child was built in isolation and attached
    // through a proxy
    let fixed_ref = block_ref(&tree, fixed);
    assert_ne!(fixed_ref.subtree, stf_ref.subtree);
    let proxies: Vec<BlockIndex> = (0..columns.len())
        .map(|index| BlockIndex(index as u16))
        .filter(|&block| {
            matches!(
                columns.kind(block),
                BlockKind::SubtreeProxy { subtree } if subtree == fixed_ref.subtree
            )
        })
        .collect();
    assert_eq!(proxies.len(), 1, "exactly one proxy points at the child");
    assert_eq!(
        tree.subtree(fixed_ref.subtree).parent(),
        Some(layout::box_tree::BlockRef {
            subtree: stf_ref.subtree,
            index: proxies[0],
        })
    );

    // the fixed child's geometry
    let fixed_offsets = tree.subtree(fixed_ref.subtree).box_offsets(fixed_ref.index);
    assert_eq!(fixed_offsets.border_size.width, px(150));
    assert_eq!(fixed_offsets.border_size.height, px(30));

    check_skip_integrity(&tree);
}

#[test]
fn explicit_widths_lay_out_the_same_in_flow_and_shrink_to_fit() {
    // A 120x40 block must come out identical whether its parent is an
    // ordinary block or an auto-width inline-block
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    let flow_parent = builder.open_element().unwrap();
    let flow_child = builder.open_element().unwrap();
    builder.close_element();
    builder.close_element();
    let stf_parent = builder.open_element().unwrap();
    let stf_child = builder.open_element().unwrap();
    builder.close_element();
    builder.close_element();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());
    store.box_style.insert(flow_parent, block_style());
    store.box_style.insert(stf_parent, inline_block_style());
    for child in [flow_child, stf_child] {
        store.box_style.insert(child, block_style());
        store.content_width.insert(child, width_px(120));
        store.content_height.insert(child, height_px(40));
    }

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    let flow_ref = block_ref(&tree, flow_child);
    let stf_ref = block_ref(&tree, stf_child);
    let flow_offsets = tree.subtree(flow_ref.subtree).box_offsets(flow_ref.index);
    let stf_offsets = tree.subtree(stf_ref.subtree).box_offsets(stf_ref.index);

    assert_eq!(flow_offsets.content_size, stf_offsets.content_size);
    assert_eq!(flow_offsets.border_size, stf_offsets.border_size);

    // and the shrink-to-fit parent wraps the child exactly
    let parent_ref = block_ref(&tree, stf_parent);
    assert_eq!(
        tree.subtree(parent_ref.subtree)
            .box_offsets(parent_ref.index)
            .content_size
            .width,
        px(120)
    );

    check_skip_integrity(&tree);
}

#[test]
fn nested_inline_blocks_measure_through_their_lines() {
    // An auto inline-block whose only content is another inline-block of
    // definite width takes exactly that width
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    let outer = builder.open_element().unwrap();
    let inner = builder.open_element().unwrap();
    builder.close_element();
    builder.close_element();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());
    store.box_style.insert(outer, inline_block_style());
    store.box_style.insert(inner, inline_block_style());
    store.content_width.insert(inner, width_px(60));
    store.content_height.insert(inner, height_px(20));

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    let outer_ref = block_ref(&tree, outer);
    let outer_offsets = tree.subtree(outer_ref.subtree).box_offsets(outer_ref.index);
    assert_eq!(outer_offsets.content_size.width, px(60));
    assert_eq!(outer_offsets.content_size.height, px(20));

    check_skip_integrity(&tree);
}
