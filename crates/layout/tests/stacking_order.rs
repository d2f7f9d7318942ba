//! Paint-order scenarios for the stacking context tree

mod common;

use common::*;

use layout::box_tree::{GeneratedBox, IfcId};
use layout::element_tree::ElementTreeBuilder;
use layout::images::NoImages;
use layout::properties::{Cascaded, CascadedBoxStyle, CascadedValueStore, CascadedZIndexStyle};
use layout::values::{AutoOr, Display, Position};
use layout::do_layout;

fn relative_block(z_index: AutoOr<i32>) -> (CascadedBoxStyle, CascadedZIndexStyle) {
    (
        CascadedBoxStyle {
            display: Cascaded::Value(Display::Block),
            position: Cascaded::Value(Position::Relative),
            ..CascadedBoxStyle::default()
        },
        CascadedZIndexStyle {
            z_index: Cascaded::Value(z_index),
        },
    )
}

#[test]
fn siblings_paint_by_z_index_not_document_order() {
    // S5: three relative siblings with z-index 1, -1, 2
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    let first = builder.open_element().unwrap();
    builder.close_element();
    let second = builder.open_element().unwrap();
    builder.close_element();
    let third = builder.open_element().unwrap();
    builder.close_element();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());
    for (element, z_index) in [(first, 1), (second, -1), (third, 2)] {
        let (box_style, z) = relative_block(AutoOr::NotAuto(z_index));
        store.box_style.insert(element, box_style);
        store.z_index.insert(element, z);
    }

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    let contexts = tree.stacking_contexts();
    let z_order: Vec<i32> = contexts.contexts().iter().map(|c| c.z_index).collect();
    assert_eq!(z_order, vec![0, -1, 1, 2]);

    // each context points at the block of the right element
    let expect_block = |element| match tree.generated_box(element) {
        Some(GeneratedBox::BlockBox(block_ref)) => block_ref,
        other => panic!("expected block box, got {other:?}"),
    };
    assert_eq!(contexts.contexts()[1].block, expect_block(second));
    assert_eq!(contexts.contexts()[2].block, expect_block(first));
    assert_eq!(contexts.contexts()[3].block, expect_block(third));

    check_paint_order(&tree);
}

#[test]
fn non_parent_contexts_cannot_host_descendant_contexts() {
    // relative + z-index auto paints atomically but attaches its
    // descendants' contexts to the root
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    let non_parent = builder.open_element().unwrap();
    let nested = builder.open_element().unwrap();
    builder.close_element();
    builder.close_element();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());
    let (box_style, z) = relative_block(AutoOr::Auto);
    store.box_style.insert(non_parent, box_style);
    store.z_index.insert(non_parent, z);
    let (box_style, z) = relative_block(AutoOr::NotAuto(5));
    store.box_style.insert(nested, box_style);
    store.z_index.insert(nested, z);

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    let contexts = tree.stacking_contexts();
    assert_eq!(contexts.len(), 3);
    // the nested z:5 context is a sibling of the non-parent, under the root
    assert_eq!(contexts.skip(0), 3);
    assert_eq!(contexts.skip(1), 1);
    assert_eq!(contexts.skip(2), 1);
    let z_order: Vec<i32> = contexts.contexts().iter().map(|c| c.z_index).collect();
    assert_eq!(z_order, vec![0, 0, 5]);

    check_paint_order(&tree);
}

#[test]
fn inline_formatting_contexts_register_with_their_stacking_context() {
    let mut builder = ElementTreeBuilder::new();
    let root = builder.open_element().unwrap();
    builder.text("hello").unwrap();
    builder.close_element();
    let elements = builder.finish();

    let mut store = CascadedValueStore::new();
    store.box_style.insert(root, block_style());

    let tree = do_layout(&elements, &store, &TestFont, &NoImages, &viewport_800x600()).unwrap();

    let contexts = tree.stacking_contexts();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts.contexts()[0].ifcs, vec![IfcId(0)]);
}
