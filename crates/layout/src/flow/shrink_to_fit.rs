//! Two-pass shrink-to-fit layout for auto-width inline-blocks
//!
//! Phase 1 walks the element subtree and builds an *object tree* of
//! width-unknown blocks, measuring every child's outer width bottom-up.
//! Children whose inline size is already definite do not propagate the
//! computation: they are laid out immediately into their own subtree and
//! contribute only their margin box width. Phase 2 walks the object tree
//! top-down, emits the real blocks with the now-known widths and splices
//! the pre-built subtrees in through proxies.

use math::Vec2D;

use crate::{
    box_tree::{
        BlockIndex, BlockKind, BlockRef, GeneratedBox, StackingContextId, StackingContextInfo,
        SubtreeId,
    },
    element_tree::{Category, ElementId},
    error::LayoutError,
    units::Subpixels,
};

use super::{
    add_block_to_flow,
    block::{self, RootMarginPolicy},
    finalize_block_height, inline, used_sizes,
    used_sizes::BlockUsedSizes,
    write_block_part1, BlockAppearance, ContainingBlock, LayoutContext,
};

/// An inline-block laid out into the host subtree, ready for line placement
pub(crate) struct InlineBlockResult {
    /// The inline-block's root block in the host subtree
    pub block: BlockIndex,
    /// Number of blocks appended to the host subtree
    pub skip: u16,
    pub margin_box_width: Subpixels,
    pub margin_box_height: Subpixels,
}

/// Lay out an inline-block against an available width
///
/// A definite inline size sidesteps the two phases entirely: the box is an
/// ordinary flow root whose auto margins are zero.
pub(crate) fn lay_out_inline_block(
    ctx: &mut LayoutContext<'_>,
    host_subtree: SubtreeId,
    element: ElementId,
    containing_block: ContainingBlock,
) -> Result<InlineBlockResult, LayoutError> {
    ctx.computer.set_current_element(element);
    let box_style = ctx.computer.box_style();
    let z_index = ctx.computer.z_index_style().z_index;
    let stacking = LayoutContext::stacking_info(&box_style, z_index, false);

    let used = solve_current_sizes(ctx, containing_block)?;
    if used.inline_size().is_some() {
        let result = block::lay_out_block_tree(
            ctx,
            host_subtree,
            element,
            containing_block,
            RootMarginPolicy::AutoIsZero,
            stacking,
        )?;
        return Ok(measure_result(ctx, host_subtree, result.block, result.skip));
    }

    let objects = build_object_tree(ctx, host_subtree, element, used, stacking, containing_block)?;
    realize_object_tree(ctx, host_subtree, &objects)
}

fn measure_result(
    ctx: &LayoutContext<'_>,
    subtree: SubtreeId,
    block: BlockIndex,
    skip: u16,
) -> InlineBlockResult {
    let tree = ctx.box_tree.subtree(subtree);
    let margins = tree.margins(block);
    let offsets = tree.box_offsets(block);
    InlineBlockResult {
        block,
        skip,
        margin_box_width: offsets.border_size.width + margins.horizontal_sum(),
        margin_box_height: offsets.border_size.height + margins.vertical_sum(),
    }
}

fn solve_current_sizes(
    ctx: &mut LayoutContext<'_>,
    containing_block: ContainingBlock,
) -> Result<BlockUsedSizes, LayoutError> {
    let widths = ctx.computer.content_width();
    let heights = ctx.computer.content_height();
    let horizontal = ctx.computer.horizontal_edges();
    let vertical = ctx.computer.vertical_edges();
    let styles = ctx.computer.border_styles();
    used_sizes::solve_used_sizes(&widths, &heights, &horizontal, &vertical, &styles, containing_block)
}

/// One node of the intermediate object tree, in pre-order with skips
struct Object {
    skip: u16,
    element: ElementId,
    data: ObjectData,
}

enum ObjectData {
    /// A block whose width phase 1 determines; realized in phase 2
    FlowStf {
        used: BlockUsedSizes,
        appearance: BlockAppearance,
        /// Created in phase 1 so paint order nests correctly; the block
        /// reference is fixed up when the block is emitted
        stacking_id: Option<StackingContextId>,
    },
    /// A definite-width block already laid out into its own subtree
    FlowNormal {
        subtree: SubtreeId,
        root_block: BlockIndex,
        /// The root's used sizes with auto-margin tags intact; phase 2
        /// re-resolves them against the real containing block
        used: BlockUsedSizes,
    },
    /// An inline run already laid out into its own subtree
    Ifc {
        subtree: SubtreeId,
        container: BlockIndex,
        height: Subpixels,
    },
}

struct BuildFrame {
    object: usize,
    element: ElementId,
    subtree_end: u16,
    /// Max over children of their outer widths so far
    auto_width: Subpixels,
    /// Available width for this box's children
    available: Subpixels,
    /// Definite content height of this box, for child percentages
    height_context: Option<Subpixels>,
    registered_absolute_container: bool,
}

/// Phase 1: measure bottom-up, laying out definite-width children and
/// inline runs immediately
fn build_object_tree(
    ctx: &mut LayoutContext<'_>,
    host_subtree: SubtreeId,
    root_element: ElementId,
    root_used: BlockUsedSizes,
    root_stacking: StackingContextInfo,
    containing_block: ContainingBlock,
) -> Result<Vec<Object>, LayoutError> {
    let mut objects: Vec<Object> = Vec::new();
    let mut frames: Vec<BuildFrame> = Vec::new();

    open_stf_object(
        ctx,
        host_subtree,
        root_element,
        root_used,
        root_stacking,
        containing_block,
        containing_block.width(),
        &mut objects,
        &mut frames,
    )?;

    let mut cursor = ctx.element_tree.first_child(root_element);
    loop {
        match cursor {
            Some(element) => {
                let frame = frames.last().expect("a frame is always open");
                let subtree_end = frame.subtree_end;
                let available = frame.available;
                let height_context = frame.height_context;

                if ctx.element_tree.category_of(element) == Category::Text {
                    cursor = build_ifc_object(ctx, element, subtree_end, available, &mut objects, &mut frames)?;
                    continue;
                }

                ctx.computer.set_current_element(element);
                let box_style = ctx.computer.box_style();
                if box_style.display.is_none() {
                    cursor = ctx.element_tree.next_sibling(element, subtree_end);
                    continue;
                }
                LayoutContext::check_unsupported(&box_style)?;

                if box_style.display.is_inline_level() {
                    cursor = build_ifc_object(ctx, element, subtree_end, available, &mut objects, &mut frames)?;
                    continue;
                }

                // A block-level child
                let child_cb =
                    ContainingBlock::new(available).with_optional_height(height_context);
                let used = solve_current_sizes(ctx, child_cb)?;
                let z_index = ctx.computer.z_index_style().z_index;
                let stacking = LayoutContext::stacking_info(&box_style, z_index, false);

                if used.inline_size().is_some() {
                    // Definite width: lay out now, in isolation
                    let subtree = ctx.box_tree.new_subtree(None)?;
                    let result = block::lay_out_block_tree(
                        ctx,
                        subtree,
                        element,
                        child_cb,
                        RootMarginPolicy::AutoIsZero,
                        stacking,
                    )?;
                    let outer = result.used.outer_inline_size();
                    objects.push(Object {
                        skip: 1,
                        element,
                        data: ObjectData::FlowNormal {
                            subtree,
                            root_block: result.block,
                            used: result.used,
                        },
                    });
                    let frame = frames.last_mut().expect("a frame is always open");
                    frame.auto_width = frame.auto_width.max(outer);
                    cursor = ctx.element_tree.next_sibling(element, subtree_end);
                } else {
                    open_stf_object(
                        ctx,
                        host_subtree,
                        element,
                        used,
                        stacking,
                        child_cb,
                        available,
                        &mut objects,
                        &mut frames,
                    )?;
                    cursor = ctx.element_tree.first_child(element);
                }
            },
            None => {
                let frame = frames.pop().expect("a frame is always open");
                objects[frame.object].skip = (objects.len() - frame.object) as u16;

                ctx.box_tree.stacking_contexts_mut().pop();
                ctx.computer.pop_element();
                if frame.registered_absolute_container {
                    ctx.absolute_containers.pop();
                }

                let ObjectData::FlowStf { used, .. } = &mut objects[frame.object].data else {
                    unreachable!("phase 1 frames always sit on flow objects");
                };
                used.set_inline_size(used.clamp_inline(frame.auto_width));
                let outer = used.outer_inline_size();

                match frames.last_mut() {
                    Some(parent) => {
                        parent.auto_width = parent.auto_width.max(outer);
                        cursor = ctx
                            .element_tree
                            .next_sibling(frame.element, parent.subtree_end);
                    },
                    None => return Ok(objects),
                }
            },
        }
    }
}

/// Enter a width-unknown block in phase 1: create its stacking scope and
/// style scope, record its object
#[allow(clippy::too_many_arguments)]
fn open_stf_object(
    ctx: &mut LayoutContext<'_>,
    host_subtree: SubtreeId,
    element: ElementId,
    used: BlockUsedSizes,
    stacking: StackingContextInfo,
    containing_block: ContainingBlock,
    parent_available: Subpixels,
    objects: &mut Vec<Object>,
    frames: &mut Vec<BuildFrame>,
) -> Result<(), LayoutError> {
    let appearance = ctx.resolve_appearance(containing_block);

    // The block does not exist yet; the reference is patched in phase 2
    let placeholder = BlockRef {
        subtree: host_subtree,
        index: BlockIndex(0),
    };
    let stacking_id = ctx.box_tree.stacking_contexts_mut().push(stacking, placeholder)?;

    let registered_absolute_container = ctx.computer.box_style().position.is_positioned();
    if registered_absolute_container {
        ctx.absolute_containers.push(placeholder);
    }
    ctx.computer.push_element();

    let margins = used.margin_inline_start().unwrap_or(Subpixels::ZERO)
        + used.margin_inline_end().unwrap_or(Subpixels::ZERO);
    let available = (parent_available - used.inline_edge_sum() - margins).max(Subpixels::ZERO);
    let height_context = used.block_size().map(|size| used.clamp_block(size));

    let object = objects.len();
    objects.push(Object {
        skip: 1,
        element,
        data: ObjectData::FlowStf {
            used,
            appearance,
            stacking_id,
        },
    });
    frames.push(BuildFrame {
        object,
        element,
        subtree_end: ctx.element_tree.subtree_end(element),
        auto_width: Subpixels::ZERO,
        available,
        height_context,
        registered_absolute_container,
    });
    Ok(())
}

/// Lay out an inline run in phase 1, into its own subtree
///
/// The run is split against the current available width; its longest line
/// is the run's width contribution. Returns the element after the run.
fn build_ifc_object(
    ctx: &mut LayoutContext<'_>,
    first: ElementId,
    run_end: u16,
    available: Subpixels,
    objects: &mut Vec<Object>,
    frames: &mut [BuildFrame],
) -> Result<Option<ElementId>, LayoutError> {
    let subtree = ctx.box_tree.new_subtree(None)?;
    let ifc = ctx.box_tree.new_ifc()?;
    let container = ctx
        .box_tree
        .subtree_mut(subtree)
        .push_block(BlockKind::IfcContainer { ifc })?;
    ctx.box_tree.stacking_contexts_mut().register_ifc(ifc);

    let result = inline::lay_out_inline_run(
        ctx,
        subtree,
        ifc,
        first,
        run_end,
        ContainingBlock::new(available),
    )?;

    let container_ref = BlockRef {
        subtree,
        index: container,
    };
    ctx.box_tree.ifc_mut(ifc).set_container(container_ref);
    {
        let tree = ctx.box_tree.subtree_mut(subtree);
        tree.set_skip(container, 1 + result.total_inline_block_skip);
        let offsets = tree.box_offsets_mut(container);
        offsets.content_size.height = result.height;
        offsets.border_size.height = result.height;
    }

    objects.push(Object {
        skip: 1,
        element: first,
        data: ObjectData::Ifc {
            subtree,
            container,
            height: result.height,
        },
    });
    let frame = frames.last_mut().expect("a frame is always open");
    frame.auto_width = frame.auto_width.max(result.longest_line);
    Ok(result.next_element)
}

struct RealizeFrame {
    end: usize,
    block: BlockIndex,
    skip: u16,
    auto_height: Subpixels,
    content_width: Subpixels,
    block_size: Option<Subpixels>,
    min_block_size: Subpixels,
    max_block_size: Subpixels,
}

/// Phase 2: emit the real blocks top-down with the widths phase 1 found
fn realize_object_tree(
    ctx: &mut LayoutContext<'_>,
    host_subtree: SubtreeId,
    objects: &[Object],
) -> Result<InlineBlockResult, LayoutError> {
    let ObjectData::FlowStf {
        used,
        appearance,
        stacking_id,
    } = &objects[0].data
    else {
        unreachable!("the object tree root is always a flow object");
    };

    // The root never stretches into its containing block
    let mut root_used = *used;
    used_sizes::resolve_margins_auto_is_zero(&mut root_used);
    let root_block = emit_stf_block(
        ctx,
        host_subtree,
        objects[0].element,
        &root_used,
        appearance,
        *stacking_id,
    )?;

    let mut frames = vec![RealizeFrame {
        end: objects[0].skip as usize,
        block: root_block,
        skip: 1,
        auto_height: Subpixels::ZERO,
        content_width: root_used.inline_size().unwrap_or(Subpixels::ZERO),
        block_size: root_used.block_size(),
        min_block_size: root_used.min_block_size,
        max_block_size: root_used.max_block_size,
    }];

    let mut result = None;
    let mut index = 1;
    loop {
        while frames.last().is_some_and(|frame| frame.end == index) {
            let frame = frames.pop().expect("frame checked above");
            let content_height = frame
                .block_size
                .unwrap_or(frame.auto_height)
                .clamp(frame.min_block_size, frame.max_block_size);
            finalize_block_height(
                &mut ctx.box_tree,
                host_subtree,
                frame.block,
                frame.skip,
                content_height,
            );
            match frames.last_mut() {
                Some(parent) => {
                    parent.skip += frame.skip;
                    parent.auto_height = add_block_to_flow(
                        &mut ctx.box_tree,
                        host_subtree,
                        frame.block,
                        parent.auto_height,
                    )?;
                },
                None => {
                    result = Some(measure_result(ctx, host_subtree, frame.block, frame.skip));
                },
            }
        }
        if index >= objects.len() {
            break;
        }

        let object = &objects[index];
        let parent_width = frames
            .last()
            .map(|frame| frame.content_width)
            .unwrap_or(Subpixels::ZERO);
        match &object.data {
            ObjectData::FlowStf {
                used,
                appearance,
                stacking_id,
            } => {
                let mut used = *used;
                used_sizes::resolve_inline_axis(&mut used, parent_width);
                let block =
                    emit_stf_block(ctx, host_subtree, object.element, &used, appearance, *stacking_id)?;
                frames.push(RealizeFrame {
                    end: index + object.skip as usize,
                    block,
                    skip: 1,
                    auto_height: Subpixels::ZERO,
                    content_width: used.inline_size().unwrap_or(Subpixels::ZERO),
                    block_size: used.block_size(),
                    min_block_size: used.min_block_size,
                    max_block_size: used.max_block_size,
                });
            },
            ObjectData::FlowNormal {
                subtree,
                root_block,
                used,
            } => {
                let proxy = ctx
                    .box_tree
                    .subtree_mut(host_subtree)
                    .push_block(BlockKind::SubtreeProxy { subtree: *subtree })?;
                ctx.box_tree.set_subtree_parent(
                    *subtree,
                    BlockRef {
                        subtree: host_subtree,
                        index: proxy,
                    },
                );

                // Margins were deferred in phase 1; the real containing
                // block is known now
                let mut used = *used;
                used_sizes::resolve_inline_axis(&mut used, parent_width);
                {
                    let tree = ctx.box_tree.subtree_mut(*subtree);
                    let mut margins = tree.margins(*root_block);
                    margins.left = used.margin_inline_start().unwrap_or(Subpixels::ZERO);
                    margins.right = used.margin_inline_end().unwrap_or(Subpixels::ZERO);
                    tree.set_margins(*root_block, margins);
                    tree.box_offsets_mut(*root_block).border_pos.x = margins.left;
                }

                let parent = frames.last_mut().expect("a parent frame is open");
                parent.skip += 1;
                parent.auto_height = add_block_to_flow(
                    &mut ctx.box_tree,
                    *subtree,
                    *root_block,
                    parent.auto_height,
                )?;
            },
            ObjectData::Ifc {
                subtree,
                container,
                height,
            } => {
                let proxy = ctx
                    .box_tree
                    .subtree_mut(host_subtree)
                    .push_block(BlockKind::SubtreeProxy { subtree: *subtree })?;
                ctx.box_tree.set_subtree_parent(
                    *subtree,
                    BlockRef {
                        subtree: host_subtree,
                        index: proxy,
                    },
                );

                let parent = frames.last_mut().expect("a parent frame is open");
                {
                    let tree = ctx.box_tree.subtree_mut(*subtree);
                    let offsets = tree.box_offsets_mut(*container);
                    offsets.border_pos = Vec2D {
                        x: Subpixels::ZERO,
                        y: parent.auto_height,
                    };
                    offsets.content_size.width = parent.content_width;
                    offsets.border_size.width = parent.content_width;
                }
                parent.skip += 1;
                parent.auto_height = parent
                    .auto_height
                    .checked_add(*height)
                    .ok_or(LayoutError::Overflow)?;
            },
        }
        index += 1;
    }

    Ok(result.expect("the object tree root is always realized"))
}

/// Emit one phase-2 block with part-1 data and patch its stacking context
fn emit_stf_block(
    ctx: &mut LayoutContext<'_>,
    host_subtree: SubtreeId,
    element: ElementId,
    used: &BlockUsedSizes,
    appearance: &BlockAppearance,
    stacking_id: Option<StackingContextId>,
) -> Result<BlockIndex, LayoutError> {
    let block = ctx
        .box_tree
        .subtree_mut(host_subtree)
        .push_block(BlockKind::Block {
            stacking_context: stacking_id,
        })?;
    let block_ref = BlockRef {
        subtree: host_subtree,
        index: block,
    };
    if let Some(id) = stacking_id {
        ctx.box_tree.stacking_contexts_mut().fixup(id, block_ref);
    }
    write_block_part1(&mut ctx.box_tree, host_subtree, block, used, appearance);
    ctx.box_tree
        .map_element_to_box(element, GeneratedBox::BlockBox(block_ref));
    Ok(block)
}
