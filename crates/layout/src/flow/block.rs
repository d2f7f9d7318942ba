//! The normal-flow block layout engine
//!
//! An iterative pre-order walk over the element tree. Each frame is one
//! open block box whose children are still being placed; geometry is
//! written in two visits of the same frame (part 1 before the children,
//! part 2 when the frame pops and the auto height is known).

use crate::{
    box_tree::{
        BlockIndex, BlockKind, BlockRef, BoxOffsets, GeneratedBox, StackingContextInfo, SubtreeId,
    },
    element_tree::{Category, ElementId},
    error::LayoutError,
    units::Subpixels,
};

use math::{Size, Vec2D};

use super::{
    add_block_to_flow, finalize_block_height, inline, used_sizes,
    used_sizes::BlockUsedSizes, write_block_part1, ContainingBlock, LayoutContext,
};

/// How auto margins of the subtree's root block resolve
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RootMarginPolicy {
    /// Ordinary in-flow behavior: the §10.3.3 equality applies
    Flow,
    /// The box never stretches, auto margins are zero (inline-blocks and
    /// blocks laid out before their containing block width is known)
    AutoIsZero,
}

/// Outcome of laying out one block subtree
pub(crate) struct BlockTreeResult {
    pub block: BlockIndex,
    pub skip: u16,
    /// The root's used sizes with auto tags intact, for callers that
    /// re-resolve margins once the real containing block is known
    pub used: BlockUsedSizes,
}

struct Frame {
    element: ElementId,
    subtree_end: u16,
    block: BlockIndex,
    skip: u16,
    auto_height: Subpixels,
    block_size: Option<Subpixels>,
    min_block_size: Subpixels,
    max_block_size: Subpixels,
    child_cb: ContainingBlock,
    registered_absolute_container: bool,
}

/// Lay out `root_element` and its subtree as the root block of `subtree`
///
/// The caller decides the stacking participation of the root and how its
/// auto margins resolve; everything below the root follows ordinary flow
/// rules.
pub(crate) fn lay_out_block_tree(
    ctx: &mut LayoutContext<'_>,
    subtree: SubtreeId,
    root_element: ElementId,
    containing_block: ContainingBlock,
    root_margins: RootMarginPolicy,
    root_stacking: StackingContextInfo,
) -> Result<BlockTreeResult, LayoutError> {
    ctx.computer.set_current_element(root_element);

    let mut used = solve_current_sizes(ctx, containing_block)?;
    match root_margins {
        RootMarginPolicy::Flow => used_sizes::resolve_inline_axis(&mut used, containing_block.width()),
        RootMarginPolicy::AutoIsZero => used_sizes::resolve_margins_auto_is_zero(&mut used),
    }
    let root_used = used;

    let mut frames: Vec<Frame> = Vec::new();
    let root_block = open_block(ctx, subtree, root_element, &used, containing_block, root_stacking, &mut frames)?;

    let mut cursor = match ctx.element_tree.category_of(root_element) {
        Category::Element => ctx.element_tree.first_child(root_element),
        // A lone text root renders as a block wrapping its own text; hand
        // the element itself to the inline builder
        Category::Text => {
            let frame = frames.last_mut().expect("root frame exists");
            let run_end = ctx.element_tree.subtree_end(root_element);
            lay_out_inline_run_into(ctx, subtree, root_element, run_end, frame_parts(frame))
                .map(|(next, _)| next)?
        },
    };

    loop {
        match cursor {
            Some(element) => {
                let frame = frames.last().expect("a frame is always open");
                let subtree_end = frame.subtree_end;

                if ctx.element_tree.category_of(element) == Category::Text {
                    let frame = frames.last_mut().expect("a frame is always open");
                    let (next, _) =
                        lay_out_inline_run_into(ctx, subtree, element, subtree_end, frame_parts(frame))?;
                    cursor = next;
                    continue;
                }

                ctx.computer.set_current_element(element);
                let box_style = ctx.computer.box_style();
                let display = LayoutContext::effective_display(box_style.display, false);

                if display.is_none() {
                    cursor = ctx.element_tree.next_sibling(element, subtree_end);
                    continue;
                }
                LayoutContext::check_unsupported(&box_style)?;

                if display.is_inline_level() {
                    let frame = frames.last_mut().expect("a frame is always open");
                    let (next, _) =
                        lay_out_inline_run_into(ctx, subtree, element, subtree_end, frame_parts(frame))?;
                    cursor = next;
                    continue;
                }

                // An ordinary block child
                let child_cb = frames.last().expect("a frame is always open").child_cb;
                let mut used = solve_current_sizes(ctx, child_cb)?;
                used_sizes::resolve_inline_axis(&mut used, child_cb.width());
                let z_index = ctx.computer.z_index_style().z_index;
                let stacking = LayoutContext::stacking_info(&box_style, z_index, false);
                open_block(ctx, subtree, element, &used, child_cb, stacking, &mut frames)?;
                cursor = ctx.element_tree.first_child(element);
            },
            None => {
                let frame = frames.pop().expect("a frame is always open");
                let content_height = frame
                    .block_size
                    .unwrap_or(frame.auto_height)
                    .clamp(frame.min_block_size, frame.max_block_size);
                finalize_block_height(
                    &mut ctx.box_tree,
                    subtree,
                    frame.block,
                    frame.skip,
                    content_height,
                );
                ctx.computer.pop_element();
                ctx.box_tree.stacking_contexts_mut().pop();
                if frame.registered_absolute_container {
                    ctx.absolute_containers.pop();
                }

                match frames.last_mut() {
                    Some(parent) => {
                        parent.skip += frame.skip;
                        parent.auto_height = add_block_to_flow(
                            &mut ctx.box_tree,
                            subtree,
                            frame.block,
                            parent.auto_height,
                        )?;
                        cursor = ctx
                            .element_tree
                            .next_sibling(frame.element, parent.subtree_end);
                    },
                    None => {
                        if root_margins == RootMarginPolicy::Flow {
                            // In-flow roots are placed here; deferred roots
                            // get their relative offset when their caller
                            // positions them
                            let insets = ctx.box_tree.subtree(subtree).insets(frame.block);
                            ctx.box_tree
                                .subtree_mut(subtree)
                                .box_offsets_mut(frame.block)
                                .border_pos += insets;
                        }
                        return Ok(BlockTreeResult {
                            block: root_block,
                            skip: frame.skip,
                            used: root_used,
                        });
                    },
                }
            },
        }
    }
}

/// Solve the used sizes of the element currently set on the style computer
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

/// The part-1 visit of a block: allocate it, enter its scopes, stage its
/// geometry and open its frame
fn open_block(
    ctx: &mut LayoutContext<'_>,
    subtree: SubtreeId,
    element: ElementId,
    used: &BlockUsedSizes,
    containing_block: ContainingBlock,
    stacking: StackingContextInfo,
    frames: &mut Vec<Frame>,
) -> Result<BlockIndex, LayoutError> {
    let appearance = ctx.resolve_appearance(containing_block);
    let block = ctx
        .box_tree
        .subtree_mut(subtree)
        .push_block(BlockKind::default())?;
    let block_ref = BlockRef {
        subtree,
        index: block,
    };

    let stacking_context = ctx.box_tree.stacking_contexts_mut().push(stacking, block_ref)?;
    ctx.box_tree
        .subtree_mut(subtree)
        .set_kind(block, BlockKind::Block { stacking_context });

    write_block_part1(&mut ctx.box_tree, subtree, block, used, &appearance);
    ctx.box_tree
        .map_element_to_box(element, GeneratedBox::BlockBox(block_ref));

    let registered_absolute_container = ctx.computer.box_style().position.is_positioned();
    if registered_absolute_container {
        ctx.absolute_containers.push(block_ref);
    }

    ctx.computer.push_element();

    let inline_size = used.inline_size().unwrap_or(Subpixels::ZERO);
    let definite_height = used.block_size().map(|size| used.clamp_block(size));
    frames.push(Frame {
        element,
        subtree_end: ctx.element_tree.subtree_end(element),
        block,
        skip: 1,
        auto_height: Subpixels::ZERO,
        block_size: used.block_size(),
        min_block_size: used.min_block_size,
        max_block_size: used.max_block_size,
        child_cb: ContainingBlock::new(inline_size).with_optional_height(definite_height),
        registered_absolute_container,
    });
    Ok(block)
}

/// Mutable pieces of a frame the inline run needs to advance
struct FrameParts<'f> {
    skip: &'f mut u16,
    auto_height: &'f mut Subpixels,
    child_cb: ContainingBlock,
}

fn frame_parts(frame: &mut Frame) -> FrameParts<'_> {
    FrameParts {
        skip: &mut frame.skip,
        auto_height: &mut frame.auto_height,
        child_cb: frame.child_cb,
    }
}

/// Reserve an IFC container, build the inline formatting context for the
/// run starting at `first`, then finalize the container entry
///
/// Returns the element after the run and the container block.
fn lay_out_inline_run_into(
    ctx: &mut LayoutContext<'_>,
    subtree: SubtreeId,
    first: ElementId,
    run_end: u16,
    frame: FrameParts<'_>,
) -> Result<(Option<ElementId>, BlockIndex), LayoutError> {
    let ifc = ctx.box_tree.new_ifc()?;
    // The container entry precedes the inline-block children the run will
    // append, keeping the columns in pre-order
    let container = ctx
        .box_tree
        .subtree_mut(subtree)
        .push_block(BlockKind::IfcContainer { ifc })?;
    ctx.box_tree.stacking_contexts_mut().register_ifc(ifc);

    let result = inline::lay_out_inline_run(ctx, subtree, ifc, first, run_end, frame.child_cb)?;

    let container_ref = BlockRef {
        subtree,
        index: container,
    };
    ctx.box_tree.ifc_mut(ifc).set_container(container_ref);

    let container_skip = 1 + result.total_inline_block_skip;
    let size = Size {
        width: frame.child_cb.width(),
        height: result.height,
    };
    {
        let subtree = ctx.box_tree.subtree_mut(subtree);
        subtree.set_skip(container, container_skip);
        *subtree.box_offsets_mut(container) = BoxOffsets {
            border_pos: Vec2D {
                x: Subpixels::ZERO,
                y: *frame.auto_height,
            },
            border_size: size,
            content_pos: Vec2D::default(),
            content_size: size,
        };
    }

    *frame.skip += container_skip;
    *frame.auto_height = frame
        .auto_height
        .checked_add(result.height)
        .ok_or(LayoutError::Overflow)?;

    Ok((result.next_element, container))
}
