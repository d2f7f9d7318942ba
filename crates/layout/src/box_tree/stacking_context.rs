//! The stacking context tree, maintained in paint order
//!
//! Contexts live in one skip-indexed array whose pre-order *is* paint
//! order: siblings sort by ascending z-index, ties keep document order.
//! Because a sibling's z-index is not known when its parent is pushed,
//! the array supports insertion; indices of later contexts shift, which is
//! why everything else refers to contexts by their stable
//! [StackingContextId].

use super::{BlockRef, IfcId};
use crate::error::LayoutError;

/// Stable identity of a stacking context, assigned at creation
///
/// Unlike the context's index, the id never changes as siblings insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StackingContextId(pub u16);

/// How a box participates in stacking
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackingContextInfo {
    /// The box creates no stacking context
    None,
    /// The box creates a stacking context that can host child contexts
    Parent(i32),
    /// The box is painted atomically at its z-index but cannot host child
    /// contexts; new contexts below it attach to its nearest parent-capable
    /// ancestor (`position: relative; z-index: auto`)
    NonParent(i32),
}

/// One entry of the stacking context tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackingContext {
    pub id: StackingContextId,
    pub z_index: i32,
    /// The block box that generated this context
    pub block: BlockRef,
    /// Inline formatting contexts painted as part of this context
    pub ifcs: Vec<IfcId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PushedTag {
    None,
    Parent,
    NonParent,
}

#[derive(Clone, Debug, Default)]
pub struct StackingContextTree {
    skips: Vec<u16>,
    contexts: Vec<StackingContext>,
    /// Indices of the parent-capable ancestors of the insertion point.
    /// Ancestors always precede their descendants, so these stay valid
    /// across insertions into the current subtree.
    parent_chain: Vec<usize>,
    pushed: Vec<PushedTag>,
    next_id: u16,
}

impl StackingContextTree {
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// All contexts in paint order, parallel to [skips](Self::skip)
    #[must_use]
    pub fn contexts(&self) -> &[StackingContext] {
        &self.contexts
    }

    #[must_use]
    pub fn skip(&self, index: usize) -> u16 {
        self.skips[index]
    }

    /// Enter the stacking scope of a box
    ///
    /// Returns the new context's id for [Parent](StackingContextInfo::Parent)
    /// and [NonParent](StackingContextInfo::NonParent) boxes. Every push must
    /// be matched by a [pop](Self::pop) when the box's subtree ends.
    pub fn push(
        &mut self,
        info: StackingContextInfo,
        block: BlockRef,
    ) -> Result<Option<StackingContextId>, LayoutError> {
        match info {
            StackingContextInfo::None => {
                self.pushed.push(PushedTag::None);
                Ok(None)
            },
            StackingContextInfo::Parent(z_index) => {
                let (index, id) = self.insert(z_index, block)?;
                self.pushed.push(PushedTag::Parent);
                self.parent_chain.push(index);
                Ok(Some(id))
            },
            StackingContextInfo::NonParent(z_index) => {
                let (_, id) = self.insert(z_index, block)?;
                self.pushed.push(PushedTag::NonParent);
                Ok(Some(id))
            },
        }
    }

    /// Leave the stacking scope entered by the matching [push](Self::push)
    pub fn pop(&mut self) {
        let tag = self
            .pushed
            .pop()
            .expect("unbalanced stacking context pop");
        if tag == PushedTag::Parent {
            self.parent_chain.pop();
        }
    }

    /// Patch the block reference of an already-allocated context
    ///
    /// Shrink-to-fit creates contexts before their blocks exist in the final
    /// subtree; this is not performance-critical, a scan is fine.
    pub fn fixup(&mut self, id: StackingContextId, block: BlockRef) {
        let context = self
            .contexts
            .iter_mut()
            .find(|context| context.id == id)
            .expect("fixup of unknown stacking context");
        context.block = block;
    }

    /// Register an inline formatting context with the innermost
    /// parent-capable context
    pub fn register_ifc(&mut self, ifc: IfcId) {
        let &index = self
            .parent_chain
            .last()
            .expect("no stacking context to register an IFC with");
        self.contexts[index].ifcs.push(ifc);
    }

    fn insert(
        &mut self,
        z_index: i32,
        block: BlockRef,
    ) -> Result<(usize, StackingContextId), LayoutError> {
        if self.contexts.len() >= u16::MAX as usize {
            return Err(LayoutError::Overflow);
        }
        self.contexts.try_reserve(1)?;
        self.skips.try_reserve(1)?;

        // Scan the current parent's children for the first sibling with a
        // strictly greater z-index; equal z-indices keep document order
        let (mut position, end) = match self.parent_chain.last() {
            Some(&parent) => (parent + 1, parent + self.skips[parent] as usize),
            None => (0, self.contexts.len()),
        };
        while position < end {
            if self.contexts[position].z_index > z_index {
                break;
            }
            position += self.skips[position] as usize;
        }

        let id = StackingContextId(self.next_id);
        self.next_id += 1;

        self.skips.insert(position, 1);
        self.contexts.insert(
            position,
            StackingContext {
                id,
                z_index,
                block,
                ifcs: Vec::new(),
            },
        );
        for &ancestor in &self.parent_chain {
            self.skips[ancestor] += 1;
        }

        Ok((position, id))
    }
}
