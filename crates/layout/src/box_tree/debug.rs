//! Indented debug dumps of the box tree
//!
//! The skip columns are the only structure there is, so the dump doubles as
//! a sanity check: if skips lie, the indentation shows it immediately.

use std::fmt;

use super::{BlockIndex, BlockKind, BoxTree, SubtreeId};

struct TreeFormatter<'a, 'b> {
    formatter: &'a mut fmt::Formatter<'b>,
    indent: usize,
}

impl TreeFormatter<'_, '_> {
    fn indent(&mut self) -> fmt::Result {
        write!(self.formatter, "{}", "  ".repeat(self.indent))
    }

    fn increase_indent(&mut self) {
        self.indent += 1;
    }

    fn decrease_indent(&mut self) {
        self.indent -= 1;
    }
}

impl BoxTree {
    fn fmt_subtree(
        &self,
        formatter: &mut TreeFormatter<'_, '_>,
        id: SubtreeId,
    ) -> fmt::Result {
        let subtree = self.subtree(id);
        let mut index = 0;
        // nesting is tracked through the pre-order ends of open subtrees
        let mut open_ends: Vec<usize> = Vec::new();

        while index < subtree.len() {
            while open_ends.last().is_some_and(|&end| index >= end) {
                open_ends.pop();
                formatter.decrease_indent();
            }

            let block = BlockIndex(index as u16);
            let offsets = subtree.box_offsets(block);
            formatter.indent()?;
            match subtree.kind(block) {
                BlockKind::Block { stacking_context } => {
                    write!(formatter.formatter, "Block")?;
                    if let Some(id) = stacking_context {
                        write!(formatter.formatter, " (stacking context {})", id.0)?;
                    }
                },
                BlockKind::IfcContainer { ifc } => {
                    write!(formatter.formatter, "Ifc Container (ifc {})", ifc.0)?;
                },
                BlockKind::SubtreeProxy { subtree } => {
                    write!(formatter.formatter, "Subtree Proxy (subtree {})", subtree.0)?;
                },
            }
            writeln!(
                formatter.formatter,
                " @ ({}, {}) {}x{}",
                offsets.border_pos.x.0,
                offsets.border_pos.y.0,
                offsets.border_size.width.0,
                offsets.border_size.height.0,
            )?;

            if let BlockKind::SubtreeProxy { subtree: child } = subtree.kind(block) {
                formatter.increase_indent();
                self.fmt_subtree(formatter, child)?;
                formatter.decrease_indent();
            }

            let skip = subtree.skip(block) as usize;
            if skip > 1 {
                open_ends.push(index + skip);
                formatter.increase_indent();
            }
            index += 1;
        }

        while open_ends.pop().is_some() {
            formatter.decrease_indent();
        }
        Ok(())
    }
}

impl fmt::Debug for BoxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tree_formatter = TreeFormatter {
            formatter: f,
            indent: 0,
        };
        writeln!(tree_formatter.formatter, "Box Tree")?;
        if self.subtree_count() > 0 {
            tree_formatter.increase_indent();
            self.fmt_subtree(&mut tree_formatter, SubtreeId(0))?;
            tree_formatter.decrease_indent();
        }

        writeln!(tree_formatter.formatter, "Stacking Contexts")?;
        let stacking = self.stacking_contexts();
        let mut open_ends: Vec<usize> = Vec::new();
        for (index, context) in stacking.contexts().iter().enumerate() {
            while open_ends.last().is_some_and(|&end| index >= end) {
                open_ends.pop();
                tree_formatter.decrease_indent();
            }
            tree_formatter.indent()?;
            writeln!(
                tree_formatter.formatter,
                "z={} block=({}, {})",
                context.z_index, context.block.subtree.0, context.block.index.0,
            )?;
            let skip = stacking.skip(index) as usize;
            if skip > 1 {
                open_ends.push(index + skip);
                tree_formatter.increase_indent();
            }
        }
        Ok(())
    }
}
