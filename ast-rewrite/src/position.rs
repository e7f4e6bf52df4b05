use crate::ast::{Ast, NodeRef};
use crate::modification::EditGroup;

/// Where a modification's text ends up.
///
/// Before the driver has produced any edit for the group this is the
/// original node's range; afterwards it is the range covered by the group's
/// edits, in original-file coordinates.
#[derive(Debug, Clone)]
pub struct TrackedNodePosition {
    group: EditGroup,
    node: NodeRef,
}

impl TrackedNodePosition {
    pub fn new(group: EditGroup, node: NodeRef) -> Self {
        Self { group, node }
    }

    pub fn node(&self) -> NodeRef {
        self.node
    }

    /// `(offset, length)`, or `None` when the group is still empty and the
    /// node has no location in `ast`.
    pub fn resolve(&self, ast: &Ast) -> Option<(usize, usize)> {
        if let Some(coverage) = self.group.coverage() {
            return Some(coverage);
        }
        let location = ast.node(self.node).ok()?.location()?;
        Some((location.offset, location.length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, TreeBuilder};
    use crate::change::TextEdit;

    #[test]
    fn test_falls_back_to_node_range_until_edits_exist() {
        let mut builder = TreeBuilder::new("x.c", "int a;\nint b;\n");
        builder.start_node(NodeKind::TranslationUnit, 0..14);
        let second = builder.leaf(NodeKind::SimpleDeclaration, 7..13);
        builder.finish_node();
        let ast = builder.finish().unwrap();

        let group = EditGroup::new("move");
        let position = TrackedNodePosition::new(group.clone(), second);
        assert_eq!(position.resolve(&ast), Some((7, 6)));

        group.add_edit(TextEdit::insert(0, "long c;\n"));
        group.add_edit(TextEdit::new(7, 6, ""));
        assert_eq!(position.resolve(&ast), Some((0, 13)));
    }
}
