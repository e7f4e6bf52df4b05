//! Modification records and the edit groups they report into.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::ast::NodeRef;
use crate::change::TextEdit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationKind {
    Replace,
    InsertBefore,
    AppendChild,
}

impl fmt::Display for ModificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModificationKind::Replace => write!(f, "replace"),
            ModificationKind::InsertBefore => write!(f, "insert-before"),
            ModificationKind::AppendChild => write!(f, "append-child"),
        }
    }
}

/// Identity of a modification, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModificationId(u64);

static NEXT_MODIFICATION_ID: AtomicU64 = AtomicU64::new(1);

impl ModificationId {
    fn next() -> Self {
        ModificationId(NEXT_MODIFICATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
struct GroupData {
    name: String,
    edits: Vec<TextEdit>,
}

/// Shared handle collecting the text edits produced for one or more
/// modifications. Clones refer to the same group.
#[derive(Debug, Clone, Default)]
pub struct EditGroup(Rc<RefCell<GroupData>>);

impl EditGroup {
    pub fn new(name: impl Into<String>) -> Self {
        EditGroup(Rc::new(RefCell::new(GroupData {
            name: name.into(),
            edits: Vec::new(),
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn add_edit(&self, edit: TextEdit) {
        self.0.borrow_mut().edits.push(edit);
    }

    pub fn edits(&self) -> Vec<TextEdit> {
        self.0.borrow().edits.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().edits.is_empty()
    }

    /// Smallest contiguous range `(offset, length)` covering every edit.
    pub fn coverage(&self) -> Option<(usize, usize)> {
        let data = self.0.borrow();
        let start = data.edits.iter().map(|e| e.offset).min()?;
        let end = data.edits.iter().map(|e| e.end()).max()?;
        Some((start, end - start))
    }
}

/// One structural edit relative to a target node.
///
/// Equality and hashing go by identity: two modifications built from the
/// same fields are different modifications. Clones share the identity.
#[derive(Debug, Clone)]
pub struct Modification {
    id: ModificationId,
    kind: ModificationKind,
    target: NodeRef,
    new_node: Option<NodeRef>,
    edit_group: EditGroup,
}

impl Modification {
    pub fn new(
        kind: ModificationKind,
        target: NodeRef,
        new_node: Option<NodeRef>,
        edit_group: EditGroup,
    ) -> Self {
        Self {
            id: ModificationId::next(),
            kind,
            target,
            new_node,
            edit_group,
        }
    }

    pub fn replace(target: NodeRef, new_node: Option<NodeRef>, edit_group: EditGroup) -> Self {
        Self::new(ModificationKind::Replace, target, new_node, edit_group)
    }

    pub fn insert_before(target: NodeRef, new_node: NodeRef, edit_group: EditGroup) -> Self {
        Self::new(ModificationKind::InsertBefore, target, Some(new_node), edit_group)
    }

    pub fn append_child(target: NodeRef, new_node: NodeRef, edit_group: EditGroup) -> Self {
        Self::new(ModificationKind::AppendChild, target, Some(new_node), edit_group)
    }

    pub fn id(&self) -> ModificationId {
        self.id
    }

    pub fn kind(&self) -> ModificationKind {
        self.kind
    }

    pub fn target(&self) -> NodeRef {
        self.target
    }

    pub fn new_node(&self) -> Option<NodeRef> {
        self.new_node
    }

    pub fn edit_group(&self) -> &EditGroup {
        &self.edit_group
    }
}

impl PartialEq for Modification {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Modification {}

impl Hash for Modification {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeId;

    fn node(index: u32) -> NodeRef {
        NodeRef::Parsed(NodeId(index))
    }

    #[test]
    fn test_identical_fields_are_distinct_modifications() {
        let group = EditGroup::new("g");
        let a = Modification::replace(node(1), Some(node(2)), group.clone());
        let b = Modification::replace(node(1), Some(node(2)), group);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_edit_group_coverage() {
        let group = EditGroup::new("rename");
        assert_eq!(group.coverage(), None);

        group.add_edit(TextEdit::new(10, 2, "abc"));
        group.clone().add_edit(TextEdit::new(4, 0, "x"));
        assert_eq!(group.coverage(), Some((4, 8)));
        assert_eq!(group.edits().len(), 2);
    }
}
