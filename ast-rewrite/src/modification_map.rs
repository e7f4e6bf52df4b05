//! Per-node ordered modification lists.
//!
//! For every target the list holds its `InsertBefore` entries first, in the
//! order they were added, followed by at most one destructive entry: a
//! single `Replace`, or any number of `AppendChild`s.

use std::collections::{HashMap, HashSet};

use crate::ast::NodeRef;
use crate::error::ModificationError;
use crate::modification::{Modification, ModificationKind};

#[derive(Debug, Clone, Default)]
pub struct ModificationMap {
    entries: HashMap<NodeRef, Vec<Modification>>,
    /// Targets in the order they first received a modification.
    order: Vec<NodeRef>,
}

impl ModificationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `modification` to its target's list.
    ///
    /// # Panics
    /// When the request conflicts with what the target already carries. A
    /// conflicting request is a bug in the caller, not a recoverable state.
    pub fn add_modification(&mut self, modification: Modification) {
        if let Err(err) = self.try_add_modification(modification) {
            panic!("Conflicting modification: {}", err);
        }
    }

    pub fn try_add_modification(
        &mut self,
        modification: Modification,
    ) -> Result<(), ModificationError> {
        let target = modification.target();
        let Some(list) = self.entries.get_mut(&target) else {
            self.order.push(target);
            self.entries.insert(target, vec![modification]);
            return Ok(());
        };

        let last = list.last().map(|m| m.kind());
        match modification.kind() {
            ModificationKind::InsertBefore => {
                let position = list
                    .iter()
                    .rposition(|m| m.kind() == ModificationKind::InsertBefore)
                    .map_or(0, |i| i + 1);
                list.insert(position, modification);
            }
            ModificationKind::Replace => match last {
                Some(existing @ (ModificationKind::Replace | ModificationKind::AppendChild)) => {
                    return Err(ModificationError::AlreadyModified {
                        target,
                        existing,
                        requested: ModificationKind::Replace,
                    });
                }
                _ => list.push(modification),
            },
            ModificationKind::AppendChild => match last {
                Some(ModificationKind::Replace) => {
                    return Err(ModificationError::AlreadyModified {
                        target,
                        existing: ModificationKind::Replace,
                        requested: ModificationKind::AppendChild,
                    });
                }
                _ => list.push(modification),
            },
        }
        Ok(())
    }

    /// Modifications recorded for `node`, in application order.
    pub fn get_modifications_for_node(&self, node: NodeRef) -> &[Modification] {
        self.entries.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn modified_nodes(&self) -> HashSet<NodeRef> {
        self.entries.keys().copied().collect()
    }

    pub fn contains(&self, node: NodeRef) -> bool {
        self.entries.contains_key(&node)
    }

    /// Number of distinct targets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(target, modifications)` in the order targets were first modified.
    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &[Modification])> + '_ {
        self.order
            .iter()
            .map(move |target| (*target, self.get_modifications_for_node(*target)))
    }

    pub(crate) fn inserts_before(&self, node: NodeRef) -> impl Iterator<Item = &Modification> {
        self.get_modifications_for_node(node)
            .iter()
            .filter(|m| m.kind() == ModificationKind::InsertBefore)
    }

    pub(crate) fn replacement(&self, node: NodeRef) -> Option<&Modification> {
        self.get_modifications_for_node(node)
            .iter()
            .find(|m| m.kind() == ModificationKind::Replace)
    }

    pub(crate) fn appended_children(&self, node: NodeRef) -> impl Iterator<Item = &Modification> {
        self.get_modifications_for_node(node)
            .iter()
            .filter(|m| m.kind() == ModificationKind::AppendChild)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeId;
    use crate::modification::EditGroup;

    fn node(index: u32) -> NodeRef {
        NodeRef::Parsed(NodeId(index))
    }

    fn new_node(index: u32) -> NodeRef {
        NodeRef::Synthetic(NodeId(index))
    }

    fn kinds(map: &ModificationMap, target: NodeRef) -> Vec<ModificationKind> {
        map.get_modifications_for_node(target)
            .iter()
            .map(|m| m.kind())
            .collect()
    }

    #[test]
    fn test_unknown_node_has_no_modifications() {
        let map = ModificationMap::new();
        assert!(map.get_modifications_for_node(node(1)).is_empty());
        assert!(map.modified_nodes().is_empty());
    }

    #[test]
    fn test_inserts_precede_replace() {
        let mut map = ModificationMap::new();
        let group = EditGroup::new("g");
        let a = Modification::insert_before(node(1), new_node(1), group.clone());
        let b = Modification::insert_before(node(1), new_node(2), group.clone());
        let c = Modification::replace(node(1), Some(new_node(3)), group.clone());

        map.add_modification(a.clone());
        map.add_modification(c.clone());
        map.add_modification(b.clone());

        assert_eq!(map.get_modifications_for_node(node(1)), &[a, b, c]);
    }

    #[test]
    fn test_insert_before_keeps_relative_order_ahead_of_appends() {
        let mut map = ModificationMap::new();
        let group = EditGroup::new("g");
        map.add_modification(Modification::append_child(node(1), new_node(1), group.clone()));
        map.add_modification(Modification::insert_before(node(1), new_node(2), group.clone()));
        map.add_modification(Modification::append_child(node(1), new_node(3), group.clone()));
        map.add_modification(Modification::insert_before(node(1), new_node(4), group.clone()));

        let news: Vec<_> = map
            .get_modifications_for_node(node(1))
            .iter()
            .map(|m| m.new_node().unwrap())
            .collect();
        assert_eq!(news, vec![new_node(2), new_node(4), new_node(1), new_node(3)]);
        assert_eq!(
            kinds(&map, node(1)),
            vec![
                ModificationKind::InsertBefore,
                ModificationKind::InsertBefore,
                ModificationKind::AppendChild,
                ModificationKind::AppendChild,
            ]
        );
    }

    #[test]
    fn test_second_replace_is_rejected() {
        let mut map = ModificationMap::new();
        let group = EditGroup::new("g");
        map.add_modification(Modification::replace(node(1), Some(new_node(1)), group.clone()));

        let err = map
            .try_add_modification(Modification::replace(node(1), None, group))
            .unwrap_err();
        assert_eq!(
            err,
            ModificationError::AlreadyModified {
                target: node(1),
                existing: ModificationKind::Replace,
                requested: ModificationKind::Replace,
            }
        );
    }

    #[test]
    fn test_append_rejected_after_inserts_and_replace() {
        let mut map = ModificationMap::new();
        let group = EditGroup::new("g");
        let a = Modification::insert_before(node(1), new_node(1), group.clone());
        let b = Modification::insert_before(node(1), new_node(2), group.clone());
        let c = Modification::replace(node(1), Some(new_node(3)), group.clone());
        map.add_modification(a.clone());
        map.add_modification(b.clone());
        map.add_modification(c.clone());
        assert_eq!(map.get_modifications_for_node(node(1)), &[a.clone(), b.clone(), c.clone()]);

        let err = map
            .try_add_modification(Modification::append_child(node(1), new_node(4), group))
            .unwrap_err();
        assert_eq!(
            err,
            ModificationError::AlreadyModified {
                target: node(1),
                existing: ModificationKind::Replace,
                requested: ModificationKind::AppendChild,
            }
        );
        assert_eq!(map.get_modifications_for_node(node(1)), &[a, b, c]);
    }

    #[test]
    fn test_replace_after_append_is_rejected() {
        let mut map = ModificationMap::new();
        let group = EditGroup::new("g");
        map.add_modification(Modification::append_child(node(1), new_node(1), group.clone()));
        assert!(map
            .try_add_modification(Modification::replace(node(1), Some(new_node(2)), group))
            .is_err());
    }

    #[test]
    #[should_panic(expected = "Conflicting modification")]
    fn test_append_after_replace_panics() {
        let mut map = ModificationMap::new();
        let group = EditGroup::new("g");
        map.add_modification(Modification::replace(node(1), Some(new_node(1)), group.clone()));
        map.add_modification(Modification::append_child(node(1), new_node(2), group));
    }

    #[test]
    fn test_rejected_modification_leaves_list_untouched() {
        let mut map = ModificationMap::new();
        let group = EditGroup::new("g");
        let replace = Modification::replace(node(1), Some(new_node(1)), group.clone());
        map.add_modification(replace.clone());
        let _ = map.try_add_modification(Modification::append_child(node(1), new_node(2), group));
        assert_eq!(map.get_modifications_for_node(node(1)), &[replace]);
    }

    #[test]
    fn test_modified_nodes_and_iteration_order() {
        let mut map = ModificationMap::new();
        let group = EditGroup::new("g");
        map.add_modification(Modification::replace(node(7), None, group.clone()));
        map.add_modification(Modification::insert_before(node(3), new_node(1), group.clone()));
        map.add_modification(Modification::insert_before(node(7), new_node(2), group));

        assert_eq!(map.modified_nodes(), HashSet::from([node(3), node(7)]));
        let targets: Vec<_> = map.iter().map(|(target, _)| target).collect();
        assert_eq!(targets, vec![node(7), node(3)]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_ordering_invariant_holds_for_any_sequence() {
        use ModificationKind::*;
        let sequences = [
            vec![InsertBefore, Replace, InsertBefore],
            vec![AppendChild, InsertBefore, AppendChild],
            vec![Replace, InsertBefore, InsertBefore, AppendChild, Replace],
            vec![InsertBefore, AppendChild, Replace, InsertBefore],
        ];
        for sequence in sequences {
            let mut map = ModificationMap::new();
            let group = EditGroup::new("g");
            for (i, kind) in sequence.into_iter().enumerate() {
                let m = Modification::new(kind, node(1), Some(new_node(i as u32)), group.clone());
                let _ = map.try_add_modification(m);
            }
            let kinds = kinds(&map, node(1));
            let first_destructive = kinds
                .iter()
                .position(|k| *k != InsertBefore)
                .unwrap_or(kinds.len());
            assert!(kinds[first_destructive..].iter().all(|k| *k != InsertBefore));
            assert!(kinds.iter().filter(|k| **k == Replace).count() <= 1);
            assert!(!(kinds.contains(&Replace) && kinds.contains(&AppendChild)));
        }
    }
}
