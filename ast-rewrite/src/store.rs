//! Hierarchy of modification maps.
//!
//! The root map holds edits on the original tree. Every modification that
//! introduced a node which is itself edited further owns a nested map,
//! keyed by the modification's identity. The driver descends into a nested
//! map whenever it renders that modification's new node.

use std::collections::HashMap;

use crate::modification::{Modification, ModificationId};
use crate::modification_map::ModificationMap;

#[derive(Debug, Default)]
pub struct ModificationStore {
    root: Option<ModificationMap>,
    nested: HashMap<ModificationId, ModificationMap>,
}

impl ModificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `modification` at the level of `parent`, `None` being the
    /// original tree.
    ///
    /// # Panics
    /// On conflicting modifications, see [`ModificationMap::add_modification`].
    pub fn store_modification(&mut self, parent: Option<&Modification>, modification: Modification) {
        let map = match parent {
            None => self.root.get_or_insert_with(ModificationMap::new),
            Some(parent) => self.nested.entry(parent.id()).or_default(),
        };
        map.add_modification(modification);
    }

    pub fn root_modifications(&self) -> Option<&ModificationMap> {
        self.root.as_ref()
    }

    /// Edits on nodes introduced by `modification`.
    pub fn nested_modifications(&self, modification: &Modification) -> Option<&ModificationMap> {
        self.nested.get(&modification.id())
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_ref().map_or(true, ModificationMap::is_empty) && self.nested.is_empty()
    }
}
