//! Parent → children lookup table.
//!
//! Parent links in the scene are plain id back-references; this index is the
//! reverse direction, kept in step by [`crate::scene::SceneStore`] on every
//! mutation so "children of X" is a single map lookup.

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;

use std::collections::HashMap;

use crate::scene::EntityId;

/// Ordered child lists keyed by parent id. Order is link order.
#[derive(Debug, Clone, Default)]
pub struct ChildIndex {
    children: HashMap<EntityId, Vec<EntityId>>,
}

impl ChildIndex {
    /// Record `child` under `parent`. Linking twice is a no-op.
    pub fn link(&mut self, parent: EntityId, child: EntityId) {
        let list = self.children.entry(parent).or_default();
        if !list.contains(&child) {
            list.push(child);
        }
    }

    /// Forget `child` under `parent`. Empty lists are dropped.
    pub fn unlink(&mut self, parent: EntityId, child: EntityId) {
        let Some(list) = self.children.get_mut(&parent) else {
            return;
        };
        list.retain(|c| *c != child);
        if list.is_empty() {
            self.children.remove(&parent);
        }
    }

    /// Move `child` from `from` to `to`; either side may be absent.
    pub fn relink(&mut self, child: EntityId, from: Option<EntityId>, to: Option<EntityId>) {
        if from == to {
            return;
        }
        if let Some(parent) = from {
            self.unlink(parent, child);
        }
        if let Some(parent) = to {
            self.link(parent, child);
        }
    }

    #[must_use]
    pub fn children(&self, parent: &EntityId) -> &[EntityId] {
        self.children.get(parent).map_or(&[], Vec::as_slice)
    }

    /// Drop the whole entry for `parent`, returning its former children.
    pub fn remove_parent(&mut self, parent: &EntityId) -> Vec<EntityId> {
        self.children.remove(parent).unwrap_or_default()
    }
}
