//! Parent/child links, activation and teardown.
//!
//! Every registered entity except the root has exactly one parent. A parent
//! keeps its children in insertion order plus a cached list of the children
//! whose `active` flag is set; update traversal only descends through that
//! cache, so an inactive entity prunes its whole subtree.

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::entity::EntityId;
use crate::error::{EcsError, Result};
use crate::manager::EntityManager;

/// Ordered children of one entity and the active subset
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Children {
    children: Vec<EntityId>,
    active: Vec<EntityId>,
}

impl Children {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_child(&mut self, child: EntityId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn remove_child(&mut self, child: EntityId) -> bool {
        if let Some(pos) = self.children.iter().position(|&c| c == child) {
            self.children.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, child: EntityId) -> bool {
        self.children.contains(&child)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityId> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children visited by update traversal
    pub fn active(&self) -> &[EntityId] {
        &self.active
    }

    pub fn to_vec(&self) -> Vec<EntityId> {
        self.children.clone()
    }

    pub(crate) fn set_active(&mut self, active: Vec<EntityId>) {
        self.active = active;
    }
}

impl EntityManager {
    /// Move `id` under `parent`, detaching it from its current parent first.
    /// Only the root may be parentless, and the root cannot be parented.
    pub fn set_parent(&mut self, id: EntityId, parent: Option<EntityId>) -> Result<()> {
        self.node(id)?;

        match parent {
            None if id != self.root => {
                return Err(EcsError::HierarchyError(
                    "only the root entity may be parentless".to_string(),
                ));
            }
            Some(_) if id == self.root => {
                return Err(EcsError::HierarchyError(
                    "root entity cannot have a parent".to_string(),
                ));
            }
            Some(p) if p == id => {
                return Err(EcsError::HierarchyError(
                    "cannot parent entity to itself".to_string(),
                ));
            }
            Some(p) => {
                self.node(p)?;
                if self.is_ancestor(id, p) {
                    return Err(EcsError::HierarchyError(
                        "reparenting would create a cycle".to_string(),
                    ));
                }
            }
            None => {}
        }

        if let Some(old) = self.node(id)?.parent {
            if let Some(old_node) = self.entities.get_mut(old) {
                old_node.children.remove_child(id);
            }
            self.refresh_active_children(old);
        }

        self.node_mut(id)?.parent = parent;

        if let Some(new_parent) = parent {
            self.node_mut(new_parent)?.children.add_child(id);
            self.refresh_active_children(new_parent);
        }
        Ok(())
    }

    /// Toggle participation in update. Descendants keep their own flags.
    pub fn set_active(&mut self, id: EntityId, active: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        node.active = active;
        if let Some(parent) = node.parent {
            self.refresh_active_children(parent);
        }
        Ok(())
    }

    /// Mark for removal; the parent reaps it after its next child sweep
    pub fn set_dead(&mut self, id: EntityId) -> Result<()> {
        if id == self.root {
            warn!("refusing to mark the root entity dead");
            return Err(EcsError::HierarchyError(
                "root entity cannot be marked dead".to_string(),
            ));
        }
        self.node_mut(id)?.dead = true;
        Ok(())
    }

    pub(crate) fn refresh_active_children(&mut self, id: EntityId) {
        let Some(node) = self.entities.get(id) else {
            return;
        };
        let active: Vec<EntityId> = node
            .children
            .iter()
            .copied()
            .filter(|&child| self.entities.get(child).is_some_and(|n| n.active))
            .collect();
        if let Some(node) = self.entities.get_mut(id) {
            node.children.set_active(active);
        }
    }

    /// Destroy every direct child whose name is not in `keep`
    pub fn reset(&mut self, id: EntityId, keep: &[&str]) -> Result<()> {
        let node = self.node(id)?;
        let doomed: SmallVec<[EntityId; 16]> = node
            .children
            .iter()
            .copied()
            .filter(|&child| {
                self.entities
                    .get(child)
                    .is_some_and(|n| !keep.contains(&n.name.as_str()))
            })
            .collect();

        for child in doomed {
            self.destroy_entity(child);
        }
        Ok(())
    }

    /// Find a child by name. With `recursive`, each child's subtree is
    /// searched depth-first before moving on to its next sibling.
    pub fn find_child(&self, id: EntityId, name: &str, recursive: bool) -> Option<EntityId> {
        let node = self.entities.get(id)?;
        for &child in node.children.iter() {
            let Some(child_node) = self.entities.get(child) else {
                continue;
            };
            if child_node.name == name {
                return Some(child);
            }
            if recursive {
                if let Some(found) = self.find_child(child, name, true) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Whether `ancestor` appears on the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = self.entities.get(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.entities.get(parent).and_then(|n| n.parent);
        }
        false
    }

    /// Tear down an entity and its subtree: children first, then the
    /// entity's own components, then its parent link and registry entry.
    ///
    /// Returns `false` for the root and for ids already destroyed.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if id == self.root {
            warn!("refusing to destroy the root entity");
            return false;
        }
        let Some(node) = self.entities.get(id) else {
            return false;
        };

        let children: SmallVec<[EntityId; 16]> = node.children.iter().copied().collect();
        for child in children {
            self.destroy_entity(child);
        }

        let Some(mut node) = self.entities.remove(id) else {
            return false;
        };
        for mut component in node.components.drain() {
            component.destroy();
        }
        node.handlers.clear();

        if let Some(parent) = node.parent.take() {
            if let Some(parent_node) = self.entities.get_mut(parent) {
                parent_node.children.remove_child(id);
            }
            self.refresh_active_children(parent);
        }

        if self.registry.get(&node.name) == Some(&id) {
            self.registry.remove(&node.name);
        }
        debug!(entity = %node.name, serial = node.serial, "destroyed entity");
        true
    }
}
