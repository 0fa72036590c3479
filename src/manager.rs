// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! EntityManager: entity arena, name registry and the frame loop

use ahash::AHashMap;
use slotmap::SlotMap;
use tracing::{debug, warn};

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::config::{DuplicatePolicy, ManagerConfig};
use crate::entity::{EntityId, EntityNode};
use crate::error::{EcsError, Result};
use crate::pass::Pass;

/// Owns every entity of one scene
///
/// Construction creates the root entity, which is registered under
/// `config.root_name` and lives as long as the manager. Independent managers
/// hold independent trees.
pub struct EntityManager {
    pub(crate) entities: SlotMap<EntityId, EntityNode>,
    pub(crate) registry: AHashMap<String, EntityId>,
    pub(crate) root: EntityId,
    pub(crate) config: ManagerConfig,
    frame: u64,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::build(ManagerConfig::default())
    }

    /// Create a manager from a validated configuration
    pub fn with_config(config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ManagerConfig) -> Self {
        let mut entities = SlotMap::with_key();
        let mut root_node = EntityNode::new(Some(&config.root_name));
        root_node.registered = true;
        root_node.initialized = true;
        let root = entities.insert(root_node);

        let mut registry = AHashMap::new();
        registry.insert(config.root_name.clone(), root);

        Self {
            entities,
            registry,
            root,
            config,
            frame: 0,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Register `id` by name and attach it under `parent` (root when `None`)
    pub fn add(&mut self, id: EntityId, parent: Option<EntityId>) -> Result<()> {
        let name = self.node(id)?.name.clone();

        let displaced = match self.registry.get(&name) {
            Some(&existing) if existing != id => match self.config.duplicate_names {
                DuplicatePolicy::Reject => return Err(EcsError::NameTaken(name)),
                DuplicatePolicy::Replace => {
                    warn!(entity = %name, "replacing registry entry");
                    Some(existing)
                }
            },
            _ => None,
        };

        if id != self.root {
            let parent = parent.unwrap_or(self.root);
            self.set_parent(id, Some(parent))?;
        }

        if let Some(node) = displaced.and_then(|old| self.entities.get_mut(old)) {
            node.registered = false;
        }
        self.registry.insert(name.clone(), id);
        self.node_mut(id)?.registered = true;
        debug!(entity = %name, "registered entity");
        Ok(())
    }

    /// Drop a registry entry. The tree is left untouched.
    pub fn remove(&mut self, name: &str) -> Option<EntityId> {
        if self.registry.get(name) == Some(&self.root) {
            warn!("refusing to unregister the root entity");
            return None;
        }
        let id = self.registry.remove(name)?;
        if let Some(node) = self.entities.get_mut(id) {
            node.registered = false;
        }
        Some(id)
    }

    pub fn get(&self, name: &str) -> Option<EntityId> {
        self.registry.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Unregister every entity not named in `keep`, then reset the root
    /// with the same list
    pub fn clear(&mut self, keep: &[&str]) -> Result<()> {
        let root = self.root;
        let dropped: Vec<String> = self
            .registry
            .iter()
            .filter(|(name, id)| **id != root && !keep.contains(&name.as_str()))
            .map(|(name, _)| name.clone())
            .collect();

        for name in dropped {
            self.remove(&name);
        }
        self.reset(root, keep)
    }

    /// Run every pass from `config.passes.min` to `config.passes.max`.
    /// Each pass finishes over the whole tree before the next one starts.
    pub fn update(&mut self, elapsed: f32) -> Result<()> {
        check_elapsed(elapsed)?;
        self.frame += 1;

        #[cfg(feature = "profiling")]
        let span = info_span!("manager.update", frame = self.frame, entities = self.entities.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let passes = self.config.passes;
        for pass in passes.iter() {
            self.update_pass(elapsed, pass)?;
        }
        Ok(())
    }

    /// Run a single pass over the tree
    pub fn update_pass(&mut self, elapsed: f32, pass: Pass) -> Result<()> {
        check_elapsed(elapsed)?;

        #[cfg(feature = "profiling")]
        let span = info_span!("manager.update_pass", pass = pass.bits());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        self.update_entity(self.root, elapsed, pass)
    }

    /// Entities in the arena, root and unregistered ones included
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn registered_names(&self) -> Vec<&str> {
        self.registry.keys().map(String::as_str).collect()
    }

    /// Number of completed `update` calls
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Log the registry
    pub fn debug(&self) {
        debug!(registered = self.registry.len(), entities = self.entities.len(), "entity registry");
        for (name, &id) in &self.registry {
            if let Some(node) = self.entities.get(id) {
                debug!(
                    entity = %name,
                    serial = node.serial,
                    active = node.active,
                    dead = node.dead,
                    components = ?node.component_names(),
                    "registered entity"
                );
            }
        }
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.entities.len())
            .field("registered", &self.registry.len())
            .field("frame", &self.frame)
            .finish()
    }
}

fn check_elapsed(elapsed: f32) -> Result<()> {
    if elapsed.is_finite() && elapsed >= 0.0 {
        Ok(())
    } else {
        Err(EcsError::InvalidElapsedTime(elapsed))
    }
}
