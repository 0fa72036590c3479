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

//! Entities: identity, component table, handlers and per-frame update.
//!
//! Entity state lives in [`EntityNode`]s stored in the manager's arena. The
//! operations that need the rest of the graph (attaching components, running
//! hooks, broadcasting, traversal) are implemented on [`EntityManager`] and
//! take the [`EntityId`] of the entity they act on.

use ahash::AHashMap;
use glam::{Mat4, Quat, Vec3};
use slotmap::new_key_type;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::component::{AnyComponent, Component};
use crate::config::DuplicatePolicy;
use crate::context::Context;
use crate::error::{EcsError, Result};
use crate::event_bus::{HandlerId, HandlerTable};
use crate::hierarchy::Children;
use crate::manager::EntityManager;
use crate::message::{topics, Message, Payload};
use crate::pass::Pass;
use crate::transform::{compose_world, matrix_position, LocalTransform};
use crate::utils::{generated_name, next_id};

new_key_type! {
    /// Unique entity identifier backed by slotmap's generational keys.
    pub struct EntityId;
}

/// Per-entity state stored in the manager arena
pub struct EntityNode {
    pub(crate) serial: u64,
    pub(crate) name: String,
    pub(crate) components: crate::component::ComponentTable,
    pub(crate) attributes: AHashMap<String, Payload>,
    pub(crate) transform: LocalTransform,
    pub(crate) handlers: HandlerTable,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Children,
    pub(crate) active: bool,
    pub(crate) dead: bool,
    pub(crate) registered: bool,
    pub(crate) initialized: bool,
}

impl EntityNode {
    pub(crate) fn new(name: Option<&str>) -> Self {
        let serial = next_id();
        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => generated_name(serial),
        };
        Self {
            serial,
            name,
            components: crate::component::ComponentTable::new(),
            attributes: AHashMap::new(),
            transform: LocalTransform::identity(),
            handlers: HandlerTable::new(),
            parent: None,
            children: Children::new(),
            active: true,
            dead: false,
            registered: false,
            initialized: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process-unique, monotonic
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Owns its name in the registry
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Has been through `init_entity`. Stays set when the registry entry is
    /// later dropped or taken over.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn transform(&self) -> &LocalTransform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation()
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    pub fn left(&self) -> Vec3 {
        self.transform.left()
    }

    pub fn up(&self) -> Vec3 {
        self.transform.up()
    }

    /// Free-form per-entity values
    pub fn attributes(&self) -> &AHashMap<String, Payload> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AHashMap<String, Payload> {
        &mut self.attributes
    }

    pub fn component_names(&self) -> SmallVec<[&'static str; 8]> {
        self.components.names()
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }
}

impl std::fmt::Debug for EntityNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityNode")
            .field("serial", &self.serial)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .field("active", &self.active)
            .field("dead", &self.dead)
            .field("registered", &self.registered)
            .field("initialized", &self.initialized)
            .field("components", &self.components)
            .finish()
    }
}

impl EntityManager {
    /// Create a detached, unregistered entity. Without a name one is
    /// generated from the entity serial.
    ///
    /// The entity stays in the arena until `init_entity` attaches it to the
    /// tree or `discard_entity` drops it.
    pub fn create_entity(&mut self, name: Option<&str>) -> EntityId {
        self.entities.insert(EntityNode::new(name))
    }

    /// Drop an entity that never made it into the tree, running `destroy`
    /// on its components. Returns false for initialized entities, which
    /// leave through `set_dead` or `destroy_entity` instead.
    pub fn discard_entity(&mut self, id: EntityId) -> bool {
        match self.entities.get(id) {
            Some(node) if !node.initialized && id != self.root => {}
            _ => return false,
        }
        self.destroy_entity(id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityNode> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityNode> {
        self.entities.get_mut(id)
    }

    pub(crate) fn node(&self, id: EntityId) -> Result<&EntityNode> {
        self.entities.get(id).ok_or(EcsError::EntityNotFound)
    }

    pub(crate) fn node_mut(&mut self, id: EntityId) -> Result<&mut EntityNode> {
        self.entities.get_mut(id).ok_or(EcsError::EntityNotFound)
    }

    /// Attach a component and run its `init_component` hook. If the entity
    /// is already registered, `init_entity` runs right after.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> Result<()> {
        if !T::PASS.is_valid() {
            return Err(EcsError::ConfigError(format!(
                "component {} declares pass {}, not a power of two",
                T::NAME,
                T::PASS.bits()
            )));
        }
        let policy = self.config.duplicate_components;
        let node = self.node_mut(id)?;

        if node.components.contains(T::NAME) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(EcsError::DuplicateComponent(T::NAME.to_string()));
                }
                DuplicatePolicy::Replace => {
                    warn!(entity = %node.name, component = T::NAME, "replacing component");
                }
            }
        }

        let initialized = node.initialized;
        if let Some(mut displaced) = node.components.insert(Box::new(component)) {
            displaced.destroy();
        }

        self.run_hook(id, T::NAME, |c, ctx| c.init_component(ctx))?;
        if initialized {
            self.run_hook(id, T::NAME, |c, ctx| c.init_entity(ctx))?;
        }
        Ok(())
    }

    /// Detach a component by name, running its `destroy` hook
    pub fn remove_component(&mut self, id: EntityId, name: &str) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.components.contains(name) {
            return Err(EcsError::ComponentNotFound(name.to_string()));
        }
        if let Some(mut component) = node.components.remove(name) {
            component.destroy();
        }
        Ok(())
    }

    pub fn get_component(&self, id: EntityId, name: &str) -> Option<&dyn AnyComponent> {
        self.entities.get(id)?.components.get(name)
    }

    pub fn component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.entities.get(id)?.components.get_typed::<T>()
    }

    pub fn component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(id)?.components.get_typed_mut::<T>()
    }

    pub fn component_pass(&self, id: EntityId, name: &str) -> Option<Pass> {
        self.entities.get(id)?.components.pass_of(name)
    }

    /// Takes effect from the next dispatch of `pass`
    pub fn set_component_pass(&mut self, id: EntityId, name: &str, pass: Pass) -> Result<()> {
        if !pass.is_valid() {
            return Err(EcsError::ConfigError(format!(
                "pass {} is not a power of two",
                pass.bits()
            )));
        }
        if self.node_mut(id)?.components.set_pass(name, pass) {
            Ok(())
        } else {
            Err(EcsError::ComponentNotFound(name.to_string()))
        }
    }

    /// Register with the manager under `parent` (root when `None`), then run
    /// `init_entity` on every attached component and re-apply the entity's
    /// active flag so the new parent's active-children cache includes it.
    pub fn init_entity(&mut self, id: EntityId, parent: Option<EntityId>) -> Result<()> {
        let node = self.node(id)?;
        if node.initialized {
            return Err(EcsError::AlreadyRegistered(node.name.clone()));
        }

        self.add(id, parent)?;
        self.node_mut(id)?.initialized = true;

        let names = self.node(id)?.components.names();
        for name in names {
            self.run_hook(id, name, |c, ctx| c.init_entity(ctx))?;
        }

        let active = self.node(id)?.active;
        self.set_active(id, active)
    }

    /// Check the component out of its slot, run `hook` with a context bound
    /// to the owner, then put it back. A component whose slot disappeared or
    /// was refilled while it ran is destroyed instead.
    pub(crate) fn run_hook<F>(&mut self, id: EntityId, name: &'static str, hook: F) -> Result<()>
    where
        F: FnOnce(&mut dyn AnyComponent, &mut Context<'_>) -> Result<()>,
    {
        let Some(mut component) = self
            .entities
            .get_mut(id)
            .and_then(|node| node.components.take(name))
        else {
            return Ok(());
        };

        let result = {
            let mut ctx = Context::new(self, id, Some(name));
            hook(&mut *component, &mut ctx)
        };

        let orphan = match self.entities.get_mut(id) {
            Some(node) => node.components.restore(name, component),
            None => Some(component),
        };
        if let Some(mut orphan) = orphan {
            debug!(component = name, "component detached while running, destroying");
            orphan.destroy();
        }

        result
    }

    /// Run one pass on an entity: its own components first, then its
    /// active children, then reap children marked dead.
    pub fn update_entity(&mut self, id: EntityId, elapsed: f32, pass: Pass) -> Result<()> {
        self.update_components(id, elapsed, pass)?;
        self.update_children(id, elapsed, pass)
    }

    fn update_components(&mut self, id: EntityId, elapsed: f32, pass: Pass) -> Result<()> {
        let Some(node) = self.entities.get(id) else {
            return Ok(());
        };
        let names = node.components.matching(pass);
        for name in names {
            self.run_hook(id, name, |c, ctx| c.update(ctx, elapsed))?;
        }
        Ok(())
    }

    fn update_children(&mut self, id: EntityId, elapsed: f32, pass: Pass) -> Result<()> {
        let Some(node) = self.entities.get(id) else {
            return Ok(());
        };
        let active: SmallVec<[EntityId; 16]> = node.children.active().iter().copied().collect();

        for &child in &active {
            if self.entities.contains_key(child) {
                self.update_entity(child, elapsed, pass)?;
            }
        }

        let dead: SmallVec<[EntityId; 4]> = active
            .iter()
            .copied()
            .filter(|&child| {
                self.entities
                    .get(child)
                    .is_some_and(|n| n.dead && n.parent == Some(id))
            })
            .collect();

        if dead.is_empty() {
            return Ok(());
        }

        for child in dead {
            if let Some(node) = self.entities.get(child) {
                debug!(entity = %node.name, "reaping dead entity");
            }
            self.destroy_entity(child);
        }
        self.refresh_active_children(id);
        Ok(())
    }

    /// Deliver `msg` to the entity's handlers for its topic, in registration
    /// order. Dead entities and topics without handlers are silent no-ops.
    pub fn broadcast(&mut self, id: EntityId, msg: &Message) -> Result<()> {
        let node = self.node(id)?;
        if node.dead {
            return Ok(());
        }
        let Some(handlers) = node.handlers.snapshot(msg.topic()) else {
            return Ok(());
        };

        trace!(entity = %node.name, topic = msg.topic(), handlers = handlers.len(), "broadcast");
        for handler in handlers {
            let mut ctx = Context::new(self, id, None);
            handler(&mut ctx, msg)?;
        }
        Ok(())
    }

    pub fn register_handler<F>(&mut self, id: EntityId, topic: &str, handler: F) -> Result<HandlerId>
    where
        F: Fn(&mut Context<'_>, &Message) -> Result<()> + 'static,
    {
        Ok(self.node_mut(id)?.handlers.register(topic, handler))
    }

    pub fn unregister_handler(&mut self, id: EntityId, topic: &str, handler: HandlerId) -> Result<bool> {
        Ok(self.node_mut(id)?.handlers.unregister(topic, handler))
    }

    /// Move the entity locally and broadcast `update.position`
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> Result<()> {
        self.node_mut(id)?.transform.set_position(position);
        self.broadcast(id, &Message::new(topics::UPDATE_POSITION, position))
    }

    /// Rotate the entity locally and broadcast `update.rotation`
    pub fn set_rotation(&mut self, id: EntityId, rotation: Quat) -> Result<()> {
        let node = self.node_mut(id)?;
        node.transform.set_rotation(rotation);
        let stored = node.transform.rotation();
        self.broadcast(id, &Message::new(topics::UPDATE_ROTATION, stored))
    }

    /// Recomposed through the current parent chain on every call
    pub fn world_transform(&self, id: EntityId) -> Option<Mat4> {
        let node = self.entities.get(id)?;
        let mut world = node.transform.matrix();
        let mut current = node.parent;
        while let Some(parent) = current {
            let parent_node = self.entities.get(parent)?;
            world = compose_world(parent_node.transform.matrix(), world);
            current = parent_node.parent;
        }
        Some(world)
    }

    pub fn world_position(&self, id: EntityId) -> Option<Vec3> {
        self.world_transform(id).map(|m| matrix_position(&m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Component for Recorder {
        const NAME: &'static str = "Recorder";

        fn init_component(&mut self, ctx: &mut Context<'_>) -> Result<()> {
            self.log.borrow_mut().push(format!("init_component:{}", ctx.name()));
            Ok(())
        }

        fn init_entity(&mut self, ctx: &mut Context<'_>) -> Result<()> {
            self.log.borrow_mut().push(format!("init_entity:{}", ctx.name()));
            Ok(())
        }

        fn destroy(&mut self) {
            self.log.borrow_mut().push("destroy".to_string());
        }
    }

    #[test]
    fn test_generated_names_are_unique() {
        let mut manager = EntityManager::new();
        let a = manager.create_entity(None);
        let b = manager.create_entity(Some(""));
        let a_name = manager.entity(a).unwrap().name().to_string();
        let b_name = manager.entity(b).unwrap().name().to_string();

        assert!(a_name.starts_with("__name__"));
        assert_ne!(a_name, b_name);
        assert!(manager.entity(b).unwrap().serial() > manager.entity(a).unwrap().serial());
    }

    #[test]
    fn test_hook_order() {
        let mut manager = EntityManager::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = manager.create_entity(Some("recorder"));

        manager.add_component(id, Recorder { log: log.clone() }).unwrap();
        assert_eq!(log.borrow().as_slice(), &["init_component:recorder"]);

        manager.init_entity(id, None).unwrap();
        assert_eq!(
            log.borrow().as_slice(),
            &["init_component:recorder", "init_entity:recorder"]
        );
    }

    #[test]
    fn test_duplicate_component_rejected_by_default() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity(Some("recorder"));
        manager.add_component(id, Recorder::default()).unwrap();

        let err = manager.add_component(id, Recorder::default());
        assert_eq!(err, Err(EcsError::DuplicateComponent("Recorder".to_string())));
    }

    #[test]
    fn test_remove_component_runs_destroy() {
        let mut manager = EntityManager::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = manager.create_entity(Some("recorder"));
        manager.add_component(id, Recorder { log: log.clone() }).unwrap();

        manager.remove_component(id, "Recorder").unwrap();
        assert!(manager.component::<Recorder>(id).is_none());
        assert_eq!(log.borrow().last().map(String::as_str), Some("destroy"));
        assert!(matches!(
            manager.remove_component(id, "Recorder"),
            Err(EcsError::ComponentNotFound(_))
        ));
    }

    #[test]
    fn test_set_position_broadcasts_new_value() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity(Some("mover"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        manager
            .register_handler(id, topics::UPDATE_POSITION, move |_ctx, msg| {
                sink.borrow_mut().push(msg.value().as_vec3());
                Ok(())
            })
            .unwrap();

        manager.set_position(id, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(seen.borrow().as_slice(), &[Some(Vec3::new(1.0, 2.0, 3.0))]);
        assert_eq!(manager.entity(id).unwrap().position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_unknown_entity_errors() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity(None);
        manager.init_entity(id, None).unwrap();
        manager.set_dead(id).unwrap();
        manager.update(0.0).unwrap();

        assert!(manager.entity(id).is_none());
        assert_eq!(manager.set_position(id, Vec3::ZERO), Err(EcsError::EntityNotFound));
        assert_eq!(
            manager.broadcast(id, &Message::signal("ping")),
            Err(EcsError::EntityNotFound)
        );
        assert!(manager.world_transform(id).is_none());
    }

    struct Misscheduled;

    impl Component for Misscheduled {
        const NAME: &'static str = "Misscheduled";
        const PASS: Pass = Pass(3);
    }

    #[test]
    fn test_add_component_rejects_invalid_pass() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity(Some("odd"));

        assert!(matches!(
            manager.add_component(id, Misscheduled),
            Err(EcsError::ConfigError(_))
        ));
        assert!(manager.entity(id).unwrap().component_names().is_empty());
    }

    #[test]
    fn test_discard_entity_drops_uninitialized() {
        let mut manager = EntityManager::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let taken = manager.create_entity(Some("taken"));
        manager.init_entity(taken, None).unwrap();

        let loser = manager.create_entity(Some("taken"));
        manager.add_component(loser, Recorder { log: log.clone() }).unwrap();
        assert!(matches!(
            manager.init_entity(loser, None),
            Err(EcsError::NameTaken(_))
        ));

        assert!(manager.discard_entity(loser));
        assert!(manager.entity(loser).is_none());
        assert_eq!(log.borrow().last().map(String::as_str), Some("destroy"));
        assert_eq!(manager.entity_count(), 2);
        assert_eq!(manager.get("taken"), Some(taken));

        assert!(!manager.discard_entity(taken));
        assert!(!manager.discard_entity(manager.root()));
        assert!(manager.entity(taken).is_some());
    }
}
