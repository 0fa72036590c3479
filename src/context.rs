//! Hook and handler context
//!
//! A [`Context`] is handed to every component hook and message handler. It
//! is bound to the entity that owns the running component (or the handler)
//! and borrows the whole manager mutably, so hooks can reach other entities
//! without holding references into the graph.

use glam::{Quat, Vec3};

use crate::component::{AnyComponent, Component};
use crate::entity::{EntityId, EntityNode};
use crate::error::{EcsError, Result};
use crate::event_bus::HandlerId;
use crate::manager::EntityManager;
use crate::message::Message;
use crate::pass::Pass;

pub struct Context<'a> {
    manager: &'a mut EntityManager,
    entity: EntityId,
    component: Option<&'static str>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        manager: &'a mut EntityManager,
        entity: EntityId,
        component: Option<&'static str>,
    ) -> Self {
        Self {
            manager,
            entity,
            component,
        }
    }

    /// Owning entity
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Name of the running component; `None` inside message handlers
    pub fn component_name(&self) -> Option<&'static str> {
        self.component
    }

    pub fn manager(&self) -> &EntityManager {
        &*self.manager
    }

    pub fn manager_mut(&mut self) -> &mut EntityManager {
        &mut *self.manager
    }

    pub fn node(&self) -> Option<&EntityNode> {
        self.manager.entity(self.entity)
    }

    /// Owner's name, empty if the owner was destroyed mid-hook
    pub fn name(&self) -> &str {
        self.node().map_or("", EntityNode::name)
    }

    /// Sibling component by name. The running component itself is checked
    /// out and not visible here.
    pub fn get_component(&self, name: &str) -> Option<&dyn AnyComponent> {
        self.manager.get_component(self.entity, name)
    }

    pub fn component<T: Component>(&self) -> Option<&T> {
        self.manager.component::<T>(self.entity)
    }

    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.manager.component_mut::<T>(self.entity)
    }

    /// Look up a registered entity by name. Fails while the owner has not
    /// been through `init_entity` yet, i.e. during `init_component`.
    pub fn find_entity(&self, name: &str) -> Result<Option<EntityId>> {
        let node = self.manager.node(self.entity)?;
        if !node.initialized {
            return Err(EcsError::NotRegistered(node.name.clone()));
        }
        Ok(self.manager.get(name))
    }

    /// Broadcast on the owning entity
    pub fn broadcast(&mut self, msg: &Message) -> Result<()> {
        self.manager.broadcast(self.entity, msg)
    }

    pub fn broadcast_to(&mut self, target: EntityId, msg: &Message) -> Result<()> {
        self.manager.broadcast(target, msg)
    }

    pub fn register_handler<F>(&mut self, topic: &str, handler: F) -> Result<HandlerId>
    where
        F: Fn(&mut Context<'_>, &Message) -> Result<()> + 'static,
    {
        self.manager.register_handler(self.entity, topic, handler)
    }

    pub fn unregister_handler(&mut self, topic: &str, handler: HandlerId) -> Result<bool> {
        self.manager.unregister_handler(self.entity, topic, handler)
    }

    /// Pass of the running component
    pub fn pass(&self) -> Option<Pass> {
        let name = self.component?;
        self.manager.component_pass(self.entity, name)
    }

    /// Reschedule the running component, effective from the next dispatch
    pub fn set_pass(&mut self, pass: Pass) -> Result<()> {
        let Some(name) = self.component else {
            return Err(EcsError::ComponentError(
                "set_pass outside of a component hook".to_string(),
            ));
        };
        self.manager.set_component_pass(self.entity, name, pass)
    }

    pub fn set_position(&mut self, position: Vec3) -> Result<()> {
        self.manager.set_position(self.entity, position)
    }

    pub fn set_rotation(&mut self, rotation: Quat) -> Result<()> {
        self.manager.set_rotation(self.entity, rotation)
    }

    /// Mark the owner for removal after the current child sweep
    pub fn set_dead(&mut self) -> Result<()> {
        self.manager.set_dead(self.entity)
    }
}
