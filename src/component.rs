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

//! Component trait and per-entity component table
//!
//! Components are units of behavior attached to exactly one entity. Each
//! concrete type names itself through [`Component::NAME`]; the name is the
//! key in the owning entity's table, so an entity holds at most one
//! component per name.

use smallvec::SmallVec;
use std::any::Any;

use crate::context::Context;
use crate::error::Result;
use crate::pass::Pass;

/// Behavior attached to an entity
///
/// Every hook defaults to a no-op. Errors returned from hooks propagate to
/// whoever drove the call (usually [`EntityManager::update`]).
///
/// [`EntityManager::update`]: crate::manager::EntityManager::update
pub trait Component: 'static {
    /// Table key; unique per entity
    const NAME: &'static str;

    /// Pass the component starts in
    const PASS: Pass = Pass::DEFAULT;

    /// Runs right after attachment, before the owner is registered.
    /// Register topic handlers here; other entities may not exist yet.
    fn init_component(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Runs once the owner is registered; cross-entity lookups are safe.
    fn init_entity(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Runs once per matching pass per frame while the owner and all of its
    /// ancestors are active. `elapsed` is seconds since the previous frame.
    fn update(&mut self, _ctx: &mut Context<'_>, _elapsed: f32) -> Result<()> {
        Ok(())
    }

    /// Release external resources; runs when the owner is destroyed
    fn destroy(&mut self) {}
}

/// Object-safe view of a [`Component`]
pub trait AnyComponent: Any {
    fn name(&self) -> &'static str;
    fn default_pass(&self) -> Pass;
    fn init_component(&mut self, ctx: &mut Context<'_>) -> Result<()>;
    fn init_entity(&mut self, ctx: &mut Context<'_>) -> Result<()>;
    fn update(&mut self, ctx: &mut Context<'_>, elapsed: f32) -> Result<()>;
    fn destroy(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponent for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn default_pass(&self) -> Pass {
        T::PASS
    }

    fn init_component(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        Component::init_component(self, ctx)
    }

    fn init_entity(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        Component::init_entity(self, ctx)
    }

    fn update(&mut self, ctx: &mut Context<'_>, elapsed: f32) -> Result<()> {
        Component::update(self, ctx, elapsed)
    }

    fn destroy(&mut self) {
        Component::destroy(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub type BoxedComponent = Box<dyn AnyComponent>;

/// One named entry in a component table
///
/// `component` is `None` while the component is checked out to run a hook.
pub struct ComponentSlot {
    name: &'static str,
    pass: Pass,
    component: Option<BoxedComponent>,
}

impl ComponentSlot {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pass(&self) -> Pass {
        self.pass
    }

    pub fn is_checked_out(&self) -> bool {
        self.component.is_none()
    }
}

/// Name-keyed components of one entity, in attachment order
#[derive(Default)]
pub struct ComponentTable {
    slots: Vec<ComponentSlot>,
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Insert under the component's own name. An existing entry keeps its
    /// position, takes the new component's default pass and hands back the
    /// displaced component.
    pub fn insert(&mut self, component: BoxedComponent) -> Option<BoxedComponent> {
        let name = component.name();
        let pass = component.default_pass();
        match self.position(name) {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.pass = pass;
                slot.component.replace(component)
            }
            None => {
                self.slots.push(ComponentSlot {
                    name,
                    pass,
                    component: Some(component),
                });
                None
            }
        }
    }

    /// Remove the entry entirely
    pub fn remove(&mut self, name: &str) -> Option<BoxedComponent> {
        let index = self.position(name)?;
        self.slots.remove(index).component
    }

    pub fn get(&self, name: &str) -> Option<&(dyn AnyComponent + 'static)> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .and_then(|slot| slot.component.as_deref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn AnyComponent + 'static)> {
        self.slots
            .iter_mut()
            .find(|slot| slot.name == name)
            .and_then(|slot| slot.component.as_deref_mut())
    }

    pub fn get_typed<T: Component>(&self) -> Option<&T> {
        self.get(T::NAME)?.as_any().downcast_ref::<T>()
    }

    pub fn get_typed_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.get_mut(T::NAME)?.as_any_mut().downcast_mut::<T>()
    }

    /// Check a component out so a hook can run with mutable access to the
    /// rest of the graph
    pub fn take(&mut self, name: &str) -> Option<BoxedComponent> {
        let index = self.position(name)?;
        self.slots[index].component.take()
    }

    /// Return a checked-out component. Gives the component back to the
    /// caller if its slot was removed or refilled in the meantime.
    pub fn restore(&mut self, name: &str, component: BoxedComponent) -> Option<BoxedComponent> {
        match self.position(name) {
            Some(index) if self.slots[index].component.is_none() => {
                self.slots[index].component = Some(component);
                None
            }
            _ => Some(component),
        }
    }

    pub fn pass_of(&self, name: &str) -> Option<Pass> {
        self.position(name).map(|index| self.slots[index].pass)
    }

    pub fn set_pass(&mut self, name: &str, pass: Pass) -> bool {
        match self.position(name) {
            Some(index) => {
                self.slots[index].pass = pass;
                true
            }
            None => false,
        }
    }

    /// Names of components scheduled in `pass`, in table order
    pub fn matching(&self, pass: Pass) -> SmallVec<[&'static str; 8]> {
        self.slots
            .iter()
            .filter(|slot| slot.pass == pass)
            .map(|slot| slot.name)
            .collect()
    }

    pub fn names(&self) -> SmallVec<[&'static str; 8]> {
        self.slots.iter().map(|slot| slot.name).collect()
    }

    pub fn slots(&self) -> &[ComponentSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Empty the table, yielding every component not currently checked out
    pub fn drain(&mut self) -> impl Iterator<Item = BoxedComponent> + '_ {
        self.slots.drain(..).filter_map(|slot| slot.component)
    }
}

impl std::fmt::Debug for ComponentTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().map(|slot| (slot.name, slot.pass)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(dead_code)]
    use super::*;

    #[derive(Debug, Default)]
    struct Wind {
        speed: f32,
    }

    impl Component for Wind {
        const NAME: &'static str = "Wind";
    }

    struct Camera;

    impl Component for Camera {
        const NAME: &'static str = "Camera";
        const PASS: Pass = Pass::LATE;
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut table = ComponentTable::new();
        table.insert(Box::new(Camera));
        table.insert(Box::new(Wind::default()));

        assert_eq!(table.names().as_slice(), &["Camera", "Wind"]);
        assert_eq!(table.pass_of("Camera"), Some(Pass::LATE));
        assert_eq!(table.pass_of("Wind"), Some(Pass::DEFAULT));
    }

    #[test]
    fn test_replace_returns_displaced() {
        let mut table = ComponentTable::new();
        table.insert(Box::new(Wind { speed: 1.0 }));
        table.insert(Box::new(Camera));

        let displaced = table.insert(Box::new(Wind { speed: 5.0 })).unwrap();
        let displaced = displaced.as_any().downcast_ref::<Wind>().unwrap();
        assert_eq!(displaced.speed, 1.0);

        assert_eq!(table.names().as_slice(), &["Wind", "Camera"]);
        assert_eq!(table.get_typed::<Wind>().unwrap().speed, 5.0);
    }

    #[test]
    fn test_take_and_restore() {
        let mut table = ComponentTable::new();
        table.insert(Box::new(Wind::default()));

        let wind = table.take("Wind").unwrap();
        assert!(table.get("Wind").is_none());
        assert!(table.contains("Wind"));

        assert!(table.restore("Wind", wind).is_none());
        assert!(table.get_typed::<Wind>().is_some());
    }

    #[test]
    fn test_restore_into_refilled_slot_is_refused() {
        let mut table = ComponentTable::new();
        table.insert(Box::new(Wind { speed: 1.0 }));

        let old = table.take("Wind").unwrap();
        table.insert(Box::new(Wind { speed: 2.0 }));

        let refused = table.restore("Wind", old);
        assert!(refused.is_some());
        assert_eq!(table.get_typed::<Wind>().unwrap().speed, 2.0);
    }

    #[test]
    fn test_matching_follows_set_pass() {
        let mut table = ComponentTable::new();
        table.insert(Box::new(Wind::default()));
        table.insert(Box::new(Camera));

        assert_eq!(table.matching(Pass::DEFAULT).as_slice(), &["Wind"]);
        assert!(table.set_pass("Camera", Pass::DEFAULT));
        assert_eq!(table.matching(Pass::DEFAULT).as_slice(), &["Wind", "Camera"]);
        assert!(table.matching(Pass::LATE).is_empty());
        assert!(!table.set_pass("Missing", Pass::LATE));
    }
}
