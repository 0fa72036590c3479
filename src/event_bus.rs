//! Per-entity topic subscriptions
//!
//! Each entity owns a [`HandlerTable`]. Broadcasting on an entity invokes the
//! handlers registered for the message topic, in registration order, on the
//! calling thread.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::rc::Rc;

use crate::context::Context;
use crate::error::Result;
use crate::message::Message;
use crate::utils::next_id;

/// Callback invoked for a broadcast message
///
/// The context is bound to the entity the handler was registered on.
pub type Handler = Rc<dyn Fn(&mut Context<'_>, &Message) -> Result<()>>;

/// Handle returned by registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub u64);

/// Handlers dispatched by a single broadcast
pub type HandlerSnapshot = SmallVec<[Handler; 4]>;

/// Topic -> ordered handler list
#[derive(Default)]
pub struct HandlerTable {
    handlers: FxHashMap<String, Vec<(HandlerId, Handler)>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `topic`
    pub fn register<F>(&mut self, topic: &str, handler: F) -> HandlerId
    where
        F: Fn(&mut Context<'_>, &Message) -> Result<()> + 'static,
    {
        let id = HandlerId(next_id());
        let handler: Handler = Rc::new(handler);
        self.handlers
            .entry(topic.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    /// Remove one handler, returns whether it was registered
    pub fn unregister(&mut self, topic: &str, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(topic) else {
            return false;
        };
        let before = list.len();
        list.retain(|(handler_id, _)| *handler_id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(topic);
        }
        removed
    }

    /// Copy of the handlers for `topic`, taken before dispatch so handlers
    /// may register or unregister during the broadcast
    pub fn snapshot(&self, topic: &str) -> Option<HandlerSnapshot> {
        self.handlers
            .get(topic)
            .filter(|list| !list.is_empty())
            .map(|list| list.iter().map(|(_, h)| Rc::clone(h)).collect())
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.handlers.get(topic).is_some_and(|list| !list.is_empty())
    }

    pub fn handler_count(&self, topic: &str) -> usize {
        self.handlers.get(topic).map_or(0, |list| list.len())
    }

    pub fn total_handlers(&self) -> usize {
        self.handlers.values().map(|list| list.len()).sum()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (topic, list) in &self.handlers {
            map.entry(topic, &list.len());
        }
        map.finish()
    }
}
