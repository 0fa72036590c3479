//! Broadcast messages
//!
//! A message is a topic plus a value and optional keyed extras. Messages are
//! built, dispatched synchronously and dropped; nothing is queued.

use ahash::AHashMap;
use glam::{Quat, Vec3};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Topics broadcast by the core itself
pub mod topics {
    /// Sent by `set_position`, value is the new local position
    pub const UPDATE_POSITION: &str = "update.position";
    /// Sent by `set_rotation`, value is the new local rotation
    pub const UPDATE_ROTATION: &str = "update.rotation";
}

/// Message value
#[derive(Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Vec3(Vec3),
    Quat(Quat),
    Json(serde_json::Value),
    /// Anything else; receivers downcast
    Shared(Rc<dyn Any>),
}

impl Payload {
    pub fn shared<T: Any>(value: T) -> Self {
        Payload::Shared(Rc::new(value))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value; floats are not truncated
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Payload::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value, integers widen
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Payload::Float(v) => Some(*v),
            Payload::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Payload::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_quat(&self) -> Option<Quat> {
        match self {
            Payload::Quat(q) => Some(*q),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Payload::Shared(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Empty => write!(f, "Empty"),
            Payload::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Payload::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Payload::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Payload::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Payload::Vec3(v) => f.debug_tuple("Vec3").field(v).finish(),
            Payload::Quat(v) => f.debug_tuple("Quat").field(v).finish(),
            Payload::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Payload::Shared(_) => write!(f, "Shared(..)"),
        }
    }
}

impl From<bool> for Payload {
    fn from(v: bool) -> Self {
        Payload::Bool(v)
    }
}

impl From<i32> for Payload {
    fn from(v: i32) -> Self {
        Payload::Int(v as i64)
    }
}

impl From<i64> for Payload {
    fn from(v: i64) -> Self {
        Payload::Int(v)
    }
}

impl From<f32> for Payload {
    fn from(v: f32) -> Self {
        Payload::Float(v as f64)
    }
}

impl From<f64> for Payload {
    fn from(v: f64) -> Self {
        Payload::Float(v)
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Payload::Text(v.to_string())
    }
}

impl From<String> for Payload {
    fn from(v: String) -> Self {
        Payload::Text(v)
    }
}

impl From<Vec3> for Payload {
    fn from(v: Vec3) -> Self {
        Payload::Vec3(v)
    }
}

impl From<Quat> for Payload {
    fn from(v: Quat) -> Self {
        Payload::Quat(v)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(v: serde_json::Value) -> Self {
        Payload::Json(v)
    }
}

/// A topic-tagged message
#[derive(Debug, Clone)]
pub struct Message {
    topic: String,
    value: Payload,
    extra: AHashMap<String, Payload>,
}

impl Message {
    pub fn new(topic: impl Into<String>, value: impl Into<Payload>) -> Self {
        Self {
            topic: topic.into(),
            value: value.into(),
            extra: AHashMap::new(),
        }
    }

    /// Message carrying no value
    pub fn signal(topic: impl Into<String>) -> Self {
        Self::new(topic, Payload::Empty)
    }

    /// Attach an extra keyed field (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Payload>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn value(&self) -> &Payload {
        &self.value
    }

    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.extra.get(key)
    }

    pub fn extra(&self) -> &AHashMap<String, Payload> {
        &self.extra
    }
}
