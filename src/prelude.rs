//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use scenegraph_ecs::prelude::*;
//! ```

pub use crate::app::App;
pub use crate::component::{AnyComponent, Component};
pub use crate::config::{DuplicatePolicy, ManagerConfig};
pub use crate::context::Context;
pub use crate::debug::SceneInspector;
pub use crate::entity::{EntityId, EntityNode};
pub use crate::error::{EcsError, Result};
pub use crate::event_bus::HandlerId;
pub use crate::manager::EntityManager;
pub use crate::message::{topics, Message, Payload};
pub use crate::pass::{Pass, PassRange};
pub use crate::time::Time;
pub use crate::transform::LocalTransform;
pub use glam::{Mat4, Quat, Vec3};
