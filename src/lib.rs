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

//! Scenegraph ECS - entity hierarchy with pass-ordered component updates
//!
//! Entities form a tree under a root owned by an [`EntityManager`]. Each
//! entity carries named components and per-topic message handlers. One
//! [`EntityManager::update`] call runs every pass over the whole active tree,
//! finishing pass N everywhere before pass N+1 starts.

pub mod app;
pub mod component;
pub mod config;
pub mod context;
pub mod debug;
pub mod entity;
pub mod error;
pub mod event_bus;
pub mod hierarchy;
pub mod manager;
pub mod message;
pub mod pass;
pub mod prelude;
pub mod time;
pub mod transform;
pub mod utils;


pub use app::*;
pub use component::*;
pub use config::*;
pub use context::*;
pub use entity::*;
pub use error::*;
pub use event_bus::*;
pub use hierarchy::*;
pub use manager::*;
pub use message::*;
pub use pass::*;
pub use transform::*;
