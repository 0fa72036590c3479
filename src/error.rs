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

//! Error types

use std::fmt;

/// Scene core error type
#[derive(Debug, Clone, PartialEq)]
pub enum EcsError {
    /// Entity id is unknown or was already destroyed
    EntityNotFound,

    /// Component not attached to the entity
    ComponentNotFound(String),

    /// A component with the same name is already attached
    DuplicateComponent(String),

    /// Another registered entity already uses this name
    NameTaken(String),

    /// Operation requires a registered entity
    NotRegistered(String),

    /// `init_entity` called on an entity that is already registered
    AlreadyRegistered(String),

    /// Hierarchy operation error (cycle, self-attach, root misuse, etc.)
    HierarchyError(String),

    /// Frame delta was negative or not finite
    InvalidElapsedTime(f32),

    /// Invalid manager configuration
    ConfigError(String),

    /// Error raised by a component hook or message handler
    ComponentError(String),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::EntityNotFound => write!(f, "Entity not found"),
            EcsError::ComponentNotFound(name) => write!(f, "Component not found: {name}"),
            EcsError::DuplicateComponent(name) => {
                write!(f, "Component already attached: {name}")
            }
            EcsError::NameTaken(name) => write!(f, "Entity name already registered: {name}"),
            EcsError::NotRegistered(name) => write!(f, "Entity not registered: {name}"),
            EcsError::AlreadyRegistered(name) => {
                write!(f, "Entity already registered: {name}")
            }
            EcsError::HierarchyError(msg) => write!(f, "Hierarchy error: {msg}"),
            EcsError::InvalidElapsedTime(dt) => write!(f, "Invalid elapsed time: {dt}"),
            EcsError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            EcsError::ComponentError(msg) => write!(f, "Component error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<serde_json::Error> for EcsError {
    fn from(err: serde_json::Error) -> Self {
        EcsError::ConfigError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
