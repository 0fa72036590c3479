//! Manager configuration
//!
//! ```
//! use scenegraph_ecs::config::{DuplicatePolicy, ManagerConfig};
//!
//! let config = ManagerConfig::from_json_str(r#"{ "duplicate_names": "Replace" }"#).unwrap();
//! assert_eq!(config.duplicate_names, DuplicatePolicy::Replace);
//! assert_eq!(config.root_name, "__root__");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, Result};
use crate::pass::PassRange;

/// Name of the synthetic root entity
pub const ROOT_NAME: &str = "__root__";

/// What to do when a name is registered twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Refuse the second registration with an error
    #[default]
    Reject,
    /// Last write wins; the earlier entry is replaced and a warning logged
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub root_name: String,
    pub passes: PassRange,
    /// Entity names in the manager registry
    pub duplicate_names: DuplicatePolicy,
    /// Component names within one entity
    pub duplicate_components: DuplicatePolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            root_name: ROOT_NAME.to_string(),
            passes: PassRange::default(),
            duplicate_names: DuplicatePolicy::Reject,
            duplicate_components: DuplicatePolicy::Reject,
        }
    }
}

impl ManagerConfig {
    /// Last-write-wins for both entity and component names
    pub fn lenient() -> Self {
        Self {
            duplicate_names: DuplicatePolicy::Replace,
            duplicate_components: DuplicatePolicy::Replace,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.root_name.is_empty() {
            return Err(EcsError::ConfigError("root name must not be empty".to_string()));
        }
        self.passes.validate()
    }

    /// Parse and validate
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ManagerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::Pass;

    #[test]
    fn test_defaults_are_strict() {
        let config = ManagerConfig::default();
        assert_eq!(config.duplicate_names, DuplicatePolicy::Reject);
        assert_eq!(config.duplicate_components, DuplicatePolicy::Reject);
        assert_eq!(config.passes, PassRange::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip_with_passes() {
        let json = r#"{
            "root_name": "scene",
            "passes": { "min": 1, "max": 4 },
            "duplicate_components": "Replace"
        }"#;
        let config = ManagerConfig::from_json_str(json).unwrap();
        assert_eq!(config.root_name, "scene");
        assert_eq!(config.passes.max, Pass::LATE);
        assert_eq!(config.duplicate_names, DuplicatePolicy::Reject);
        assert_eq!(config.duplicate_components, DuplicatePolicy::Replace);

        let back = ManagerConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = ManagerConfig::from_json_str(r#"{ "passes": { "min": 3, "max": 4 } }"#);
        assert!(matches!(err, Err(EcsError::ConfigError(_))));

        let err = ManagerConfig::from_json_str(r#"{ "root_name": "" }"#);
        assert!(matches!(err, Err(EcsError::ConfigError(_))));
    }
}
