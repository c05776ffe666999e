//! # Service Configuration
//!
//! Loaded from the environment or from a YAML file. Every field has a
//! default, so an empty file (or no environment at all) yields an in-memory
//! service with the default history window.
//!
//! ```yaml
//! data_dir: /var/lib/storeops
//! history_limit: 50
//! employees:
//!   - name: Maria
//!     role: manager
//!     pin: "9001"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use storeops_core::Role;
use storeops_ledger::DEFAULT_HISTORY_LIMIT;

use crate::error::ServiceError;

/// Environment variable naming the snapshot directory.
pub const ENV_DATA_DIR: &str = "STOREOPS_DATA_DIR";
/// Environment variable overriding the default history window.
pub const ENV_HISTORY_LIMIT: &str = "STOREOPS_HISTORY_LIMIT";

/// Runtime configuration for a [`StoreService`](crate::StoreService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory holding `store.json`. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// Entries returned by carton history when the caller gives no limit.
    pub history_limit: usize,
    /// Employees registered at open if no active employee has the name.
    pub employees: Vec<EmployeeSeed>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            employees: Vec::new(),
        }
    }
}

/// An employee to register when the service opens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSeed {
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub pin: String,
}

impl std::fmt::Debug for EmployeeSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmployeeSeed")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("pin", &"[REDACTED]")
            .finish()
    }
}

impl ServiceConfig {
    /// Configuration persisted under `dir`.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Build configuration from `STOREOPS_DATA_DIR` and
    /// `STOREOPS_HISTORY_LIMIT`.
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServiceError> {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_HISTORY_LIMIT) {
            config.history_limit = parse_history_limit(&raw)?;
        }
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            ServiceError::Config(msg) => ServiceError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ServiceError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| ServiceError::Config(e.to_string()))?;
        if config.history_limit == 0 {
            return Err(ServiceError::Config(
                "history_limit must be at least 1".into(),
            ));
        }
        Ok(config)
    }
}

fn parse_history_limit(raw: &str) -> Result<usize, ServiceError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ServiceError::Config(format!(
            "{ENV_HISTORY_LIMIT} must be a positive integer, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/tmp/store"),
            (ENV_HISTORY_LIMIT, "25"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/store")));
        assert_eq!(config.history_limit, 25);
    }

    #[test]
    fn test_env_rejects_bad_limit() {
        for raw in ["0", "-3", "lots"] {
            let err = ServiceConfig::from_lookup(lookup(&[(ENV_HISTORY_LIMIT, raw)])).unwrap_err();
            assert_eq!(err.code(), "CONFIG_ERROR");
        }
    }

    #[test]
    fn test_yaml_with_seeds() {
        let yaml = r#"
history_limit: 10
employees:
  - name: Maria
    role: manager
    pin: "9001"
  - name: Bob
    pin: "1234"
"#;
        let config = ServiceConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.data_dir, None);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.employees.len(), 2);
        assert_eq!(config.employees[0].role, Role::Manager);
        assert_eq!(config.employees[1].role, Role::Employee);
    }

    #[test]
    fn test_yaml_empty_is_default() {
        assert_eq!(
            ServiceConfig::from_yaml_str("  \n").unwrap(),
            ServiceConfig::default()
        );
    }

    #[test]
    fn test_yaml_rejects_unknown_role() {
        let yaml = "employees:\n  - name: X\n    role: owner\n    pin: \"1111\"\n";
        assert!(ServiceConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_seed_debug_redacts_pin() {
        let seed = EmployeeSeed {
            name: "Bob".into(),
            role: Role::Employee,
            pin: "4321".into(),
        };
        assert!(!format!("{seed:?}").contains("4321"));
    }
}
