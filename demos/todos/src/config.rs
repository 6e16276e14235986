//! Configuration for the todos demo, read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `TODOS_LOG` | `todos=info,statecraft_runtime=debug` | Log filter used when `RUST_LOG` is unset |
//! | `TODOS_BROADCAST_CAPACITY` | `16` | Capacity of the dispatched-action channel |
//! | `TODOS_METRICS` | `false` | Install the Prometheus recorder and print it on exit |

use statecraft_runtime::StoreConfig;
use thiserror::Error;

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "todos=info,statecraft_runtime=debug";

/// Default capacity of the action broadcast channel
pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

/// Errors from reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but does not parse
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
        /// What was expected
        reason: &'static str,
    },
}

/// Demo configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
    /// Whether to install the Prometheus recorder
    pub metrics: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            metrics: false,
        }
    }
}

impl DemoConfig {
    /// Read the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to a value
    /// that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value
    ///
    /// Unset variables keep their defaults. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to a value
    /// that does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(filter) = get("TODOS_LOG") {
            config.log_filter = filter;
        }

        if let Some(raw) = get("TODOS_BROADCAST_CAPACITY") {
            config.broadcast_capacity = match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "TODOS_BROADCAST_CAPACITY",
                        value: raw,
                        reason: "expected a positive integer",
                    });
                },
            };
        }

        if let Some(raw) = get("TODOS_METRICS") {
            config.metrics = match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "TODOS_METRICS",
                        value: raw,
                        reason: "expected true, false, 1 or 0",
                    });
                },
            };
        }

        Ok(config)
    }

    /// Store configuration derived from this config
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default().with_action_broadcast_capacity(self.broadcast_capacity)
    }
}
