//! World tunables

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Tunables for a [`World`](crate::ecs::World)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Entity slots reserved up front
    pub initial_entity_capacity: usize,
    /// Instances pre-built for component pools created on first use
    pub default_pool_size: usize,
    /// Systems whose update takes longer than this are logged at warn level (0 disables)
    pub slow_system_warning_ms: f64,
    /// Log every time a pool has to construct a fresh instance
    pub log_pool_growth: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_entity_capacity: 256,
            default_pool_size: 0,
            slow_system_warning_ms: 4.0,
            log_pool_growth: false,
        }
    }
}

impl WorldConfig {
    /// Set the number of entity slots reserved up front
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.initial_entity_capacity = capacity;
        self
    }

    /// Set the pre-built size of lazily created pools
    pub fn with_default_pool_size(mut self, size: usize) -> Self {
        self.default_pool_size = size;
        self
    }

    /// Set the slow-system warning threshold in milliseconds
    pub fn with_slow_system_warning(mut self, millis: f64) -> Self {
        self.slow_system_warning_ms = millis;
        self
    }

    /// Check values that parse but make no sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.slow_system_warning_ms.is_finite() || self.slow_system_warning_ms < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "slow_system_warning_ms must be a non-negative number, got {}",
                self.slow_system_warning_ms
            )));
        }
        Ok(())
    }
}

impl Config for WorldConfig {}
