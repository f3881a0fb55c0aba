//! Unit system configuration

use mensura_core::UnitError;
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_MAX_ENTRIES;

/// Settings for a [`UnitSystem`](crate::UnitSystem)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSystemConfig {
    /// Bound on memoized converters before the cache is cleared
    pub max_cached_converters: usize,
    /// Resolve SI-prefixed symbols (`km`, `µbar`) on demand
    pub allow_prefixes: bool,
}

impl UnitSystemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_cached_converters(mut self, max: usize) -> Self {
        self.max_cached_converters = max;
        self
    }

    pub fn with_allow_prefixes(mut self, allow: bool) -> Self {
        self.allow_prefixes = allow;
        self
    }

    /// Load and validate a config from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, UnitError> {
        let config: Self = serde_json::from_str(json).map_err(|e| UnitError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), UnitError> {
        if self.max_cached_converters == 0 {
            return Err(UnitError::InvalidConfig {
                reason: "max_cached_converters must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for UnitSystemConfig {
    fn default() -> Self {
        Self {
            max_cached_converters: DEFAULT_MAX_ENTRIES,
            allow_prefixes: true,
        }
    }
}
