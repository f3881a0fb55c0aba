//! Unit system: a registry plus a converter cache
//!
//! `UnitSystem` is the entry point most callers want. It parses expressions
//! against its registry and memoizes converters between parsed units. It is
//! `Send + Sync`; share one behind an `Arc` or by reference across threads.

use std::sync::Arc;

use mensura_core::{UnitConverter, UnitError};
use tracing::debug;

use crate::cache::{CacheStatsSnapshot, ConverterCache};
use crate::config::UnitSystemConfig;
use crate::parse;
use crate::registry::UnitRegistry;
use crate::Unit;

#[derive(Debug)]
pub struct UnitSystem {
    registry: Arc<UnitRegistry>,
    cache: ConverterCache,
    config: UnitSystemConfig,
}

impl UnitSystem {
    /// Build a system over `registry`. The config's prefix setting overrides
    /// the registry's.
    pub fn new(registry: UnitRegistry, config: UnitSystemConfig) -> Result<Self, UnitError> {
        config.validate()?;
        debug!(
            units = registry.len(),
            max_cached_converters = config.max_cached_converters,
            allow_prefixes = config.allow_prefixes,
            "unit system created"
        );
        Ok(Self {
            registry: Arc::new(registry.with_prefixes(config.allow_prefixes)),
            cache: ConverterCache::new(config.max_cached_converters),
            config,
        })
    }

    /// Standard catalog with default settings
    pub fn standard() -> Self {
        let config = UnitSystemConfig::default();
        Self {
            registry: Arc::new(UnitRegistry::standard()),
            cache: ConverterCache::new(config.max_cached_converters),
            config,
        }
    }

    pub fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &UnitSystemConfig {
        &self.config
    }

    /// Parse a complete unit expression
    pub fn value_of(&self, text: &str) -> Result<Unit, UnitError> {
        parse::parse_unit(&self.registry, text)
    }

    /// Parse the product unit starting at byte offset `start`; returns the
    /// unit and the byte offset where parsing stopped
    pub fn parse_product_unit(&self, text: &str, start: usize) -> Result<(Unit, usize), UnitError> {
        parse::parse_product_unit(&self.registry, text, start)
    }

    /// Converter from `from` to `to`, memoized
    pub fn converter(&self, from: &Unit, to: &Unit) -> Result<UnitConverter, UnitError> {
        self.cache.get(from, to)
    }

    /// Convert `value` between two unit expressions
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
        let from = self.value_of(from)?;
        let to = self.value_of(to)?;
        Ok(self.converter(&from, &to)?.convert(value))
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::standard()
    }
}
