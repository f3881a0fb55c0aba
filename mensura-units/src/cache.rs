//! Converter cache for repeated conversions
//!
//! The same (source, target) pairs are converted over and over in tight
//! loops. Computed converters are memoized in a bounded table. When an
//! insert would push the table past its bound, the whole table is cleared
//! first; there is no per-entry eviction.
//!
//! Entries are only ever inserted whole, under the write lock, and a
//! converter is a pure function of its key, so a reader racing a clear sees
//! either a correct entry or a miss. A miss recomputes, which is idempotent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use mensura_core::{UnitConverter, UnitError};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Unit;

/// Default bound on cached converters
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

type Key = (Unit, Unit);

/// Counters for cache behavior
#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    clears: AtomicU64,
}

/// Point-in-time copy of the cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub clears: u64,
    pub entries: usize,
}

/// Bounded, thread-safe memo of converters keyed by (source, target)
#[derive(Debug)]
pub struct ConverterCache {
    entries: RwLock<HashMap<Key, UnitConverter>>,
    max_entries: usize,
    stats: CacheStats,
}

impl ConverterCache {
    /// Create a cache holding at most `max_entries` converters (minimum 1)
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
            stats: CacheStats::default(),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Converter from `source` to `target`, computed on a miss
    pub fn get(&self, source: &Unit, target: &Unit) -> Result<UnitConverter, UnitError> {
        let key = (source.clone(), target.clone());

        if let Some(converter) = self.lookup(&key) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(converter);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        trace!(source = %source, target = %target, "converter cache miss");

        // Computed outside the lock; racing callers may compute the same
        // converter twice, both results are identical.
        let converter = source.converter_to(target)?;
        self.insert(key, converter.clone());
        Ok(converter)
    }

    fn lookup(&self, key: &Key) -> Option<UnitConverter> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn insert(&self, key: Key, converter: UnitConverter) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            debug!(entries = entries.len(), "converter cache full, clearing");
            entries.clear();
            self.stats.clears.fetch_add(1, Ordering::Relaxed);
        }
        entries.entry(key).or_insert(converter);
    }

    /// Drop every cached converter
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        self.stats.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            clears: self.stats.clears.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for ConverterCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_unit;
    use crate::UnitRegistry;

    fn units(registry: &UnitRegistry, exprs: &[&str]) -> Vec<Unit> {
        exprs.iter().map(|e| parse_unit(registry, e).unwrap()).collect()
    }

    #[test]
    fn test_hit_after_miss() {
        let registry = UnitRegistry::standard();
        let u = units(&registry, &["km", "m"]);
        let cache = ConverterCache::new(8);

        let first = cache.get(&u[0], &u[1]).unwrap();
        let second = cache.get(&u[0], &u[1]).unwrap();
        assert_eq!(first, second);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_key_is_ordered_pair() {
        let registry = UnitRegistry::standard();
        let u = units(&registry, &["km", "m"]);
        let cache = ConverterCache::new(8);

        let forward = cache.get(&u[0], &u[1]).unwrap();
        let backward = cache.get(&u[1], &u[0]).unwrap();
        assert_ne!(forward, backward);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_bulk_clear_when_full() {
        let registry = UnitRegistry::standard();
        let u = units(&registry, &["m", "km", "cm", "mm"]);
        let cache = ConverterCache::new(2);

        cache.get(&u[0], &u[1]).unwrap();
        cache.get(&u[0], &u[2]).unwrap();
        assert_eq!(cache.len(), 2);

        // Third distinct pair clears the table, then inserts
        cache.get(&u[0], &u[3]).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().clears, 1);

        // Re-requesting an evicted pair recomputes the same converter
        let again = cache.get(&u[0], &u[1]).unwrap();
        assert_eq!(again, u[0].converter_to(&u[1]).unwrap());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let registry = UnitRegistry::standard();
        let u = units(&registry, &["SG", "ppm"]);
        let cache = ConverterCache::new(4);

        assert!(matches!(cache.get(&u[0], &u[1]), Err(UnitError::IncommensurableUnits { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_bound_is_raised_to_one() {
        let cache = ConverterCache::new(0);
        assert_eq!(cache.max_entries(), 1);
    }

    #[test]
    fn test_stats_serialize() {
        let cache = ConverterCache::default();
        let json = serde_json::to_value(cache.stats()).unwrap();
        assert_eq!(json["hits"], 0);
        assert_eq!(json["entries"], 0);
    }
}
