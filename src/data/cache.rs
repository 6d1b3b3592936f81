use crate::types::TraitKey;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

/// Memoized yields keyed by trait signature, shared across rayon workers
///
/// Entries live for one optimization run; nothing is evicted.
#[derive(Debug, Default)]
pub struct FitnessCache {
    data: Mutex<HashMap<TraitKey, f64>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl FitnessCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TraitKey, f64>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Counts a hit or a miss
    pub fn get(&self, key: &TraitKey) -> Option<f64> {
        let value = self.lock().get(key).copied();
        let counter = if value.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// First write wins; a signature's fitness never changes within a run
    pub fn set(&self, key: TraitKey, value: f64) {
        self.lock().entry(key).or_insert(value);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Traits;

    #[test]
    fn test_first_write_wins() {
        let cache = FitnessCache::new();
        let key = Traits::default().key();
        assert!(cache.get(&key).is_none());
        cache.set(key, 4.0);
        cache.set(key, 9.0);
        assert_eq!(cache.get(&key), Some(4.0));
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 1
            }
        );
        cache.clear();
        assert!(cache.is_empty());
    }
}
