//! Computation Cache
//!
//! Memoizes expensive derived datasets (densities, gradient fields, sample
//! draws) by the parameters that produced them. A slider that revisits a
//! value gets the earlier result back instead of recomputing it.
//!
//! # Keys
//!
//! Parameters are serialized to JSON with every object's keys sorted, so
//! two parameter sets that differ only in field order share an entry.
//!
//! # Growth
//!
//! Entries are never evicted. The cache is meant for the small, discrete
//! parameter spaces of interactive controls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// A shared map from parameters to computed values.
///
/// Clones share entries and counters.
pub struct ComputeCache<T> {
    entries: Arc<RwLock<HashMap<String, Arc<T>>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl<T> ComputeCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the value computed for `params`, computing it with `compute` on a
    /// miss.
    ///
    /// `compute` runs without any lock held. If another caller fills the
    /// same entry meanwhile, the first stored value wins and is returned.
    pub fn get_or_compute<P, F>(&self, params: &P, compute: F) -> Result<Arc<T>>
    where
        P: Serialize + ?Sized,
        F: FnOnce() -> T,
    {
        let key = cache_key(params)?;

        if let Some(value) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(value));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%key, "cache miss");
        let computed = Arc::new(compute());

        let mut entries = self.entries.write();
        Ok(Arc::clone(entries.entry(key).or_insert(computed)))
    }

    /// Check whether a value is cached for `params`.
    pub fn contains<P: Serialize + ?Sized>(&self, params: &P) -> Result<bool> {
        let key = cache_key(params)?;
        Ok(self.entries.read().contains_key(&key))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl<T> Default for ComputeCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ComputeCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            hits: Arc::clone(&self.hits),
            misses: Arc::clone(&self.misses),
        }
    }
}

impl<T> std::fmt::Debug for ComputeCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeCache")
            .field("len", &self.len())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}

/// Canonical JSON text of `params`.
pub fn cache_key<P: Serialize + ?Sized>(params: &P) -> Result<String> {
    let value = serde_json::to_value(params).map_err(Error::CacheKey)?;
    serde_json::to_string(&canonicalize(value)).map_err(Error::CacheKey)
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(String, Value)> = map.into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(fields.into_iter().map(|(k, v)| (k, canonicalize(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Params {
        noise: f64,
        samples: usize,
    }

    #[test]
    fn computes_once_per_key() {
        let cache = ComputeCache::new();
        let mut calls = 0;

        let a = cache
            .get_or_compute(&Params { noise: 0.1, samples: 50 }, || {
                calls += 1;
                vec![1.0, 2.0]
            })
            .unwrap();
        let b = cache
            .get_or_compute(&Params { noise: 0.1, samples: 50 }, || {
                calls += 1;
                vec![]
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn distinct_params_get_distinct_entries() {
        let cache = ComputeCache::new();
        cache.get_or_compute(&json!({"noise": 0.1}), || 1).unwrap();
        cache.get_or_compute(&json!({"noise": 0.2}), || 2).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&json!({"noise": 0.2})).unwrap());
        assert!(!cache.contains(&json!({"noise": 0.3})).unwrap());
    }

    #[test]
    fn key_ignores_field_order() {
        let forward = json!({"a": 1, "b": {"y": 2, "x": 3}});
        let mut reversed = BTreeMap::new();
        reversed.insert("b", json!({"x": 3, "y": 2}));
        reversed.insert("a", json!(1));

        assert_eq!(cache_key(&forward).unwrap(), cache_key(&reversed).unwrap());
        assert_eq!(cache_key(&forward).unwrap(), r#"{"a":1,"b":{"x":3,"y":2}}"#);
    }

    #[test]
    fn unserializable_params_are_an_error() {
        let mut bad = std::collections::HashMap::new();
        bad.insert((1, 2), "tuple keys are not valid JSON object keys");

        let cache: ComputeCache<()> = ComputeCache::new();
        assert!(matches!(cache.get_or_compute(&bad, || ()), Err(Error::CacheKey(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let cache = ComputeCache::new();
        let other = cache.clone();
        cache.get_or_compute(&1u8, || "one").unwrap();

        assert_eq!(*other.get_or_compute(&1u8, || "uno").unwrap(), "one");
        assert_eq!(other.hits(), 1);
    }
}
