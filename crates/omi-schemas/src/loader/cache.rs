//! Resolution cache for remote schema lookups
//!
//! One cache lives for one validation run. Entries are never invalidated
//! within the run; a new run starts from an empty cache. The cache is safe to
//! share between threads through an `Arc`.
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::SystemTime;

/// Cache entry holding a resolved schema document and where it came from
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The resolved schema document
    pub document: Map<String, Value>,
    /// Location the document was fetched from (URL or file path)
    pub location: String,
    /// When this entry was cached
    pub cached_at: SystemTime,
}

impl CacheEntry {
    /// Create a new cache entry
    pub fn new(document: Map<String, Value>, location: impl Into<String>) -> Self {
        Self {
            document,
            location: location.into(),
            cached_at: SystemTime::now(),
        }
    }
}

/// Process-local cache keyed by `_extends` reference and bound version (`ref@version`)
#[derive(Debug, Default)]
pub struct ResolutionCache {
    schemas: RwLock<HashMap<String, CacheEntry>>,
    // repository URL -> branch selected as "latest"
    latest_branches: RwLock<HashMap<String, String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resolved schema by reference
    pub fn get(&self, reference: &str) -> Option<CacheEntry> {
        let found = self
            .schemas
            .read()
            .ok()
            .and_then(|schemas| schemas.get(reference).cloned());

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Store a resolved schema
    ///
    /// The first writer wins; concurrent resolutions of the same reference
    /// produce identical documents, so a later insert is dropped.
    pub fn put(&self, reference: impl Into<String>, entry: CacheEntry) {
        if let Ok(mut schemas) = self.schemas.write() {
            schemas.entry(reference.into()).or_insert(entry);
        }
    }

    /// Branch previously selected as "latest" for a repository
    pub fn latest_branch(&self, repository: &str) -> Option<String> {
        self.latest_branches
            .read()
            .ok()
            .and_then(|branches| branches.get(repository).cloned())
    }

    /// Remember the branch selected as "latest" for a repository
    pub fn put_latest_branch(&self, repository: impl Into<String>, branch: impl Into<String>) {
        if let Ok(mut branches) = self.latest_branches.write() {
            branches.insert(repository.into(), branch.into());
        }
    }

    /// Check if a reference is cached, without touching hit statistics
    pub fn contains(&self, reference: &str) -> bool {
        self.schemas
            .read()
            .map(|schemas| schemas.contains_key(reference))
            .unwrap_or(false)
    }

    /// Number of cached schema documents
    pub fn len(&self) -> usize {
        self.schemas.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Whether no schema document is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        if let Ok(mut schemas) = self.schemas.write() {
            schemas.clear();
        }
        if let Ok(mut branches) = self.latest_branches.write() {
            branches.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics for monitoring and debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache, as a percentage
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            (self.hits as f64 / lookups as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_cache_operations() {
        let cache = ResolutionCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("/core/x.schema.omi.json").is_none());

        cache.put(
            "/core/x.schema.omi.json",
            CacheEntry::new(doc(json!({"_type": "X"})), "https://example.org/x"),
        );
        let entry = cache.get("/core/x.schema.omi.json").unwrap();
        assert_eq!(entry.document["_type"], "X");
        assert_eq!(entry.location, "https://example.org/x");
        assert!(cache.contains("/core/x.schema.omi.json"));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 50.0);
    }

    #[test]
    fn test_first_writer_wins() {
        let cache = ResolutionCache::new();
        cache.put("r", CacheEntry::new(doc(json!({"n": 1})), "a"));
        cache.put("r", CacheEntry::new(doc(json!({"n": 2})), "b"));
        assert_eq!(cache.get("r").unwrap().document["n"], 1);
    }

    #[test]
    fn test_latest_branch_memo_and_clear() {
        let cache = ResolutionCache::new();
        cache.put_latest_branch("https://github.com/o/core.git", "v4.0");
        assert_eq!(
            cache.latest_branch("https://github.com/o/core.git").as_deref(),
            Some("v4.0")
        );

        cache.put("r", CacheEntry::new(Map::new(), "a"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.latest_branch("https://github.com/o/core.git").is_none());
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(ResolutionCache::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.put(format!("ref-{}", i % 2), CacheEntry::new(Map::new(), "loc"));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 2);
    }
}
