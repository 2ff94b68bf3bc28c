//! Last report per (mutation_id, K).

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use resistaid_common::AnalysisReport;

type Key = (String, usize);

/// LRU-bounded report cache. A capacity of 0 disables it.
pub struct ReportCache {
    inner: Option<Mutex<LruCache<Key, Arc<AnalysisReport>>>>,
}

impl ReportCache {
    pub fn new(capacity: usize) -> Self {
        let inner = NonZeroUsize::new(capacity).map(|n| Mutex::new(LruCache::new(n)));
        Self { inner }
    }

    pub fn get(&self, mutation_id: &str, k: usize) -> Option<Arc<AnalysisReport>> {
        let cache = self.inner.as_ref()?;
        let mut guard = cache.lock().ok()?;
        guard.get(&(mutation_id.to_string(), k)).cloned()
    }

    pub fn put(&self, k: usize, report: Arc<AnalysisReport>) {
        if let Some(cache) = &self.inner {
            if let Ok(mut guard) = cache.lock() {
                guard.put((report.mutation_id.clone(), k), report);
            }
        }
    }

    /// Drop every entry for `mutation_id`; returns how many were removed.
    pub fn invalidate(&self, mutation_id: &str) -> usize {
        let Some(cache) = &self.inner else { return 0 };
        let Ok(mut guard) = cache.lock() else { return 0 };
        let keys: Vec<Key> = guard
            .iter()
            .filter(|(k, _)| k.0 == mutation_id)
            .map(|(k, _)| k.clone())
            .collect();
        for k in &keys {
            guard.pop(k);
        }
        keys.len()
    }

    pub fn clear(&self) {
        if let Some(cache) = &self.inner {
            if let Ok(mut guard) = cache.lock() {
                guard.clear();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .as_ref()
            .and_then(|c| c.lock().ok().map(|g| g.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
