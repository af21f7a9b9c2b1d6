//! Read cache with per-resource tag invalidation.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::ResourceKind;

/// Cache key of a list read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: ResourceKind,
    pub page: u32,
    pub size: u32,
}

/// Raw list responses keyed by query, tagged by resource.
///
/// A write on a resource invalidates every cached read of that resource.
/// Each invalidation also bumps the resource's epoch, so a read that was
/// already in flight cannot store its outdated body afterwards.
#[derive(Debug, Default)]
pub struct QueryCache {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<QueryKey, Value>,
    epochs: HashMap<ResourceKind, u64>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached body for the key, if still fresh.
    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        let inner = self.inner.lock().ok()?;
        inner.entries.get(key).cloned()
    }

    /// Current epoch of `kind`; read before sending a request.
    pub fn epoch(&self, kind: ResourceKind) -> u64 {
        self.inner
            .lock()
            .map(|inner| inner.epochs.get(&kind).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Store a successful read issued at `epoch`.
    ///
    /// Returns false, storing nothing, when the resource was invalidated
    /// since.
    pub fn insert(&self, key: QueryKey, epoch: u64, body: Value) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        if inner.epochs.get(&key.kind).copied().unwrap_or(0) != epoch {
            tracing::debug!(
                resource = key.kind.path(),
                page = key.page,
                "read outlived an invalidation, not cached"
            );
            return false;
        }
        inner.entries.insert(key, body);
        true
    }

    /// Mark all reads of `kind` stale. Returns how many entries were dropped.
    pub fn invalidate(&self, kind: ResourceKind) -> usize {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        *inner.epochs.entry(kind).or_insert(0) += 1;
        let before = inner.entries.len();
        inner.entries.retain(|key, _| key.kind != kind);
        let dropped = before - inner.entries.len();
        tracing::debug!(resource = kind.path(), dropped, "invalidated cached reads");
        dropped
    }

    /// Number of cached reads.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(kind: ResourceKind, page: u32) -> QueryKey {
        QueryKey {
            kind,
            page,
            size: 10,
        }
    }

    #[test]
    fn test_invalidate_only_drops_tagged_resource() {
        let cache = QueryCache::new();
        cache.insert(key(ResourceKind::Campaigns, 0), 0, json!({"page": 0}));
        cache.insert(key(ResourceKind::Campaigns, 1), 0, json!({"page": 1}));
        cache.insert(key(ResourceKind::Menus, 0), 0, json!({"page": 0}));

        assert_eq!(cache.invalidate(ResourceKind::Campaigns), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key(ResourceKind::Campaigns, 0)).is_none());
        assert!(cache.get(&key(ResourceKind::Menus, 0)).is_some());
    }

    #[test]
    fn test_keys_differ_by_size() {
        let cache = QueryCache::new();
        cache.insert(key(ResourceKind::Items, 0), 0, json!(1));
        let other = QueryKey {
            kind: ResourceKind::Items,
            page: 0,
            size: 20,
        };
        assert!(cache.get(&other).is_none());
    }

    #[test]
    fn test_read_finishing_after_invalidate_is_not_cached() {
        let cache = QueryCache::new();
        let page_one = key(ResourceKind::Campaigns, 1);

        // Read starts, a write lands, then the read returns
        let epoch = cache.epoch(ResourceKind::Campaigns);
        cache.invalidate(ResourceKind::Campaigns);
        assert!(!cache.insert(page_one, epoch, json!({"page": 1})));
        assert!(cache.get(&page_one).is_none());

        // A read issued after the write is cached as usual
        let epoch = cache.epoch(ResourceKind::Campaigns);
        assert!(cache.insert(page_one, epoch, json!({"page": 1})));
        assert!(cache.get(&page_one).is_some());
    }

    #[test]
    fn test_epochs_are_per_resource() {
        let cache = QueryCache::new();
        let epoch = cache.epoch(ResourceKind::Menus);
        cache.invalidate(ResourceKind::Items);
        assert!(cache.insert(key(ResourceKind::Menus, 0), epoch, json!(0)));
    }
}
