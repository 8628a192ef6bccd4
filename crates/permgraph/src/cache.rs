//! Closure memoization with mutation-triggered invalidation.
//!
//! [`CachedStore`] wraps any [`DependencyStore`] and memoizes the expensive
//! closure queries in a bounded LRU keyed by `(permission id, direction)`,
//! with a per-entry time-to-live. Every mutation that reports a change
//! clears the whole cache namespace: a single edge affects the closures of
//! every ancestor and descendant that transits it, so endpoint-scoped
//! invalidation cannot guarantee freshness. Correctness outranks hit-rate;
//! a reader never observes pre-mutation data as if it were current.
//!
//! Cheap queries (direct neighbors, paths, integrity) pass straight
//! through to the wrapped store.

use crate::domain::{
    DependencyEdge, DependencyTreeNode, IntegrityReport, PermissionId, UsageStatus,
};
use crate::error::Result;
use crate::store::{DependencyStore, ImportWarning};
use async_trait::async_trait;
use lru::LruCache;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Configuration for [`CachedStore`].
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Maximum number of cached closure entries. A zero capacity is
    /// clamped to one.
    pub capacity: usize,

    /// How long an entry may be served before it is considered expired.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            ttl: Duration::from_secs(60),
        }
    }
}

/// Which closure a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKind {
    Dependencies,
    Dependents,
}

/// A memoized closure with its insertion time.
struct CachedClosure {
    members: HashSet<PermissionId>,
    stored_at: Instant,
}

/// A [`DependencyStore`] wrapper that memoizes closure queries.
///
/// Mutations delegate to the wrapped store first; only a mutation that
/// actually changed the edge set invalidates. Batch closure calls are
/// served from the same per-node entries as the single-node queries, so a
/// warmed cache benefits both.
pub struct CachedStore {
    inner: Box<dyn DependencyStore>,
    cache: Mutex<LruCache<(PermissionId, CacheKind), CachedClosure>>,
    ttl: Duration,
}

impl CachedStore {
    /// Wrap a store with the given cache configuration.
    pub fn new(inner: Box<dyn DependencyStore>, config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
        }
    }

    /// Wrap a store with the default configuration.
    pub fn with_default_config(inner: Box<dyn DependencyStore>) -> Self {
        Self::new(inner, CacheConfig::default())
    }

    /// Pre-compute and store both closures for each id.
    ///
    /// Used by maintenance routines to avoid cold-cache latency spikes.
    pub async fn warmup(&self, ids: &[PermissionId]) -> Result<()> {
        let dependencies = self.inner.batch_all_dependencies(ids).await?;
        let dependents = self.inner.batch_all_dependents(ids).await?;

        let mut cache = self.cache.lock().await;
        let now = Instant::now();
        for (id, members) in dependencies {
            cache.put(
                (id, CacheKind::Dependencies),
                CachedClosure {
                    members,
                    stored_at: now,
                },
            );
        }
        for (id, members) in dependents {
            cache.put(
                (id, CacheKind::Dependents),
                CachedClosure {
                    members,
                    stored_at: now,
                },
            );
        }
        Ok(())
    }

    /// Drop every cached entry.
    pub async fn invalidate_all(&self) {
        let mut cache = self.cache.lock().await;
        cache.clear();
    }

    /// Number of entries currently cached (including not-yet-evicted
    /// expired ones).
    pub async fn cached_entries(&self) -> usize {
        let cache = self.cache.lock().await;
        cache.len()
    }

    /// Fetch a live cache entry, evicting it if expired.
    async fn lookup(&self, id: &PermissionId, kind: CacheKind) -> Option<HashSet<PermissionId>> {
        let key = (id.clone(), kind);
        let mut cache = self.cache.lock().await;
        let expired = match cache.get(&key) {
            Some(entry) => {
                if entry.stored_at.elapsed() < self.ttl {
                    return Some(entry.members.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            cache.pop(&key);
        }
        None
    }

    /// Store a freshly computed closure.
    async fn store(&self, id: &PermissionId, kind: CacheKind, members: &HashSet<PermissionId>) {
        let mut cache = self.cache.lock().await;
        cache.put(
            (id.clone(), kind),
            CachedClosure {
                members: members.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Resolve one closure through the cache.
    async fn closure_through_cache(
        &self,
        id: &PermissionId,
        kind: CacheKind,
    ) -> Result<HashSet<PermissionId>> {
        if let Some(members) = self.lookup(id, kind).await {
            return Ok(members);
        }
        let members = match kind {
            CacheKind::Dependencies => self.inner.all_dependencies(id).await?,
            CacheKind::Dependents => self.inner.all_dependents(id).await?,
        };
        self.store(id, kind, &members).await;
        Ok(members)
    }

    /// Resolve a batch of closures, serving hits from the cache and
    /// computing the misses in one pass against the wrapped store.
    async fn batch_through_cache(
        &self,
        ids: &[PermissionId],
        kind: CacheKind,
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>> {
        let mut resolved = HashMap::with_capacity(ids.len());
        let mut misses = Vec::new();

        for id in ids {
            match self.lookup(id, kind).await {
                Some(members) => {
                    resolved.insert(id.clone(), members);
                }
                None => misses.push(id.clone()),
            }
        }

        if !misses.is_empty() {
            let computed = match kind {
                CacheKind::Dependencies => self.inner.batch_all_dependencies(&misses).await?,
                CacheKind::Dependents => self.inner.batch_all_dependents(&misses).await?,
            };
            for (id, members) in computed {
                self.store(&id, kind, &members).await;
                resolved.insert(id, members);
            }
        }

        Ok(resolved)
    }
}

#[async_trait]
impl DependencyStore for CachedStore {
    async fn add_dependency(&mut self, from: &PermissionId, to: &PermissionId) -> Result<bool> {
        let inserted = self.inner.add_dependency(from, to).await?;
        if inserted {
            self.invalidate_all().await;
        }
        Ok(inserted)
    }

    async fn remove_dependency(&mut self, from: &PermissionId, to: &PermissionId) -> Result<bool> {
        let removed = self.inner.remove_dependency(from, to).await?;
        if removed {
            self.invalidate_all().await;
        }
        Ok(removed)
    }

    async fn remove_all_edges_for(&mut self, id: &PermissionId) -> Result<usize> {
        let removed = self.inner.remove_all_edges_for(id).await?;
        if removed > 0 {
            self.invalidate_all().await;
        }
        Ok(removed)
    }

    async fn direct_dependencies(&self, id: &PermissionId) -> Result<HashSet<PermissionId>> {
        self.inner.direct_dependencies(id).await
    }

    async fn direct_dependents(&self, id: &PermissionId) -> Result<HashSet<PermissionId>> {
        self.inner.direct_dependents(id).await
    }

    async fn would_create_cycle(&self, from: &PermissionId, to: &PermissionId) -> Result<bool> {
        self.inner.would_create_cycle(from, to).await
    }

    async fn validate_integrity(&self) -> Result<IntegrityReport> {
        self.inner.validate_integrity().await
    }

    async fn all_dependencies(&self, id: &PermissionId) -> Result<HashSet<PermissionId>> {
        self.closure_through_cache(id, CacheKind::Dependencies).await
    }

    async fn all_dependents(&self, id: &PermissionId) -> Result<HashSet<PermissionId>> {
        self.closure_through_cache(id, CacheKind::Dependents).await
    }

    async fn dependency_tree(
        &self,
        id: &PermissionId,
        max_depth: Option<usize>,
    ) -> Result<Vec<DependencyTreeNode>> {
        self.inner.dependency_tree(id, max_depth).await
    }

    async fn has_dependency_path(
        &self,
        source: &PermissionId,
        target: &PermissionId,
    ) -> Result<bool> {
        self.inner.has_dependency_path(source, target).await
    }

    async fn dependency_path(
        &self,
        source: &PermissionId,
        target: &PermissionId,
    ) -> Result<Option<Vec<PermissionId>>> {
        self.inner.dependency_path(source, target).await
    }

    async fn has_dependencies(&self, id: &PermissionId) -> Result<bool> {
        self.inner.has_dependencies(id).await
    }

    async fn has_dependents(&self, id: &PermissionId) -> Result<bool> {
        self.inner.has_dependents(id).await
    }

    async fn batch_direct_dependencies(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>> {
        self.inner.batch_direct_dependencies(ids).await
    }

    async fn batch_direct_dependents(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>> {
        self.inner.batch_direct_dependents(ids).await
    }

    async fn batch_all_dependencies(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>> {
        self.batch_through_cache(ids, CacheKind::Dependencies).await
    }

    async fn batch_all_dependents(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>> {
        self.batch_through_cache(ids, CacheKind::Dependents).await
    }

    async fn batch_usage_status(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, UsageStatus>> {
        self.inner.batch_usage_status(ids).await
    }

    async fn export_edges(&self) -> Result<Vec<DependencyEdge>> {
        self.inner.export_edges().await
    }

    async fn import_edges(&mut self, edges: Vec<DependencyEdge>) -> Result<Vec<ImportWarning>> {
        let warnings = self.inner.import_edges(edges).await?;
        // Bulk loads may insert any number of edges; clear unconditionally.
        self.invalidate_all().await;
        Ok(warnings)
    }
}
