//! Storage abstraction layer for the dependency graph.
//!
//! This module provides the core storage trait and factory for creating
//! graph backends. The in-memory backend is the reference implementation;
//! the trait is object-safe so hosts can wrap it (see [`crate::cache`]) or
//! swap in a database-backed implementation without touching callers.
//!
//! # Architecture
//!
//! The storage layer uses an async trait to enable both blocking
//! (in-memory) and truly async (database) implementations. All access goes
//! through `Box<dyn DependencyStore>` via dynamic dispatch.
//!
//! # Edge Direction Convention
//!
//! Edges point from **dependent to dependency**: `from -> to` means `from`
//! requires `to`. Forward traversal therefore yields what a permission
//! needs; reverse traversal yields what needs it.
//!
//! # Consistency Guarantees
//!
//! - The stored graph is acyclic after every successful mutation; the cycle
//!   guard runs inside the same critical section as the insert.
//! - Batch queries resolve every id against one snapshot of the edge set;
//!   no edge can appear or vanish mid-batch.
//! - `validate_integrity` audits the whole graph and *reports* (never
//!   raises) any cycle found in data mutated outside the engine.
//!
//! # Example
//!
//! ```no_run
//! use permgraph::catalog::{StaticCatalog, StaticRoleAssignments};
//! use permgraph::domain::PermissionId;
//! use permgraph::store::new_in_memory_store;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut catalog = StaticCatalog::new();
//!     catalog.insert("users.delete", "Delete users");
//!     catalog.insert("users.read", "Read users");
//!
//!     let mut store = new_in_memory_store(
//!         Arc::new(catalog),
//!         Arc::new(StaticRoleAssignments::new()),
//!     );
//!
//!     // Deleting users is only meaningful if you can read them.
//!     let delete = PermissionId::new("users.delete");
//!     let read = PermissionId::new("users.read");
//!     store.add_dependency(&delete, &read).await?;
//!
//!     assert!(store.all_dependencies(&delete).await?.contains(&read));
//!     Ok(())
//! }
//! ```

use crate::catalog::{PermissionCatalog, RoleAssignments};
use crate::domain::{
    DependencyEdge, DependencyTreeNode, IntegrityReport, PermissionId, UsageStatus,
};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// Storage backend implementations
pub mod in_memory;

/// Core storage trait for the permission dependency graph.
///
/// Implementations must be `Send + Sync` to support concurrent access in
/// async contexts.
///
/// # Method Categories
///
/// - **Mutations**: `add_dependency`, `remove_dependency`,
///   `remove_all_edges_for`, `import_edges`
/// - **Direct neighbors**: `direct_dependencies`, `direct_dependents`
/// - **Cycle guard**: `would_create_cycle`, `validate_integrity`
/// - **Closure**: `all_dependencies`, `all_dependents`, `dependency_tree`
/// - **Paths**: `has_dependency_path`, `dependency_path`
/// - **Deletion safety**: `has_dependencies`, `has_dependents`,
///   `batch_usage_status`
/// - **Batch resolution**: `batch_direct_*`, `batch_all_*`
/// - **Persistence support**: `export_edges`, `import_edges`
///
/// # Error Handling
///
/// Unless documented otherwise, every method validates its permission ids
/// against the catalog and returns `Error::UnknownNode` for ids the catalog
/// does not know. A catalog-known permission with no edges is not an error;
/// its neighbor and closure sets are simply empty.
///
/// # Atomicity
///
/// `add_dependency` runs its existence check, cycle check and insert as one
/// atomic step against the latest committed edge set, so two concurrent
/// individually-acyclic inserts cannot jointly create a cycle.
#[async_trait]
pub trait DependencyStore: Send + Sync {
    // ========== Mutations ==========

    /// Insert the depends-on edge `from -> to`.
    ///
    /// Returns `Ok(true)` when the edge was inserted and `Ok(false)` when
    /// it already existed (strict no-op: edge metadata is left untouched).
    ///
    /// # Errors
    ///
    /// - `Error::UnknownNode` if either id is absent from the catalog
    /// - `Error::SelfDependency` if `from == to`
    /// - `Error::CycleDetected` if the edge would close a cycle; the store
    ///   is left unchanged
    async fn add_dependency(&mut self, from: &PermissionId, to: &PermissionId) -> Result<bool>;

    /// Remove the edge `from -> to`.
    ///
    /// Returns `Ok(true)` when an edge was removed and `Ok(false)` when no
    /// such edge existed (idempotent).
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if either id is absent from the catalog.
    async fn remove_dependency(&mut self, from: &PermissionId, to: &PermissionId) -> Result<bool>;

    /// Atomically remove every edge where `id` is either endpoint.
    ///
    /// This is the permission-deletion cascade. It deliberately does *not*
    /// consult the catalog: by the time the cascade runs, the permission
    /// may already be gone from it. Unknown or edge-less ids remove zero
    /// edges.
    ///
    /// Returns the number of edges removed.
    async fn remove_all_edges_for(&mut self, id: &PermissionId) -> Result<usize>;

    // ========== Direct neighbors ==========

    /// Permissions that `id` directly depends on.
    async fn direct_dependencies(&self, id: &PermissionId) -> Result<HashSet<PermissionId>>;

    /// Permissions that directly depend on `id`.
    async fn direct_dependents(&self, id: &PermissionId) -> Result<HashSet<PermissionId>>;

    // ========== Cycle guard ==========

    /// Whether inserting `from -> to` would violate acyclicity.
    ///
    /// True iff `from == to`, or `from` is already reachable from `to`
    /// along existing depends-on edges.
    async fn would_create_cycle(&self, from: &PermissionId, to: &PermissionId) -> Result<bool>;

    /// Audit the whole stored graph for cycles.
    ///
    /// Given correct use of the mutation entry points this always reports a
    /// consistent graph; it exists as a defense-in-depth diagnostic for
    /// data mutated outside the engine. A found cycle is *described* in the
    /// report, never raised as an error.
    async fn validate_integrity(&self) -> Result<IntegrityReport>;

    // ========== Closure ==========

    /// Every permission reachable from `id` via depends-on edges, at any
    /// depth. Excludes `id` itself.
    async fn all_dependencies(&self, id: &PermissionId) -> Result<HashSet<PermissionId>>;

    /// Every permission from which `id` is reachable. Excludes `id` itself.
    async fn all_dependents(&self, id: &PermissionId) -> Result<HashSet<PermissionId>>;

    /// Parent-annotated projection of the dependency closure for display.
    ///
    /// Entries come back in BFS discovery order. A node reachable via
    /// multiple paths appears once, carrying every direct parent within the
    /// projection that introduces it. The flat set from
    /// [`all_dependencies`](DependencyStore::all_dependencies) is the
    /// authoritative correctness contract.
    ///
    /// `max_depth` limits traversal; `None` means unlimited.
    async fn dependency_tree(
        &self,
        id: &PermissionId,
        max_depth: Option<usize>,
    ) -> Result<Vec<DependencyTreeNode>>;

    // ========== Paths ==========

    /// Whether `target` is reachable from `source`.
    async fn has_dependency_path(
        &self,
        source: &PermissionId,
        target: &PermissionId,
    ) -> Result<bool>;

    /// One shortest path (by edge count) from `source` to `target`,
    /// including both endpoints. `None` when unreachable;
    /// `Some([source])` when `source == target`.
    async fn dependency_path(
        &self,
        source: &PermissionId,
        target: &PermissionId,
    ) -> Result<Option<Vec<PermissionId>>>;

    // ========== Deletion safety ==========

    /// Whether `id` depends on anything.
    async fn has_dependencies(&self, id: &PermissionId) -> Result<bool>;

    /// Whether anything depends on `id`.
    ///
    /// A deleting caller must either refuse deletion while this is true or
    /// explicitly invoke
    /// [`remove_all_edges_for`](DependencyStore::remove_all_edges_for).
    async fn has_dependents(&self, id: &PermissionId) -> Result<bool>;

    // ========== Batch resolution ==========

    /// Direct dependency sets for many ids in one pass.
    ///
    /// Every input id is present in the output, possibly mapped to an
    /// empty set. All ids resolve against one consistent snapshot.
    async fn batch_direct_dependencies(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>>;

    /// Direct dependent sets for many ids in one pass.
    async fn batch_direct_dependents(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>>;

    /// Full dependency closures for many ids in one pass.
    ///
    /// Cost scales with the edges touching the batch closures, not with
    /// `|ids| x graph size`.
    async fn batch_all_dependencies(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>>;

    /// Full dependent closures for many ids in one pass.
    async fn batch_all_dependents(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>>;

    /// Usage status for many ids, used to gate safe deletion.
    ///
    /// Role attachment is answered by the external [`RoleAssignments`]
    /// collaborator. A read used to gate a subsequent delete should be
    /// re-validated at write time rather than trusted from an earlier call.
    async fn batch_usage_status(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, UsageStatus>>;

    // ========== Persistence support ==========

    /// Export every stored edge, sorted by `(from, to)` for deterministic
    /// snapshot output.
    async fn export_edges(&self) -> Result<Vec<DependencyEdge>>;

    /// Bulk-load edges, preserving their `created_at` stamps.
    ///
    /// Each edge passes through the same guards as
    /// [`add_dependency`](DependencyStore::add_dependency); edges that fail
    /// a guard are skipped and surfaced as warnings instead of aborting the
    /// load, so a damaged snapshot still yields a maximal healthy graph.
    async fn import_edges(&mut self, edges: Vec<DependencyEdge>) -> Result<Vec<ImportWarning>>;
}

/// Non-fatal problems encountered while bulk-loading edges.
///
/// These indicate data quality issues in the source (a hand-edited or
/// damaged snapshot, an export from a buggy writer); the load continues and
/// problematic edges are skipped. Callers should log or report them, since
/// they describe data that needed manual attention.
#[derive(Debug, Clone)]
pub enum ImportWarning {
    /// A snapshot line that could not be parsed.
    ///
    /// **Effect**: the line is skipped entirely.
    MalformedLine {
        /// 1-based line number in the source file
        line_number: usize,
        /// Parser error message
        error: String,
    },

    /// An edge referenced a permission the catalog does not know.
    ///
    /// **Effect**: the edge is skipped.
    UnknownNode {
        /// The unknown permission id
        id: PermissionId,
    },

    /// An edge had identical endpoints.
    ///
    /// **Effect**: the edge is skipped.
    SelfLoop {
        /// The offending permission id
        id: PermissionId,
    },

    /// The same ordered pair appeared more than once.
    ///
    /// **Effect**: the first occurrence wins; later ones are skipped.
    DuplicateEdge {
        /// Dependent endpoint of the duplicate
        from: PermissionId,
        /// Dependency endpoint of the duplicate
        to: PermissionId,
    },

    /// Adding the edge would have closed a cycle.
    ///
    /// **Effect**: the edge is skipped to keep the graph acyclic.
    CycleSkipped {
        /// Dependent endpoint of the skipped edge
        from: PermissionId,
        /// Dependency endpoint of the skipped edge
        to: PermissionId,
    },
}

/// Create an in-memory dependency store bound to the given collaborators.
///
/// This factory returns a trait object that can be used polymorphically
/// regardless of the backend implementation; wrap it in
/// [`crate::cache::CachedStore`] to memoize closure queries.
pub fn new_in_memory_store(
    catalog: Arc<dyn PermissionCatalog>,
    roles: Arc<dyn RoleAssignments>,
) -> Box<dyn DependencyStore> {
    in_memory::new_store(catalog, roles)
}
