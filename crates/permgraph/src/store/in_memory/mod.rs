//! In-memory dependency graph backend using petgraph.
//!
//! All edges are held in RAM; durability comes from the JSONL edge-list
//! snapshot in [`crate::snapshot`]. The implementation uses:
//!
//! - `petgraph::stable_graph::StableDiGraph` for the edge set. Stable
//!   indices matter: node removal must not invalidate the id -> index map.
//! - `HashMap<PermissionId, NodeIndex>` for O(1) node lookups.
//! - Lazy node creation: a permission enters the graph when its first edge
//!   does, and leaves it with `remove_all_edges_for`.
//!
//! # Edge Direction
//!
//! Source (dependent) -> target (dependency): the edge `a -> b` means
//! permission `a` requires permission `b`.
//!
//! # Thread Safety
//!
//! The store is wrapped in `Arc<tokio::sync::Mutex<_>>`. Every trait method
//! acquires the mutex exactly once, so the existence check, cycle check and
//! insert of `add_dependency` form a single critical section against the
//! latest committed edge set, and batch queries resolve all ids against one
//! snapshot.
//!
//! # Performance Characteristics
//!
//! - Edge insert/remove: O(degree) for the duplicate check, plus one
//!   reachability search for the cycle guard
//! - Direct neighbors: O(degree)
//! - Closure / tree / path: O(nodes + edges) bounded by a visited set
//! - Batch resolution: one edge scan plus the touched closures

mod batch;
mod closure;
mod cycle;
mod inner;
mod path;
mod trait_impl;

use crate::catalog::{PermissionCatalog, RoleAssignments};
use crate::store::DependencyStore;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe in-memory store.
///
/// This type alias wraps the inner state in `Arc<Mutex<>>` for thread-safe
/// async access. It implements [`DependencyStore`] via the trait
/// implementation in `trait_impl.rs`.
pub(crate) type InMemoryStore = Arc<Mutex<InMemoryStoreInner>>;

/// Create a new in-memory store bound to the given collaborators.
pub(crate) fn new_store(
    catalog: Arc<dyn PermissionCatalog>,
    roles: Arc<dyn RoleAssignments>,
) -> Box<dyn DependencyStore> {
    Box::new(Arc::new(Mutex::new(InMemoryStoreInner::new(catalog, roles))))
}
