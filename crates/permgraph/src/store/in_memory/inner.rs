//! Core in-memory storage data structures.
//!
//! This module contains the inner state that holds the edge set and is
//! wrapped in `Arc<Mutex<>>` for thread safety.

use crate::catalog::{PermissionCatalog, RoleAssignments};
use crate::domain::PermissionId;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;
use std::sync::Arc;

/// Metadata carried on every stored edge.
#[derive(Debug, Clone, Copy)]
pub(super) struct EdgeMeta {
    /// Insert timestamp, preserved across export/import.
    pub(super) created_at: DateTime<Utc>,
}

/// Inner storage structure (not thread-safe).
///
/// Edge direction: source (dependent) -> target (dependency). Every node
/// present in `graph` has a corresponding entry in `node_map`.
pub(crate) struct InMemoryStoreInner {
    /// Dependency graph. Nodes carry `PermissionId`s, edges carry insert
    /// metadata. Stable indices so node removal keeps `node_map` valid.
    pub(super) graph: StableDiGraph<PermissionId, EdgeMeta>,

    /// Mapping from permission id to graph node index.
    pub(super) node_map: HashMap<PermissionId, NodeIndex>,

    /// External permission catalog, consulted to validate inputs only.
    pub(super) catalog: Arc<dyn PermissionCatalog>,

    /// External role-assignment view, consulted for usage status only.
    pub(super) roles: Arc<dyn RoleAssignments>,
}

impl InMemoryStoreInner {
    /// Create a new empty store.
    pub(crate) fn new(
        catalog: Arc<dyn PermissionCatalog>,
        roles: Arc<dyn RoleAssignments>,
    ) -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_map: HashMap::new(),
            catalog,
            roles,
        }
    }

    /// Validate that the catalog knows this permission.
    pub(super) fn require_known(&self, id: &PermissionId) -> Result<()> {
        if self.catalog.node_exists(id) {
            Ok(())
        } else {
            Err(Error::UnknownNode(id.clone()))
        }
    }

    /// Node index for `id`, creating the node on first use.
    pub(super) fn ensure_node(&mut self, id: &PermissionId) -> NodeIndex {
        if let Some(&node) = self.node_map.get(id) {
            return node;
        }
        let node = self.graph.add_node(id.clone());
        self.node_map.insert(id.clone(), node);
        node
    }
}
