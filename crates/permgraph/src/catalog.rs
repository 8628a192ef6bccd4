//! External collaborator traits.
//!
//! The engine consumes two in-process services it does not own: the
//! permission catalog (which permissions exist, and their metadata) and the
//! role-assignment subsystem (whether a permission is attached to an active
//! role). Both are modeled as plain sync traits because they are in-process
//! lookups; the async boundary lives at the storage trait.
//!
//! `StaticCatalog` and `StaticRoleAssignments` are map-backed
//! implementations suitable for hosts that load their catalog up front, and
//! for tests.

use crate::domain::{PermissionId, PermissionMetadata};
use std::collections::{HashMap, HashSet};

/// Read-only view of the permission catalog.
///
/// Used only for validating inputs and enriching errors, never for graph
/// logic.
pub trait PermissionCatalog: Send + Sync {
    /// Whether a permission with this id exists in the catalog.
    fn node_exists(&self, id: &PermissionId) -> bool;

    /// Descriptive metadata for a permission, if it exists.
    fn metadata(&self, id: &PermissionId) -> Option<PermissionMetadata>;
}

/// Read-only view of the role-assignment subsystem.
pub trait RoleAssignments: Send + Sync {
    /// Whether the permission is currently attached to an active role.
    fn is_assigned_to_active_role(&self, id: &PermissionId) -> bool;
}

/// Map-backed [`PermissionCatalog`] implementation.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<PermissionId, PermissionMetadata>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from (id, name) pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut catalog = Self::new();
        for (id, name) in entries {
            catalog.insert(id.into(), name.into());
        }
        catalog
    }

    /// Register a permission.
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let id = PermissionId::new(id);
        self.entries.insert(
            id.clone(),
            PermissionMetadata {
                id,
                name: name.into(),
            },
        );
    }

    /// Remove a permission from the catalog.
    ///
    /// The caller is responsible for cascading edge removal through
    /// `remove_all_edges_for` on the store.
    pub fn remove(&mut self, id: &PermissionId) -> Option<PermissionMetadata> {
        self.entries.remove(id)
    }
}

impl PermissionCatalog for StaticCatalog {
    fn node_exists(&self, id: &PermissionId) -> bool {
        self.entries.contains_key(id)
    }

    fn metadata(&self, id: &PermissionId) -> Option<PermissionMetadata> {
        self.entries.get(id).cloned()
    }
}

/// Set-backed [`RoleAssignments`] implementation.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleAssignments {
    assigned: HashSet<PermissionId>,
}

impl StaticRoleAssignments {
    /// Create an empty assignment set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a permission as attached to an active role.
    pub fn assign(&mut self, id: impl Into<String>) {
        self.assigned.insert(PermissionId::new(id));
    }

    /// Detach a permission from all active roles.
    pub fn revoke(&mut self, id: &PermissionId) {
        self.assigned.remove(id);
    }
}

impl RoleAssignments for StaticRoleAssignments {
    fn is_assigned_to_active_role(&self, id: &PermissionId) -> bool {
        self.assigned.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_catalog_lookup() {
        let catalog = StaticCatalog::from_entries([
            ("users.read", "Read users"),
            ("users.write", "Write users"),
        ]);

        let read = PermissionId::new("users.read");
        assert!(catalog.node_exists(&read));
        assert_eq!(catalog.metadata(&read).unwrap().name, "Read users");

        let missing = PermissionId::new("users.delete");
        assert!(!catalog.node_exists(&missing));
        assert!(catalog.metadata(&missing).is_none());
    }

    #[test]
    fn static_assignments_track_active_roles() {
        let mut roles = StaticRoleAssignments::new();
        let id = PermissionId::new("billing.export");

        assert!(!roles.is_assigned_to_active_role(&id));
        roles.assign("billing.export");
        assert!(roles.is_assigned_to_active_role(&id));
        roles.revoke(&id);
        assert!(!roles.is_assigned_to_active_role(&id));
    }
}
