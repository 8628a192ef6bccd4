//! Domain types for the permission dependency graph.
//!
//! Permissions themselves live in the external catalog; the engine only
//! references them by id and stores the directed depends-on edges between
//! them, plus the derived projections (trees, integrity reports, usage
//! status) handed back to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a permission in the catalog.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PermissionId(pub String);

impl PermissionId {
    /// Create a new permission ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PermissionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PermissionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Catalog-owned descriptive data for a permission.
///
/// The engine surfaces this only to enrich errors and reports; it never
/// drives graph logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMetadata {
    /// Permission identifier
    pub id: PermissionId,

    /// Human-readable permission name
    pub name: String,
}

/// A directed depends-on edge between two permissions.
///
/// `from` requires `to` to be meaningful. Edges are irreflexive and unique
/// per ordered pair; they are only ever inserted or deleted, never mutated
/// in place. `created_at` is stamped at insert time and left untouched by a
/// duplicate insert.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DependencyEdge {
    /// The dependent permission
    pub from: PermissionId,

    /// The permission being depended upon
    pub to: PermissionId,

    /// When the edge was first inserted
    pub created_at: DateTime<Utc>,
}

/// One entry in the parent-annotated dependency tree projection.
///
/// A node reachable via multiple paths appears once, annotated with every
/// direct parent inside the projected set that introduces it. The flat
/// closure from `all_dependencies` remains the authoritative contract; this
/// projection exists for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyTreeNode {
    /// The permission this entry describes
    pub id: PermissionId,

    /// Minimal edge distance from the tree root
    pub depth: usize,

    /// Direct parents within the projection that introduce this node,
    /// sorted for deterministic output
    pub introduced_by: Vec<PermissionId>,
}

/// Result of a full-graph integrity audit.
///
/// A cyclic graph is unreachable through the engine's own mutation path;
/// this report exists as a defense-in-depth diagnostic for data mutated
/// outside it. It describes pre-existing state and is never raised as an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Number of nodes scanned
    pub nodes: usize,

    /// Number of edges scanned
    pub edges: usize,

    /// The first cycle found, as an ordered list of node ids following
    /// depends-on edges; `None` when the graph is acyclic
    pub cycle: Option<Vec<PermissionId>>,
}

impl IntegrityReport {
    /// Whether the stored graph satisfies the acyclicity invariant.
    pub fn is_consistent(&self) -> bool {
        self.cycle.is_none()
    }
}

/// Usage summary for a single permission, used to gate safe deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageStatus {
    /// Whether any other permission currently depends on this one
    pub has_dependents: bool,

    /// Whether the permission is attached to an active role, per the
    /// external role-assignment subsystem
    pub assigned_to_active_role: bool,
}

impl UsageStatus {
    /// Whether the permission can be deleted without breaking dependents
    /// or active roles.
    pub fn is_deletable(&self) -> bool {
        !self.has_dependents && !self.assigned_to_active_role
    }
}
