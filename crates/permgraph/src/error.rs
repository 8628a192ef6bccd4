//! Error types for dependency graph operations.

use crate::domain::PermissionId;
use std::io;
use thiserror::Error;

/// The error type for dependency graph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation referenced a permission id absent from the catalog.
    #[error("permission not found in catalog: {0}")]
    UnknownNode(PermissionId),

    /// A permission was asked to depend on itself.
    #[error("permission cannot depend on itself: {0}")]
    SelfDependency(PermissionId),

    /// The proposed edge would close a cycle; the store is unchanged.
    #[error("dependency {from} -> {to} would create a cycle")]
    CycleDetected {
        /// The dependent permission of the rejected edge
        from: PermissionId,
        /// The dependency target of the rejected edge
        to: PermissionId,
    },

    /// IO error from snapshot persistence.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error from snapshot persistence.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend-specific storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// A specialized Result type for dependency graph operations.
pub type Result<T> = std::result::Result<T, Error>;
