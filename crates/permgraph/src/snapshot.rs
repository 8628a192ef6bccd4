//! JSONL edge-list persistence.
//!
//! The engine's only durable format is an edge list: one JSON-serialized
//! [`DependencyEdge`] per line. Saves go through a temp-file-then-rename
//! pattern so a crash mid-write leaves the previous snapshot intact; loads
//! are resilient, skipping damaged lines and invariant-violating edges with
//! warnings instead of failing the whole file.

use crate::catalog::{PermissionCatalog, RoleAssignments};
use crate::domain::DependencyEdge;
use crate::error::Result;
use crate::store::{new_in_memory_store, DependencyStore, ImportWarning};
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Save every stored edge to a JSONL file with an atomic write.
///
/// Edges are exported in sorted order, so two saves of the same graph
/// produce byte-identical files.
///
/// # Atomicity
///
/// Data is written to a `.tmp` sibling first and renamed over the target,
/// which is atomic on POSIX filesystems. If the process crashes before the
/// rename, the original file remains unchanged.
pub async fn save_edges(store: &dyn DependencyStore, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let file = File::create(&temp_path).await?;
    let mut writer = BufWriter::new(file);

    let edges = store.export_edges().await?;
    for edge in &edges {
        let json = serde_json::to_string(edge)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;

    tokio::fs::rename(&temp_path, path).await?;

    tracing::debug!(path = %path.display(), edges = edges.len(), "snapshot saved");
    Ok(())
}

/// Load a dependency store from a JSONL edge list.
///
/// Lines that fail to parse become [`ImportWarning::MalformedLine`]; parsed
/// edges pass through the same guards as live inserts, so self-loops,
/// unknown permissions, duplicates and cycle-closing edges are skipped with
/// warnings while every healthy edge loads. The returned graph always
/// satisfies the acyclicity invariant.
///
/// # Errors
///
/// Only unreadable files are fatal; per-line damage is reported through the
/// returned warnings.
pub async fn load_edges(
    path: &Path,
    catalog: Arc<dyn PermissionCatalog>,
    roles: Arc<dyn RoleAssignments>,
) -> Result<(Box<dyn DependencyStore>, Vec<ImportWarning>)> {
    let contents = tokio::fs::read_to_string(path).await?;

    let mut warnings = Vec::new();
    let mut edges = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<DependencyEdge>(line) {
            Ok(edge) => edges.push(edge),
            Err(error) => warnings.push(ImportWarning::MalformedLine {
                line_number: index + 1,
                error: error.to_string(),
            }),
        }
    }

    let mut store = new_in_memory_store(catalog, roles);
    let import_warnings = store.import_edges(edges).await?;
    warnings.extend(import_warnings);

    for warning in &warnings {
        tracing::warn!(warning = ?warning, "snapshot load warning");
    }

    Ok((store, warnings))
}
