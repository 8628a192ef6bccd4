//! JSONL snapshot persistence tests.

use permgraph::catalog::{PermissionCatalog, RoleAssignments, StaticCatalog, StaticRoleAssignments};
use permgraph::domain::PermissionId;
use permgraph::snapshot::{load_edges, save_edges};
use permgraph::store::{new_in_memory_store, DependencyStore, ImportWarning};
use std::sync::Arc;
use tempfile::TempDir;

fn id(s: &str) -> PermissionId {
    PermissionId::new(s)
}

fn collaborators(names: &[&str]) -> (Arc<dyn PermissionCatalog>, Arc<dyn RoleAssignments>) {
    let catalog = StaticCatalog::from_entries(names.iter().map(|name| (*name, *name)));
    (Arc::new(catalog), Arc::new(StaticRoleAssignments::new()))
}

#[tokio::test]
async fn roundtrip_preserves_edges_and_timestamps() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("edges.jsonl");
    let (catalog, roles) = collaborators(&["a", "b", "c"]);

    let mut store = new_in_memory_store(Arc::clone(&catalog), Arc::clone(&roles));
    store.add_dependency(&id("a"), &id("b")).await.unwrap();
    store.add_dependency(&id("b"), &id("c")).await.unwrap();

    save_edges(store.as_ref(), &path).await.unwrap();
    let (loaded, warnings) = load_edges(&path, catalog, roles).await.unwrap();

    assert!(warnings.is_empty());
    assert_eq!(
        loaded.export_edges().await.unwrap(),
        store.export_edges().await.unwrap()
    );
    assert_eq!(
        loaded.all_dependencies(&id("a")).await.unwrap(),
        store.all_dependencies(&id("a")).await.unwrap()
    );
}

#[tokio::test]
async fn saves_are_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let first_path = temp_dir.path().join("first.jsonl");
    let second_path = temp_dir.path().join("second.jsonl");
    let (catalog, roles) = collaborators(&["a", "b", "c"]);

    let mut store = new_in_memory_store(catalog, roles);
    // Insert out of sorted order; the snapshot sorts by (from, to).
    store.add_dependency(&id("c"), &id("a")).await.unwrap();
    store.add_dependency(&id("a"), &id("b")).await.unwrap();

    save_edges(store.as_ref(), &first_path).await.unwrap();
    save_edges(store.as_ref(), &second_path).await.unwrap();

    let first = std::fs::read(&first_path).unwrap();
    let second = std::fs::read(&second_path).unwrap();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[tokio::test]
async fn save_replaces_previous_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("edges.jsonl");
    let (catalog, roles) = collaborators(&["a", "b"]);

    let mut store = new_in_memory_store(Arc::clone(&catalog), Arc::clone(&roles));
    store.add_dependency(&id("a"), &id("b")).await.unwrap();
    save_edges(store.as_ref(), &path).await.unwrap();

    store.remove_dependency(&id("a"), &id("b")).await.unwrap();
    save_edges(store.as_ref(), &path).await.unwrap();

    let (loaded, warnings) = load_edges(&path, catalog, roles).await.unwrap();
    assert!(warnings.is_empty());
    assert!(loaded.export_edges().await.unwrap().is_empty());
}

#[tokio::test]
async fn damaged_snapshot_loads_resiliently() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("edges.jsonl");
    let (catalog, roles) = collaborators(&["a", "b", "c"]);

    let stamp = "2026-08-08T12:00:00Z";
    let lines = [
        // Healthy chain a -> b -> c.
        format!(r#"{{"from":"a","to":"b","created_at":"{stamp}"}}"#),
        format!(r#"{{"from":"b","to":"c","created_at":"{stamp}"}}"#),
        // Damage: unparseable JSON, unknown endpoint, self-loop, duplicate
        // and a cycle-closing edge.
        "{not json".to_string(),
        format!(r#"{{"from":"a","to":"ghost","created_at":"{stamp}"}}"#),
        format!(r#"{{"from":"b","to":"b","created_at":"{stamp}"}}"#),
        format!(r#"{{"from":"a","to":"b","created_at":"{stamp}"}}"#),
        format!(r#"{{"from":"c","to":"a","created_at":"{stamp}"}}"#),
    ];
    std::fs::write(&path, lines.join("\n")).unwrap();

    let (loaded, warnings) = load_edges(&path, catalog, roles).await.unwrap();

    assert_eq!(warnings.len(), 5);
    assert!(warnings
        .iter()
        .any(|w| matches!(w, ImportWarning::MalformedLine { line_number: 3, .. })));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, ImportWarning::UnknownNode { .. })));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, ImportWarning::SelfLoop { .. })));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, ImportWarning::DuplicateEdge { .. })));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, ImportWarning::CycleSkipped { .. })));

    // Every healthy edge loaded and the result is consistent.
    assert_eq!(loaded.export_edges().await.unwrap().len(), 2);
    assert!(loaded.validate_integrity().await.unwrap().is_consistent());
    assert!(loaded.has_dependency_path(&id("a"), &id("c")).await.unwrap());
}

#[tokio::test]
async fn missing_snapshot_is_an_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.jsonl");
    let (catalog, roles) = collaborators(&["a"]);

    let result = load_edges(&path, catalog, roles).await;
    assert!(matches!(
        result.unwrap_err(),
        permgraph::error::Error::Io(_)
    ));
}
