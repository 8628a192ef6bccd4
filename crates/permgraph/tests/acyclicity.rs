//! Randomized acyclicity property: whatever sequence of inserts the engine
//! accepts, the stored graph stays consistent.

use permgraph::catalog::{StaticCatalog, StaticRoleAssignments};
use permgraph::domain::PermissionId;
use permgraph::store::new_in_memory_store;
use proptest::prelude::*;
use std::sync::Arc;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn accepted_inserts_never_create_cycles(
        pairs in proptest::collection::vec((0usize..12, 0usize..12), 1..80),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        let (report, inserted, edge_count) = runtime.block_on(async {
            let names: Vec<String> = (0..12).map(|i| format!("perm{i}")).collect();
            let catalog = StaticCatalog::from_entries(
                names.iter().map(|name| (name.as_str(), name.as_str())),
            );
            let mut store = new_in_memory_store(
                Arc::new(catalog),
                Arc::new(StaticRoleAssignments::new()),
            );

            let mut inserted = 0usize;
            for (a, b) in &pairs {
                let from = PermissionId::new(names[*a].as_str());
                let to = PermissionId::new(names[*b].as_str());
                // Self-loops and cycle-closers are rejected; duplicates
                // are no-ops. Both are expected under random input.
                if let Ok(true) = store.add_dependency(&from, &to).await {
                    inserted += 1;
                }
            }

            let report = store.validate_integrity().await.expect("integrity");
            let edge_count = store.export_edges().await.expect("export").len();
            (report, inserted, edge_count)
        });

        prop_assert!(report.is_consistent());
        prop_assert_eq!(report.edges, inserted);
        prop_assert_eq!(edge_count, inserted);
    }

    #[test]
    fn batch_resolution_always_matches_single_queries(
        pairs in proptest::collection::vec((0usize..8, 0usize..8), 1..40),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        let matches = runtime.block_on(async {
            let names: Vec<String> = (0..8).map(|i| format!("perm{i}")).collect();
            let ids: Vec<PermissionId> = names
                .iter()
                .map(|name| PermissionId::new(name.as_str()))
                .collect();
            let catalog = StaticCatalog::from_entries(
                names.iter().map(|name| (name.as_str(), name.as_str())),
            );
            let mut store = new_in_memory_store(
                Arc::new(catalog),
                Arc::new(StaticRoleAssignments::new()),
            );

            for (a, b) in &pairs {
                let _ = store.add_dependency(&ids[*a], &ids[*b]).await;
            }

            let batch = store.batch_all_dependencies(&ids).await.expect("batch");
            for id in &ids {
                let single = store.all_dependencies(id).await.expect("single");
                if batch[id] != single {
                    return false;
                }
            }
            true
        });

        prop_assert!(matches);
    }
}
