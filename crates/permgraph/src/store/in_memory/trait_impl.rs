//! `DependencyStore` trait implementation for the in-memory backend.

use super::batch::{batch_closure_impl, batch_direct_impl};
use super::closure::{closure_impl, tree_impl};
use super::cycle::{validate_integrity_impl, would_create_cycle_impl};
use super::inner::EdgeMeta;
use super::path::{has_path_impl, shortest_path_impl};
use super::InMemoryStore;
use crate::domain::{
    DependencyEdge, DependencyTreeNode, IntegrityReport, PermissionId, UsageStatus,
};
use crate::error::{Error, Result};
use crate::store::{DependencyStore, ImportWarning};
use async_trait::async_trait;
use chrono::Utc;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

#[async_trait]
impl DependencyStore for InMemoryStore {
    async fn add_dependency(&mut self, from: &PermissionId, to: &PermissionId) -> Result<bool> {
        let mut inner = self.lock().await;

        // === Phase 1: validations (no mutations) ===
        inner.require_known(from)?;
        inner.require_known(to)?;

        if from == to {
            return Err(Error::SelfDependency(from.clone()));
        }

        // Idempotent insert: an existing edge is a strict no-op and keeps
        // its original metadata.
        if let (Some(&from_node), Some(&to_node)) =
            (inner.node_map.get(from), inner.node_map.get(to))
        {
            if inner.graph.find_edge(from_node, to_node).is_some() {
                return Ok(false);
            }
        }

        if would_create_cycle_impl(&inner.graph, &inner.node_map, from, to) {
            return Err(Error::CycleDetected {
                from: from.clone(),
                to: to.clone(),
            });
        }

        // === Phase 2: insert (all validations passed) ===
        let from_node = inner.ensure_node(from);
        let to_node = inner.ensure_node(to);
        inner.graph.add_edge(
            from_node,
            to_node,
            EdgeMeta {
                created_at: Utc::now(),
            },
        );

        tracing::debug!(%from, %to, "dependency edge added");
        Ok(true)
    }

    async fn remove_dependency(&mut self, from: &PermissionId, to: &PermissionId) -> Result<bool> {
        let mut inner = self.lock().await;

        inner.require_known(from)?;
        inner.require_known(to)?;

        let (Some(&from_node), Some(&to_node)) =
            (inner.node_map.get(from), inner.node_map.get(to))
        else {
            return Ok(false);
        };

        match inner.graph.find_edge(from_node, to_node) {
            Some(edge) => {
                inner.graph.remove_edge(edge);
                tracing::debug!(%from, %to, "dependency edge removed");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_all_edges_for(&mut self, id: &PermissionId) -> Result<usize> {
        let mut inner = self.lock().await;

        // No catalog check: this is the deletion cascade and the permission
        // may already be gone from the catalog.
        let Some(&node) = inner.node_map.get(id) else {
            return Ok(0);
        };

        let removed = inner.graph.edges_directed(node, Direction::Outgoing).count()
            + inner.graph.edges_directed(node, Direction::Incoming).count();

        inner.graph.remove_node(node);
        inner.node_map.remove(id);

        if removed > 0 {
            tracing::debug!(%id, removed, "cascaded edge removal");
        }
        Ok(removed)
    }

    async fn direct_dependencies(&self, id: &PermissionId) -> Result<HashSet<PermissionId>> {
        let inner = self.lock().await;
        inner.require_known(id)?;

        let Some(&node) = inner.node_map.get(id) else {
            return Ok(HashSet::new());
        };
        Ok(inner
            .graph
            .neighbors(node)
            .map(|neighbor| inner.graph[neighbor].clone())
            .collect())
    }

    async fn direct_dependents(&self, id: &PermissionId) -> Result<HashSet<PermissionId>> {
        let inner = self.lock().await;
        inner.require_known(id)?;

        let Some(&node) = inner.node_map.get(id) else {
            return Ok(HashSet::new());
        };
        Ok(inner
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|neighbor| inner.graph[neighbor].clone())
            .collect())
    }

    async fn would_create_cycle(&self, from: &PermissionId, to: &PermissionId) -> Result<bool> {
        let inner = self.lock().await;
        inner.require_known(from)?;
        inner.require_known(to)?;
        Ok(would_create_cycle_impl(&inner.graph, &inner.node_map, from, to))
    }

    async fn validate_integrity(&self) -> Result<IntegrityReport> {
        let inner = self.lock().await;
        Ok(validate_integrity_impl(&inner.graph))
    }

    async fn all_dependencies(&self, id: &PermissionId) -> Result<HashSet<PermissionId>> {
        let inner = self.lock().await;
        inner.require_known(id)?;
        Ok(closure_impl(
            &inner.graph,
            &inner.node_map,
            id,
            Direction::Outgoing,
        ))
    }

    async fn all_dependents(&self, id: &PermissionId) -> Result<HashSet<PermissionId>> {
        let inner = self.lock().await;
        inner.require_known(id)?;
        Ok(closure_impl(
            &inner.graph,
            &inner.node_map,
            id,
            Direction::Incoming,
        ))
    }

    async fn dependency_tree(
        &self,
        id: &PermissionId,
        max_depth: Option<usize>,
    ) -> Result<Vec<DependencyTreeNode>> {
        let inner = self.lock().await;
        inner.require_known(id)?;
        Ok(tree_impl(&inner.graph, &inner.node_map, id, max_depth))
    }

    async fn has_dependency_path(
        &self,
        source: &PermissionId,
        target: &PermissionId,
    ) -> Result<bool> {
        let inner = self.lock().await;
        inner.require_known(source)?;
        inner.require_known(target)?;
        Ok(has_path_impl(&inner.graph, &inner.node_map, source, target))
    }

    async fn dependency_path(
        &self,
        source: &PermissionId,
        target: &PermissionId,
    ) -> Result<Option<Vec<PermissionId>>> {
        let inner = self.lock().await;
        inner.require_known(source)?;
        inner.require_known(target)?;
        Ok(shortest_path_impl(
            &inner.graph,
            &inner.node_map,
            source,
            target,
        ))
    }

    async fn has_dependencies(&self, id: &PermissionId) -> Result<bool> {
        let inner = self.lock().await;
        inner.require_known(id)?;
        Ok(inner.node_map.get(id).is_some_and(|&node| {
            inner
                .graph
                .edges_directed(node, Direction::Outgoing)
                .next()
                .is_some()
        }))
    }

    async fn has_dependents(&self, id: &PermissionId) -> Result<bool> {
        let inner = self.lock().await;
        inner.require_known(id)?;
        Ok(inner.node_map.get(id).is_some_and(|&node| {
            inner
                .graph
                .edges_directed(node, Direction::Incoming)
                .next()
                .is_some()
        }))
    }

    async fn batch_direct_dependencies(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>> {
        let inner = self.lock().await;
        for id in ids {
            inner.require_known(id)?;
        }
        Ok(batch_direct_impl(&inner.graph, ids, Direction::Outgoing))
    }

    async fn batch_direct_dependents(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>> {
        let inner = self.lock().await;
        for id in ids {
            inner.require_known(id)?;
        }
        Ok(batch_direct_impl(&inner.graph, ids, Direction::Incoming))
    }

    async fn batch_all_dependencies(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>> {
        let inner = self.lock().await;
        for id in ids {
            inner.require_known(id)?;
        }
        Ok(batch_closure_impl(&inner.graph, ids, Direction::Outgoing))
    }

    async fn batch_all_dependents(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, HashSet<PermissionId>>> {
        let inner = self.lock().await;
        for id in ids {
            inner.require_known(id)?;
        }
        Ok(batch_closure_impl(&inner.graph, ids, Direction::Incoming))
    }

    async fn batch_usage_status(
        &self,
        ids: &[PermissionId],
    ) -> Result<HashMap<PermissionId, UsageStatus>> {
        let inner = self.lock().await;

        let mut statuses = HashMap::with_capacity(ids.len());
        for id in ids {
            inner.require_known(id)?;
            let has_dependents = inner.node_map.get(id).is_some_and(|&node| {
                inner
                    .graph
                    .edges_directed(node, Direction::Incoming)
                    .next()
                    .is_some()
            });
            statuses.insert(
                id.clone(),
                UsageStatus {
                    has_dependents,
                    assigned_to_active_role: inner.roles.is_assigned_to_active_role(id),
                },
            );
        }
        Ok(statuses)
    }

    async fn export_edges(&self) -> Result<Vec<DependencyEdge>> {
        let inner = self.lock().await;

        let mut edges: Vec<DependencyEdge> = inner
            .graph
            .edge_references()
            .map(|edge| DependencyEdge {
                from: inner.graph[edge.source()].clone(),
                to: inner.graph[edge.target()].clone(),
                created_at: edge.weight().created_at,
            })
            .collect();

        // Deterministic output: unique ordered pairs make (from, to) a
        // total order over the edge set.
        edges.sort();
        Ok(edges)
    }

    async fn import_edges(&mut self, edges: Vec<DependencyEdge>) -> Result<Vec<ImportWarning>> {
        let mut inner = self.lock().await;
        let mut warnings = Vec::new();

        for edge in edges {
            if !inner.catalog.node_exists(&edge.from) {
                warnings.push(ImportWarning::UnknownNode {
                    id: edge.from.clone(),
                });
                continue;
            }
            if !inner.catalog.node_exists(&edge.to) {
                warnings.push(ImportWarning::UnknownNode { id: edge.to.clone() });
                continue;
            }
            if edge.from == edge.to {
                warnings.push(ImportWarning::SelfLoop {
                    id: edge.from.clone(),
                });
                continue;
            }

            if let (Some(&from_node), Some(&to_node)) =
                (inner.node_map.get(&edge.from), inner.node_map.get(&edge.to))
            {
                if inner.graph.find_edge(from_node, to_node).is_some() {
                    warnings.push(ImportWarning::DuplicateEdge {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                    });
                    continue;
                }
            }

            if would_create_cycle_impl(&inner.graph, &inner.node_map, &edge.from, &edge.to) {
                warnings.push(ImportWarning::CycleSkipped {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
                continue;
            }

            let from_node = inner.ensure_node(&edge.from);
            let to_node = inner.ensure_node(&edge.to);
            inner.graph.add_edge(
                from_node,
                to_node,
                EdgeMeta {
                    created_at: edge.created_at,
                },
            );
        }

        Ok(warnings)
    }
}
