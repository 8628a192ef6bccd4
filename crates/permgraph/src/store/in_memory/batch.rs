//! Batch resolution against a single adjacency snapshot.
//!
//! One scan over the edge set builds an id-keyed adjacency map; every id in
//! the batch then resolves against that map. The caller holds the store
//! lock for the duration, so all ids see the same graph state and the cost
//! scales with the edges touching the batch rather than `|ids| x graph
//! size`.

use super::inner::EdgeMeta;
use crate::domain::PermissionId;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Id-keyed adjacency map for the given direction.
fn adjacency_snapshot(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
    direction: Direction,
) -> HashMap<PermissionId, Vec<PermissionId>> {
    let mut adjacency: HashMap<PermissionId, Vec<PermissionId>> = HashMap::new();
    for edge in graph.edge_references() {
        let (origin, neighbor) = match direction {
            Direction::Outgoing => (edge.source(), edge.target()),
            Direction::Incoming => (edge.target(), edge.source()),
        };
        adjacency
            .entry(graph[origin].clone())
            .or_default()
            .push(graph[neighbor].clone());
    }
    adjacency
}

/// Direct neighbor sets for every id in the batch.
pub(super) fn batch_direct_impl(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
    ids: &[PermissionId],
    direction: Direction,
) -> HashMap<PermissionId, HashSet<PermissionId>> {
    let adjacency = adjacency_snapshot(graph, direction);
    ids.iter()
        .map(|id| {
            let neighbors = adjacency
                .get(id)
                .map(|neighbors| neighbors.iter().cloned().collect())
                .unwrap_or_default();
            (id.clone(), neighbors)
        })
        .collect()
}

/// Full closures for every id in the batch.
pub(super) fn batch_closure_impl(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
    ids: &[PermissionId],
    direction: Direction,
) -> HashMap<PermissionId, HashSet<PermissionId>> {
    let adjacency = adjacency_snapshot(graph, direction);
    ids.iter()
        .map(|id| (id.clone(), closure_over(&adjacency, id)))
        .collect()
}

/// BFS closure over the adjacency snapshot, excluding the start id.
fn closure_over(
    adjacency: &HashMap<PermissionId, Vec<PermissionId>>,
    start: &PermissionId,
) -> HashSet<PermissionId> {
    let mut members: HashSet<PermissionId> = HashSet::new();
    let mut visited: HashSet<&PermissionId> = HashSet::from([start]);
    let mut queue: VecDeque<&PermissionId> = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        if let Some(neighbors) = adjacency.get(node) {
            for neighbor in neighbors {
                if visited.insert(neighbor) {
                    members.insert(neighbor.clone());
                    queue.push_back(neighbor);
                }
            }
        }
    }

    members
}
