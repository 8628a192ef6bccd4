//! Reachability and shortest-path queries.

use super::inner::EdgeMeta;
use crate::domain::PermissionId;
use petgraph::algo;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::{HashMap, HashSet, VecDeque};

/// Whether `target` is reachable from `source` along depends-on edges.
pub(super) fn has_path_impl(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
    node_map: &HashMap<PermissionId, NodeIndex>,
    source: &PermissionId,
    target: &PermissionId,
) -> bool {
    if source == target {
        return true;
    }
    let (Some(&source_node), Some(&target_node)) = (node_map.get(source), node_map.get(target))
    else {
        return false;
    };
    algo::has_path_connecting(graph, source_node, target_node, None)
}

/// One shortest path from `source` to `target` by edge count.
///
/// Unweighted BFS with a predecessor map; the returned sequence includes
/// both endpoints. `None` when unreachable.
pub(super) fn shortest_path_impl(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
    node_map: &HashMap<PermissionId, NodeIndex>,
    source: &PermissionId,
    target: &PermissionId,
) -> Option<Vec<PermissionId>> {
    if source == target {
        return Some(vec![source.clone()]);
    }
    let (Some(&source_node), Some(&target_node)) = (node_map.get(source), node_map.get(target))
    else {
        return None;
    };

    let mut predecessor: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut visited: HashSet<NodeIndex> = HashSet::from([source_node]);
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([source_node]);

    while let Some(node) = queue.pop_front() {
        for neighbor in graph.neighbors(node) {
            if visited.insert(neighbor) {
                predecessor.insert(neighbor, node);
                if neighbor == target_node {
                    return Some(reconstruct(graph, &predecessor, source_node, target_node));
                }
                queue.push_back(neighbor);
            }
        }
    }

    None
}

/// Walk the predecessor map back from `target` to `source`.
fn reconstruct(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
    predecessor: &HashMap<NodeIndex, NodeIndex>,
    source: NodeIndex,
    target: NodeIndex,
) -> Vec<PermissionId> {
    let mut indices = vec![target];
    let mut current = target;
    while current != source {
        match predecessor.get(&current) {
            Some(&previous) => {
                indices.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    indices.reverse();
    indices.into_iter().map(|node| graph[node].clone()).collect()
}
