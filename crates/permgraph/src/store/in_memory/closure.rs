//! Transitive closure and tree projection.
//!
//! Both traversals are worklist BFS with a visited set; termination follows
//! from the acyclic invariant and the visited-set bound on total node
//! count.

use super::inner::EdgeMeta;
use crate::domain::{DependencyTreeNode, PermissionId};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Flat transitive closure of `id` in the given direction.
///
/// `Direction::Outgoing` yields everything `id` depends on;
/// `Direction::Incoming` yields everything that depends on `id`. The start
/// node is excluded.
pub(super) fn closure_impl(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
    node_map: &HashMap<PermissionId, NodeIndex>,
    id: &PermissionId,
    direction: Direction,
) -> HashSet<PermissionId> {
    let Some(&start) = node_map.get(id) else {
        return HashSet::new();
    };

    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
    let mut members = HashSet::new();

    while let Some(node) = queue.pop_front() {
        for neighbor in graph.neighbors_directed(node, direction) {
            if visited.insert(neighbor) {
                members.insert(graph[neighbor].clone());
                queue.push_back(neighbor);
            }
        }
    }

    members
}

/// Parent-annotated projection of the dependency closure.
///
/// One entry per closure member, in BFS discovery order. `depth` is the
/// minimal edge distance from the root; `introduced_by` lists every direct
/// parent inside the projection (the root included) that introduces the
/// node, sorted for deterministic output.
pub(super) fn tree_impl(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
    node_map: &HashMap<PermissionId, NodeIndex>,
    id: &PermissionId,
    max_depth: Option<usize>,
) -> Vec<DependencyTreeNode> {
    let Some(&start) = node_map.get(id) else {
        return Vec::new();
    };

    let mut depth_of: HashMap<NodeIndex, usize> = HashMap::new();
    let mut order: Vec<NodeIndex> = Vec::new();
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::from([(start, 0)]);

    while let Some((node, depth)) = queue.pop_front() {
        if let Some(max) = max_depth {
            if depth >= max {
                continue;
            }
        }
        for neighbor in graph.neighbors(node) {
            if visited.insert(neighbor) {
                depth_of.insert(neighbor, depth + 1);
                order.push(neighbor);
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    order
        .iter()
        .map(|&node| {
            let mut introduced_by: Vec<PermissionId> = graph
                .neighbors_directed(node, Direction::Incoming)
                .filter(|parent| visited.contains(parent))
                .map(|parent| graph[parent].clone())
                .collect();
            introduced_by.sort();

            DependencyTreeNode {
                id: graph[node].clone(),
                depth: depth_of[&node],
                introduced_by,
            }
        })
        .collect()
}
