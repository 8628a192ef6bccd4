//! Cycle prevention and full-graph integrity audit.
//!
//! `would_create_cycle_impl` gates every edge insert; the graph can only
//! ever contain a cycle if data is mutated outside the engine, which is
//! what `validate_integrity_impl` exists to detect.

use super::inner::EdgeMeta;
use crate::domain::{IntegrityReport, PermissionId};
use petgraph::algo;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;

/// Whether inserting `from -> to` would violate acyclicity.
///
/// Uses petgraph's `has_path_connecting`: the new edge closes a cycle iff
/// `to` already reaches `from` along existing edges.
pub(super) fn would_create_cycle_impl(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
    node_map: &HashMap<PermissionId, NodeIndex>,
    from: &PermissionId,
    to: &PermissionId,
) -> bool {
    if from == to {
        return true;
    }
    let (Some(&from_node), Some(&to_node)) = (node_map.get(from), node_map.get(to)) else {
        // An endpoint with no edges yet cannot lie on any existing path.
        return false;
    };
    algo::has_path_connecting(graph, to_node, from_node, None)
}

/// DFS coloring for the integrity audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Grey,
    Black,
}

/// Scan the whole stored graph for a cycle.
///
/// Iterative DFS with node coloring; a back edge to a grey node means the
/// grey chain from that node down to the top of the stack is a cycle, which
/// the report returns as an ordered id list following depends-on edges.
pub(super) fn validate_integrity_impl(
    graph: &StableDiGraph<PermissionId, EdgeMeta>,
) -> IntegrityReport {
    let mut color: HashMap<NodeIndex, Color> = graph
        .node_indices()
        .map(|node| (node, Color::White))
        .collect();

    for start in graph.node_indices() {
        if color[&start] != Color::White {
            continue;
        }
        color.insert(start, Color::Grey);
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>)> =
            vec![(start, graph.neighbors(start).collect())];

        loop {
            let next = match stack.last_mut() {
                None => break,
                Some((_, pending)) => pending.pop(),
            };

            match next {
                Some(neighbor) => match color[&neighbor] {
                    Color::White => {
                        color.insert(neighbor, Color::Grey);
                        let pending: Vec<NodeIndex> = graph.neighbors(neighbor).collect();
                        stack.push((neighbor, pending));
                    }
                    Color::Grey => {
                        // Back edge: the grey chain from `neighbor` to the
                        // top of the stack closes the cycle.
                        let position = stack
                            .iter()
                            .position(|(node, _)| *node == neighbor)
                            .unwrap_or(0);
                        let cycle = stack[position..]
                            .iter()
                            .map(|(node, _)| graph[*node].clone())
                            .collect();
                        return IntegrityReport {
                            nodes: graph.node_count(),
                            edges: graph.edge_count(),
                            cycle: Some(cycle),
                        };
                    }
                    Color::Black => {}
                },
                None => {
                    if let Some((finished, _)) = stack.pop() {
                        color.insert(finished, Color::Black);
                    }
                }
            }
        }
    }

    IntegrityReport {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        cycle: None,
    }
}
