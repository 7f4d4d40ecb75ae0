use std::collections::{HashSet, VecDeque};

use crate::model::{EdgeIndex, NodeIndex, SessionGraph};

/// Nodes and edges that stay emphasised under a highlight mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: HashSet<NodeIndex>,
    pub edges: HashSet<EdgeIndex>,
}

impl Selection {
    pub fn contains_node(&self, node: NodeIndex) -> bool {
        self.nodes.contains(&node)
    }

    pub fn contains_edge(&self, edge: EdgeIndex) -> bool {
        self.edges.contains(&edge)
    }
}

/// `node`, everything one edge away from it and the edges in between.
pub(super) fn direct_neighbors(graph: &SessionGraph, node: NodeIndex) -> Selection {
    let mut selection = Selection::default();
    if node >= graph.node_count() {
        return selection;
    }

    selection.nodes.insert(node);
    for (edge_index, edge) in graph.edges.iter().enumerate() {
        let other = if edge.source == node {
            edge.target
        } else if edge.target == node {
            edge.source
        } else {
            continue;
        };
        selection.nodes.insert(other);
        selection.edges.insert(edge_index);
    }
    selection
}

/// Breadth-first neighbourhood of `center` up to `hops` edges away, ignoring
/// edge direction. Edges are kept only when both endpoints are inside.
pub(super) fn neighborhood(graph: &SessionGraph, center: NodeIndex, hops: usize) -> Selection {
    let mut selection = Selection::default();
    if center >= graph.node_count() {
        return selection;
    }

    let mut queue = VecDeque::from([(center, 0usize)]);
    selection.nodes.insert(center);

    while let Some((node, depth)) = queue.pop_front() {
        if depth >= hops {
            continue;
        }

        for &(next, _) in graph.neighbors(node) {
            if selection.nodes.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }

    selection.edges = graph
        .edges
        .iter()
        .enumerate()
        .filter(|(_, edge)| selection.nodes.contains(&edge.source) && selection.nodes.contains(&edge.target))
        .map(|(index, _)| index)
        .collect();
    selection
}
