use std::collections::VecDeque;

use crate::model::{NodeIndex, SessionGraph};

use super::collect::Selection;

/// Fewest-hop route from `start` to `end`, treating every edge as undirected.
pub(super) fn shortest_path(graph: &SessionGraph, start: NodeIndex, end: NodeIndex) -> Option<Vec<NodeIndex>> {
    let node_count = graph.node_count();
    if start >= node_count || end >= node_count {
        return None;
    }
    if start == end {
        return Some(vec![start]);
    }

    let mut queue = VecDeque::from([start]);
    let mut visited = vec![false; node_count];
    let mut parent = vec![usize::MAX; node_count];
    visited[start] = true;

    while let Some(node) = queue.pop_front() {
        if node == end {
            break;
        }

        for &(next, _) in graph.neighbors(node) {
            if !visited[next] {
                visited[next] = true;
                parent[next] = node;
                queue.push_back(next);
            }
        }
    }

    if !visited[end] {
        return None;
    }

    let mut path = vec![end];
    let mut cursor = end;
    while cursor != start {
        let previous = parent[cursor];
        if previous == usize::MAX {
            return None;
        }
        path.push(previous);
        cursor = previous;
    }
    path.reverse();
    Some(path)
}

/// Nodes of `path` plus every edge, in either direction, joining consecutive nodes.
pub(super) fn path_selection(graph: &SessionGraph, path: &[NodeIndex]) -> Selection {
    let mut selection = Selection {
        nodes: path.iter().copied().collect(),
        ..Selection::default()
    };

    for pair in path.windows(2) {
        if let &[from, to] = pair {
            selection.edges.extend(
                graph
                    .neighbors(from)
                    .iter()
                    .filter(|&&(next, _)| next == to)
                    .map(|&(_, edge)| edge),
            );
        }
    }
    selection
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::tests::payload;

    #[test]
    fn follows_the_chain() {
        let (graph, _) = SessionGraph::from_payload(payload(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("c", "b"), ("c", "d")],
        ));
        let path = shortest_path(&graph, 0, 3).expect("connected");
        assert_eq!(path, vec![0, 1, 2, 3]);

        let selection = path_selection(&graph, &path);
        assert_eq!(selection.nodes, HashSet::from([0, 1, 2, 3]));
        assert_eq!(selection.edges, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn prefers_fewer_hops() {
        let (graph, _) = SessionGraph::from_payload(payload(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")],
        ));
        assert_eq!(shortest_path(&graph, 0, 3), Some(vec![0, 3]));
    }

    #[test]
    fn disconnected_nodes_have_no_path() {
        let (graph, _) = SessionGraph::from_payload(payload(&["a", "b", "c"], &[("a", "b")]));
        assert_eq!(shortest_path(&graph, 0, 2), None);
        assert_eq!(shortest_path(&graph, 0, 9), None);
    }

    #[test]
    fn parallel_edges_are_all_on_the_path() {
        let (graph, _) = SessionGraph::from_payload(payload(&["a", "b"], &[("a", "b"), ("b", "a")]));
        let selection = path_selection(&graph, &[0, 1]);
        assert_eq!(selection.edges, HashSet::from([0, 1]));
    }
}
