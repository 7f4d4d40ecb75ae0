use std::collections::HashMap;

use crate::model::{NodeIndex, SessionGraph};
use crate::util::stable_hash;

pub const LANE_STEP: f32 = 3.0;
const LANE_SLOTS: u64 = 5;

/// Unordered endpoint pair; `low` is the endpoint whose id sorts first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub low: NodeIndex,
    pub high: NodeIndex,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeGroup {
    pub key: GroupKey,
    pub index: usize,
    pub size: usize,
    /// Whether the edge runs from `key.low` to `key.high`.
    pub forward: bool,
}

impl EdgeGroup {
    pub fn single(source: NodeIndex, target: NodeIndex) -> Self {
        Self {
            key: GroupKey {
                low: source,
                high: target,
            },
            index: 0,
            size: 1,
            forward: true,
        }
    }

    pub fn is_bundled(&self) -> bool {
        self.size > 1
    }

    /// Signed lane number centred on zero, e.g. -1, 0, 1 for a group of three.
    pub fn centered_lane(&self) -> f32 {
        self.index as f32 - (self.size.saturating_sub(1)) as f32 / 2.0
    }
}

pub fn group_key(graph: &SessionGraph, source: NodeIndex, target: NodeIndex) -> (GroupKey, bool) {
    let source_id = graph.nodes.get(source).map(|node| node.id.as_str()).unwrap_or_default();
    let target_id = graph.nodes.get(target).map(|node| node.id.as_str()).unwrap_or_default();

    if (source_id, source) <= (target_id, target) {
        (GroupKey { low: source, high: target }, true)
    } else {
        (GroupKey { low: target, high: source }, false)
    }
}

/// Recomputes the bundle membership of every edge, in edge order.
pub fn assign_groups(graph: &SessionGraph) -> Vec<EdgeGroup> {
    let mut sizes: HashMap<GroupKey, usize> = HashMap::new();
    let keyed = graph
        .edges
        .iter()
        .map(|edge| {
            let (key, forward) = group_key(graph, edge.source, edge.target);
            *sizes.entry(key).or_default() += 1;
            (key, forward)
        })
        .collect::<Vec<_>>();

    let mut next_index: HashMap<GroupKey, usize> = HashMap::with_capacity(sizes.len());
    keyed
        .into_iter()
        .map(|(key, forward)| {
            let slot = next_index.entry(key).or_default();
            let index = *slot;
            *slot += 1;
            EdgeGroup {
                key,
                index,
                size: sizes.get(&key).copied().unwrap_or(1),
                forward,
            }
        })
        .collect()
}

/// Perpendicular offset that keeps unrelated collinear edges apart.
///
/// Derived only from the edge's identity, so it is the same on every call.
pub fn lane_offset(source_id: &str, target_id: &str, relationship: &str) -> f32 {
    let slot = stable_hash(&(source_id, target_id, relationship)) % LANE_SLOTS;
    (slot as f32 - (LANE_SLOTS / 2) as f32) * LANE_STEP
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::model::tests::{edge, payload};

    #[test]
    fn opposite_edges_share_a_group_with_distinct_lanes() {
        let (graph, _) = SessionGraph::from_payload(payload(&["a", "b", "c"], &[("a", "b"), ("b", "a"), ("b", "c")]));
        let groups = assign_groups(&graph);

        assert_eq!(groups[0].key, groups[1].key);
        assert_eq!(groups[0].size, 2);
        assert_ne!(groups[0].index, groups[1].index);
        assert!(groups[0].forward);
        assert!(!groups[1].forward);
        assert_ne!(groups[0].centered_lane(), groups[1].centered_lane());
        assert_eq!(groups[2].size, 1);
        assert!(groups.iter().all(|group| group.index < group.size));
    }

    #[test]
    fn centered_lanes_are_symmetric() {
        let mut input = payload(&["a", "b"], &[]);
        for label in ["x", "y", "z"] {
            input.edges.push(edge("a", "b", label));
        }
        let (graph, _) = SessionGraph::from_payload(input);
        let lanes = assign_groups(&graph)
            .iter()
            .map(EdgeGroup::centered_lane)
            .collect::<Vec<_>>();
        assert_eq!(lanes, vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn lane_offsets_stay_within_slots() {
        let offset = lane_offset("a", "b", "knows");
        let max = (LANE_SLOTS / 2) as f32 * LANE_STEP;
        assert!(offset.abs() <= max);
    }

    proptest! {
        #[test]
        fn lane_offset_is_a_pure_function(
            source in "[a-z0-9]{1,12}",
            target in "[a-z0-9]{1,12}",
            label in "[a-z_]{0,10}",
            noise in proptest::collection::vec("[a-z]{1,6}", 0..8),
        ) {
            let first = lane_offset(&source, &target, &label);
            for other in &noise {
                lane_offset(other, &target, other);
            }
            prop_assert_eq!(first, lane_offset(&source, &target, &label));
        }

        #[test]
        fn reversed_pairs_share_a_group(ids in proptest::collection::hash_set("[a-z]{1,8}", 2..6)) {
            let ids = ids.into_iter().collect::<Vec<_>>();
            let first = ids[0].as_str();
            let second = ids[1].as_str();
            let refs = ids.iter().map(String::as_str).collect::<Vec<_>>();
            let (graph, _) = SessionGraph::from_payload(payload(&refs, &[(first, second), (second, first)]));
            let groups = assign_groups(&graph);

            prop_assert_eq!(groups[0].key, groups[1].key);
            prop_assert_ne!(groups[0].index, groups[1].index);
            prop_assert_ne!(groups[0].forward, groups[1].forward);
        }
    }
}
