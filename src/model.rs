use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

pub type NodeIndex = usize;
pub type EdgeIndex = usize;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    #[serde(default, alias = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    #[serde(alias = "source")]
    pub source_id: String,
    #[serde(alias = "target")]
    pub target_id: String,
    #[serde(default, alias = "relationship")]
    pub relationship_label: String,
    #[serde(default = "full_confidence")]
    pub confidence: f32,
}

/// A fully materialized graph as handed over by the data layer.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub center_id: Option<String>,
    #[serde(default = "default_depth")]
    pub depth: u32,
}

fn full_confidence() -> f32 {
    1.0
}

fn default_depth() -> u32 {
    1
}

pub fn parse_graph_payload(raw: &str) -> Result<GraphPayload> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in graph payload")?;
    if !parsed.is_object() {
        return Err(anyhow!("graph payload must be a JSON object with nodes and edges"));
    }

    let payload = GraphPayload::deserialize(parsed).context("graph payload has an unexpected shape")?;
    if payload.depth == 0 {
        return Err(anyhow!("traversal depth must be at least 1"));
    }
    Ok(payload)
}

pub fn load_graph_payload(path: &Path) -> Result<GraphPayload> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph payload from {}", path.display()))?;
    parse_graph_payload(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: String,
    pub entity_type: String,
    pub name: String,
    pub properties: Map<String, Value>,
    pub degree: usize,
}

impl GraphNode {
    pub fn label(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }
}

#[derive(Clone, Debug)]
pub struct GraphEdge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub relationship: String,
    pub confidence: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub dropped_edges: usize,
    pub self_loops: usize,
    pub duplicate_nodes: usize,
}

/// The node and edge collections of one graph load, indexed for lookups.
#[derive(Clone, Debug, Default)]
pub struct SessionGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub index_by_id: HashMap<String, NodeIndex>,
    pub adjacency: Vec<Vec<(NodeIndex, EdgeIndex)>>,
    pub center: Option<NodeIndex>,
    pub depth: u32,
}

impl SessionGraph {
    pub fn from_payload(payload: GraphPayload) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let mut nodes = Vec::with_capacity(payload.nodes.len());
        let mut index_by_id = HashMap::with_capacity(payload.nodes.len());

        for record in payload.nodes {
            if index_by_id.contains_key(&record.id) {
                report.duplicate_nodes += 1;
                continue;
            }
            index_by_id.insert(record.id.clone(), nodes.len());
            nodes.push(GraphNode {
                id: record.id,
                entity_type: record.entity_type,
                name: record.name,
                properties: record.properties,
                degree: 0,
            });
        }

        let mut edges = Vec::with_capacity(payload.edges.len());
        for record in payload.edges {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&record.source_id),
                index_by_id.get(&record.target_id),
            ) else {
                report.dropped_edges += 1;
                continue;
            };

            if source == target {
                report.self_loops += 1;
            }

            let confidence = if record.confidence.is_nan() {
                0.0
            } else {
                record.confidence.clamp(0.0, 1.0)
            };

            edges.push(GraphEdge {
                source,
                target,
                relationship: record.relationship_label,
                confidence,
            });
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            adjacency[edge.source].push((edge.target, edge_index));
            nodes[edge.source].degree += 1;
            if edge.source != edge.target {
                adjacency[edge.target].push((edge.source, edge_index));
                nodes[edge.target].degree += 1;
            }
        }

        let center = payload
            .center_id
            .as_ref()
            .and_then(|id| index_by_id.get(id).copied());

        report.node_count = nodes.len();
        report.edge_count = edges.len();

        if report.dropped_edges > 0 {
            warn!(
                dropped = report.dropped_edges,
                "dropping edges that reference nodes missing from the payload"
            );
        }
        if report.duplicate_nodes > 0 {
            warn!(duplicates = report.duplicate_nodes, "ignoring duplicate node ids");
        }
        info!(
            nodes = report.node_count,
            edges = report.edge_count,
            self_loops = report.self_loops,
            "graph ingested"
        );

        (
            Self {
                nodes,
                edges,
                index_by_id,
                adjacency,
                center,
                depth: payload.depth.max(1),
            },
            report,
        )
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index_by_id.get(id).copied()
    }

    pub fn neighbors(&self, index: NodeIndex) -> &[(NodeIndex, EdgeIndex)] {
        self.adjacency.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_center(&self, index: NodeIndex) -> bool {
        self.center == Some(index)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn node(id: &str) -> NodeRecord {
        NodeRecord {
            id: id.to_owned(),
            entity_type: "concept".to_owned(),
            name: String::new(),
            properties: Map::new(),
        }
    }

    pub(crate) fn edge(source: &str, target: &str, label: &str) -> EdgeRecord {
        EdgeRecord {
            source_id: source.to_owned(),
            target_id: target.to_owned(),
            relationship_label: label.to_owned(),
            confidence: 1.0,
        }
    }

    pub(crate) fn payload(ids: &[&str], links: &[(&str, &str)]) -> GraphPayload {
        GraphPayload {
            nodes: ids.iter().map(|id| node(id)).collect(),
            edges: links
                .iter()
                .map(|(source, target)| edge(source, target, "related_to"))
                .collect(),
            center_id: None,
            depth: 1,
        }
    }

    #[test]
    fn dangling_edges_are_dropped_and_counted() {
        let (graph, report) = SessionGraph::from_payload(payload(&["a", "b"], &[("a", "b"), ("a", "ghost")]));

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(report.dropped_edges, 1);
        assert_eq!(graph.nodes[0].degree, 1);
        assert_eq!(graph.nodes[1].degree, 1);
    }

    #[test]
    fn self_loops_are_kept_and_counted() {
        let mut input = payload(&["a", "b"], &[("a", "b")]);
        input.edges.push(edge("b", "b", "self"));
        let (graph, report) = SessionGraph::from_payload(input);

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(report.self_loops, 1);
        assert_eq!(report.dropped_edges, 0);
        assert_eq!(graph.nodes[1].degree, 2);
        assert_eq!(graph.adjacency[1], vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn duplicate_nodes_keep_first_record() {
        let mut input = payload(&["a", "a", "b"], &[]);
        input.nodes[1].name = "second".to_owned();
        let (graph, report) = SessionGraph::from_payload(input);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(report.duplicate_nodes, 1);
        assert_eq!(graph.nodes[0].label(), "a");
    }

    #[test]
    fn parses_camel_case_payload() {
        let raw = r#"{
            "nodes": [
                {"id": "n1", "entityType": "person", "name": "Ada"},
                {"id": "n2", "entityType": "org"}
            ],
            "edges": [
                {"sourceId": "n1", "targetId": "n2", "relationshipLabel": "works_at", "confidence": 1.7}
            ],
            "centerId": "n1",
            "depth": 2
        }"#;
        let parsed = parse_graph_payload(raw).expect("valid payload");
        assert_eq!(parsed.depth, 2);
        assert_eq!(parsed.center_id.as_deref(), Some("n1"));

        let (graph, _) = SessionGraph::from_payload(parsed);
        assert_eq!(graph.center, Some(0));
        assert_eq!(graph.edges[0].confidence, 1.0);
        assert_eq!(graph.nodes[0].label(), "Ada");
        assert_eq!(graph.nodes[1].label(), "n2");
    }

    #[test]
    fn rejects_zero_depth_and_non_objects() {
        assert!(parse_graph_payload(r#"{"nodes": [], "edges": [], "depth": 0}"#).is_err());
        assert!(parse_graph_payload("[1, 2]").is_err());
        assert!(parse_graph_payload("not json").is_err());
    }
}
