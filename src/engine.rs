use std::collections::HashSet;

use eframe::egui::{Color32, Rect, Vec2};
use serde::Serialize;
use tracing::{debug, info};

use crate::frame::{EdgeFrame, FrameSnapshot, GroupFrame, LabelFrame, MinimapFrame, NodeFrame, SegmentFrame, bounds, point};
use crate::interaction::{InteractionEvent, InteractionState, Notice};
use crate::lod::{detail_level, passes_confidence, visibility_for};
use crate::minimap::{self, MINIMAP_SIZE, MinimapOverview};
use crate::model::{GraphPayload, LoadReport, NodeIndex, SessionGraph};
use crate::routing::{
    ApproxTextMetrics, EdgeGroup, EdgeRouter, RouteRequest, RoutedPath, TextMetrics, assign_groups, label_anchor,
    label_box,
};
use crate::search::search_nodes;
use crate::simulation::{DRAG_ALPHA_TARGET, RESIZE_REHEAT_ALPHA, Simulation, TickOutcome};
use crate::style::{MIN_NODE_RADIUS, RelationshipPalette, entity_color, node_radius, rgba, with_opacity};
use crate::viewport::ViewTransform;

const FOCUS_REHEAT_ALPHA: f32 = 0.3;

/// State changes reported to the surrounding input layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    NodeClicked { id: String },
    NodeRightClicked { id: String },
    NodePinned { id: String },
    NodeUnpinned { id: String },
    SearchHighlightRequested { ids: Vec<String> },
    NavigateTo { point: [f32; 2] },
    NodeFocusRequested { id: String },
}

/// Everything that lives exactly as long as one graph load.
struct Session {
    graph: SessionGraph,
    report: LoadReport,
    simulation: Simulation,
    interaction: InteractionState,
    palette: RelationshipPalette,
    radii: Vec<f32>,
    fills: Vec<Color32>,
    strokes: Vec<Color32>,
    groups: Vec<EdgeGroup>,
    requests: Vec<RouteRequest>,
    routes: Vec<RoutedPath>,
    dragging: Option<NodeIndex>,
    focus_pin: Option<NodeIndex>,
}

impl Session {
    fn new(graph: SessionGraph, report: LoadReport, bounds: Rect) -> Self {
        let min_degree = graph.nodes.iter().map(|node| node.degree).min().unwrap_or(0);
        let max_degree = graph.nodes.iter().map(|node| node.degree).max().unwrap_or(0);
        let radii = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| node_radius(node.degree, min_degree, max_degree, graph.is_center(index)))
            .collect::<Vec<_>>();
        let fills = graph
            .nodes
            .iter()
            .map(|node| entity_color(&node.entity_type))
            .collect();

        let mut palette = RelationshipPalette::default();
        let strokes = graph
            .edges
            .iter()
            .map(|edge| palette.color_for(&edge.relationship))
            .collect();

        let groups = assign_groups(&graph);
        let requests = (0..graph.edge_count())
            .filter_map(|edge| RouteRequest::for_edge(&graph, &groups, edge))
            .collect();

        let simulation = Simulation::initialize(&graph, &radii, bounds);
        let interaction = InteractionState::new(&graph);

        let mut session = Self {
            graph,
            report,
            simulation,
            interaction,
            palette,
            radii,
            fills,
            strokes,
            groups,
            requests,
            routes: Vec::new(),
            dragging: None,
            focus_pin: None,
        };
        session.reroute();
        session
    }

    fn positions(&self) -> Vec<Vec2> {
        self.simulation.positions().collect()
    }

    fn reroute(&mut self) {
        let positions = self.positions();
        let router = EdgeRouter::new(self.simulation.alpha());
        let radii = &self.radii;

        self.routes = self
            .requests
            .iter()
            .map(|request| {
                let source = positions.get(request.source).copied().unwrap_or(Vec2::ZERO);
                let target = positions.get(request.target).copied().unwrap_or(Vec2::ZERO);
                router.route(request, source, target, &positions, |node| {
                    radii.get(node).copied().unwrap_or(MIN_NODE_RADIUS)
                })
            })
            .collect();
    }

    fn node_id(&self, node: NodeIndex) -> Option<String> {
        self.graph.nodes.get(node).map(|record| record.id.clone())
    }

    fn release_focus_pin(&mut self) {
        if let Some(node) = self.focus_pin.take()
            && self.dragging != Some(node)
        {
            self.simulation.unpin(node);
        }
    }
}

pub struct GraphEngine {
    session: Session,
    view: ViewTransform,
    confidence_threshold: f32,
    minimap_size: Vec2,
}

impl GraphEngine {
    pub fn new(viewport: Vec2) -> Self {
        let view = ViewTransform::new(viewport);
        Self {
            session: Session::new(
                SessionGraph::default(),
                LoadReport::default(),
                Rect::from_min_size(Vec2::ZERO.to_pos2(), view.size),
            ),
            view,
            confidence_threshold: 0.0,
            minimap_size: MINIMAP_SIZE,
        }
    }

    /// Replaces the current load. The previous simulation is stopped before the
    /// new one is created, and all session state (colours, groups, highlight)
    /// starts over.
    pub fn initialize(&mut self, payload: GraphPayload) -> LoadReport {
        self.session.simulation.stop();

        let (graph, report) = SessionGraph::from_payload(payload);
        self.view = ViewTransform::new(self.view.size);
        let bounds = Rect::from_min_size(Vec2::ZERO.to_pos2(), self.view.size);
        self.session = Session::new(graph, report, bounds);

        info!(
            nodes = report.node_count,
            edges = report.edge_count,
            bundles = self.session.groups.iter().filter(|group| group.is_bundled()).count(),
            relationships = self.session.palette.len(),
            "layout session started"
        );
        report
    }

    pub fn graph(&self) -> &SessionGraph {
        &self.session.graph
    }

    pub fn report(&self) -> LoadReport {
        self.session.report
    }

    pub fn simulation(&self) -> &Simulation {
        &self.session.simulation
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.session.interaction
    }

    pub fn routes(&self) -> &[RoutedPath] {
        &self.session.routes
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn radius(&self, node: NodeIndex) -> f32 {
        self.session.radii.get(node).copied().unwrap_or(MIN_NODE_RADIUS)
    }

    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.session.simulation.tick();
        if outcome.moved {
            self.session.reroute();
        }
        if !self.session.simulation.is_running()
            && let Some(node) = self.session.focus_pin
        {
            self.session.release_focus_pin();
            debug!(node, "focus pin released after settle");
        }
        outcome
    }

    /// Ticks until the layout settles or `max_ticks` is reached. Returns the
    /// number of ticks run.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.session.simulation.is_running() {
            self.tick();
            ticks += 1;
        }
        debug!(ticks, alpha = self.session.simulation.alpha(), "headless run finished");
        ticks
    }

    pub fn stop(&mut self) {
        self.session.simulation.stop();
    }

    /// New drawing-area size: moves the centering target and gently re-energises
    /// the layout without resetting positions.
    pub fn resize(&mut self, size: Vec2) {
        if !size.is_finite() || self.view.size == size {
            return;
        }
        self.view.resize(size);
        let center = self.view.size * 0.5;
        let session = &mut self.session;
        session.simulation.set_center(center);
        if let Some(node) = session.focus_pin {
            session.simulation.pin(node, center);
        }
        if session.graph.node_count() > 0 {
            session.simulation.reheat(RESIZE_REHEAT_ALPHA);
        }
        debug!(width = size.x, height = size.y, "viewport resized");
    }

    pub fn handle(&mut self, event: InteractionEvent) -> Vec<EngineEvent> {
        let session = &mut self.session;
        let transition = session.interaction.apply(&session.graph, event);
        let mut events = Vec::new();

        match event {
            InteractionEvent::Click(node) => {
                if let Some(id) = session.node_id(node) {
                    events.push(EngineEvent::NodeClicked { id });
                }
            }
            InteractionEvent::SecondaryClick(node) => {
                if let Some(id) = session.node_id(node) {
                    events.push(EngineEvent::NodeRightClicked { id });
                }
            }
            InteractionEvent::Escape | InteractionEvent::ClearHighlight => session.release_focus_pin(),
            _ => {}
        }

        for notice in &transition.notices {
            match *notice {
                Notice::Pinned(node) => events.extend(session.node_id(node).map(|id| EngineEvent::NodePinned { id })),
                Notice::Unpinned(node) => {
                    events.extend(session.node_id(node).map(|id| EngineEvent::NodeUnpinned { id }))
                }
                other => debug!(?other, "highlight notice"),
            }
        }

        if !transition.diff.is_empty() {
            debug!(
                mode = session.interaction.mode().name(),
                nodes = transition.diff.nodes.len(),
                edges = transition.diff.edges.len(),
                "highlight restyled"
            );
        }
        events
    }

    pub fn begin_drag(&mut self, node: NodeIndex) -> bool {
        let session = &mut self.session;
        let Some(position) = session.simulation.position(node) else {
            return false;
        };
        session.dragging = Some(node);
        session.simulation.pin(node, position);
        session.simulation.set_alpha_target(DRAG_ALPHA_TARGET);
        true
    }

    pub fn drag_to(&mut self, world: Vec2) {
        let session = &mut self.session;
        if let Some(node) = session.dragging {
            session.simulation.pin(node, world);
            session.reroute();
        }
    }

    pub fn end_drag(&mut self) {
        let session = &mut self.session;
        if let Some(node) = session.dragging.take() {
            session.simulation.set_alpha_target(0.0);
            if session.focus_pin != Some(node) {
                session.simulation.unpin(node);
            }
        }
    }

    pub fn dragging(&self) -> Option<NodeIndex> {
        self.session.dragging
    }

    /// Pins `id` at the centering target, re-energises the layout around it and
    /// pans the view onto it.
    pub fn focus_node(&mut self, id: &str) -> Vec<EngineEvent> {
        let Some(node) = self.session.graph.index_of(id) else {
            debug!(id, "focus requested for unknown node");
            return Vec::new();
        };

        self.session.release_focus_pin();
        let center = self.session.simulation.center();
        self.session.simulation.pin(node, center);
        self.session.simulation.reheat(FOCUS_REHEAT_ALPHA);
        self.session.focus_pin = Some(node);
        self.session.reroute();
        self.view.center_on(center);

        vec![EngineEvent::NodeFocusRequested { id: id.to_owned() }]
    }

    pub fn focus_pin(&self) -> Option<NodeIndex> {
        self.session.focus_pin
    }

    /// Fuzzy search over names and ids. An empty query clears the overlay.
    pub fn search(&mut self, query: &str) -> Vec<EngineEvent> {
        let session = &mut self.session;
        let hits = search_nodes(&session.graph, query);
        let matches = hits.iter().map(|hit| hit.node).collect::<HashSet<_>>();
        session.interaction.set_search_matches(&session.graph, matches);

        let ids = hits
            .iter()
            .filter_map(|hit| session.node_id(hit.node))
            .collect::<Vec<_>>();
        debug!(query, matches = ids.len(), "search");
        vec![EngineEvent::SearchHighlightRequested { ids }]
    }

    /// Node under a simulation-space point; the closest center wins.
    pub fn node_at(&self, world: Vec2) -> Option<NodeIndex> {
        self.session
            .simulation
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let distance = (node.position - world).length();
                (distance <= node.radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub fn zoom_at(&mut self, pointer: Vec2, factor: f32) {
        self.view.zoom_at(pointer, factor);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.view.pan_by(delta);
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn set_confidence_threshold(&mut self, threshold: f32) {
        if !threshold.is_nan() {
            self.confidence_threshold = threshold.clamp(0.0, 1.0);
        }
    }

    pub fn minimap_size(&self) -> Vec2 {
        self.minimap_size
    }

    pub fn set_minimap_size(&mut self, size: Vec2) {
        if size.is_finite() && size.min_elem() > 0.0 {
            self.minimap_size = size;
        }
    }

    pub fn minimap(&self) -> MinimapOverview {
        let positions = self.session.positions();
        let graph_bounds = minimap::graph_bounds(positions.iter().copied());
        minimap::project(&positions, graph_bounds, self.view.visible_world(), self.minimap_size)
    }

    /// Centers the main view on the simulation-space point under a minimap click.
    pub fn minimap_click(&mut self, local: Vec2) -> Vec<EngineEvent> {
        let graph_bounds = minimap::graph_bounds(self.session.simulation.positions());
        let world = minimap::unproject(local, graph_bounds, self.minimap_size);
        if !world.is_finite() {
            return Vec::new();
        }
        self.view.center_on(world);
        vec![EngineEvent::NavigateTo { point: point(world) }]
    }

    pub fn frame(&self) -> FrameSnapshot {
        self.frame_with(&ApproxTextMetrics::default())
    }

    pub fn frame_with(&self, metrics: &dyn TextMetrics) -> FrameSnapshot {
        let session = &self.session;
        let zoom = self.view.zoom;
        let threshold = self.confidence_threshold;

        let nodes = session
            .graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let sim_node = session.simulation.nodes().get(index);
                let is_center = session.graph.is_center(index);
                NodeFrame {
                    index,
                    id: node.id.clone(),
                    label: node.label().to_owned(),
                    entity_type: node.entity_type.clone(),
                    position: point(sim_node.map(|sim| sim.position).unwrap_or(Vec2::ZERO)),
                    radius: self.radius(index),
                    fill: rgba(session.fills.get(index).copied().unwrap_or(Color32::GRAY)),
                    style: session.interaction.node_style(index),
                    show_label: visibility_for(zoom, is_center, 1.0, threshold).show_node_label,
                    pinned: sim_node.is_some_and(|sim| sim.is_pinned()),
                    is_center,
                }
            })
            .collect();

        let mut edges = session
            .graph
            .edges
            .iter()
            .enumerate()
            .map(|(index, edge)| {
                let group = session
                    .groups
                    .get(index)
                    .copied()
                    .unwrap_or_else(|| EdgeGroup::single(edge.source, edge.target));
                let route = session.routes.get(index).cloned().unwrap_or_else(|| {
                    RoutedPath::straight(
                        session.simulation.position(edge.source).unwrap_or(Vec2::ZERO),
                        session.simulation.position(edge.target).unwrap_or(Vec2::ZERO),
                    )
                });
                let style = session.interaction.edge_style(index);
                let visible = passes_confidence(edge.confidence, threshold);
                let label = label_box(label_anchor(&route, &group), &edge.relationship, metrics, zoom);
                let show_label = visibility_for(zoom, false, edge.confidence, threshold).show_edge_label
                    && !edge.relationship.is_empty();
                let stroke = session.strokes.get(index).copied().unwrap_or(Color32::GRAY);
                let id_of = |node: NodeIndex| session.node_id(node).unwrap_or_default();

                EdgeFrame {
                    index,
                    source: id_of(edge.source),
                    target: id_of(edge.target),
                    relationship: edge.relationship.clone(),
                    confidence: edge.confidence,
                    kind: route.kind,
                    segments: route.segments.iter().map(SegmentFrame::from).collect(),
                    polyline: route.flatten().into_iter().map(point).collect(),
                    stroke: rgba(with_opacity(stroke, 0.55 + 0.45 * edge.confidence)),
                    style,
                    visible,
                    label: LabelFrame {
                        text: edge.relationship.clone(),
                        anchor: point(label.anchor),
                        background: bounds(label.rect),
                        visible: show_label && visible,
                    },
                    group: GroupFrame {
                        low: id_of(group.key.low),
                        high: id_of(group.key.high),
                        index: group.index,
                        size: group.size,
                    },
                }
            })
            .collect::<Vec<_>>();
        edges.sort_by(|a, b| {
            (&a.group.low, &a.group.high, a.group.index, a.index).cmp(&(&b.group.low, &b.group.high, b.group.index, b.index))
        });

        FrameSnapshot {
            tick: session.simulation.ticks(),
            alpha: session.simulation.alpha(),
            running: session.simulation.is_running(),
            zoom,
            pan: point(self.view.pan),
            detail: detail_level(zoom),
            highlight: session.interaction.mode().name(),
            confidence_threshold: threshold,
            nodes,
            edges,
            minimap: MinimapFrame::from(&self.minimap()),
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::model::tests::payload;
    use crate::routing::RouteKind;

    fn engine(ids: &[&str], links: &[(&str, &str)]) -> GraphEngine {
        let mut engine = GraphEngine::new(vec2(800.0, 600.0));
        engine.initialize(payload(ids, links));
        engine
    }

    #[test]
    fn initialize_routes_every_edge() {
        let mut input = payload(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "ghost")]);
        input.center_id = Some("a".to_owned());
        let mut engine = GraphEngine::new(vec2(800.0, 600.0));
        let report = engine.initialize(input);

        assert_eq!(report.dropped_edges, 1);
        assert_eq!(engine.routes().len(), 2);
        assert!(engine.radius(0) > engine.radius(2));
        assert!(engine.simulation().is_running());
    }

    #[test]
    fn reinitialize_resets_session_state() {
        let mut engine = engine(&["a", "b"], &[("a", "b")]);
        engine.handle(InteractionEvent::Click(0));
        engine.search("a");
        engine.initialize(payload(&["x", "y", "z"], &[("x", "y")]));

        assert_eq!(engine.interaction().mode().name(), "none");
        assert!(engine.interaction().search_matches().is_empty());
        assert_eq!(engine.graph().node_count(), 3);
        assert_eq!(engine.simulation().ticks(), 0);
    }

    #[test]
    fn settled_frame_is_consistent() {
        let mut engine = engine(&["a", "b", "c", "d"], &[("a", "b"), ("b", "a"), ("b", "c"), ("c", "d")]);
        let ticks = engine.run_until_settled(2_000);
        assert!(ticks < 2_000);
        assert!(!engine.simulation().is_running());

        let frame = engine.frame();
        assert_eq!(frame.nodes.len(), 4);
        assert_eq!(frame.edges.len(), 4);
        assert!(frame.edges.iter().all(|edge| !edge.polyline.is_empty()));
        assert!(
            frame
                .edges
                .iter()
                .flat_map(|edge| &edge.polyline)
                .all(|point| point[0].is_finite() && point[1].is_finite())
        );

        let bundled = frame.edges.iter().filter(|edge| edge.group.size == 2).collect::<Vec<_>>();
        assert_eq!(bundled.len(), 2);
        assert!(bundled.iter().all(|edge| edge.kind == RouteKind::Bundled));
        assert_eq!(frame.minimap.dots.len(), 4);
        assert!(serde_json::to_string(&frame).is_ok());
    }

    #[test]
    fn tick_after_stop_changes_nothing() {
        let mut engine = engine(&["a", "b"], &[("a", "b")]);
        engine.tick();
        engine.stop();
        let before = engine.frame();
        let outcome = engine.tick();

        assert!(!outcome.moved);
        let after = engine.frame();
        assert_eq!(before.tick, after.tick);
        assert_eq!(before.nodes[0].position, after.nodes[0].position);
    }

    #[test]
    fn resize_recenters_and_reheats() {
        let mut engine = engine(&["a", "b"], &[("a", "b")]);
        engine.run_until_settled(2_000);
        engine.resize(vec2(1000.0, 400.0));

        assert!(engine.simulation().is_running());
        assert_eq!(engine.simulation().center(), vec2(500.0, 200.0));
        assert!(engine.simulation().alpha() >= RESIZE_REHEAT_ALPHA);
    }

    #[test]
    fn clicks_and_pins_emit_events() {
        let mut engine = engine(&["a", "b"], &[("a", "b")]);

        assert_eq!(
            engine.handle(InteractionEvent::Click(1)),
            vec![EngineEvent::NodeClicked { id: "b".to_owned() }]
        );
        assert_eq!(
            engine.handle(InteractionEvent::ModifiedClick(0)),
            vec![EngineEvent::NodePinned { id: "a".to_owned() }]
        );
        assert_eq!(
            engine.handle(InteractionEvent::SecondaryClick(1)),
            vec![
                EngineEvent::NodeRightClicked { id: "b".to_owned() },
                EngineEvent::NodeUnpinned { id: "a".to_owned() },
            ]
        );
        assert!(engine.handle(InteractionEvent::Click(7)).is_empty());
    }

    #[test]
    fn drag_pins_then_releases() {
        let mut engine = engine(&["a", "b"], &[("a", "b")]);
        assert!(engine.begin_drag(0));
        engine.drag_to(vec2(50.0, 60.0));
        engine.tick();

        assert_eq!(engine.simulation().position(0), Some(vec2(50.0, 60.0)));
        assert!(engine.simulation().nodes()[0].is_pinned());

        engine.end_drag();
        assert!(!engine.simulation().nodes()[0].is_pinned());
        assert_eq!(engine.dragging(), None);
        assert!(!engine.begin_drag(9));
    }

    #[test]
    fn focus_node_pins_at_center_and_pans() {
        let mut engine = engine(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        engine.zoom_at(vec2(0.0, 0.0), 2.0);

        let events = engine.focus_node("c");
        assert_eq!(events, vec![EngineEvent::NodeFocusRequested { id: "c".to_owned() }]);
        assert_eq!(engine.focus_pin(), Some(2));
        let center = engine.simulation().center();
        assert_eq!(engine.simulation().position(2), Some(center));
        assert!((engine.view().to_screen(center) - vec2(400.0, 300.0)).length() < 1.0e-3);

        engine.handle(InteractionEvent::Escape);
        assert_eq!(engine.focus_pin(), None);
        assert!(!engine.simulation().nodes()[2].is_pinned());
        assert!(engine.focus_node("missing").is_empty());
    }

    #[test]
    fn focus_pin_is_released_once_the_layout_settles() {
        let mut engine = engine(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        engine.run_until_settled(2_000);
        engine.focus_node("c");
        assert!(engine.simulation().is_running());

        engine.tick();
        assert_eq!(engine.focus_pin(), Some(2));

        engine.run_until_settled(2_000);
        assert!(!engine.simulation().is_running());
        assert_eq!(engine.focus_pin(), None);
        assert!(!engine.simulation().nodes()[2].is_pinned());
    }

    #[test]
    fn self_loops_route_to_finite_geometry() {
        let mut engine = engine(&["a", "b"], &[("a", "b"), ("b", "b")]);
        engine.run_until_settled(2_000);
        let frame = engine.frame();

        assert_eq!(frame.edges.len(), 2);
        assert!(
            frame.edges[1]
                .polyline
                .iter()
                .all(|point| point[0].is_finite() && point[1].is_finite())
        );
    }

    #[test]
    fn search_highlights_and_clears() {
        let mut engine = engine(&["alpha", "beta", "gamma"], &[]);
        let events = engine.search("beta");
        assert_eq!(
            events,
            vec![EngineEvent::SearchHighlightRequested {
                ids: vec!["beta".to_owned()]
            }]
        );
        assert!(engine.interaction().search_matches().contains(&1));

        assert_eq!(
            engine.search(""),
            vec![EngineEvent::SearchHighlightRequested { ids: Vec::new() }]
        );
        assert!(engine.interaction().search_matches().is_empty());
    }

    #[test]
    fn node_at_finds_the_closest_center() {
        let engine = engine(&["a", "b"], &[("a", "b")]);
        let position = engine.simulation().position(1).expect("node exists");
        assert_eq!(engine.node_at(position), Some(1));
        assert_eq!(engine.node_at(position + vec2(10_000.0, 0.0)), None);
    }

    #[test]
    fn minimap_click_navigates() {
        let mut engine = engine(&["a", "b", "c"], &[("a", "b")]);
        let overview = engine.minimap();
        let target = overview.dots[2];

        let events = engine.minimap_click(target);
        let expected = engine.simulation().position(2).expect("node exists");
        let [x, y] = match events.as_slice() {
            [EngineEvent::NavigateTo { point }] => *point,
            other => panic!("unexpected events {other:?}"),
        };
        assert!((vec2(x, y) - expected).length() < 1.0e-2);
        assert!((engine.view().to_screen(expected) - vec2(400.0, 300.0)).length() < 1.0e-2);
    }

    #[test]
    fn minimap_size_follows_the_overlay() {
        let mut engine = engine(&["a", "b"], &[("a", "b")]);
        engine.set_minimap_size(vec2(300.0, 100.0));
        assert_eq!(engine.minimap().size, vec2(300.0, 100.0));

        engine.set_minimap_size(vec2(0.0, 100.0));
        assert_eq!(engine.minimap_size(), vec2(300.0, 100.0));
    }

    #[test]
    fn confidence_filter_hides_edges_and_labels() {
        let mut input = payload(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        input.edges[1].confidence = 0.2;
        let mut engine = GraphEngine::new(vec2(800.0, 600.0));
        engine.initialize(input);
        engine.set_confidence_threshold(0.5);
        engine.zoom_at(vec2(400.0, 300.0), 2.0);

        let frame = engine.frame();
        let low = frame.edges.iter().find(|edge| edge.index == 1).expect("edge exists");
        let high = frame.edges.iter().find(|edge| edge.index == 0).expect("edge exists");
        assert!(!low.visible && !low.label.visible);
        assert!(high.visible && high.label.visible);
        assert!(frame.nodes.iter().all(|node| node.show_label));
    }
}
