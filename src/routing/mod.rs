pub mod groups;
pub mod labels;
mod octilinear;

use eframe::egui::Vec2;
use serde::Serialize;

use crate::geometry::{
    CubicBezier, EPSILON, QuadraticBezier, angle_of, closest_t_on_segment, distance_to_segment,
    is_degenerate, is_octilinear, left_normal, point_along, segment_hits_circle,
    unit_direction,
};
use crate::model::{EdgeIndex, NodeIndex, SessionGraph};

pub use groups::{EdgeGroup, GroupKey, assign_groups, group_key, lane_offset};
pub use labels::{ApproxTextMetrics, LabelBox, TextMetrics, label_anchor, label_box, label_t};

/// Layout energy above which edges are drawn as plain lines.
pub const HIGH_ENERGY_ALPHA: f32 = 0.12;
pub const BUNDLE_SPACING: f32 = 16.0;
pub const OBSTACLE_PADDING: f32 = 12.0;
pub const CORNER_RADIUS: f32 = 8.0;
/// About two degrees.
pub const OCTILINEAR_TOLERANCE: f32 = 0.035;

const CURVE_STEPS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    Line { start: Vec2, end: Vec2 },
    Quadratic(QuadraticBezier),
    Cubic(CubicBezier),
}

impl PathSegment {
    pub fn start(&self) -> Vec2 {
        match self {
            Self::Line { start, .. } => *start,
            Self::Quadratic(curve) => curve.start,
            Self::Cubic(curve) => curve.start,
        }
    }

    pub fn end(&self) -> Vec2 {
        match self {
            Self::Line { end, .. } => *end,
            Self::Quadratic(curve) => curve.end,
            Self::Cubic(curve) => curve.end,
        }
    }

    pub fn sample(&self, t: f32) -> Vec2 {
        match self {
            Self::Line { start, end } => *start + (*end - *start) * t,
            Self::Quadratic(curve) => curve.sample(t),
            Self::Cubic(curve) => curve.sample(t),
        }
    }

    /// Appends every point after the segment start.
    fn flatten_into(&self, points: &mut Vec<Vec2>) {
        match self {
            Self::Line { end, .. } => points.push(*end),
            _ => points.extend((1..=CURVE_STEPS).map(|step| self.sample(step as f32 / CURVE_STEPS as f32))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Straight,
    Bundled,
    Octilinear,
    Detour,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoutedPath {
    pub kind: RouteKind,
    pub segments: Vec<PathSegment>,
}

impl RoutedPath {
    /// Single straight segment. Non-finite endpoints collapse onto a finite one.
    pub fn straight(start: Vec2, end: Vec2) -> Self {
        let (start, end) = match (start.is_finite(), end.is_finite()) {
            (true, true) => (start, end),
            (true, false) => (start, start),
            (false, true) => (end, end),
            (false, false) => (Vec2::ZERO, Vec2::ZERO),
        };
        Self {
            kind: RouteKind::Straight,
            segments: vec![PathSegment::Line { start, end }],
        }
    }

    fn with_kind(mut self, kind: RouteKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn start(&self) -> Vec2 {
        self.segments.first().map(PathSegment::start).unwrap_or(Vec2::ZERO)
    }

    pub fn end(&self) -> Vec2 {
        self.segments.last().map(PathSegment::end).unwrap_or(Vec2::ZERO)
    }

    pub fn is_curved(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| !matches!(segment, PathSegment::Line { .. }))
    }

    /// Polyline approximation; curves are sampled at a fixed resolution.
    pub fn flatten(&self) -> Vec<Vec2> {
        let mut points = Vec::with_capacity(self.segments.len() * CURVE_STEPS + 1);
        if let Some(first) = self.segments.first() {
            points.push(first.start());
        }
        for segment in &self.segments {
            segment.flatten_into(&mut points);
        }
        points
    }

    /// Point at fraction `t` of the arc length.
    pub fn point_at(&self, t: f32) -> Vec2 {
        point_along(&self.flatten(), t).unwrap_or_else(|| self.start())
    }

    pub fn midpoint(&self) -> Vec2 {
        self.point_at(0.5)
    }

    /// Smallest distance between the path and `point`.
    pub fn clearance(&self, point: Vec2) -> f32 {
        let points = self.flatten();
        match points.as_slice() {
            [] => f32::INFINITY,
            [only] => (*only - point).length(),
            _ => points
                .windows(2)
                .map(|pair| distance_to_segment(point, pair[0], pair[1]))
                .fold(f32::INFINITY, f32::min),
        }
    }

    fn clears(&self, obstacles: &[Obstacle]) -> bool {
        obstacles
            .iter()
            .all(|obstacle| self.clearance(obstacle.center) >= obstacle.radius)
    }
}

/// A node circle, padded, that lies on the direct line between two endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub node: NodeIndex,
    pub center: Vec2,
    pub radius: f32,
    /// Projection of the center onto the direct line, in [0, 1].
    pub t: f32,
}

/// Every node other than the endpoints whose padded circle the segment crosses,
/// ordered from source to target.
pub fn obstacles_on_segment(
    source: Vec2,
    target: Vec2,
    endpoints: (NodeIndex, NodeIndex),
    positions: &[Vec2],
    radius_of: impl Fn(NodeIndex) -> f32,
) -> Vec<Obstacle> {
    let mut obstacles = positions
        .iter()
        .enumerate()
        .filter(|&(node, center)| node != endpoints.0 && node != endpoints.1 && center.is_finite())
        .filter_map(|(node, &center)| {
            let radius = radius_of(node).max(0.0) + OBSTACLE_PADDING;
            segment_hits_circle(source, target, center, radius).then(|| Obstacle {
                node,
                center,
                radius,
                t: closest_t_on_segment(center, source, target),
            })
        })
        .collect::<Vec<_>>();
    obstacles.sort_by(|a, b| a.t.total_cmp(&b.t).then(a.node.cmp(&b.node)));
    obstacles
}

/// Everything the router needs to know about one edge besides positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteRequest {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub group: EdgeGroup,
    pub lane_offset: f32,
}

impl RouteRequest {
    pub fn for_edge(graph: &SessionGraph, groups: &[EdgeGroup], edge: EdgeIndex) -> Option<Self> {
        let record = graph.edges.get(edge)?;
        let source = graph.nodes.get(record.source)?;
        let target = graph.nodes.get(record.target)?;
        let group = groups
            .get(edge)
            .copied()
            .unwrap_or_else(|| EdgeGroup::single(record.source, record.target));

        Some(Self {
            source: record.source,
            target: record.target,
            group,
            lane_offset: lane_offset(&source.id, &target.id, &record.relationship),
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EdgeRouter {
    energy: f32,
}

impl EdgeRouter {
    /// Router for a layout currently carrying `energy` (the simulation's alpha).
    pub fn new(energy: f32) -> Self {
        Self { energy }
    }

    pub fn is_settled(&self) -> bool {
        self.energy <= HIGH_ENERGY_ALPHA
    }

    pub fn route(
        &self,
        request: &RouteRequest,
        source: Vec2,
        target: Vec2,
        positions: &[Vec2],
        radius_of: impl Fn(NodeIndex) -> f32,
    ) -> RoutedPath {
        if is_degenerate(source, target) {
            return RoutedPath::straight(source, target);
        }
        if request.group.is_bundled() {
            return self.route_bundled(&request.group, source, target);
        }

        let Some(direction) = unit_direction(source, target) else {
            return RoutedPath::straight(source, target);
        };
        let shift = left_normal(direction) * request.lane_offset;
        if !self.is_settled() {
            return RoutedPath::straight(source + shift, target + shift);
        }

        let obstacles = obstacles_on_segment(
            source,
            target,
            (request.source, request.target),
            positions,
            radius_of,
        );
        if obstacles.len() > 1 {
            return octilinear::detour(source, target, &obstacles);
        }

        if is_octilinear(angle_of(target - source), OCTILINEAR_TOLERANCE) {
            return if obstacles.is_empty() {
                RoutedPath::straight(source + shift, target + shift).with_kind(RouteKind::Octilinear)
            } else {
                octilinear::detour(source, target, &obstacles)
            };
        }

        octilinear::bend(source, target, shift, &obstacles)
            .unwrap_or_else(|| octilinear::detour(source, target, &obstacles))
    }

    fn route_bundled(&self, group: &EdgeGroup, source: Vec2, target: Vec2) -> RoutedPath {
        let (low, high) = if group.forward {
            (source, target)
        } else {
            (target, source)
        };
        // The low-to-high frame keeps A->B and B->A on opposite sides.
        let Some(canonical) = unit_direction(low, high) else {
            return RoutedPath::straight(source, target);
        };
        let offset = left_normal(canonical) * (group.centered_lane() * BUNDLE_SPACING);

        if !self.is_settled() {
            return RoutedPath::straight(source + offset, target + offset).with_kind(RouteKind::Bundled);
        }
        if offset.length_sq() <= EPSILON * EPSILON {
            return RoutedPath::straight(source, target).with_kind(RouteKind::Bundled);
        }

        RoutedPath {
            kind: RouteKind::Bundled,
            segments: vec![PathSegment::Quadratic(QuadraticBezier {
                start: source,
                control: (source + target) * 0.5 + offset * 2.0,
                end: target,
            })],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use eframe::egui::vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::geometry::snap_octilinear;

    const SETTLED: EdgeRouter = EdgeRouter { energy: 0.0 };
    const HOT: EdgeRouter = EdgeRouter { energy: 1.0 };

    fn request(source: NodeIndex, target: NodeIndex, lane_offset: f32) -> RouteRequest {
        RouteRequest {
            source,
            target,
            group: EdgeGroup::single(source, target),
            lane_offset,
        }
    }

    fn bundled(index: usize, size: usize, forward: bool) -> RouteRequest {
        let (source, target) = if forward { (0, 1) } else { (1, 0) };
        RouteRequest {
            source,
            target,
            group: EdgeGroup {
                key: GroupKey { low: 0, high: 1 },
                index,
                size,
                forward,
            },
            lane_offset: 0.0,
        }
    }

    #[test]
    fn hot_layouts_draw_shifted_straight_lines() {
        let positions = [vec2(0.0, 0.0), vec2(100.0, 37.0), vec2(50.0, 18.0)];
        let path = HOT.route(&request(0, 1, 3.0), positions[0], positions[1], &positions, |_| 10.0);

        assert_eq!(path.kind, RouteKind::Straight);
        assert_eq!(path.segments.len(), 1);
        let expected_shift = left_normal(vec2(100.0, 37.0).normalized()) * 3.0;
        assert!((path.start() - expected_shift).length() < 1.0e-4);
    }

    #[test]
    fn degenerate_edges_never_produce_nan() {
        let positions = [vec2(5.0, 5.0), vec2(5.0, 5.0)];
        let path = SETTLED.route(&request(0, 1, 3.0), positions[0], positions[1], &positions, |_| 10.0);
        assert_eq!(path.kind, RouteKind::Straight);
        assert!(path.flatten().iter().all(|point| point.is_finite()));

        let nan = vec2(f32::NAN, 0.0);
        let path = SETTLED.route(&request(0, 1, 3.0), nan, vec2(1.0, 1.0), &positions, |_| 10.0);
        assert!(path.flatten().iter().all(|point| point.is_finite()));
        assert!(path.midpoint().is_finite());
    }

    #[test]
    fn settled_single_edges_use_octilinear_legs() {
        let positions = [vec2(0.0, 0.0), vec2(100.0, 20.0)];
        let path = SETTLED.route(&request(0, 1, -3.0), positions[0], positions[1], &positions, |_| 10.0);

        assert_eq!(path.kind, RouteKind::Octilinear);
        assert!(path.is_curved());
        for segment in &path.segments {
            if let PathSegment::Line { start, end } = segment {
                let angle = angle_of(*end - *start);
                assert!((angle - snap_octilinear(angle)).abs() < 1.0e-4);
            }
        }
    }

    #[test]
    fn short_second_leg_stays_sharp() {
        let positions = [vec2(0.0, 0.0), vec2(100.0, 10.0)];
        let path = SETTLED.route(&request(0, 1, 0.0), positions[0], positions[1], &positions, |_| 10.0);
        assert_eq!(path.kind, RouteKind::Octilinear);
        assert!(!path.is_curved());
        assert_eq!(path.segments.len(), 2);
    }

    #[test]
    fn already_aligned_edges_stay_straight() {
        let positions = [vec2(0.0, 0.0), vec2(80.0, 80.0)];
        let path = SETTLED.route(&request(0, 1, 0.0), positions[0], positions[1], &positions, |_| 10.0);
        assert_eq!(path.kind, RouteKind::Octilinear);
        assert_eq!(path.segments.len(), 1);
        assert!((angle_of(path.end() - path.start()) - FRAC_PI_4).abs() < 1.0e-4);
    }

    #[test]
    fn blocked_horizontal_edge_detours_around_the_obstacle() {
        let positions = [vec2(0.0, 0.0), vec2(200.0, 0.0), vec2(100.0, 0.0)];
        let path = SETTLED.route(&request(0, 1, 0.0), positions[0], positions[1], &positions, |_| 10.0);

        assert_eq!(path.kind, RouteKind::Detour);
        assert!(path.clearance(positions[2]) >= 10.0 + OBSTACLE_PADDING);
        assert!((path.start() - positions[0]).length() < 1.0e-4);
        assert!((path.end() - positions[1]).length() < 1.0e-4);
    }

    #[test]
    fn several_obstacles_force_a_detour() {
        let positions = [
            vec2(0.0, 0.0),
            vec2(300.0, 0.0),
            vec2(100.0, 4.0),
            vec2(200.0, -4.0),
        ];
        let path = SETTLED.route(&request(0, 1, 0.0), positions[0], positions[1], &positions, |_| 8.0);

        assert_eq!(path.kind, RouteKind::Detour);
        assert!(path.clearance(positions[2]) >= 8.0 + OBSTACLE_PADDING);
        assert!(path.clearance(positions[3]) >= 8.0 + OBSTACLE_PADDING);
    }

    #[test]
    fn slanted_edges_clear_a_single_obstacle_for_every_lane() {
        let positions = [vec2(0.0, 0.0), vec2(200.0, 50.0), vec2(100.0, 25.0)];
        for lane in [-6.0, -3.0, 0.0, 3.0, 6.0] {
            let path = SETTLED.route(&request(0, 1, lane), positions[0], positions[1], &positions, |_| 10.0);
            assert!(matches!(path.kind, RouteKind::Octilinear | RouteKind::Detour));
            assert!(path.clearance(positions[2]) >= 10.0 + OBSTACLE_PADDING - 1.0e-3);
        }
    }

    #[test]
    fn endpoints_are_never_obstacles() {
        let positions = [vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let obstacles = obstacles_on_segment(positions[0], positions[1], (0, 1), &positions, |_| 50.0);
        assert!(obstacles.is_empty());
    }

    #[test]
    fn bidirectional_pair_curves_to_opposite_sides() {
        let positions = [vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let forward = SETTLED.route(&bundled(0, 2, true), positions[0], positions[1], &positions, |_| 10.0);
        let backward = SETTLED.route(&bundled(1, 2, false), positions[1], positions[0], &positions, |_| 10.0);

        assert_eq!(forward.kind, RouteKind::Bundled);
        assert!(forward.is_curved() && backward.is_curved());
        let forward_mid = forward.midpoint();
        let backward_mid = backward.midpoint();
        assert!(forward_mid.y * backward_mid.y < 0.0);
        assert!((forward_mid.y.abs() - BUNDLE_SPACING * 0.5).abs() < 0.5);
    }

    #[test]
    fn hot_bundles_are_parallel_lines() {
        let positions = [vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let first = HOT.route(&bundled(0, 3, true), positions[0], positions[1], &positions, |_| 10.0);
        let middle = HOT.route(&bundled(1, 3, true), positions[0], positions[1], &positions, |_| 10.0);

        assert!(!first.is_curved());
        assert!((first.start().y.abs() - BUNDLE_SPACING).abs() < 1.0e-4);
        assert_eq!(middle.start(), positions[0]);
    }

    proptest! {
        #[test]
        fn settled_routes_keep_their_endpoints(
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
            lane in -6.0f32..6.0,
        ) {
            prop_assume!(vec2(x, y).length() > 1.0);
            let positions = [vec2(0.0, 0.0), vec2(x, y)];
            let path = SETTLED.route(&request(0, 1, lane), positions[0], positions[1], &positions, |_| 10.0);
            let shift = left_normal(vec2(x, y).normalized()) * lane;

            prop_assert!((path.start() - shift).length() < 1.0e-2);
            prop_assert!((path.end() - (positions[1] + shift)).length() < 1.0e-2);
            prop_assert!(path.flatten().iter().all(|point| point.is_finite()));
        }

        #[test]
        fn settled_routes_clear_a_node_sitting_on_the_edge(
            length in 60.0f32..400.0,
            angle in -3.14f32..3.14,
            fraction in 0.05f32..0.95,
            radius in 6.0f32..26.0,
            lane in -6.0f32..6.0,
        ) {
            let target = vec2(angle.cos(), angle.sin()) * length;
            let blocker = target * fraction;
            let padded = radius + OBSTACLE_PADDING;
            prop_assume!(blocker.length() > padded + 1.0);
            prop_assume!((target - blocker).length() > padded + 1.0);

            let positions = [vec2(0.0, 0.0), target, blocker];
            let path = SETTLED.route(&request(0, 1, lane), positions[0], positions[1], &positions, |node| {
                if node == 2 { radius } else { 10.0 }
            });

            prop_assert!(path.clearance(blocker) >= padded - 1.0e-3);
        }
    }

    #[test]
    fn short_edge_past_a_large_node_keeps_its_clearance() {
        let positions = [vec2(0.0, 0.0), vec2(80.0, 0.0), vec2(40.0, 0.0)];
        let path = SETTLED.route(&request(0, 1, 0.0), positions[0], positions[1], &positions, |node| {
            if node == 2 { 26.0 } else { 10.0 }
        });

        assert_eq!(path.kind, RouteKind::Detour);
        assert!(path.clearance(positions[2]) >= 26.0 + OBSTACLE_PADDING);
    }
}
