mod forces;
mod quadtree;

use eframe::egui::{Rect, Vec2, vec2};
use tracing::debug;

use crate::model::{NodeIndex, SessionGraph};
use crate::util::stable_pair;
use forces::{Collide, ManyBody, collide_pairs, jiggle, many_body_delta};
use quadtree::QuadTree;

pub const ALPHA_MIN: f32 = 0.001;
pub const ALPHA_DECAY: f32 = 0.0228;
pub const DRAG_ALPHA_TARGET: f32 = 0.3;
pub const RESIZE_REHEAT_ALPHA: f32 = 0.3;

const MIN_LINK_DISTANCE: f32 = 70.0;
const REPULSION_BASE: f32 = 120.0;
const REPULSION_CAP: f32 = 900.0;
const LINK_STRENGTH_SCALE: f32 = 3.0;
const LINK_STRENGTH_CAP: usize = 60;
const BARNES_HUT_THETA: f32 = 0.9;
const VELOCITY_DECAY: f32 = 0.4;
const SEED_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
    pub link_distance: f32,
    pub link_strength: f32,
    pub repulsion_strength: f32,
    pub repulsion_distance_max: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub center_strength: f32,
    pub velocity_decay: f32,
}

impl ForceParams {
    /// Tunes every force for a graph of the given size.
    ///
    /// Small graphs get short links and mild repulsion so they do not look
    /// sparse; large graphs spread out but repulsion is capped and springs
    /// soften so the layout does not collapse into a ball.
    pub fn adaptive(node_count: usize, edge_count: usize) -> Self {
        let n = node_count.max(1) as f32;
        let density = edge_count as f32 / n;

        let link_distance = (40.0 + n.sqrt() * 9.0 + density * 6.0).max(MIN_LINK_DISTANCE);
        let repulsion_strength = -(REPULSION_BASE + n * 3.0).min(REPULSION_CAP);
        let link_strength =
            (LINK_STRENGTH_SCALE / node_count.clamp(1, LINK_STRENGTH_CAP) as f32).min(1.0);

        Self {
            link_distance,
            link_strength,
            repulsion_strength,
            repulsion_distance_max: (link_distance * 5.0).max(400.0),
            collision_padding: 4.0 + 3.0 * (n + 1.0).ln(),
            collision_strength: 0.7,
            center_strength: 0.04 + 0.06 / (1.0 + density),
            velocity_decay: VELOCITY_DECAY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimNode {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub fixed_x: Option<f32>,
    pub fixed_y: Option<f32>,
}

impl SimNode {
    pub fn is_pinned(&self) -> bool {
        self.fixed_x.is_some() || self.fixed_y.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickOutcome {
    pub moved: bool,
    pub alpha: f32,
    pub kinetic_energy: f32,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    collision_radii: Vec<f32>,
    deltas: Vec<Vec2>,
}

/// Owns the node arena for one graph load and advances it one tick at a time.
pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<(NodeIndex, NodeIndex)>,
    link_counts: Vec<usize>,
    params: ForceParams,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    ticks: u64,
    scratch: Scratch,
}

impl Simulation {
    pub fn initialize(graph: &SessionGraph, radii: &[f32], bounds: Rect) -> Self {
        let center = bounds.center().to_vec2();
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());

        let nodes = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let radius = SEED_RADIUS * (0.5 + index as f32).sqrt();
                let angle = index as f32 * golden_angle;
                let (jx, jy) = stable_pair(&node.id);
                SimNode {
                    position: center + vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy),
                    velocity: Vec2::ZERO,
                    radius: radii.get(index).copied().unwrap_or(crate::style::MIN_NODE_RADIUS),
                    fixed_x: None,
                    fixed_y: None,
                }
            })
            .collect::<Vec<_>>();

        let links = graph
            .edges
            .iter()
            .map(|edge| (edge.source, edge.target))
            .collect::<Vec<_>>();
        let link_counts = graph.nodes.iter().map(|node| node.degree).collect();
        let params = ForceParams::adaptive(graph.node_count(), graph.edge_count());

        debug!(
            nodes = nodes.len(),
            links = links.len(),
            link_distance = params.link_distance,
            repulsion = params.repulsion_strength,
            "simulation initialized"
        );

        Self {
            running: !nodes.is_empty(),
            nodes,
            links,
            link_counts,
            params,
            center,
            alpha: 1.0,
            alpha_target: 0.0,
            ticks: 0,
            scratch: Scratch::default(),
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running || self.nodes.is_empty() {
            return TickOutcome {
                moved: false,
                alpha: self.alpha,
                kinetic_energy: 0.0,
            };
        }

        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;
        self.apply_links();
        self.apply_many_body();
        self.apply_centering();
        self.apply_collisions();
        let outcome = self.integrate();

        self.ticks += 1;
        if self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN {
            self.running = false;
            debug!(ticks = self.ticks, "simulation settled");
        }
        outcome
    }

    fn apply_links(&mut self) {
        let alpha = self.alpha;
        let distance = self.params.link_distance;
        let strength = self.params.link_strength;

        for &(source, target) in &self.links {
            if source == target || source >= self.nodes.len() || target >= self.nodes.len() {
                continue;
            }

            let from = self.nodes[source].position + self.nodes[source].velocity;
            let to = self.nodes[target].position + self.nodes[target].velocity;
            let mut delta = to - from;
            if delta.length_sq() <= 1.0e-6 {
                delta = jiggle(source, target);
            }
            let length = delta.length();
            let correction = delta * ((length - distance) / length * alpha * strength);

            let source_links = self.link_counts[source].max(1) as f32;
            let target_links = self.link_counts[target].max(1) as f32;
            let bias = source_links / (source_links + target_links);

            self.nodes[target].velocity -= correction * bias;
            self.nodes[source].velocity += correction * (1.0 - bias);
        }
    }

    fn apply_many_body(&mut self) {
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.positions.extend(self.nodes.iter().map(|node| node.position));

        let Some(tree) = QuadTree::build(&scratch.positions, &[]) else {
            return;
        };

        let params = ManyBody {
            strength: self.params.repulsion_strength,
            theta_sq: BARNES_HUT_THETA * BARNES_HUT_THETA,
            distance_min_sq: 1.0,
            distance_max_sq: self.params.repulsion_distance_max * self.params.repulsion_distance_max,
            alpha: self.alpha,
        };

        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.velocity += many_body_delta(&tree, index, &scratch.positions, params);
        }
    }

    fn apply_centering(&mut self) {
        let pull = self.params.center_strength * self.alpha;
        for node in &mut self.nodes {
            node.velocity += (self.center - node.position) * pull;
        }
    }

    fn apply_collisions(&mut self) {
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.collision_radii.clear();
        for node in &self.nodes {
            scratch.positions.push(node.position + node.velocity);
            scratch
                .collision_radii
                .push(node.radius + self.params.collision_padding);
        }

        let Some(tree) = QuadTree::build(&scratch.positions, &scratch.collision_radii) else {
            return;
        };

        scratch.deltas.clear();
        scratch.deltas.resize(self.nodes.len(), Vec2::ZERO);
        collide_pairs(
            &tree,
            &tree,
            true,
            &scratch.positions,
            &scratch.collision_radii,
            Collide {
                strength: self.params.collision_strength,
            },
            &mut scratch.deltas,
        );

        for (node, delta) in self.nodes.iter_mut().zip(&scratch.deltas) {
            node.velocity += *delta;
        }
    }

    fn integrate(&mut self) -> TickOutcome {
        let retain = 1.0 - self.params.velocity_decay;
        let mut moved = false;
        let mut kinetic = 0.0;

        for node in &mut self.nodes {
            let before = node.position;
            node.velocity *= retain;
            if !node.velocity.is_finite() {
                node.velocity = Vec2::ZERO;
            }

            match node.fixed_x {
                Some(x) => {
                    node.position.x = x;
                    node.velocity.x = 0.0;
                }
                None => node.position.x += node.velocity.x,
            }
            match node.fixed_y {
                Some(y) => {
                    node.position.y = y;
                    node.velocity.y = 0.0;
                }
                None => node.position.y += node.velocity.y,
            }

            kinetic += node.velocity.length_sq();
            if (node.position - before).length_sq() > 1.0e-8 {
                moved = true;
            }
        }

        TickOutcome {
            moved,
            alpha: self.alpha,
            kinetic_energy: kinetic / self.nodes.len() as f32,
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!(ticks = self.ticks, alpha = self.alpha, "simulation stopped");
        }
        self.running = false;
        self.alpha_target = 0.0;
    }

    /// Raises the energy without touching positions.
    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
        self.running = !self.nodes.is_empty();
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
        if self.alpha_target >= ALPHA_MIN {
            self.running = !self.nodes.is_empty();
        }
    }

    pub fn set_center(&mut self, center: Vec2) {
        if center.is_finite() {
            self.center = center;
        }
    }

    pub fn pin(&mut self, index: NodeIndex, position: Vec2) {
        if !position.is_finite() {
            return;
        }
        if let Some(node) = self.nodes.get_mut(index) {
            node.fixed_x = Some(position.x);
            node.fixed_y = Some(position.y);
            node.position = position;
            node.velocity = Vec2::ZERO;
        }
    }

    pub fn unpin(&mut self, index: NodeIndex) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.fixed_x = None;
            node.fixed_y = None;
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn position(&self, index: NodeIndex) -> Option<Vec2> {
        self.nodes.get(index).map(|node| node.position)
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.nodes.iter().map(|node| node.position)
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn params(&self) -> ForceParams {
        self.params
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;
    use crate::model::tests::payload;

    fn bounds() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))
    }

    fn simulation(ids: &[&str], links: &[(&str, &str)]) -> Simulation {
        let (graph, _) = SessionGraph::from_payload(payload(ids, links));
        let radii = vec![10.0; graph.node_count()];
        Simulation::initialize(&graph, &radii, bounds())
    }

    #[test]
    fn adaptive_params_scale_with_graph_size() {
        let small = ForceParams::adaptive(5, 4);
        let large = ForceParams::adaptive(2_000, 4_000);

        assert!(large.link_distance > small.link_distance);
        assert!(small.link_distance >= MIN_LINK_DISTANCE);
        assert!(large.repulsion_strength < small.repulsion_strength);
        assert_eq!(large.repulsion_strength, -REPULSION_CAP);
        assert!(large.collision_padding > small.collision_padding);
        assert!(large.link_strength < small.link_strength);
    }

    #[test]
    fn empty_graph_is_a_no_op() {
        let mut sim = simulation(&[], &[]);
        assert!(!sim.is_running());
        assert!(!sim.tick().moved);
    }

    #[test]
    fn tick_after_stop_does_not_move_nodes() {
        let mut sim = simulation(&["a", "b", "c"], &[("a", "b")]);
        sim.tick();
        sim.stop();
        let before = sim.positions().collect::<Vec<_>>();

        let outcome = sim.tick();
        assert!(!outcome.moved);
        assert_eq!(sim.positions().collect::<Vec<_>>(), before);
    }

    #[test]
    fn pinned_node_holds_its_position() {
        let mut sim = simulation(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        sim.pin(1, vec2(123.0, 45.0));
        for _ in 0..50 {
            sim.tick();
        }
        assert_eq!(sim.position(1), Some(vec2(123.0, 45.0)));

        sim.unpin(1);
        sim.reheat(0.5);
        for _ in 0..20 {
            sim.tick();
        }
        assert_ne!(sim.position(1), Some(vec2(123.0, 45.0)));
    }

    #[test]
    fn disconnected_pair_settles_apart() {
        let mut sim = simulation(&["left", "right"], &[]);
        let mut alphas = Vec::new();
        let mut late_motion = 0.0_f32;

        for tick in 0..1_000 {
            let before = sim.positions().collect::<Vec<_>>();
            let outcome = sim.tick();
            alphas.push(outcome.alpha);
            if tick >= 900 {
                for (old, new) in before.iter().zip(sim.positions()) {
                    late_motion = late_motion.max((new - *old).length());
                }
            }
        }

        assert!(!sim.is_running());
        assert!(sim.alpha() < ALPHA_MIN);
        assert!(alphas.windows(2).all(|pair| pair[1] <= pair[0]));
        assert!(late_motion < 1.0e-3);

        let separation = (sim.nodes()[0].position - sim.nodes()[1].position).length();
        assert!(separation > 20.0, "nodes overlap at distance {separation}");
        assert!(separation < sim.params().repulsion_distance_max);
    }

    #[test]
    fn linked_nodes_approach_link_distance() {
        let mut sim = simulation(&["a", "b"], &[("a", "b")]);
        while sim.is_running() {
            sim.tick();
        }
        let separation = (sim.nodes()[0].position - sim.nodes()[1].position).length();
        assert!(separation > 20.0);
        assert!(separation < sim.params().link_distance * 2.0);
    }

    #[test]
    fn set_center_moves_the_layout() {
        let mut sim = simulation(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        sim.set_center(vec2(2_000.0, 2_000.0));
        sim.reheat(1.0);
        while sim.is_running() {
            sim.tick();
        }
        let centroid = sim.positions().fold(Vec2::ZERO, |sum, p| sum + p) / 3.0;
        assert!((centroid - vec2(2_000.0, 2_000.0)).length() < 200.0);
    }
}
