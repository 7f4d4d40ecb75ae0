use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadTree;

#[derive(Clone, Copy)]
pub(super) struct ManyBody {
    pub(super) strength: f32,
    pub(super) theta_sq: f32,
    pub(super) distance_min_sq: f32,
    pub(super) distance_max_sq: f32,
    pub(super) alpha: f32,
}

impl ManyBody {
    fn push(self, mut delta: Vec2, weight: f32, first: usize, second: usize) -> Vec2 {
        let mut distance_sq = delta.length_sq();
        if distance_sq >= self.distance_max_sq {
            return Vec2::ZERO;
        }
        if distance_sq <= 1.0e-6 {
            delta = jiggle(first, second);
            distance_sq = delta.length_sq();
        }
        if distance_sq < self.distance_min_sq {
            distance_sq = (self.distance_min_sq * distance_sq).sqrt();
        }
        delta * (self.strength * weight * self.alpha / distance_sq)
    }
}

#[derive(Clone, Copy)]
pub(super) struct Collide {
    pub(super) strength: f32,
}

/// Deterministic unit-ish nudge for coincident nodes.
pub(super) fn jiggle(first: usize, second: usize) -> Vec2 {
    let angle = ((first as f32) * 0.618_034 + (second as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1.0e-2
}

/// Velocity change that the rest of the graph applies to `index` through repulsion.
pub(super) fn many_body_delta(tree: &QuadTree, index: usize, positions: &[Vec2], params: ManyBody) -> Vec2 {
    if tree.count <= 0.0 {
        return Vec2::ZERO;
    }

    let point = positions[index];
    if tree.is_leaf() {
        let mut delta = Vec2::ZERO;
        for &other in &tree.members {
            if other == index {
                continue;
            }
            delta += params.push(positions[other] - point, 1.0, index, other);
        }
        return delta;
    }

    let toward = tree.centroid - point;
    let side = tree.bounds.side();
    let far_enough = !tree.bounds.contains(point) && (side * side) / params.theta_sq < toward.length_sq();
    if far_enough {
        return params.push(toward, tree.count, index, usize::MAX / 2);
    }

    tree.children()
        .map(|child| many_body_delta(child, index, positions, params))
        .fold(Vec2::ZERO, |sum, delta| sum + delta)
}

fn resolve_overlap(
    first: usize,
    second: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: Collide,
    deltas: &mut [Vec2],
) {
    let reach = radii[first] + radii[second];
    let mut offset = positions[first] - positions[second];
    let mut distance_sq = offset.length_sq();
    if distance_sq >= reach * reach {
        return;
    }
    if distance_sq <= 1.0e-6 {
        offset = jiggle(first, second);
        distance_sq = offset.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = offset * ((reach - distance) / distance * params.strength);
    let first_sq = radii[first] * radii[first];
    let second_sq = radii[second] * radii[second];
    let share = if first_sq + second_sq > 0.0 {
        second_sq / (first_sq + second_sq)
    } else {
        0.5
    };

    deltas[first] += push * share;
    deltas[second] -= push * (1.0 - share);
}

/// Dual-tree walk over every pair of cells that could hold overlapping circles.
pub(super) fn collide_pairs(
    tree_a: &QuadTree,
    tree_b: &QuadTree,
    same_cell: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: Collide,
    deltas: &mut [Vec2],
) {
    let reach = tree_a.max_radius + tree_b.max_radius;
    if tree_a.bounds.gap_sq(tree_b.bounds) > reach * reach {
        return;
    }

    if tree_a.is_leaf() && tree_b.is_leaf() {
        if same_cell {
            for (offset, &first) in tree_a.members.iter().enumerate() {
                for &second in &tree_a.members[offset + 1..] {
                    resolve_overlap(first, second, positions, radii, params, deltas);
                }
            }
        } else {
            for &first in &tree_a.members {
                for &second in &tree_b.members {
                    resolve_overlap(first, second, positions, radii, params, deltas);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = tree_a.children().collect::<Vec<_>>();
        for (offset, child) in children.iter().enumerate() {
            collide_pairs(child, child, true, positions, radii, params, deltas);
            for other in &children[offset + 1..] {
                collide_pairs(child, other, false, positions, radii, params, deltas);
            }
        }
        return;
    }

    let split_a = if tree_a.is_leaf() {
        false
    } else if tree_b.is_leaf() {
        true
    } else {
        tree_a.bounds.half_extent >= tree_b.bounds.half_extent
    };

    if split_a {
        for child in tree_a.children() {
            collide_pairs(child, tree_b, false, positions, radii, params, deltas);
        }
    } else {
        for child in tree_b.children() {
            collide_pairs(tree_a, child, false, positions, radii, params, deltas);
        }
    }
}
