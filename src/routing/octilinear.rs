use eframe::egui::{Vec2, vec2};

use crate::geometry::{
    EPSILON, QuadraticBezier, catmull_rom_to_cubics, closest_t_on_segment, left_normal, point_in_circle,
    unit_direction,
};

use super::{CORNER_RADIUS, Obstacle, PathSegment, RouteKind, RoutedPath};

/// Above this minor/major axis ratio the route opens with a 45 degree leg.
const DIAGONAL_RATIO: f32 = 0.4;
const DETOUR_CLEARANCE: f32 = 6.0;

/// Corner points for a two-leg octilinear route; the preferred one comes first.
fn bend_candidates(source: Vec2, target: Vec2) -> [Vec2; 2] {
    let delta = target - source;
    let (dx, dy) = (delta.x.abs(), delta.y.abs());
    let major = dx.max(dy);
    let minor = dx.min(dy);

    if minor > major * DIAGONAL_RATIO {
        let diagonal = vec2(delta.x.signum(), delta.y.signum()) * minor;
        [source + diagonal, target - diagonal]
    } else if dx >= dy {
        [vec2(target.x, source.y), vec2(source.x, target.y)]
    } else {
        [vec2(source.x, target.y), vec2(target.x, source.y)]
    }
}

/// Two-leg route with a rounded joint, or `None` when it still crosses an obstacle.
pub(super) fn bend(source: Vec2, target: Vec2, shift: Vec2, obstacles: &[Obstacle]) -> Option<RoutedPath> {
    let [preferred, alternate] = bend_candidates(source, target);
    let corner = if obstacles
        .iter()
        .any(|obstacle| point_in_circle(preferred, obstacle.center, obstacle.radius))
    {
        alternate
    } else {
        preferred
    };

    let path = RoutedPath {
        kind: RouteKind::Octilinear,
        segments: round_corners(&[source + shift, corner + shift, target + shift], CORNER_RADIUS),
    };
    path.clears(obstacles).then_some(path)
}

pub(super) fn round_corners(points: &[Vec2], radius: f32) -> Vec<PathSegment> {
    let mut points = points.to_vec();
    points.dedup_by(|next, previous| (*next - *previous).length_sq() <= EPSILON * EPSILON);

    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    if points.len() < 2 {
        return vec![PathSegment::Line {
            start: first,
            end: last,
        }];
    }

    let mut segments = Vec::with_capacity(points.len() * 2);
    let mut cursor = first;
    for window in points.windows(3) {
        let (previous, corner, next) = (window[0], window[1], window[2]);
        let incoming = corner - previous;
        let outgoing = next - corner;
        let incoming_length = incoming.length();
        let outgoing_length = outgoing.length();

        // Short legs cannot host the arc; keep the joint sharp.
        if incoming_length < radius * 2.0 || outgoing_length < radius * 2.0 {
            segments.push(PathSegment::Line {
                start: cursor,
                end: corner,
            });
            cursor = corner;
            continue;
        }

        let entry = corner - incoming * (radius / incoming_length);
        let exit = corner + outgoing * (radius / outgoing_length);
        segments.push(PathSegment::Line {
            start: cursor,
            end: entry,
        });
        segments.push(PathSegment::Quadratic(QuadraticBezier {
            start: entry,
            control: corner,
            end: exit,
        }));
        cursor = exit;
    }

    segments.push(PathSegment::Line {
        start: cursor,
        end: last,
    });
    segments
}

/// Growth factors applied to the waypoint offset before giving up on the smooth curve.
const DETOUR_SPREADS: [f32; 3] = [1.0, 1.5, 2.25];

/// Route around `obstacles`, which must be sorted in path order.
///
/// Tries a smooth curve through one waypoint beside each obstacle, pushing the
/// waypoints further out while the curve still cuts a padded radius. When that
/// fails, the edge steps sideways, runs parallel beyond every obstacle and steps
/// back.
pub(super) fn detour(source: Vec2, target: Vec2, obstacles: &[Obstacle]) -> RoutedPath {
    let Some(direction) = unit_direction(source, target) else {
        return RoutedPath::straight(source, target);
    };
    let left = left_normal(direction);

    for spread in DETOUR_SPREADS {
        let path = smooth_detour(source, target, obstacles, left, spread);
        if path.clears(obstacles) {
            return path;
        }
    }

    let offset = bracket_offset(source, obstacles, left);
    let corners = [source, source + offset, target + offset, target];
    let rounded = RoutedPath {
        kind: RouteKind::Detour,
        segments: round_corners(&corners, CORNER_RADIUS),
    };
    if rounded.clears(obstacles) {
        return rounded;
    }
    RoutedPath {
        kind: RouteKind::Detour,
        segments: corners
            .windows(2)
            .map(|pair| PathSegment::Line {
                start: pair[0],
                end: pair[1],
            })
            .collect(),
    }
}

fn smooth_detour(source: Vec2, target: Vec2, obstacles: &[Obstacle], fallback_side: Vec2, spread: f32) -> RoutedPath {
    let mut points = Vec::with_capacity(obstacles.len() + 2);
    points.push(source);
    for obstacle in obstacles {
        let foot = source + (target - source) * closest_t_on_segment(obstacle.center, source, target);
        let away = foot - obstacle.center;
        let side = if away.length() > EPSILON {
            away / away.length()
        } else {
            fallback_side
        };
        points.push(obstacle.center + side * ((obstacle.radius + DETOUR_CLEARANCE) * spread));
    }
    points.push(target);

    RoutedPath {
        kind: RouteKind::Detour,
        segments: catmull_rom_to_cubics(&points)
            .into_iter()
            .map(PathSegment::Cubic)
            .collect(),
    }
}

/// Sideways step that puts a line parallel to the direct one beyond every
/// obstacle, on whichever side needs the shorter step.
fn bracket_offset(source: Vec2, obstacles: &[Obstacle], left: Vec2) -> Vec2 {
    let (mut left_reach, mut right_reach) = (0.0_f32, 0.0_f32);
    for obstacle in obstacles {
        let offset = (obstacle.center - source).dot(left);
        let reach = obstacle.radius + DETOUR_CLEARANCE;
        left_reach = left_reach.max(offset + reach);
        right_reach = right_reach.max(reach - offset);
    }

    if left_reach <= right_reach {
        left * left_reach
    } else {
        -left * right_reach
    }
}
