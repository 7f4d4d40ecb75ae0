//! Helpers here answer degenerate input with a trivial result, never NaN.

pub mod curve;

use std::f32::consts::{FRAC_PI_4, PI, TAU};

use eframe::egui::{Rect, Vec2, vec2};

pub use curve::{CubicBezier, QuadraticBezier, catmull_rom_to_cubics, point_along, polyline_length};

pub const EPSILON: f32 = 1.0e-4;

pub fn is_degenerate(start: Vec2, end: Vec2) -> bool {
    !start.is_finite() || !end.is_finite() || (end - start).length_sq() <= EPSILON * EPSILON
}

pub fn unit_direction(start: Vec2, end: Vec2) -> Option<Vec2> {
    if is_degenerate(start, end) {
        return None;
    }
    let delta = end - start;
    Some(delta / delta.length())
}

/// Left-hand normal of a direction (counter-clockwise in y-up terms).
pub fn left_normal(direction: Vec2) -> Vec2 {
    vec2(-direction.y, direction.x)
}

pub fn angle_of(vector: Vec2) -> f32 {
    vector.y.atan2(vector.x)
}

/// Wraps an angle into (-PI, PI].
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

/// Snaps an angle onto the nearest multiple of 45 degrees.
///
/// The input is first wrapped into (-PI, PI]; the result is a multiple of PI/4
/// in [-PI, PI] that is never more than PI/8 away from the wrapped input.
pub fn snap_octilinear(angle: f32) -> f32 {
    let wrapped = normalize_angle(angle);
    (wrapped / FRAC_PI_4).round() * FRAC_PI_4
}

pub fn angular_distance(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

pub fn is_octilinear(angle: f32, tolerance: f32) -> bool {
    angular_distance(angle, snap_octilinear(angle)) <= tolerance
}

/// Entry parameter of the segment `start + t * (end - start)` into a circle.
///
/// Returns `None` when the segment misses the circle. A segment that starts
/// inside the circle reports `t = 0`.
pub fn segment_circle_intersection(start: Vec2, end: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    if !start.is_finite() || !end.is_finite() || !center.is_finite() || radius <= 0.0 {
        return None;
    }

    let direction = end - start;
    let a = direction.length_sq();
    let offset = start - center;
    let c = offset.length_sq() - radius * radius;
    if a <= EPSILON * EPSILON {
        return (c <= 0.0).then_some(0.0);
    }

    let b = 2.0 * direction.dot(offset);
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t_enter = (-b - root) / (2.0 * a);
    let t_exit = (-b + root) / (2.0 * a);
    if t_exit < 0.0 || t_enter > 1.0 {
        return None;
    }

    Some(t_enter.max(0.0))
}

pub fn segment_hits_circle(start: Vec2, end: Vec2, center: Vec2, radius: f32) -> bool {
    segment_circle_intersection(start, end, center, radius).is_some()
}

pub fn closest_t_on_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let direction = end - start;
    let length_sq = direction.length_sq();
    if length_sq <= EPSILON * EPSILON {
        return 0.0;
    }
    ((point - start).dot(direction) / length_sq).clamp(0.0, 1.0)
}

pub fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let t = closest_t_on_segment(point, start, end);
    (start + (end - start) * t - point).length()
}

pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    (point - center).length_sq() < radius * radius
}

pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    if a1.x.max(a2.x) < b1.x.min(b2.x)
        || b1.x.max(b2.x) < a1.x.min(a2.x)
        || a1.y.max(a2.y) < b1.y.min(b2.y)
        || b1.y.max(b2.y) < a1.y.min(a2.y)
    {
        return false;
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

pub fn segment_touches_rect(rect: Rect, start: Vec2, end: Vec2, padding: f32) -> bool {
    let rect = rect.expand(padding);
    let min_x = start.x.min(end.x);
    let max_x = start.x.max(end.x);
    let min_y = start.y.min(end.y);
    let max_y = start.y.max(end.y);

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start.to_pos2()) || rect.contains(end.to_pos2()) {
        return true;
    }

    let top_left = rect.left_top().to_vec2();
    let top_right = rect.right_top().to_vec2();
    let bottom_left = rect.left_bottom().to_vec2();
    let bottom_right = rect.right_bottom().to_vec2();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}
