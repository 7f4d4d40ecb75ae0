use eframe::egui::Vec2;

use super::EPSILON;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticBezier {
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
}

impl QuadraticBezier {
    pub fn sample(&self, t: f32) -> Vec2 {
        let mt = 1.0 - t;
        self.start * (mt * mt) + self.control * (2.0 * mt * t) + self.end * (t * t)
    }
}

/// A cubic bezier curve segment defined by four control points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

impl CubicBezier {
    pub fn sample(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        self.start * mt3
            + self.control1 * (3.0 * mt2 * t)
            + self.control2 * (3.0 * mt * t2)
            + self.end * t3
    }
}

/// Converts a uniform Catmull-Rom spline through `points` into cubic segments.
///
/// The curve passes through every point; the first and last points are
/// duplicated as phantom neighbours so the spline starts and ends on them.
pub fn catmull_rom_to_cubics(points: &[Vec2]) -> Vec<CubicBezier> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut curves = Vec::with_capacity(points.len() - 1);
    for index in 0..points.len() - 1 {
        let p0 = points[index.saturating_sub(1)];
        let p1 = points[index];
        let p2 = points[index + 1];
        let p3 = points[(index + 2).min(points.len() - 1)];

        curves.push(CubicBezier {
            start: p1,
            control1: p1 + (p2 - p0) / 6.0,
            control2: p2 - (p3 - p1) / 6.0,
            end: p2,
        });
    }
    curves
}

pub fn polyline_length(points: &[Vec2]) -> f32 {
    points
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).length())
        .sum()
}

/// Point at fraction `t` of the polyline's arc length.
pub fn point_along(points: &[Vec2], t: f32) -> Option<Vec2> {
    let first = *points.first()?;
    let total = polyline_length(points);
    if total <= EPSILON || !t.is_finite() {
        return Some(first);
    }

    let mut remaining = total * t.clamp(0.0, 1.0);
    for pair in points.windows(2) {
        let length = (pair[1] - pair[0]).length();
        if length <= EPSILON {
            continue;
        }
        if remaining <= length {
            return Some(pair[0] + (pair[1] - pair[0]) * (remaining / length));
        }
        remaining -= length;
    }
    points.last().copied()
}
