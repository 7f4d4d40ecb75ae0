use eframe::egui::{Rect, Vec2, vec2};

use crate::geometry::EPSILON;

/// Margin added around the node extent before projecting.
pub const GRAPH_MARGIN: f32 = 40.0;
pub const MINIMAP_PADDING: f32 = 8.0;
pub const MINIMAP_SIZE: Vec2 = vec2(220.0, 150.0);

/// Extent of all finite positions, grown by [`GRAPH_MARGIN`] on every side.
pub fn graph_bounds(positions: impl IntoIterator<Item = Vec2>) -> Rect {
    let mut bounds = Rect::NOTHING;
    for position in positions.into_iter().filter(|position| position.is_finite()) {
        bounds.extend_with(position.to_pos2());
    }
    if !bounds.min.is_finite() {
        bounds = Rect::from_center_size(Vec2::ZERO.to_pos2(), Vec2::ZERO);
    }
    bounds.expand(GRAPH_MARGIN)
}

/// Uniform scale and offset from simulation space into minimap-local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapProjection {
    scale: f32,
    offset: Vec2,
}

impl MinimapProjection {
    pub fn new(graph_bounds: Rect, minimap_size: Vec2) -> Self {
        let inner = (minimap_size - Vec2::splat(MINIMAP_PADDING * 2.0)).max(Vec2::splat(1.0));
        let graph_size = graph_bounds.size().max(Vec2::splat(EPSILON));
        let scale = (inner.x / graph_size.x).min(inner.y / graph_size.y);
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

        let centering = (inner - graph_size * scale) * 0.5;
        let min = if graph_bounds.min.is_finite() {
            graph_bounds.min.to_vec2()
        } else {
            Vec2::ZERO
        };
        Self {
            scale,
            offset: Vec2::splat(MINIMAP_PADDING) + centering - min * scale,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn project(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.offset
    }

    pub fn unproject(&self, local: Vec2) -> Vec2 {
        (local - self.offset) / self.scale
    }

    pub fn project_rect(&self, rect: Rect) -> Rect {
        Rect::from_min_max(
            self.project(rect.min.to_vec2()).to_pos2(),
            self.project(rect.max.to_vec2()).to_pos2(),
        )
    }
}

/// Everything needed to draw the overview for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimapOverview {
    pub size: Vec2,
    pub graph_bounds: Rect,
    pub dots: Vec<Vec2>,
    /// The visible part of the main view, in minimap-local coordinates.
    pub viewport: Rect,
}

pub fn project(positions: &[Vec2], graph_bounds: Rect, viewport_bounds: Rect, minimap_size: Vec2) -> MinimapOverview {
    let projection = MinimapProjection::new(graph_bounds, minimap_size);
    MinimapOverview {
        size: minimap_size,
        graph_bounds,
        dots: positions.iter().map(|&position| projection.project(position)).collect(),
        viewport: projection.project_rect(viewport_bounds),
    }
}

/// Simulation-space point under a click at `click` (minimap-local coordinates).
pub fn unproject(click: Vec2, graph_bounds: Rect, minimap_size: Vec2) -> Vec2 {
    MinimapProjection::new(graph_bounds, minimap_size).unproject(click)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn bounds_cover_positions_with_margin() {
        let bounds = graph_bounds([vec2(0.0, 0.0), vec2(100.0, 50.0), vec2(f32::NAN, 3.0)]);
        assert_eq!(bounds.min, vec2(-GRAPH_MARGIN, -GRAPH_MARGIN).to_pos2());
        assert_eq!(bounds.max, vec2(100.0 + GRAPH_MARGIN, 50.0 + GRAPH_MARGIN).to_pos2());
    }

    #[test]
    fn empty_graph_still_has_bounds() {
        let bounds = graph_bounds(std::iter::empty());
        assert!(bounds.is_finite());
        assert_eq!(bounds.width(), GRAPH_MARGIN * 2.0);
    }

    #[test]
    fn projection_fits_and_centers() {
        let bounds = Rect::from_min_max(vec2(0.0, 0.0).to_pos2(), vec2(400.0, 100.0).to_pos2());
        let size = vec2(216.0, 116.0);
        let projection = MinimapProjection::new(bounds, size);

        assert!((projection.scale() - 0.5).abs() < 1.0e-6);
        let top_left = projection.project(vec2(0.0, 0.0));
        let bottom_right = projection.project(vec2(400.0, 100.0));
        assert!((top_left - vec2(MINIMAP_PADDING, 25.0 + MINIMAP_PADDING)).length() < 1.0e-4);
        assert!((bottom_right - vec2(208.0, 75.0 + MINIMAP_PADDING)).length() < 1.0e-4);
    }

    #[test]
    fn overview_projects_the_viewport() {
        let bounds = Rect::from_min_max(vec2(0.0, 0.0).to_pos2(), vec2(100.0, 100.0).to_pos2());
        let viewport = Rect::from_min_max(vec2(25.0, 25.0).to_pos2(), vec2(75.0, 75.0).to_pos2());
        let overview = project(&[vec2(50.0, 50.0)], bounds, viewport, vec2(116.0, 116.0));

        assert_eq!(overview.dots.len(), 1);
        assert!((overview.dots[0] - vec2(58.0, 58.0)).length() < 1.0e-4);
        assert!((overview.viewport.width() - 50.0).abs() < 1.0e-4);
    }

    proptest! {
        #[test]
        fn unproject_inverts_project(
            min_x in -5_000.0f32..5_000.0,
            min_y in -5_000.0f32..5_000.0,
            width in 10.0f32..8_000.0,
            height in 10.0f32..8_000.0,
            fx in 0.0f32..=1.0,
            fy in 0.0f32..=1.0,
            map_w in 60.0f32..400.0,
            map_h in 60.0f32..400.0,
        ) {
            let bounds = Rect::from_min_size(vec2(min_x, min_y).to_pos2(), vec2(width, height));
            let point = vec2(min_x + width * fx, min_y + height * fy);
            let size = vec2(map_w, map_h);

            let projected = MinimapProjection::new(bounds, size).project(point);
            let restored = unproject(projected, bounds, size);
            let tolerance = 1.0e-3 * (1.0 + point.abs().max_elem() + width.max(height));
            prop_assert!((restored - point).length() <= tolerance);
        }
    }
}
