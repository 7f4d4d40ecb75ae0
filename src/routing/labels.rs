use eframe::egui::{Rect, Vec2, vec2};

use super::{EdgeGroup, RoutedPath};

pub const LABEL_PADDING: Vec2 = vec2(4.0, 2.0);
pub const FORWARD_LABEL_T: f32 = 0.35;
pub const BACKWARD_LABEL_T: f32 = 0.65;

/// Measures rendered text; the viewer backs this with the real font.
pub trait TextMetrics {
    fn measure(&self, text: &str) -> Vec2;
}

/// Fixed-advance estimate used when no font is available (headless runs, tests).
#[derive(Clone, Copy, Debug)]
pub struct ApproxTextMetrics {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for ApproxTextMetrics {
    fn default() -> Self {
        Self {
            char_width: 6.5,
            line_height: 14.0,
        }
    }
}

impl TextMetrics for ApproxTextMetrics {
    fn measure(&self, text: &str) -> Vec2 {
        vec2(text.chars().count() as f32 * self.char_width, self.line_height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelBox {
    pub anchor: Vec2,
    pub rect: Rect,
}

/// Parameter along the edge's own path where its label sits.
///
/// Bundled labels are staggered in the low-to-high direction of the pair, so the
/// two directions of a bidirectional edge land near opposite endpoints.
pub fn label_t(group: &EdgeGroup) -> f32 {
    if !group.is_bundled() {
        return 0.5;
    }
    if group.forward {
        FORWARD_LABEL_T
    } else {
        1.0 - BACKWARD_LABEL_T
    }
}

pub fn label_anchor(path: &RoutedPath, group: &EdgeGroup) -> Vec2 {
    path.point_at(label_t(group))
}

/// Background box around `text` centred on `anchor`, in the same space as the
/// anchor. `zoom` converts the measured screen size into that space.
pub fn label_box(anchor: Vec2, text: &str, metrics: &dyn TextMetrics, zoom: f32) -> LabelBox {
    let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
    let size = (metrics.measure(text) + LABEL_PADDING * 2.0) / zoom;
    LabelBox {
        anchor,
        rect: Rect::from_center_size(anchor.to_pos2(), size),
    }
}
