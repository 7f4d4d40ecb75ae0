use eframe::egui::{Rect, Vec2, vec2};

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 6.0;

/// Pan and zoom of the main drawing area.
///
/// Screen coordinates are local to the drawing area; at pan zero and zoom one
/// they coincide with simulation space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub pan: Vec2,
    pub zoom: f32,
    pub size: Vec2,
}

impl ViewTransform {
    pub fn new(size: Vec2) -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            size: sanitize_size(size),
        }
    }

    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        self.pan + world * self.zoom
    }

    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan) / self.zoom
    }

    /// Multiplies the zoom by `factor`, keeping the point under `pointer` fixed.
    pub fn zoom_at(&mut self, pointer: Vec2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 || !pointer.is_finite() {
            return;
        }
        let anchor = self.to_world(pointer);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - anchor * self.zoom;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.pan += delta;
        }
    }

    /// Pans so that `world` sits in the middle of the drawing area.
    pub fn center_on(&mut self, world: Vec2) {
        if world.is_finite() {
            self.pan = self.size * 0.5 - world * self.zoom;
        }
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = sanitize_size(size);
    }

    /// The part of simulation space currently visible.
    pub fn visible_world(&self) -> Rect {
        Rect::from_min_max(self.to_world(Vec2::ZERO).to_pos2(), self.to_world(self.size).to_pos2())
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(vec2(1280.0, 800.0))
    }
}

fn sanitize_size(size: Vec2) -> Vec2 {
    if size.is_finite() {
        size.max(Vec2::splat(1.0))
    } else {
        Vec2::splat(1.0)
    }
}
