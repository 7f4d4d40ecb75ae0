use std::collections::HashMap;

use eframe::egui::Color32;

use crate::util::stable_hash;

const RELATIONSHIP_PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

const ENTITY_PALETTE: [Color32; 8] = [
    Color32::from_rgb(96, 165, 250),
    Color32::from_rgb(52, 211, 153),
    Color32::from_rgb(251, 191, 36),
    Color32::from_rgb(248, 113, 113),
    Color32::from_rgb(167, 139, 250),
    Color32::from_rgb(244, 114, 182),
    Color32::from_rgb(45, 212, 191),
    Color32::from_rgb(251, 146, 60),
];

pub const UNTYPED_ENTITY_COLOR: Color32 = Color32::from_rgb(148, 163, 184);
pub const PATH_START_COLOR: Color32 = Color32::from_rgb(74, 222, 128);
pub const PATH_END_COLOR: Color32 = Color32::from_rgb(248, 113, 113);
pub const PATH_COLOR: Color32 = Color32::from_rgb(246, 206, 104);
pub const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

pub const MIN_NODE_RADIUS: f32 = 6.0;
pub const MAX_NODE_RADIUS: f32 = 20.0;
pub const CENTER_NODE_RADIUS_BONUS: f32 = 6.0;

/// Relationship label to stroke colour, assigned on first sight for one graph load.
#[derive(Clone, Debug, Default)]
pub struct RelationshipPalette {
    assigned: HashMap<String, Color32>,
    next: usize,
}

impl RelationshipPalette {
    pub fn color_for(&mut self, relationship: &str) -> Color32 {
        if let Some(color) = self.assigned.get(relationship) {
            return *color;
        }

        let color = RELATIONSHIP_PALETTE[self.next % RELATIONSHIP_PALETTE.len()];
        self.next += 1;
        self.assigned.insert(relationship.to_owned(), color);
        color
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

pub fn entity_color(entity_type: &str) -> Color32 {
    if entity_type.is_empty() {
        return UNTYPED_ENTITY_COLOR;
    }
    ENTITY_PALETTE[(stable_hash(entity_type) % ENTITY_PALETTE.len() as u64) as usize]
}

fn normalize_log(value: usize, min: usize, max: usize) -> f32 {
    let min = (min.max(1)) as f64;
    let max = (max as f64).max(min);
    let value = (value.max(1)) as f64;

    if (max - min).abs() < f64::EPSILON {
        return 0.5;
    }

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

pub fn node_radius(degree: usize, min_degree: usize, max_degree: usize, is_center: bool) -> f32 {
    let radius = MIN_NODE_RADIUS
        + normalize_log(degree + 1, min_degree + 1, max_degree + 1) * (MAX_NODE_RADIUS - MIN_NODE_RADIUS);
    if is_center {
        radius + CENTER_NODE_RADIUS_BONUS
    } else {
        radius
    }
}

pub fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity) as u8,
    )
}

pub fn rgba(color: Color32) -> [u8; 4] {
    [color.r(), color.g(), color.b(), color.a()]
}
