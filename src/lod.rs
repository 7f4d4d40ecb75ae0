use serde::Serialize;

/// Below this zoom no labels are drawn.
pub const NODE_LABEL_ZOOM: f32 = 0.6;
/// From this zoom on every node is labelled, not just the center.
pub const ALL_NODE_LABELS_ZOOM: f32 = 1.2;
pub const EDGE_LABEL_ZOOM: f32 = 1.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    Overview,
    CenterOnly,
    Full,
}

pub fn detail_level(zoom: f32) -> DetailLevel {
    if zoom.is_nan() || zoom < NODE_LABEL_ZOOM {
        DetailLevel::Overview
    } else if zoom < ALL_NODE_LABELS_ZOOM {
        DetailLevel::CenterOnly
    } else {
        DetailLevel::Full
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub show_node_label: bool,
    pub show_edge_label: bool,
}

pub fn passes_confidence(confidence: f32, threshold: f32) -> bool {
    confidence >= threshold
}

/// Label visibility for one element at the given zoom and confidence filter.
///
/// Stateless; safe to call for every element on every frame.
pub fn visibility_for(zoom: f32, is_center: bool, confidence: f32, threshold: f32) -> Visibility {
    let show_node_label = match detail_level(zoom) {
        DetailLevel::Overview => false,
        DetailLevel::CenterOnly => is_center,
        DetailLevel::Full => true,
    };

    Visibility {
        show_node_label,
        show_edge_label: zoom >= EDGE_LABEL_ZOOM && passes_confidence(confidence, threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoomed_out_shows_nothing() {
        let visibility = visibility_for(0.3, true, 1.0, 0.0);
        assert_eq!(visibility, Visibility::default());
        assert_eq!(detail_level(f32::NAN), DetailLevel::Overview);
    }

    #[test]
    fn medium_zoom_labels_only_the_center() {
        assert!(visibility_for(0.8, true, 1.0, 0.0).show_node_label);
        assert!(!visibility_for(0.8, false, 1.0, 0.0).show_node_label);
        assert!(!visibility_for(0.8, true, 1.0, 0.0).show_edge_label);
    }

    #[test]
    fn high_zoom_labels_every_node() {
        let visibility = visibility_for(1.5, false, 1.0, 0.0);
        assert!(visibility.show_node_label);
        assert!(!visibility.show_edge_label);
    }

    #[test]
    fn edge_labels_respect_the_confidence_filter() {
        assert!(visibility_for(2.0, false, 0.5, 0.5).show_edge_label);
        assert!(!visibility_for(2.0, false, 0.49, 0.5).show_edge_label);
        assert!(!visibility_for(1.79, false, 1.0, 0.0).show_edge_label);
    }
}
