//! Positions are in simulation space, the minimap in minimap-local space.

use eframe::egui::{Rect, Vec2};
use serde::Serialize;

use crate::interaction::ElementStyle;
use crate::lod::DetailLevel;
use crate::minimap::MinimapOverview;
use crate::routing::{PathSegment, RouteKind};

pub fn point(vector: Vec2) -> [f32; 2] {
    [vector.x, vector.y]
}

/// `[x, y, width, height]`.
pub fn bounds(rect: Rect) -> [f32; 4] {
    [rect.min.x, rect.min.y, rect.width(), rect.height()]
}

#[derive(Clone, Debug, Serialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub alpha: f32,
    pub running: bool,
    pub zoom: f32,
    pub pan: [f32; 2],
    pub detail: DetailLevel,
    pub highlight: &'static str,
    pub confidence_threshold: f32,
    pub nodes: Vec<NodeFrame>,
    /// Ordered by bundle so that parallel edges are painted together.
    pub edges: Vec<EdgeFrame>,
    pub minimap: MinimapFrame,
}

#[derive(Clone, Debug, Serialize)]
pub struct NodeFrame {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub entity_type: String,
    pub position: [f32; 2],
    pub radius: f32,
    pub fill: [u8; 4],
    pub style: ElementStyle,
    pub show_label: bool,
    pub pinned: bool,
    pub is_center: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentFrame {
    Line {
        from: [f32; 2],
        to: [f32; 2],
    },
    Quadratic {
        from: [f32; 2],
        control: [f32; 2],
        to: [f32; 2],
    },
    Cubic {
        from: [f32; 2],
        control1: [f32; 2],
        control2: [f32; 2],
        to: [f32; 2],
    },
}

impl From<&PathSegment> for SegmentFrame {
    fn from(segment: &PathSegment) -> Self {
        match segment {
            PathSegment::Line { start, end } => Self::Line {
                from: point(*start),
                to: point(*end),
            },
            PathSegment::Quadratic(curve) => Self::Quadratic {
                from: point(curve.start),
                control: point(curve.control),
                to: point(curve.end),
            },
            PathSegment::Cubic(curve) => Self::Cubic {
                from: point(curve.start),
                control1: point(curve.control1),
                control2: point(curve.control2),
                to: point(curve.end),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LabelFrame {
    pub text: String,
    pub anchor: [f32; 2],
    pub background: [f32; 4],
    pub visible: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GroupFrame {
    pub low: String,
    pub high: String,
    pub index: usize,
    pub size: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct EdgeFrame {
    pub index: usize,
    pub source: String,
    pub target: String,
    pub relationship: String,
    pub confidence: f32,
    pub kind: RouteKind,
    pub segments: Vec<SegmentFrame>,
    /// Flattened polyline of `segments`, ready for stroking.
    pub polyline: Vec<[f32; 2]>,
    pub stroke: [u8; 4],
    pub style: ElementStyle,
    pub visible: bool,
    pub label: LabelFrame,
    pub group: GroupFrame,
}

#[derive(Clone, Debug, Serialize)]
pub struct MinimapFrame {
    pub size: [f32; 2],
    pub dots: Vec<[f32; 2]>,
    pub viewport: [f32; 4],
}

impl From<&MinimapOverview> for MinimapFrame {
    fn from(overview: &MinimapOverview) -> Self {
        Self {
            size: point(overview.size),
            dots: overview.dots.iter().copied().map(point).collect(),
            viewport: bounds(overview.viewport),
        }
    }
}
