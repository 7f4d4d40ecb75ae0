//! Layout and routing engine for interactive knowledge-graph views.

pub mod engine;
pub mod frame;
pub mod geometry;
pub mod interaction;
pub mod lod;
pub mod minimap;
pub mod model;
pub mod routing;
pub mod search;
pub mod simulation;
pub mod style;
pub mod util;
pub mod viewport;

pub use engine::{EngineEvent, GraphEngine};
pub use frame::FrameSnapshot;
pub use interaction::{HighlightMode, InteractionEvent};
pub use model::{GraphPayload, LoadReport, SessionGraph, load_graph_payload, parse_graph_payload};
pub use viewport::ViewTransform;
