mod collect;
mod paths;

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{EdgeIndex, NodeIndex, SessionGraph};

pub use collect::Selection;

use self::collect::{direct_neighbors, neighborhood};
use self::paths::{path_selection, shortest_path};

pub const FOCUS_HOPS: usize = 2;
/// Opacity of elements outside a hover, pin or path highlight.
pub const DIM_OPACITY: f32 = 0.15;
/// Opacity of elements outside the focus neighbourhood.
pub const FADED_OPACITY: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
    PointerEnter(NodeIndex),
    PointerLeave(NodeIndex),
    Click(NodeIndex),
    /// Click with the pin modifier held.
    ModifiedClick(NodeIndex),
    SecondaryClick(NodeIndex),
    Escape,
    ClearHighlight,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum HighlightMode {
    #[default]
    None,
    Hover {
        node: NodeIndex,
        selection: Selection,
    },
    Pinned {
        node: NodeIndex,
        selection: Selection,
    },
    Focus {
        center: NodeIndex,
        hops: usize,
        visible: Selection,
    },
    Path {
        start: NodeIndex,
        end: Option<NodeIndex>,
        /// `None` until an end is chosen, and when the endpoints are disconnected.
        route: Option<Selection>,
    },
}

impl HighlightMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hover { .. } => "hover",
            Self::Pinned { .. } => "pinned",
            Self::Focus { .. } => "focus",
            Self::Path { .. } => "path",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    #[default]
    Normal,
    Anchor,
    Related,
    PathStart,
    PathEnd,
    OnPath,
    SearchMatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ElementStyle {
    pub opacity: f32,
    pub emphasis: Emphasis,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            emphasis: Emphasis::Normal,
        }
    }
}

impl ElementStyle {
    fn new(opacity: f32, emphasis: Emphasis) -> Self {
        Self { opacity, emphasis }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleDiff {
    pub nodes: Vec<(NodeIndex, ElementStyle)>,
    pub edges: Vec<(EdgeIndex, ElementStyle)>,
}

impl StyleDiff {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Pinned(NodeIndex),
    Unpinned(NodeIndex),
    FocusEntered(NodeIndex),
    FocusCleared(NodeIndex),
    PathStarted(NodeIndex),
    PathCompleted {
        start: NodeIndex,
        end: NodeIndex,
        connected: bool,
    },
    PathCleared,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transition {
    pub diff: StyleDiff,
    pub notices: Vec<Notice>,
}

#[derive(Clone, Debug, Default)]
pub struct InteractionState {
    mode: HighlightMode,
    search_matches: HashSet<NodeIndex>,
    node_styles: Vec<ElementStyle>,
    edge_styles: Vec<ElementStyle>,
}

impl InteractionState {
    pub fn new(graph: &SessionGraph) -> Self {
        Self {
            mode: HighlightMode::None,
            search_matches: HashSet::new(),
            node_styles: vec![ElementStyle::default(); graph.node_count()],
            edge_styles: vec![ElementStyle::default(); graph.edge_count()],
        }
    }

    pub fn mode(&self) -> &HighlightMode {
        &self.mode
    }

    pub fn node_style(&self, node: NodeIndex) -> ElementStyle {
        self.node_styles.get(node).copied().unwrap_or_default()
    }

    pub fn edge_style(&self, edge: EdgeIndex) -> ElementStyle {
        self.edge_styles.get(edge).copied().unwrap_or_default()
    }

    pub fn pinned(&self) -> Option<NodeIndex> {
        match self.mode {
            HighlightMode::Pinned { node, .. } => Some(node),
            _ => None,
        }
    }

    pub fn search_matches(&self) -> &HashSet<NodeIndex> {
        &self.search_matches
    }

    pub fn apply(&mut self, graph: &SessionGraph, event: InteractionEvent) -> Transition {
        let mut notices = Vec::new();
        let next = self.next_mode(graph, event, &mut notices);
        if let Some(mode) = next {
            self.mode = mode;
        }

        Transition {
            diff: self.restyle(graph),
            notices,
        }
    }

    /// Replaces the externally supplied search highlight. Only visible while no
    /// other highlight mode is active.
    pub fn set_search_matches(&mut self, graph: &SessionGraph, matches: HashSet<NodeIndex>) -> StyleDiff {
        self.search_matches = matches;
        self.restyle(graph)
    }

    fn next_mode(
        &self,
        graph: &SessionGraph,
        event: InteractionEvent,
        notices: &mut Vec<Notice>,
    ) -> Option<HighlightMode> {
        let in_graph = |node: NodeIndex| node < graph.node_count();

        match event {
            InteractionEvent::PointerEnter(node) if in_graph(node) => match self.mode {
                HighlightMode::None | HighlightMode::Hover { .. } => Some(HighlightMode::Hover {
                    node,
                    selection: direct_neighbors(graph, node),
                }),
                _ => None,
            },
            InteractionEvent::PointerLeave(node) => match self.mode {
                HighlightMode::Hover { node: hovered, .. } if hovered == node => Some(HighlightMode::None),
                _ => None,
            },
            InteractionEvent::ModifiedClick(node) if in_graph(node) => {
                if let Some(pinned) = self.pinned() {
                    notices.push(Notice::Unpinned(pinned));
                    if pinned == node {
                        return Some(HighlightMode::None);
                    }
                }
                notices.push(Notice::Pinned(node));
                Some(HighlightMode::Pinned {
                    node,
                    selection: direct_neighbors(graph, node),
                })
            }
            InteractionEvent::Escape => match self.mode {
                HighlightMode::Pinned { node, .. } => {
                    notices.push(Notice::Unpinned(node));
                    Some(HighlightMode::None)
                }
                HighlightMode::Hover { .. } => Some(HighlightMode::None),
                _ => None,
            },
            InteractionEvent::Click(node) if in_graph(node) => {
                self.release_pin(notices);
                match self.mode {
                    HighlightMode::Focus { center, .. } if center == node => {
                        notices.push(Notice::FocusCleared(node));
                        Some(HighlightMode::None)
                    }
                    _ => {
                        notices.push(Notice::FocusEntered(node));
                        Some(HighlightMode::Focus {
                            center: node,
                            hops: FOCUS_HOPS,
                            visible: neighborhood(graph, node, FOCUS_HOPS),
                        })
                    }
                }
            }
            InteractionEvent::SecondaryClick(node) if in_graph(node) => match self.mode {
                HighlightMode::Path { start, end: None, .. } => {
                    if start == node {
                        return None;
                    }
                    let route = shortest_path(graph, start, node).map(|path| path_selection(graph, &path));
                    notices.push(Notice::PathCompleted {
                        start,
                        end: node,
                        connected: route.is_some(),
                    });
                    Some(HighlightMode::Path {
                        start,
                        end: Some(node),
                        route,
                    })
                }
                HighlightMode::Path { end: Some(_), .. } => {
                    notices.push(Notice::PathCleared);
                    Some(HighlightMode::None)
                }
                _ => {
                    self.release_pin(notices);
                    notices.push(Notice::PathStarted(node));
                    Some(HighlightMode::Path {
                        start: node,
                        end: None,
                        route: None,
                    })
                }
            },
            InteractionEvent::ClearHighlight => {
                self.release_pin(notices);
                match self.mode {
                    HighlightMode::None => None,
                    _ => Some(HighlightMode::None),
                }
            }
            _ => None,
        }
    }

    fn release_pin(&self, notices: &mut Vec<Notice>) {
        if let Some(pinned) = self.pinned() {
            notices.push(Notice::Unpinned(pinned));
        }
    }

    /// Recomputes every element style for the current mode and returns the changes.
    fn restyle(&mut self, graph: &SessionGraph) -> StyleDiff {
        let mut diff = StyleDiff::default();

        for node in 0..graph.node_count() {
            let style = self.style_node(node);
            if self.node_styles.len() <= node {
                self.node_styles.resize(node + 1, ElementStyle::default());
            }
            if self.node_styles[node] != style {
                self.node_styles[node] = style;
                diff.nodes.push((node, style));
            }
        }

        for (index, edge) in graph.edges.iter().enumerate() {
            let style = self.style_edge(index, edge.source, edge.target);
            if self.edge_styles.len() <= index {
                self.edge_styles.resize(index + 1, ElementStyle::default());
            }
            if self.edge_styles[index] != style {
                self.edge_styles[index] = style;
                diff.edges.push((index, style));
            }
        }

        diff
    }

    fn style_node(&self, node: NodeIndex) -> ElementStyle {
        match &self.mode {
            HighlightMode::None => {
                if self.search_matches.contains(&node) {
                    ElementStyle::new(1.0, Emphasis::SearchMatch)
                } else {
                    ElementStyle::default()
                }
            }
            HighlightMode::Hover { node: anchor, selection } | HighlightMode::Pinned { node: anchor, selection } => {
                if node == *anchor {
                    ElementStyle::new(1.0, Emphasis::Anchor)
                } else if selection.contains_node(node) {
                    ElementStyle::new(1.0, Emphasis::Related)
                } else {
                    ElementStyle::new(DIM_OPACITY, Emphasis::Normal)
                }
            }
            HighlightMode::Focus { center, visible, .. } => {
                if node == *center {
                    ElementStyle::new(1.0, Emphasis::Anchor)
                } else if visible.contains_node(node) {
                    ElementStyle::default()
                } else {
                    ElementStyle::new(FADED_OPACITY, Emphasis::Normal)
                }
            }
            HighlightMode::Path { start, end, route } => {
                if node == *start {
                    ElementStyle::new(1.0, Emphasis::PathStart)
                } else if Some(node) == *end {
                    ElementStyle::new(1.0, Emphasis::PathEnd)
                } else if end.is_none() {
                    ElementStyle::default()
                } else if route.as_ref().is_some_and(|route| route.contains_node(node)) {
                    ElementStyle::new(1.0, Emphasis::OnPath)
                } else {
                    ElementStyle::new(DIM_OPACITY, Emphasis::Normal)
                }
            }
        }
    }

    fn style_edge(&self, edge: EdgeIndex, source: NodeIndex, target: NodeIndex) -> ElementStyle {
        match &self.mode {
            HighlightMode::None => ElementStyle::default(),
            HighlightMode::Hover { selection, .. } | HighlightMode::Pinned { selection, .. } => {
                if selection.contains_edge(edge) {
                    ElementStyle::new(1.0, Emphasis::Related)
                } else {
                    ElementStyle::new(DIM_OPACITY, Emphasis::Normal)
                }
            }
            HighlightMode::Focus { visible, .. } => {
                if visible.contains_node(source) && visible.contains_node(target) {
                    ElementStyle::default()
                } else {
                    ElementStyle::new(FADED_OPACITY, Emphasis::Normal)
                }
            }
            HighlightMode::Path { end: None, .. } => ElementStyle::default(),
            HighlightMode::Path { route, .. } => {
                if route.as_ref().is_some_and(|route| route.contains_edge(edge)) {
                    ElementStyle::new(1.0, Emphasis::OnPath)
                } else {
                    ElementStyle::new(DIM_OPACITY, Emphasis::Normal)
                }
            }
        }
    }
}
