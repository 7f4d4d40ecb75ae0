use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, vec2};
use knowledge_lens::model::{GraphPayload, NodeIndex, load_graph_payload};
use knowledge_lens::{EngineEvent, GraphEngine, LoadReport};
use tracing::{info, warn};

mod canvas;
mod panels;
mod render_utils;

const RECENT_EVENT_ROWS: usize = 12;

pub struct KnowledgeLensApp {
    graph_path: PathBuf,
    center: Option<String>,
    min_confidence: f32,
    state: AppState,
    reload_rx: Option<Receiver<Result<GraphPayload, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<GraphPayload, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: GraphEngine,
    report: LoadReport,
    search: String,
    hovered: Option<NodeIndex>,
    recent_events: VecDeque<String>,
}

impl ViewModel {
    fn new(mut payload: GraphPayload, center: Option<&str>, min_confidence: f32) -> Self {
        if let Some(center) = center {
            payload.center_id = Some(center.to_owned());
        }

        let mut engine = GraphEngine::new(vec2(1280.0, 800.0));
        let report = engine.initialize(payload);
        engine.set_confidence_threshold(min_confidence);

        Self {
            engine,
            report,
            search: String::new(),
            hovered: None,
            recent_events: VecDeque::with_capacity(RECENT_EVENT_ROWS),
        }
    }

    fn record(&mut self, events: Vec<EngineEvent>) {
        for event in events {
            let line = match serde_json::to_string(&event) {
                Ok(line) => line,
                Err(error) => {
                    warn!(%error, "failed to serialize engine event");
                    continue;
                }
            };
            if self.recent_events.len() == RECENT_EVENT_ROWS {
                self.recent_events.pop_back();
            }
            self.recent_events.push_front(line);
        }
    }
}

impl KnowledgeLensApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        graph_path: PathBuf,
        center: Option<String>,
        min_confidence: f32,
    ) -> Self {
        let state = Self::start_load(graph_path.clone());
        Self {
            graph_path,
            center,
            min_confidence,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(graph_path: PathBuf) -> Receiver<Result<GraphPayload, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph_payload(&graph_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(graph_path: PathBuf) -> AppState {
        info!(path = %graph_path.display(), "loading graph");
        AppState::Loading {
            rx: Self::spawn_load(graph_path),
        }
    }

    fn ready(&self, result: Result<GraphPayload, String>) -> AppState {
        match result {
            Ok(payload) => AppState::Ready(Box::new(ViewModel::new(
                payload,
                self.center.as_deref(),
                self.min_confidence,
            ))),
            Err(error) => {
                warn!(%error, "graph load failed");
                AppState::Error(error)
            }
        }
    }
}

impl eframe::App for KnowledgeLensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading knowledge graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load knowledge graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.graph_path.clone());
                    return;
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.graph_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.graph_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready(result);
            ctx.request_repaint();
        }
    }
}
