use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, ScrollArea, Ui};
use knowledge_lens::interaction::InteractionEvent;
use knowledge_lens::search::search_nodes;
use knowledge_lens::util::format_count;

use super::ViewModel;

const SEARCH_RESULT_ROWS: usize = 20;

impl ViewModel {
    pub(super) fn show(&mut self, ctx: &Context, graph_path: &Path, reload_requested: &mut bool, is_loading: bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("knowledge-lens");
                    ui.separator();
                    ui.label(format!("graph: {}", graph_path.display()));
                    if let Some(center) = self.engine.graph().center.and_then(|index| self.engine.graph().nodes.get(index)) {
                        ui.label(format!("center: {}", center.label()));
                    }
                    ui.label(format!("nodes: {}", self.report.node_count));
                    ui.label(format!("edges: {}", self.report.edge_count));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload graph"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let simulation = self.engine.simulation();
                        if simulation.is_running() {
                            ui.label(format!("settling: alpha {:.3}", simulation.alpha()));
                        } else {
                            ui.label(format!("settled after {} ticks", simulation.ticks()));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        let search = ui.text_edit_singleline(&mut self.search);
        if search.changed() {
            let events = self.engine.search(&self.search);
            self.record(events);
        }

        let hits = search_nodes(self.engine.graph(), &self.search);
        if !hits.is_empty() {
            ui.label(format_count(hits.len(), "match", "matches"));
        }
        let mut focus_request = None;
        ScrollArea::vertical()
            .id_salt("search_results")
            .max_height(220.0)
            .show(ui, |ui| {
                for hit in hits.iter().take(SEARCH_RESULT_ROWS) {
                    let Some(node) = self.engine.graph().nodes.get(hit.node) else {
                        continue;
                    };
                    let text = if node.entity_type.is_empty() {
                        node.label().to_owned()
                    } else {
                        format!("{}  ({})", node.label(), node.entity_type)
                    };
                    let selected = self.engine.focus_pin() == Some(hit.node);
                    if ui.selectable_label(selected, text).clicked() {
                        focus_request = Some(node.id.clone());
                    }
                }
            });
        if let Some(id) = focus_request {
            let events = self.engine.focus_node(&id);
            self.record(events);
        }

        ui.separator();
        ui.heading("Filters");
        let mut threshold = self.engine.confidence_threshold();
        if ui
            .add(egui::Slider::new(&mut threshold, 0.0..=1.0).text("min confidence"))
            .changed()
        {
            self.engine.set_confidence_threshold(threshold);
        }

        ui.separator();
        ui.heading("Highlight");
        ui.label(format!("mode: {}", self.engine.interaction().mode().name()));
        if let Some(node) = self.engine.interaction().pinned().and_then(|index| self.engine.graph().nodes.get(index)) {
            ui.label(format!("pinned: {}", node.label()));
        }
        if ui.button("Clear highlight").clicked() {
            let events = self.engine.handle(InteractionEvent::ClearHighlight);
            self.record(events);
        }
        ui.small("click: focus  |  shift-click: pin  |  right-click: path  |  esc: clear");

        ui.separator();
        ui.heading("Load");
        ui.label(format_count(self.report.node_count, "node", "nodes"));
        ui.label(format_count(self.report.edge_count, "edge", "edges"));
        if self.report.dropped_edges > 0 {
            ui.label(format_count(self.report.dropped_edges, "dangling edge dropped", "dangling edges dropped"));
        }
        if self.report.self_loops > 0 {
            ui.label(format_count(self.report.self_loops, "self-loop", "self-loops"));
        }
        if self.report.duplicate_nodes > 0 {
            ui.label(format_count(self.report.duplicate_nodes, "duplicate node", "duplicate nodes"));
        }

        ui.separator();
        ui.heading("Events");
        if self.recent_events.is_empty() {
            ui.weak("none yet");
        }
        for line in &self.recent_events {
            ui.monospace(line);
        }
    }
}
