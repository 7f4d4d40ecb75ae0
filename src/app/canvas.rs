use eframe::egui::{
    self, Align2, Color32, FontId, PointerButton, Pos2, Rect, Sense, Shape, Stroke, StrokeKind, Ui, vec2,
};
use knowledge_lens::frame::{EdgeFrame, FrameSnapshot, MinimapFrame, NodeFrame};
use knowledge_lens::geometry::segment_touches_rect;
use knowledge_lens::interaction::{Emphasis, InteractionEvent};
use knowledge_lens::minimap::MINIMAP_PADDING;
use knowledge_lens::style::{blend_color, with_opacity};
use knowledge_lens::{GraphEngine, ViewTransform};

use super::ViewModel;
use super::render_utils::{
    LABEL_FONT_SIZE, PainterMetrics, circle_visible, color, draw_background, emphasis_color, rect_to_screen,
    to_screen,
};

const EDGE_CULL_MARGIN: f32 = 8.0;

impl ViewModel {
    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        self.engine.resize(rect.size());

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let minimap_rect = Rect::from_min_size(
            rect.right_bottom() - self.engine.minimap_size() - vec2(MINIMAP_PADDING, MINIMAP_PADDING),
            self.engine.minimap_size(),
        );
        let over_minimap = pointer.is_some_and(|pointer| minimap_rect.contains(pointer));

        self.handle_zoom(ui, rect, &response);
        self.handle_pointer(ui, rect, &response, pointer, minimap_rect, over_minimap);
        if ui.input(|input| input.key_pressed(egui::Key::Escape)) {
            let events = self.engine.handle(InteractionEvent::Escape);
            self.record(events);
        }

        self.engine.tick();
        if self.engine.simulation().is_running() || self.engine.dragging().is_some() {
            ui.ctx().request_repaint();
        }

        if self.hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let view = *self.engine.view();
        let frame = self.engine.frame_with(&PainterMetrics { painter: &painter });

        draw_background(&painter, rect, &view);
        draw_edges(&painter, rect, &view, &frame.edges);
        draw_nodes(&painter, rect, &view, &frame.nodes);
        draw_minimap(&painter, minimap_rect, &frame.minimap);
        draw_status(&painter, rect, &frame);
    }

    fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.engine.zoom_at(pointer - rect.min, zoom_factor);
    }

    fn handle_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        pointer: Option<Pos2>,
        minimap_rect: Rect,
        over_minimap: bool,
    ) {
        let world_at = |engine: &GraphEngine, pointer: Pos2| engine.view().to_world(pointer - rect.min);

        let hovered = pointer
            .filter(|pointer| rect.contains(*pointer) && !over_minimap)
            .and_then(|pointer| self.engine.node_at(world_at(&self.engine, pointer)));
        if hovered != self.hovered && self.engine.dragging().is_none() {
            let mut events = Vec::new();
            if let Some(previous) = self.hovered {
                events.extend(self.engine.handle(InteractionEvent::PointerLeave(previous)));
            }
            if let Some(node) = hovered {
                events.extend(self.engine.handle(InteractionEvent::PointerEnter(node)));
            }
            self.hovered = hovered;
            self.record(events);
        }

        if response.drag_started_by(PointerButton::Primary)
            && let Some(node) = self.hovered
        {
            self.engine.begin_drag(node);
        }
        if response.dragged_by(PointerButton::Primary) {
            match (self.engine.dragging(), response.interact_pointer_pos()) {
                (Some(_), Some(pointer)) => {
                    let world = world_at(&self.engine, pointer);
                    self.engine.drag_to(world);
                }
                (None, _) => self.engine.pan_by(response.drag_delta()),
                _ => {}
            }
        }
        if response.drag_stopped() {
            self.engine.end_drag();
        }
        if response.dragged_by(PointerButton::Middle) {
            self.engine.pan_by(response.drag_delta());
        }

        if response.clicked_by(PointerButton::Primary) {
            if over_minimap {
                if let Some(pointer) = pointer {
                    let events = self.engine.minimap_click(pointer - minimap_rect.min);
                    self.record(events);
                }
            } else if let Some(node) = self.hovered {
                let event = if ui.input(|input| input.modifiers.shift) {
                    InteractionEvent::ModifiedClick(node)
                } else {
                    InteractionEvent::Click(node)
                };
                let events = self.engine.handle(event);
                self.record(events);
            }
        }

        if response.clicked_by(PointerButton::Secondary)
            && let Some(node) = self.hovered
        {
            let events = self.engine.handle(InteractionEvent::SecondaryClick(node));
            self.record(events);
        }
    }
}

fn draw_edges(painter: &egui::Painter, rect: Rect, view: &ViewTransform, edges: &[EdgeFrame]) {
    let width = (1.2 * view.zoom.sqrt()).clamp(0.6, 3.4);

    for edge in edges.iter().filter(|edge| edge.visible) {
        let points = edge
            .polyline
            .iter()
            .map(|point| to_screen(rect, view, *point))
            .collect::<Vec<_>>();
        if points.len() < 2 || !edge_on_screen(rect, &points) {
            continue;
        }

        let (base, line_width) = match emphasis_color(edge.style.emphasis) {
            Some(highlight) if edge.style.emphasis == Emphasis::OnPath => (highlight, width * 2.0),
            _ => (color(edge.stroke), width),
        };
        painter.add(Shape::line(points, Stroke::new(line_width, with_opacity(base, edge.style.opacity))));

        if edge.label.visible {
            let background = rect_to_screen(rect, view, edge.label.background);
            painter.rect_filled(
                background,
                3.0,
                with_opacity(Color32::from_rgba_unmultiplied(19, 23, 29, 220), edge.style.opacity),
            );
            painter.text(
                to_screen(rect, view, edge.label.anchor),
                Align2::CENTER_CENTER,
                &edge.label.text,
                FontId::proportional(LABEL_FONT_SIZE),
                with_opacity(Color32::from_gray(215), edge.style.opacity),
            );
        }
    }
}

fn edge_on_screen(rect: Rect, points: &[Pos2]) -> bool {
    points
        .windows(2)
        .any(|pair| segment_touches_rect(rect, pair[0].to_vec2(), pair[1].to_vec2(), EDGE_CULL_MARGIN))
}

fn draw_nodes(painter: &egui::Painter, rect: Rect, view: &ViewTransform, nodes: &[NodeFrame]) {
    for node in nodes {
        let position = to_screen(rect, view, node.position);
        let radius = node.radius * view.zoom;
        if !circle_visible(rect, position, radius + 6.0) {
            continue;
        }

        let opacity = node.style.opacity;
        let ring = emphasis_color(node.style.emphasis);
        let fill = match ring {
            Some(ring) => blend_color(color(node.fill), ring, 0.35),
            None => color(node.fill),
        };
        painter.circle_filled(position, radius, with_opacity(fill, opacity));
        painter.circle_stroke(
            position,
            radius,
            Stroke::new(1.0, with_opacity(Color32::from_rgba_unmultiplied(15, 15, 15, 190), opacity)),
        );

        if let Some(ring) = ring {
            painter.circle_stroke(position, radius + 3.0, Stroke::new(2.0, with_opacity(ring, opacity)));
        }
        if node.pinned {
            painter.circle_filled(position, (radius * 0.25).max(1.5), with_opacity(Color32::from_gray(240), opacity));
        }

        if node.show_label {
            painter.text(
                position + vec2(radius + 5.0, 0.0),
                Align2::LEFT_CENTER,
                &node.label,
                FontId::proportional(12.0),
                with_opacity(Color32::from_gray(238), opacity),
            );
        }
    }
}

fn draw_minimap(painter: &egui::Painter, minimap_rect: Rect, minimap: &MinimapFrame) {
    painter.rect_filled(minimap_rect, 4.0, Color32::from_rgba_unmultiplied(12, 15, 20, 215));
    painter.rect_stroke(
        minimap_rect,
        4.0,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(106, 198, 255, 90)),
        StrokeKind::Inside,
    );

    let local = |point: [f32; 2]| minimap_rect.min + vec2(point[0], point[1]);
    for dot in &minimap.dots {
        painter.circle_filled(local(*dot), 1.5, Color32::from_gray(190));
    }

    let [x, y, width, height] = minimap.viewport;
    let viewport = Rect::from_min_size(local([x, y]), vec2(width, height)).intersect(minimap_rect);
    if viewport.is_positive() {
        painter.rect_stroke(
            viewport,
            0.0,
            Stroke::new(1.2, Color32::from_rgb(245, 206, 93)),
            StrokeKind::Inside,
        );
    }
}

fn draw_status(painter: &egui::Painter, rect: Rect, frame: &FrameSnapshot) {
    let text = format!(
        "{}  |  alpha {:.3}  |  zoom {:.2}  |  {:?}",
        frame.highlight, frame.alpha, frame.zoom, frame.detail
    );
    painter.text(
        rect.left_top() + vec2(10.0, 10.0),
        Align2::LEFT_TOP,
        text,
        FontId::proportional(13.0),
        Color32::from_gray(240),
    );
}
