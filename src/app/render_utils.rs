use eframe::egui::{Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2, pos2};
use knowledge_lens::ViewTransform;
use knowledge_lens::interaction::Emphasis;
use knowledge_lens::routing::TextMetrics;
use knowledge_lens::style::{PATH_COLOR, PATH_END_COLOR, PATH_START_COLOR, SEARCH_COLOR};

pub(super) const LABEL_FONT_SIZE: f32 = 11.0;
pub(super) const ANCHOR_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
pub(super) const RELATED_COLOR: Color32 = Color32::from_rgb(246, 137, 92);

/// Measures label text with the painter's fonts.
pub(super) struct PainterMetrics<'a> {
    pub painter: &'a Painter,
}

impl TextMetrics for PainterMetrics<'_> {
    fn measure(&self, text: &str) -> Vec2 {
        self.painter
            .layout_no_wrap(text.to_owned(), FontId::proportional(LABEL_FONT_SIZE), Color32::WHITE)
            .size()
    }
}

pub(super) fn color(rgba: [u8; 4]) -> Color32 {
    let [r, g, b, a] = rgba;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

pub(super) fn emphasis_color(emphasis: Emphasis) -> Option<Color32> {
    match emphasis {
        Emphasis::Normal => None,
        Emphasis::Anchor => Some(ANCHOR_COLOR),
        Emphasis::Related => Some(RELATED_COLOR),
        Emphasis::PathStart => Some(PATH_START_COLOR),
        Emphasis::PathEnd => Some(PATH_END_COLOR),
        Emphasis::OnPath => Some(PATH_COLOR),
        Emphasis::SearchMatch => Some(SEARCH_COLOR),
    }
}

pub(super) fn to_screen(rect: Rect, view: &ViewTransform, world: [f32; 2]) -> Pos2 {
    rect.min + view.to_screen(Vec2::new(world[0], world[1]))
}

/// `bounds` is `[x, y, width, height]` in simulation space.
pub(super) fn rect_to_screen(rect: Rect, view: &ViewTransform, bounds: [f32; 4]) -> Rect {
    let [x, y, width, height] = bounds;
    Rect::from_two_pos(
        to_screen(rect, view, [x, y]),
        to_screen(rect, view, [x + width, y + height]),
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, view: &ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * view.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + view.pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}
