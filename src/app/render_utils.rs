use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};

pub(super) const CANVAS_COLOR: Color32 = Color32::from_rgb(18, 18, 18);
pub(super) const NODE_FILL: Color32 = Color32::from_rgb(30, 30, 30);
pub(super) const NODE_BORDER: Color32 = Color32::from_rgb(0, 229, 255);
pub(super) const NODE_TEXT: Color32 = Color32::WHITE;
pub(super) const SELECTED_COLOR: Color32 = Color32::from_rgb(255, 0, 85);
pub(super) const EDGE_COLOR: Color32 = Color32::from_rgb(102, 102, 102);
pub(super) const ARROW_COLOR: Color32 = Color32::from_rgb(0, 229, 255);
const GRID_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 23, 26, 26);

const GRID_WORLD_SPACING: f32 = 50.0;
const GRID_MIN_SPACING: f32 = 20.0;
const GRID_MAX_SPACING: f32 = 80.0;

pub(super) const ARROW_LENGTH: f32 = 12.0;
const ARROW_HALF_WIDTH: f32 = 6.0;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn grid_spacing(zoom: f32) -> f32 {
    let mut spacing = GRID_WORLD_SPACING * zoom;
    if !spacing.is_finite() || spacing <= 0.0 {
        return GRID_WORLD_SPACING;
    }
    while spacing < GRID_MIN_SPACING {
        spacing *= 2.0;
    }
    while spacing > GRID_MAX_SPACING {
        spacing /= 2.0;
    }
    spacing
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, offset: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, CANVAS_COLOR);

    let step = grid_spacing(zoom);
    let origin = rect.min + offset;
    let stroke = Stroke::new(1.0, GRID_COLOR);

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

pub(super) fn trimmed_segment(
    from: Pos2,
    from_radius: f32,
    to: Pos2,
    to_radius: f32,
) -> Option<(Pos2, Pos2)> {
    let delta = to - from;
    let length = delta.length();
    if length <= from_radius + to_radius || length <= f32::EPSILON {
        return None;
    }

    let direction = delta / length;
    Some((from + direction * from_radius, to - direction * to_radius))
}

pub(super) fn draw_arrowhead(painter: &Painter, tip: Pos2, direction: Vec2, scale: f32, color: Color32) {
    let direction = direction.normalized();
    if !direction.is_finite() {
        return;
    }

    let back = tip - direction * ARROW_LENGTH * scale;
    let side = direction.rot90() * ARROW_HALF_WIDTH * scale;
    painter.add(Shape::convex_polygon(
        vec![tip, back + side, back - side],
        color,
        Stroke::NONE,
    ));
}

pub(super) fn draw_dashed_line(painter: &Painter, start: Pos2, end: Pos2, stroke: Stroke) {
    painter.extend(Shape::dashed_line(&[start, end], stroke, 6.0, 4.0));
}
