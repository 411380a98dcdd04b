use eframe::egui::{
    self, Align, Align2, Context, CursorIcon, Event, FontId, Key, LayerId, Painter, Pos2, Rect,
    Response, Sense, Stroke, TextEdit, Ui, Vec2, vec2,
};

use crate::graph::{EdgeKind, NodeId, TextMeasure};

use super::super::render_utils::{
    ARROW_COLOR, ARROW_LENGTH, EDGE_COLOR, NODE_BORDER, NODE_FILL, NODE_TEXT, SELECTED_COLOR,
    blend_color, circle_visible, draw_arrowhead, draw_background, draw_dashed_line, edge_visible,
    trimmed_segment,
};
use super::super::{InputEvent, Mode, Selection, ViewModel};

const LABEL_FONT_SIZE: f32 = 14.0;

pub(in crate::app) struct PainterMeasure {
    painter: Painter,
}

impl PainterMeasure {
    pub(in crate::app) fn new(painter: Painter) -> Self {
        Self { painter }
    }

    pub(in crate::app) fn from_context(ctx: &Context) -> Self {
        Self::new(ctx.layer_painter(LayerId::background()))
    }
}

impl TextMeasure for PainterMeasure {
    fn measure(&self, text: &str) -> f32 {
        self.painter
            .layout_no_wrap(
                text.to_owned(),
                FontId::proportional(LABEL_FONT_SIZE),
                NODE_TEXT,
            )
            .size()
            .x
    }
}

fn canvas_events(ui: &Ui, rect: Rect, response: &Response) -> Vec<InputEvent> {
    let origin = rect.min.to_vec2();
    let over_canvas = response.contains_pointer();
    let keyboard_free = ui.ctx().memory(|memory| {
        memory
            .focused()
            .is_none_or(|focused| focused == response.id)
    });

    let mut forwarded = Vec::new();
    ui.input(|input| {
        for event in &input.events {
            match event {
                Event::PointerButton {
                    pos,
                    button,
                    pressed: true,
                    modifiers,
                    ..
                } if over_canvas => forwarded.push(InputEvent::PointerDown {
                    button: *button,
                    pos: *pos - origin,
                    modifiers: *modifiers,
                }),
                Event::PointerButton {
                    pos,
                    button,
                    pressed: false,
                    modifiers,
                    ..
                } => forwarded.push(InputEvent::PointerUp {
                    button: *button,
                    pos: *pos - origin,
                    modifiers: *modifiers,
                }),
                Event::PointerMoved(pos) => {
                    forwarded.push(InputEvent::PointerMove { pos: *pos - origin });
                }
                Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    ..
                } if keyboard_free => forwarded.push(InputEvent::Key(*key)),
                _ => {}
            }
        }

        let scroll = input.raw_scroll_delta.y;
        if over_canvas
            && scroll.abs() > f32::EPSILON
            && let Some(pointer) = input.pointer.hover_pos()
        {
            forwarded.push(InputEvent::Scroll {
                pos: pointer - origin,
                steps: scroll.signum(),
            });
        }
    });

    if response.double_clicked()
        && let Some(pos) = response.interact_pointer_pos()
    {
        forwarded.push(InputEvent::DoubleClick { pos: pos - origin });
    }

    forwarded
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let measure = PainterMeasure::new(painter.clone());

        self.session.set_viewport(rect.size());
        for event in canvas_events(ui, rect, &response) {
            self.session.handle(event, &measure);
        }

        if response.secondary_clicked()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let world = self.session.screen_to_world(pointer - rect.min.to_vec2());
            self.context_world = world;
            self.context_node = self.session.graph().node_at(world);
        }
        response.context_menu(|ui| self.draw_canvas_menu(ui, &measure));

        if self.session.tick() {
            ui.ctx().request_repaint();
        }

        let hovered = response
            .hover_pos()
            .map(|pointer| self.session.screen_to_world(pointer - rect.min.to_vec2()))
            .and_then(|world| self.session.graph().node_at(world));
        let cursor = match self.session.mode() {
            Mode::Panning { .. } | Mode::DraggingNode(_) => Some(CursorIcon::Grabbing),
            Mode::CreatingEdge(_) => Some(CursorIcon::Crosshair),
            _ if hovered.is_some() => Some(CursorIcon::PointingHand),
            _ => None,
        };
        if let Some(cursor) = cursor
            && response.contains_pointer()
        {
            ui.output_mut(|output| output.cursor_icon = cursor);
        }

        let camera = *self.session.camera();
        draw_background(&painter, rect, camera.offset, camera.zoom);
        self.paint_edges(&painter, rect);
        self.paint_nodes(&painter, rect, hovered);

        if self.session.graph().is_empty() {
            painter.text(
                rect.center() + vec2(0.0, 60.0),
                Align2::CENTER_CENTER,
                "Right-click to add a state",
                FontId::proportional(15.0),
                blend_color(NODE_TEXT, NODE_FILL, 0.6),
            );
        }

        self.draw_rename_overlay(ui, rect, &measure);
    }

    fn to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        self.session.camera().world_to_screen(world) + rect.min.to_vec2()
    }

    fn paint_edges(&self, painter: &Painter, rect: Rect) {
        let graph = self.session.graph();
        let zoom = self.session.camera().zoom;
        let arrow_scale = zoom.sqrt().clamp(0.5, 2.0);

        for edge in graph.edges() {
            let (Some(from), Some(to)) = (graph.node(edge.from), graph.node(edge.to)) else {
                continue;
            };

            let start = self.to_screen(rect, from.position);
            let end = self.to_screen(rect, to.position);
            if !edge_visible(rect, start, end, ARROW_LENGTH) {
                continue;
            }
            let Some((start, end)) =
                trimmed_segment(start, from.radius * zoom, end, to.radius * zoom)
            else {
                continue;
            };

            let selected = self.session.selection() == Selection::Edge(edge.id);
            let (width, line_color, arrow_color) = if selected {
                (3.0, SELECTED_COLOR, SELECTED_COLOR)
            } else {
                ((2.0 * zoom).clamp(1.0, 3.0), EDGE_COLOR, ARROW_COLOR)
            };

            painter.line_segment([start, end], Stroke::new(width, line_color));
            draw_arrowhead(painter, end, end - start, arrow_scale, arrow_color);
            if edge.kind == EdgeKind::Bidirectional {
                draw_arrowhead(painter, start, start - end, arrow_scale, arrow_color);
            }
        }

        if let Some((source, pointer)) = self.session.edge_guide() {
            let start = self.to_screen(rect, source);
            let end = self.to_screen(rect, pointer);
            draw_dashed_line(painter, start, end, Stroke::new(2.0, ARROW_COLOR));
        }
    }

    fn paint_nodes(&self, painter: &Painter, rect: Rect, hovered: Option<NodeId>) {
        let zoom = self.session.camera().zoom;
        let renaming = self.session.renaming();
        let font_size = LABEL_FONT_SIZE * zoom;

        for node in self.session.graph().nodes() {
            let center = self.to_screen(rect, node.position);
            let radius = node.radius * zoom;
            if !circle_visible(rect, center, radius) {
                continue;
            }

            let selected = self.session.selection() == Selection::Node(node.id);
            let mut border = if selected { SELECTED_COLOR } else { NODE_BORDER };
            if hovered == Some(node.id) {
                border = blend_color(border, NODE_TEXT, 0.35);
            }
            let border_width = if selected { 3.0 } else { 2.0 };

            painter.circle_filled(center, radius, NODE_FILL);
            painter.circle_stroke(center, radius, Stroke::new(border_width, border));

            if renaming != Some(node.id) && font_size >= 4.0 {
                painter.text(
                    center,
                    Align2::CENTER_CENTER,
                    &node.name,
                    FontId::proportional(font_size),
                    NODE_TEXT,
                );
            }
        }
    }

    fn draw_canvas_menu(&mut self, ui: &mut Ui, measure: &dyn TextMeasure) {
        let node = self
            .context_node
            .filter(|node| self.session.graph().node(*node).is_some());

        let Some(node) = node else {
            if ui.button("New node here").clicked() {
                self.session.spawn_node(self.context_world, measure);
                ui.close();
            }
            return;
        };

        if ui.button("Add edge").clicked() {
            self.session.start_edge_creation(node, measure);
            ui.close();
        }
        if ui.button("Rename").clicked() {
            self.session.start_renaming(node, measure);
            ui.close();
        }
        ui.separator();
        if ui.button("Delete").clicked() {
            self.session.delete_node(node);
            ui.close();
        }
    }

    fn draw_rename_overlay(&mut self, ui: &Ui, rect: Rect, measure: &dyn TextMeasure) {
        let Some(node) = self.session.renaming() else {
            self.focused_rename = None;
            return;
        };
        let Some((position, radius)) = self
            .session
            .graph()
            .node(node)
            .map(|found| (found.position, found.radius))
        else {
            return;
        };

        let zoom = self.session.camera().zoom;
        let center = self.to_screen(rect, position);
        let width = (radius * 2.0 * zoom).max(120.0);
        let height = LABEL_FONT_SIZE * zoom.max(1.0) + 8.0;
        let first_frame = self.focused_rename != Some(node);

        let mut lost_focus = false;
        egui::Area::new(ui.id().with(("rename", node)))
            .order(egui::Order::Foreground)
            .fixed_pos(center - vec2(width, height) * 0.5)
            .show(ui.ctx(), |ui| {
                let Some(draft) = self.session.rename_draft_mut() else {
                    return;
                };
                let response = ui.add(
                    TextEdit::singleline(draft)
                        .desired_width(width)
                        .horizontal_align(Align::Center)
                        .font(FontId::proportional(LABEL_FONT_SIZE * zoom.max(1.0))),
                );
                if first_frame {
                    response.request_focus();
                }
                lost_focus = response.lost_focus();
            });
        self.focused_rename = Some(node);

        if lost_focus {
            let key = if ui.input(|input| input.key_pressed(Key::Escape)) {
                Key::Escape
            } else {
                Key::Enter
            };
            self.session.handle(InputEvent::Key(key), measure);
        }
    }
}
