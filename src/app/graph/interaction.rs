use eframe::egui::{Key, Modifiers, PointerButton, Pos2};

use crate::graph::TextMeasure;

use super::super::{Gesture, InputEvent, Mode, Selection, Session};

fn edge_modifier(modifiers: Modifiers) -> bool {
    modifiers.shift
}

impl Session {
    pub fn handle(&mut self, event: InputEvent, measure: &dyn TextMeasure) {
        match event {
            InputEvent::PointerDown {
                button,
                pos,
                modifiers,
            } => self.pointer_down(button, pos, modifiers, measure),
            InputEvent::PointerMove { pos } => self.pointer_move(pos),
            InputEvent::PointerUp {
                button: _,
                pos,
                modifiers,
            } => self.pointer_up(pos, modifiers),
            InputEvent::Scroll { pos, steps } => {
                self.camera.zoom_at(pos, steps);
            }
            InputEvent::DoubleClick { pos } => self.double_click(pos),
            InputEvent::Key(key) => self.key_pressed(key, measure),
        }
    }

    fn pointer_down(
        &mut self,
        button: PointerButton,
        pos: Pos2,
        modifiers: Modifiers,
        measure: &dyn TextMeasure,
    ) {
        self.finish_renaming(measure);

        let world = self.camera.screen_to_world(pos);
        self.pointer_world = world;
        self.gesture = Gesture::default();

        let node = self.graph.node_at(world);
        let edge = if node.is_none() {
            self.graph.edge_at(world)
        } else {
            None
        };
        let drafting = match self.mode {
            Mode::CreatingEdge(source) => Some(source),
            _ => None,
        };

        let primary = button == PointerButton::Primary;
        let blank_primary =
            primary && node.is_none() && edge.is_none() && !edge_modifier(modifiers);
        if button == PointerButton::Middle || blank_primary {
            self.mode = Mode::Panning {
                anchor: pos,
                resume: drafting,
            };
            return;
        }
        if !primary {
            return;
        }

        match (node, edge, drafting) {
            (Some(node), _, _) if edge_modifier(modifiers) => {
                self.mode = Mode::CreatingEdge(node);
                self.selection = Selection::None;
                self.gesture.created_edge = true;
            }
            (Some(node), _, Some(source)) => {
                if node != source {
                    self.graph.connect(source, node);
                    self.mode = Mode::Idle;
                    self.gesture.created_edge = true;
                }
            }
            (Some(node), _, None) => {
                self.mode = Mode::DraggingNode(node);
                self.selection = Selection::Node(node);
                self.simulation.reheat(self.simulation.config.drag_reheat);
            }
            (None, Some(edge), _) => {
                if self.selection == Selection::Edge(edge) {
                    self.gesture.toggle_candidate = Some(edge);
                }
                self.selection = Selection::Edge(edge);
            }
            (None, None, Some(_)) => self.mode = Mode::Idle,
            (None, None, None) => self.selection = Selection::None,
        }
    }

    fn pointer_move(&mut self, pos: Pos2) {
        match &mut self.mode {
            Mode::Panning { anchor, .. } => {
                let delta = pos - *anchor;
                *anchor = pos;
                self.camera.pan_by(delta);
            }
            Mode::DraggingNode(held) => {
                let held = *held;
                let world = self.camera.screen_to_world(pos);
                if let Some(node) = self.graph.node_mut(held) {
                    node.position = world;
                    node.velocity = eframe::egui::Vec2::ZERO;
                    self.gesture.moved_node = true;
                }
            }
            _ => {}
        }

        self.pointer_world = self.camera.screen_to_world(pos);
    }

    fn pointer_up(&mut self, pos: Pos2, modifiers: Modifiers) {
        let world = self.camera.screen_to_world(pos);
        self.pointer_world = world;

        match self.mode {
            Mode::Panning { resume, .. } => {
                self.mode = resume.map_or(Mode::Idle, Mode::CreatingEdge);
                self.gesture = Gesture::default();
                return;
            }
            Mode::CreatingEdge(source) => {
                if let Some(target) = self.graph.node_at(world)
                    && target != source
                {
                    self.graph.connect(source, target);
                    self.gesture.created_edge = true;
                    if !edge_modifier(modifiers) {
                        self.mode = Mode::Idle;
                    }
                }
            }
            Mode::DraggingNode(_) => self.mode = Mode::Idle,
            _ => {}
        }

        let gesture = std::mem::take(&mut self.gesture);
        if let Some(edge) = gesture.toggle_candidate
            && !gesture.moved_node
            && !gesture.created_edge
            && !matches!(self.mode, Mode::CreatingEdge(_))
            && self.selection == Selection::Edge(edge)
            && self.graph.edge_at(world) == Some(edge)
        {
            self.graph.toggle_edge_kind(edge);
        }
    }

    fn double_click(&mut self, pos: Pos2) {
        if self.renaming().is_some() {
            return;
        }

        let world = self.camera.screen_to_world(pos);
        if let Some(node) = self.graph.node_at(world).and_then(|id| self.graph.node(id)) {
            self.mode = Mode::Renaming {
                node: node.id,
                draft: node.name.clone(),
            };
        }
    }

    fn key_pressed(&mut self, key: Key, measure: &dyn TextMeasure) {
        if self.renaming().is_some() {
            match key {
                Key::Enter => self.finish_renaming(measure),
                Key::Escape => self.cancel_renaming(),
                _ => {}
            }
            return;
        }

        match key {
            Key::Escape => {
                if matches!(self.mode, Mode::CreatingEdge(_)) {
                    self.mode = Mode::Idle;
                } else {
                    self.selection = Selection::None;
                }
            }
            Key::Delete | Key::Backspace => match self.selection {
                Selection::Node(node) => self.delete_node(node),
                Selection::Edge(edge) => self.delete_edge(edge),
                Selection::None => {}
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Vec2, pos2, vec2};

    use super::*;
    use crate::app::LayoutConfig;
    use crate::graph::{EdgeKind, FixedWidthMeasure, NodeId};

    const MEASURE: FixedWidthMeasure = FixedWidthMeasure { char_width: 8.5 };

    fn session_with(nodes: &[(&str, Vec2)]) -> (Session, Vec<NodeId>) {
        let mut session = Session::new(LayoutConfig::default());
        let ids = nodes
            .iter()
            .map(|(name, position)| session.graph.add_node(*name, *position, &MEASURE))
            .collect();
        (session, ids)
    }

    fn press(session: &mut Session, button: PointerButton, x: f32, y: f32, modifiers: Modifiers) {
        session.handle(
            InputEvent::PointerDown {
                button,
                pos: pos2(x, y),
                modifiers,
            },
            &MEASURE,
        );
    }

    fn release(session: &mut Session, x: f32, y: f32, modifiers: Modifiers) {
        session.handle(
            InputEvent::PointerUp {
                button: PointerButton::Primary,
                pos: pos2(x, y),
                modifiers,
            },
            &MEASURE,
        );
    }

    fn click(session: &mut Session, x: f32, y: f32) {
        press(session, PointerButton::Primary, x, y, Modifiers::NONE);
        release(session, x, y, Modifiers::NONE);
    }

    fn move_to(session: &mut Session, x: f32, y: f32) {
        session.handle(InputEvent::PointerMove { pos: pos2(x, y) }, &MEASURE);
    }

    fn key(session: &mut Session, key: Key) {
        session.handle(InputEvent::Key(key), &MEASURE);
    }

    fn connected(session: &Session, a: NodeId, b: NodeId) -> bool {
        session.graph().edge_between(a, b).is_some()
    }

    #[test]
    fn blank_press_pans_by_screen_delta() {
        let (mut session, _) = session_with(&[("A", vec2(0.0, 0.0))]);
        press(&mut session, PointerButton::Primary, 300.0, 300.0, Modifiers::NONE);
        assert!(matches!(session.mode(), Mode::Panning { .. }));

        move_to(&mut session, 310.0, 295.0);
        move_to(&mut session, 330.0, 305.0);
        assert_eq!(session.camera().offset, vec2(30.0, 5.0));

        release(&mut session, 330.0, 305.0, Modifiers::NONE);
        assert_eq!(session.mode(), &Mode::Idle);
    }

    #[test]
    fn middle_button_pans_even_over_a_node() {
        let (mut session, _) = session_with(&[("A", vec2(0.0, 0.0))]);
        press(&mut session, PointerButton::Middle, 0.0, 0.0, Modifiers::NONE);
        assert!(matches!(session.mode(), Mode::Panning { .. }));
        assert_eq!(session.selection(), Selection::None);
    }

    #[test]
    fn dragging_moves_node_and_selects_it() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0))]);
        press(&mut session, PointerButton::Primary, 5.0, 5.0, Modifiers::NONE);
        assert_eq!(session.mode(), &Mode::DraggingNode(ids[0]));
        assert_eq!(session.selection(), Selection::Node(ids[0]));
        assert!(session.simulation().alpha() >= LayoutConfig::default().drag_reheat);

        move_to(&mut session, 120.0, -40.0);
        let node = session.graph().node(ids[0]).expect("node");
        assert_eq!(node.position, vec2(120.0, -40.0));
        assert_eq!(node.velocity, Vec2::ZERO);

        release(&mut session, 120.0, -40.0, Modifiers::NONE);
        assert_eq!(session.mode(), &Mode::Idle);
        assert_eq!(session.selection(), Selection::Node(ids[0]));
    }

    #[test]
    fn dragged_node_is_held_while_layout_runs() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0)), ("B", vec2(40.0, 0.0))]);
        session.graph.connect(ids[0], ids[1]);
        session.start_auto_layout();

        press(&mut session, PointerButton::Primary, 0.0, 0.0, Modifiers::NONE);
        move_to(&mut session, -10.0, 0.0);
        for _ in 0..10 {
            session.tick();
        }
        assert_eq!(session.graph().node(ids[0]).map(|node| node.position), Some(vec2(-10.0, 0.0)));
    }

    #[test]
    fn shift_drag_between_nodes_creates_directed_edge() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0)), ("B", vec2(200.0, 0.0))]);
        click(&mut session, 0.0, 0.0);
        assert_eq!(session.selection(), Selection::Node(ids[0]));

        press(&mut session, PointerButton::Primary, 0.0, 0.0, Modifiers::SHIFT);
        assert_eq!(session.mode(), &Mode::CreatingEdge(ids[0]));
        assert_eq!(session.selection(), Selection::None);

        move_to(&mut session, 120.0, 10.0);
        assert_eq!(session.edge_guide(), Some((vec2(0.0, 0.0), vec2(120.0, 10.0))));

        release(&mut session, 200.0, 0.0, Modifiers::NONE);
        assert_eq!(session.mode(), &Mode::Idle);
        let edge = session.graph().edges().first().expect("edge created");
        assert_eq!((edge.from, edge.to, edge.kind), (ids[0], ids[1], EdgeKind::Directed));
    }

    #[test]
    fn held_modifier_keeps_edge_creation_for_chaining() {
        let (mut session, ids) = session_with(&[
            ("A", vec2(0.0, 0.0)),
            ("B", vec2(200.0, 0.0)),
            ("C", vec2(0.0, 200.0)),
        ]);
        press(&mut session, PointerButton::Primary, 0.0, 0.0, Modifiers::SHIFT);
        release(&mut session, 200.0, 0.0, Modifiers::SHIFT);
        assert_eq!(session.mode(), &Mode::CreatingEdge(ids[0]));

        click(&mut session, 0.0, 200.0);
        assert!(connected(&session, ids[0], ids[1]));
        assert!(connected(&session, ids[0], ids[2]));
        assert_eq!(session.mode(), &Mode::Idle);
    }

    #[test]
    fn click_to_click_edge_creation_ignores_source() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0)), ("B", vec2(200.0, 0.0))]);
        session.start_edge_creation(ids[0], &MEASURE);

        click(&mut session, 0.0, 0.0);
        assert_eq!(session.mode(), &Mode::CreatingEdge(ids[0]));
        assert_eq!(session.graph().edge_count(), 0);

        click(&mut session, 200.0, 0.0);
        assert_eq!(session.mode(), &Mode::Idle);
        assert!(connected(&session, ids[0], ids[1]));
    }

    #[test]
    fn panning_keeps_edge_draft_alive() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0)), ("B", vec2(200.0, 0.0))]);
        session.start_edge_creation(ids[0], &MEASURE);

        press(&mut session, PointerButton::Primary, 100.0, 150.0, Modifiers::NONE);
        move_to(&mut session, 110.0, 150.0);
        release(&mut session, 110.0, 150.0, Modifiers::NONE);
        assert_eq!(session.mode(), &Mode::CreatingEdge(ids[0]));

        // world B is now at screen x = 210
        click(&mut session, 210.0, 0.0);
        assert!(connected(&session, ids[0], ids[1]));
    }

    #[test]
    fn escape_and_blank_shift_click_cancel_edge_creation() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0))]);
        session.start_edge_creation(ids[0], &MEASURE);
        key(&mut session, Key::Escape);
        assert_eq!(session.mode(), &Mode::Idle);

        session.start_edge_creation(ids[0], &MEASURE);
        press(&mut session, PointerButton::Primary, 400.0, 400.0, Modifiers::SHIFT);
        assert_eq!(session.mode(), &Mode::Idle);
    }

    #[test]
    fn clicking_selected_edge_toggles_kind() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0)), ("B", vec2(200.0, 0.0))]);
        let edge = session.graph.connect(ids[0], ids[1]).expect("edge");

        click(&mut session, 100.0, 4.0);
        assert_eq!(session.selection(), Selection::Edge(edge));
        assert_eq!(session.graph().edge(edge).map(|edge| edge.kind), Some(EdgeKind::Directed));

        click(&mut session, 100.0, -4.0);
        assert_eq!(
            session.graph().edge(edge).map(|edge| edge.kind),
            Some(EdgeKind::Bidirectional)
        );

        press(&mut session, PointerButton::Primary, 100.0, 0.0, Modifiers::NONE);
        release(&mut session, 100.0, 60.0, Modifiers::NONE);
        assert_eq!(
            session.graph().edge(edge).map(|edge| edge.kind),
            Some(EdgeKind::Bidirectional)
        );
    }

    #[test]
    fn plain_blank_press_pans_without_touching_selection() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0))]);
        click(&mut session, 0.0, 0.0);
        assert_eq!(session.selection(), Selection::Node(ids[0]));

        press(&mut session, PointerButton::Primary, 300.0, 300.0, Modifiers::NONE);
        assert!(matches!(session.mode(), Mode::Panning { resume: None, .. }));
        release(&mut session, 300.0, 300.0, Modifiers::NONE);
        assert_eq!(session.selection(), Selection::Node(ids[0]));
    }

    #[test]
    fn shift_blank_click_clears_selection() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0))]);
        click(&mut session, 0.0, 0.0);
        assert_eq!(session.selection(), Selection::Node(ids[0]));

        press(&mut session, PointerButton::Primary, 300.0, 300.0, Modifiers::SHIFT);
        assert_eq!(session.mode(), &Mode::Idle);
        assert_eq!(session.selection(), Selection::None);
        release(&mut session, 300.0, 300.0, Modifiers::SHIFT);
        assert_eq!(session.selection(), Selection::None);
    }

    #[test]
    fn delete_key_removes_selection_with_cascade() {
        let (mut session, ids) = session_with(&[
            ("A", vec2(0.0, 0.0)),
            ("B", vec2(200.0, 0.0)),
            ("C", vec2(0.0, 200.0)),
        ]);
        session.graph.connect(ids[0], ids[1]);
        let survivor = session.graph.connect(ids[1], ids[2]).expect("edge");
        session.graph.connect(ids[2], ids[0]);

        click(&mut session, 0.0, 0.0);
        key(&mut session, Key::Delete);
        assert_eq!(session.graph().node_count(), 2);
        assert_eq!(session.graph().edge_count(), 1);
        assert_eq!(session.selection(), Selection::None);

        click(&mut session, 100.0, 100.0);
        assert_eq!(session.selection(), Selection::Edge(survivor));
        key(&mut session, Key::Backspace);
        assert_eq!(session.graph().edge_count(), 0);
        assert_eq!(session.selection(), Selection::None);

        key(&mut session, Key::Delete);
        assert_eq!(session.graph().node_count(), 2);
    }

    #[test]
    fn escape_clears_selection_when_not_drafting() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0))]);
        click(&mut session, 0.0, 0.0);
        assert_eq!(session.selection(), Selection::Node(ids[0]));
        key(&mut session, Key::Escape);
        assert_eq!(session.selection(), Selection::None);
    }

    #[test]
    fn rename_commits_on_enter_and_discards_on_escape() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0))]);
        session.handle(InputEvent::DoubleClick { pos: pos2(0.0, 0.0) }, &MEASURE);
        assert_eq!(session.renaming(), Some(ids[0]));

        if let Some(draft) = session.rename_draft_mut() {
            *draft = "Waiting".to_owned();
        }
        key(&mut session, Key::Escape);
        assert_eq!(session.mode(), &Mode::Idle);
        assert_eq!(session.graph().node(ids[0]).map(|node| node.name.as_str()), Some("A"));

        session.handle(InputEvent::DoubleClick { pos: pos2(0.0, 0.0) }, &MEASURE);
        if let Some(draft) = session.rename_draft_mut() {
            *draft = "  Waiting for a very long time ".to_owned();
        }
        key(&mut session, Key::Delete);
        key(&mut session, Key::Enter);
        let node = session.graph().node(ids[0]).expect("node survives");
        assert_eq!(node.name, "Waiting for a very long time");
        assert!(node.radius > crate::graph::BASE_RADIUS);
    }

    #[test]
    fn pointer_down_commits_pending_rename_first() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0)), ("B", vec2(200.0, 0.0))]);
        session.start_renaming(ids[0], &MEASURE);
        if let Some(draft) = session.rename_draft_mut() {
            *draft = "Start".to_owned();
        }

        press(&mut session, PointerButton::Primary, 200.0, 0.0, Modifiers::NONE);
        assert_eq!(session.graph().node(ids[0]).map(|node| node.name.as_str()), Some("Start"));
        assert_eq!(session.mode(), &Mode::DraggingNode(ids[1]));
    }

    #[test]
    fn double_click_is_ignored_while_renaming_another_node() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0)), ("B", vec2(200.0, 0.0))]);
        session.start_renaming(ids[0], &MEASURE);
        session.handle(InputEvent::DoubleClick { pos: pos2(200.0, 0.0) }, &MEASURE);
        assert_eq!(session.renaming(), Some(ids[0]));
    }

    #[test]
    fn spawned_node_uses_default_name_and_enters_rename() {
        let (mut session, _) = session_with(&[("A", vec2(0.0, 0.0))]);
        let spawned = session.spawn_node(vec2(300.0, 0.0), &MEASURE);
        assert_eq!(session.renaming(), Some(spawned));
        key(&mut session, Key::Enter);
        assert_eq!(session.graph().node(spawned).map(|node| node.name.as_str()), Some("State2"));
    }

    #[test]
    fn scroll_zooms_about_cursor() {
        let (mut session, _) = session_with(&[]);
        let cursor = pos2(250.0, 80.0);
        let before = session.screen_to_world(cursor);
        session.handle(InputEvent::Scroll { pos: cursor, steps: 1.0 }, &MEASURE);
        assert!(session.camera().zoom > 1.0);
        assert!((session.screen_to_world(cursor) - before).length() < 1e-3);
    }

    #[test]
    fn empty_canvas_keeps_camera_between_frames() {
        let (mut session, _) = session_with(&[]);
        session.set_viewport(vec2(800.0, 600.0));
        assert_eq!(session.camera().offset, vec2(400.0, 300.0));

        session.handle(InputEvent::Scroll { pos: pos2(100.0, 100.0), steps: 3.0 }, &MEASURE);
        let zoomed = *session.camera();
        assert!(zoomed.zoom > 1.0);
        session.set_viewport(vec2(800.0, 600.0));
        assert_eq!(*session.camera(), zoomed);

        session.set_viewport(vec2(1000.0, 600.0));
        assert_eq!(session.camera().offset, vec2(500.0, 300.0));
        assert_eq!(session.camera().zoom, zoomed.zoom);
    }

    #[test]
    fn deleting_dragged_node_returns_to_idle() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0))]);
        press(&mut session, PointerButton::Primary, 0.0, 0.0, Modifiers::NONE);
        key(&mut session, Key::Delete);
        assert_eq!(session.mode(), &Mode::Idle);
        assert!(session.graph().node(ids[0]).is_none());
        move_to(&mut session, 50.0, 50.0);
        release(&mut session, 50.0, 50.0, Modifiers::NONE);
        assert_eq!(session.mode(), &Mode::Idle);
    }

    #[test]
    fn stray_events_in_idle_are_noops() {
        let (mut session, ids) = session_with(&[("A", vec2(0.0, 0.0))]);
        release(&mut session, 0.0, 0.0, Modifiers::NONE);
        move_to(&mut session, 10.0, 10.0);
        key(&mut session, Key::Enter);
        key(&mut session, Key::Delete);
        press(&mut session, PointerButton::Secondary, 0.0, 0.0, Modifiers::NONE);
        assert_eq!(session.mode(), &Mode::Idle);
        assert_eq!(session.selection(), Selection::None);
        assert_eq!(session.graph().node(ids[0]).map(|node| node.position), Some(vec2(0.0, 0.0)));
    }
}
