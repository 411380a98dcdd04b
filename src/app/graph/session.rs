use eframe::egui::{Pos2, Vec2};
use tracing::info;

use crate::graph::{EdgeId, Graph, GraphDocument, NodeId, TextMeasure};

use super::super::{Camera, Gesture, LayoutConfig, Mode, Selection, Session, Simulation};

impl Session {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            graph: Graph::new(),
            camera: Camera::default(),
            selection: Selection::None,
            mode: Mode::Idle,
            simulation: Simulation::new(config),
            pointer_world: Vec2::ZERO,
            gesture: Gesture::default(),
            viewport_center: Vec2::ZERO,
            auto_layout_on_import: true,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn layout_config_mut(&mut self) -> &mut LayoutConfig {
        &mut self.simulation.config
    }

    pub fn auto_layout_on_import(&self) -> bool {
        self.auto_layout_on_import
    }

    pub fn set_auto_layout_on_import(&mut self, enabled: bool) {
        self.auto_layout_on_import = enabled;
    }

    pub fn dragged_node(&self) -> Option<NodeId> {
        match self.mode {
            Mode::DraggingNode(node) => Some(node),
            _ => None,
        }
    }

    pub fn edge_guide(&self) -> Option<(Vec2, Vec2)> {
        let source = match self.mode {
            Mode::CreatingEdge(source)
            | Mode::Panning {
                resume: Some(source),
                ..
            } => source,
            _ => return None,
        };
        let node = self.graph.node(source)?;
        Some((node.position, self.pointer_world))
    }

    pub fn renaming(&self) -> Option<NodeId> {
        match &self.mode {
            Mode::Renaming { node, .. } => Some(*node),
            _ => None,
        }
    }

    pub fn rename_draft_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            Mode::Renaming { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        self.camera.screen_to_world(screen)
    }

    pub fn view_center_world(&self) -> Vec2 {
        self.camera.screen_to_world(self.viewport_center.to_pos2())
    }

    pub fn select(&mut self, selection: Selection) {
        let exists = match selection {
            Selection::None => true,
            Selection::Node(node) => self.graph.node(node).is_some(),
            Selection::Edge(edge) => self.graph.edge(edge).is_some(),
        };
        self.selection = if exists { selection } else { Selection::None };
    }

    pub fn set_viewport(&mut self, size: Vec2) {
        let center = size * 0.5;
        if center == self.viewport_center {
            return;
        }
        self.viewport_center = center;
        if self.graph.is_empty() {
            self.camera.offset = center;
        }
    }

    pub fn start_auto_layout(&mut self) {
        info!(nodes = self.graph.node_count(), "auto layout started");
        self.simulation.start();
    }

    pub fn stop_auto_layout(&mut self) {
        self.simulation.stop();
    }

    pub fn tick(&mut self) -> bool {
        let dragged = self.dragged_node();
        self.simulation.tick(&mut self.graph, dragged)
    }

    pub fn spawn_node(&mut self, world: Vec2, measure: &dyn TextMeasure) -> NodeId {
        self.finish_renaming(measure);
        let name = self.graph.default_node_name();
        let node = self.graph.add_node(name.clone(), world, measure);
        self.mode = Mode::Renaming { node, draft: name };
        node
    }

    pub fn start_renaming(&mut self, node: NodeId, measure: &dyn TextMeasure) {
        if self.renaming() == Some(node) {
            return;
        }
        self.finish_renaming(measure);
        if let Some(found) = self.graph.node(node) {
            self.mode = Mode::Renaming {
                node,
                draft: found.name.clone(),
            };
        }
    }

    pub fn start_edge_creation(&mut self, source: NodeId, measure: &dyn TextMeasure) {
        self.finish_renaming(measure);
        if self.graph.node(source).is_some() {
            self.mode = Mode::CreatingEdge(source);
            self.selection = Selection::None;
        }
    }

    pub(in crate::app) fn finish_renaming(&mut self, measure: &dyn TextMeasure) {
        if !matches!(self.mode, Mode::Renaming { .. }) {
            return;
        }
        if let Mode::Renaming { node, draft } = std::mem::replace(&mut self.mode, Mode::Idle) {
            self.graph.rename_node(node, &draft, measure);
        }
    }

    pub(in crate::app) fn cancel_renaming(&mut self) {
        if matches!(self.mode, Mode::Renaming { .. }) {
            self.mode = Mode::Idle;
        }
    }

    pub fn delete_node(&mut self, node: NodeId) {
        if self.graph.remove_node(node).is_none() {
            return;
        }

        match self.selection {
            Selection::Node(selected) if selected == node => self.selection = Selection::None,
            Selection::Edge(edge) if self.graph.edge(edge).is_none() => {
                self.selection = Selection::None;
            }
            _ => {}
        }

        self.mode = match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::DraggingNode(held) if held == node => Mode::Idle,
            Mode::CreatingEdge(source) if source == node => Mode::Idle,
            Mode::Renaming { node: renamed, .. } if renamed == node => Mode::Idle,
            Mode::Panning { anchor, resume } => Mode::Panning {
                anchor,
                resume: resume.filter(|source| *source != node),
            },
            other => other,
        };
    }

    pub fn delete_edge(&mut self, edge: EdgeId) {
        self.graph.remove_edge(edge);
        if self.selection == Selection::Edge(edge) {
            self.selection = Selection::None;
        }
        if self.gesture.toggle_candidate == Some(edge) {
            self.gesture.toggle_candidate = None;
        }
    }

    pub fn toggle_edge_kind(&mut self, edge: EdgeId) {
        self.graph.toggle_edge_kind(edge);
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.selection = Selection::None;
        self.mode = Mode::Idle;
        self.gesture = Gesture::default();
        self.simulation.stop();
        self.camera.center_on(self.viewport_center);
    }

    pub fn load_document(&mut self, document: &GraphDocument, measure: &dyn TextMeasure) {
        self.graph = Graph::from_document(document, measure);
        self.selection = Selection::None;
        self.mode = Mode::Idle;
        self.gesture = Gesture::default();
        self.camera.center_on(self.viewport_center);

        match document {
            GraphDocument::Adjacency(_) if self.auto_layout_on_import => self.start_auto_layout(),
            _ => self.simulation.stop(),
        }
    }
}
