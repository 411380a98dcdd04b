use eframe::egui::{self, RichText, Ui};

use crate::graph::{EdgeId, EdgeKind, NodeId};

use super::super::graph::PainterMeasure;
use super::super::{Selection, ViewModel};

enum DetailsAction {
    Select(Selection),
    Rename(NodeId),
    ConnectFrom(NodeId),
    DeleteNode(NodeId),
    ToggleEdge(EdgeId),
    DeleteEdge(EdgeId),
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection");
        ui.add_space(6.0);

        let action = match self.session.selection() {
            Selection::None => {
                ui.label("Click a state or transition to inspect it.");
                None
            }
            Selection::Node(node) => self.draw_node_details(ui, node),
            Selection::Edge(edge) => self.draw_edge_details(ui, edge),
        };

        ui.separator();
        ui.collapsing("Mouse and keys", |ui| {
            ui.label("Drag a state to move it; drag empty space to pan.");
            ui.label("Shift-drag from a state to another to connect them.");
            ui.label("Keep Shift held on release to chain more transitions.");
            ui.label("Click a selected transition to flip its direction.");
            ui.label("Double-click a state to rename it.");
            ui.label("Scroll to zoom around the cursor.");
            ui.label("Delete or Backspace removes the selection; Escape cancels.");
        });

        if let Some(action) = action {
            self.apply_details_action(ui, action);
        }
    }

    fn draw_node_details(&self, ui: &mut Ui, node: NodeId) -> Option<DetailsAction> {
        let graph = self.session.graph();
        let Some(found) = graph.node(node) else {
            ui.label("Selected state no longer exists.");
            return None;
        };

        ui.label(RichText::new(&found.name).strong());
        ui.label(format!(
            "Position: ({:.0}, {:.0})",
            found.position.x, found.position.y
        ));
        ui.label(format!("Transitions: {}", graph.degree(node)));

        let mut action = None;
        ui.horizontal(|ui| {
            if ui.button("Rename").clicked() {
                action = Some(DetailsAction::Rename(node));
            }
            if ui.button("Connect from here").clicked() {
                action = Some(DetailsAction::ConnectFrom(node));
            }
            if ui.button("Delete").clicked() {
                action = Some(DetailsAction::DeleteNode(node));
            }
        });

        ui.separator();
        ui.label(RichText::new("Connected states").strong());
        let neighbours = graph
            .edges()
            .iter()
            .filter(|edge| edge.touches(node))
            .filter_map(|edge| {
                let other = if edge.from == node { edge.to } else { edge.from };
                let arrow = match (edge.kind, edge.from == node) {
                    (EdgeKind::Bidirectional, _) => "<->",
                    (EdgeKind::Directed, true) => "->",
                    (EdgeKind::Directed, false) => "<-",
                };
                graph.node(other).map(|other| (edge.id, arrow, other.name.as_str()))
            })
            .collect::<Vec<_>>();

        if neighbours.is_empty() {
            ui.label("None yet.");
        }
        egui::ScrollArea::vertical()
            .id_salt("neighbours_scroll")
            .max_height(260.0)
            .show(ui, |ui| {
                for (edge, arrow, name) in neighbours {
                    if ui.link(format!("{arrow} {name}")).clicked() {
                        action = Some(DetailsAction::Select(Selection::Edge(edge)));
                    }
                }
            });

        action
    }

    fn draw_edge_details(&self, ui: &mut Ui, edge: EdgeId) -> Option<DetailsAction> {
        let graph = self.session.graph();
        let Some(found) = graph.edge(edge) else {
            ui.label("Selected transition no longer exists.");
            return None;
        };
        let (Some(from), Some(to)) = (graph.node(found.from), graph.node(found.to)) else {
            return None;
        };

        let arrow = match found.kind {
            EdgeKind::Directed => "->",
            EdgeKind::Bidirectional => "<->",
        };
        ui.label(RichText::new(format!("{} {arrow} {}", from.name, to.name)).strong());
        ui.label(format!("Kind: {}", found.kind.label()));

        let mut action = None;
        ui.horizontal(|ui| {
            if ui.link(&from.name).clicked() {
                action = Some(DetailsAction::Select(Selection::Node(from.id)));
            }
            ui.label(arrow);
            if ui.link(&to.name).clicked() {
                action = Some(DetailsAction::Select(Selection::Node(to.id)));
            }
        });

        ui.horizontal(|ui| {
            let toggle_text = match found.kind {
                EdgeKind::Directed => "Make bidirectional",
                EdgeKind::Bidirectional => "Make one-way",
            };
            if ui.button(toggle_text).clicked() {
                action = Some(DetailsAction::ToggleEdge(edge));
            }
            if ui.button("Delete").clicked() {
                action = Some(DetailsAction::DeleteEdge(edge));
            }
        });

        action
    }

    fn apply_details_action(&mut self, ui: &Ui, action: DetailsAction) {
        match action {
            DetailsAction::Select(selection) => self.session.select(selection),
            DetailsAction::Rename(node) => {
                let measure = PainterMeasure::from_context(ui.ctx());
                self.session.start_renaming(node, &measure);
            }
            DetailsAction::ConnectFrom(node) => {
                let measure = PainterMeasure::from_context(ui.ctx());
                self.session.start_edge_creation(node, &measure);
            }
            DetailsAction::DeleteNode(node) => self.session.delete_node(node),
            DetailsAction::ToggleEdge(edge) => self.session.toggle_edge_kind(edge),
            DetailsAction::DeleteEdge(edge) => self.session.delete_edge(edge),
        }
    }
}
