use eframe::egui::{self, Align, Color32, Context, Layout, RichText};
use serde::Serialize;
use tracing::{info, warn};

use crate::graph::parse_document;
use crate::util::{DEFAULT_TITLE, export_file_name, title_from_file_name};

use super::super::graph::PainterMeasure;
use super::super::io::{IoOutcome, IoRequest};
use super::super::{LayoutConfig, Session, Status, ViewModel};

const ADJACENCY_FALLBACK_STEM: &str = "graph_adj_list";
const LAYOUT_FALLBACK_STEM: &str = "graph_layout";

fn to_pretty_json(document: &impl Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(document).map_err(|error| format!("Export failed: {error}"))
}

impl ViewModel {
    pub(in crate::app) fn new(layout: LayoutConfig, auto_layout: bool) -> Self {
        let mut session = Session::new(layout);
        session.set_auto_layout_on_import(auto_layout);

        Self {
            session,
            title: DEFAULT_TITLE.to_owned(),
            status: None,
            show_layout_controls: false,
            show_export_preview: false,
            export_preview: String::new(),
            confirm_clear: false,
            context_world: egui::Vec2::ZERO,
            context_node: None,
            focused_rename: None,
            io_request: None,
        }
    }

    pub(in crate::app) fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(Status {
            text: text.into(),
            is_error,
        });
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, is_busy: bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("state-sketch");
                    ui.separator();
                    ui.add(
                        egui::TextEdit::singleline(&mut self.title)
                            .hint_text(DEFAULT_TITLE)
                            .desired_width(160.0),
                    )
                    .on_hover_text("Project title, used to name exported files.");
                    ui.separator();

                    if ui.button("New node").clicked() {
                        let measure = PainterMeasure::from_context(ctx);
                        let center = self.session.view_center_world();
                        self.session.spawn_node(center, &measure);
                    }
                    if ui
                        .button("Auto layout")
                        .on_hover_text("Restart the force-directed layout at full heat.")
                        .clicked()
                    {
                        self.session.start_auto_layout();
                    }
                    ui.separator();

                    if ui.add_enabled(!is_busy, egui::Button::new("Import")).clicked() {
                        self.io_request = Some(IoRequest::Open);
                    }
                    if ui.button("Preview").clicked() {
                        self.open_export_preview();
                    }
                    if ui
                        .add_enabled(!is_busy, egui::Button::new("Export adjacency"))
                        .clicked()
                    {
                        self.request_adjacency_export();
                    }
                    if ui
                        .add_enabled(!is_busy, egui::Button::new("Export layout"))
                        .clicked()
                    {
                        self.request_layout_export();
                    }
                    ui.separator();
                    if ui.button("Clear").clicked() {
                        self.confirm_clear = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.toggle_value(&mut self.show_layout_controls, "Layout");
                        let graph = self.session.graph();
                        ui.label(format!(
                            "nodes: {}  edges: {}",
                            graph.node_count(),
                            graph.edge_count()
                        ));
                        if is_busy {
                            ui.spinner();
                        }
                    });
                });
            });

        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| match &self.status {
                    Some(status) if status.is_error => {
                        ui.label(RichText::new(&status.text).color(Color32::from_rgb(255, 99, 99)));
                    }
                    Some(status) => {
                        ui.label(&status.text);
                    }
                    None => {
                        ui.weak("Shift-drag between states to connect them. Right-click for more.");
                    }
                });
            });

        if self.show_layout_controls {
            egui::SidePanel::left("layout_controls")
                .resizable(true)
                .default_width(280.0)
                .show(ctx, |ui| self.draw_controls(ui));
        }

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        self.draw_export_preview(ctx, is_busy);
        self.draw_clear_confirmation(ctx);
    }

    pub(in crate::app) fn apply_io_outcome(&mut self, ctx: &Context, outcome: IoOutcome) {
        match outcome {
            IoOutcome::Opened { file_name, bytes } => match parse_document(&bytes) {
                Ok(document) => {
                    let measure = PainterMeasure::from_context(ctx);
                    self.session.load_document(&document, &measure);
                    self.title = title_from_file_name(&file_name);

                    let graph = self.session.graph();
                    info!(
                        file = %file_name,
                        format = document.label(),
                        nodes = graph.node_count(),
                        edges = graph.edge_count(),
                        "imported graph"
                    );
                    let text = format!(
                        "Imported {} ({}): {} nodes, {} edges",
                        file_name,
                        document.label(),
                        graph.node_count(),
                        graph.edge_count()
                    );
                    self.set_status(text, false);
                }
                Err(error) => {
                    warn!(file = %file_name, %error, "import rejected");
                    self.set_status(format!("Could not import {file_name}: {error}"), true);
                }
            },
            IoOutcome::Saved(path) => {
                info!(path = %path.display(), "exported graph");
                self.set_status(format!("Saved {}", path.display()), false);
            }
            IoOutcome::Cancelled => {}
        }
    }

    pub(in crate::app) fn next_io_request(&mut self, is_busy: bool) -> Option<IoRequest> {
        if is_busy {
            return None;
        }
        self.io_request.take()
    }

    fn request_export(&mut self, contents: Result<String, String>, fallback_stem: &str) {
        match contents {
            Ok(contents) => {
                self.io_request = Some(IoRequest::Save {
                    contents,
                    suggested_name: export_file_name(&self.title, fallback_stem),
                });
            }
            Err(error) => self.set_status(error, true),
        }
    }

    fn request_adjacency_export(&mut self) {
        let contents = to_pretty_json(&self.session.graph().to_adjacency_document());
        self.request_export(contents, ADJACENCY_FALLBACK_STEM);
    }

    fn request_layout_export(&mut self) {
        let contents = to_pretty_json(&self.session.graph().to_layout_document());
        self.request_export(contents, LAYOUT_FALLBACK_STEM);
    }

    fn open_export_preview(&mut self) {
        match to_pretty_json(&self.session.graph().to_adjacency_document()) {
            Ok(preview) => {
                self.export_preview = preview;
                self.show_export_preview = true;
            }
            Err(error) => self.set_status(error, true),
        }
    }

    fn draw_export_preview(&mut self, ctx: &Context, is_busy: bool) {
        if !self.show_export_preview {
            return;
        }

        let mut download = false;
        egui::Window::new("Adjacency list")
            .open(&mut self.show_export_preview)
            .default_size([360.0, 420.0])
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .max_height(360.0)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut self.export_preview.as_str())
                                .code_editor()
                                .desired_width(f32::INFINITY),
                        );
                    });
                ui.separator();
                download = ui
                    .add_enabled(!is_busy, egui::Button::new("Download"))
                    .clicked();
            });

        if download {
            self.request_export(Ok(self.export_preview.clone()), ADJACENCY_FALLBACK_STEM);
        }
    }

    fn draw_clear_confirmation(&mut self, ctx: &Context) {
        if !self.confirm_clear {
            return;
        }

        egui::Window::new("Clear canvas?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("This removes every state and transition.");
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        self.session.clear();
                        self.title = DEFAULT_TITLE.to_owned();
                        self.show_export_preview = false;
                        self.confirm_clear = false;
                        self.set_status("Canvas cleared", false);
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_clear = false;
                    }
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_request_waits_for_idle_worker() {
        let mut model = ViewModel::new(LayoutConfig::default(), true);
        model.open_export_preview();
        model.request_export(Ok(model.export_preview.clone()), ADJACENCY_FALLBACK_STEM);

        assert!(model.next_io_request(true).is_none());
        assert!(model.io_request.is_some());

        match model.next_io_request(false) {
            Some(IoRequest::Save { suggested_name, .. }) => {
                assert!(suggested_name.ends_with(".json"));
            }
            other => panic!("unexpected request {other:?}"),
        }
        assert!(model.next_io_request(false).is_none());
    }
}
