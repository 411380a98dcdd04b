use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};

use eframe::egui::{Context, Key, Modifiers, PointerButton, Pos2, Vec2};
use tracing::{info, warn};

use crate::graph::{EdgeId, Graph, NodeId};

mod camera;
mod graph;
mod io;
mod physics;
mod render_utils;
mod ui;

pub use camera::Camera;
pub use physics::{LayoutConfig, Simulation};

use io::{IoOutcome, IoRequest};

pub struct StartupOptions {
    pub file: Option<PathBuf>,
    pub layout: LayoutConfig,
    pub auto_layout: bool,
}

pub struct EditorApp {
    model: ViewModel,
    io_rx: Option<Receiver<Result<IoOutcome, String>>>,
}

struct ViewModel {
    session: Session,
    title: String,
    status: Option<Status>,
    show_layout_controls: bool,
    show_export_preview: bool,
    export_preview: String,
    confirm_clear: bool,
    context_world: Vec2,
    context_node: Option<NodeId>,
    focused_rename: Option<NodeId>,
    io_request: Option<IoRequest>,
}

struct Status {
    text: String,
    is_error: bool,
}

pub struct Session {
    graph: Graph,
    camera: Camera,
    selection: Selection,
    mode: Mode,
    simulation: Simulation,
    pointer_world: Vec2,
    gesture: Gesture,
    viewport_center: Vec2,
    auto_layout_on_import: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    Idle,
    /// `resume` keeps an in-progress edge draft alive across a pan.
    Panning {
        anchor: Pos2,
        resume: Option<NodeId>,
    },
    DraggingNode(NodeId),
    CreatingEdge(NodeId),
    Renaming {
        node: NodeId,
        draft: String,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Edge(EdgeId),
}

#[derive(Clone, Copy, Debug, Default)]
struct Gesture {
    toggle_candidate: Option<EdgeId>,
    moved_node: bool,
    created_edge: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown {
        button: PointerButton,
        pos: Pos2,
        modifiers: Modifiers,
    },
    PointerMove {
        pos: Pos2,
    },
    PointerUp {
        button: PointerButton,
        pos: Pos2,
        modifiers: Modifiers,
    },
    /// Positive steps zoom in.
    Scroll {
        pos: Pos2,
        steps: f32,
    },
    DoubleClick {
        pos: Pos2,
    },
    Key(Key),
}

impl EditorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: StartupOptions) -> Self {
        let mut model = ViewModel::new(options.layout, options.auto_layout);
        let io_rx = options
            .file
            .map(|path| io::spawn_request(IoRequest::OpenPath(path)));
        if io_rx.is_some() {
            model.set_status("Opening file...", false);
        }

        Self { model, io_rx }
    }

    fn poll_io(&mut self, ctx: &Context) {
        let Some(rx) = self.io_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(outcome)) => self.model.apply_io_outcome(ctx, outcome),
            Ok(Err(error)) => {
                warn!(%error, "file operation failed");
                self.model.set_status(error, true);
            }
            Err(TryRecvError::Empty) => self.io_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.model
                    .set_status("Background file worker disconnected", true);
            }
        }
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_io(ctx);

        let is_busy = self.io_rx.is_some();
        self.model.show(ctx, is_busy);

        if let Some(request) = self.model.next_io_request(self.io_rx.is_some()) {
            info!(request = request.label(), "starting file operation");
            self.io_rx = Some(io::spawn_request(request));
        }

        if self.io_rx.is_some() {
            ctx.request_repaint();
        }
    }
}
