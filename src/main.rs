mod app;
mod graph;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::{EditorApp, LayoutConfig, StartupOptions};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Adjacency-list or layout JSON document to open on startup.
    file: Option<PathBuf>,

    /// Layout heat multiplier per tick, clamped to [0.97, 0.99].
    #[arg(long, default_value_t = 0.98)]
    decay_rate: f32,

    /// Do not run the auto layout after importing an adjacency list.
    #[arg(long)]
    no_auto_layout: bool,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let startup = StartupOptions {
        file: args.file,
        layout: LayoutConfig::default().with_decay_rate(args.decay_rate),
        auto_layout: !args.no_auto_layout,
    };
    tracing::info!(
        file = ?startup.file,
        decay_rate = startup.layout.decay_rate,
        "starting editor"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_title("state-sketch"),
        ..Default::default()
    };

    eframe::run_native(
        "state-sketch",
        options,
        Box::new(move |cc| Ok(Box::new(EditorApp::new(cc, startup)))),
    )
}
