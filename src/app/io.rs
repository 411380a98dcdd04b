use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result};
use tracing::debug;

#[derive(Debug)]
pub(super) enum IoRequest {
    Open,
    OpenPath(PathBuf),
    Save {
        contents: String,
        suggested_name: String,
    },
}

#[derive(Debug)]
pub(super) enum IoOutcome {
    Opened { file_name: String, bytes: Vec<u8> },
    Saved(PathBuf),
    Cancelled,
}

impl IoRequest {
    pub(super) fn label(&self) -> &'static str {
        match self {
            Self::Open | Self::OpenPath(_) => "open",
            Self::Save { .. } => "save",
        }
    }
}

pub(super) fn spawn_request(request: IoRequest) -> Receiver<Result<IoOutcome, String>> {
    let (tx, rx) = mpsc::channel();

    let job = match request {
        IoRequest::Open => rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
            .map(Job::Read),
        IoRequest::OpenPath(path) => Some(Job::Read(path)),
        IoRequest::Save {
            contents,
            suggested_name,
        } => rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(suggested_name)
            .save_file()
            .map(|path| Job::Write(path, contents)),
    };

    let Some(job) = job else {
        let _ = tx.send(Ok(IoOutcome::Cancelled));
        return rx;
    };

    thread::spawn(move || {
        let result = job.run().map_err(|error| format!("{error:#}"));
        let _ = tx.send(result);
    });

    rx
}

enum Job {
    Read(PathBuf),
    Write(PathBuf, String),
}

impl Job {
    fn run(self) -> Result<IoOutcome> {
        match self {
            Self::Read(path) => {
                let bytes = read_document(&path)?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(IoOutcome::Opened { file_name, bytes })
            }
            Self::Write(path, contents) => {
                write_document(&path, &contents)?;
                Ok(IoOutcome::Saved(path))
            }
        }
    }
}

fn read_document(path: &Path) -> Result<Vec<u8>> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "read document");
    Ok(bytes)
}

fn write_document(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote document");
    Ok(())
}
