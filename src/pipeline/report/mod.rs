//! Report emission: one persisted artifact per analysed document.

pub mod json;
pub mod markdown;
pub mod summary;

pub use json::JsonDirectorySink;
pub use markdown::{render_markdown, MarkdownDirectorySink};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::AnalysisReport;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Report write failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report writer panicked: {0}")]
    WorkerPanicked(String),
}

/// Where finished reports go. Implementations must accept reports from
/// several documents concurrently.
pub trait ReportSink: Send + Sync {
    /// Persist one report, returning where it landed.
    fn emit(&self, report: &AnalysisReport) -> Result<PathBuf, SinkError>;
}

/// Create `dir` if needed and write `contents` to `dir/file_name`.
fn write_artifact(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, SinkError> {
    std::fs::create_dir_all(dir).map_err(|source| SinkError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(file_name);
    std::fs::write(&path, contents.as_bytes()).map_err(|source| SinkError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), size = contents.len(), "Report written");
    Ok(path)
}
