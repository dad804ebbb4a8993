use std::path::{Path, PathBuf};

use super::{write_artifact, ReportSink, SinkError};
use crate::models::AnalysisReport;

/// Writes `<dir>/<report_id>.json`, pretty-printed.
pub struct JsonDirectorySink {
    dir: PathBuf,
}

impl JsonDirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for JsonDirectorySink {
    fn emit(&self, report: &AnalysisReport) -> Result<PathBuf, SinkError> {
        let json = serde_json::to_string_pretty(report)?;
        write_artifact(&self.dir, &format!("{}.json", report.report_id), &json)
    }
}
