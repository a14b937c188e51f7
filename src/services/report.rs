use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::MatchReport;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write a report as pretty JSON
///
/// The report is fully serialized and written to a sibling temp file before
/// being renamed into place, so a failure never leaves a partial artifact.
pub fn write_report(report: &MatchReport, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;

    let io_error = |source: std::io::Error| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".partial");
    let staging = PathBuf::from(staging);

    if let Err(source) = fs::write(&staging, json) {
        let _ = fs::remove_file(&staging);
        return Err(io_error(source));
    }
    fs::rename(&staging, path).map_err(io_error)?;

    tracing::info!("Report with {} results written to {}", report.results.len(), path.display());
    Ok(())
}
