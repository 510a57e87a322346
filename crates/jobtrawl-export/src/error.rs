//! Export error types.

use jobtrawl_core::PersistError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while writing run output.
#[derive(Error, Debug)]
pub enum ExportError {
    /// File or directory could not be written
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding failed
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding failed
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<ExportError> for PersistError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Io { path, source } => PersistError::Io {
                path: path.display().to_string(),
                source,
            },
            ExportError::Csv(e) => PersistError::Encode {
                format: "csv",
                reason: e.to_string(),
            },
            ExportError::Json(e) => PersistError::Encode {
                format: "json",
                reason: e.to_string(),
            },
        }
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
