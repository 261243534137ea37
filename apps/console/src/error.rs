//! # Console Error Type
//!
//! Everything that can end a console run after argument parsing.

use std::path::PathBuf;

use tagcheck_scan::ScanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Config loading or an engine operation failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The report could not be written.
    #[error("Failed to write report to {path:?}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AppError {
    /// Process exit code for this error. Usage errors never get here;
    /// clap exits with 2 on its own.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Scan(e) if e.is_config_error() => 3,
            _ => 1,
        }
    }
}
