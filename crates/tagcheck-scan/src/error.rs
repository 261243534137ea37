//! # Scan Error Types
//!
//! Error types for the scan runtime.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Scan Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │  Precondition   │  │     Runtime             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Core(..)       │  │  ScanCancelled          │ │
//! │  │  ConfigLoad..   │  │  (state intact) │  │  ShuttingDown           │ │
//! │  │  ConfigSave..   │  │                 │  │  UnknownScan            │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tagcheck_core::CoreError;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Everything the scan runtime can fail with.
#[derive(Debug, Error)]
pub enum ScanError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid scan configuration.
    #[error("Invalid scan configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// An operator action was refused by the session.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The scan was reset or restarted before it produced a report.
    #[error("Scan {scan_id} was cancelled before finalizing")]
    ScanCancelled { scan_id: Uuid },

    /// The id was never issued, or its outcome has been forgotten.
    #[error("Unknown scan {scan_id}")]
    UnknownScan { scan_id: Uuid },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// The engine was dropped while someone was waiting on it.
    #[error("Scan engine is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ScanError {
    fn from(err: toml::de::Error) -> Self {
        ScanError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ScanError {
    fn from(err: toml::ser::Error) -> Self {
        ScanError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ScanError {
    /// True when an operator action was refused and nothing changed.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ScanError::Core(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidConfig(_)
                | ScanError::ConfigLoadFailed(_)
                | ScanError::ConfigSaveFailed(_)
        )
    }
}
