//! # tagcheck-scan: Sweep Runtime for TagCheck
//!
//! Wraps the pure [`tagcheck_core::Session`] in a tokio runtime layer: the
//! automatic sweep runs on a periodic task, the settle delay on a delayed
//! task, and every mutation goes through one lock.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Scan Runtime Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  ScanEngine (engine.rs)                          │  │
//! │  │  Operator actions, snapshots, wait_for_report                    │  │
//! │  └──────────────┬───────────────────────────────┬───────────────────┘  │
//! │                 │                               │                       │
//! │                 ▼                               ▼                       │
//! │  ┌──────────────────────────┐    ┌──────────────────────────────────┐  │
//! │  │ SweepScheduler           │    │ ScanConfig                       │  │
//! │  │ (scheduler.rs)           │    │ (config.rs)                      │  │
//! │  │ periodic ticks + settle  │    │ scan.toml + TAGCHECK_* env       │  │
//! │  │ cancelled together       │    │                                  │  │
//! │  └──────────────────────────┘    └──────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - Scan configuration (geometry, timing, catalog)
//! - [`engine`] - `ScanEngine` and its event emitter
//! - [`error`] - Scan error types
//! - [`scheduler`] - Cancellable periodic and delayed tasks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagcheck_scan::{ScanConfig, ScanEngine};
//!
//! let engine = ScanEngine::new(&ScanConfig::load_or_default(None));
//! engine.add_to_cart("Power Bank", 2).await?;
//! engine.confirm_order().await?;
//! engine.place("Power Bank", 120.0, 140.0).await?;
//! engine.place("Power Bank", 480.0, 300.0).await?;
//!
//! let ticket = engine.initiate_scan().await?;
//! let report = engine.wait_for_report(ticket.scan_id).await?;
//! println!("{}", report.verification_status);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{PackageSettings, ScanConfig, ScannerSettings, SweepSettings};
pub use engine::{NoOpEmitter, ScanCompletion, ScanEngine, ScanEventEmitter, ScanTicket};
pub use error::{ScanError, ScanResult};
pub use scheduler::{SweepScheduler, TaskHandle};
