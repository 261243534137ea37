//! # tagcheck-core: Pure Scan-and-Reconciliation Logic for TagCheck
//!
//! This crate is the **heart** of TagCheck, an RFID package-verification
//! simulator. It holds every rule of the simulation as plain, synchronous
//! code with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TagCheck Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Front-end (console app, future UI)                 │   │
//! │  │    Order form ──► Package surface ──► Scan controls ──► Report │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshots / actions                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                tagcheck-scan (tokio runtime)                    │   │
//! │  │    ScanEngine, sweep + settle timers, config                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ tagcheck-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ identity │ │  ledger  │ │placement │ │ detection, sweep │  │   │
//! │  │   │   Tag    │ │  Order   │ │ Placed-  │ │    reconcile     │  │   │
//! │  │   │ counters │ │ Expected │ │  Item    │ │     Report       │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                          session                                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • NO ASYNC • CALLER-SUPPLIED TIME         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Tag, PlacedItem, Scanner, VerificationReport)
//! - [`catalog`] - Static product catalog
//! - [`identity`] - Tag derivation and counter scopes
//! - [`ledger`] - Customer order and expected tags
//! - [`placement`] - Placed items and selection
//! - [`detection`] - Proximity test
//! - [`sweep`] - Automatic sweep path
//! - [`reconcile`] - Expected vs detected comparison
//! - [`session`] - State owner tying it all together
//! - [`error`] / [`validation`] - Error types and input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use tagcheck_core::{Session, VerificationStatus};
//!
//! let mut session = Session::default();
//! session.add_to_cart("Power Bank", 1).unwrap();
//! session.confirm_order().unwrap();
//!
//! session.select_item("Power Bank").unwrap();
//! session.place_item_at(120.0, 120.0).unwrap();
//!
//! let sweep = session.initiate_scan_at(Utc::now()).unwrap();
//! for point in sweep.path {
//!     session.sweep_tick(sweep.epoch, point);
//! }
//!
//! let report = session.finalize();
//! assert_eq!(report.verification_status, VerificationStatus::Success);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod detection;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod placement;
pub mod reconcile;
pub mod session;
pub mod sweep;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Catalog, CatalogEntry};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{LineProgress, ProgressStatus};
pub use session::{Session, SessionSettings, SessionSnapshot, SweepStart};
pub use sweep::SweepPath;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Scanner range after a reset.
pub const DEFAULT_SCAN_RANGE: f64 = 80.0;

/// Smallest accepted scanner range.
pub const MIN_SCAN_RANGE: f64 = 20.0;

/// Largest accepted scanner range.
pub const MAX_SCAN_RANGE: f64 = 200.0;

/// Horizontal distance the sweep covers per tick.
pub const DEFAULT_SWEEP_STEP: f64 = 25.0;

/// Edge length of a placed item.
pub const ITEM_SIZE: f64 = 20.0;

/// Scanner rest position.
pub const SCANNER_HOME: Point = Point::new(100.0, 100.0);

/// Maximum units added by one add-to-cart call
///
/// ## Business Reason
/// Matches the order form's quantity field; catches a typed 100 meant as 10.
pub const MAX_ORDER_QUANTITY: u32 = 99;

/// Maximum length of item names, order ids and order names.
pub const MAX_NAME_LEN: usize = 100;
