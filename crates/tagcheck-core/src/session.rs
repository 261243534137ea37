//! # Verification Session
//!
//! The single state owner for one simulated verification. Every operator
//! action goes through here; views read [`SessionSnapshot`]s.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_to_cart ─► confirm_order ─► select_item ─► place_item_at ─┐        │
//! │       ▲                                 ▲                      │        │
//! │       │                                 └──────────────────────┘        │
//! │       │                                                                 │
//! │       │         initiate_scan ─► sweep_tick / move_scanner_to ─┐        │
//! │       │               │                   ▲                    │        │
//! │       │               │                   └────────────────────┘        │
//! │       │               ▼                                                 │
//! │       │          finalize ─► VerificationReport                         │
//! │       │                                                                 │
//! │       └──────────────────── reset ◄──── (any state)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Scan Epoch
//! Each `initiate_scan`, `finalize` and `reset` bumps the epoch. Sweep ticks
//! carry the epoch they were started under and are ignored once it moves on,
//! so a tick racing a cancellation cannot touch the session.
//!
//! The `*_at` variants take the instant explicitly; only the plain
//! wrappers read `Utc::now()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::detection::{try_detect, DetectedTagSet};
use crate::error::{CoreError, CoreResult};
use crate::ledger::{LineProgress, OrderLedger};
use crate::placement::PlacementStore;
use crate::reconcile::{reconcile, ReconcileInput};
use crate::sweep::SweepPath;
use crate::types::{
    PackageBounds, PlacedItem, Point, ScanState, Scanner, Tag, VerificationReport,
};
use crate::validation::validate_scan_range;
use crate::{DEFAULT_SCAN_RANGE, DEFAULT_SWEEP_STEP, ITEM_SIZE, SCANNER_HOME};

// =============================================================================
// Settings
// =============================================================================

/// Geometry and defaults a session is built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub bounds: PackageBounds,
    /// Where the scanner rests after a reset.
    pub scanner_home: Point,
    /// Range after a reset.
    pub default_range: f64,
    /// Horizontal distance per sweep tick.
    pub sweep_step: f64,
    pub item_size: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            bounds: PackageBounds::default(),
            scanner_home: SCANNER_HOME,
            default_range: DEFAULT_SCAN_RANGE,
            sweep_step: DEFAULT_SWEEP_STEP,
            item_size: ITEM_SIZE,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything a view needs to draw the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionSnapshot {
    pub customer_order: Vec<String>,
    pub order_confirmed: bool,
    pub order_id: Option<String>,
    pub order_name: Option<String>,
    pub expected_tags: Vec<Tag>,
    pub progress: Vec<LineProgress>,
    pub placed_items: Vec<PlacedItem>,
    pub selected_item: Option<String>,
    pub scanner: Scanner,
    pub scan_state: ScanState,
    pub detected_tags: Vec<Tag>,
    pub bounds: PackageBounds,
    pub report: Option<VerificationReport>,
}

// =============================================================================
// Session
// =============================================================================

/// A started sweep: the epoch it belongs to and the path to walk.
#[derive(Debug, Clone)]
pub struct SweepStart {
    pub epoch: u64,
    pub path: SweepPath,
}

#[derive(Debug, Clone)]
pub struct Session {
    settings: SessionSettings,
    catalog: Catalog,
    order: OrderLedger,
    placement: PlacementStore,
    detected: DetectedTagSet,
    scanner: Scanner,
    state: ScanState,
    started_at: Option<DateTime<Utc>>,
    report: Option<VerificationReport>,
    epoch: u64,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(Catalog::builtin(), SessionSettings::default())
    }
}

impl Session {
    pub fn new(catalog: Catalog, settings: SessionSettings) -> Self {
        Session {
            settings,
            catalog,
            order: OrderLedger::new(),
            placement: PlacementStore::new(),
            detected: DetectedTagSet::new(),
            scanner: Scanner::at_rest(settings.scanner_home, settings.default_range),
            state: ScanState::Idle,
            started_at: None,
            report: None,
            epoch: 0,
        }
    }

    // =========================================================================
    // Order
    // =========================================================================

    pub fn add_to_cart(&mut self, name: &str, quantity: i64) -> CoreResult<()> {
        self.order.add(name, quantity)?;
        debug!(name = %name.trim(), quantity, "Added to cart");
        Ok(())
    }

    pub fn clear_cart(&mut self) -> CoreResult<()> {
        self.order.clear()
    }

    pub fn set_order_id(&mut self, order_id: Option<&str>) -> CoreResult<()> {
        self.order.set_order_id(order_id)
    }

    pub fn set_order_name(&mut self, order_name: Option<&str>) -> CoreResult<()> {
        self.order.set_order_name(order_name)
    }

    /// Locks the order. Returns the number of expected tags.
    pub fn confirm_order(&mut self) -> CoreResult<usize> {
        let expected = self.order.confirm(&self.catalog)?.len();
        info!(expected, "Order confirmed");
        Ok(expected)
    }

    // =========================================================================
    // Placement
    // =========================================================================

    pub fn select_item(&mut self, name: &str) -> CoreResult<()> {
        self.placement.select(name)
    }

    pub fn clear_selection(&mut self) {
        self.placement.clear_selection();
    }

    /// Places the selected item at `(x, y)` with the configured size.
    pub fn place_item_at(&mut self, x: f64, y: f64) -> CoreResult<PlacedItem> {
        let item = self.placement.place(
            self.order.is_confirmed(),
            &self.catalog,
            x,
            y,
            self.settings.item_size,
        )?;
        debug!(tag = %item.rfid_tag, x, y, "Item placed");
        Ok(item)
    }

    /// Clears every placed item, which is a full reset.
    pub fn clear_all(&mut self) {
        self.reset();
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    pub fn initiate_scan(&mut self) -> CoreResult<SweepStart> {
        self.initiate_scan_at(Utc::now())
    }

    /// Starts a scan session and returns the sweep to drive.
    ///
    /// Calling this while already scanning restarts the sweep and the
    /// clock; tags detected so far are kept.
    ///
    /// ## Errors
    /// - `NoPlacedItems` with an empty package (stays idle)
    pub fn initiate_scan_at(&mut self, now: DateTime<Utc>) -> CoreResult<SweepStart> {
        if self.placement.is_empty() {
            return Err(CoreError::NoPlacedItems);
        }

        self.epoch += 1;
        self.state = ScanState::Scanning;
        self.scanner.active = true;
        self.started_at = Some(now);

        info!(
            epoch = self.epoch,
            items = self.placement.len(),
            range = self.scanner.range,
            "Scan initiated"
        );

        Ok(SweepStart {
            epoch: self.epoch,
            path: SweepPath::new(self.settings.bounds, self.settings.sweep_step, self.scanner.range),
        })
    }

    /// One automatic sweep step. `None` when the tick is stale.
    pub fn sweep_tick(&mut self, epoch: u64, at: Point) -> Option<Vec<Tag>> {
        if epoch != self.epoch || !self.is_scanning() {
            debug!(epoch, current = self.epoch, "Dropping stale sweep tick");
            return None;
        }
        Some(self.try_detect(at))
    }

    /// Manual scanner move.
    ///
    /// ## Errors
    /// - `NotScanning` while idle (scanner untouched)
    pub fn move_scanner_to(&mut self, x: f64, y: f64) -> CoreResult<Vec<Tag>> {
        if !self.is_scanning() {
            return Err(CoreError::NotScanning);
        }
        Ok(self.try_detect(Point::new(x, y)))
    }

    /// Moves the scanner and runs one proximity pass with the live range.
    fn try_detect(&mut self, at: Point) -> Vec<Tag> {
        self.scanner.x = at.x;
        self.scanner.y = at.y;

        let newly = try_detect(
            self.placement.items_mut(),
            &mut self.detected,
            at,
            self.scanner.range,
        );
        for tag in &newly {
            debug!(tag = %tag, x = at.x, y = at.y, "Tag detected");
        }
        newly
    }

    /// Changes the range for subsequent proximity tests.
    pub fn set_scan_range(&mut self, range: f64) -> CoreResult<()> {
        self.scanner.range = validate_scan_range(range)?;
        debug!(range, "Scan range updated");
        Ok(())
    }

    pub fn finalize(&mut self) -> VerificationReport {
        self.finalize_at(Utc::now())
    }

    /// Reconciles, stores the report, and returns the scanner to idle.
    ///
    /// Never fails; without a started scan the duration is 0.
    pub fn finalize_at(&mut self, now: DateTime<Utc>) -> VerificationReport {
        self.epoch += 1;
        self.state = ScanState::Idle;
        self.scanner.active = false;

        let report = reconcile(ReconcileInput {
            order: &self.order,
            placed: self.placement.items(),
            detected: &self.detected,
            started_at: self.started_at.take(),
            finished_at: now,
        });

        info!(
            order_id = %report.order_id,
            status = %report.verification_status,
            duration_seconds = report.scan_duration_seconds,
            "Scan finalized"
        );

        self.report = Some(report.clone());
        report
    }

    /// Back to a fresh session with the same catalog and settings.
    ///
    /// The epoch keeps counting so ticks from before the reset stay stale.
    pub fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Session::new(self.catalog.clone(), self.settings);
        self.epoch = epoch;
        info!(epoch, "Session reset");
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            customer_order: self.order.lines().to_vec(),
            order_confirmed: self.order.is_confirmed(),
            order_id: self.order.order_id().map(str::to_string),
            order_name: self.order.order_name().map(str::to_string),
            expected_tags: self.order.expected().tags().iter().cloned().collect(),
            progress: self.progress(),
            placed_items: self.placement.items().to_vec(),
            selected_item: self.placement.selected().map(str::to_string),
            scanner: self.scanner,
            scan_state: self.state,
            detected_tags: self.detected.iter().cloned().collect(),
            bounds: self.settings.bounds,
            report: self.report.clone(),
        }
    }

    /// Required vs detected units per ordered name.
    pub fn progress(&self) -> Vec<LineProgress> {
        self.order.progress(&self.placement.detected_counts())
    }

    pub fn order(&self) -> &OrderLedger {
        &self.order
    }

    pub fn placed_items(&self) -> &[PlacedItem] {
        self.placement.items()
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.placement.selected()
    }

    pub fn detected(&self) -> &DetectedTagSet {
        &self.detected
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn scan_state(&self) -> ScanState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    pub fn report(&self) -> Option<&VerificationReport> {
        self.report.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// True when `(x, y)` lies in the package region.
    pub fn package_contains(&self, x: f64, y: f64) -> bool {
        self.settings.bounds.contains(Point::new(x, y))
    }
}
