//! # Scan Engine
//!
//! Async front door to a [`Session`]: runs the automatic sweep on tokio
//! timers, serializes every mutation behind one lock, and publishes
//! snapshots for views.
//!
//! ## Engine Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ScanEngine Architecture                          │
//! │                                                                         │
//! │   operator actions            sweep ticks            settle delay       │
//! │   (add, place, move,          (periodic task)        (delayed task)     │
//! │    range, finalize, reset)          │                      │            │
//! │          │                          │                      │            │
//! │          ▼                          ▼                      ▼            │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  Mutex<Session>   (single writer)                │  │
//! │  │   sweep_tick(epoch, p) / move_scanner_to(x, y) ─► try_detect     │  │
//! │  └───────────────────────────────┬──────────────────────────────────┘  │
//! │                                  │                                      │
//! │          ┌───────────────────────┼───────────────────────┐              │
//! │          ▼                       ▼                       ▼              │
//! │   watch<SessionSnapshot>   ScanEventEmitter     watch<ScanCompletion>   │
//! │   (views redraw)           (detections, report) (wait_for_report)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lock Order
//! Session first, then scan control. Tick tasks release the session before
//! scheduling the settle delay.

use std::collections::{HashMap, VecDeque};
use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tagcheck_core::{
    Catalog, PlacedItem, Point, Session, SessionSettings, SessionSnapshot, SweepStart, Tag,
    VerificationReport,
};

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::scheduler::{spawn_delayed, spawn_periodic, SweepScheduler};

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives engine events (implemented by a UI integration).
pub trait ScanEventEmitter: Send + Sync {
    /// Emits the session state after every change.
    fn emit_snapshot(&self, snapshot: &SessionSnapshot);

    /// Emits tags detected by one proximity pass.
    fn emit_detected(&self, scan_id: Uuid, tags: &[Tag]);

    /// Emits a finished verification.
    fn emit_report(&self, scan_id: Option<Uuid>, report: &VerificationReport);
}

/// No-op event emitter for testing.
pub struct NoOpEmitter;

impl ScanEventEmitter for NoOpEmitter {
    fn emit_snapshot(&self, _snapshot: &SessionSnapshot) {}
    fn emit_detected(&self, _scan_id: Uuid, _tags: &[Tag]) {}
    fn emit_report(&self, _scan_id: Option<Uuid>, _report: &VerificationReport) {}
}

// =============================================================================
// Scan Tickets
// =============================================================================

/// Identifies one started scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTicket {
    pub scan_id: Uuid,
    pub epoch: u64,
}

/// How a scan ended. `report` is `None` when it was cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanCompletion {
    pub scan_id: Uuid,
    pub report: Option<VerificationReport>,
}

/// Finished scans remembered for late `wait_for_report` callers.
const MAX_REMEMBERED_SCANS: usize = 32;

/// Timers plus the scan they belong to.
#[derive(Debug, Default)]
struct ScanControl {
    scheduler: SweepScheduler,
    active: Option<ScanTicket>,
    outcomes: HashMap<Uuid, Option<VerificationReport>>,
    finished_order: VecDeque<Uuid>,
}

impl ScanControl {
    fn record(&mut self, scan_id: Uuid, report: Option<VerificationReport>) {
        if self.outcomes.insert(scan_id, report).is_none() {
            self.finished_order.push_back(scan_id);
        }
        while self.finished_order.len() > MAX_REMEMBERED_SCANS {
            if let Some(oldest) = self.finished_order.pop_front() {
                self.outcomes.remove(&oldest);
            }
        }
    }

    /// `None` while `scan_id` is still running.
    fn outcome(&self, scan_id: Uuid) -> Option<ScanResult<VerificationReport>> {
        match self.outcomes.get(&scan_id) {
            Some(Some(report)) => Some(Ok(report.clone())),
            Some(None) => Some(Err(ScanError::ScanCancelled { scan_id })),
            None if self.active.map(|t| t.scan_id) == Some(scan_id) => None,
            None => Some(Err(ScanError::UnknownScan { scan_id })),
        }
    }
}

// =============================================================================
// Scan Engine
// =============================================================================

struct EngineInner {
    session: Mutex<Session>,
    control: Mutex<ScanControl>,
    tick_interval: Duration,
    settle_delay: Duration,
    snapshots: watch::Sender<SessionSnapshot>,
    completions: watch::Sender<Option<ScanCompletion>>,
    emitter: Arc<dyn ScanEventEmitter>,
}

/// Cheap to clone; all clones drive the same session.
#[derive(Clone)]
pub struct ScanEngine {
    inner: Arc<EngineInner>,
}

impl ScanEngine {
    /// Creates an engine from a loaded configuration.
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_emitter(config, Arc::new(NoOpEmitter))
    }

    /// Creates an engine with a custom event emitter.
    pub fn with_emitter(config: &ScanConfig, emitter: Arc<dyn ScanEventEmitter>) -> Self {
        Self::from_parts(
            config.catalog(),
            config.session_settings(),
            config.tick_interval(),
            config.settle_delay(),
            emitter,
        )
    }

    fn from_parts(
        catalog: Catalog,
        settings: SessionSettings,
        tick_interval: Duration,
        settle_delay: Duration,
        emitter: Arc<dyn ScanEventEmitter>,
    ) -> Self {
        let session = Session::new(catalog, settings);
        let (snapshots, _) = watch::channel(session.snapshot());
        let (completions, _) = watch::channel(None);

        ScanEngine {
            inner: Arc::new(EngineInner {
                session: Mutex::new(session),
                control: Mutex::new(ScanControl::default()),
                tick_interval,
                settle_delay,
                snapshots,
                completions,
                emitter,
            }),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Current session state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.session.lock().await.snapshot()
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Id of the scan currently running, if any.
    pub async fn active_scan(&self) -> Option<Uuid> {
        self.inner.control.lock().await.active.map(|t| t.scan_id)
    }

    /// Waits until the scan identified by `scan_id` ends.
    ///
    /// Returns at once for scans that already ended.
    ///
    /// ## Errors
    /// - `ScanCancelled` when it was reset or restarted first
    /// - `UnknownScan` for ids this engine never issued (or long forgotten)
    /// - `ShuttingDown` when the engine went away
    pub async fn wait_for_report(&self, scan_id: Uuid) -> ScanResult<VerificationReport> {
        // Subscribe before the lookup so no completion slips in between.
        let mut rx = self.inner.completions.subscribe();
        loop {
            if let Some(outcome) = self.inner.control.lock().await.outcome(scan_id) {
                return outcome;
            }
            rx.changed().await.map_err(|_| ScanError::ShuttingDown)?;
        }
    }

    // =========================================================================
    // Order & Placement
    // =========================================================================

    pub async fn add_to_cart(&self, name: &str, quantity: i64) -> ScanResult<()> {
        self.mutate(|s| s.add_to_cart(name, quantity)).await
    }

    pub async fn clear_cart(&self) -> ScanResult<()> {
        self.mutate(|s| s.clear_cart()).await
    }

    pub async fn set_order_id(&self, order_id: Option<&str>) -> ScanResult<()> {
        self.mutate(|s| s.set_order_id(order_id)).await
    }

    pub async fn set_order_name(&self, order_name: Option<&str>) -> ScanResult<()> {
        self.mutate(|s| s.set_order_name(order_name)).await
    }

    /// Returns the number of expected tags.
    pub async fn confirm_order(&self) -> ScanResult<usize> {
        self.mutate(|s| s.confirm_order()).await
    }

    pub async fn select_item(&self, name: &str) -> ScanResult<()> {
        self.mutate(|s| s.select_item(name)).await
    }

    pub async fn clear_selection(&self) {
        let mut session = self.inner.session.lock().await;
        session.clear_selection();
        self.inner.publish(&session);
    }

    pub async fn place_item_at(&self, x: f64, y: f64) -> ScanResult<PlacedItem> {
        self.mutate(|s| s.place_item_at(x, y)).await
    }

    /// Selects `name` and places it in one step.
    pub async fn place(&self, name: &str, x: f64, y: f64) -> ScanResult<PlacedItem> {
        self.mutate(|s| {
            s.select_item(name)?;
            s.place_item_at(x, y)
        })
        .await
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Starts a scan and its automatic sweep.
    ///
    /// A scan already running is cancelled first; its detections are kept.
    pub async fn initiate_scan(&self) -> ScanResult<ScanTicket> {
        let mut session = self.inner.session.lock().await;
        let SweepStart { epoch, mut path } = session.initiate_scan_at(Utc::now())?;
        self.inner.publish(&session);

        let mut control = self.inner.control.lock().await;
        control.scheduler.cancel_all();
        if let Some(previous) = control.active.take() {
            info!(scan_id = %previous.scan_id, "Restarting scan");
            self.inner.complete(&mut control, previous.scan_id, None);
        }

        let ticket = ScanTicket {
            scan_id: Uuid::new_v4(),
            epoch,
        };
        control.active = Some(ticket);

        let weak: Weak<EngineInner> = Arc::downgrade(&self.inner);
        control.scheduler.set_periodic(spawn_periodic(
            "sweep",
            self.inner.tick_interval,
            move || {
                let point = path.next();
                let finished = path.is_finished();
                let weak = weak.clone();
                async move {
                    let Some(inner) = weak.upgrade() else {
                        return ControlFlow::Break(());
                    };
                    inner.sweep_step(ticket, point, finished).await
                }
            },
        ));

        info!(scan_id = %ticket.scan_id, epoch, "Sweep started");
        Ok(ticket)
    }

    /// Manual scanner move; runs the same proximity pass as a sweep tick.
    pub async fn move_scanner_to(&self, x: f64, y: f64) -> ScanResult<Vec<Tag>> {
        let mut session = self.inner.session.lock().await;
        let newly = session.move_scanner_to(x, y)?;
        self.inner.publish(&session);
        drop(session);

        if !newly.is_empty() {
            if let Some(scan_id) = self.active_scan().await {
                self.inner.emitter.emit_detected(scan_id, &newly);
            }
        }
        Ok(newly)
    }

    pub async fn set_scan_range(&self, range: f64) -> ScanResult<()> {
        self.mutate(|s| s.set_scan_range(range)).await
    }

    /// Finalizes now, cancelling any pending sweep or settle timer.
    pub async fn finalize(&self) -> VerificationReport {
        let mut session = self.inner.session.lock().await;
        let report = session.finalize_at(Utc::now());
        self.inner.publish(&session);

        let mut control = self.inner.control.lock().await;
        control.scheduler.cancel_all();
        let scan_id = control.active.take().map(|t| t.scan_id);
        if let Some(scan_id) = scan_id {
            self.inner
                .complete(&mut control, scan_id, Some(report.clone()));
        }
        self.inner.emitter.emit_report(scan_id, &report);

        report
    }

    /// Full reset: cancels timers and clears the session.
    pub async fn reset(&self) {
        let mut session = self.inner.session.lock().await;
        session.reset();
        self.inner.publish(&session);

        let mut control = self.inner.control.lock().await;
        if control.scheduler.cancel_all() {
            debug!("Cancelled pending sweep timers on reset");
        }
        if let Some(previous) = control.active.take() {
            self.inner.complete(&mut control, previous.scan_id, None);
        }
    }

    /// Alias for [`reset`](Self::reset); clearing the package clears everything.
    pub async fn clear_all(&self) {
        self.reset().await;
    }

    async fn mutate<T, F>(&self, op: F) -> ScanResult<T>
    where
        F: FnOnce(&mut Session) -> tagcheck_core::CoreResult<T>,
    {
        let mut session = self.inner.session.lock().await;
        let value = op(&mut *session)?;
        self.inner.publish(&session);
        Ok(value)
    }
}

impl EngineInner {
    fn publish(&self, session: &Session) {
        let snapshot = session.snapshot();
        self.emitter.emit_snapshot(&snapshot);
        self.snapshots.send_replace(snapshot);
    }

    /// Records how a scan ended and wakes its waiters.
    fn complete(
        &self,
        control: &mut ScanControl,
        scan_id: Uuid,
        report: Option<VerificationReport>,
    ) {
        if report.is_none() {
            info!(%scan_id, "Scan cancelled");
        }
        control.record(scan_id, report.clone());
        self.completions
            .send_replace(Some(ScanCompletion { scan_id, report }));
    }

    /// One periodic tick: detect at `point`, then hand over to the settle
    /// timer once the path is done.
    async fn sweep_step(
        self: Arc<Self>,
        ticket: ScanTicket,
        point: Option<Point>,
        finished: bool,
    ) -> ControlFlow<()> {
        let Some(point) = point else {
            return ControlFlow::Break(());
        };

        {
            let mut session = self.session.lock().await;
            let Some(newly) = session.sweep_tick(ticket.epoch, point) else {
                return ControlFlow::Break(());
            };
            self.publish(&session);
            if !newly.is_empty() {
                self.emitter.emit_detected(ticket.scan_id, &newly);
            }
        }

        if !finished {
            return ControlFlow::Continue(());
        }

        debug!(scan_id = %ticket.scan_id, "Sweep path complete, settling");
        let weak = Arc::downgrade(&self);
        let settle = spawn_delayed("settle", self.settle_delay, async move {
            if let Some(inner) = weak.upgrade() {
                inner.auto_finalize(ticket).await;
            }
        });
        self.control.lock().await.scheduler.set_delayed(settle);

        ControlFlow::Break(())
    }

    /// Settle timer expiry. Ignored if the scan moved on meanwhile.
    async fn auto_finalize(&self, ticket: ScanTicket) {
        let mut session = self.session.lock().await;
        if session.epoch() != ticket.epoch || !session.is_scanning() {
            warn!(scan_id = %ticket.scan_id, "Stale settle timer, not finalizing");
            return;
        }

        let report = session.finalize_at(Utc::now());
        self.publish(&session);

        let mut control = self.control.lock().await;
        if control.active.map(|t| t.scan_id) == Some(ticket.scan_id) {
            control.active = None;
        }
        info!(scan_id = %ticket.scan_id, status = %report.verification_status, "Auto-finalized");
        self.complete(&mut control, ticket.scan_id, Some(report.clone()));
        self.emitter.emit_report(Some(ticket.scan_id), &report);
    }
}
