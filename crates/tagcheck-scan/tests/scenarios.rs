//! End-to-end verification runs through the scan engine, on paused time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tagcheck_core::{
    CoreError, ScanState, SessionSnapshot, Tag, VerificationReport, VerificationStatus,
};
use tagcheck_scan::{ScanConfig, ScanEngine, ScanError, ScanEventEmitter};
use uuid::Uuid;

#[derive(Default)]
struct RecordingEmitter {
    detected: Mutex<Vec<Tag>>,
    reports: Mutex<Vec<(Option<Uuid>, VerificationStatus)>>,
}

impl ScanEventEmitter for RecordingEmitter {
    fn emit_snapshot(&self, _snapshot: &SessionSnapshot) {}

    fn emit_detected(&self, _scan_id: Uuid, tags: &[Tag]) {
        self.detected.lock().unwrap().extend_from_slice(tags);
    }

    fn emit_report(&self, scan_id: Option<Uuid>, report: &VerificationReport) {
        self.reports
            .lock()
            .unwrap()
            .push((scan_id, report.verification_status));
    }
}

async fn run_to_report(engine: &ScanEngine) -> VerificationReport {
    let ticket = engine.initiate_scan().await.unwrap();
    engine.wait_for_report(ticket.scan_id).await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_two_widgets_swept_is_success() {
    let emitter = Arc::new(RecordingEmitter::default());
    let engine = ScanEngine::with_emitter(&ScanConfig::default(), emitter.clone());

    engine.add_to_cart("Widget", 2).await.unwrap();
    assert_eq!(engine.confirm_order().await.unwrap(), 2);

    engine.place("Widget", 150.0, 150.0).await.unwrap();
    engine.place("Widget", 420.0, 380.0).await.unwrap();

    let report = run_to_report(&engine).await;
    assert_eq!(report.verification_status, VerificationStatus::Success);
    assert!(report.missing_items_detail.is_empty());
    assert!(report.extra_items_detail.is_empty());
    assert_eq!(report.expected_items.get("Widget"), Some(&2));
    assert_eq!(report.detected_items.get("Widget"), Some(&2));

    assert_eq!(emitter.detected.lock().unwrap().len(), 2);
    assert_eq!(emitter.reports.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_item_outside_sweep_is_mismatch() {
    let engine = ScanEngine::new(&ScanConfig::default());

    engine.add_to_cart("Widget", 1).await.unwrap();
    engine.confirm_order().await.unwrap();
    engine.place("Widget", 1000.0, 1000.0).await.unwrap();

    let report = run_to_report(&engine).await;
    assert_eq!(report.verification_status, VerificationStatus::Mismatch);
    assert_eq!(report.missing_items_detail.get("Widget"), Some(&1));
    assert_eq!(report.metrics.detected_items_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_extra_item_is_caution() {
    let engine = ScanEngine::new(&ScanConfig::default());

    engine.add_to_cart("Widget", 1).await.unwrap();
    engine.confirm_order().await.unwrap();
    engine.place("Widget", 300.0, 250.0).await.unwrap();
    engine.place("Gadget", 550.0, 450.0).await.unwrap();

    let report = run_to_report(&engine).await;
    assert_eq!(report.verification_status, VerificationStatus::Caution);
    assert_eq!(report.extra_items_detail.get("Gadget"), Some(&1));
    assert!(report.missing_items_detail.is_empty());
    assert_eq!(report.metrics.extra_items_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_quantity_and_empty_confirm_rejected() {
    let engine = ScanEngine::new(&ScanConfig::default());
    let before = engine.snapshot().await;

    let err = engine.add_to_cart("X", 0).await.unwrap_err();
    assert!(err.is_precondition());

    let err = engine.confirm_order().await.unwrap_err();
    assert!(matches!(err, ScanError::Core(CoreError::EmptyOrder)));

    let after = engine.snapshot().await;
    assert!(!after.order_confirmed);
    assert_eq!(after, before);
}

#[tokio::test(start_paused = true)]
async fn test_manual_move_during_sweep() {
    let engine = ScanEngine::new(&ScanConfig::default());

    engine.add_to_cart("Power Bank", 1).await.unwrap();
    engine.confirm_order().await.unwrap();
    // Bottom-right corner, the last row the sweep reaches
    engine.place("Power Bank", 690.0, 640.0).await.unwrap();

    let ticket = engine.initiate_scan().await.unwrap();
    tokio::time::sleep(Duration::from_millis(75)).await;

    let newly = engine.move_scanner_to(690.0, 640.0).await.unwrap();
    assert_eq!(newly, vec![Tag::new("RFID_PB_H9J2", 1)]);

    let report = engine.wait_for_report(ticket.scan_id).await.unwrap();
    assert_eq!(report.verification_status, VerificationStatus::Success);
    assert_eq!(report.metrics.detected_items_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_range_raised_mid_sweep_applies_to_ticks() {
    let engine = ScanEngine::new(&ScanConfig::default());

    engine.add_to_cart("Widget", 1).await.unwrap();
    engine.confirm_order().await.unwrap();
    engine.place("Widget", 200.0, 200.0).await.unwrap();
    engine.set_scan_range(20.0).await.unwrap();

    engine.initiate_scan().await.unwrap();
    engine.set_scan_range(200.0).await.unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    // Still on the first row, 150 above the item
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.scanner.y, 50.0);
    assert_eq!(snapshot.detected_tags, vec![Tag::new("CUSTOM-WIDGET", 1)]);

    engine.finalize().await;
}

#[tokio::test(start_paused = true)]
async fn test_manual_finalize_cancels_settle() {
    let engine = ScanEngine::new(&ScanConfig::default());

    engine.add_to_cart("Widget", 1).await.unwrap();
    engine.confirm_order().await.unwrap();
    engine.place("Widget", 600.0, 600.0).await.unwrap();

    let ticket = engine.initiate_scan().await.unwrap();
    tokio::time::sleep(Duration::from_millis(260)).await;

    let report = engine.finalize().await;
    assert_eq!(report.verification_status, VerificationStatus::Mismatch);
    assert_eq!(
        engine.wait_for_report(ticket.scan_id).await.unwrap(),
        report
    );

    // No stale tick or settle timer may touch the session afterwards
    tokio::time::sleep(Duration::from_secs(60)).await;
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.scan_state, ScanState::Idle);
    assert!(snapshot.detected_tags.is_empty());
    assert_eq!(snapshot.report, Some(report));
}

#[tokio::test(start_paused = true)]
async fn test_reinitiate_cancels_previous_scan() {
    let engine = ScanEngine::new(&ScanConfig::default());

    engine.add_to_cart("Widget", 1).await.unwrap();
    engine.confirm_order().await.unwrap();
    engine.place("Widget", 60.0, 60.0).await.unwrap();

    let first = engine.initiate_scan().await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    let second = engine.initiate_scan().await.unwrap();
    assert_ne!(first.scan_id, second.scan_id);

    let err = engine.wait_for_report(first.scan_id).await.unwrap_err();
    assert!(matches!(err, ScanError::ScanCancelled { .. }));

    // Detection from the first sweep survives the restart
    let report = engine.wait_for_report(second.scan_id).await.unwrap();
    assert_eq!(report.verification_status, VerificationStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn test_faster_config_finishes_sooner() {
    let mut config = ScanConfig::default();
    config.sweep.tick_ms = 10;
    config.sweep.settle_ms = 100;

    let engine = ScanEngine::new(&config);
    engine.add_to_cart("Widget", 1).await.unwrap();
    engine.confirm_order().await.unwrap();
    engine.place("Widget", 200.0, 200.0).await.unwrap();

    let started = tokio::time::Instant::now();
    run_to_report(&engine).await;
    // 390 ticks at 10 ms plus the settle delay
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(4000), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(4100), "{:?}", elapsed);
}
