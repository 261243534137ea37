//! # Reconciliation Engine
//!
//! Compares expected against detected tags and produces the
//! [`VerificationReport`].
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   missing = Expected − Detected        extra = Detected − Expected      │
//! │                                                                         │
//! │   missing non-empty ─────────────────────────────────► MISMATCH         │
//! │          │ no                                                           │
//! │          ▼                                                              │
//! │   extra non-empty ───────────────────────────────────► CAUTION          │
//! │          │ no                                                           │
//! │          ▼                                                              │
//! │   SUCCESS                                                               │
//! │                                                                         │
//! │   Name resolution: missing → reverse map, extra → placed items,         │
//! │   detected → reverse map, then placed items. Unresolved tags are        │
//! │   logged and left out of the breakdowns (metrics still count them).     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::detection::DetectedTagSet;
use crate::ledger::{count_names, OrderLedger};
use crate::types::{PlacedItem, ScanMetrics, Tag, VerificationReport, VerificationStatus};

/// Everything a finalize call reads.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub order: &'a OrderLedger,
    pub placed: &'a [PlacedItem],
    pub detected: &'a DetectedTagSet,
    /// `None` when finalize runs without a scan ever starting.
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: DateTime<Utc>,
}

/// Builds the report for one finalize call.
pub fn reconcile(input: ReconcileInput<'_>) -> VerificationReport {
    let expected = input.order.expected();

    let missing: Vec<&Tag> = expected
        .tags()
        .iter()
        .filter(|tag| !input.detected.contains(*tag))
        .collect();
    let extra: Vec<&Tag> = input
        .detected
        .iter()
        .filter(|tag| !expected.contains(tag))
        .collect();

    let verification_status = classify(missing.len(), extra.len());

    let placed_name = |tag: &Tag| {
        input
            .placed
            .iter()
            .find(|item| &item.rfid_tag == tag)
            .map(|item| item.name.as_str())
    };

    let missing_names = missing.iter().filter_map(|tag| {
        let name = expected.name_of(tag);
        if name.is_none() {
            warn!(tag = %tag, "Missing tag has no expected name, skipping");
        }
        name
    });
    let extra_names = extra.iter().filter_map(|tag| {
        let name = placed_name(*tag);
        if name.is_none() {
            warn!(tag = %tag, "Extra tag matches no placed item, skipping");
        }
        name
    });
    let detected_names = input.detected.iter().filter_map(|tag| {
        let name = expected.name_of(tag).or_else(|| placed_name(tag));
        if name.is_none() {
            warn!(tag = %tag, "Detected tag cannot be resolved to a name, skipping");
        }
        name
    });

    let missing_items_detail = count_names(missing_names);
    let extra_items_detail = count_names(extra_names);
    let detected_items = count_names(detected_names);

    let metrics = ScanMetrics {
        expected_items_count: expected.len(),
        placed_items_count: input.placed.len(),
        detected_items_count: input.detected.len(),
        missing_items_count: missing.len(),
        extra_items_count: extra.len(),
    };

    let order_id = match input.order.order_id() {
        Some(id) => id.to_string(),
        None => auto_order_id(input.finished_at),
    };

    debug!(
        order_id = %order_id,
        status = %verification_status,
        missing = metrics.missing_items_count,
        extra = metrics.extra_items_count,
        "Reconciled scan"
    );

    VerificationReport {
        order_id,
        order_name: input.order.order_name().map(str::to_string),
        timestamp: input.finished_at,
        verification_status,
        scan_duration_seconds: duration_seconds(input.started_at, input.finished_at),
        metrics,
        expected_items: input.order.required_counts(),
        detected_items,
        missing_items_detail,
        extra_items_detail,
    }
}

/// First match wins: missing → extra → success.
pub fn classify(missing: usize, extra: usize) -> VerificationStatus {
    if missing > 0 {
        VerificationStatus::Mismatch
    } else if extra > 0 {
        VerificationStatus::Caution
    } else {
        VerificationStatus::Success
    }
}

/// `AUTO_` plus the ISO-8601 timestamp with `:` and `.` stripped.
pub fn auto_order_id(at: DateTime<Utc>) -> String {
    let iso = at.to_rfc3339_opts(SecondsFormat::Millis, true);
    format!("AUTO_{}", iso.replace(|c: char| c == ':' || c == '.', ""))
}

/// Elapsed seconds rounded to two decimals; 0 without a start.
fn duration_seconds(started_at: Option<DateTime<Utc>>, finished_at: DateTime<Utc>) -> f64 {
    let Some(started_at) = started_at else {
        return 0.0;
    };
    let millis = (finished_at - started_at).num_milliseconds().max(0);
    (millis as f64 / 10.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use chrono::{Duration, TimeZone};

    fn placed(name: &str, tag: Tag) -> PlacedItem {
        PlacedItem {
            id: format!("{}-id", name),
            name: name.to_string(),
            rfid_tag: tag,
            x: 100.0,
            y: 100.0,
            size: 20.0,
            detected: true,
        }
    }

    fn confirmed(lines: &[(&str, i64)]) -> OrderLedger {
        let mut order = OrderLedger::new();
        for (name, qty) in lines {
            order.add(name, *qty).unwrap();
        }
        order.confirm(&Catalog::builtin()).unwrap();
        order
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap() + Duration::milliseconds(123)
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(classify(1, 1), VerificationStatus::Mismatch);
        assert_eq!(classify(1, 0), VerificationStatus::Mismatch);
        assert_eq!(classify(0, 2), VerificationStatus::Caution);
        assert_eq!(classify(0, 0), VerificationStatus::Success);
    }

    #[test]
    fn test_auto_order_id_format() {
        assert_eq!(auto_order_id(fixed_time()), "AUTO_2024-03-05T140709123Z");
    }

    #[test]
    fn test_duration_rounding() {
        let end = fixed_time();
        assert_eq!(duration_seconds(None, end), 0.0);
        assert_eq!(
            duration_seconds(Some(end - Duration::milliseconds(19_876)), end),
            19.88
        );
        assert_eq!(duration_seconds(Some(end + Duration::seconds(1)), end), 0.0);
    }

    #[test]
    fn test_success_when_sets_match() {
        let order = confirmed(&[("Widget", 2)]);
        let items = vec![
            placed("Widget", Tag::new("CUSTOM-WIDGET", 1)),
            placed("Widget", Tag::new("CUSTOM-WIDGET", 2)),
        ];
        let detected: DetectedTagSet = items.iter().map(|i| i.rfid_tag.clone()).collect();

        let report = reconcile(ReconcileInput {
            order: &order,
            placed: &items,
            detected: &detected,
            started_at: None,
            finished_at: fixed_time(),
        });

        assert_eq!(report.verification_status, VerificationStatus::Success);
        assert!(report.missing_items_detail.is_empty());
        assert!(report.extra_items_detail.is_empty());
        assert_eq!(report.detected_items.get("Widget"), Some(&2));
        assert_eq!(report.metrics.expected_items_count, 2);
        assert!(report.order_id.starts_with("AUTO_"));
    }

    #[test]
    fn test_missing_and_extra_breakdowns() {
        let order = confirmed(&[("Widget", 1), ("Power Bank", 1)]);
        let items = vec![
            placed("Widget", Tag::new("CUSTOM-WIDGET", 1)),
            placed("Gadget", Tag::new("CUSTOM-GADGET", 1)),
        ];
        let detected: DetectedTagSet = items.iter().map(|i| i.rfid_tag.clone()).collect();

        let report = reconcile(ReconcileInput {
            order: &order,
            placed: &items,
            detected: &detected,
            started_at: Some(fixed_time() - Duration::seconds(3)),
            finished_at: fixed_time(),
        });

        assert_eq!(report.verification_status, VerificationStatus::Mismatch);
        assert_eq!(report.missing_items_detail.get("Power Bank"), Some(&1));
        assert_eq!(report.extra_items_detail.get("Gadget"), Some(&1));
        assert_eq!(report.metrics.missing_items_count, 1);
        assert_eq!(report.metrics.extra_items_count, 1);
        assert_eq!(report.scan_duration_seconds, 3.0);
    }

    #[test]
    fn test_unresolvable_extra_is_counted_but_skipped() {
        let order = confirmed(&[("Widget", 1)]);
        let items = vec![placed("Widget", Tag::new("CUSTOM-WIDGET", 1))];
        let mut detected: DetectedTagSet = items.iter().map(|i| i.rfid_tag.clone()).collect();
        detected.insert(Tag::new("GHOST", 1));

        let report = reconcile(ReconcileInput {
            order: &order,
            placed: &items,
            detected: &detected,
            started_at: None,
            finished_at: fixed_time(),
        });

        assert_eq!(report.verification_status, VerificationStatus::Caution);
        assert_eq!(report.metrics.extra_items_count, 1);
        assert!(report.extra_items_detail.is_empty());
        assert_eq!(report.detected_items.len(), 1);
    }

    #[test]
    fn test_operator_order_id_is_used() {
        let mut order = OrderLedger::new();
        order.set_order_id(Some(" ORD-42 ")).unwrap();
        order.set_order_name(Some("Morning batch")).unwrap();
        order.add("Widget", 1).unwrap();
        order.confirm(&Catalog::builtin()).unwrap();

        let report = reconcile(ReconcileInput {
            order: &order,
            placed: &[],
            detected: &DetectedTagSet::new(),
            started_at: None,
            finished_at: fixed_time(),
        });

        assert_eq!(report.order_id, "ORD-42");
        assert_eq!(report.order_name.as_deref(), Some("Morning batch"));
        assert_eq!(report.export_file_name(), "verification_report_ORD-42.json");
    }

    #[test]
    fn test_export_file_name_strips_path_separators() {
        let mut order = OrderLedger::new();
        order.set_order_id(Some("../etc/x\\y")).unwrap();
        order.add("Widget", 1).unwrap();
        order.confirm(&Catalog::builtin()).unwrap();

        let report = reconcile(ReconcileInput {
            order: &order,
            placed: &[],
            detected: &DetectedTagSet::new(),
            started_at: None,
            finished_at: fixed_time(),
        });

        assert_eq!(report.order_id, "../etc/x\\y");
        assert_eq!(
            report.export_file_name(),
            "verification_report_.._etc_x_y.json"
        );
    }
}
