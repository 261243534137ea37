//! # Domain Types
//!
//! Core domain types used throughout TagCheck.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │      Tag        │   │   PlacedItem    │   │      Scanner        │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  "RFID_PB_H9J2  │   │  id, name       │   │  x, y               │   │
//! │  │        -2"      │   │  rfid_tag       │   │  range              │   │
//! │  │                 │   │  x, y, size     │   │  active             │   │
//! │  │                 │   │  detected       │   │                     │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │ PackageBounds   │   │ ScanState       │   │ VerificationReport  │   │
//! │  │  (50,50)-       │   │  Idle           │   │  status, metrics,   │   │
//! │  │   (700,650)     │   │  Scanning       │   │  4 name→count maps  │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Tag
// =============================================================================

/// A simulated RFID tag: `{base_identifier}-{ordinal}`.
///
/// Ordered so tag sets iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Tag(String);

impl Tag {
    /// Builds a tag from its base identifier and 1-based ordinal.
    pub fn new(base_identifier: &str, ordinal: u32) -> Self {
        Tag(format!("{}-{}", base_identifier, ordinal))
    }

    /// Returns the tag text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// A position on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The package region on the surface; the sweep rasterizes this rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PackageBounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl PackageBounds {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        PackageBounds { x1, y1, x2, y2 }
    }

    /// True when the point lies inside the region, edges included.
    ///
    /// The placement store does not call this; boundary enforcement belongs
    /// to whoever translates clicks into placement requests.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }

    /// Top-left corner, where every sweep starts.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

impl Default for PackageBounds {
    fn default() -> Self {
        PackageBounds::new(50.0, 50.0, 700.0, 650.0)
    }
}

// =============================================================================
// Placed Item
// =============================================================================

/// An item instance sitting on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PlacedItem {
    /// `{catalog id}-{n}` or `custom-{name}-{n}`.
    pub id: String,
    pub name: String,
    pub rfid_tag: Tag,
    pub x: f64,
    pub y: f64,
    /// Edge length of the drawn square.
    pub size: f64,
    /// Set once by the proximity test, never cleared.
    pub detected: bool,
}

impl PlacedItem {
    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// =============================================================================
// Scanner
// =============================================================================

/// The simulated reader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Scanner {
    pub x: f64,
    pub y: f64,
    /// Detection radius in surface units.
    pub range: f64,
    /// True only while a scan session is running.
    pub active: bool,
}

impl Scanner {
    /// A resting scanner at `home` with the given range.
    pub fn at_rest(home: Point, range: f64) -> Self {
        Scanner {
            x: home.x,
            y: home.y,
            range,
            active: false,
        }
    }

    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// =============================================================================
// Scan State
// =============================================================================

/// Scan sweep state machine: `Idle → Scanning → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
}

// =============================================================================
// Verification Report
// =============================================================================

/// Result classification, first match wins: missing → extra → success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum VerificationStatus {
    /// Every expected tag was seen and nothing else.
    Success,
    /// At least one expected tag was never detected.
    Mismatch,
    /// Nothing missing, but unordered tags were detected.
    Caution,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationStatus::Success => write!(f, "SUCCESS"),
            VerificationStatus::Mismatch => write!(f, "MISMATCH"),
            VerificationStatus::Caution => write!(f, "CAUTION"),
        }
    }
}

/// Count metrics carried by every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ScanMetrics {
    pub expected_items_count: usize,
    pub placed_items_count: usize,
    pub detected_items_count: usize,
    pub missing_items_count: usize,
    pub extra_items_count: usize,
}

/// Name → count breakdown, ordered by name.
pub type ItemCounts = BTreeMap<String, usize>;

/// Snapshot produced by one finalize call. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VerificationReport {
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_name: Option<String>,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub verification_status: VerificationStatus,
    /// Rounded to two decimals.
    pub scan_duration_seconds: f64,
    pub metrics: ScanMetrics,
    pub expected_items: ItemCounts,
    pub detected_items: ItemCounts,
    pub missing_items_detail: ItemCounts,
    pub extra_items_detail: ItemCounts,
}

impl VerificationReport {
    /// Default export file name used by front-ends.
    ///
    /// Always a single path component: anything outside `[A-Za-z0-9._-]`
    /// in the order id becomes `_`.
    pub fn export_file_name(&self) -> String {
        let id: String = self
            .order_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("verification_report_{}.json", id)
    }

    /// Pretty JSON, the format front-ends download.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
