//! # Proximity Detection
//!
//! The single mutation entry point shared by the automatic sweep and manual
//! scanner moves.
//!
//! ## Detection Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │         .  -  ~  -  .            for each item with detected == false: │
//! │      '       range     '           if |item - scanner| <= range:       │
//! │     |    ■     ●────────|             item.detected = true             │
//! │      .     item  scanner.             detected_tags.insert(item.tag)   │
//! │         '  -  ~  -  '                                                  │
//! │                                                                         │
//! │  Monotonic: nothing here ever clears a flag or removes a tag.          │
//! │  Path-independent: the outcome depends only on the set of positions    │
//! │  visited (and the range at each visit), never on their order.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use crate::types::{PlacedItem, Point, Tag};

/// Tags detected during a scan session. Grows only; cleared by full reset.
pub type DetectedTagSet = BTreeSet<Tag>;

/// Runs one proximity pass at `at` and returns the newly detected tags.
pub fn try_detect(
    items: &mut [PlacedItem],
    detected: &mut DetectedTagSet,
    at: Point,
    range: f64,
) -> Vec<Tag> {
    let mut newly = Vec::new();

    for item in items.iter_mut().filter(|item| !item.detected) {
        if item.position().distance_to(at) <= range {
            item.detected = true;
            detected.insert(item.rfid_tag.clone());
            newly.push(item.rfid_tag.clone());
        }
    }

    newly
}
