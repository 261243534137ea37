//! # Order Ledger
//!
//! Holds the expected-item multiset and turns it into the immutable
//! [`ExpectedTagSet`] when the order is confirmed.
//!
//! ## Ledger Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐  add_to_cart   ┌──────────┐  confirm   ┌──────────────┐   │
//! │  │  Empty   │──────────────►│ Building │──────────►│  Confirmed   │   │
//! │  └──────────┘◄──────────────└──────────┘           │  (locked)    │   │
//! │                clear_cart                            └──────┬───────┘   │
//! │                                                             │           │
//! │        ◄────────────────── reset (full session) ────────────┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::identity::{next_tag, BaseIdentifierSource, TagCounter};
use crate::types::{ItemCounts, Tag};
use crate::validation::{validate_item_name, validate_order_field, validate_quantity};

// =============================================================================
// Expected Tag Set
// =============================================================================

/// Tags the package must contain, plus the tag → name reverse mapping.
///
/// Built once at confirmation; there is no way to mutate it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedTagSet {
    tags: BTreeSet<Tag>,
    names: HashMap<Tag, String>,
}

impl ExpectedTagSet {
    /// One pass over the order, expected-scope ordinals per name.
    pub fn build<S>(lines: &[String], source: &S) -> Self
    where
        S: BaseIdentifierSource + ?Sized,
    {
        let mut counter = TagCounter::new();
        let mut set = ExpectedTagSet::default();

        for name in lines {
            let tag = next_tag(source, name, &mut counter);
            if !set.tags.insert(tag.clone()) {
                // Two distinct custom names can normalize to the same base
                warn!(tag = %tag, name = %name, "Expected tag collision");
            }
            set.names.insert(tag, name.clone());
        }

        set
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Item name recorded for an expected tag.
    pub fn name_of(&self, tag: &Tag) -> Option<&str> {
        self.names.get(tag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

// =============================================================================
// Line Progress
// =============================================================================

/// How much of one ordered name has been detected so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ProgressStatus {
    /// Nothing detected yet.
    Pending,
    /// Some but not all units detected.
    Partial,
    /// At least the required count detected.
    Detected,
}

/// Required vs detected units for one ordered name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineProgress {
    pub name: String,
    pub required: usize,
    pub detected: usize,
    pub status: ProgressStatus,
}

// =============================================================================
// Order Ledger
// =============================================================================

/// The customer order: one line per unit, duplicates allowed.
#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    lines: Vec<String>,
    confirmed: bool,
    expected: ExpectedTagSet,
    order_id: Option<String>,
    order_name: Option<String>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `quantity` copies of `name`.
    ///
    /// ## Errors
    /// - `OrderLocked` once confirmed
    /// - `Validation` for a blank name or a quantity outside 1..=99
    pub fn add(&mut self, name: &str, quantity: i64) -> CoreResult<()> {
        self.ensure_unlocked()?;
        let quantity = validate_quantity(quantity)?;
        let name = validate_item_name(name)?;

        self.lines.extend(std::iter::repeat(name).take(quantity as usize));
        Ok(())
    }

    /// Empties the order.
    pub fn clear(&mut self) -> CoreResult<()> {
        self.ensure_unlocked()?;
        self.lines.clear();
        Ok(())
    }

    /// Locks the order and derives its expected tags.
    ///
    /// ## Errors
    /// - `EmptyOrder` when there are no lines (nothing changes)
    /// - `OrderLocked` when already confirmed
    pub fn confirm<S>(&mut self, source: &S) -> CoreResult<&ExpectedTagSet>
    where
        S: BaseIdentifierSource + ?Sized,
    {
        self.ensure_unlocked()?;
        if self.lines.is_empty() {
            return Err(CoreError::EmptyOrder);
        }

        self.confirmed = true;
        self.expected = ExpectedTagSet::build(&self.lines, source);
        Ok(&self.expected)
    }

    /// Sets the operator's order id; `None` falls back to an `AUTO_` id.
    pub fn set_order_id(&mut self, order_id: Option<&str>) -> CoreResult<()> {
        self.ensure_unlocked()?;
        self.order_id = order_id
            .map(|id| validate_order_field("order id", id))
            .transpose()?;
        Ok(())
    }

    pub fn set_order_name(&mut self, order_name: Option<&str>) -> CoreResult<()> {
        self.ensure_unlocked()?;
        self.order_name = order_name
            .map(|name| validate_order_field("order name", name))
            .transpose()?;
        Ok(())
    }

    fn ensure_unlocked(&self) -> CoreResult<()> {
        if self.confirmed {
            return Err(CoreError::OrderLocked);
        }
        Ok(())
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Empty until the order is confirmed.
    pub fn expected(&self) -> &ExpectedTagSet {
        &self.expected
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn order_name(&self) -> Option<&str> {
        self.order_name.as_deref()
    }

    /// True when `name` appears in the order.
    pub fn contains(&self, name: &str) -> bool {
        self.lines.iter().any(|line| line == name)
    }

    /// Units required per name.
    pub fn required_counts(&self) -> ItemCounts {
        count_names(self.lines.iter().map(String::as_str))
    }

    /// Per-name progress against the detected counts.
    pub fn progress(&self, detected: &ItemCounts) -> Vec<LineProgress> {
        self.required_counts()
            .into_iter()
            .map(|(name, required)| {
                let detected = detected.get(&name).copied().unwrap_or(0);
                let status = if detected == 0 {
                    ProgressStatus::Pending
                } else if detected < required {
                    ProgressStatus::Partial
                } else {
                    ProgressStatus::Detected
                };
                LineProgress {
                    name,
                    required,
                    detected,
                    status,
                }
            })
            .collect()
    }
}

/// Occurrences per name.
pub fn count_names<'a, I>(names: I) -> ItemCounts
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = ItemCounts::new();
    for name in names {
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }
    counts
}
