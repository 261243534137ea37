//! # Identity Generator
//!
//! Derives the unique tag for each ordered or placed item instance.
//!
//! ## Tag Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  name ──► BaseIdentifierSource ──► base ──┐                             │
//! │                                            ├──► "{base}-{ordinal}"      │
//! │  name ──► TagCounter (one per scope) ──► n ┘                            │
//! │                                                                         │
//! │  "Power Bank"      (catalog)  ──► RFID_PB_H9J2-1, RFID_PB_H9J2-2, ...   │
//! │  "gift card  box"  (custom)   ──► CUSTOM-GIFT-CARD-BOX-1                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two scopes exist and never share a counter: the expected scope, rebuilt
//! in one pass at order confirmation, and the placement scope, bumped on
//! every placement. A placed tag equals its expected twin only when items of
//! that name are placed in the same order they were declared.

use std::collections::HashMap;

use crate::catalog::CatalogEntry;
use crate::types::Tag;

/// Prefix for base identifiers of names missing from the catalog.
pub const CUSTOM_PREFIX: &str = "CUSTOM-";

/// Characters of the normalized name kept in a custom base identifier.
pub const CUSTOM_NAME_MAX_CHARS: usize = 20;

// =============================================================================
// Base Identifier Source
// =============================================================================

/// Where base identifiers come from.
///
/// Only `lookup` is required; the derivation for names outside the source
/// is shared by every implementation.
pub trait BaseIdentifierSource {
    /// Returns the catalog entry for `name`, if there is one.
    fn lookup(&self, name: &str) -> Option<&CatalogEntry>;

    /// Catalog RFID code, or the derived `CUSTOM-` code.
    fn base_identifier(&self, name: &str) -> String {
        match self.lookup(name) {
            Some(entry) => entry.rfid.clone(),
            None => custom_base_identifier(name),
        }
    }

    /// Prefix for placed item ids: catalog id or `custom-{slug}`.
    fn item_id_base(&self, name: &str) -> String {
        match self.lookup(name) {
            Some(entry) => entry.id.clone(),
            None => format!("custom-{}", dash_whitespace(&name.to_lowercase())),
        }
    }
}

/// `CUSTOM-` + uppercased name, whitespace runs → `-`, cut to 20 chars.
pub fn custom_base_identifier(name: &str) -> String {
    let normalized: String = dash_whitespace(&name.to_uppercase())
        .chars()
        .take(CUSTOM_NAME_MAX_CHARS)
        .collect();
    format!("{}{}", CUSTOM_PREFIX, normalized)
}

/// Replaces every run of whitespace with a single dash.
fn dash_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push('-');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

// =============================================================================
// Counter Scope
// =============================================================================

/// Per-name running ordinal for one counter scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCounter {
    counts: HashMap<String, u32>,
}

impl TagCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more occurrence of `name` and returns its 1-based ordinal.
    pub fn next_ordinal(&mut self, name: &str) -> u32 {
        let count = self.counts.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Occurrences recorded so far.
    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Identity assigned to one item instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemIdentity {
    pub id: String,
    pub tag: Tag,
    pub ordinal: u32,
}

/// Derives the next tag for `name` in `counter`'s scope.
pub fn next_tag<S>(source: &S, name: &str, counter: &mut TagCounter) -> Tag
where
    S: BaseIdentifierSource + ?Sized,
{
    next_identity(source, name, counter).tag
}

/// Derives the next tag and the matching item id for `name`.
pub fn next_identity<S>(source: &S, name: &str, counter: &mut TagCounter) -> ItemIdentity
where
    S: BaseIdentifierSource + ?Sized,
{
    let ordinal = counter.next_ordinal(name);
    ItemIdentity {
        id: format!("{}-{}", source.item_id_base(name), ordinal),
        tag: Tag::new(&source.base_identifier(name), ordinal),
        ordinal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_catalog_tag_ordinals() {
        let catalog = Catalog::builtin();
        let mut counter = TagCounter::new();
        assert_eq!(next_tag(&catalog, "Power Bank", &mut counter).as_str(), "RFID_PB_H9J2-1");
        assert_eq!(next_tag(&catalog, "Power Bank", &mut counter).as_str(), "RFID_PB_H9J2-2");
        assert_eq!(next_tag(&catalog, "Phone Case", &mut counter).as_str(), "RFID_PC_4Y3Z-1");
    }

    #[test]
    fn test_custom_base_identifier() {
        assert_eq!(custom_base_identifier("Widget"), "CUSTOM-WIDGET");
        assert_eq!(custom_base_identifier("gift  card\tbox"), "CUSTOM-GIFT-CARD-BOX");
    }

    #[test]
    fn test_custom_base_identifier_truncates_after_dashing() {
        // 26 chars after normalization, only the first 20 survive
        let base = custom_base_identifier("extra long product name xy");
        assert_eq!(base, "CUSTOM-EXTRA-LONG-PRODUCT-N");
        assert_eq!(base.len(), CUSTOM_PREFIX.len() + CUSTOM_NAME_MAX_CHARS);
    }

    #[test]
    fn test_item_ids() {
        let catalog = Catalog::builtin();
        let mut counter = TagCounter::new();
        let first = next_identity(&catalog, "USB-C Cable", &mut counter);
        assert_eq!(first.id, "usbc-cable-1");

        let custom = next_identity(&catalog, "Gift Card Holder Deluxe", &mut counter);
        assert_eq!(custom.id, "custom-gift-card-holder-deluxe-1");
        assert_eq!(custom.tag.as_str(), "CUSTOM-GIFT-CARD-HOLDER-DEL-1");
    }

    #[test]
    fn test_scopes_are_independent() {
        let catalog = Catalog::builtin();
        let mut expected = TagCounter::new();
        let mut placement = TagCounter::new();
        next_tag(&catalog, "Widget", &mut expected);
        next_tag(&catalog, "Widget", &mut expected);
        assert_eq!(next_tag(&catalog, "Widget", &mut placement).as_str(), "CUSTOM-WIDGET-1");
        assert_eq!(expected.count("Widget"), 2);
        assert_eq!(placement.count("Widget"), 1);
    }
}
