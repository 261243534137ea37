//! # Placement Store
//!
//! Owns the item instances placed on the surface. Items are only ever
//! appended or cleared in bulk; the `detected` flag is flipped exclusively
//! through [`crate::detection::try_detect`].

use crate::error::{CoreError, CoreResult};
use crate::identity::{next_identity, BaseIdentifierSource, TagCounter};
use crate::ledger::count_names;
use crate::types::{ItemCounts, PlacedItem, Tag};
use crate::validation::validate_item_name;

/// Placed items plus the placement-scope counter and current selection.
#[derive(Debug, Clone, Default)]
pub struct PlacementStore {
    items: Vec<PlacedItem>,
    counter: TagCounter,
    selected: Option<String>,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the next placement with `name`.
    pub fn select(&mut self, name: &str) -> CoreResult<()> {
        self.selected = Some(validate_item_name(name)?);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Places the selected item at `(x, y)`.
    ///
    /// Coordinates are taken as given. On success the selection is cleared,
    /// so every placement needs a fresh `select`.
    ///
    /// ## Errors
    /// - `OrderNotConfirmed` before confirmation
    /// - `NoItemSelected` when nothing is armed
    pub fn place<S>(
        &mut self,
        order_confirmed: bool,
        source: &S,
        x: f64,
        y: f64,
        size: f64,
    ) -> CoreResult<PlacedItem>
    where
        S: BaseIdentifierSource + ?Sized,
    {
        if !order_confirmed {
            return Err(CoreError::OrderNotConfirmed);
        }
        let name = self.selected.take().ok_or(CoreError::NoItemSelected)?;

        let identity = next_identity(source, &name, &mut self.counter);
        let item = PlacedItem {
            id: identity.id,
            name,
            rfid_tag: identity.tag,
            x,
            y,
            size,
            detected: false,
        };

        self.items.push(item.clone());
        Ok(item)
    }

    /// Drops every item and restarts placement ordinals at 1.
    pub fn clear(&mut self) {
        self.items.clear();
        self.counter.clear();
        self.selected = None;
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [PlacedItem] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_by_tag(&self, tag: &Tag) -> Option<&PlacedItem> {
        self.items.iter().find(|item| &item.rfid_tag == tag)
    }

    /// Per-name counts of items already detected.
    pub fn detected_counts(&self) -> ItemCounts {
        count_names(
            self.items
                .iter()
                .filter(|item| item.detected)
                .map(|item| item.name.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::collections::HashSet;

    fn place_named(store: &mut PlacementStore, name: &str, x: f64) -> PlacedItem {
        store.select(name).unwrap();
        store
            .place(true, &Catalog::builtin(), x, 100.0, crate::ITEM_SIZE)
            .unwrap()
    }

    #[test]
    fn test_place_requires_confirmed_order() {
        let mut store = PlacementStore::new();
        store.select("Widget").unwrap();
        let err = store
            .place(false, &Catalog::builtin(), 10.0, 10.0, crate::ITEM_SIZE)
            .unwrap_err();
        assert_eq!(err, CoreError::OrderNotConfirmed);
        assert!(store.is_empty());
        assert_eq!(store.selected(), Some("Widget"));
    }

    #[test]
    fn test_place_requires_selection() {
        let mut store = PlacementStore::new();
        let err = store
            .place(true, &Catalog::builtin(), 10.0, 10.0, crate::ITEM_SIZE)
            .unwrap_err();
        assert_eq!(err, CoreError::NoItemSelected);
    }

    #[test]
    fn test_place_clears_selection() {
        let mut store = PlacementStore::new();
        let item = place_named(&mut store, "Power Bank", 120.0);
        assert_eq!(item.rfid_tag.as_str(), "RFID_PB_H9J2-1");
        assert_eq!(item.id, "power-bank-1");
        assert!(!item.detected);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_repeated_names_get_unique_tags() {
        let mut store = PlacementStore::new();
        for i in 0..5 {
            place_named(&mut store, "Widget", 60.0 + i as f64);
        }
        place_named(&mut store, "Gadget", 80.0);

        let tags: HashSet<_> = store.items().iter().map(|i| i.rfid_tag.clone()).collect();
        assert_eq!(tags.len(), store.len());
    }

    #[test]
    fn test_clear_restarts_ordinals() {
        let mut store = PlacementStore::new();
        place_named(&mut store, "Widget", 60.0);
        place_named(&mut store, "Widget", 70.0);
        store.clear();
        assert!(store.is_empty());

        let item = place_named(&mut store, "Widget", 60.0);
        assert_eq!(item.rfid_tag.as_str(), "CUSTOM-WIDGET-1");
    }
}
