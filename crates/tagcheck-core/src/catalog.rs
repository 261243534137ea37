//! # Catalog
//!
//! Static name → RFID code table. Names not found here are "custom" items
//! and get a derived base identifier (see [`crate::identity`]).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::identity::BaseIdentifierSource;

/// One catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogEntry {
    /// Stable slug, used as the prefix of placed item ids.
    pub id: String,
    /// Display name; this is the lookup key.
    pub name: String,
    /// Base RFID code.
    pub rfid: String,
}

impl CatalogEntry {
    pub fn new(id: &str, name: &str, rfid: &str) -> Self {
        CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            rfid: rfid.to_string(),
        }
    }
}

/// Lookup table of known products. Exact, case-sensitive name match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Catalog { entries }
    }

    /// The product table the simulator ships with.
    pub fn builtin() -> Self {
        Catalog::new(vec![
            CatalogEntry::new("bluetooth-headphones", "Bluetooth Headphones", "RFID_BH_9X01"),
            CatalogEntry::new("usbc-cable", "USB-C Cable", "RFID_USBC_2A8X"),
            CatalogEntry::new("phone-case", "Phone Case", "RFID_PC_4Y3Z"),
            CatalogEntry::new("charging-dock", "Charging Dock", "RFID_CD_A7V1"),
            CatalogEntry::new("screen-protector", "Screen Protector", "RFID_SP_E2W3"),
            CatalogEntry::new("wireless-charger", "Wireless Charger", "RFID_WC_G5T6"),
            CatalogEntry::new("power-bank", "Power Bank", "RFID_PB_H9J2"),
            CatalogEntry::new("bonus-keychain", "Bonus Item (Keychain)", "RFID_BI_F8C9"),
        ])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

impl BaseIdentifierSource for Catalog {
    fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}
