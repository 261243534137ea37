//! # Scan Configuration
//!
//! Geometry, timing and catalog settings for the scan engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TAGCHECK_SCAN_RANGE=120                                            │
//! │     TAGCHECK_TICK_MS=20                                                │
//! │     TAGCHECK_SETTLE_MS=500                                             │
//! │     TAGCHECK_SWEEP_STEP=50                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tagcheck/scan.toml (Linux)                               │
//! │     ~/Library/Application Support/com.tagcheck.tagcheck/scan.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     range 80, step 25, tick 50 ms, settle 1000 ms                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scan.toml
//! [scanner]
//! range = 80.0
//! home_x = 100.0
//! home_y = 100.0
//!
//! [sweep]
//! step = 25.0
//! tick_ms = 50
//! settle_ms = 1000
//!
//! [package]
//! x1 = 50.0
//! y1 = 50.0
//! x2 = 700.0
//! y2 = 650.0
//! item_size = 20.0
//!
//! # Optional: replaces the built-in catalog
//! [[catalog]]
//! id = "power-bank"
//! name = "Power Bank"
//! rfid = "RFID_PB_H9J2"
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tagcheck_core::validation::validate_scan_range;
use tagcheck_core::{
    Catalog, CatalogEntry, PackageBounds, Point, SessionSettings, DEFAULT_SCAN_RANGE,
    DEFAULT_SWEEP_STEP, ITEM_SIZE, SCANNER_HOME,
};

use crate::error::{ScanError, ScanResult};

// =============================================================================
// Scanner Settings
// =============================================================================

/// Scanner defaults applied on every reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerSettings {
    /// Detection radius (20-200).
    #[serde(default = "default_range")]
    pub range: f64,

    /// Rest position.
    #[serde(default = "default_home_x")]
    pub home_x: f64,

    #[serde(default = "default_home_y")]
    pub home_y: f64,
}

fn default_range() -> f64 {
    DEFAULT_SCAN_RANGE
}

fn default_home_x() -> f64 {
    SCANNER_HOME.x
}

fn default_home_y() -> f64 {
    SCANNER_HOME.y
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            range: default_range(),
            home_x: default_home_x(),
            home_y: default_home_y(),
        }
    }
}

// =============================================================================
// Sweep Settings
// =============================================================================

/// Automatic sweep pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Horizontal distance per tick.
    #[serde(default = "default_step")]
    pub step: f64,

    /// Milliseconds between ticks.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Milliseconds between the last tick and the automatic finalize.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_step() -> f64 {
    DEFAULT_SWEEP_STEP
}

fn default_tick_ms() -> u64 {
    50
}

fn default_settle_ms() -> u64 {
    1000
}

impl Default for SweepSettings {
    fn default() -> Self {
        SweepSettings {
            step: default_step(),
            tick_ms: default_tick_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

// =============================================================================
// Package Settings
// =============================================================================

/// The package region and drawn item size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSettings {
    #[serde(default = "default_x1")]
    pub x1: f64,
    #[serde(default = "default_y1")]
    pub y1: f64,
    #[serde(default = "default_x2")]
    pub x2: f64,
    #[serde(default = "default_y2")]
    pub y2: f64,

    #[serde(default = "default_item_size")]
    pub item_size: f64,
}

fn default_x1() -> f64 {
    PackageBounds::default().x1
}

fn default_y1() -> f64 {
    PackageBounds::default().y1
}

fn default_x2() -> f64 {
    PackageBounds::default().x2
}

fn default_y2() -> f64 {
    PackageBounds::default().y2
}

fn default_item_size() -> f64 {
    ITEM_SIZE
}

impl Default for PackageSettings {
    fn default() -> Self {
        PackageSettings {
            x1: default_x1(),
            y1: default_y1(),
            x2: default_x2(),
            y2: default_y2(),
            item_size: default_item_size(),
        }
    }
}

impl PackageSettings {
    pub fn bounds(&self) -> PackageBounds {
        PackageBounds::new(self.x1, self.y1, self.x2, self.y2)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete scan engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub sweep: SweepSettings,

    #[serde(default)]
    pub package: PackageSettings,

    /// Catalog override; empty means the built-in catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog: Vec<CatalogEntry>,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (scan.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ScanResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading scan config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load scan config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document without touching the environment.
    pub fn from_toml(contents: &str) -> ScanResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ScanResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ScanError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Scan config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ScanResult<()> {
        validate_scan_range(self.scanner.range)
            .map_err(|e| ScanError::InvalidConfig(format!("scanner.{}", e)))?;

        if !(self.sweep.step.is_finite() && self.sweep.step > 0.0) {
            return Err(ScanError::InvalidConfig(
                "sweep.step must be greater than 0".into(),
            ));
        }

        if self.sweep.tick_ms == 0 {
            return Err(ScanError::InvalidConfig(
                "sweep.tick_ms must be greater than 0".into(),
            ));
        }

        let p = &self.package;
        if !(p.x1 < p.x2 && p.y1 < p.y2) {
            return Err(ScanError::InvalidConfig(format!(
                "package region ({}, {})-({}, {}) is empty",
                p.x1, p.y1, p.x2, p.y2
            )));
        }

        if !(p.item_size.is_finite() && p.item_size > 0.0) {
            return Err(ScanError::InvalidConfig(
                "package.item_size must be greater than 0".into(),
            ));
        }

        let mut names = HashSet::new();
        for entry in &self.catalog {
            let blank = [&entry.id, &entry.name, &entry.rfid]
                .iter()
                .any(|field| field.trim().is_empty());
            if blank {
                return Err(ScanError::InvalidConfig(
                    "catalog entries need an id, a name and an rfid".into(),
                ));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(ScanError::InvalidConfig(format!(
                    "duplicate catalog name: {}",
                    entry.name
                )));
            }
        }

        Ok(())
    }

    /// Applies `TAGCHECK_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(range) = parse_override::<f64>(&lookup, "TAGCHECK_SCAN_RANGE") {
            debug!(range, "Overriding scan range from environment");
            self.scanner.range = range;
        }

        if let Some(tick_ms) = parse_override::<u64>(&lookup, "TAGCHECK_TICK_MS") {
            debug!(tick_ms, "Overriding tick interval from environment");
            self.sweep.tick_ms = tick_ms;
        }

        if let Some(settle_ms) = parse_override::<u64>(&lookup, "TAGCHECK_SETTLE_MS") {
            debug!(settle_ms, "Overriding settle delay from environment");
            self.sweep.settle_ms = settle_ms;
        }

        if let Some(step) = parse_override::<f64>(&lookup, "TAGCHECK_SWEEP_STEP") {
            debug!(step, "Overriding sweep step from environment");
            self.sweep.step = step;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tagcheck", "tagcheck")
            .map(|dirs| dirs.config_dir().join("scan.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Session geometry and defaults.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            bounds: self.package.bounds(),
            scanner_home: Point::new(self.scanner.home_x, self.scanner.home_y),
            default_range: self.scanner.range,
            sweep_step: self.sweep.step,
            item_size: self.package.item_size,
        }
    }

    /// Configured catalog, or the built-in one.
    pub fn catalog(&self) -> Catalog {
        if self.catalog.is_empty() {
            Catalog::builtin()
        } else {
            Catalog::new(self.catalog.clone())
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.sweep.tick_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.sweep.settle_ms)
    }
}

fn parse_override<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable config override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.scanner.range, 80.0);
        assert_eq!(config.sweep.step, 25.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
        assert_eq!(config.settle_delay(), Duration::from_millis(1000));
        assert_eq!(config.session_settings(), SessionSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScanConfig::from_toml("[sweep]\ntick_ms = 10\n").unwrap();
        assert_eq!(config.sweep.tick_ms, 10);
        assert_eq!(config.sweep.settle_ms, 1000);
        assert_eq!(config.package, PackageSettings::default());
    }

    #[test]
    fn test_catalog_override() {
        let toml_str = r#"
            [[catalog]]
            id = "mug"
            name = "Mug"
            rfid = "RFID_MUG_0001"
        "#;
        let config = ScanConfig::from_toml(toml_str).unwrap();
        assert!(config.validate().is_ok());

        let catalog = config.catalog();
        assert_eq!(catalog.entries().len(), 1);
        assert_eq!(catalog.entries()[0].rfid, "RFID_MUG_0001");
    }

    #[test]
    fn test_config_validation() {
        let mut config = ScanConfig::default();

        config.scanner.range = 500.0;
        assert!(config.validate().unwrap_err().is_config_error());
        config.scanner.range = 80.0;

        config.sweep.step = 0.0;
        assert!(config.validate().is_err());
        config.sweep.step = 25.0;

        config.sweep.tick_ms = 0;
        assert!(config.validate().is_err());
        config.sweep.tick_ms = 50;

        config.package.x2 = config.package.x1;
        assert!(config.validate().is_err());
        config.package = PackageSettings::default();

        config.catalog = vec![
            CatalogEntry::new("a", "Mug", "R1"),
            CatalogEntry::new("b", "Mug", "R2"),
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TAGCHECK_SCAN_RANGE", "120"),
            ("TAGCHECK_TICK_MS", "5"),
            ("TAGCHECK_SWEEP_STEP", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = ScanConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.scanner.range, 120.0);
        assert_eq!(config.sweep.tick_ms, 5);
        assert_eq!(config.sweep.settle_ms, 1000);
        assert_eq!(config.sweep.step, 25.0);
    }

    #[test]
    fn test_toml_serialization() {
        let config = ScanConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[sweep]"));
        assert!(!toml_str.contains("[[catalog]]"));
        assert_eq!(ScanConfig::from_toml(&toml_str).unwrap(), config);
    }
}
