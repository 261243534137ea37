//! # Scripted Verification Runs
//!
//! Canned orders and package layouts that exercise each verification
//! outcome against the built-in catalog.
//!
//! ```text
//!   success   every ordered item on the sweep path
//!   mismatch  one Phone Case left beside the package, never scanned
//!   caution   everything ordered plus an unordered keychain
//! ```

use clap::ValueEnum;
use tagcheck_core::VerificationReport;
use tagcheck_scan::{ScanEngine, ScanResult};
use tracing::info;

/// Which outcome the scripted run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    Success,
    #[value(alias = "missing")]
    Mismatch,
    #[value(alias = "extra")]
    Caution,
}

const ORDER: &[(&str, i64)] = &[("Power Bank", 2), ("Phone Case", 1)];

const ON_PATH: &[(&str, f64, f64)] = &[
    ("Power Bank", 150.0, 160.0),
    ("Power Bank", 480.0, 300.0),
    ("Phone Case", 600.0, 520.0),
];

impl Scenario {
    /// Items to place as `(name, x, y)`.
    pub fn placements(&self) -> Vec<(&'static str, f64, f64)> {
        match self {
            Scenario::Success => ON_PATH.to_vec(),
            Scenario::Mismatch => {
                let mut items = ON_PATH[..2].to_vec();
                items.push(("Phone Case", 800.0, 640.0));
                items
            }
            Scenario::Caution => {
                let mut items = ON_PATH.to_vec();
                items.push(("Bonus Item (Keychain)", 300.0, 400.0));
                items
            }
        }
    }
}

/// Builds the order, places the items, and sweeps until the report lands.
pub async fn run(
    engine: &ScanEngine,
    scenario: Scenario,
    order_id: Option<&str>,
) -> ScanResult<VerificationReport> {
    engine.set_order_id(order_id).await?;
    for (name, quantity) in ORDER {
        engine.add_to_cart(name, *quantity).await?;
    }
    let expected = engine.confirm_order().await?;
    info!(?scenario, expected, "Order confirmed");

    for (name, x, y) in scenario.placements() {
        engine.place(name, x, y).await?;
    }

    let ticket = engine.initiate_scan().await?;
    info!(scan_id = %ticket.scan_id, "Sweeping package");
    engine.wait_for_report(ticket.scan_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagcheck_core::VerificationStatus;
    use tagcheck_scan::ScanConfig;

    #[test]
    fn test_scenario_parsing() {
        assert_eq!(Scenario::from_str("success", false), Ok(Scenario::Success));
        assert_eq!(Scenario::from_str("MISMATCH", true), Ok(Scenario::Mismatch));
        assert_eq!(Scenario::from_str("extra", false), Ok(Scenario::Caution));
        assert!(Scenario::from_str("nope", true).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_scenario_produces_its_status() {
        let cases = [
            (Scenario::Success, VerificationStatus::Success),
            (Scenario::Mismatch, VerificationStatus::Mismatch),
            (Scenario::Caution, VerificationStatus::Caution),
        ];

        for (scenario, status) in cases {
            let engine = ScanEngine::new(&ScanConfig::default());
            let report = run(&engine, scenario, Some("DEMO-1")).await.unwrap();
            assert_eq!(report.verification_status, status, "{:?}", scenario);
            assert_eq!(report.order_id, "DEMO-1");
        }
    }
}
