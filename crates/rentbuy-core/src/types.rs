use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Interface percentages are converted
/// with [`pct_to_rate`] before any arithmetic.
pub type Rate = Decimal;

/// Rates expressed as percentages (5 = 5%), the unit every public input uses.
pub type Percent = Decimal;

/// Convert an interface percentage into a decimal rate.
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / dec!(100)
}

/// Which side of the decision a cash-flow series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowPath {
    Buy,
    Rent,
}

/// Annual cash flows for one path, index 0 is today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSeries {
    pub path: CashFlowPath,
    pub flows: Vec<Money>,
}

impl CashFlowSeries {
    /// Horizon in years covered by the series (the last index).
    pub fn horizon_years(&self) -> usize {
        self.flows.len().saturating_sub(1)
    }

    /// Undiscounted sum of every flow.
    pub fn undiscounted_total(&self) -> Money {
        self.flows.iter().copied().sum()
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_to_rate() {
        assert_eq!(pct_to_rate(dec!(8.5)), dec!(0.085));
        assert_eq!(pct_to_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_series_horizon_and_total() {
        let series = CashFlowSeries {
            path: CashFlowPath::Rent,
            flows: vec![dec!(0), dec!(-100), dec!(250)],
        };
        assert_eq!(series.horizon_years(), 2);
        assert_eq!(series.undiscounted_total(), dec!(150));
    }
}
