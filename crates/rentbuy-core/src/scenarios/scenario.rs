use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::cashflow::{BuyRentParams, GrowthAssumptions};
use crate::comparison::{evaluate, schedule_for, Decision};
use crate::error::RentBuyError;
use crate::types::*;
use crate::RentBuyResult;

/// A named shift applied on top of the base house and rent growth rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDelta {
    pub name: String,
    /// Percentage points added to the base house growth rate
    pub house_growth_delta_pct: Percent,
    /// Percentage points added to the base rent growth rate
    pub rent_growth_delta_pct: Percent,
}

impl ScenarioDelta {
    pub fn new(name: &str, house_growth_delta_pct: Percent, rent_growth_delta_pct: Percent) -> Self {
        Self {
            name: name.into(),
            house_growth_delta_pct,
            rent_growth_delta_pct,
        }
    }

    fn apply(&self, base: &GrowthAssumptions) -> GrowthAssumptions {
        GrowthAssumptions {
            house_growth_pct: base.house_growth_pct + self.house_growth_delta_pct,
            rent_growth_pct: base.rent_growth_pct + self.rent_growth_delta_pct,
        }
    }
}

/// Base, Boom (+3 house, +2 rent) and Crash (-3 house, -1 rent).
pub fn default_scenarios() -> Vec<ScenarioDelta> {
    vec![
        ScenarioDelta::new("Base", Decimal::ZERO, Decimal::ZERO),
        ScenarioDelta::new("Boom", dec!(3), dec!(2)),
        ScenarioDelta::new("Crash", dec!(-3), dec!(-1)),
    ]
}

/// Input for scenario analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    /// Scenarios in the order results should be reported
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<ScenarioDelta>,
    /// Base case assumptions the deltas are applied to
    #[serde(default)]
    pub base: BuyRentParams,
}

/// Result for a single scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub house_growth_pct: Percent,
    pub rent_growth_pct: Percent,
    pub npv_buy: Money,
    pub npv_rent: Money,
    /// npv_buy - npv_rent
    pub difference: Money,
    pub decision: Decision,
}

/// Output of scenario analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutput {
    pub results: Vec<ScenarioResult>,
    /// Names of scenarios in which buying comes out ahead
    pub buy_favoured: Vec<String>,
    pub emi: Money,
}

/// Run the buy-vs-rent comparison once per named scenario.
///
/// Every scenario shares the same loan and horizon, so the amortization
/// schedule is computed once and reused. Results keep the input order.
pub fn run_scenarios(input: &ScenarioInput) -> RentBuyResult<ComputationOutput<ScenarioOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.scenarios.is_empty() {
        return Err(RentBuyError::InvalidInput {
            field: "scenarios".into(),
            reason: "At least one scenario required".into(),
        });
    }

    let mut seen = HashSet::new();
    for s in &input.scenarios {
        if !seen.insert(s.name.as_str()) {
            return Err(RentBuyError::InvalidInput {
                field: format!("scenario:{}", s.name),
                reason: "Scenario names must be unique".into(),
            });
        }
    }

    input.base.validate()?;
    let base_growth = input.base.base_growth();
    for scenario in &input.scenarios {
        scenario.apply(&base_growth).validate()?;
    }
    let schedule = schedule_for(&input.base)?;

    let mut results = Vec::with_capacity(input.scenarios.len());
    for scenario in &input.scenarios {
        let growth = scenario.apply(&base_growth);
        let (_, pair) = evaluate(&growth, &input.base, &schedule)?;
        let difference = pair.difference();
        log::debug!(
            "scenario {}: hg {}% rg {}% → buy {} rent {}",
            scenario.name,
            growth.house_growth_pct,
            growth.rent_growth_pct,
            pair.npv_buy,
            pair.npv_rent
        );

        results.push(ScenarioResult {
            name: scenario.name.clone(),
            house_growth_pct: growth.house_growth_pct,
            rent_growth_pct: growth.rent_growth_pct,
            npv_buy: pair.npv_buy,
            npv_rent: pair.npv_rent,
            difference,
            decision: Decision::from_difference(difference),
        });
    }

    let buy_favoured = results
        .iter()
        .filter(|r| r.decision == Decision::Buy)
        .map(|r| r.name.clone())
        .collect();

    let output = ScenarioOutput {
        results,
        buy_favoured,
        emi: schedule.emi,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Named growth scenarios over a shared amortization schedule",
        &serde_json::json!({
            "num_scenarios": input.scenarios.len(),
            "base": input.base,
        }),
        warnings,
        elapsed,
        output,
    ))
}
