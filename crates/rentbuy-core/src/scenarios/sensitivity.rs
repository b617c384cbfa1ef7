use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{amortize, horizon_months};
use crate::cashflow::{BuyRentParams, GrowthAssumptions};
use crate::comparison::{evaluate, Decision};
use crate::error::RentBuyError;
use crate::types::*;
use crate::RentBuyResult;

const MAX_SWEEP_POINTS: usize = 1000;

/// Inclusive range of values to sweep, from `start` to `end` in `step` increments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: Decimal,
    pub end: Decimal,
    pub step: Decimal,
}

impl SweepRange {
    pub fn new(start: Decimal, end: Decimal, step: Decimal) -> Self {
        Self { start, end, step }
    }

    /// Generate the sweep values. `end` is always included, even when the
    /// step does not land on it exactly.
    pub fn values(&self) -> RentBuyResult<Vec<Decimal>> {
        if self.step <= Decimal::ZERO {
            return Err(RentBuyError::InvalidInput {
                field: "step".into(),
                reason: "Step must be positive".into(),
            });
        }
        if self.start > self.end {
            return Err(RentBuyError::InvalidInput {
                field: "start".into(),
                reason: "Start must be <= end".into(),
            });
        }
        if (self.end - self.start) / self.step >= Decimal::from(MAX_SWEEP_POINTS) {
            return Err(RentBuyError::InvalidInput {
                field: "step".into(),
                reason: format!("Sweep would exceed {MAX_SWEEP_POINTS} points"),
            });
        }

        let mut values = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            values.push(current);
            current += self.step;
        }
        if let Some(&last) = values.last() {
            if last < self.end {
                values.push(self.end);
            }
        }

        Ok(values)
    }
}

// ---------------------------------------------------------------------------
// Holding period
// ---------------------------------------------------------------------------

/// Horizons 3 through 25 years.
pub fn default_horizons() -> Vec<u32> {
    (3..=25).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingPeriodSweepInput {
    #[serde(default)]
    pub params: BuyRentParams,
    /// Holding horizons to evaluate, in years
    #[serde(default = "default_horizons")]
    pub horizons: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingPeriodPoint {
    pub horizon_years: u32,
    pub npv_buy: Money,
    pub npv_rent: Money,
    pub difference: Money,
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingPeriodSweepOutput {
    pub points: Vec<HoldingPeriodPoint>,
    /// Shortest swept horizon at which buying is at least as good as renting
    pub break_even_horizon: Option<u32>,
}

/// NPV of both paths for every holding horizon, at the base growth rates.
///
/// One schedule is amortized to the longest horizon; each point slices it to
/// its own horizon, which leaves earlier months unchanged.
pub fn sweep_holding_period(
    input: &HoldingPeriodSweepInput,
) -> RentBuyResult<ComputationOutput<HoldingPeriodSweepOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let max_horizon = match input.horizons.iter().max() {
        Some(&h) => h,
        None => {
            return Err(RentBuyError::InvalidHorizon {
                horizon: 0,
                reason: "At least one holding horizon required".into(),
            })
        }
    };
    if input.horizons.len() > MAX_SWEEP_POINTS {
        return Err(RentBuyError::InvalidInput {
            field: "horizons".into(),
            reason: format!("At most {MAX_SWEEP_POINTS} horizons can be swept"),
        });
    }
    for &h in &input.horizons {
        input.params.with_horizon(h).validate()?;
    }

    let terms = input.params.loan_terms()?;
    let full_schedule = amortize(&terms, input.params.price, horizon_months(max_horizon)?)?;
    let growth = input.params.base_growth();

    let points = input
        .horizons
        .iter()
        .map(|&horizon| {
            let params = input.params.with_horizon(horizon);
            let schedule = full_schedule.truncated(horizon_months(horizon)?);
            let (_, pair) = evaluate(&growth, &params, &schedule)?;
            log::debug!(
                "holding {horizon}y: buy {} rent {}",
                pair.npv_buy,
                pair.npv_rent
            );
            let difference = pair.difference();
            Ok(HoldingPeriodPoint {
                horizon_years: horizon,
                npv_buy: pair.npv_buy,
                npv_rent: pair.npv_rent,
                difference,
                decision: Decision::from_difference(difference),
            })
        })
        .collect::<RentBuyResult<Vec<_>>>()?;

    if max_horizon > input.params.tenure_years {
        log::warn!(
            "sweeping to {max_horizon} years past the {}-year loan tenure",
            input.params.tenure_years
        );
        warnings.push(format!(
            "Horizons beyond {} years run past loan maturity; no EMI is paid after the loan is repaid",
            input.params.tenure_years
        ));
    }

    let break_even_horizon = points
        .iter()
        .filter(|p| p.difference >= Decimal::ZERO)
        .map(|p| p.horizon_years)
        .min();
    if break_even_horizon.is_none() {
        warnings.push("Renting beats buying at every swept horizon".into());
    }

    let output = HoldingPeriodSweepOutput {
        points,
        break_even_horizon,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Holding-period sweep over a sliced amortization schedule",
        &serde_json::json!({
            "horizons": input.horizons,
            "params": input.params,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// House growth
// ---------------------------------------------------------------------------

fn default_growth_range() -> SweepRange {
    SweepRange::new(dec!(-5), dec!(15), dec!(1))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthSweepInput {
    #[serde(default)]
    pub params: BuyRentParams,
    /// House growth rates to evaluate, in percent
    #[serde(default = "default_growth_range")]
    pub house_growth_pct: SweepRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub house_growth_pct: Percent,
    pub npv_buy: Money,
    pub npv_rent: Money,
    pub difference: Money,
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthSweepOutput {
    pub rent_growth_pct: Percent,
    pub points: Vec<GrowthPoint>,
    /// Lowest swept house growth at which buying is at least as good as renting
    pub break_even_house_growth_pct: Option<Percent>,
}

/// NPV of both paths across house growth rates, rent growth held at base.
pub fn sweep_house_growth(
    input: &GrowthSweepInput,
) -> RentBuyResult<ComputationOutput<GrowthSweepOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let values = input.house_growth_pct.values()?;
    input.params.validate()?;

    let terms = input.params.loan_terms()?;
    let schedule = amortize(
        &terms,
        input.params.price,
        horizon_months(input.params.holding_horizon_years)?,
    )?;
    let rent_growth_pct = input.params.rent_growth_pct;
    for &house_growth_pct in &values {
        GrowthAssumptions {
            house_growth_pct,
            rent_growth_pct,
        }
        .validate()?;
    }

    let points = values
        .iter()
        .map(|&house_growth_pct| {
            let growth = GrowthAssumptions {
                house_growth_pct,
                rent_growth_pct,
            };
            let (_, pair) = evaluate(&growth, &input.params, &schedule)?;
            let difference = pair.difference();
            Ok(GrowthPoint {
                house_growth_pct,
                npv_buy: pair.npv_buy,
                npv_rent: pair.npv_rent,
                difference,
                decision: Decision::from_difference(difference),
            })
        })
        .collect::<RentBuyResult<Vec<_>>>()?;

    let break_even_house_growth_pct = points
        .iter()
        .find(|p| p.difference >= Decimal::ZERO)
        .map(|p| p.house_growth_pct);
    if break_even_house_growth_pct.is_none() {
        warnings.push("Renting beats buying across the whole growth range".into());
    }

    let output = GrowthSweepOutput {
        rent_growth_pct,
        points,
        break_even_house_growth_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "House growth sweep at fixed rent growth",
        &serde_json::json!({
            "house_growth_pct": input.house_growth_pct,
            "params": input.params,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::compute_npv;

    #[test]
    fn test_sweep_values() {
        let range = SweepRange::new(dec!(1), dec!(5), dec!(1));
        let vals = range.values().unwrap();
        assert_eq!(vals, vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
    }

    #[test]
    fn test_sweep_with_non_exact_step() {
        let range = SweepRange::new(dec!(0), dec!(1), dec!(0.3));
        let vals = range.values().unwrap();
        // 0, 0.3, 0.6, 0.9, 1.0 (end appended)
        assert_eq!(vals.len(), 5);
        assert_eq!(*vals.last().unwrap(), dec!(1));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(SweepRange::new(dec!(0), dec!(1), dec!(0)).values().is_err());
        assert!(SweepRange::new(dec!(2), dec!(1), dec!(1)).values().is_err());
        assert!(SweepRange::new(dec!(0), dec!(100000), dec!(1)).values().is_err());
    }

    #[test]
    fn test_holding_sweep_matches_fresh_comparisons() {
        let input = HoldingPeriodSweepInput {
            params: BuyRentParams::default(),
            horizons: vec![3, 10, 15],
        };
        let out = sweep_holding_period(&input).unwrap().result;
        assert_eq!(out.points.len(), 3);

        for point in &out.points {
            let params = input.params.with_horizon(point.horizon_years);
            let fresh = compute_npv(params.base_growth(), &params).unwrap().result;
            assert_eq!(point.npv_buy, fresh.npv_buy);
            assert_eq!(point.npv_rent, fresh.npv_rent);
        }
    }

    #[test]
    fn test_holding_sweep_does_not_touch_base_horizon() {
        let input = HoldingPeriodSweepInput {
            params: BuyRentParams::default(),
            horizons: vec![5, 20],
        };
        sweep_holding_period(&input).unwrap();
        assert_eq!(input.params.holding_horizon_years, 10);
    }

    #[test]
    fn test_holding_sweep_default_range_runs_past_maturity() {
        let input: HoldingPeriodSweepInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.horizons.first(), Some(&3));
        assert_eq!(input.horizons.last(), Some(&25));

        let result = sweep_holding_period(&input).unwrap();
        assert_eq!(result.result.points.len(), 23);
        assert!(result.warnings.iter().any(|w| w.contains("maturity")));
    }

    #[test]
    fn test_break_even_horizon_is_shortest_buy_favoured() {
        let input = HoldingPeriodSweepInput {
            params: BuyRentParams::default(),
            horizons: default_horizons(),
        };
        let out = sweep_holding_period(&input).unwrap().result;
        let expected = out
            .points
            .iter()
            .filter(|p| p.decision != Decision::Rent)
            .map(|p| p.horizon_years)
            .min();
        assert_eq!(out.break_even_horizon, expected);
    }

    #[test]
    fn test_empty_and_zero_horizons_rejected() {
        let empty = HoldingPeriodSweepInput {
            params: BuyRentParams::default(),
            horizons: vec![],
        };
        assert!(matches!(
            sweep_holding_period(&empty),
            Err(RentBuyError::InvalidHorizon { .. })
        ));

        let zero = HoldingPeriodSweepInput {
            params: BuyRentParams::default(),
            horizons: vec![0, 5],
        };
        assert!(matches!(
            sweep_holding_period(&zero),
            Err(RentBuyError::InvalidHorizon { .. })
        ));

        let oversized = HoldingPeriodSweepInput {
            params: BuyRentParams::default(),
            horizons: vec![3, 400_000_000],
        };
        assert!(matches!(
            sweep_holding_period(&oversized),
            Err(RentBuyError::InvalidHorizon { .. })
        ));
    }

    #[test]
    fn test_growth_sweep_rejects_growth_below_minus_hundred() {
        let input = GrowthSweepInput {
            params: BuyRentParams::default(),
            house_growth_pct: SweepRange::new(dec!(-150), dec!(0), dec!(50)),
        };
        assert!(matches!(
            sweep_house_growth(&input),
            Err(RentBuyError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_growth_sweep_is_monotone_in_npv_buy() {
        let input = GrowthSweepInput {
            params: BuyRentParams::default(),
            house_growth_pct: default_growth_range(),
        };
        let out = sweep_house_growth(&input).unwrap().result;
        assert_eq!(out.points.len(), 21);
        assert_eq!(out.rent_growth_pct, dec!(5));
        for pair in out.points.windows(2) {
            assert!(pair[1].npv_buy >= pair[0].npv_buy);
            assert_eq!(pair[1].npv_rent, pair[0].npv_rent);
        }
    }

    #[test]
    fn test_growth_break_even_is_first_buy_favoured() {
        let input = GrowthSweepInput {
            params: BuyRentParams::default(),
            house_growth_pct: default_growth_range(),
        };
        let out = sweep_house_growth(&input).unwrap().result;
        if let Some(g) = out.break_even_house_growth_pct {
            let point = out.points.iter().find(|p| p.house_growth_pct == g).unwrap();
            assert!(point.difference >= Decimal::ZERO);
            assert!(out
                .points
                .iter()
                .filter(|p| p.house_growth_pct < g)
                .all(|p| p.difference < Decimal::ZERO));
        }
    }
}
