use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{amortize, horizon_months, AmortizationSchedule};
use crate::cashflow::{build_cash_flows, BuyRentCashFlows, BuyRentParams, GrowthAssumptions};
use crate::time_value::{discount_series, real_discount_rate};
use crate::types::{pct_to_rate, with_metadata, ComputationOutput, Money, Rate};
use crate::RentBuyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which path the comparison favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Buy,
    Rent,
    Indifferent,
}

impl Decision {
    pub fn from_difference(difference: Money) -> Self {
        if difference > Decimal::ZERO {
            Decision::Buy
        } else if difference < Decimal::ZERO {
            Decision::Rent
        } else {
            Decision::Indifferent
        }
    }
}

/// Present values of both paths under one growth assumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NpvPair {
    pub npv_buy: Money,
    pub npv_rent: Money,
}

impl NpvPair {
    /// NPV-buy minus NPV-rent; positive favours buying.
    pub fn difference(&self) -> Money {
        self.npv_buy - self.npv_rent
    }
}

/// Full comparison for one parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpvOutput {
    pub house_growth_pct: Decimal,
    pub rent_growth_pct: Decimal,
    pub npv_buy: Money,
    pub npv_rent: Money,
    pub difference: Money,
    pub decision: Decision,
    pub emi: Money,
    pub real_discount_rate: Rate,
    pub cash_flows: BuyRentCashFlows,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The loan ledger for the parameter set's holding horizon.
pub fn schedule_for(params: &BuyRentParams) -> RentBuyResult<AmortizationSchedule> {
    let terms = params.loan_terms()?;
    amortize(&terms, params.price, horizon_months(params.holding_horizon_years)?)
}

/// Cash flows and present values of both paths against a precomputed schedule.
///
/// `params` must already be validated.
pub(crate) fn evaluate(
    growth: &GrowthAssumptions,
    params: &BuyRentParams,
    schedule: &AmortizationSchedule,
) -> RentBuyResult<(BuyRentCashFlows, NpvPair)> {
    let nominal = pct_to_rate(params.discount_rate_pct);
    let inflation = pct_to_rate(params.inflation_pct);
    let flows = build_cash_flows(growth, params, schedule)?;
    let pair = NpvPair {
        npv_buy: discount_series(&flows.buy, nominal, inflation)?,
        npv_rent: discount_series(&flows.rent, nominal, inflation)?,
    };
    Ok((flows, pair))
}

/// NPV of buying and of renting for one growth assumption, reusing `schedule`.
pub fn npv_pair(
    growth: &GrowthAssumptions,
    params: &BuyRentParams,
    schedule: &AmortizationSchedule,
) -> RentBuyResult<NpvPair> {
    params.validate()?;
    evaluate(growth, params, schedule).map(|(_, pair)| pair)
}

/// Compare buying against renting at the given house and rent growth rates.
pub fn compute_npv(
    growth: GrowthAssumptions,
    params: &BuyRentParams,
) -> RentBuyResult<ComputationOutput<NpvOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    params.validate()?;
    growth.validate()?;
    let schedule = schedule_for(params)?;
    let (cash_flows, pair) = evaluate(&growth, params, &schedule)?;
    let real = real_discount_rate(
        pct_to_rate(params.discount_rate_pct),
        pct_to_rate(params.inflation_pct),
    )?;

    if schedule.matures_within_horizon() {
        log::warn!(
            "loan matures in year {} of a {}-year horizon",
            params.tenure_years,
            params.holding_horizon_years
        );
        warnings.push(format!(
            "Loan matures after {} years, before the {}-year holding horizon",
            params.tenure_years, params.holding_horizon_years
        ));
    }
    if real < Decimal::ZERO {
        warnings.push(format!(
            "Inflation exceeds the discount rate; real discount rate is negative ({real:.4})"
        ));
    }
    if growth.house_growth_pct < Decimal::ZERO {
        warnings.push(format!(
            "House prices fall {}% a year in this scenario",
            -growth.house_growth_pct
        ));
    }

    let difference = pair.difference();
    let output = NpvOutput {
        house_growth_pct: growth.house_growth_pct,
        rent_growth_pct: growth.rent_growth_pct,
        npv_buy: pair.npv_buy,
        npv_rent: pair.npv_rent,
        difference,
        decision: Decision::from_difference(difference),
        emi: schedule.emi,
        real_discount_rate: real,
        cash_flows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Buy vs rent NPV at an inflation-adjusted (Fisher) discount rate",
        &serde_json::json!({
            "params": params,
            "growth": growth,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RentBuyError;
    use crate::tax::TaxParams;
    use rust_decimal_macros::dec;

    fn flat_world() -> BuyRentParams {
        BuyRentParams {
            rent_growth_pct: Decimal::ZERO,
            house_growth_pct: Decimal::ZERO,
            inflation_pct: Decimal::ZERO,
            discount_rate_pct: Decimal::ZERO,
            tax: TaxParams {
                tax_rate_pct: Decimal::ZERO,
                ..TaxParams::default()
            },
            ..BuyRentParams::default()
        }
    }

    #[test]
    fn test_flat_world_npv_is_undiscounted_sum() {
        let params = flat_world();
        let out = compute_npv(params.base_growth(), &params).unwrap().result;

        assert_eq!(out.real_discount_rate, Decimal::ZERO);
        assert_eq!(out.npv_buy, out.cash_flows.buy.undiscounted_total());
        assert_eq!(out.npv_rent, out.cash_flows.rent.undiscounted_total());
    }

    #[test]
    fn test_default_comparison_is_finite_and_consistent() {
        let params = BuyRentParams::default();
        let result = compute_npv(params.base_growth(), &params).unwrap();
        let out = &result.result;

        assert_eq!(out.difference, out.npv_buy - out.npv_rent);
        assert_eq!(out.decision, Decision::from_difference(out.difference));
        assert!((out.emi - dec!(55540.69)).abs() < dec!(0.01));
        // 1.08 / 1.05 - 1
        assert!((out.real_discount_rate - dec!(0.028571)).abs() < dec!(0.000001));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_higher_house_growth_raises_npv_buy() {
        let params = BuyRentParams::default();
        let low = compute_npv(
            GrowthAssumptions {
                house_growth_pct: dec!(2),
                rent_growth_pct: dec!(5),
            },
            &params,
        )
        .unwrap()
        .result;
        let high = compute_npv(
            GrowthAssumptions {
                house_growth_pct: dec!(8),
                rent_growth_pct: dec!(5),
            },
            &params,
        )
        .unwrap()
        .result;

        assert!(high.npv_buy > low.npv_buy);
        assert_eq!(high.npv_rent, low.npv_rent);
    }

    #[test]
    fn test_npv_pair_matches_compute_npv() {
        let params = BuyRentParams::default();
        let schedule = schedule_for(&params).unwrap();
        let pair = npv_pair(&params.base_growth(), &params, &schedule).unwrap();
        let full = compute_npv(params.base_growth(), &params).unwrap().result;
        assert_eq!(pair.npv_buy, full.npv_buy);
        assert_eq!(pair.npv_rent, full.npv_rent);
    }

    #[test]
    fn test_inflation_at_minus_hundred_is_domain_error() {
        let params = BuyRentParams {
            inflation_pct: dec!(-100),
            ..BuyRentParams::default()
        };
        let err = compute_npv(params.base_growth(), &params).unwrap_err();
        assert!(matches!(err, RentBuyError::DomainMathError { .. }));
    }

    #[test]
    fn test_explosive_growth_is_domain_error() {
        let params = BuyRentParams {
            holding_horizon_years: 25,
            ..BuyRentParams::default()
        };
        let growth = GrowthAssumptions {
            house_growth_pct: dec!(1000000000),
            rent_growth_pct: dec!(5),
        };
        let err = compute_npv(growth, &params).unwrap_err();
        assert!(matches!(err, RentBuyError::DomainMathError { .. }));
    }

    #[test]
    fn test_rent_overflow_is_domain_error() {
        let params = BuyRentParams {
            rent_growth_pct: dec!(1000),
            holding_horizon_years: 23,
            ..BuyRentParams::default()
        };
        let err = compute_npv(params.base_growth(), &params).unwrap_err();
        assert!(matches!(err, RentBuyError::DomainMathError { .. }));
    }

    #[test]
    fn test_oversized_horizon_is_rejected() {
        let params = BuyRentParams::default().with_horizon(400_000_000);
        let err = compute_npv(params.base_growth(), &params).unwrap_err();
        assert!(matches!(err, RentBuyError::InvalidHorizon { .. }));
        assert!(matches!(
            schedule_for(&params),
            Err(RentBuyError::InvalidHorizon { .. })
        ));
    }

    #[test]
    fn test_negative_real_rate_warns() {
        let params = BuyRentParams {
            inflation_pct: dec!(9),
            ..BuyRentParams::default()
        };
        let result = compute_npv(params.base_growth(), &params).unwrap();
        assert!(result.result.real_discount_rate < Decimal::ZERO);
        assert!(result.warnings.iter().any(|w| w.contains("real discount rate")));
    }
}
