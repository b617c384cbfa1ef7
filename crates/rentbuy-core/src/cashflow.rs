use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{horizon_months, AmortizationSchedule, LoanTerms};
use crate::error::RentBuyError;
use crate::tax::{tax_saving, TaxParams};
use crate::time_value::future_value;
use crate::types::{pct_to_rate, CashFlowPath, CashFlowSeries, Money, Percent};
use crate::RentBuyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Every market, loan and cost assumption of one buy-vs-rent comparison.
///
/// All rates are percentages (5 = 5%). The defaults are a mid-market
/// Indian metro purchase financed over 20 years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuyRentParams {
    /// Purchase price of the house
    pub price: Money,
    /// Fraction of the price paid upfront, in [0, 1)
    pub down_payment_fraction: Decimal,
    /// Annual loan interest rate
    pub loan_rate_pct: Percent,
    /// Loan tenure in years
    pub tenure_years: u32,
    /// Monthly rent today
    #[serde(alias = "rent0")]
    pub monthly_rent: Money,
    /// Annual rent growth (base case)
    pub rent_growth_pct: Percent,
    /// Annual house price growth (base case)
    pub house_growth_pct: Percent,
    /// Return earned on the down payment when renting
    pub investment_return_pct: Percent,
    /// General inflation
    pub inflation_pct: Percent,
    /// Nominal discount rate
    pub discount_rate_pct: Percent,
    /// Years until the house is sold
    #[serde(alias = "exit_year")]
    pub holding_horizon_years: u32,
    /// Commission paid on purchase, as a share of price
    pub buy_commission_pct: Percent,
    /// Commission paid on resale, as a share of the resale price
    pub sell_commission_pct: Percent,
    /// Annual maintenance, as a share of purchase price
    pub maintenance_pct: Percent,
    pub tax: TaxParams,
}

impl Default for BuyRentParams {
    fn default() -> Self {
        Self {
            price: dec!(8000000),
            down_payment_fraction: dec!(0.2),
            loan_rate_pct: dec!(8.5),
            tenure_years: 20,
            monthly_rent: dec!(25000),
            rent_growth_pct: dec!(5),
            house_growth_pct: dec!(5),
            investment_return_pct: dec!(10),
            inflation_pct: dec!(5),
            discount_rate_pct: dec!(8),
            holding_horizon_years: 10,
            buy_commission_pct: dec!(1),
            sell_commission_pct: dec!(1),
            maintenance_pct: dec!(1),
            tax: TaxParams::default(),
        }
    }
}

/// House appreciation and rent growth for one scenario, in percent per year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthAssumptions {
    pub house_growth_pct: Percent,
    pub rent_growth_pct: Percent,
}

impl GrowthAssumptions {
    /// Growth below -100% a year would flip the sign of compounded values.
    pub fn validate(&self) -> RentBuyResult<()> {
        for (field, value) in [
            ("house_growth_pct", self.house_growth_pct),
            ("rent_growth_pct", self.rent_growth_pct),
        ] {
            if value < dec!(-100) {
                return Err(RentBuyError::InvalidInput {
                    field: field.into(),
                    reason: format!("Growth of {value}% a year is below -100%"),
                });
            }
        }
        Ok(())
    }
}

/// One year of both paths, for tables and charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowYear {
    pub year: u32,
    pub interest: Money,
    pub principal: Money,
    pub emi_paid: Money,
    pub maintenance: Money,
    pub tax_saving: Money,
    pub buy_flow: Money,
    pub rent_paid: Money,
    pub rent_flow: Money,
}

/// Annual cash flows of both paths, index 0 is the purchase date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyRentCashFlows {
    pub buy: CashFlowSeries,
    pub rent: CashFlowSeries,
    pub years: Vec<CashFlowYear>,
    /// Down payment plus buy commission
    pub upfront_outlay: Money,
    /// Sale price net of sell commission, added in the final year
    pub resale_proceeds: Money,
    /// Down payment compounded at the investment return, added in the final year
    pub invested_down_payment: Money,
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

impl BuyRentParams {
    pub fn base_growth(&self) -> GrowthAssumptions {
        GrowthAssumptions {
            house_growth_pct: self.house_growth_pct,
            rent_growth_pct: self.rent_growth_pct,
        }
    }

    pub fn loan_terms(&self) -> RentBuyResult<LoanTerms> {
        LoanTerms::from_purchase(
            self.price,
            self.down_payment_fraction,
            self.loan_rate_pct,
            self.tenure_years,
        )
    }

    pub fn down_payment(&self) -> Money {
        self.price * self.down_payment_fraction
    }

    /// Same assumptions held for a different number of years.
    pub fn with_horizon(&self, holding_horizon_years: u32) -> Self {
        Self {
            holding_horizon_years,
            ..self.clone()
        }
    }

    /// Reject any parameter set the engine cannot evaluate, before iterating.
    pub fn validate(&self) -> RentBuyResult<()> {
        self.loan_terms()?;

        if self.holding_horizon_years == 0 {
            return Err(RentBuyError::InvalidHorizon {
                horizon: 0,
                reason: "Holding horizon must be at least 1 year".into(),
            });
        }
        horizon_months(self.holding_horizon_years)?;
        self.base_growth().validate()?;
        if self.investment_return_pct < dec!(-100) {
            return Err(RentBuyError::InvalidInput {
                field: "investment_return_pct".into(),
                reason: "Investment return cannot be below -100%".into(),
            });
        }
        if self.monthly_rent < Decimal::ZERO {
            return Err(RentBuyError::InvalidInput {
                field: "monthly_rent".into(),
                reason: "Rent cannot be negative".into(),
            });
        }
        for (field, value) in [
            ("buy_commission_pct", self.buy_commission_pct),
            ("sell_commission_pct", self.sell_commission_pct),
        ] {
            if value < Decimal::ZERO || value >= dec!(100) {
                return Err(RentBuyError::InvalidInput {
                    field: field.into(),
                    reason: "Commission must be in [0, 100)".into(),
                });
            }
        }
        if self.maintenance_pct < Decimal::ZERO {
            return Err(RentBuyError::InvalidInput {
                field: "maintenance_pct".into(),
                reason: "Maintenance cannot be negative".into(),
            });
        }
        if Decimal::ONE + pct_to_rate(self.inflation_pct) <= Decimal::ZERO {
            return Err(RentBuyError::domain(format!(
                "inflation of {}% leaves 1 + inflation non-positive",
                self.inflation_pct
            )));
        }
        if Decimal::ONE + pct_to_rate(self.discount_rate_pct) <= Decimal::ZERO {
            return Err(RentBuyError::domain(format!(
                "discount rate of {}% leaves 1 + rate non-positive",
                self.discount_rate_pct
            )));
        }
        self.tax.validate()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the buy and rent cash-flow series for `params.holding_horizon_years`.
///
/// `schedule` must cover at least the holding horizon; months past the horizon
/// are ignored.
pub fn build_cash_flows(
    growth: &GrowthAssumptions,
    params: &BuyRentParams,
    schedule: &AmortizationSchedule,
) -> RentBuyResult<BuyRentCashFlows> {
    let horizon = params.holding_horizon_years;
    if horizon == 0 {
        return Err(RentBuyError::InvalidHorizon {
            horizon: 0,
            reason: "Holding horizon must be at least 1 year".into(),
        });
    }
    growth.validate()?;
    if schedule.horizon_months < horizon_months(horizon)? {
        return Err(RentBuyError::InvalidHorizon {
            horizon: i64::from(horizon),
            reason: format!(
                "amortization schedule covers only {} months",
                schedule.horizon_months
            ),
        });
    }

    let house_growth = pct_to_rate(growth.house_growth_pct);
    let rent_growth = pct_to_rate(growth.rent_growth_pct);
    let annual_maintenance = params
        .price
        .checked_mul(pct_to_rate(params.maintenance_pct))
        .ok_or_else(|| RentBuyError::domain("annual maintenance"))?;
    let down_payment = params.down_payment();
    let upfront_outlay = params
        .price
        .checked_mul(pct_to_rate(params.buy_commission_pct))
        .and_then(|commission| down_payment.checked_add(commission))
        .ok_or_else(|| RentBuyError::domain("upfront outlay"))?;

    let mut buy = Vec::with_capacity(horizon as usize + 1);
    let mut rent = Vec::with_capacity(horizon as usize + 1);
    let mut years = Vec::with_capacity(horizon as usize);
    buy.push(-upfront_outlay);
    rent.push(Decimal::ZERO);

    for year in 1..=horizon {
        let aggregate = schedule.annual_aggregate(year);
        let emi_paid = schedule
            .emi
            .checked_mul(Decimal::from(aggregate.instalments))
            .ok_or_else(|| RentBuyError::domain(format!("EMI paid in year {year}")))?;
        let saving = tax_saving(aggregate.interest, aggregate.principal, &params.tax);
        let buy_flow = emi_paid
            .checked_add(annual_maintenance)
            .and_then(|outgoings| saving.checked_sub(outgoings))
            .ok_or_else(|| RentBuyError::domain(format!("buy cash flow in year {year}")))?;

        // Rent is grown for the full year it is paid in, so year 1 is already grown
        let rent_paid = future_value(params.monthly_rent, rent_growth, year)?
            .checked_mul(dec!(12))
            .ok_or_else(|| RentBuyError::domain(format!("rent paid in year {year}")))?;

        buy.push(buy_flow);
        rent.push(-rent_paid);
        years.push(CashFlowYear {
            year,
            interest: aggregate.interest,
            principal: aggregate.principal,
            emi_paid,
            maintenance: annual_maintenance,
            tax_saving: saving,
            buy_flow,
            rent_paid,
            rent_flow: -rent_paid,
        });
    }

    let future_price = future_value(params.price, house_growth, horizon)?;
    let resale_proceeds = future_price * (Decimal::ONE - pct_to_rate(params.sell_commission_pct));
    let invested_down_payment = future_value(
        down_payment,
        pct_to_rate(params.investment_return_pct),
        horizon,
    )?;

    let last = horizon as usize;
    buy[last] = buy[last]
        .checked_add(resale_proceeds)
        .ok_or_else(|| RentBuyError::domain("terminal resale adjustment"))?;
    rent[last] = rent[last]
        .checked_add(invested_down_payment)
        .ok_or_else(|| RentBuyError::domain("terminal investment adjustment"))?;

    Ok(BuyRentCashFlows {
        buy: CashFlowSeries {
            path: CashFlowPath::Buy,
            flows: buy,
        },
        rent: CashFlowSeries {
            path: CashFlowPath::Rent,
            flows: rent,
        },
        years,
        upfront_outlay,
        resale_proceeds,
        invested_down_payment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::amortize;
    use pretty_assertions::assert_eq;

    fn schedule_for(params: &BuyRentParams) -> AmortizationSchedule {
        let terms = params.loan_terms().unwrap();
        amortize(&terms, params.price, params.holding_horizon_years * 12).unwrap()
    }

    #[test]
    fn test_series_shape_and_upfront_outlay() {
        let params = BuyRentParams::default();
        let flows = build_cash_flows(&params.base_growth(), &params, &schedule_for(&params)).unwrap();

        assert_eq!(flows.buy.flows.len(), 11);
        assert_eq!(flows.rent.flows.len(), 11);
        assert_eq!(flows.years.len(), 10);
        // 1,600,000 down + 80,000 commission
        assert_eq!(flows.upfront_outlay, dec!(1680000));
        assert_eq!(flows.buy.flows[0], dec!(-1680000));
        assert_eq!(flows.rent.flows[0], Decimal::ZERO);
    }

    #[test]
    fn test_first_year_rent_is_already_grown() {
        let params = BuyRentParams {
            holding_horizon_years: 1,
            down_payment_fraction: Decimal::ZERO,
            ..BuyRentParams::default()
        };
        let flows = build_cash_flows(&params.base_growth(), &params, &schedule_for(&params)).unwrap();
        // -(25,000 * 1.05 * 12), no down payment to invest
        assert_eq!(flows.rent.flows[1], dec!(-315000));
        assert_eq!(flows.years[0].rent_paid, dec!(315000));
    }

    #[test]
    fn test_first_year_buy_flow() {
        let params = BuyRentParams::default();
        let schedule = schedule_for(&params);
        let flows = build_cash_flows(&params.base_growth(), &params, &schedule).unwrap();
        let year1 = &flows.years[0];

        // 12 EMIs + 80,000 maintenance - tax on (200,000 + year-1 principal)
        let expected_tax = (dec!(200000) + year1.principal) * dec!(0.3);
        assert_eq!(year1.emi_paid, schedule.emi * dec!(12));
        assert_eq!(year1.maintenance, dec!(80000));
        assert_eq!(year1.tax_saving, expected_tax);
        assert_eq!(flows.buy.flows[1], -(schedule.emi * dec!(12) + dec!(80000)) + expected_tax);
    }

    #[test]
    fn test_terminal_adjustments() {
        let params = BuyRentParams {
            holding_horizon_years: 2,
            ..BuyRentParams::default()
        };
        let growth = GrowthAssumptions {
            house_growth_pct: dec!(10),
            rent_growth_pct: Decimal::ZERO,
        };
        let flows = build_cash_flows(&growth, &params, &schedule_for(&params)).unwrap();

        // 8,000,000 * 1.21 * 0.99
        assert_eq!(flows.resale_proceeds, dec!(9583200));
        // 1,600,000 * 1.1^2
        assert_eq!(flows.invested_down_payment, dec!(1936000));
        assert_eq!(flows.rent.flows[2], dec!(-300000) + dec!(1936000));
        assert_eq!(flows.buy.flows[2], flows.years[1].buy_flow + dec!(9583200));
    }

    #[test]
    fn test_schedule_shorter_than_horizon_rejected() {
        let params = BuyRentParams::default();
        let short = schedule_for(&params.with_horizon(5));
        let err = build_cash_flows(&params.base_growth(), &params, &short).unwrap_err();
        assert!(matches!(err, RentBuyError::InvalidHorizon { .. }));
    }

    #[test]
    fn test_no_emi_after_maturity() {
        let params = BuyRentParams {
            tenure_years: 3,
            holding_horizon_years: 5,
            ..BuyRentParams::default()
        };
        let flows = build_cash_flows(&params.base_growth(), &params, &schedule_for(&params)).unwrap();
        assert_eq!(flows.years[3].emi_paid, Decimal::ZERO);
        assert_eq!(flows.years[3].tax_saving, Decimal::ZERO);
        assert_eq!(flows.years[3].buy_flow, dec!(-80000));
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        let bad_inflation = BuyRentParams {
            inflation_pct: dec!(-100),
            ..BuyRentParams::default()
        };
        assert!(matches!(
            bad_inflation.validate(),
            Err(RentBuyError::DomainMathError { .. })
        ));

        let bad_horizon = BuyRentParams::default().with_horizon(0);
        assert!(matches!(
            bad_horizon.validate(),
            Err(RentBuyError::InvalidHorizon { .. })
        ));

        let bad_down = BuyRentParams {
            down_payment_fraction: dec!(1.2),
            ..BuyRentParams::default()
        };
        assert!(matches!(
            bad_down.validate(),
            Err(RentBuyError::InvalidLoanTerms { .. })
        ));

        let bad_commission = BuyRentParams {
            sell_commission_pct: dec!(-1),
            ..BuyRentParams::default()
        };
        assert!(matches!(
            bad_commission.validate(),
            Err(RentBuyError::InvalidInput { .. })
        ));

        assert!(BuyRentParams::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_horizon_and_tenure() {
        let long_horizon = BuyRentParams::default().with_horizon(400_000_000);
        assert!(matches!(
            long_horizon.validate(),
            Err(RentBuyError::InvalidHorizon { .. })
        ));

        let long_tenure = BuyRentParams {
            tenure_years: 400_000_000,
            ..BuyRentParams::default()
        };
        assert!(matches!(
            long_tenure.validate(),
            Err(RentBuyError::InvalidLoanTerms { .. })
        ));

        assert!(BuyRentParams::default().with_horizon(100).validate().is_ok());
    }

    #[test]
    fn test_growth_below_minus_hundred_rejected() {
        let params = BuyRentParams {
            house_growth_pct: dec!(-200),
            ..BuyRentParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(RentBuyError::InvalidInput { .. })
        ));

        let params = BuyRentParams::default();
        let growth = GrowthAssumptions {
            house_growth_pct: dec!(5),
            rent_growth_pct: dec!(-101),
        };
        let err = build_cash_flows(&growth, &params, &schedule_for(&params)).unwrap_err();
        assert!(matches!(err, RentBuyError::InvalidInput { .. }));

        let floor = GrowthAssumptions {
            house_growth_pct: dec!(-100),
            rent_growth_pct: dec!(-100),
        };
        assert!(floor.validate().is_ok());
    }

    #[test]
    fn test_rent_overflow_is_domain_error() {
        let params = BuyRentParams {
            rent_growth_pct: dec!(1000),
            holding_horizon_years: 23,
            ..BuyRentParams::default()
        };
        let err = build_cash_flows(&params.base_growth(), &params, &schedule_for(&params))
            .unwrap_err();
        assert!(matches!(err, RentBuyError::DomainMathError { .. }));
    }

    #[test]
    fn test_params_deserialize_with_defaults_and_aliases() {
        let params: BuyRentParams =
            serde_json::from_str(r#"{"rent0": "30000", "exit_year": 7}"#).unwrap();
        assert_eq!(params.monthly_rent, dec!(30000));
        assert_eq!(params.holding_horizon_years, 7);
        assert_eq!(params.price, dec!(8000000));
        assert_eq!(params.tax, TaxParams::default());
    }
}
