use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentBuyError;
use crate::time_value::annuity_payment;
use crate::types::{pct_to_rate, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::RentBuyResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Longest loan tenure or holding horizon accepted, in years.
pub const MAX_YEARS: u32 = 100;

/// Number of months in a horizon of `years`, rejecting horizons longer than
/// [`MAX_YEARS`].
pub fn horizon_months(years: u32) -> RentBuyResult<u32> {
    if years > MAX_YEARS {
        return Err(RentBuyError::InvalidHorizon {
            horizon: i64::from(years),
            reason: format!("Holding horizon cannot exceed {MAX_YEARS} years"),
        });
    }
    Ok(years * MONTHS_PER_YEAR)
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Fixed-rate, level-payment loan terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: Money,
    /// Periodic (monthly) rate as a decimal
    pub monthly_rate: Rate,
    /// Full loan term in months
    pub term_months: u32,
}

/// One month of the amortization ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based month index
    pub month: u32,
    /// month / 12
    pub year_fraction: Decimal,
    pub interest: Money,
    pub principal: Money,
    /// interest + principal, equal to the EMI
    pub payment: Money,
    /// Outstanding balance after this month's payment
    pub balance: Money,
    /// House price minus outstanding balance
    pub equity: Money,
}

/// Interest and principal paid within one loan year (months (y-1)*12+1 ..= y*12).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualAggregate {
    pub year: u32,
    pub interest: Money,
    pub principal: Money,
    /// Number of instalments that fell in the year (12 unless the loan matured)
    pub instalments: u32,
    pub closing_balance: Money,
    pub closing_equity: Money,
}

/// Monthly ledger truncated to a holding horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub house_price: Money,
    pub emi: Money,
    /// Requested horizon; may exceed `rows.len()` when the loan matures first
    pub horizon_months: u32,
    pub rows: Vec<AmortizationRow>,
}

/// Input for the amortization entry point. Rates are percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub price: Money,
    /// Fraction of the price paid upfront, in [0, 1)
    pub down_payment_fraction: Decimal,
    /// Annual loan rate, e.g. 8.5 for 8.5%
    pub loan_rate_pct: Percent,
    pub tenure_years: u32,
    pub horizon_years: u32,
}

/// Output of the amortization entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub loan_amount: Money,
    pub monthly_rate: Rate,
    pub emi: Money,
    pub term_months: u32,
    pub horizon_months: u32,
    pub rows: Vec<AmortizationRow>,
    /// Year-end equity buildup and per-year interest/principal
    pub annual_summary: Vec<AnnualAggregate>,
    pub total_interest_paid: Money,
    pub total_principal_paid: Money,
    pub closing_balance: Money,
    pub closing_equity: Money,
}

// ---------------------------------------------------------------------------
// Loan terms
// ---------------------------------------------------------------------------

impl LoanTerms {
    pub fn new(principal: Money, monthly_rate: Rate, term_months: u32) -> RentBuyResult<Self> {
        if principal < Decimal::ZERO {
            return Err(RentBuyError::InvalidLoanTerms {
                field: "principal".into(),
                reason: "Principal cannot be negative".into(),
            });
        }
        if monthly_rate < Decimal::ZERO {
            return Err(RentBuyError::InvalidLoanTerms {
                field: "monthly_rate".into(),
                reason: "Loan rate cannot be negative".into(),
            });
        }
        if term_months == 0 {
            return Err(RentBuyError::InvalidLoanTerms {
                field: "term_months".into(),
                reason: "Loan term must be positive".into(),
            });
        }
        Ok(Self {
            principal,
            monthly_rate,
            term_months,
        })
    }

    /// Terms for financing `price` after a down payment, at an annual percentage rate.
    pub fn from_purchase(
        price: Money,
        down_payment_fraction: Decimal,
        loan_rate_pct: Percent,
        tenure_years: u32,
    ) -> RentBuyResult<Self> {
        validate_purchase(price, down_payment_fraction, loan_rate_pct, tenure_years)?;
        let principal = price * (Decimal::ONE - down_payment_fraction);
        let monthly_rate = pct_to_rate(loan_rate_pct) / Decimal::from(MONTHS_PER_YEAR);
        Self::new(principal, monthly_rate, tenure_years * MONTHS_PER_YEAR)
    }

    /// Level monthly instalment over the full term.
    pub fn emi(&self) -> RentBuyResult<Money> {
        annuity_payment(self.principal, self.monthly_rate, self.term_months)
    }
}

fn validate_purchase(
    price: Money,
    down_payment_fraction: Decimal,
    loan_rate_pct: Percent,
    tenure_years: u32,
) -> RentBuyResult<()> {
    if price < Decimal::ZERO {
        return Err(RentBuyError::InvalidLoanTerms {
            field: "price".into(),
            reason: "House price cannot be negative".into(),
        });
    }
    if down_payment_fraction < Decimal::ZERO || down_payment_fraction >= Decimal::ONE {
        return Err(RentBuyError::InvalidLoanTerms {
            field: "down_payment_fraction".into(),
            reason: "Down payment fraction must be in [0, 1)".into(),
        });
    }
    if loan_rate_pct < Decimal::ZERO {
        return Err(RentBuyError::InvalidLoanTerms {
            field: "loan_rate_pct".into(),
            reason: "Loan rate cannot be negative".into(),
        });
    }
    if tenure_years == 0 {
        return Err(RentBuyError::InvalidLoanTerms {
            field: "tenure_years".into(),
            reason: "Loan tenure must be at least 1 year".into(),
        });
    }
    if tenure_years > MAX_YEARS {
        return Err(RentBuyError::InvalidLoanTerms {
            field: "tenure_years".into(),
            reason: format!("Loan tenure cannot exceed {MAX_YEARS} years"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Build the monthly ledger for months 1..=horizon_months.
///
/// The EMI is always computed over the full term. Rows stop at the horizon, or at
/// maturity if the loan is repaid first; later months are never computed.
pub fn amortize(
    terms: &LoanTerms,
    house_price: Money,
    horizon_months: u32,
) -> RentBuyResult<AmortizationSchedule> {
    if horizon_months == 0 {
        return Err(RentBuyError::InvalidHorizon {
            horizon: 0,
            reason: "Holding horizon must be at least one month".into(),
        });
    }
    if horizon_months > MAX_YEARS * MONTHS_PER_YEAR {
        return Err(RentBuyError::InvalidHorizon {
            horizon: i64::from(horizon_months / MONTHS_PER_YEAR),
            reason: format!("Holding horizon cannot exceed {MAX_YEARS} years"),
        });
    }

    let emi = terms.emi()?;
    let months = horizon_months.min(terms.term_months);
    let months_per_year = Decimal::from(MONTHS_PER_YEAR);

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = terms.principal;

    for month in 1..=months {
        let interest = balance * terms.monthly_rate;
        let principal = emi - interest;
        balance -= principal;

        rows.push(AmortizationRow {
            month,
            year_fraction: Decimal::from(month) / months_per_year,
            interest,
            principal,
            payment: interest + principal,
            balance,
            equity: house_price - balance,
        });
    }

    log::debug!(
        "amortized {} of {} requested months (term {}), emi {}",
        rows.len(),
        horizon_months,
        terms.term_months,
        emi
    );

    Ok(AmortizationSchedule {
        terms: *terms,
        house_price,
        emi,
        horizon_months,
        rows,
    })
}

impl AmortizationSchedule {
    /// Prefix of this ledger for a shorter horizon. Earlier months are unchanged,
    /// so slicing a long schedule equals recomputing a short one.
    pub fn truncated(&self, horizon_months: u32) -> AmortizationSchedule {
        let horizon_months = horizon_months.min(self.horizon_months);
        let rows = self
            .rows
            .iter()
            .take_while(|r| r.month <= horizon_months)
            .cloned()
            .collect();
        AmortizationSchedule {
            terms: self.terms,
            house_price: self.house_price,
            emi: self.emi,
            horizon_months,
            rows,
        }
    }

    /// Number of years the horizon touches (a partial final year counts).
    pub fn horizon_years(&self) -> u32 {
        self.horizon_months.div_ceil(MONTHS_PER_YEAR)
    }

    /// Outstanding balance after `month`, if that month is in the ledger.
    pub fn balance_at(&self, month: u32) -> Option<Money> {
        self.rows.iter().find(|r| r.month == month).map(|r| r.balance)
    }

    /// Balance once every computed instalment up to `month` has been paid.
    fn balance_after(&self, month: u32) -> Money {
        self.rows
            .iter()
            .take_while(|r| r.month <= month)
            .last()
            .map(|r| r.balance)
            .unwrap_or(self.terms.principal)
    }

    /// Sum interest and principal over months (year-1)*12+1 ..= year*12.
    pub fn annual_aggregate(&self, year: u32) -> AnnualAggregate {
        let first = year.saturating_sub(1).saturating_mul(MONTHS_PER_YEAR).saturating_add(1);
        let last = year.saturating_mul(MONTHS_PER_YEAR);

        let mut interest = Decimal::ZERO;
        let mut principal = Decimal::ZERO;
        let mut instalments = 0;
        for row in self.rows.iter().filter(|r| r.month >= first && r.month <= last) {
            interest += row.interest;
            principal += row.principal;
            instalments += 1;
        }

        let closing_balance = self.balance_after(last);
        AnnualAggregate {
            year,
            interest,
            principal,
            instalments,
            closing_balance,
            closing_equity: self.house_price - closing_balance,
        }
    }

    /// One aggregate per year of the horizon.
    pub fn annual_aggregates(&self) -> Vec<AnnualAggregate> {
        (1..=self.horizon_years())
            .map(|y| self.annual_aggregate(y))
            .collect()
    }

    pub fn total_interest(&self) -> Money {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_principal(&self) -> Money {
        self.rows.iter().map(|r| r.principal).sum()
    }

    /// True when the loan matures before the horizon ends.
    pub fn matures_within_horizon(&self) -> bool {
        self.terms.term_months < self.horizon_months
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amortization ledger and equity buildup for a purchase held `horizon_years`.
pub fn compute_amortization(
    input: &AmortizationInput,
) -> RentBuyResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.horizon_years == 0 {
        return Err(RentBuyError::InvalidHorizon {
            horizon: 0,
            reason: "Holding horizon must be at least 1 year".into(),
        });
    }

    let terms = LoanTerms::from_purchase(
        input.price,
        input.down_payment_fraction,
        input.loan_rate_pct,
        input.tenure_years,
    )?;
    let schedule = amortize(&terms, input.price, horizon_months(input.horizon_years)?)?;

    if schedule.matures_within_horizon() {
        warnings.push(format!(
            "Holding horizon of {} years exceeds the {}-year loan tenure; the ledger ends at maturity",
            input.horizon_years, input.tenure_years
        ));
    }
    if input.down_payment_fraction < dec!(0.10) || input.down_payment_fraction > dec!(0.50) {
        warnings.push(format!(
            "Down payment of {}% is outside the typical 10%-50% range",
            input.down_payment_fraction * dec!(100)
        ));
    }

    let annual_summary = schedule.annual_aggregates();
    let closing_balance = schedule.balance_after(schedule.horizon_months);
    let output = AmortizationOutput {
        loan_amount: terms.principal,
        monthly_rate: terms.monthly_rate,
        emi: schedule.emi,
        term_months: terms.term_months,
        horizon_months: schedule.horizon_months,
        total_interest_paid: schedule.total_interest(),
        total_principal_paid: schedule.total_principal(),
        closing_balance,
        closing_equity: input.price - closing_balance,
        annual_summary,
        rows: schedule.rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment (EMI) amortization with equity buildup",
        input,
        warnings,
        elapsed,
        output,
    ))
}
