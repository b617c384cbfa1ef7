use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentBuyError;
use crate::types::{pct_to_rate, with_metadata, ComputationOutput, Money, Percent};
use crate::RentBuyResult;

/// Home-loan deduction parameters. Caps apply per year with no carry-forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxParams {
    /// Marginal income tax rate, e.g. 30 for 30%
    pub tax_rate_pct: Percent,
    /// Maximum deductible interest per year
    pub interest_cap: Money,
    /// Maximum deductible principal repayment per year
    pub principal_cap: Money,
}

impl Default for TaxParams {
    fn default() -> Self {
        Self {
            tax_rate_pct: dec!(30),
            interest_cap: dec!(200000),
            principal_cap: dec!(150000),
        }
    }
}

impl TaxParams {
    pub(crate) fn validate(&self) -> RentBuyResult<()> {
        if self.tax_rate_pct < Decimal::ZERO || self.tax_rate_pct > dec!(100) {
            return Err(RentBuyError::InvalidInput {
                field: "tax_rate_pct".into(),
                reason: "Tax rate must be between 0 and 100".into(),
            });
        }
        if self.interest_cap < Decimal::ZERO {
            return Err(RentBuyError::InvalidInput {
                field: "interest_cap".into(),
                reason: "Interest deduction cap cannot be negative".into(),
            });
        }
        if self.principal_cap < Decimal::ZERO {
            return Err(RentBuyError::InvalidInput {
                field: "principal_cap".into(),
                reason: "Principal deduction cap cannot be negative".into(),
            });
        }
        Ok(())
    }
}

/// (min(interest, cap) + min(principal, cap)) * tax rate
pub fn tax_saving(annual_interest: Money, annual_principal: Money, params: &TaxParams) -> Money {
    let interest_claim = annual_interest.min(params.interest_cap);
    let principal_claim = annual_principal.min(params.principal_cap);
    (interest_claim + principal_claim) * pct_to_rate(params.tax_rate_pct)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSavingInput {
    pub annual_interest: Money,
    pub annual_principal: Money,
    #[serde(flatten)]
    pub params: TaxParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSavingOutput {
    pub tax_saving: Money,
    pub interest_claimed: Money,
    pub principal_claimed: Money,
    /// Interest paid exceeded the cap
    pub interest_cap_reached: bool,
    /// Principal repaid exceeded the cap
    pub principal_cap_reached: bool,
}

/// Tax saved in one year from home-loan interest and principal deductions.
pub fn compute_tax_saving(
    input: &TaxSavingInput,
) -> RentBuyResult<ComputationOutput<TaxSavingOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.params.validate()?;
    if input.annual_interest < Decimal::ZERO {
        return Err(RentBuyError::InvalidInput {
            field: "annual_interest".into(),
            reason: "Interest paid cannot be negative".into(),
        });
    }
    if input.annual_principal < Decimal::ZERO {
        return Err(RentBuyError::InvalidInput {
            field: "annual_principal".into(),
            reason: "Principal paid cannot be negative".into(),
        });
    }

    let interest_cap_reached = input.annual_interest > input.params.interest_cap;
    let principal_cap_reached = input.annual_principal > input.params.principal_cap;
    if interest_cap_reached {
        warnings.push(format!(
            "Interest of {} exceeds the deduction cap of {}; {} is not deductible",
            input.annual_interest,
            input.params.interest_cap,
            input.annual_interest - input.params.interest_cap
        ));
    }
    if principal_cap_reached {
        warnings.push(format!(
            "Principal of {} exceeds the deduction cap of {}",
            input.annual_principal, input.params.principal_cap
        ));
    }

    let output = TaxSavingOutput {
        tax_saving: tax_saving(input.annual_interest, input.annual_principal, &input.params),
        interest_claimed: input.annual_interest.min(input.params.interest_cap),
        principal_claimed: input.annual_principal.min(input.params.principal_cap),
        interest_cap_reached,
        principal_cap_reached,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capped home-loan interest and principal deduction",
        input,
        warnings,
        elapsed,
        output,
    ))
}
