use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rentbuy_core::amortization::{self, AmortizationInput};
use rentbuy_core::tax::{self, TaxParams, TaxSavingInput};

use super::params::ParamArgs;
use crate::input;

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct AmortizationArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Omit the monthly rows and keep only the yearly summary
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for a single year's tax saving
#[derive(Args)]
pub struct TaxSavingArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Interest paid during the year
    #[arg(long)]
    pub interest: Option<Decimal>,

    /// Principal repaid during the year
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Income tax rate in percent
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Annual interest deduction limit
    #[arg(long)]
    pub interest_cap: Option<Decimal>,

    /// Annual principal deduction limit
    #[arg(long)]
    pub principal_cap: Option<Decimal>,
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = args.params.resolve()?;
    let amortization_input = AmortizationInput {
        price: params.price,
        down_payment_fraction: params.down_payment_fraction,
        loan_rate_pct: params.loan_rate_pct,
        tenure_years: params.tenure_years,
        horizon_years: params.holding_horizon_years,
    };

    let mut result = amortization::compute_amortization(&amortization_input)?;
    if args.summary {
        result.result.rows.clear();
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_tax_saving(args: TaxSavingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: TaxSavingInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let defaults = TaxParams::default();
        TaxSavingInput {
            annual_interest: args
                .interest
                .ok_or("--interest is required (or provide --input)")?,
            annual_principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            params: TaxParams {
                tax_rate_pct: args.tax_rate.unwrap_or(defaults.tax_rate_pct),
                interest_cap: args.interest_cap.unwrap_or(defaults.interest_cap),
                principal_cap: args.principal_cap.unwrap_or(defaults.principal_cap),
            },
        }
    };

    let result = tax::compute_tax_saving(&tax_input)?;
    Ok(serde_json::to_value(result)?)
}
