use clap::Args;
use rust_decimal::Decimal;

use rentbuy_core::cashflow::BuyRentParams;

use crate::input;

/// Buy-vs-rent assumptions shared by every comparison command.
///
/// Resolution order: `--input` file, then piped stdin JSON, then built-in
/// defaults. Individual flags always override whichever base was loaded.
#[derive(Args, Debug, Default)]
pub struct ParamArgs {
    /// Path to a JSON or YAML parameter file
    #[arg(long)]
    pub input: Option<String>,

    /// House price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment as a fraction of price (e.g. 0.2 for 20%)
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Annual loan interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub loan_rate: Option<Decimal>,

    /// Loan tenure in years
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Monthly rent today
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Annual rent growth in percent
    #[arg(long, allow_negative_numbers = true)]
    pub rent_growth: Option<Decimal>,

    /// Annual house price growth in percent
    #[arg(long, allow_negative_numbers = true)]
    pub house_growth: Option<Decimal>,

    /// Return on the invested down payment when renting, in percent
    #[arg(long, allow_negative_numbers = true)]
    pub investment_return: Option<Decimal>,

    /// General inflation in percent
    #[arg(long, allow_negative_numbers = true)]
    pub inflation: Option<Decimal>,

    /// Nominal discount rate in percent
    #[arg(long, allow_negative_numbers = true)]
    pub discount_rate: Option<Decimal>,

    /// Years until the house is sold
    #[arg(long, alias = "exit-year")]
    pub horizon: Option<u32>,

    /// Buy commission in percent of price
    #[arg(long)]
    pub buy_commission: Option<Decimal>,

    /// Sell commission in percent of resale price
    #[arg(long)]
    pub sell_commission: Option<Decimal>,

    /// Annual maintenance in percent of price
    #[arg(long)]
    pub maintenance: Option<Decimal>,

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

impl ParamArgs {
    pub fn resolve(&self) -> Result<BuyRentParams, Box<dyn std::error::Error>> {
        let base: BuyRentParams = if let Some(ref path) = self.input {
            input::file::read_input(path)?
        } else if let Some(data) = input::stdin::read_stdin()? {
            serde_json::from_value(data)?
        } else {
            BuyRentParams::default()
        };

        let params = self.apply_overrides(base);
        log::debug!("resolved parameters: {params:?}");
        Ok(params)
    }

    fn apply_overrides(&self, mut params: BuyRentParams) -> BuyRentParams {
        if let Some(v) = self.price {
            params.price = v;
        }
        if let Some(v) = self.down_payment {
            params.down_payment_fraction = v;
        }
        if let Some(v) = self.loan_rate {
            params.loan_rate_pct = v;
        }
        if let Some(v) = self.tenure {
            params.tenure_years = v;
        }
        if let Some(v) = self.rent {
            params.monthly_rent = v;
        }
        if let Some(v) = self.rent_growth {
            params.rent_growth_pct = v;
        }
        if let Some(v) = self.house_growth {
            params.house_growth_pct = v;
        }
        if let Some(v) = self.investment_return {
            params.investment_return_pct = v;
        }
        if let Some(v) = self.inflation {
            params.inflation_pct = v;
        }
        if let Some(v) = self.discount_rate {
            params.discount_rate_pct = v;
        }
        if let Some(v) = self.horizon {
            params.holding_horizon_years = v;
        }
        if let Some(v) = self.buy_commission {
            params.buy_commission_pct = v;
        }
        if let Some(v) = self.sell_commission {
            params.sell_commission_pct = v;
        }
        if let Some(v) = self.maintenance {
            params.maintenance_pct = v;
        }
        if let Some(v) = self.tax_rate {
            params.tax.tax_rate_pct = v;
        }
        if let Some(v) = self.interest_cap {
            params.tax.interest_cap = v;
        }
        if let Some(v) = self.principal_cap {
            params.tax.principal_cap = v;
        }
        params
    }
}
