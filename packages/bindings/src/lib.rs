use napi::Result as NapiResult;
use napi_derive::napi;

use rentbuy_core::amortization::{self, AmortizationInput};
use rentbuy_core::cashflow::BuyRentParams;
use rentbuy_core::comparison;
use rentbuy_core::scenarios::scenario::{self, ScenarioInput};
use rentbuy_core::scenarios::sensitivity::{self, GrowthSweepInput, HoldingPeriodSweepInput};
use rentbuy_core::tax::{self, TaxSavingInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::compute_amortization(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn tax_saving(input_json: String) -> NapiResult<String> {
    let input: TaxSavingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = tax::compute_tax_saving(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[napi]
pub fn buy_vs_rent_npv(input_json: String) -> NapiResult<String> {
    let params: BuyRentParams = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        comparison::compute_npv(params.base_growth(), &params).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn run_scenarios(input_json: String) -> NapiResult<String> {
    let input: ScenarioInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = scenario::run_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn holding_period_sweep(input_json: String) -> NapiResult<String> {
    let input: HoldingPeriodSweepInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = sensitivity::sweep_holding_period(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn house_growth_sweep(input_json: String) -> NapiResult<String> {
    let input: GrowthSweepInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = sensitivity::sweep_house_growth(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
