use clap::Args;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use rentbuy_core::scenarios::scenario::{self, ScenarioDelta, ScenarioInput};
use rentbuy_core::scenarios::sensitivity::{
    self, GrowthSweepInput, HoldingPeriodSweepInput, SweepRange,
};

use super::params::ParamArgs;

/// Arguments for named growth scenarios
#[derive(Args)]
pub struct ScenarioArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Scenario as name:house_growth_delta:rent_growth_delta (repeatable,
    /// e.g. "Boom:3:2"). Defaults to Base, Boom and Crash.
    #[arg(long = "scenario", allow_hyphen_values = true)]
    pub scenarios: Vec<String>,
}

/// Arguments for the holding-period sweep
#[derive(Args)]
pub struct HoldingSweepArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Horizons as start:end[:step] in years (e.g. "3:25")
    #[arg(long, default_value = "3:25")]
    pub horizons: String,
}

/// Arguments for the house growth sweep
#[derive(Args)]
pub struct GrowthSweepArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// House growth range as start:end:step in percent (e.g. "-5:15:1")
    #[arg(long, default_value = "-5:15:1", allow_hyphen_values = true)]
    pub range: String,
}

fn parse_scenario(raw: &str) -> Result<ScenarioDelta, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        return Err(format!(
            "Scenario must be name:house_delta:rent_delta, got '{}'",
            raw
        )
        .into());
    }
    Ok(ScenarioDelta::new(parts[0], parts[1].parse()?, parts[2].parse()?))
}

fn parse_range(raw: &str, default_step: Decimal) -> Result<SweepRange, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = raw.split(':').collect();
    match parts.as_slice() {
        [start, end] => Ok(SweepRange::new(start.parse()?, end.parse()?, default_step)),
        [start, end, step] => Ok(SweepRange::new(start.parse()?, end.parse()?, step.parse()?)),
        _ => Err(format!("Range must be start:end[:step], got '{}'", raw).into()),
    }
}

fn parse_horizons(raw: &str) -> Result<Vec<u32>, Box<dyn std::error::Error>> {
    let range = parse_range(raw, dec!(1))?;
    range
        .values()?
        .into_iter()
        .map(|v| -> Result<u32, Box<dyn std::error::Error>> {
            if v.fract() != Decimal::ZERO || v < Decimal::ZERO {
                return Err(format!("Horizon must be a whole number of years, got {v}").into());
            }
            v.to_u32()
                .ok_or_else(|| format!("Horizon {v} out of range").into())
        })
        .collect()
}

pub fn run_scenarios(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let base = args.params.resolve()?;
    let scenarios = if args.scenarios.is_empty() {
        scenario::default_scenarios()
    } else {
        args.scenarios
            .iter()
            .map(|s| parse_scenario(s))
            .collect::<Result<Vec<_>, _>>()?
    };

    let result = scenario::run_scenarios(&ScenarioInput { scenarios, base })?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_holding_sweep(args: HoldingSweepArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = HoldingPeriodSweepInput {
        params: args.params.resolve()?,
        horizons: parse_horizons(&args.horizons)?,
    };
    let result = sensitivity::sweep_holding_period(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_growth_sweep(args: GrowthSweepArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = GrowthSweepInput {
        params: args.params.resolve()?,
        house_growth_pct: parse_range(&args.range, dec!(1))?,
    };
    let result = sensitivity::sweep_house_growth(&input)?;
    Ok(serde_json::to_value(result)?)
}
