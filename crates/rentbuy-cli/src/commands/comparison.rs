use clap::Args;
use serde_json::Value;

use rentbuy_core::comparison;

use super::params::ParamArgs;

/// Arguments for a single buy-vs-rent comparison
#[derive(Args)]
pub struct NpvArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Omit the yearly cash-flow breakdown
    #[arg(long)]
    pub brief: bool,
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = args.params.resolve()?;
    let result = comparison::compute_npv(params.base_growth(), &params)?;

    let mut value = serde_json::to_value(result)?;
    if args.brief {
        if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
            result.remove("cash_flows");
        }
    }
    Ok(value)
}
