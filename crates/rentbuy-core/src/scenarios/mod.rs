pub mod scenario;
pub mod sensitivity;

pub use scenario::{default_scenarios, run_scenarios, ScenarioDelta, ScenarioInput, ScenarioResult};
pub use sensitivity::{sweep_holding_period, sweep_house_growth, SweepRange};
