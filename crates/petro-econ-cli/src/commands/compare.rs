use clap::Args;
use serde_json::Value;

use petro_econ_core::incremental::{self, IncrementalInput};
use petro_econ_core::model::EconomicsInput;

use crate::input;

/// Arguments for a base-vs-scenario comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Base case economics input (JSON/YAML)
    #[arg(long, required_unless_present = "input")]
    pub base: Option<String>,

    /// Scenario economics input (JSON/YAML)
    #[arg(long, required_unless_present = "input")]
    pub scenario: Option<String>,

    /// Precomputed incremental input with both result series and metrics
    #[arg(long, conflicts_with_all = ["base", "scenario"])]
    pub input: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = match (args.input, args.base, args.scenario) {
        (Some(path), _, _) => {
            let incremental_input: IncrementalInput = input::file::read_input(&path)?;
            incremental::calculate_incremental_metrics(&incremental_input)?
        }
        (None, Some(base), Some(scenario)) => {
            let base: EconomicsInput = input::file::read_input(&base)?;
            let scenario: EconomicsInput = input::file::read_input(&scenario)?;
            incremental::compare_scenarios(&base, &scenario)?
        }
        _ => return Err("--base and --scenario (or --input) are required".into()),
    };
    Ok(serde_json::to_value(result)?)
}
