use clap::Args;
use serde_json::Value;

use petro_econ_core::cashflow;
use petro_econ_core::model::EconomicsInput;
use petro_econ_core::reporting;

use crate::input;

/// Arguments for a single cashflow run
#[derive(Args)]
pub struct EconomicsArgs {
    /// Path to a JSON/YAML economics input file (stdin JSON when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_economics(args: EconomicsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let economics_input = read_economics_input(args.input.as_deref())?;
    let result = cashflow::calculate_economics(&economics_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the MM / percent summary report
#[derive(Args)]
pub struct ReportArgs {
    /// Path to a JSON/YAML economics input file (stdin JSON when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_report(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let economics_input = read_economics_input(args.input.as_deref())?;
    let result = reporting::calculate_report(&economics_input)?;
    Ok(serde_json::to_value(result)?)
}

pub(crate) fn read_economics_input(
    path: Option<&str>,
) -> Result<EconomicsInput, Box<dyn std::error::Error>> {
    input::stdin::read_document_as(path)
}
