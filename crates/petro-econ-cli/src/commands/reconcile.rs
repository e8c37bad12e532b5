use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use petro_econ_core::cashflow;
use petro_econ_core::reconciliation::{self, ReconciliationInput};

use super::economics::read_economics_input;
use crate::input;

/// Arguments for reconciling a model run against imported figures
#[derive(Args)]
pub struct ReconcileArgs {
    /// Economics input to run (JSON/YAML; stdin JSON when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Imported figures: CSV with year,revenue,opex,net_cashflow or a JSON/YAML array
    #[arg(long)]
    pub imported: String,

    /// Largest tolerated difference per line, in percent
    #[arg(long, default_value = "1")]
    pub threshold: Decimal,
}

pub fn run_reconcile(args: ReconcileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let economics_input = read_economics_input(args.input.as_deref())?;
    let model = cashflow::evaluate(&economics_input)?;
    let imported_rows = input::file::read_imported_rows(&args.imported)?;

    let result = reconciliation::calculate_reconciliation(&ReconciliationInput {
        model_results: model.annual_results,
        imported_rows,
        threshold_pct: args.threshold,
    })?;
    Ok(serde_json::to_value(result)?)
}
