use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(json: &str) -> NapiResult<T> {
    serde_json::from_str(json).map_err(to_napi_error)
}

fn render<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Cashflow
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_economics(input_json: String) -> NapiResult<String> {
    let input: petro_econ_core::model::EconomicsInput = parse(&input_json)?;
    let output =
        petro_econ_core::cashflow::calculate_economics(&input).map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_sensitivity(input_json: String) -> NapiResult<String> {
    let input: petro_econ_core::sensitivity::SensitivityInput = parse(&input_json)?;
    let output =
        petro_econ_core::sensitivity::calculate_sensitivity(&input).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn calculate_sensitivity_grid(input_json: String) -> NapiResult<String> {
    let input: petro_econ_core::sensitivity::GridInput = parse(&input_json)?;
    let output = petro_econ_core::sensitivity::calculate_sensitivity_grid(&input)
        .map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Incremental
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_incremental_metrics(input_json: String) -> NapiResult<String> {
    let input: petro_econ_core::incremental::IncrementalInput = parse(&input_json)?;
    let output = petro_econ_core::incremental::calculate_incremental_metrics(&input)
        .map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn compare_scenarios(base_json: String, scenario_json: String) -> NapiResult<String> {
    let base: petro_econ_core::model::EconomicsInput = parse(&base_json)?;
    let scenario: petro_econ_core::model::EconomicsInput = parse(&scenario_json)?;
    let output = petro_econ_core::incremental::compare_scenarios(&base, &scenario)
        .map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_reconciliation(input_json: String) -> NapiResult<String> {
    let input: petro_econ_core::reconciliation::ReconciliationInput = parse(&input_json)?;
    let output = petro_econ_core::reconciliation::calculate_reconciliation(&input)
        .map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_report(input_json: String) -> NapiResult<String> {
    let input: petro_econ_core::model::EconomicsInput = parse(&input_json)?;
    let output =
        petro_econ_core::reporting::calculate_report(&input).map_err(to_napi_error)?;
    render(&output)
}
