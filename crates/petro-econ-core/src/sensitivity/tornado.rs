use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::perturbation::{ParamType, SensitivityParameter, MAX_START_SHIFT_YEARS};
use crate::cashflow::engine::evaluate_without_breakeven;
use crate::error::PetroEconError;
use crate::model::EconomicsInput;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::PetroEconResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Swing magnitudes. Percent swings apply as `±s%`, the start date as `±s`
/// years. A zero swing leaves that parameter out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivitySwings {
    #[serde(default = "default_swing")]
    pub price: Percent,
    #[serde(default = "default_swing")]
    pub capex: Percent,
    #[serde(default = "default_swing")]
    pub opex: Percent,
    #[serde(default = "default_swing")]
    pub production: Percent,
    #[serde(default = "default_shift")]
    pub start_date: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<Percent>,
}

fn default_swing() -> Percent {
    dec!(20)
}

fn default_shift() -> i32 {
    1
}

impl Default for SensitivitySwings {
    fn default() -> Self {
        SensitivitySwings {
            price: default_swing(),
            capex: default_swing(),
            opex: default_swing(),
            production: default_swing(),
            start_date: default_shift(),
            discount_rate: None,
        }
    }
}

impl SensitivitySwings {
    /// Parameters with a non-zero swing, in display order.
    fn active(&self) -> Vec<(SensitivityParameter, Decimal)> {
        let mut list = vec![
            (SensitivityParameter::Price, self.price),
            (SensitivityParameter::Capex, self.capex),
            (SensitivityParameter::Opex, self.opex),
            (SensitivityParameter::Production, self.production),
            (SensitivityParameter::StartDate, Decimal::from(self.start_date)),
        ];
        if let Some(s) = self.discount_rate {
            list.push((SensitivityParameter::DiscountRate, s));
        }
        list.retain(|(_, s)| !s.is_zero());
        list
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub base: EconomicsInput,
    #[serde(default)]
    pub swings: SensitivitySwings,
}

/// NPV and IRR of one perturbed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseMetrics {
    pub npv: Money,
    pub irr: Option<Rate>,
}

/// One tornado bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub id: String,
    pub name: String,
    /// Swing magnitude (percent or years)
    pub param_value: Decimal,
    pub param_type: ParamType,
    pub low_case: CaseMetrics,
    pub high_case: CaseMetrics,
    pub npv_low_delta: Money,
    pub npv_high_delta: Money,
    pub npv_range: Money,
    pub irr_low_delta: Option<Rate>,
    pub irr_high_delta: Option<Rate>,
    pub irr_range: Option<Rate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub base_npv: Money,
    pub base_irr: Option<Rate>,
    /// Sorted by descending `npv_range`
    pub analysis_data: Vec<SensitivityRow>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// One-factor-at-a-time tornado analysis around the base case.
pub fn calculate_sensitivity(
    input: &SensitivityInput,
) -> PetroEconResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_swings(&input.swings)?;

    let base = evaluate_without_breakeven(&input.base)?;
    let base_npv = base.metrics.npv;
    let base_irr = base.metrics.irr;

    let mut analysis_data = Vec::new();
    for (param, swing) in input.swings.active() {
        debug!(parameter = param.id(), %swing, "flexing parameter");
        let low = run_case(&input.base, param, -swing);
        let high = run_case(&input.base, param, swing);

        let (low_case, high_case) = match (low, high) {
            (Ok(l), Ok(h)) => (l, h),
            (Err(e), _) | (_, Err(e)) => {
                warn!(parameter = param.id(), error = %e, "skipping tornado bar");
                warnings.push(format!("{} skipped: {e}", param.label()));
                continue;
            }
        };

        let npv_low_delta = low_case.npv - base_npv;
        let npv_high_delta = high_case.npv - base_npv;
        let irr_low_delta = delta(low_case.irr, base_irr);
        let irr_high_delta = delta(high_case.irr, base_irr);
        let irr_range = match (irr_low_delta, irr_high_delta) {
            (Some(l), Some(h)) => Some(l.abs() + h.abs()),
            _ => None,
        };

        analysis_data.push(SensitivityRow {
            id: param.id().into(),
            name: param.label().into(),
            param_value: swing,
            param_type: param.param_type(),
            low_case,
            high_case,
            npv_low_delta,
            npv_high_delta,
            npv_range: npv_low_delta.abs() + npv_high_delta.abs(),
            irr_low_delta,
            irr_high_delta,
            irr_range,
        });
    }

    analysis_data.sort_by(|a, b| b.npv_range.cmp(&a.npv_range));

    let output = SensitivityOutput {
        base_npv,
        base_irr,
        analysis_data,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-at-a-time NPV/IRR Sensitivity (Tornado)",
        &serde_json::json!({
            "swings": input.swings,
            "discount_rate": input.base.model_settings.discount_rate.to_string(),
            "reference_year": input.base.model_settings.reference_year(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn run_case(
    base: &EconomicsInput,
    param: SensitivityParameter,
    amount: Decimal,
) -> PetroEconResult<CaseMetrics> {
    let perturbed = param.apply(base, amount)?;
    let out = evaluate_without_breakeven(&perturbed)?;
    Ok(CaseMetrics {
        npv: out.metrics.npv,
        irr: out.metrics.irr,
    })
}

fn delta(case: Option<Rate>, base: Option<Rate>) -> Option<Rate> {
    Some(case? - base?)
}

fn validate_swings(swings: &SensitivitySwings) -> PetroEconResult<()> {
    let percent_swings = [
        ("swings.price", Some(swings.price)),
        ("swings.capex", Some(swings.capex)),
        ("swings.opex", Some(swings.opex)),
        ("swings.production", Some(swings.production)),
        ("swings.discount_rate", swings.discount_rate),
    ];
    for (field, value) in percent_swings {
        if let Some(v) = value {
            if v < Decimal::ZERO || v >= dec!(100) {
                return Err(PetroEconError::invalid(
                    field,
                    "Swing must be at least 0 and below 100%",
                ));
            }
        }
    }
    if !(0..=MAX_START_SHIFT_YEARS).contains(&swings.start_date) {
        return Err(PetroEconError::invalid(
            "swings.start_date",
            format!("Start date shift must be between 0 and {MAX_START_SHIFT_YEARS} years"),
        ));
    }
    Ok(())
}
