use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

use super::perturbation::SensitivityParameter;
use crate::cashflow::engine::evaluate_without_breakeven;
use crate::error::PetroEconError;
use crate::model::EconomicsInput;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::PetroEconResult;

/// One swept axis: percentage changes from `min` to `max` by `step`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridVariable {
    pub parameter: SensitivityParameter,
    pub min: Percent,
    pub max: Percent,
    pub step: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridInput {
    pub base: EconomicsInput,
    pub variable_1: GridVariable,
    pub variable_2: GridVariable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridOutput {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Percent>,
    pub variable_2_values: Vec<Percent>,
    /// `matrix[i][j]` = NPV with variable 1 at `variable_1_values[i]` and
    /// variable 2 at `variable_2_values[j]`; `None` where the run failed
    pub matrix: Vec<Vec<Option<Money>>>,
    pub base_case_value: Money,
    /// Cell closest to the unflexed case
    pub base_case_position: (usize, usize),
}

fn generate_sweep_values(var: &GridVariable) -> PetroEconResult<Vec<Percent>> {
    let field = format!("variable:{}", var.parameter.id());
    if var.parameter == SensitivityParameter::StartDate {
        return Err(PetroEconError::invalid(
            field,
            "Start date cannot be swept as a percentage",
        ));
    }
    if var.step <= Decimal::ZERO {
        return Err(PetroEconError::invalid(field, "Step must be positive"));
    }
    if var.min > var.max {
        return Err(PetroEconError::invalid(field, "Min must be <= max"));
    }
    if var.min <= Decimal::from(-100) {
        return Err(PetroEconError::invalid(field, "Min must be above -100%"));
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        current += var.step;
    }
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }
    Ok(values)
}

fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Two-way NPV table over percentage changes of two drivers.
pub fn calculate_sensitivity_grid(
    input: &GridInput,
) -> PetroEconResult<ComputationOutput<GridOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.variable_1.parameter == input.variable_2.parameter {
        return Err(PetroEconError::invalid(
            "variable_2",
            "Grid variables must be different parameters",
        ));
    }
    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;

    let base_case_value = evaluate_without_breakeven(&input.base)?.metrics.npv;

    let p1 = input.variable_1.parameter;
    let p2 = input.variable_2.parameter;
    let mut matrix = Vec::with_capacity(v1_values.len());

    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            let cell = p1
                .apply(&input.base, *v1)
                .and_then(|flexed| p2.apply(&flexed, *v2))
                .and_then(|flexed| evaluate_without_breakeven(&flexed));
            match cell {
                Ok(out) => row.push(Some(out.metrics.npv)),
                Err(e) => {
                    warn!(v1 = %v1, v2 = %v2, error = %e, "grid cell failed");
                    warnings.push(format!("Evaluation failed at ({v1}%, {v2}%): {e}"));
                    row.push(None);
                }
            }
        }
        matrix.push(row);
    }

    let base_row = closest_index(&v1_values, Decimal::ZERO);
    let base_col = closest_index(&v2_values, Decimal::ZERO);

    let output = GridOutput {
        variable_1_name: p1.label().into(),
        variable_2_name: p2.label().into(),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way NPV Sensitivity Grid",
        &serde_json::json!({
            "variable_1": p1.id(),
            "variable_2": p2.id(),
            "output_metric": "npv",
        }),
        warnings,
        elapsed,
        output,
    ))
}
