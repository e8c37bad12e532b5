use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PetroEconError;
use crate::model::{
    CapexRow, EconomicsInput, OpexRow, ProductionRow, MAX_MODEL_YEAR, MIN_MODEL_YEAR,
};
use crate::PetroEconResult;

/// Largest start date shift, in years, in either direction.
pub const MAX_START_SHIFT_YEARS: i32 = 50;

/// Input driver that can be flexed one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityParameter {
    Price,
    Capex,
    Opex,
    Production,
    StartDate,
    DiscountRate,
}

/// Unit of a parameter's swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Percent,
    Years,
}

impl SensitivityParameter {
    pub fn id(&self) -> &'static str {
        match self {
            SensitivityParameter::Price => "price",
            SensitivityParameter::Capex => "capex",
            SensitivityParameter::Opex => "opex",
            SensitivityParameter::Production => "production",
            SensitivityParameter::StartDate => "start_date",
            SensitivityParameter::DiscountRate => "discount_rate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SensitivityParameter::Price => "Commodity Price",
            SensitivityParameter::Capex => "Capital Costs",
            SensitivityParameter::Opex => "Operating Costs",
            SensitivityParameter::Production => "Production Volume",
            SensitivityParameter::StartDate => "Start Date",
            SensitivityParameter::DiscountRate => "Discount Rate",
        }
    }

    pub fn param_type(&self) -> ParamType {
        match self {
            SensitivityParameter::StartDate => ParamType::Years,
            _ => ParamType::Percent,
        }
    }

    /// Clone `base` with this parameter moved by `amount`: a signed
    /// percentage change, or whole years for the start date.
    pub fn apply(&self, base: &EconomicsInput, amount: Decimal) -> PetroEconResult<EconomicsInput> {
        let mut input = base.clone();
        let factor = Decimal::ONE + amount / dec!(100);

        match self {
            SensitivityParameter::Price => input.price_assumptions.scale(factor),
            SensitivityParameter::Capex => input
                .cost_data
                .capex_profile
                .iter_mut()
                .for_each(|r| r.scale(factor)),
            SensitivityParameter::Opex => input
                .cost_data
                .opex_profile
                .iter_mut()
                .for_each(|r| r.scale(factor)),
            SensitivityParameter::Production => input
                .production_data
                .iter_mut()
                .for_each(|r| r.scale(factor)),
            SensitivityParameter::DiscountRate => input.model_settings.discount_rate *= factor,
            SensitivityParameter::StartDate => {
                let years = whole_years(amount)?;
                shift_profiles(&mut input, years)?;
            }
        }

        Ok(input)
    }
}

fn whole_years(amount: Decimal) -> PetroEconResult<i32> {
    if !amount.fract().is_zero() {
        return Err(PetroEconError::invalid(
            "swings.start_date",
            "Start date shift must be a whole number of years",
        ));
    }
    match amount.to_i32() {
        Some(years) if (-MAX_START_SHIFT_YEARS..=MAX_START_SHIFT_YEARS).contains(&years) => {
            Ok(years)
        }
        _ => Err(PetroEconError::invalid(
            "swings.start_date",
            format!("Start date shift cannot exceed {MAX_START_SHIFT_YEARS} years"),
        )),
    }
}

/// Move every dated profile row by `years`, widening the horizon so the
/// moved rows stay inside it. The valuation year does not move.
pub(crate) fn shift_profiles(input: &mut EconomicsInput, years: i32) -> PetroEconResult<()> {
    if years == 0 {
        return Ok(());
    }

    let moved = |year: i32| {
        year.checked_add(years)
            .filter(|y| (MIN_MODEL_YEAR..=MAX_MODEL_YEAR).contains(y))
            .ok_or_else(|| {
                PetroEconError::invalid(
                    "swings.start_date",
                    format!(
                        "Shifting {year} by {years} leaves {MIN_MODEL_YEAR}-{MAX_MODEL_YEAR}"
                    ),
                )
            })
    };

    let settings = &mut input.model_settings;
    let (old_start, old_end) = (settings.start_year, settings.end_year);
    let (new_start, new_end) = (moved(old_start)?, moved(old_end)?);
    settings.reference_year = Some(settings.reference_year());
    settings.start_year = old_start.min(new_start);
    settings.end_year = old_end.max(new_end);

    for r in input.production_data.iter_mut() {
        r.year = moved(r.year)?;
    }
    for r in input.cost_data.capex_profile.iter_mut() {
        r.year = moved(r.year)?;
    }
    for r in input.cost_data.opex_profile.iter_mut() {
        r.year = moved(r.year)?;
    }

    for year in settings.years() {
        if !input.production_data.iter().any(|r| r.year == year) {
            input.production_data.push(ProductionRow::empty(year));
        }
        if !input.cost_data.capex_profile.iter().any(|r| r.year == year) {
            input.cost_data.capex_profile.push(CapexRow::empty(year));
        }
        if !input.cost_data.opex_profile.iter().any(|r| r.year == year) {
            input.cost_data.opex_profile.push(OpexRow::empty(year));
        }
    }
    input.production_data.sort_by_key(|r| r.year);
    input.cost_data.capex_profile.sort_by_key(|r| r.year);
    input.cost_data.opex_profile.sort_by_key(|r| r.year);
    Ok(())
}
