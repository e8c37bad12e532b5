use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{Assumptions, EconomicsInput, FiscalTerms, ModelSettings};
use crate::error::PetroEconError;
use crate::types::Percent;
use crate::PetroEconResult;

/// Earliest calendar year a model may cover.
pub const MIN_MODEL_YEAR: i32 = 1900;
/// Latest calendar year a model may cover.
pub const MAX_MODEL_YEAR: i32 = 2200;
/// How far the reference year may sit outside the model horizon.
pub const MAX_REFERENCE_OFFSET: i32 = 100;
/// Upper bound on any rate, price or cost entry.
pub const MAX_INPUT_AMOUNT: Decimal = dec!(100000000000000000000);

/// Reject an input model before any computation starts.
pub fn validate_input(input: &EconomicsInput) -> PetroEconResult<()> {
    let settings = &input.model_settings;
    validate_settings(settings)?;

    check_coverage(
        "production_data",
        settings,
        input.production_data.iter().map(|r| r.year),
    )?;
    check_coverage(
        "capex_profile",
        settings,
        input.cost_data.capex_profile.iter().map(|r| r.year),
    )?;
    check_coverage(
        "opex_profile",
        settings,
        input.cost_data.opex_profile.iter().map(|r| r.year),
    )?;

    let mut seen = HashSet::new();
    for stream in &input.streams {
        if stream.product().is_none() {
            return Err(PetroEconError::invalid(
                format!("streams.{}", stream.id),
                "Unknown stream id (expected oil, gas, condensate or water)",
            ));
        }
        if !seen.insert(stream.id.trim().to_ascii_lowercase()) {
            return Err(PetroEconError::invalid(
                format!("streams.{}", stream.id),
                "Duplicate stream id",
            ));
        }
    }

    for row in &input.production_data {
        let y = row.year;
        non_negative(&format!("production_data[{y}].oil_rate"), row.oil_rate)?;
        non_negative(&format!("production_data[{y}].gas_rate"), row.gas_rate)?;
        non_negative(&format!("production_data[{y}].condensate_rate"), row.condensate_rate)?;
        non_negative(&format!("production_data[{y}].water_rate"), row.water_rate)?;
    }
    for row in &input.cost_data.capex_profile {
        let y = row.year;
        non_negative(&format!("capex_profile[{y}].drilling_capex"), row.drilling_capex)?;
        non_negative(&format!("capex_profile[{y}].facilities_capex"), row.facilities_capex)?;
        non_negative(&format!("capex_profile[{y}].abandonment_capex"), row.abandonment_capex)?;
        non_negative(&format!("capex_profile[{y}].other_capex"), row.other_capex)?;
    }
    for row in &input.cost_data.opex_profile {
        let y = row.year;
        non_negative(&format!("opex_profile[{y}].fixed_opex"), row.fixed_opex)?;
        non_negative(&format!("opex_profile[{y}].variable_oil"), row.variable_oil)?;
        non_negative(&format!("opex_profile[{y}].variable_gas"), row.variable_gas)?;
        non_negative(&format!("opex_profile[{y}].variable_water"), row.variable_water)?;
    }

    let prices = &input.price_assumptions;
    non_negative("price_assumptions.oil_price", prices.oil_price)?;
    non_negative("price_assumptions.gas_price", prices.gas_price)?;
    if let Some(p) = prices.condensate_price {
        non_negative("price_assumptions.condensate_price", p)?;
    }
    if prices.escalation <= dec!(-1) {
        return Err(PetroEconError::invalid(
            "price_assumptions.escalation",
            "Escalation must be greater than -100%",
        ));
    }
    for row in &prices.price_deck {
        if let Some(p) = row.oil_price {
            non_negative(&format!("price_deck[{}].oil_price", row.year), p)?;
        }
        if let Some(p) = row.gas_price {
            non_negative(&format!("price_deck[{}].gas_price", row.year), p)?;
        }
    }

    let a = &input.assumptions;
    percent("assumptions.working_interest", a.working_interest)?;
    percent("assumptions.net_revenue_interest", a.net_revenue_interest)?;
    percent("assumptions.tax_rate", a.tax_rate)?;
    percent("assumptions.royalty_rate", a.royalty_rate)?;
    percent("assumptions.uptime", a.uptime)?;

    validate_fiscal(&input.fiscal_terms, a)?;

    Ok(())
}

fn validate_settings(settings: &ModelSettings) -> PetroEconResult<()> {
    for (field, year) in [
        ("model_settings.start_year", settings.start_year),
        ("model_settings.end_year", settings.end_year),
    ] {
        if !(MIN_MODEL_YEAR..=MAX_MODEL_YEAR).contains(&year) {
            return Err(PetroEconError::invalid(
                field,
                format!("Year {year} is outside {MIN_MODEL_YEAR}-{MAX_MODEL_YEAR}"),
            ));
        }
    }
    if settings.end_year < settings.start_year {
        return Err(PetroEconError::invalid(
            "model_settings.end_year",
            format!(
                "End year {} is before start year {}",
                settings.end_year, settings.start_year
            ),
        ));
    }
    if settings.discount_rate < Decimal::ZERO || settings.discount_rate > Decimal::ONE {
        return Err(PetroEconError::invalid(
            "model_settings.discount_rate",
            "Discount rate must be between 0 and 1",
        ));
    }
    if settings.inflation_rate <= dec!(-1) {
        return Err(PetroEconError::invalid(
            "model_settings.inflation_rate",
            "Inflation rate must be greater than -100%",
        ));
    }

    let reference = settings.reference_year();
    let earliest = settings.start_year - MAX_REFERENCE_OFFSET;
    let latest = settings.end_year + MAX_REFERENCE_OFFSET;
    if reference < earliest || reference > latest {
        return Err(PetroEconError::invalid(
            "model_settings.reference_year",
            format!("Reference year {reference} must lie within {earliest}-{latest}"),
        ));
    }
    Ok(())
}

fn validate_fiscal(terms: &FiscalTerms, a: &Assumptions) -> PetroEconResult<()> {
    percent("fiscal_terms.tax_rate", terms.tax_rate(a))?;
    percent("fiscal_terms.royalty_rate", terms.royalty_rate(a))?;

    if terms.book_life_years() == 0 {
        return Err(PetroEconError::invalid(
            "fiscal_terms.book_life_years",
            "Book life must be at least 1 year",
        ));
    }
    let db = terms.declining_balance_rate();
    if db <= Decimal::ZERO || db > dec!(100) {
        return Err(PetroEconError::invalid(
            "fiscal_terms.declining_balance_rate",
            "Declining balance rate must be in (0, 100]",
        ));
    }

    if let FiscalTerms::Psc(psc) = terms {
        percent("fiscal_terms.cost_oil_limit", psc.cost_oil_limit)?;
        percent("fiscal_terms.profit_split", psc.profit_split)?;
        if psc.cost_recovery.uplift_rate <= dec!(-1) {
            return Err(PetroEconError::invalid(
                "fiscal_terms.cost_recovery.uplift_rate",
                "Uplift must be greater than -100%",
            ));
        }
        if let Some(ceiling) = psc.cost_recovery.ceiling {
            non_negative("fiscal_terms.cost_recovery.ceiling", ceiling)?;
        }
    }
    Ok(())
}

/// Exactly one row per model year: no gaps, duplicates or strays.
fn check_coverage(
    profile: &str,
    settings: &ModelSettings,
    years: impl Iterator<Item = i32>,
) -> PetroEconResult<()> {
    let mut seen = HashSet::new();
    for year in years {
        if year < settings.start_year || year > settings.end_year {
            return Err(PetroEconError::YearCoverage {
                profile: profile.into(),
                year,
                reason: format!(
                    "outside model horizon {}-{}",
                    settings.start_year, settings.end_year
                ),
            });
        }
        if !seen.insert(year) {
            return Err(PetroEconError::YearCoverage {
                profile: profile.into(),
                year,
                reason: "duplicate year".into(),
            });
        }
    }

    if let Some(missing) = settings.years().find(|y| !seen.contains(y)) {
        return Err(PetroEconError::YearCoverage {
            profile: profile.into(),
            year: missing,
            reason: "missing year".into(),
        });
    }
    Ok(())
}

fn non_negative(field: &str, value: Decimal) -> PetroEconResult<()> {
    if value < Decimal::ZERO {
        return Err(PetroEconError::invalid(field, "Value cannot be negative"));
    }
    if value > MAX_INPUT_AMOUNT {
        return Err(PetroEconError::invalid(
            field,
            format!("Value cannot exceed {MAX_INPUT_AMOUNT}"),
        ));
    }
    Ok(())
}

fn percent(field: &str, value: Percent) -> PetroEconResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(PetroEconError::invalid(field, "Percentage must be between 0 and 100"));
    }
    Ok(())
}
