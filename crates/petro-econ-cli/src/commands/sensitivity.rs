use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use petro_econ_core::sensitivity::{
    self, GridInput, GridVariable, SensitivityInput, SensitivityParameter, SensitivitySwings,
};

use super::economics::read_economics_input;
use crate::input;

/// Arguments for the tornado analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// Economics input, or a full sensitivity input with `base` and `swings`
    /// (stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Price swing in percent
    #[arg(long, default_value = "20")]
    pub price: Decimal,

    /// Capex swing in percent
    #[arg(long, default_value = "20")]
    pub capex: Decimal,

    /// Opex swing in percent
    #[arg(long, default_value = "20")]
    pub opex: Decimal,

    /// Production swing in percent
    #[arg(long, default_value = "20")]
    pub production: Decimal,

    /// Start date shift in years
    #[arg(long, default_value_t = 1)]
    pub start_date: i32,

    /// Discount rate swing in percent (omitted from the tornado when absent)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let document = input::stdin::read_document(args.input.as_deref())?;
    let sensitivity_input = sensitivity_input_from(document, &args)?;

    let result = sensitivity::calculate_sensitivity(&sensitivity_input)?;
    Ok(serde_json::to_value(result)?)
}

/// A document with a `base` key is a full sensitivity input; anything else
/// is the base case, swept with the swings given on the command line.
fn sensitivity_input_from(
    document: Value,
    args: &SensitivityArgs,
) -> Result<SensitivityInput, Box<dyn std::error::Error>> {
    if document.get("base").is_some() {
        Ok(serde_json::from_value(document)?)
    } else {
        Ok(SensitivityInput {
            base: serde_json::from_value(document)?,
            swings: swings_from_args(args),
        })
    }
}

fn swings_from_args(args: &SensitivityArgs) -> SensitivitySwings {
    SensitivitySwings {
        price: args.price,
        capex: args.capex,
        opex: args.opex,
        production: args.production,
        start_date: args.start_date,
        discount_rate: args.discount_rate,
    }
}

/// Arguments for the two-way NPV grid
#[derive(Args)]
pub struct GridArgs {
    /// Path to a JSON/YAML economics input file (stdin JSON when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// First axis as parameter:min:max:step in percent (e.g. "price:-30:30:10")
    #[arg(long, allow_hyphen_values = true)]
    pub var1: String,

    /// Second axis in the same format (e.g. "capex:-20:20:10")
    #[arg(long, allow_hyphen_values = true)]
    pub var2: String,
}

pub fn run_grid(args: GridArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let grid_input = GridInput {
        base: read_economics_input(args.input.as_deref())?,
        variable_1: parse_grid_var(&args.var1)?,
        variable_2: parse_grid_var(&args.var2)?,
    };
    let result = sensitivity::calculate_sensitivity_grid(&grid_input)?;
    Ok(serde_json::to_value(result)?)
}

fn parse_grid_var(spec: &str) -> Result<GridVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Grid variable must be parameter:min:max:step, got '{}'",
            spec
        )
        .into());
    }
    let parameter: SensitivityParameter =
        serde_json::from_value(Value::String(parts[0].trim().to_ascii_lowercase()))
            .map_err(|_| format!("Unknown grid parameter '{}'", parts[0]))?;
    Ok(GridVariable {
        parameter,
        min: parts[1].parse()?,
        max: parts[2].parse()?,
        step: parts[3].parse()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid_var() {
        let var = parse_grid_var("price:-30:30:10").unwrap();
        assert_eq!(var.parameter, SensitivityParameter::Price);
        assert_eq!(var.min, Decimal::from(-30));
        assert_eq!(var.step, Decimal::from(10));
    }

    fn single_year_case() -> Value {
        serde_json::json!({
            "model_settings": { "start_year": 2025, "end_year": 2025, "discount_rate": "0.1" },
            "streams": [{ "id": "oil", "name": "Oil", "active": true }],
            "production_data": [{ "year": 2025, "oil_rate": "1000" }],
            "cost_data": {
                "capex_profile": [{ "year": 2025 }],
                "opex_profile": [{ "year": 2025 }]
            },
            "fiscal_terms": { "template_type": "royalty_tax" },
            "price_assumptions": { "oil_price": "70", "gas_price": "3" },
            "assumptions": { "tax_rate": "30", "royalty_rate": "12.5" }
        })
    }

    fn flag_args() -> SensitivityArgs {
        SensitivityArgs {
            input: None,
            price: Decimal::from(20),
            capex: Decimal::from(20),
            opex: Decimal::from(20),
            production: Decimal::from(20),
            start_date: 1,
            discount_rate: None,
        }
    }

    #[test]
    fn test_full_sensitivity_document_keeps_its_swings() {
        let document = serde_json::json!({
            "base": single_year_case(),
            "swings": {
                "price": "35", "capex": "10", "opex": "10",
                "production": "15", "start_date": 2
            }
        });
        let built = sensitivity_input_from(document, &flag_args()).unwrap();
        assert_eq!(built.swings.price, Decimal::from(35));
        assert_eq!(built.swings.start_date, 2);
    }

    #[test]
    fn test_bare_economics_document_uses_flag_swings() {
        let document = single_year_case();
        let built = sensitivity_input_from(document, &flag_args()).unwrap();
        assert_eq!(built.swings.price, Decimal::from(20));
        assert_eq!(built.base.model_settings.start_year, 2025);
    }

    #[test]
    fn test_parse_grid_var_rejects_bad_specs() {
        assert!(parse_grid_var("price:-30:30").is_err());
        assert!(parse_grid_var("helium:0:10:5").is_err());
    }
}
