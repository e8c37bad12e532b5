use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::depreciation::DepreciationSchedule;
use super::fiscal_regime::{FiscalRegime, YearBase};
use super::metrics::{self, Metrics};
use crate::error::PetroEconError;
use crate::model::{validate_input, EconomicsInput, PriceDeckType, Product};
use crate::time_value::{compound, discount_factor};
use crate::types::{with_metadata, ComputationOutput, Money, Volume};
use crate::PetroEconResult;

/// Gas converts to oil equivalent at 6 mcf per boe
pub const MCF_PER_BOE: Decimal = dec!(6);

/// Largest yearly revenue, cost or discounted flow the waterfall carries
const MAX_ANNUAL_AMOUNT: Money = dec!(1000000000000000000000);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One year of the fiscal waterfall. Only `year` is required when read
/// from JSON; absent lines are zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnualResultRow {
    pub year: i32,
    /// Realised oil price ($/bbl)
    pub oil_price: Money,
    /// Realised gas price ($/mcf)
    pub gas_price: Money,
    /// Net volumes after uptime and working interest
    pub oil_volume: Volume,
    pub gas_volume: Volume,
    pub condensate_volume: Volume,
    pub water_volume: Volume,
    pub boe: Volume,
    pub gross_revenue: Money,
    pub royalties: Money,
    pub opex: Money,
    pub capex: Money,
    /// Tax depreciation charge (non-cash)
    pub depreciation: Money,
    /// PSC cost oil
    pub recoverable_cost: Money,
    /// Government share of PSC profit oil
    pub profit_share: Money,
    pub taxable_income: Money,
    pub tax: Money,
    pub govt_take: Money,
    pub net_cashflow: Money,
    pub cumulative_cashflow: Money,
    pub discount_factor: Decimal,
    pub discounted_cashflow: Money,
}

/// Full result of one cashflow engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsOutput {
    pub annual_results: Vec<AnnualResultRow>,
    pub metrics: Metrics,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Run the cashflow and fiscal engine for one scenario.
///
/// Builds the yearly waterfall (prices, revenue, royalties, costs, cost
/// recovery, tax, net and cumulative cash flow) and derives NPV, IRR, DPI,
/// payback, unit technical cost and breakeven oil price.
pub fn calculate_economics(
    input: &EconomicsInput,
) -> PetroEconResult<ComputationOutput<EconomicsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = run(input, true, &mut warnings)?;

    let settings = &input.model_settings;
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Petroleum Economics Cashflow (annual fiscal waterfall)",
        &serde_json::json!({
            "fiscal_regime": input.fiscal_terms.template_name(),
            "start_year": settings.start_year,
            "end_year": settings.end_year,
            "reference_year": settings.reference_year(),
            "discount_rate": settings.discount_rate.to_string(),
            "currency": settings.currency,
            "inflation_enabled": settings.inflation_enabled,
            "price_deck_type": settings.price_deck_type,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Same computation as [`calculate_economics`] without the envelope.
pub fn evaluate(input: &EconomicsInput) -> PetroEconResult<EconomicsOutput> {
    let mut warnings = Vec::new();
    run(input, true, &mut warnings)
}

/// Engine run without the breakeven search; used for perturbed and trial runs.
pub(crate) fn evaluate_without_breakeven(input: &EconomicsInput) -> PetroEconResult<EconomicsOutput> {
    let mut warnings = Vec::new();
    run(input, false, &mut warnings)
}

fn run(
    input: &EconomicsInput,
    with_breakeven: bool,
    warnings: &mut Vec<String>,
) -> PetroEconResult<EconomicsOutput> {
    validate_input(input)?;

    let settings = &input.model_settings;
    let terms = &input.fiscal_terms;
    debug!(
        start_year = settings.start_year,
        end_year = settings.end_year,
        regime = terms.template_name(),
        "running cashflow engine"
    );

    if !terms.ring_fence() {
        warnings.push(
            "Ring fence disabled: group loss relief is not modeled, losses stay in the field"
                .into(),
        );
    }

    let volumes = net_volumes(input);
    let boe_profile: Vec<Volume> = volumes.iter().map(|v| v.boe()).collect();

    let mut regime = FiscalRegime::from_terms(terms, &input.assumptions);
    let mut depreciation = DepreciationSchedule::new(
        terms.depreciation_method(),
        terms.book_life_years(),
        terms.declining_balance_rate(),
        &boe_profile,
    );

    let mut rows: Vec<AnnualResultRow> = Vec::with_capacity(settings.year_count());
    let mut cumulative = Decimal::ZERO;

    for (idx, year) in settings.years().enumerate() {
        let vol = volumes[idx];
        let oil_price = price(input, Product::Oil, year)?;
        let gas_price = price(input, Product::Gas, year)?;
        let condensate_price = price(input, Product::Condensate, year)?;

        let gross_revenue = bounded(
            "gross_revenue",
            year,
            sum_of_products(&[
                (vol.oil, oil_price),
                (vol.gas, gas_price),
                (vol.condensate, condensate_price),
            ]),
        )?;

        let cost_factor = cost_inflation(input, year)?;
        let opex = bounded(
            "opex",
            year,
            input
                .cost_data
                .opex_profile
                .iter()
                .find(|r| r.year == year)
                .map_or(Some(Decimal::ZERO), |r| {
                    sum_of_products(&[
                        (r.fixed_opex, Decimal::ONE),
                        (r.variable_oil, vol.oil),
                        (r.variable_gas, vol.gas),
                        (r.variable_water, vol.water),
                    ])
                })
                .and_then(|v| v.checked_mul(cost_factor)),
        )?;
        let capex = bounded(
            "capex",
            year,
            input
                .cost_data
                .capex_profile
                .iter()
                .find(|r| r.year == year)
                .map(|r| r.total())
                .unwrap_or_default()
                .checked_mul(cost_factor),
        )?;

        let dep = depreciation.charge(idx, capex, boe_profile[idx]);
        let fiscal = regime.settle(&YearBase {
            gross_revenue,
            opex,
            capex,
            depreciation: dep,
        })?;

        let govt_take = fiscal.govt_take();
        let net_cashflow = gross_revenue - opex - capex - govt_take;
        cumulative += net_cashflow;

        let df = settings
            .periods_from_reference(year)
            .and_then(|periods| discount_factor(settings.discount_rate, periods))
            .ok_or_else(|| PetroEconError::InvalidInput {
                field: "model_settings.discount_rate".into(),
                reason: format!("Discount factor for {year} is not representable"),
            })?;
        let discounted_cashflow =
            bounded("discounted_cashflow", year, net_cashflow.checked_mul(df))?;

        rows.push(AnnualResultRow {
            year,
            oil_price,
            gas_price,
            oil_volume: vol.oil,
            gas_volume: vol.gas,
            condensate_volume: vol.condensate,
            water_volume: vol.water,
            boe: boe_profile[idx],
            gross_revenue,
            royalties: fiscal.royalties,
            opex,
            capex,
            depreciation: dep,
            recoverable_cost: fiscal.recoverable_cost,
            profit_share: fiscal.profit_share,
            taxable_income: fiscal.taxable_income,
            tax: fiscal.tax,
            govt_take,
            net_cashflow,
            cumulative_cashflow: cumulative,
            discount_factor: df,
            discounted_cashflow,
        });
    }

    if let FiscalRegime::ProductionSharing(psc) = &regime {
        let unrecovered = psc.unrecovered_cost();
        if unrecovered > Decimal::ZERO {
            warnings.push(format!(
                "PSC cost pool of {} remains unrecovered at end of horizon",
                unrecovered.round_dp(2)
            ));
        }
    }

    let mut metrics = metrics::derive(&rows, warnings);
    if with_breakeven {
        match metrics::breakeven_price(input) {
            Ok(price) => metrics.breakeven_price = Some(price),
            Err(reason) => warnings.push(format!("Breakeven price undefined: {reason}")),
        }
    }

    Ok(EconomicsOutput {
        annual_results: rows,
        metrics,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Net produced volumes for one year.
#[derive(Debug, Clone, Copy, Default)]
struct NetVolumes {
    oil: Volume,
    gas: Volume,
    condensate: Volume,
    water: Volume,
}

impl NetVolumes {
    fn boe(&self) -> Volume {
        self.oil + self.condensate + self.gas / MCF_PER_BOE
    }
}

/// Rates × uptime × working interest, zeroed for inactive streams.
/// Indexed by year offset from `start_year`; coverage is already validated.
fn net_volumes(input: &EconomicsInput) -> Vec<NetVolumes> {
    let a = &input.assumptions;
    let factor = a.working_interest / dec!(100) * a.uptime / dec!(100);
    let gate = |product: Product, rate: Volume| {
        if input.is_active(product) {
            rate * factor
        } else {
            Decimal::ZERO
        }
    };

    input
        .model_settings
        .years()
        .map(|year| {
            input
                .production_data
                .iter()
                .find(|r| r.year == year)
                .map(|r| NetVolumes {
                    oil: gate(Product::Oil, r.oil_rate),
                    gas: gate(Product::Gas, r.gas_rate),
                    condensate: gate(Product::Condensate, r.condensate_rate),
                    water: gate(Product::Water, r.water_rate),
                })
                .unwrap_or_default()
        })
        .collect()
}

/// Realised price of `product` in `year`.
fn price(input: &EconomicsInput, product: Product, year: i32) -> PetroEconResult<Money> {
    let prices = &input.price_assumptions;

    if input.model_settings.price_deck_type == PriceDeckType::Custom {
        let deck = prices.price_deck.iter().find(|r| r.year == year);
        let overridden = match product {
            Product::Oil => deck.and_then(|r| r.oil_price),
            Product::Gas => deck.and_then(|r| r.gas_price),
            _ => None,
        };
        if let Some(p) = overridden {
            return Ok(p);
        }
    }

    let base = match product {
        Product::Oil => prices.oil_price,
        Product::Gas => prices.gas_price,
        Product::Condensate => match prices.condensate_price {
            Some(p) => p,
            None => return price(input, Product::Oil, year),
        },
        Product::Water => return Ok(Decimal::ZERO),
    };

    input
        .model_settings
        .periods_from_reference(year)
        .and_then(|periods| compound(prices.escalation, periods))
        .and_then(|factor| base.checked_mul(factor))
        .ok_or_else(|| PetroEconError::InvalidInput {
            field: "price_assumptions.escalation".into(),
            reason: format!("Escalated price for {year} is not representable"),
        })
}

fn cost_inflation(input: &EconomicsInput, year: i32) -> PetroEconResult<Decimal> {
    let settings = &input.model_settings;
    if !settings.inflation_enabled {
        return Ok(Decimal::ONE);
    }
    settings
        .periods_from_reference(year)
        .and_then(|periods| compound(settings.inflation_rate, periods))
        .ok_or_else(|| PetroEconError::InvalidInput {
            field: "model_settings.inflation_rate".into(),
            reason: format!("Inflation factor for {year} is not representable"),
        })
}

/// `Σ a × b`, `None` on overflow.
fn sum_of_products(terms: &[(Decimal, Decimal)]) -> Option<Decimal> {
    terms
        .iter()
        .try_fold(Decimal::ZERO, |acc, (a, b)| acc.checked_add(a.checked_mul(*b)?))
}

/// Reject a yearly figure that overflowed or left the supported range.
fn bounded(line: &str, year: i32, value: Option<Money>) -> PetroEconResult<Money> {
    match value {
        Some(v) if v.abs() <= MAX_ANNUAL_AMOUNT => Ok(v),
        _ => Err(PetroEconError::invalid(
            line,
            format!("{line} for {year} exceeds {MAX_ANNUAL_AMOUNT}"),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use rust_decimal_macros::dec;

    /// 2025-2026, oil only at 1000 bbl/yr, $70, 12.5% royalty, 30% tax.
    fn flat_single_well() -> EconomicsInput {
        EconomicsInput {
            model_settings: ModelSettings {
                start_year: 2025,
                end_year: 2026,
                frequency: Frequency::Annual,
                currency: Default::default(),
                discount_rate: dec!(0.10),
                inflation_rate: Decimal::ZERO,
                inflation_enabled: false,
                price_deck_type: PriceDeckType::Flat,
                reference_year: None,
            },
            streams: vec![Stream {
                id: "oil".into(),
                name: "Oil".into(),
                active: true,
            }],
            production_data: (2025..=2026)
                .map(|year| ProductionRow {
                    year,
                    oil_rate: dec!(1000),
                    ..Default::default()
                })
                .collect(),
            cost_data: CostData {
                capex_profile: vec![CapexRow::empty(2025), CapexRow::empty(2026)],
                opex_profile: vec![OpexRow::empty(2025), OpexRow::empty(2026)],
            },
            fiscal_terms: FiscalTerms::RoyaltyTax(RoyaltyTaxTerms {
                tax_rate: None,
                royalty_rate: None,
                depreciation_method: DepreciationMethod::StraightLine,
                book_life_years: None,
                declining_balance_rate: None,
                ring_fence: true,
                loss_carry_forward: false,
            }),
            price_assumptions: PriceAssumptions {
                oil_price: dec!(70),
                gas_price: dec!(3),
                condensate_price: None,
                escalation: Decimal::ZERO,
                price_deck: vec![],
            },
            assumptions: Assumptions {
                tax_rate: dec!(30),
                royalty_rate: dec!(12.5),
                ..Assumptions::default()
            },
        }
    }

    #[test]
    fn test_flat_single_well_waterfall() {
        let out = evaluate(&flat_single_well()).unwrap();
        let y = &out.annual_results[0];
        assert_eq!(y.gross_revenue, dec!(70000));
        assert_eq!(y.royalties, dec!(8750));
        assert_eq!(y.taxable_income, dec!(61250));
        assert_eq!(y.tax, dec!(18375));
        assert_eq!(y.net_cashflow, dec!(42875));
        assert_eq!(y.cumulative_cashflow, dec!(42875));
        assert_eq!(out.annual_results[1].cumulative_cashflow, dec!(85750));
    }

    #[test]
    fn test_escalation_applies_from_reference_year() {
        let mut input = flat_single_well();
        input.price_assumptions.escalation = dec!(0.10);
        let out = evaluate(&input).unwrap();
        assert_eq!(out.annual_results[0].oil_price, dec!(70));
        assert_eq!(out.annual_results[1].oil_price, dec!(77));
    }

    #[test]
    fn test_inactive_stream_contributes_nothing() {
        let mut input = flat_single_well();
        input.streams[0].active = false;
        let out = evaluate(&input).unwrap();
        assert!(out.annual_results.iter().all(|r| r.gross_revenue.is_zero()));
    }

    #[test]
    fn test_custom_deck_overrides_year() {
        let mut input = flat_single_well();
        input.model_settings.price_deck_type = PriceDeckType::Custom;
        input.price_assumptions.price_deck = vec![PriceDeckRow {
            year: 2026,
            oil_price: Some(dec!(90)),
            gas_price: None,
        }];
        let out = evaluate(&input).unwrap();
        assert_eq!(out.annual_results[0].oil_price, dec!(70));
        assert_eq!(out.annual_results[1].oil_price, dec!(90));
    }

    #[test]
    fn test_cost_inflation() {
        let mut input = flat_single_well();
        input.model_settings.inflation_enabled = true;
        input.model_settings.inflation_rate = dec!(0.05);
        input.cost_data.opex_profile[1].fixed_opex = dec!(1000);
        let out = evaluate(&input).unwrap();
        assert_eq!(out.annual_results[1].opex, dec!(1050));
    }

    #[test]
    fn test_working_interest_and_uptime_scale_revenue() {
        let mut input = flat_single_well();
        input.assumptions.working_interest = dec!(50);
        input.assumptions.uptime = dec!(90);
        let out = evaluate(&input).unwrap();
        assert_eq!(out.annual_results[0].gross_revenue, dec!(31500));
        assert_eq!(out.annual_results[0].oil_volume, dec!(450));
    }

    #[test]
    fn test_revenue_overflow_is_an_error() {
        let mut input = flat_single_well();
        input.production_data[0].oil_rate = MAX_INPUT_AMOUNT;
        input.price_assumptions.oil_price = MAX_INPUT_AMOUNT;
        match evaluate(&input) {
            Err(PetroEconError::InvalidInput { field, .. }) => assert_eq!(field, "gross_revenue"),
            other => panic!("expected overflow error, got {other:?}"),
        }
    }

    #[test]
    fn test_extreme_escalation_is_an_error() {
        let mut input = flat_single_well();
        input.model_settings.reference_year = Some(1925);
        input.price_assumptions.escalation = dec!(10);
        assert!(evaluate(&input).is_err());
    }

    #[test]
    fn test_envelope_metadata() {
        let result = calculate_economics(&flat_single_well()).unwrap();
        assert_eq!(result.assumptions["fiscal_regime"], "royalty_tax");
        assert_eq!(result.result.annual_results.len(), 2);
    }
}
