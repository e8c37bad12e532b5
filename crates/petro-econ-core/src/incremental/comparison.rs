use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

use crate::cashflow::{evaluate, AnnualResultRow, Metrics};
use crate::error::PetroEconError;
use crate::model::EconomicsInput;
use crate::time_value::present_value;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Percent, Rate};
use crate::PetroEconResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalInput {
    pub base_results: Vec<AnnualResultRow>,
    pub scenario_results: Vec<AnnualResultRow>,
    pub base_metrics: Metrics,
    pub scenario_metrics: Metrics,
    /// Decimal rate used to value the deltas
    pub discount_rate: Rate,
    /// Discount origin; the earliest year in either series when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_year: Option<i32>,
}

/// Scenario minus base for one year. A year missing on one side counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualDelta {
    pub year: i32,
    pub gross_revenue: Money,
    pub royalties: Money,
    pub opex: Money,
    pub capex: Money,
    pub tax: Money,
    pub profit_share: Money,
    pub net_cashflow: Money,
    /// Running sum of `net_cashflow` deltas
    pub cumulative_cashflow: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketType {
    Gain,
    Loss,
    Total,
}

/// One bar of the NPV bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallBucket {
    pub name: String,
    /// Discounted contribution to the NPV change
    pub value: Money,
    #[serde(rename = "type")]
    pub bucket_type: BucketType,
    /// Running position before this bar
    pub start: Money,
    /// Running position after this bar
    pub end: Money,
}

/// Scenario minus base for each KPI. Optional deltas are `None` when either
/// side is undefined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiDeltas {
    pub npv: Money,
    pub npv_percent: Option<Percent>,
    pub irr: Option<Rate>,
    pub dpi: Option<Multiple>,
    pub payback_years: Option<i32>,
    pub unit_technical_cost: Option<Money>,
    pub breakeven_price: Option<Money>,
    pub govt_take: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalOutput {
    pub waterfall_data: Vec<WaterfallBucket>,
    pub annual_deltas: Vec<AnnualDelta>,
    pub kpi_deltas: KpiDeltas,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Decompose the difference between two engine results into annual deltas,
/// KPI deltas and a discounted waterfall.
pub fn calculate_incremental_metrics(
    input: &IncrementalInput,
) -> PetroEconResult<ComputationOutput<IncrementalOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.base_results.is_empty() && input.scenario_results.is_empty() {
        return Err(PetroEconError::InsufficientData(
            "Both base and scenario results are empty".into(),
        ));
    }
    if input.discount_rate <= dec!(-1) {
        return Err(PetroEconError::invalid(
            "discount_rate",
            "Discount rate must be greater than -100%",
        ));
    }

    let annual_deltas = annual_deltas(&input.base_results, &input.scenario_results);
    let origin = match input.reference_year {
        Some(year) => year,
        None => annual_deltas.first().map(|d| d.year).unwrap_or_default(),
    };
    debug!(years = annual_deltas.len(), origin, "computing incremental metrics");

    let waterfall_data = waterfall(&annual_deltas, input.discount_rate, origin, &mut warnings)?;
    let kpi_deltas = kpi_deltas(&input.base_metrics, &input.scenario_metrics);

    if kpi_deltas.npv_percent.is_none() {
        warnings.push("NPV percent change undefined: base NPV is zero".into());
    }

    let output = IncrementalOutput {
        waterfall_data,
        annual_deltas,
        kpi_deltas,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Incremental Scenario Analysis (NPV waterfall)",
        &serde_json::json!({
            "discount_rate": input.discount_rate.to_string(),
            "reference_year": origin,
            "base_years": input.base_results.len(),
            "scenario_years": input.scenario_results.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Run the cashflow engine on both inputs and compare them, valued at the
/// base case's discount rate and reference year.
pub fn compare_scenarios(
    base: &EconomicsInput,
    scenario: &EconomicsInput,
) -> PetroEconResult<ComputationOutput<IncrementalOutput>> {
    let base_out = evaluate(base)?;
    let scenario_out = evaluate(scenario)?;
    calculate_incremental_metrics(&IncrementalInput {
        base_results: base_out.annual_results,
        scenario_results: scenario_out.annual_results,
        base_metrics: base_out.metrics,
        scenario_metrics: scenario_out.metrics,
        discount_rate: base.model_settings.discount_rate,
        reference_year: Some(base.model_settings.reference_year()),
    })
}

fn annual_deltas(base: &[AnnualResultRow], scenario: &[AnnualResultRow]) -> Vec<AnnualDelta> {
    let mut by_year: BTreeMap<i32, AnnualDelta> = BTreeMap::new();

    let mut accumulate = |row: &AnnualResultRow, sign: Decimal| {
        let d = by_year.entry(row.year).or_insert_with(|| AnnualDelta {
            year: row.year,
            ..Default::default()
        });
        d.gross_revenue += sign * row.gross_revenue;
        d.royalties += sign * row.royalties;
        d.opex += sign * row.opex;
        d.capex += sign * row.capex;
        d.tax += sign * row.tax;
        d.profit_share += sign * row.profit_share;
        d.net_cashflow += sign * row.net_cashflow;
    };
    base.iter().for_each(|r| accumulate(r, -Decimal::ONE));
    scenario.iter().for_each(|r| accumulate(r, Decimal::ONE));

    let mut cumulative = Decimal::ZERO;
    by_year
        .into_values()
        .map(|mut d| {
            cumulative += d.net_cashflow;
            d.cumulative_cashflow = cumulative;
            d
        })
        .collect()
}

/// Driver residual below which the bridge counts as closed
const CLOSURE_TOLERANCE: Money = dec!(0.000001);

fn waterfall(
    deltas: &[AnnualDelta],
    rate: Rate,
    origin: i32,
    warnings: &mut Vec<String>,
) -> PetroEconResult<Vec<WaterfallBucket>> {
    let pv = |line: fn(&AnnualDelta) -> Money| -> PetroEconResult<Money> {
        let flows: Vec<(i32, Money)> = deltas.iter().map(|d| (d.year, line(d))).collect();
        present_value(rate, origin, &flows).ok_or_else(|| {
            PetroEconError::invalid("discount_rate", "Present value is not representable")
        })
    };

    // Costs and government take reduce NPV, so their deltas enter negated
    let drivers: [(&str, Money); 6] = [
        ("Revenue Δ", pv(|d| d.gross_revenue)?),
        ("Royalty Δ", -pv(|d| d.royalties)?),
        ("Opex Δ", -pv(|d| d.opex)?),
        ("Capex Δ", -pv(|d| d.capex)?),
        ("Tax Δ", -pv(|d| d.tax)?),
        ("Profit Share Δ", -pv(|d| d.profit_share)?),
    ];
    let net = pv(|d| d.net_cashflow)?;

    // Rows whose net cashflow breaks the fiscal identity leave a residual
    let explained: Money = drivers.iter().map(|(_, v)| *v).sum();
    let residual = net - explained;
    let other = if residual.abs() > CLOSURE_TOLERANCE {
        warnings.push(format!(
            "Waterfall drivers explain {} of a {} NPV change; {} shown as Other Δ",
            explained.round_dp(2),
            net.round_dp(2),
            residual.round_dp(2)
        ));
        Some(("Other Δ", residual))
    } else {
        None
    };

    let mut buckets = Vec::with_capacity(drivers.len() + 2);
    let mut running = Decimal::ZERO;
    for (name, value) in drivers.into_iter().chain(other) {
        let bucket_type = if value >= Decimal::ZERO {
            BucketType::Gain
        } else {
            BucketType::Loss
        };
        buckets.push(WaterfallBucket {
            name: name.into(),
            value,
            bucket_type,
            start: running,
            end: running + value,
        });
        running += value;
    }
    buckets.push(WaterfallBucket {
        name: "Net Δ".into(),
        value: net,
        bucket_type: BucketType::Total,
        start: Decimal::ZERO,
        end: net,
    });

    Ok(buckets)
}

fn kpi_deltas(base: &Metrics, scenario: &Metrics) -> KpiDeltas {
    let npv = scenario.npv - base.npv;
    let npv_percent = if base.npv.is_zero() {
        None
    } else {
        Some(npv / base.npv.abs() * dec!(100))
    };

    KpiDeltas {
        npv,
        npv_percent,
        irr: diff(scenario.irr, base.irr),
        dpi: diff(scenario.dpi, base.dpi),
        payback_years: match (scenario.payback_year, base.payback_year) {
            (Some(s), Some(b)) => s.checked_sub(b),
            _ => None,
        },
        unit_technical_cost: diff(scenario.unit_technical_cost, base.unit_technical_cost),
        breakeven_price: diff(scenario.breakeven_price, base.breakeven_price),
        govt_take: scenario.total_govt_take - base.total_govt_take,
    }
}

fn diff(scenario: Option<Decimal>, base: Option<Decimal>) -> Option<Decimal> {
    Some(scenario? - base?)
}
