use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cashflow::{evaluate, EconomicsOutput};
use crate::model::{Assumptions, EconomicsInput, ModelSettings};
use crate::types::{with_metadata, ComputationOutput, Currency, Money, Percent};
use crate::PetroEconResult;

const MILLION: Decimal = dec!(1000000);

/// Money in millions, 2 dp.
pub fn to_mm(value: Money) -> Decimal {
    (value / MILLION).round_dp(2)
}

/// Decimal ratio as a percentage, 2 dp.
pub fn to_percent(ratio: Decimal) -> Percent {
    (ratio * dec!(100)).round_dp(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiUnit {
    /// Millions of the model currency
    Mm,
    Percent,
    Multiple,
    Year,
    /// Currency per boe or per bbl
    PerBarrel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiLine {
    pub label: String,
    /// `None` renders as "N/A"
    pub value: Option<Decimal>,
    pub unit: KpiUnit,
}

/// One year of the MM cashflow table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualReportRow {
    pub year: i32,
    pub gross_revenue_mm: Decimal,
    pub royalties_mm: Decimal,
    pub opex_mm: Decimal,
    pub capex_mm: Decimal,
    pub tax_mm: Decimal,
    pub govt_take_mm: Decimal,
    pub net_cashflow_mm: Decimal,
    pub cumulative_cashflow_mm: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsReport {
    pub currency: Currency,
    pub working_interest: Percent,
    pub net_revenue_interest: Percent,
    pub kpis: Vec<KpiLine>,
    pub annual_table: Vec<AnnualReportRow>,
}

/// Display-ready view of an engine run.
pub fn build_report(
    output: &EconomicsOutput,
    settings: &ModelSettings,
    assumptions: &Assumptions,
) -> EconomicsReport {
    let m = &output.metrics;
    let kpi = |label: &str, value: Option<Decimal>, unit: KpiUnit| KpiLine {
        label: label.into(),
        value,
        unit,
    };

    let kpis = vec![
        kpi("NPV", Some(to_mm(m.npv)), KpiUnit::Mm),
        kpi("IRR", m.irr.map(to_percent), KpiUnit::Percent),
        kpi("DPI", m.dpi.map(|d| d.round_dp(2)), KpiUnit::Multiple),
        kpi("Payback Year", m.payback_year.map(Decimal::from), KpiUnit::Year),
        kpi(
            "Unit Technical Cost",
            m.unit_technical_cost.map(|c| c.round_dp(2)),
            KpiUnit::PerBarrel,
        ),
        kpi(
            "Breakeven Oil Price",
            m.breakeven_price.map(|p| p.round_dp(2)),
            KpiUnit::PerBarrel,
        ),
        kpi("Undiscounted Cashflow", Some(to_mm(m.undiscounted_cashflow)), KpiUnit::Mm),
        kpi("Total Revenue", Some(to_mm(m.total_revenue)), KpiUnit::Mm),
        kpi("Total Capex", Some(to_mm(m.total_capex)), KpiUnit::Mm),
        kpi("Total Opex", Some(to_mm(m.total_opex)), KpiUnit::Mm),
        kpi("Government Take", Some(to_mm(m.total_govt_take)), KpiUnit::Mm),
        kpi("Government Take Share", m.govt_take_share.map(to_percent), KpiUnit::Percent),
        kpi("Max Exposure", Some(to_mm(m.max_exposure)), KpiUnit::Mm),
    ];

    let annual_table = output
        .annual_results
        .iter()
        .map(|r| AnnualReportRow {
            year: r.year,
            gross_revenue_mm: to_mm(r.gross_revenue),
            royalties_mm: to_mm(r.royalties),
            opex_mm: to_mm(r.opex),
            capex_mm: to_mm(r.capex),
            tax_mm: to_mm(r.tax),
            govt_take_mm: to_mm(r.govt_take),
            net_cashflow_mm: to_mm(r.net_cashflow),
            cumulative_cashflow_mm: to_mm(r.cumulative_cashflow),
        })
        .collect();

    EconomicsReport {
        currency: settings.currency.clone(),
        working_interest: assumptions.working_interest,
        net_revenue_interest: assumptions.net_revenue_interest,
        kpis,
        annual_table,
    }
}

/// Run the engine and build its report in one call.
pub fn calculate_report(
    input: &EconomicsInput,
) -> PetroEconResult<ComputationOutput<EconomicsReport>> {
    let start = Instant::now();
    let output = evaluate(input)?;
    let report = build_report(&output, &input.model_settings, &input.assumptions);

    let warnings = report
        .kpis
        .iter()
        .filter(|k| k.value.is_none())
        .map(|k| format!("{} is N/A", k.label))
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Economics Summary Report (MM / percent)",
        &serde_json::json!({
            "currency": input.model_settings.currency,
            "money_unit": "MM",
        }),
        warnings,
        elapsed,
        report,
    ))
}
