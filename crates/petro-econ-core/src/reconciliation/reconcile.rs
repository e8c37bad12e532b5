use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::debug;

use crate::cashflow::AnnualResultRow;
use crate::error::PetroEconError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::PetroEconResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// An externally produced year of figures (spreadsheet or prior run).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedRow {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opex: Option<Money>,
    #[serde(default, alias = "netCashflow", skip_serializing_if = "Option::is_none")]
    pub net_cashflow: Option<Money>,
}

impl From<&AnnualResultRow> for ImportedRow {
    fn from(row: &AnnualResultRow) -> Self {
        ImportedRow {
            year: row.year,
            revenue: Some(row.gross_revenue),
            opex: Some(row.opex),
            net_cashflow: Some(row.net_cashflow),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationInput {
    pub model_results: Vec<AnnualResultRow>,
    pub imported_rows: Vec<ImportedRow>,
    /// Largest tolerated |Δ%| per line
    pub threshold_pct: Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciledLine {
    Revenue,
    Opex,
    NetCashflow,
}

impl ReconciledLine {
    const ALL: [ReconciledLine; 3] = [
        ReconciledLine::Revenue,
        ReconciledLine::Opex,
        ReconciledLine::NetCashflow,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReconciledLine::Revenue => "revenue",
            ReconciledLine::Opex => "opex",
            ReconciledLine::NetCashflow => "net_cashflow",
        }
    }

    fn model_value(&self, row: &AnnualResultRow) -> Money {
        match self {
            ReconciledLine::Revenue => row.gross_revenue,
            ReconciledLine::Opex => row.opex,
            ReconciledLine::NetCashflow => row.net_cashflow,
        }
    }

    fn imported_value(&self, row: &ImportedRow) -> Option<Money> {
        match self {
            ReconciledLine::Revenue => row.revenue,
            ReconciledLine::Opex => row.opex,
            ReconciledLine::NetCashflow => row.net_cashflow,
        }
    }
}

/// Model against imported value for one line of one year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineComparison {
    pub line: ReconciledLine,
    pub model: Money,
    pub imported: Option<Money>,
    pub delta: Option<Money>,
    /// Undefined when the imported value is zero and the model is not
    pub delta_pct: Option<Percent>,
    pub is_match: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub year: i32,
    pub lines: Vec<LineComparison>,
    pub is_match: bool,
    /// Why the row failed, when it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirstDivergence {
    pub year: i32,
    /// 0-based index into `rows`
    pub row: usize,
    /// Line that diverged first; absent when the whole import row is missing
    pub line: Option<ReconciledLine>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationStats {
    pub total_rows: usize,
    pub matches: usize,
    /// Match rate in percent; undefined for an empty model
    pub rate: Option<Percent>,
    pub first_divergence: Option<FirstDivergence>,
    /// Imported years with no model year
    pub unmatched_imports: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationOutput {
    pub rows: Vec<ReconciliationRow>,
    pub stats: ReconciliationStats,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compare engine results year by year against imported figures.
pub fn calculate_reconciliation(
    input: &ReconciliationInput,
) -> PetroEconResult<ComputationOutput<ReconciliationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.threshold_pct < Decimal::ZERO {
        return Err(PetroEconError::invalid(
            "threshold_pct",
            "Threshold cannot be negative",
        ));
    }

    let mut imported: HashMap<i32, &ImportedRow> = HashMap::new();
    for row in &input.imported_rows {
        if imported.insert(row.year, row).is_some() {
            return Err(PetroEconError::invalid(
                format!("imported_rows[{}]", row.year),
                "Duplicate imported year",
            ));
        }
    }

    let mut model_rows: Vec<&AnnualResultRow> = input.model_results.iter().collect();
    model_rows.sort_by_key(|r| r.year);
    let model_years: HashSet<i32> = model_rows.iter().map(|r| r.year).collect();
    debug!(
        model_years = model_rows.len(),
        imported_years = imported.len(),
        "reconciling"
    );

    let rows: Vec<ReconciliationRow> = model_rows
        .iter()
        .map(|m| reconcile_year(m, imported.get(&m.year).copied(), input.threshold_pct))
        .collect();

    let total_rows = rows.len();
    let matches = rows.iter().filter(|r| r.is_match).count();
    let rate = if total_rows == 0 {
        None
    } else {
        Some(Decimal::from(matches as u64) / Decimal::from(total_rows as u64) * dec!(100))
    };

    let first_divergence = rows.iter().enumerate().find(|(_, r)| !r.is_match).map(|(i, r)| {
        FirstDivergence {
            year: r.year,
            row: i,
            line: r.lines.iter().find(|l| !l.is_match).map(|l| l.line),
            reason: r.reason.clone().unwrap_or_default(),
        }
    });

    let unmatched_imports = imported
        .keys()
        .filter(|y| !model_years.contains(y))
        .count();
    if unmatched_imports > 0 {
        warnings.push(format!(
            "{unmatched_imports} imported year(s) have no model year"
        ));
    }

    let output = ReconciliationOutput {
        rows,
        stats: ReconciliationStats {
            total_rows,
            matches,
            rate,
            first_divergence,
            unmatched_imports,
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Model vs Imported Cashflow Reconciliation",
        &serde_json::json!({
            "threshold_pct": input.threshold_pct.to_string(),
            "lines": ReconciledLine::ALL.iter().map(|l| l.label()).collect::<Vec<_>>(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn reconcile_year(
    model: &AnnualResultRow,
    imported: Option<&ImportedRow>,
    threshold: Percent,
) -> ReconciliationRow {
    let Some(imported) = imported else {
        return ReconciliationRow {
            year: model.year,
            lines: ReconciledLine::ALL
                .iter()
                .map(|line| LineComparison {
                    line: *line,
                    model: line.model_value(model),
                    imported: None,
                    delta: None,
                    delta_pct: None,
                    is_match: false,
                })
                .collect(),
            is_match: false,
            reason: Some("no imported row".into()),
        };
    };

    let lines: Vec<LineComparison> = ReconciledLine::ALL
        .iter()
        .map(|line| compare_line(*line, model, imported, threshold))
        .collect();

    let reason = lines.iter().find(|l| !l.is_match).map(|l| match l.delta_pct {
        Some(pct) => format!(
            "{} differs by {}% (threshold {}%)",
            l.line.label(),
            pct.round_dp(2),
            threshold
        ),
        None => format!("{} imported as zero, model is {}", l.line.label(), l.model),
    });

    ReconciliationRow {
        year: model.year,
        is_match: reason.is_none(),
        lines,
        reason,
    }
}

fn compare_line(
    line: ReconciledLine,
    model: &AnnualResultRow,
    imported: &ImportedRow,
    threshold: Percent,
) -> LineComparison {
    let model_value = line.model_value(model);
    let Some(imported_value) = line.imported_value(imported) else {
        // Blank import cell: nothing to compare
        return LineComparison {
            line,
            model: model_value,
            imported: None,
            delta: None,
            delta_pct: None,
            is_match: true,
        };
    };

    let delta = model_value - imported_value;
    let delta_pct = if imported_value.is_zero() {
        delta.is_zero().then_some(Decimal::ZERO)
    } else {
        Some(delta / imported_value.abs() * dec!(100))
    };
    let is_match = delta_pct.is_some_and(|pct| pct.abs() <= threshold);

    LineComparison {
        line,
        model: model_value,
        imported: Some(imported_value),
        delta: Some(delta),
        delta_pct,
        is_match,
    }
}
