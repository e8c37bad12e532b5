use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::engine::{evaluate_without_breakeven, AnnualResultRow};
use crate::model::{EconomicsInput, Product};
use crate::time_value::{has_sign_change, irr};
use crate::types::{Money, Multiple, Rate, Volume};

const BREAKEVEN_TOLERANCE: Money = dec!(0.0001);
const BREAKEVEN_MAX_PRICE: Money = dec!(1000000);
const BREAKEVEN_MAX_ITERATIONS: u32 = 100;

/// Scenario-level investment metrics.
///
/// Totals missing from caller-supplied JSON default to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// Net cashflow discounted to the reference year
    pub npv: Money,
    /// Decimal rate (0.15 = 15%); undefined without a sign change
    pub irr: Option<Rate>,
    /// Positive distributions over invested capital
    pub dpi: Option<Multiple>,
    /// First year with non-negative cumulative cashflow
    pub payback_year: Option<i32>,
    /// (opex + capex) per boe
    pub unit_technical_cost: Option<Money>,
    /// Flat oil price giving zero NPV
    pub breakeven_price: Option<Money>,
    pub undiscounted_cashflow: Money,
    pub total_revenue: Money,
    pub total_opex: Money,
    pub total_capex: Money,
    pub total_govt_take: Money,
    /// Government take over pre-take profit
    pub govt_take_share: Option<Rate>,
    /// Deepest cumulative cashflow (zero or negative)
    pub max_exposure: Money,
    pub total_boe: Volume,
}

/// Derive every metric except the breakeven price from the annual rows.
pub(crate) fn derive(rows: &[AnnualResultRow], warnings: &mut Vec<String>) -> Metrics {
    let flows: Vec<Money> = rows.iter().map(|r| r.net_cashflow).collect();

    let npv: Money = rows.iter().map(|r| r.discounted_cashflow).sum();
    let undiscounted_cashflow: Money = flows.iter().sum();

    let irr_value = irr(&flows);
    if irr_value.is_none() {
        let reason = if has_sign_change(&flows) {
            "solver did not converge"
        } else {
            "cashflow never changes sign"
        };
        warn!(reason, "IRR undefined");
        warnings.push(format!("IRR undefined: {reason}"));
    }

    let distributed: Money = flows.iter().filter(|cf| **cf > Decimal::ZERO).sum();
    let invested: Money = flows
        .iter()
        .filter(|cf| **cf < Decimal::ZERO)
        .map(|cf| -*cf)
        .sum();
    let dpi = if invested.is_zero() {
        warnings.push("DPI undefined: no invested capital".into());
        None
    } else {
        Some(distributed / invested)
    };

    let payback_year = rows
        .iter()
        .find(|r| r.cumulative_cashflow >= Decimal::ZERO)
        .map(|r| r.year);

    let total_revenue: Money = rows.iter().map(|r| r.gross_revenue).sum();
    let total_opex: Money = rows.iter().map(|r| r.opex).sum();
    let total_capex: Money = rows.iter().map(|r| r.capex).sum();
    let total_govt_take: Money = rows.iter().map(|r| r.govt_take).sum();
    let total_boe: Volume = rows.iter().map(|r| r.boe).sum();

    let unit_technical_cost = if total_boe.is_zero() {
        warnings.push("Unit technical cost undefined: no production".into());
        None
    } else {
        Some((total_opex + total_capex) / total_boe)
    };

    let pre_take = total_revenue - total_opex - total_capex;
    let govt_take_share = if pre_take > Decimal::ZERO {
        Some(total_govt_take / pre_take)
    } else {
        None
    };

    let max_exposure = rows
        .iter()
        .map(|r| r.cumulative_cashflow)
        .fold(Decimal::ZERO, Decimal::min);

    Metrics {
        npv,
        irr: irr_value,
        dpi,
        payback_year,
        unit_technical_cost,
        breakeven_price: None,
        undiscounted_cashflow,
        total_revenue,
        total_opex,
        total_capex,
        total_govt_take,
        govt_take_share,
        max_exposure,
        total_boe,
    }
}

// ---------------------------------------------------------------------------
// Breakeven
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub(crate) enum BreakevenFailure {
    #[error("oil is not an active stream")]
    NoOilStream,
    #[error("NPV is non-negative even at a zero oil price")]
    PositiveAtZero,
    #[error("NPV stays negative up to {0}/bbl")]
    NoBracket(Money),
    #[error("no convergence after {0} iterations")]
    NoConvergence(u32),
    #[error("trial run failed: {0}")]
    Trial(String),
}

/// Flat oil price at which NPV crosses zero, by bisection on re-runs of the
/// engine. Escalation and every other input are held; custom deck oil
/// overrides are dropped for the trials.
pub(crate) fn breakeven_price(input: &EconomicsInput) -> Result<Money, BreakevenFailure> {
    if !input.is_active(Product::Oil) {
        return Err(BreakevenFailure::NoOilStream);
    }

    let mut trial = input.clone();
    for row in &mut trial.price_assumptions.price_deck {
        row.oil_price = None;
    }
    let mut npv_at = |price: Money| -> Result<Money, BreakevenFailure> {
        trial.price_assumptions.oil_price = price;
        evaluate_without_breakeven(&trial)
            .map(|out| out.metrics.npv)
            .map_err(|e| BreakevenFailure::Trial(e.to_string()))
    };

    let mut lo = Decimal::ZERO;
    if npv_at(lo)? >= Decimal::ZERO {
        return Err(BreakevenFailure::PositiveAtZero);
    }

    let mut hi = (input.price_assumptions.oil_price * dec!(2)).max(dec!(100));
    while npv_at(hi)? < Decimal::ZERO {
        if hi >= BREAKEVEN_MAX_PRICE {
            return Err(BreakevenFailure::NoBracket(BREAKEVEN_MAX_PRICE));
        }
        lo = hi;
        hi = (hi * dec!(2)).min(BREAKEVEN_MAX_PRICE);
    }

    for _ in 0..BREAKEVEN_MAX_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        if hi - lo < BREAKEVEN_TOLERANCE {
            return Ok(mid);
        }
        if npv_at(mid)? < Decimal::ZERO {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Err(BreakevenFailure::NoConvergence(BREAKEVEN_MAX_ITERATIONS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(year: i32, net: Money, cumulative: Money, boe: Volume) -> AnnualResultRow {
        AnnualResultRow {
            year,
            net_cashflow: net,
            cumulative_cashflow: cumulative,
            discounted_cashflow: net,
            boe,
            ..Default::default()
        }
    }

    #[test]
    fn test_payback_and_exposure() {
        let rows = vec![
            row(2025, dec!(-100), dec!(-100), dec!(0)),
            row(2026, dec!(60), dec!(-40), dec!(10)),
            row(2027, dec!(60), dec!(20), dec!(10)),
        ];
        let mut warnings = Vec::new();
        let m = derive(&rows, &mut warnings);
        assert_eq!(m.payback_year, Some(2027));
        assert_eq!(m.max_exposure, dec!(-100));
        assert_eq!(m.dpi, Some(dec!(1.2)));
        assert_eq!(m.undiscounted_cashflow, dec!(20));
        assert!(m.irr.is_some());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_never_pays_back() {
        let rows = vec![
            row(2025, dec!(-100), dec!(-100), dec!(0)),
            row(2026, dec!(10), dec!(-90), dec!(0)),
        ];
        let mut warnings = Vec::new();
        let m = derive(&rows, &mut warnings);
        assert_eq!(m.payback_year, None);
        assert_eq!(m.unit_technical_cost, None);
        assert!(warnings.iter().any(|w| w.contains("Unit technical cost")));
    }

    #[test]
    fn test_all_positive_leaves_irr_and_dpi_undefined() {
        let rows = vec![
            row(2025, dec!(10), dec!(10), dec!(1)),
            row(2026, dec!(10), dec!(20), dec!(1)),
        ];
        let mut warnings = Vec::new();
        let m = derive(&rows, &mut warnings);
        assert_eq!(m.irr, None);
        assert_eq!(m.dpi, None);
        assert_eq!(m.max_exposure, Decimal::ZERO);
        assert!(warnings.iter().any(|w| w.contains("never changes sign")));
    }
}
