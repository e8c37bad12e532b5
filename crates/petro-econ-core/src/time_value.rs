use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const BRACKET_WIDTH: Decimal = dec!(0.000000000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const IRR_LOWER_BOUND: Rate = dec!(-0.99);
const IRR_UPPER_BOUND: Rate = dec!(10.0);
/// Longest span `compound` will walk
const MAX_COMPOUND_PERIODS: u32 = 1000;

/// Rates scanned when Newton-Raphson fails and a sign change has to be
/// bracketed. Ordered ascending, strictly inside the solver bounds.
const IRR_SCAN_GRID: [Rate; 23] = [
    dec!(-0.95),
    dec!(-0.9),
    dec!(-0.8),
    dec!(-0.6),
    dec!(-0.4),
    dec!(-0.2),
    dec!(-0.1),
    dec!(0),
    dec!(0.05),
    dec!(0.1),
    dec!(0.15),
    dec!(0.2),
    dec!(0.3),
    dec!(0.4),
    dec!(0.5),
    dec!(0.75),
    dec!(1),
    dec!(1.5),
    dec!(2),
    dec!(3),
    dec!(5),
    dec!(7.5),
    dec!(9.99),
];

/// Growth factor `(1 + rate)^periods`. Negative periods discount.
///
/// Returns `None` when the factor is not representable.
pub fn compound(rate: Rate, periods: i32) -> Option<Decimal> {
    if periods.unsigned_abs() > MAX_COMPOUND_PERIODS {
        return None;
    }
    let base = Decimal::ONE.checked_add(rate)?;
    let mut factor = Decimal::ONE;
    for _ in 0..periods.unsigned_abs() {
        factor = factor.checked_mul(base)?;
    }
    if periods < 0 {
        Decimal::ONE.checked_div(factor)
    } else {
        Some(factor)
    }
}

/// Discount factor `1 / (1 + rate)^periods`.
pub fn discount_factor(rate: Rate, periods: i32) -> Option<Decimal> {
    compound(rate, periods.checked_neg()?)
}

/// Present value of year-stamped flows discounted to `origin_year`.
/// Flows dated before the origin are compounded forward.
pub fn present_value(rate: Rate, origin_year: i32, flows: &[(i32, Money)]) -> Option<Money> {
    let mut total = Decimal::ZERO;
    for (year, amount) in flows {
        let df = discount_factor(rate, year.checked_sub(origin_year)?)?;
        total = total.checked_add(amount.checked_mul(df)?)?;
    }
    Some(total)
}

/// True when the series contains both a strictly negative and a strictly
/// positive flow. Without one there is no rate at which NPV crosses zero.
pub fn has_sign_change(cash_flows: &[Money]) -> bool {
    let any_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    let any_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    any_negative && any_positive
}

/// Internal Rate of Return of an evenly spaced series.
///
/// Newton-Raphson from a 10% guess; if that leaves (-99%, 1000%) or stalls,
/// the first sign change of NPV over a fixed rate grid is bisected. Returns
/// `None` when the series never changes sign or neither phase converges.
pub fn irr(cash_flows: &[Money]) -> Option<Rate> {
    if cash_flows.len() < 2 || !has_sign_change(cash_flows) {
        return None;
    }

    newton_irr(cash_flows, dec!(0.10)).or_else(|| bisection_irr(cash_flows))
}

fn newton_irr(cash_flows: &[Money], guess: Rate) -> Option<Rate> {
    let mut rate = guess;

    for _ in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) = npv_with_derivative(rate, cash_flows)?;

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Some(rate);
        }
        if dnpv.is_zero() {
            return None;
        }

        rate = rate.checked_sub(npv_val.checked_div(dnpv)?)?;

        // Leave divergent iterations to the bracketing phase
        if rate <= IRR_LOWER_BOUND || rate >= IRR_UPPER_BOUND {
            return None;
        }
    }

    None
}

fn bisection_irr(cash_flows: &[Money]) -> Option<Rate> {
    let samples: Vec<(Rate, Money)> = IRR_SCAN_GRID
        .iter()
        .filter_map(|r| npv_checked(*r, cash_flows).map(|v| (*r, v)))
        .collect();

    if let Some((r, _)) = samples.iter().find(|(_, v)| v.is_zero()) {
        return Some(*r);
    }

    let (mut lo, mut f_lo, mut hi) = samples.windows(2).find_map(|pair| {
        let (r0, v0) = pair[0];
        let (r1, v1) = pair[1];
        (v0.is_sign_negative() != v1.is_sign_negative()).then_some((r0, v0, r1))
    })?;

    for _ in 0..MAX_IRR_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let f_mid = npv_checked(mid, cash_flows)?;

        if f_mid.abs() < CONVERGENCE_THRESHOLD || hi - lo < BRACKET_WIDTH {
            return Some(mid);
        }

        if f_mid.is_sign_negative() == f_lo.is_sign_negative() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    None
}

/// NPV with iterative discount factors and checked arithmetic.
fn npv_checked(rate: Rate, cash_flows: &[Money]) -> Option<Money> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            match discount.checked_mul(one_plus_r) {
                Some(d) => discount = d,
                // Only a growing factor overflows; later terms round to zero
                None => break,
            }
        }
        if discount.is_zero() {
            return None;
        }
        result = result.checked_add(cf.checked_div(discount)?)?;
    }

    Some(result)
}

fn npv_with_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Money, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        if discount.is_zero() {
            return None;
        }
        npv_val = npv_val.checked_add(cf.checked_div(discount)?)?;
        if t > 0 {
            let t_dec = Decimal::from(t as i64);
            let term = t_dec
                .checked_mul(*cf)?
                .checked_div(discount.checked_mul(one_plus_r)?)?;
            dnpv = dnpv.checked_sub(term)?;
        }
    }

    Some((npv_val, dnpv))
}
