use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::DepreciationMethod;
use crate::types::{Money, Percent, Volume};

/// Straight-line tranche of one year's capex.
#[derive(Debug, Clone)]
struct Vintage {
    remaining: Money,
    annual_charge: Money,
}

/// Tax depreciation schedule for one engine run.
///
/// Whatever book value remains in the final model year is written off in
/// that year, so the charges over the horizon always sum to total capex.
#[derive(Debug, Clone)]
pub struct DepreciationSchedule {
    method: DepreciationMethod,
    book_life_years: u32,
    declining_rate: Decimal,
    vintages: Vec<Vintage>,
    pool: Money,
    /// boe still to be produced from each year index to the end
    remaining_boe: Vec<Volume>,
}

impl DepreciationSchedule {
    pub fn new(
        method: DepreciationMethod,
        book_life_years: u32,
        declining_balance_rate: Percent,
        boe_profile: &[Volume],
    ) -> Self {
        let mut remaining_boe = vec![Decimal::ZERO; boe_profile.len()];
        let mut acc = Decimal::ZERO;
        for (i, boe) in boe_profile.iter().enumerate().rev() {
            acc += boe;
            remaining_boe[i] = acc;
        }

        DepreciationSchedule {
            method,
            book_life_years: book_life_years.max(1),
            declining_rate: declining_balance_rate / dec!(100),
            vintages: Vec::new(),
            pool: Decimal::ZERO,
            remaining_boe,
        }
    }

    /// Add `capex` spent in year `idx` and return that year's charge.
    pub fn charge(&mut self, idx: usize, capex: Money, boe: Volume) -> Money {
        let is_last = idx + 1 >= self.remaining_boe.len();

        match self.method {
            DepreciationMethod::Expensed => capex,
            DepreciationMethod::StraightLine => {
                if capex > Decimal::ZERO {
                    self.vintages.push(Vintage {
                        remaining: capex,
                        annual_charge: capex / Decimal::from(self.book_life_years),
                    });
                }
                let mut total = Decimal::ZERO;
                for v in &mut self.vintages {
                    let amount = if is_last {
                        v.remaining
                    } else {
                        v.annual_charge.min(v.remaining)
                    };
                    v.remaining -= amount;
                    total += amount;
                }
                self.vintages.retain(|v| v.remaining > Decimal::ZERO);
                total
            }
            DepreciationMethod::DecliningBalance => {
                self.pool += capex;
                let amount = if is_last {
                    self.pool
                } else {
                    self.pool * self.declining_rate
                };
                self.pool -= amount;
                amount
            }
            DepreciationMethod::UnitOfProduction => {
                self.pool += capex;
                let remaining = self.remaining_boe.get(idx).copied().unwrap_or_default();
                let amount = if is_last {
                    self.pool
                } else if remaining > Decimal::ZERO {
                    self.pool * (boe / remaining)
                } else {
                    Decimal::ZERO
                };
                self.pool -= amount;
                amount
            }
        }
    }
}
