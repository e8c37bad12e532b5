use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::PetroEconError;
use crate::model::{Assumptions, FiscalTerms, PscTerms};
use crate::types::{Money, Percent, Rate};
use crate::PetroEconResult;

/// Pre-fiscal figures for one year, as seen by a regime.
#[derive(Debug, Clone, Copy)]
pub struct YearBase {
    pub gross_revenue: Money,
    pub opex: Money,
    pub capex: Money,
    pub depreciation: Money,
}

/// Fiscal outcome of one year.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiscalYear {
    pub royalties: Money,
    pub recoverable_cost: Money,
    /// Government share of profit oil
    pub profit_share: Money,
    pub taxable_income: Money,
    pub tax: Money,
}

impl FiscalYear {
    pub fn govt_take(&self) -> Money {
        self.royalties + self.tax + self.profit_share
    }
}

/// Corporate tax with an optional loss carry-forward pool. Never negative.
#[derive(Debug, Clone)]
struct TaxLedger {
    rate: Rate,
    carry_forward: bool,
    loss_pool: Money,
}

impl TaxLedger {
    fn new(rate: Percent, carry_forward: bool) -> Self {
        TaxLedger {
            rate: rate / dec!(100),
            carry_forward,
            loss_pool: Decimal::ZERO,
        }
    }

    fn assess(&mut self, taxable_income: Money) -> Money {
        if !self.carry_forward {
            return taxable_income.max(Decimal::ZERO) * self.rate;
        }
        if taxable_income <= Decimal::ZERO {
            self.loss_pool += -taxable_income;
            return Decimal::ZERO;
        }
        let relief = self.loss_pool.min(taxable_income);
        self.loss_pool -= relief;
        (taxable_income - relief) * self.rate
    }
}

/// Royalty then tax on net income (royalty_tax and jv templates).
#[derive(Debug, Clone)]
pub struct Concession {
    royalty_rate: Rate,
    tax: TaxLedger,
}

impl Concession {
    fn settle(&mut self, base: &YearBase) -> FiscalYear {
        let royalties = base.gross_revenue * self.royalty_rate;
        let taxable_income = base.gross_revenue - royalties - base.opex - base.depreciation;
        let tax = self.tax.assess(taxable_income);
        FiscalYear {
            royalties,
            recoverable_cost: Decimal::ZERO,
            profit_share: Decimal::ZERO,
            taxable_income,
            tax,
        }
    }
}

/// Cost oil / profit oil split with a carried cost pool.
#[derive(Debug, Clone)]
pub struct ProductionSharing {
    royalty_rate: Rate,
    cost_oil_limit: Rate,
    contractor_split: Rate,
    uplift_rate: Rate,
    ceiling_remaining: Option<Money>,
    cost_pool: Money,
    tax: TaxLedger,
}

impl ProductionSharing {
    fn new(terms: &PscTerms, royalty_rate: Percent, tax: TaxLedger) -> Self {
        ProductionSharing {
            royalty_rate: royalty_rate / dec!(100),
            cost_oil_limit: terms.cost_oil_limit / dec!(100),
            contractor_split: terms.profit_split / dec!(100),
            uplift_rate: terms.cost_recovery.uplift_rate,
            ceiling_remaining: terms.cost_recovery.ceiling,
            cost_pool: Decimal::ZERO,
            tax,
        }
    }

    fn settle(&mut self, base: &YearBase) -> PetroEconResult<FiscalYear> {
        let revenue = base.gross_revenue;
        let royalties = revenue * self.royalty_rate;

        let pool = self
            .cost_pool
            .checked_mul(Decimal::ONE + self.uplift_rate)
            .and_then(|carried| carried.checked_add(base.opex + base.capex))
            .ok_or_else(|| {
                PetroEconError::invalid(
                    "fiscal_terms.cost_recovery.uplift_rate",
                    "Carried PSC cost pool is not representable",
                )
            })?;
        let mut recoverable_cost = pool
            .min(revenue * self.cost_oil_limit)
            .min(revenue - royalties)
            .max(Decimal::ZERO);
        if let Some(remaining) = self.ceiling_remaining.as_mut() {
            recoverable_cost = recoverable_cost.min(*remaining);
            *remaining -= recoverable_cost;
        }
        self.cost_pool = pool - recoverable_cost;

        let profit_oil = revenue - royalties - recoverable_cost;
        let profit_share = profit_oil * (Decimal::ONE - self.contractor_split);

        let taxable_income =
            revenue - royalties - base.opex - base.depreciation - recoverable_cost;
        let tax = self.tax.assess(taxable_income);

        Ok(FiscalYear {
            royalties,
            recoverable_cost,
            profit_share,
            taxable_income,
            tax,
        })
    }

    /// Cost still awaiting recovery after the last settled year.
    pub fn unrecovered_cost(&self) -> Money {
        self.cost_pool
    }
}

/// Fiscal regime resolved once per engine call from `FiscalTerms`.
#[derive(Debug, Clone)]
pub enum FiscalRegime {
    Concession(Concession),
    ProductionSharing(ProductionSharing),
}

impl FiscalRegime {
    pub fn from_terms(terms: &FiscalTerms, assumptions: &Assumptions) -> Self {
        let tax = TaxLedger::new(terms.tax_rate(assumptions), terms.loss_carry_forward());
        let royalty_rate = terms.royalty_rate(assumptions);

        match terms {
            FiscalTerms::RoyaltyTax(_) | FiscalTerms::Jv(_) => {
                FiscalRegime::Concession(Concession {
                    royalty_rate: royalty_rate / dec!(100),
                    tax,
                })
            }
            FiscalTerms::Psc(psc) => {
                FiscalRegime::ProductionSharing(ProductionSharing::new(psc, royalty_rate, tax))
            }
        }
    }

    pub fn settle(&mut self, base: &YearBase) -> PetroEconResult<FiscalYear> {
        match self {
            FiscalRegime::Concession(c) => Ok(c.settle(base)),
            FiscalRegime::ProductionSharing(p) => p.settle(base),
        }
    }
}
