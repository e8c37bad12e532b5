use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::assumptions::Assumptions;
use crate::types::{Money, Percent, Rate};

/// Tax depreciation of capital spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    /// Each year's capex spread evenly over the book life
    #[default]
    StraightLine,
    /// Fixed percentage of the undepreciated pool each year
    DecliningBalance,
    /// Pool written down in proportion to boe produced over remaining boe
    UnitOfProduction,
    /// Full deduction in the year incurred
    Expensed,
}

/// How unrecovered PSC cost is carried between years.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostRecoveryPolicy {
    /// Annual uplift on the carried pool (decimal)
    #[serde(default)]
    pub uplift_rate: Rate,
    /// Cumulative cap on recovered cost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<Money>,
}

/// Concessionary royalty plus corporate tax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoyaltyTaxTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub royalty_rate: Option<Percent>,
    #[serde(default)]
    pub depreciation_method: DepreciationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_life_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declining_balance_rate: Option<Percent>,
    #[serde(default = "default_ring_fence")]
    pub ring_fence: bool,
    #[serde(default)]
    pub loss_carry_forward: bool,
}

/// Production sharing contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PscTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Percent>,
    /// Royalty ahead of cost recovery; none unless the contract sets one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub royalty_rate: Option<Percent>,
    #[serde(default)]
    pub depreciation_method: DepreciationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_life_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declining_balance_rate: Option<Percent>,
    #[serde(default = "default_ring_fence")]
    pub ring_fence: bool,
    #[serde(default)]
    pub loss_carry_forward: bool,
    /// Maximum share of gross revenue available as cost oil
    pub cost_oil_limit: Percent,
    /// Contractor share of profit oil
    pub profit_split: Percent,
    #[serde(default)]
    pub cost_recovery: CostRecoveryPolicy,
}

/// Joint venture: equity split comes from the working interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JvTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub royalty_rate: Option<Percent>,
    #[serde(default)]
    pub depreciation_method: DepreciationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_life_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declining_balance_rate: Option<Percent>,
    #[serde(default)]
    pub loss_carry_forward: bool,
}

/// Fiscal regime, tagged by `template_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "template_type", rename_all = "snake_case")]
pub enum FiscalTerms {
    RoyaltyTax(RoyaltyTaxTerms),
    Psc(PscTerms),
    Jv(JvTerms),
}

fn default_ring_fence() -> bool {
    true
}

pub const DEFAULT_BOOK_LIFE_YEARS: u32 = 5;
pub const DEFAULT_DECLINING_BALANCE_RATE: Percent = dec!(25);

impl FiscalTerms {
    pub fn template_name(&self) -> &'static str {
        match self {
            FiscalTerms::RoyaltyTax(_) => "royalty_tax",
            FiscalTerms::Psc(_) => "psc",
            FiscalTerms::Jv(_) => "jv",
        }
    }

    /// Effective tax rate; regime value wins over the model assumption.
    pub fn tax_rate(&self, assumptions: &Assumptions) -> Percent {
        let own = match self {
            FiscalTerms::RoyaltyTax(t) => t.tax_rate,
            FiscalTerms::Psc(t) => t.tax_rate,
            FiscalTerms::Jv(t) => t.tax_rate,
        };
        own.unwrap_or(assumptions.tax_rate)
    }

    /// Effective royalty rate. A PSC never inherits the model royalty.
    pub fn royalty_rate(&self, assumptions: &Assumptions) -> Percent {
        match self {
            FiscalTerms::RoyaltyTax(t) => t.royalty_rate.unwrap_or(assumptions.royalty_rate),
            FiscalTerms::Jv(t) => t.royalty_rate.unwrap_or(assumptions.royalty_rate),
            FiscalTerms::Psc(t) => t.royalty_rate.unwrap_or(Decimal::ZERO),
        }
    }

    pub fn depreciation_method(&self) -> DepreciationMethod {
        match self {
            FiscalTerms::RoyaltyTax(t) => t.depreciation_method,
            FiscalTerms::Psc(t) => t.depreciation_method,
            FiscalTerms::Jv(t) => t.depreciation_method,
        }
    }

    pub fn book_life_years(&self) -> u32 {
        let own = match self {
            FiscalTerms::RoyaltyTax(t) => t.book_life_years,
            FiscalTerms::Psc(t) => t.book_life_years,
            FiscalTerms::Jv(t) => t.book_life_years,
        };
        own.unwrap_or(DEFAULT_BOOK_LIFE_YEARS)
    }

    pub fn declining_balance_rate(&self) -> Percent {
        let own = match self {
            FiscalTerms::RoyaltyTax(t) => t.declining_balance_rate,
            FiscalTerms::Psc(t) => t.declining_balance_rate,
            FiscalTerms::Jv(t) => t.declining_balance_rate,
        };
        own.unwrap_or(DEFAULT_DECLINING_BALANCE_RATE)
    }

    pub fn loss_carry_forward(&self) -> bool {
        match self {
            FiscalTerms::RoyaltyTax(t) => t.loss_carry_forward,
            FiscalTerms::Psc(t) => t.loss_carry_forward,
            FiscalTerms::Jv(t) => t.loss_carry_forward,
        }
    }

    /// JV terms have no ring-fence setting; they are always modeled fenced.
    pub fn ring_fence(&self) -> bool {
        match self {
            FiscalTerms::RoyaltyTax(t) => t.ring_fence,
            FiscalTerms::Psc(t) => t.ring_fence,
            FiscalTerms::Jv(_) => true,
        }
    }
}
