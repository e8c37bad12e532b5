use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Rate};

/// Ownership and operating assumptions. All values on a 0..100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assumptions {
    #[serde(default = "default_hundred")]
    pub working_interest: Percent,
    #[serde(default = "default_hundred")]
    pub net_revenue_interest: Percent,
    #[serde(default)]
    pub tax_rate: Percent,
    #[serde(default)]
    pub royalty_rate: Percent,
    #[serde(default = "default_hundred")]
    pub uptime: Percent,
}

impl Default for Assumptions {
    fn default() -> Self {
        Assumptions {
            working_interest: default_hundred(),
            net_revenue_interest: default_hundred(),
            tax_rate: Decimal::ZERO,
            royalty_rate: Decimal::ZERO,
            uptime: default_hundred(),
        }
    }
}

fn default_hundred() -> Percent {
    dec!(100)
}

/// Per-year override of the escalated base price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceDeckRow {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAssumptions {
    /// $/bbl in the reference year
    pub oil_price: Money,
    /// $/mcf in the reference year
    pub gas_price: Money,
    /// $/bbl; the oil price applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condensate_price: Option<Money>,
    /// Annual fractional price growth (0.02 = 2%)
    #[serde(default)]
    pub escalation: Rate,
    /// Only read when the model uses a custom price deck
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_deck: Vec<PriceDeckRow>,
}

impl PriceAssumptions {
    pub fn scale(&mut self, factor: Decimal) {
        self.oil_price *= factor;
        self.gas_price *= factor;
        if let Some(p) = self.condensate_price.as_mut() {
            *p *= factor;
        }
        for row in &mut self.price_deck {
            if let Some(p) = row.oil_price.as_mut() {
                *p *= factor;
            }
            if let Some(p) = row.gas_price.as_mut() {
                *p *= factor;
            }
        }
    }
}
