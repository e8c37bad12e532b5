use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Volume};

/// One calendar year of production rates (annual volumes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionRow {
    pub year: i32,
    /// bbl per year
    #[serde(default)]
    pub oil_rate: Volume,
    /// mcf per year
    #[serde(default)]
    pub gas_rate: Volume,
    /// bbl per year
    #[serde(default)]
    pub condensate_rate: Volume,
    /// bbl per year, drives variable water handling cost only
    #[serde(default)]
    pub water_rate: Volume,
    #[serde(default)]
    pub notes: String,
}

impl ProductionRow {
    pub fn empty(year: i32) -> Self {
        ProductionRow {
            year,
            ..Default::default()
        }
    }

    pub fn scale(&mut self, factor: Decimal) {
        self.oil_rate *= factor;
        self.gas_rate *= factor;
        self.condensate_rate *= factor;
        self.water_rate *= factor;
    }
}

/// One calendar year of capital spend, net to the company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapexRow {
    pub year: i32,
    #[serde(default)]
    pub drilling_capex: Money,
    #[serde(default)]
    pub facilities_capex: Money,
    #[serde(default)]
    pub abandonment_capex: Money,
    #[serde(default)]
    pub other_capex: Money,
    #[serde(default)]
    pub notes: String,
}

impl CapexRow {
    pub fn empty(year: i32) -> Self {
        CapexRow {
            year,
            ..Default::default()
        }
    }

    pub fn total(&self) -> Money {
        self.drilling_capex + self.facilities_capex + self.abandonment_capex + self.other_capex
    }

    pub fn scale(&mut self, factor: Decimal) {
        self.drilling_capex *= factor;
        self.facilities_capex *= factor;
        self.abandonment_capex *= factor;
        self.other_capex *= factor;
    }
}

/// One calendar year of operating cost. Variable terms are per unit of
/// net produced volume (per bbl oil, per mcf gas, per bbl water).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpexRow {
    pub year: i32,
    #[serde(default)]
    pub fixed_opex: Money,
    #[serde(default)]
    pub variable_oil: Money,
    #[serde(default)]
    pub variable_gas: Money,
    #[serde(default)]
    pub variable_water: Money,
    #[serde(default)]
    pub notes: String,
}

impl OpexRow {
    pub fn empty(year: i32) -> Self {
        OpexRow {
            year,
            ..Default::default()
        }
    }

    pub fn scale(&mut self, factor: Decimal) {
        self.fixed_opex *= factor;
        self.variable_oil *= factor;
        self.variable_gas *= factor;
        self.variable_water *= factor;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostData {
    pub capex_profile: Vec<CapexRow>,
    pub opex_profile: Vec<OpexRow>,
}
