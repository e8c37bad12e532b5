use serde::{Deserialize, Serialize};

use crate::types::{Currency, Rate};

/// Model time step. Only annual models are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Annual,
}

/// How yearly prices are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDeckType {
    /// Base price escalated from the reference year
    #[default]
    Flat,
    /// Explicit per-year deck entries, escalated base price elsewhere
    Custom,
}

/// Model-level settings shared by every engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    pub start_year: i32,
    pub end_year: i32,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub currency: Currency,
    /// Annual discount rate (decimal, 0.10 = 10%)
    pub discount_rate: Rate,
    /// Annual cost inflation (decimal), applied only when enabled
    #[serde(default)]
    pub inflation_rate: Rate,
    #[serde(default)]
    pub inflation_enabled: bool,
    #[serde(default)]
    pub price_deck_type: PriceDeckType,
    /// Origin year for discounting, escalation and inflation.
    /// Defaults to `start_year`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_year: Option<i32>,
}

impl ModelSettings {
    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or(self.start_year)
    }

    /// Whole years from the reference year to `year`; `None` on overflow.
    pub fn periods_from_reference(&self, year: i32) -> Option<i32> {
        year.checked_sub(self.reference_year())
    }

    /// Calendar years covered by the model, in order.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_year..=self.end_year
    }

    pub fn year_count(&self) -> usize {
        if self.end_year < self.start_year {
            0
        } else {
            (self.end_year - self.start_year + 1) as usize
        }
    }
}

/// Hydrocarbon (or water) product a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Oil,
    Gas,
    Condensate,
    Water,
}

impl Product {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "oil" => Some(Product::Oil),
            "gas" => Some(Product::Gas),
            "condensate" => Some(Product::Condensate),
            "water" => Some(Product::Water),
            _ => None,
        }
    }
}

/// A production stream toggle. Inactive streams contribute nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub name: String,
    pub active: bool,
}

impl Stream {
    pub fn product(&self) -> Option<Product> {
        Product::from_id(&self.id)
    }
}
