pub mod assumptions;
pub mod fiscal;
pub mod profiles;
pub mod settings;
pub mod validation;

use serde::{Deserialize, Serialize};

pub use assumptions::{Assumptions, PriceAssumptions, PriceDeckRow};
pub use fiscal::{
    CostRecoveryPolicy, DepreciationMethod, FiscalTerms, JvTerms, PscTerms, RoyaltyTaxTerms,
};
pub use profiles::{CapexRow, CostData, OpexRow, ProductionRow};
pub use settings::{Frequency, ModelSettings, PriceDeckType, Product, Stream};
pub use validation::{
    validate_input, MAX_INPUT_AMOUNT, MAX_MODEL_YEAR, MAX_REFERENCE_OFFSET, MIN_MODEL_YEAR,
};

/// Everything the cashflow engine needs for one run. The calling layer owns
/// and edits this; engines only ever borrow it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsInput {
    pub model_settings: ModelSettings,
    pub streams: Vec<Stream>,
    pub production_data: Vec<ProductionRow>,
    pub cost_data: CostData,
    pub fiscal_terms: FiscalTerms,
    pub price_assumptions: PriceAssumptions,
    pub assumptions: Assumptions,
}

impl EconomicsInput {
    /// Whether `product` has an active stream.
    pub fn is_active(&self, product: Product) -> bool {
        self.streams
            .iter()
            .any(|s| s.active && s.product() == Some(product))
    }
}
