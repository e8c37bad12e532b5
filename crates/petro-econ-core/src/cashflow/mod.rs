pub mod depreciation;
pub mod engine;
pub mod fiscal_regime;
pub mod metrics;

pub use engine::{calculate_economics, evaluate, AnnualResultRow, EconomicsOutput};
pub use metrics::Metrics;
