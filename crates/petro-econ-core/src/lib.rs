pub mod error;
pub mod model;
pub mod time_value;
pub mod types;

#[cfg(feature = "cashflow")]
pub mod cashflow;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

#[cfg(feature = "incremental")]
pub mod incremental;

#[cfg(feature = "reconciliation")]
pub mod reconciliation;

#[cfg(feature = "reporting")]
pub mod reporting;

pub use error::PetroEconError;
pub use types::*;

/// Standard result type for all petroleum economics computations
pub type PetroEconResult<T> = Result<T, PetroEconError>;
