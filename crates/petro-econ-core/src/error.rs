use thiserror::Error;

#[derive(Debug, Error)]
pub enum PetroEconError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Year coverage error in {profile} at {year}: {reason}")]
    YearCoverage {
        profile: String,
        year: i32,
        reason: String,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PetroEconError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PetroEconError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PetroEconError {
    fn from(e: serde_json::Error) -> Self {
        PetroEconError::SerializationError(e.to_string())
    }
}
