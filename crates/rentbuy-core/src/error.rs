use thiserror::Error;

#[derive(Debug, Error)]
pub enum RentBuyError {
    #[error("Invalid loan terms: {field} — {reason}")]
    InvalidLoanTerms { field: String, reason: String },

    #[error("Domain math error in {context}")]
    DomainMathError { context: String },

    #[error("Invalid holding horizon {horizon}: {reason}")]
    InvalidHorizon { horizon: i64, reason: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RentBuyError {
    pub(crate) fn domain(context: impl Into<String>) -> Self {
        RentBuyError::DomainMathError {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for RentBuyError {
    fn from(e: serde_json::Error) -> Self {
        RentBuyError::SerializationError(e.to_string())
    }
}
