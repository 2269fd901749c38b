use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum EngineError {
    /// A token did not resolve to any unit in the addressed category.
    /// Recognizers treat this as "not my line" and fall through.
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// A `None` or cross-category unit reached the converter API directly.
    /// The dispatcher never produces this; it indicates a caller bug.
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    /// A NaN value reached the converter API.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The arithmetic grammar rejected the expression.
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// The exchange-rate snapshot could not be read.
    #[error("Rate table error: {0}")]
    RateTable(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::RateTable(format!("Deserialization error: {}", err))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
