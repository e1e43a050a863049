use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("snapshot must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("unknown card type: {0}")]
    UnknownCardType(String),

    #[error("unknown step status: {0}")]
    UnknownStepStatus(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
