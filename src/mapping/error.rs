use thiserror::Error;

pub type MappingResult<T> = Result<T, MappingError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("You cannot use 'expiry' and 'expiryExpression' at the same time on {0}")]
    ConflictingExpiry(String),

    #[error("Invalid Integer value for expiry expression: {0}")]
    InvalidExpiryExpression(String),

    #[error("Could not resolve placeholder '{0}'")]
    UnresolvedPlaceholder(String),

    #[error("{0} does not serialize to a JSON object")]
    NotAnObject(String),

    #[error("Could not convert {type_name}: {reason}")]
    Conversion { type_name: String, reason: String },
}
