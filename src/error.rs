use thiserror::Error;

use crate::adf::validate::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
    /// The root value is not a `doc` node of the supported version.
    #[error("Invalid ADF: {0}")]
    MalformedDocument(String),

    #[error(
        "Invalid ADF document: {} violation(s), first: {}",
        errors.len(),
        errors.first().map(ToString::to_string).unwrap_or_default()
    )]
    SchemaViolation { errors: Vec<ValidationError> },
}

pub type Result<T> = std::result::Result<T, Error>;
