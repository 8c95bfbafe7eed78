use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvenantError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Structural error: {0}")]
    StructuralError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
