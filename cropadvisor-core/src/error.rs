//! Error types for the crop advisory domain

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("{0}")]
    Validation(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Invalid document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
