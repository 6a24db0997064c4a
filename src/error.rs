//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! The server layer maps each variant onto an HTTP status.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, Error>;
