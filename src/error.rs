//! Error types for docfill library.

use std::io;
use thiserror::Error;

/// Result type alias for docfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while filling or converting documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when creating or writing temporary files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Field data nests deeper than the configured limit.
    #[error("Field data too deeply nested (limit is {limit} levels)")]
    NestingTooDeep {
        /// Configured maximum nesting depth
        limit: usize,
    },

    /// The template engine rejected the template or the field data.
    #[error("Template error: {0}")]
    Template(String),

    /// The format converter failed.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// No converter is registered for the requested output format.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Generation was requested without a template engine.
    #[error("No template engine configured")]
    NoEngine,

    /// Error encoding field data for an external collaborator.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Field data could not be loaded.
    #[error("Invalid field data: {0}")]
    InvalidData(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
