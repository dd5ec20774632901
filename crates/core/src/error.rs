//! Error type of the generation engine.
//!
//! Only document ingestion can fail. Once a document is parsed, every
//! irregularity (unresolvable references, missing operation ids, invalid
//! identifiers) degrades to `any` or a skipped item with a log line.

use thiserror::Error;

/// Errors raised while ingesting an API description document.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The text is not valid JSON, or does not fit the detected dialect.
    #[error("Failed to parse API document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Valid JSON that is neither Swagger 2, OpenAPI 3 nor an API export.
    #[error(
        "Unrecognized API document: expected `swagger: 2.x`, `openapi: 3.x` or an `apiList`/`schemaList` export"
    )]
    UnknownDialect,
}

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, GenerateError>;
