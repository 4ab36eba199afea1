//! Request-scoped error taxonomy.
//!
//! Every variant aborts at most the request that raised it; fan-out
//! sub-failures are handled (logged and degraded) before they reach here.

use thiserror::Error;

use crate::application::sources::api::SourceError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Soft outcome: the source has no record for the query. Handlers map
    /// this to an empty answer, not a bus-level error.
    #[error("no `{entity}` matches the query")]
    NotFound { entity: &'static str },

    /// The external call exceeded its per-call budget. Never retried here.
    #[error("source call timed out after {budget_ms}ms")]
    Timeout { budget_ms: u64 },

    /// Identifier does not fit the source's 32-bit id space.
    #[error("identifier {value} is out of the representable range")]
    Conversion { value: i64 },

    /// Protocol violation: the request kind has no routing-table entry.
    #[error("no handler registered for query kind `{kind}`")]
    UnknownQueryKind { kind: &'static str },

    /// Input constraint violation, fatal to the single request.
    #[error("invalid request: {message}")]
    Validation { message: String },

    #[error("catalogue source error: {0}")]
    Source(#[from] SourceError),

    #[error("cache payload could not be decoded: {0}")]
    CacheCodec(#[from] serde_json::Error),

    #[error("unexpected error: {message}")]
    Unexpected { message: String },
}

impl AppError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn conversion(value: i64) -> Self {
        Self::Conversion { value }
    }

    pub fn unknown_kind(kind: &'static str) -> Self {
        Self::UnknownQueryKind { kind }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// True for the soft-absence outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Range-checked narrowing for identifiers crossing the 64→32 bit boundary.
///
/// Fails fast before any network call rather than silently truncating.
pub fn to_source_id(value: i64) -> Result<i32, AppError> {
    i32::try_from(value).map_err(|_| AppError::conversion(value))
}
