use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::store::StoreError;
use crate::transform::TransformError;

/// Validation errors for caller-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be YYYY-MM-DD or an RFC3339 timestamp: '{value}'")]
    InvalidDate { value: String },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("configuration value '{name}' is invalid: {reason}")]
    InvalidConfig { name: &'static str, reason: String },
}

/// Failure classification surfaced to callers of the retrieval pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    CorruptEntry,
    Storage,
    RateLimited,
    ProviderError,
    MalformedResponse,
    TransportFailure,
    InvalidRecord,
    InvalidRequest,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::CorruptEntry => "corrupt_entry",
            Self::Storage => "storage",
            Self::RateLimited => "rate_limited",
            Self::ProviderError => "provider_error",
            Self::MalformedResponse => "malformed_response",
            Self::TransportFailure => "transport_failure",
            Self::InvalidRecord => "invalid_record",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error returned by [`crate::RetrievalOrchestrator`].
///
/// Serializes as `{ "kind": "...", "message": "..." }`. Cloneable so a single
/// in-flight fetch can hand the same failure to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalError {
    kind: ErrorKind,
    message: String,
}

impl RetrievalError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether an explicit caller retry (for example with `force_refresh`) can succeed.
    pub const fn retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::RateLimited | ErrorKind::TransportFailure | ErrorKind::CorruptEntry
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ErrorKind::NotFound => "store.not_found",
            ErrorKind::CorruptEntry => "store.corrupt_entry",
            ErrorKind::Storage => "store.io",
            ErrorKind::RateLimited => "provider.rate_limited",
            ErrorKind::ProviderError => "provider.error",
            ErrorKind::MalformedResponse => "provider.malformed_response",
            ErrorKind::TransportFailure => "provider.transport_failure",
            ErrorKind::InvalidRecord => "transform.invalid_record",
            ErrorKind::InvalidRequest => "request.invalid",
        }
    }
}

impl Display for RetrievalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for RetrievalError {}

impl From<ValidationError> for RetrievalError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

impl From<StoreError> for RetrievalError {
    fn from(error: StoreError) -> Self {
        let kind = match &error {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::CorruptEntry { .. } => ErrorKind::CorruptEntry,
            StoreError::Io { .. } => ErrorKind::Storage,
        };
        Self::new(kind, error.to_string())
    }
}

impl From<TransformError> for RetrievalError {
    fn from(error: TransformError) -> Self {
        Self::new(ErrorKind::InvalidRecord, error.to_string())
    }
}

impl From<FetchError> for RetrievalError {
    fn from(error: FetchError) -> Self {
        let kind = match &error {
            FetchError::RateLimited(_) => ErrorKind::RateLimited,
            FetchError::Provider(_) => ErrorKind::ProviderError,
            FetchError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            FetchError::Transport(_) => ErrorKind::TransportFailure,
            FetchError::InvalidRecord(_) => ErrorKind::InvalidRecord,
        };
        Self::new(kind, error.to_string())
    }
}
