use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
///
/// Failures of the retrieval itself are not `CliError`s; they are rendered as
/// a failure envelope on stdout.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickvault_core::ValidationError),

    #[error("invalid log filter '{directive}': {reason}")]
    LogFilter { directive: String, reason: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::LogFilter { .. } => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
