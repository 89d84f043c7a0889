use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] finlearn_core::ValidationError),

    #[error(transparent)]
    Config(#[from] finlearn_core::ConfigError),

    #[error(transparent)]
    Unavailable(#[from] finlearn_core::FetchError),

    #[error("{failed} of {total} chart(s) could not be rendered")]
    PartialFailure { failed: usize, total: usize },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Unavailable(_) => 3,
            Self::PartialFailure { .. } => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
