use fundscope_core::{ReportError, SourceError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Setup(#[from] SourceError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Report(ReportError::NoData { .. }) => 3,
            Self::Report(ReportError::Validation(_)) => 2,
            Self::Report(ReportError::Provider(_)) => 4,
            Self::Setup(_) => 4,
            Self::Serialization(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
