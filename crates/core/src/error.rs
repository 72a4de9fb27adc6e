// Central Error Type for the Application

use crate::domain::{ConversionFailure, FailureKind};
use std::time::Duration;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("{0}")]
    Validation(String),

    #[error("Conversion timeout after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Conversion failed")]
    ConversionFailed { details: String },

    #[error("Output file not generated")]
    OutputMissing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Translate a converter failure into the error surfaced to callers
    pub fn from_conversion(failure: ConversionFailure, deadline: Duration) -> Self {
        match failure.kind {
            FailureKind::Timeout => AppError::Timeout(deadline),
            FailureKind::ProcessError => AppError::ConversionFailed {
                details: failure.detail,
            },
            FailureKind::MissingOutput => AppError::OutputMissing,
            FailureKind::IoError => AppError::Io(std::io::Error::other(failure.detail)),
        }
    }

    /// True for caller mistakes (bad upload) as opposed to server-side failures
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Domain(_) | AppError::Validation(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
