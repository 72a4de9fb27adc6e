// Conversion Outcome
// Never persisted; consumed once by the request handler.

use std::fmt;

/// Classification of a failed conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Converter exited with a non-zero status
    ProcessError,
    /// Converter exited zero but produced no output file
    MissingOutput,
    /// Converter exceeded its deadline and was killed
    Timeout,
    /// Filesystem or process plumbing failed
    IoError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ProcessError => write!(f, "PROCESS_ERROR"),
            FailureKind::MissingOutput => write!(f, "MISSING_OUTPUT"),
            FailureKind::Timeout => write!(f, "TIMEOUT"),
            FailureKind::IoError => write!(f, "IO_ERROR"),
        }
    }
}

/// Failure detail attached to a [`ConversionOutcome::Failure`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl ConversionFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Result of running the external converter once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Success(String),
    Failure(ConversionFailure),
}

impl ConversionOutcome {
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        ConversionOutcome::Failure(ConversionFailure::new(kind, detail))
    }

    /// Kind label for logging (`SUCCESS` or the failure kind)
    pub fn label(&self) -> String {
        match self {
            ConversionOutcome::Success(_) => "SUCCESS".to_string(),
            ConversionOutcome::Failure(f) => f.kind.to_string(),
        }
    }
}
