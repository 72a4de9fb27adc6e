// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod outcome;
pub mod sanitizer;
pub mod upload;

// Re-exports
pub use error::DomainError;
pub use job::{Job, JobId, INPUT_FILENAME, OUTPUT_FILENAME};
pub use outcome::{ConversionFailure, ConversionOutcome, FailureKind};
pub use sanitizer::sanitize;
pub use upload::{PdfUpload, UPLOAD_FIELD};
