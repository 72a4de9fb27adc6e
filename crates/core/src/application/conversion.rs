// Conversion Service
// allocate job -> run converter -> release job -> optionally sanitize

use crate::application::job_directory::JobDirectoryManager;
use crate::domain::{sanitize, ConversionOutcome, PdfUpload};
use crate::error::{AppError, Result};
use crate::port::PdfConverter;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Whether converter output is passed through the sanitizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeMode {
    /// Strip images, head, spans, attributes, comments and links
    Clean,
    /// Return the converter's HTML untouched
    Full,
}

impl fmt::Display for SanitizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizeMode::Clean => write!(f, "CLEAN"),
            SanitizeMode::Full => write!(f, "FULL"),
        }
    }
}

/// Finished document handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedDocument {
    pub filename: String,
    pub html: String,
}

/// Runs one PDF through the external converter inside a scoped job directory
pub struct ConversionService {
    jobs: Arc<JobDirectoryManager>,
    converter: Arc<dyn PdfConverter>,
    timeout: Duration,
}

impl ConversionService {
    /// Create a new conversion service
    ///
    /// # Arguments
    /// * `jobs` - Job directory manager
    /// * `converter` - External converter adapter
    /// * `timeout` - Deadline handed to every converter run
    pub fn new(
        jobs: Arc<JobDirectoryManager>,
        converter: Arc<dyn PdfConverter>,
        timeout: Duration,
    ) -> Self {
        Self {
            jobs,
            converter,
            timeout,
        }
    }

    /// Convert an uploaded PDF
    ///
    /// The job directory is gone by the time this returns, whatever the outcome.
    ///
    /// # Errors
    /// - `AppError::Timeout` if the converter ran past the deadline
    /// - `AppError::ConversionFailed` if the converter exited non-zero
    /// - `AppError::OutputMissing` if no HTML was produced
    /// - `AppError::Io` on filesystem or process plumbing failures
    pub async fn convert(&self, upload: &PdfUpload, mode: SanitizeMode) -> Result<ConvertedDocument> {
        let lease = self.jobs.allocate()?;
        let job_id = lease.job().id.clone();

        info!(
            job_id = %job_id,
            filename = %upload.filename(),
            size_bytes = upload.bytes().len(),
            mode = %mode,
            "Conversion started"
        );

        let outcome = self
            .converter
            .convert(lease.job(), upload.bytes(), self.timeout)
            .await;

        // HTML is in memory now; the directory is no longer needed
        lease.release();

        let label = outcome.label();
        let html = match outcome {
            ConversionOutcome::Success(html) => html,
            ConversionOutcome::Failure(failure) => {
                warn!(
                    job_id = %job_id,
                    kind = %failure.kind,
                    detail = %failure.detail,
                    "Conversion failed"
                );
                return Err(AppError::from_conversion(failure, self.timeout));
            }
        };

        let html = match mode {
            SanitizeMode::Full => html,
            SanitizeMode::Clean => tokio::task::spawn_blocking(move || sanitize(&html))
                .await
                .map_err(|e| AppError::Internal(format!("Sanitizer task failed: {}", e)))?,
        };

        info!(
            job_id = %job_id,
            outcome = %label,
            html_bytes = html.len(),
            "Conversion completed"
        );

        Ok(ConvertedDocument {
            filename: upload.output_filename(),
            html,
        })
    }
}
