// PDF Converter Port
// Abstraction over the external PDF-to-HTML tool

use crate::domain::{ConversionOutcome, Job};
use async_trait::async_trait;
use std::time::Duration;

/// PDF converter trait
///
/// Implementations:
/// - Pdf2HtmlExConverter: runs `pdf2htmlEX` as a child process
///
/// Implementations never clean up the job directory; its lifetime belongs to
/// the lease that allocated it.
#[async_trait]
pub trait PdfConverter: Send + Sync {
    /// Persist `pdf` into the job directory, run the converter, and classify the result
    ///
    /// # Arguments
    /// * `job` - Job whose directory receives input and output
    /// * `pdf` - Raw uploaded bytes
    /// * `deadline` - Hard wall-clock limit; the process is killed when exceeded
    async fn convert(&self, job: &Job, pdf: &[u8], deadline: Duration) -> ConversionOutcome;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::FailureKind;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Mock converter behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Return this HTML
        Success(String),
        /// Fail with this kind and detail
        Fail(FailureKind, String),
        /// Panic with message (for cleanup-on-unwind testing)
        Panic(String),
    }

    /// Mock PDF converter for testing
    pub struct MockPdfConverter {
        behavior: Arc<Mutex<MockBehavior>>,
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl MockPdfConverter {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success(html: impl Into<String>) -> Self {
            Self::new(MockBehavior::Success(html.into()))
        }

        pub fn new_fail(kind: FailureKind, detail: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(kind, detail.into()))
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Job directories seen by `convert`, in call order
        pub fn job_dirs(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PdfConverter for MockPdfConverter {
        async fn convert(&self, job: &Job, _pdf: &[u8], _deadline: Duration) -> ConversionOutcome {
            self.calls.lock().unwrap().push(job.dir.clone());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Success(html) => ConversionOutcome::Success(html),
                MockBehavior::Fail(kind, detail) => ConversionOutcome::failure(kind, detail),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg);
                }
            }
        }
    }
}
