// pdf2htmlEX converter adapter
// Runs pdf2htmlEX against a job directory under a hard deadline
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use pdf2html_core::domain::{ConversionOutcome, FailureKind, Job, OUTPUT_FILENAME};
use pdf2html_core::port::{PdfConverter, TimeProvider};

const DEFAULT_BINARY: &str = "pdf2htmlEX";
const DEFAULT_ZOOM: &str = "1.3";

/// Converter invocation settings
#[derive(Debug, Clone)]
pub struct ConverterSettings {
    /// Executable name or path
    pub binary: PathBuf,
    /// Value passed to `--zoom`
    pub zoom: String,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            zoom: DEFAULT_ZOOM.to_string(),
        }
    }
}

/// Captured output of a finished converter process
struct ProcessOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Runs `pdf2htmlEX` as a child process against a job directory
pub struct Pdf2HtmlExConverter {
    settings: ConverterSettings,
    time_provider: Arc<dyn TimeProvider>,
}

impl Pdf2HtmlExConverter {
    /// Create a new converter adapter
    ///
    /// # Arguments
    /// * `settings` - Binary and zoom factor
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let converter = Pdf2HtmlExConverter::new(
    ///     ConverterSettings::default(),
    ///     Arc::new(SystemTimeProvider),
    /// );
    /// ```
    pub fn new(settings: ConverterSettings, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            settings,
            time_provider,
        }
    }

    /// Fixed argument vector:
    /// `--zoom <z> --dest-dir <dir> --process-outline 0 <input.pdf> output.html`
    fn build_args(&self, job: &Job) -> Vec<OsString> {
        vec![
            "--zoom".into(),
            self.settings.zoom.clone().into(),
            "--dest-dir".into(),
            job.dir.clone().into_os_string(),
            "--process-outline".into(),
            "0".into(),
            job.input_path().into_os_string(),
            OUTPUT_FILENAME.into(),
        ]
    }

    /// Spawn the converter and wait for it, killing it at the deadline
    async fn spawn_and_wait(
        &self,
        job: &Job,
        deadline: Duration,
    ) -> Result<ProcessOutput, ConversionOutcome> {
        let mut child = Command::new(&self.settings.binary)
            .args(self.build_args(job))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ConversionOutcome::failure(
                    FailureKind::IoError,
                    format!(
                        "Failed to start {}: {}",
                        self.settings.binary.display(),
                        e
                    ),
                )
            })?;

        // Drain both pipes concurrently so a chatty converter cannot block on a full pipe
        let mut stdout_task = tokio::spawn(read_pipe(child.stdout.take()));
        let mut stderr_task = tokio::spawn(read_pipe(child.stderr.take()));

        // Exit and pipe EOF share one deadline: a helper that inherited the
        // pipes must not keep the request open after the converter exits
        let finished = timeout(deadline, async {
            let status = child.wait().await;
            let stdout = (&mut stdout_task).await.unwrap_or_default();
            let stderr = (&mut stderr_task).await.unwrap_or_default();
            (status, stdout, stderr)
        })
        .await;

        let (status, stdout, stderr) = match finished {
            Ok((Ok(status), stdout, stderr)) => (status, stdout, stderr),
            Ok((Err(e), _, _)) => {
                stdout_task.abort();
                stderr_task.abort();
                return Err(ConversionOutcome::failure(
                    FailureKind::IoError,
                    format!("Failed to wait for converter: {}", e),
                ));
            }
            Err(_) => {
                warn!(
                    job_id = %job.id,
                    pid = ?child.id(),
                    deadline_secs = deadline.as_secs(),
                    "Converter exceeded deadline, killing"
                );
                if let Ok(None) = child.try_wait() {
                    if let Err(e) = child.kill().await {
                        warn!(job_id = %job.id, error = %e, "Failed to kill converter");
                    }
                }
                stdout_task.abort();
                stderr_task.abort();
                return Err(ConversionOutcome::failure(
                    FailureKind::Timeout,
                    format!("Converter killed after {}ms", deadline.as_millis()),
                ));
            }
        };

        Ok(ProcessOutput {
            status,
            stdout,
            stderr,
        })
    }

    /// Turn a finished process into an outcome
    async fn classify(&self, job: &Job, output: ProcessOutput) -> ConversionOutcome {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        debug!(
            job_id = %job.id,
            stdout = %stdout,
            stderr = %stderr,
            "Converter output"
        );

        if !output.status.success() {
            let detail = if !stderr.trim().is_empty() {
                stderr.into_owned()
            } else if !stdout.trim().is_empty() {
                stdout.into_owned()
            } else {
                format!("Converter exited with {}", output.status)
            };
            return ConversionOutcome::failure(FailureKind::ProcessError, detail);
        }

        let output_path = job.output_path();
        match tokio::fs::try_exists(&output_path).await {
            Ok(true) => {}
            Ok(false) => {
                return ConversionOutcome::failure(
                    FailureKind::MissingOutput,
                    format!("{} was not produced", OUTPUT_FILENAME),
                )
            }
            Err(e) => {
                return ConversionOutcome::failure(
                    FailureKind::IoError,
                    format!("Failed to stat output: {}", e),
                )
            }
        }

        let bytes = match tokio::fs::read(&output_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return ConversionOutcome::failure(
                    FailureKind::IoError,
                    format!("Failed to read output: {}", e),
                )
            }
        };

        match String::from_utf8(bytes) {
            Ok(html) => ConversionOutcome::Success(html),
            Err(e) => ConversionOutcome::failure(
                FailureKind::IoError,
                format!("Converter output is not valid UTF-8: {}", e),
            ),
        }
    }
}

async fn read_pipe<R>(pipe: Option<R>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            debug!(error = %e, "Failed to read converter pipe");
        }
    }
    buf
}

#[async_trait]
impl PdfConverter for Pdf2HtmlExConverter {
    async fn convert(&self, job: &Job, pdf: &[u8], deadline: Duration) -> ConversionOutcome {
        if let Err(e) = tokio::fs::write(job.input_path(), pdf).await {
            return ConversionOutcome::failure(
                FailureKind::IoError,
                format!("Failed to save uploaded PDF: {}", e),
            );
        }

        let start_time = self.time_provider.now_millis();

        info!(
            job_id = %job.id,
            binary = %self.settings.binary.display(),
            zoom = %self.settings.zoom,
            deadline_ms = deadline.as_millis() as u64,
            "Starting converter"
        );

        let outcome = match self.spawn_and_wait(job, deadline).await {
            Ok(output) => self.classify(job, output).await,
            Err(outcome) => outcome,
        };

        let duration_ms = self.time_provider.now_millis() - start_time;

        info!(
            job_id = %job.id,
            duration_ms = %duration_ms,
            outcome = %outcome.label(),
            "Converter finished"
        );

        outcome
    }
}
