// Job Domain Model
// A job is fully represented by its working directory on disk; nothing is registered in memory.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Job ID (UUID v4)
pub type JobId = String;

/// Fixed filename the uploaded PDF is persisted under inside a job directory
pub const INPUT_FILENAME: &str = "input.pdf";

/// Fixed filename the converter is asked to produce inside a job directory
pub const OUTPUT_FILENAME: &str = "output.html";

/// Job Entity
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub dir: PathBuf,
    pub created_at: i64, // epoch ms
}

impl Job {
    /// Create a job rooted at `root/<id>`
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `root` - Working-directory root shared by all jobs
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    pub fn new(id: impl Into<String>, root: &Path, created_at: i64) -> Self {
        let id = id.into();
        let dir = root.join(&id);
        Self {
            id,
            dir,
            created_at,
        }
    }

    /// Where the uploaded PDF lives
    pub fn input_path(&self) -> PathBuf {
        self.dir.join(INPUT_FILENAME)
    }

    /// Where the converter writes its HTML
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILENAME)
    }
}
