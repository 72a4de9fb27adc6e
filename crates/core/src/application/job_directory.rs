// Job Directory Manager
// One freshly named directory per conversion, removed on every exit path.

use crate::domain::Job;
use crate::error::Result;
use crate::port::{IdProvider, JobFilesystem, TimeProvider};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Allocates job directories under a fixed root
pub struct JobDirectoryManager {
    root: PathBuf,
    fs: Arc<dyn JobFilesystem>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl JobDirectoryManager {
    /// Create a new manager
    ///
    /// # Arguments
    /// * `root` - Directory every job directory is created in
    /// * `fs` - Filesystem adapter
    /// * `id_provider` - Source of directory names (UUID v4 in production)
    /// * `time_provider` - Clock used to stamp jobs
    pub fn new(
        root: impl Into<PathBuf>,
        fs: Arc<dyn JobFilesystem>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            root: root.into(),
            fs,
            id_provider,
            time_provider,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory (startup)
    pub fn ensure_root(&self) -> Result<()> {
        self.fs.create_dir_all(&self.root)?;
        Ok(())
    }

    /// Create a new job directory
    ///
    /// # Errors
    /// - `AppError::Io` if the directory cannot be created
    pub fn allocate(&self) -> Result<JobLease> {
        let job = Job::new(
            self.id_provider.generate_id(),
            &self.root,
            self.time_provider.now_millis(),
        );

        self.fs.create_dir_all(&job.dir)?;
        debug!(job_id = %job.id, dir = %job.dir.display(), "Job directory allocated");

        Ok(JobLease {
            job,
            fs: Arc::clone(&self.fs),
            released: false,
        })
    }
}

/// Scoped ownership of one job directory
///
/// The directory is removed by [`JobLease::release`] or, failing that, when the
/// lease is dropped (early return, error, cancelled future, unwinding panic).
/// Removal is best-effort; anything missed is left to the retention sweeper.
pub struct JobLease {
    job: Job,
    fs: Arc<dyn JobFilesystem>,
    released: bool,
}

impl JobLease {
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Remove the directory now
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match self.fs.remove_dir_all(&self.job.dir) {
            Ok(()) => {
                debug!(job_id = %self.job.id, "Job directory removed");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(job_id = %self.job.id, "Job directory already gone");
            }
            Err(e) => {
                warn!(
                    job_id = %self.job.id,
                    dir = %self.job.dir.display(),
                    error = %e,
                    "Failed to remove job directory (left for sweeper)"
                );
            }
        }
    }
}

impl Drop for JobLease {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::filesystem::mocks::InMemoryFilesystem;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::time_provider::mocks::MockTimeProvider;

    fn manager() -> (JobDirectoryManager, Arc<InMemoryFilesystem>) {
        let clock = Arc::new(MockTimeProvider::new(5_000));
        let fs = Arc::new(InMemoryFilesystem::new(clock.clone()));
        let manager = JobDirectoryManager::new(
            "/work",
            fs.clone(),
            Arc::new(SequentialIdProvider::new("job")),
            clock,
        );
        manager.ensure_root().unwrap();
        (manager, fs)
    }

    #[test]
    fn test_allocate_creates_unique_directories() {
        let (manager, fs) = manager();

        let a = manager.allocate().unwrap();
        let b = manager.allocate().unwrap();

        assert_eq!(a.job().dir, PathBuf::from("/work/job-1"));
        assert_eq!(b.job().dir, PathBuf::from("/work/job-2"));
        assert_eq!(a.job().created_at, 5_000);
        assert!(fs.exists(&a.job().dir));
        assert!(fs.exists(&b.job().dir));
    }

    #[test]
    fn test_release_removes_directory() {
        let (manager, fs) = manager();
        let lease = manager.allocate().unwrap();
        let dir = lease.job().dir.clone();

        lease.release();

        assert!(!fs.exists(&dir));
        assert_eq!(fs.removals(), vec![dir]);
    }

    #[test]
    fn test_drop_removes_directory() {
        let (manager, fs) = manager();
        let dir = {
            let lease = manager.allocate().unwrap();
            lease.job().dir.clone()
        };

        assert!(!fs.exists(&dir));
    }

    #[test]
    fn test_release_is_not_repeated_on_drop() {
        let (manager, fs) = manager();
        let lease = manager.allocate().unwrap();

        lease.release();

        assert_eq!(fs.removals().len(), 1);
    }

    #[test]
    fn test_removal_failure_is_swallowed() {
        let (manager, fs) = manager();
        let lease = manager.allocate().unwrap();
        let dir = lease.job().dir.clone();
        fs.fail_removal(dir.clone());

        lease.release();

        assert!(fs.exists(&dir));
    }

    #[test]
    fn test_panic_still_removes_directory() {
        let (manager, fs) = manager();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _lease = manager.allocate().unwrap();
            panic!("converter blew up");
        }));

        assert!(result.is_err());
        assert!(!fs.exists(Path::new("/work/job-1")));
        assert!(fs.exists(Path::new("/work")));
    }
}
