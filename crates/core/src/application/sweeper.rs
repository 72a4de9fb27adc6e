// Retention Sweeper
// Safety net for job directories that escaped normal cleanup (e.g. a crash mid-request).
// Works purely from filesystem age; it never looks at in-flight requests.

use crate::application::constants::{DEFAULT_RETENTION, DEFAULT_SWEEP_INTERVAL};
use crate::application::shutdown::ShutdownToken;
use crate::port::{JobFilesystem, TimeProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Sweeper configuration
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Directories older than this are deleted
    pub retention: Duration,

    /// Pause between scans
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// What one scan did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Periodically deletes stale job directories under the work root
pub struct RetentionSweeper {
    fs: Arc<dyn JobFilesystem>,
    time_provider: Arc<dyn TimeProvider>,
    root: PathBuf,
    config: SweeperConfig,
}

impl RetentionSweeper {
    pub fn new(
        fs: Arc<dyn JobFilesystem>,
        time_provider: Arc<dyn TimeProvider>,
        root: impl Into<PathBuf>,
        config: SweeperConfig,
    ) -> Self {
        Self {
            fs,
            time_provider,
            root: root.into(),
            config,
        }
    }

    /// Scan the root once and delete every directory past retention
    ///
    /// Never fails: listing and deletion errors are logged and counted.
    pub fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();

        let entries = match self.fs.list_entries(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                error!(root = %self.root.display(), error = %e, "Sweep failed to list work root");
                return report;
            }
        };

        let retention_ms = self.config.retention.as_millis() as i64;
        let cutoff = self.time_provider.now_millis() - retention_ms;

        for entry in entries.into_iter().filter(|e| e.is_dir) {
            report.scanned += 1;

            if entry.modified_millis >= cutoff {
                continue;
            }

            match self.fs.remove_dir_all(&entry.path) {
                Ok(()) => {
                    report.removed += 1;
                    info!(dir = %entry.path.display(), "Cleaned up stale job directory");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(dir = %entry.path.display(), error = %e, "Failed to remove stale job directory");
                }
            }
        }

        report
    }

    /// Run sweep loop (background task)
    ///
    /// Sweeps immediately, then once per interval, until shutdown is signalled.
    /// Should be spawned in tokio::spawn
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            root = %self.root.display(),
            retention_secs = self.config.retention.as_secs(),
            interval_secs = self.config.interval.as_secs(),
            "Retention sweeper started"
        );

        loop {
            if shutdown.is_shutdown() {
                break;
            }

            let report = self.sweep_once();
            debug!(
                scanned = report.scanned,
                removed = report.removed,
                failed = report.failed,
                "Sweep completed"
            );

            tokio::select! {
                _ = sleep(self.config.interval) => {}
                _ = shutdown.wait() => break,
            }
        }

        info!("Retention sweeper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::shutdown::shutdown_channel;
    use crate::port::filesystem::mocks::InMemoryFilesystem;
    use crate::port::time_provider::mocks::MockTimeProvider;
    use std::path::Path;

    const NOW: i64 = 100_000_000;
    const HOUR_MS: i64 = 3_600_000;

    fn setup() -> (RetentionSweeper, Arc<InMemoryFilesystem>, Arc<MockTimeProvider>) {
        let clock = Arc::new(MockTimeProvider::new(NOW));
        let fs = Arc::new(InMemoryFilesystem::new(clock.clone()));
        fs.insert_dir("/work", 0);
        let sweeper = RetentionSweeper::new(
            fs.clone(),
            clock.clone(),
            "/work",
            SweeperConfig::default(),
        );
        (sweeper, fs, clock)
    }

    #[test]
    fn test_removes_only_stale_directories() {
        let (sweeper, fs, _) = setup();
        fs.insert_dir("/work/stale", NOW - HOUR_MS - 1);
        fs.insert_dir("/work/stale/nested", NOW - HOUR_MS - 1);
        fs.insert_dir("/work/fresh", NOW - 60_000);
        fs.insert_dir("/work/boundary", NOW - HOUR_MS);

        let report = sweeper.sweep_once();

        assert_eq!(
            report,
            SweepReport {
                scanned: 3,
                removed: 1,
                failed: 0
            }
        );
        assert!(!fs.exists(Path::new("/work/stale")));
        assert!(!fs.exists(Path::new("/work/stale/nested")));
        assert!(fs.exists(Path::new("/work/fresh")));
        assert!(fs.exists(Path::new("/work/boundary")));
    }

    #[test]
    fn test_ignores_plain_files() {
        let (sweeper, fs, _) = setup();
        fs.insert_file("/work/stray.txt", 0);

        let report = sweeper.sweep_once();

        assert_eq!(report.scanned, 0);
        assert!(fs.exists(Path::new("/work/stray.txt")));
    }

    #[test]
    fn test_removal_failures_are_counted_not_fatal() {
        let (sweeper, fs, _) = setup();
        fs.insert_dir("/work/locked", 0);
        fs.insert_dir("/work/old", 0);
        fs.fail_removal("/work/locked");

        let report = sweeper.sweep_once();

        assert_eq!(report.removed, 1);
        assert_eq!(report.failed, 1);
        assert!(fs.exists(Path::new("/work/locked")));
        assert!(!fs.exists(Path::new("/work/old")));
    }

    #[test]
    fn test_missing_root_yields_empty_report() {
        let clock = Arc::new(MockTimeProvider::new(NOW));
        let fs = Arc::new(InMemoryFilesystem::new(clock.clone()));
        let sweeper = RetentionSweeper::new(fs, clock, "/nowhere", SweeperConfig::default());

        assert_eq!(sweeper.sweep_once(), SweepReport::default());
    }

    #[test]
    fn test_directory_ages_into_removal() {
        let (sweeper, fs, clock) = setup();
        fs.insert_dir("/work/job", NOW - 60_000);

        assert_eq!(sweeper.sweep_once().removed, 0);

        clock.advance_millis(HOUR_MS);
        assert_eq!(sweeper.sweep_once().removed, 1);
        assert!(!fs.exists(Path::new("/work/job")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sweeps_every_interval_until_shutdown() {
        let (sweeper, fs, clock) = setup();
        fs.insert_dir("/work/old", NOW - 2 * HOUR_MS);
        fs.insert_dir("/work/young", NOW - 60_000);

        let (tx, token) = shutdown_channel();
        let handle = tokio::spawn(sweeper.run(token));

        // First sweep runs immediately
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!fs.exists(Path::new("/work/old")));
        assert!(fs.exists(Path::new("/work/young")));

        // Young directory crosses the threshold before the next cycle
        clock.advance_millis(HOUR_MS);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert!(!fs.exists(Path::new("/work/young")));

        tx.shutdown();
        handle.await.unwrap();
    }
}
