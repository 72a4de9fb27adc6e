// Local filesystem adapter for JobFilesystem
use pdf2html_core::port::{EntryMeta, JobFilesystem};
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// JobFilesystem backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

fn to_epoch_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}

impl JobFilesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn list_entries(&self, root: &Path) -> io::Result<Vec<EntryMeta>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(root)? {
            let entry = entry?;
            // Entries can vanish between readdir and stat (a request finishing)
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    debug!(path = %entry.path().display(), error = %e, "Skipping entry");
                    continue;
                }
            };

            let modified_millis = meta.modified().map(to_epoch_millis).unwrap_or(i64::MAX);

            entries.push(EntryMeta {
                path: entry.path(),
                is_dir: meta.is_dir(),
                modified_millis,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_list_remove() {
        let tmp = TempDir::new().unwrap();
        let fs_adapter = LocalFilesystem::new();
        let job_dir = tmp.path().join("work").join("job-1");

        fs_adapter.create_dir_all(&job_dir).unwrap();
        std::fs::write(job_dir.join("input.pdf"), b"%PDF").unwrap();
        std::fs::write(tmp.path().join("work").join("note.txt"), b"x").unwrap();

        let mut entries = fs_adapter.list_entries(&tmp.path().join("work")).unwrap();
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, job_dir);
        assert!(entries[0].is_dir);
        assert!(!entries[1].is_dir);

        let now = to_epoch_millis(SystemTime::now());
        assert!((now - entries[0].modified_millis).abs() < 60_000);

        fs_adapter.remove_dir_all(&job_dir).unwrap();
        assert!(!job_dir.exists());
    }

    #[test]
    fn test_list_missing_root_errors() {
        let tmp = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .list_entries(&tmp.path().join("missing"))
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .remove_dir_all(&tmp.path().join("gone"))
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
