// Job Filesystem Port
// Synchronous on purpose: release runs from Drop, where nothing can be awaited.

use std::io;
use std::path::{Path, PathBuf};

/// One immediate child of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    pub path: PathBuf,
    pub is_dir: bool,
    pub modified_millis: i64, // epoch ms
}

/// Filesystem operations the job lifecycle and the sweeper rely on
pub trait JobFilesystem: Send + Sync {
    /// Create a directory and any missing parents
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Recursively remove a directory
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// List the immediate children of `root` with their modification times
    fn list_entries(&self, root: &Path) -> io::Result<Vec<EntryMeta>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::port::TimeProvider;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy)]
    struct Node {
        is_dir: bool,
        modified_millis: i64,
    }

    /// In-memory filesystem; new directories take their mtime from the injected clock
    pub struct InMemoryFilesystem {
        clock: Arc<dyn TimeProvider>,
        nodes: Mutex<HashMap<PathBuf, Node>>,
        failing: Mutex<HashSet<PathBuf>>,
        removals: Mutex<Vec<PathBuf>>,
    }

    impl InMemoryFilesystem {
        pub fn new(clock: Arc<dyn TimeProvider>) -> Self {
            Self {
                clock,
                nodes: Mutex::new(HashMap::new()),
                failing: Mutex::new(HashSet::new()),
                removals: Mutex::new(Vec::new()),
            }
        }

        /// Insert a directory with an explicit mtime
        pub fn insert_dir(&self, path: impl Into<PathBuf>, modified_millis: i64) {
            self.nodes.lock().unwrap().insert(
                path.into(),
                Node {
                    is_dir: true,
                    modified_millis,
                },
            );
        }

        /// Insert a regular file with an explicit mtime
        pub fn insert_file(&self, path: impl Into<PathBuf>, modified_millis: i64) {
            self.nodes.lock().unwrap().insert(
                path.into(),
                Node {
                    is_dir: false,
                    modified_millis,
                },
            );
        }

        /// Make every later removal of `path` fail with PermissionDenied
        pub fn fail_removal(&self, path: impl Into<PathBuf>) {
            self.failing.lock().unwrap().insert(path.into());
        }

        /// Whether a file or directory is recorded at `path`
        pub fn exists(&self, path: &Path) -> bool {
            self.nodes.lock().unwrap().contains_key(path)
        }

        /// Paths successfully removed, in order
        pub fn removals(&self) -> Vec<PathBuf> {
            self.removals.lock().unwrap().clone()
        }
    }

    impl JobFilesystem for InMemoryFilesystem {
        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            let now = self.clock.now_millis();
            let mut nodes = self.nodes.lock().unwrap();
            for ancestor in path.ancestors() {
                if ancestor.as_os_str().is_empty() || nodes.contains_key(ancestor) {
                    continue;
                }
                nodes.insert(
                    ancestor.to_path_buf(),
                    Node {
                        is_dir: true,
                        modified_millis: now,
                    },
                );
            }
            Ok(())
        }

        fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            if self.failing.lock().unwrap().contains(path) {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("refusing to remove {}", path.display()),
                ));
            }

            let mut nodes = self.nodes.lock().unwrap();
            if !nodes.contains_key(path) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                ));
            }
            nodes.retain(|p, _| !p.starts_with(path));
            self.removals.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        fn list_entries(&self, root: &Path) -> io::Result<Vec<EntryMeta>> {
            let nodes = self.nodes.lock().unwrap();
            if !nodes.contains_key(root) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", root.display()),
                ));
            }

            let mut entries: Vec<EntryMeta> = nodes
                .iter()
                .filter(|(p, _)| p.parent() == Some(root))
                .map(|(p, node)| EntryMeta {
                    path: p.clone(),
                    is_dir: node.is_dir,
                    modified_millis: node.modified_millis,
                })
                .collect();
            entries.sort_by(|a, b| a.path.cmp(&b.path));
            Ok(entries)
        }
    }
}
