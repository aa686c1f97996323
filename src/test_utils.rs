//! Test helpers: scratch source trees on disk.

use tempfile::TempDir;

use crate::fs::{FsRef, OsFileSystem};
use std::sync::Arc;

/// A temporary directory of Python sources, addressed by relative path.
pub struct SourceTree {
    dir: TempDir,
}

impl SourceTree {
    pub fn new() -> Self {
        SourceTree {
            dir: TempDir::new().expect("create tempdir"),
        }
    }

    /// Writes a file (creating parents) and returns its absolute path.
    pub fn create_file(&self, rel: &str, contents: &str) -> String {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write file");
        path.to_string_lossy().into_owned()
    }

    pub fn path(&self, rel: &str) -> String {
        self.dir.path().join(rel).to_string_lossy().into_owned()
    }

    /// An OS filesystem rooted at this tree.
    pub fn filesystem(&self) -> FsRef {
        Arc::new(OsFileSystem::new(self.dir.path()))
    }
}

impl Default for SourceTree {
    fn default() -> Self {
        Self::new()
    }
}
