//! Layered filesystem abstractions probed by the import resolver.
//!
//! Each search-path entry implements the same four-operation capability:
//! existence checks and reads take paths relative to the entry's root, and
//! `refer_to` turns such a path into the stable identifier used as a graph
//! node key. Callers must treat that identifier as opaque.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::utils::{dirname, join};

/// Capability set shared by every search-path layer.
pub trait FileSystem: fmt::Debug {
    /// Is this a file?
    fn isfile(&self, path: &str) -> bool;

    /// Is this a directory?
    fn isdir(&self, path: &str) -> bool;

    /// Reads a file; missing paths are an error rather than a bool.
    fn read(&self, path: &str) -> io::Result<String>;

    /// Stable, globally meaningful identifier for the given path.
    fn refer_to(&self, path: &str) -> String;

    /// Strips this filesystem's root from an identifier previously produced
    /// by [`refer_to`](FileSystem::refer_to). Only OS-rooted filesystems can
    /// answer; everything else opts out.
    fn relative_path(&self, _path: &str) -> Option<String> {
        None
    }
}

/// Shared handle to a search-path layer.
pub type FsRef = std::sync::Arc<dyn FileSystem + Send + Sync>;

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}"))
}

/// In-memory filesystem over a fixed file map.
#[derive(Debug, Default)]
pub struct StoredFileSystem {
    files: HashMap<String, String>,
    dirs: BTreeSet<String>,
}

impl StoredFileSystem {
    pub fn new(files: HashMap<String, String>) -> Self {
        let mut dirs = BTreeSet::new();
        for f in files.keys() {
            let mut d = dirname(f);
            while !d.is_empty() {
                if !dirs.insert(d.clone()) {
                    break;
                }
                d = dirname(&d);
            }
        }
        StoredFileSystem { files, dirs }
    }
}

impl FileSystem for StoredFileSystem {
    fn isfile(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn isdir(&self, path: &str) -> bool {
        // The root "directory" only exists once something is nested in it.
        if path.is_empty() {
            return !self.dirs.is_empty();
        }
        self.dirs.contains(path)
    }

    fn read(&self, path: &str) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn refer_to(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Filesystem rooted at a directory of the host OS.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    root: PathBuf,
}

impl OsFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        OsFileSystem { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl FileSystem for OsFileSystem {
    fn isfile(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn isdir(&self, path: &str) -> bool {
        self.resolve(path).is_dir()
    }

    fn read(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }

    fn refer_to(&self, path: &str) -> String {
        self.resolve(path).to_string_lossy().into_owned()
    }

    fn relative_path(&self, path: &str) -> Option<String> {
        let root = self.root.to_string_lossy();
        let stripped = path.strip_prefix(&*root)?;
        let stripped = stripped.strip_prefix(std::path::MAIN_SEPARATOR)?;
        if stripped.is_empty() {
            None
        } else {
            Some(stripped.to_string())
        }
    }
}

/// Overlay that appends one suffix character to every request before
/// delegating, so a `.py`-shaped lookup is served from a `.pyi` entry.
/// `refer_to` reports the remapped underlying identifier: the same-looking
/// request through two different overlays yields distinct node keys.
#[derive(Debug)]
pub struct ExtensionRemappingFileSystem {
    underlying: Box<dyn FileSystem + Send + Sync>,
    suffix: char,
}

impl ExtensionRemappingFileSystem {
    pub fn new(underlying: Box<dyn FileSystem + Send + Sync>, suffix: char) -> Self {
        ExtensionRemappingFileSystem { underlying, suffix }
    }

    /// The typeshed overlay: `.py` requests resolve against `.pyi` stubs.
    pub fn pyi(underlying: Box<dyn FileSystem + Send + Sync>) -> Self {
        Self::new(underlying, 'i')
    }

    fn map(&self, path: &str) -> String {
        format!("{path}{}", self.suffix)
    }
}

impl FileSystem for ExtensionRemappingFileSystem {
    fn isfile(&self, path: &str) -> bool {
        self.underlying.isfile(&self.map(path))
    }

    fn isdir(&self, path: &str) -> bool {
        self.underlying.isdir(&self.map(path))
    }

    fn read(&self, path: &str) -> io::Result<String> {
        self.underlying.read(&self.map(path))
    }

    fn refer_to(&self, path: &str) -> String {
        self.underlying.refer_to(&self.map(path))
    }
}

/// Serves files out of an uncompressed tar archive.
///
/// Source tarballs usually nest everything under a single `pkg-x.y/` prefix,
/// so lookups are retried under each top-level directory of the archive.
#[derive(Debug)]
pub struct TarFileSystem {
    files: HashMap<String, String>,
    dirs: BTreeSet<String>,
    top_level: BTreeSet<String>,
}

impl TarFileSystem {
    /// Reads every regular entry of the archive into memory.
    pub fn from_archive(path: &Path) -> io::Result<Self> {
        let mut archive = tar::Archive::new(File::open(path)?);
        let mut files = HashMap::new();
        let mut dirs = BTreeSet::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            let name = entry.path()?.to_string_lossy().into_owned();
            let name = name.trim_end_matches('/').to_string();
            if entry.header().entry_type().is_file() {
                let mut contents = String::new();
                entry.read_to_string(&mut contents)?;
                let mut d = dirname(&name);
                while !d.is_empty() {
                    if !dirs.insert(d.clone()) {
                        break;
                    }
                    d = dirname(&d);
                }
                files.insert(name, contents);
            } else if entry.header().entry_type().is_dir() && !name.is_empty() {
                dirs.insert(name);
            }
        }
        let top_level = files
            .keys()
            .filter_map(|f| {
                let top = f.split(std::path::MAIN_SEPARATOR).next()?;
                (top != f.as_str()).then(|| top.to_string())
            })
            .collect();
        Ok(TarFileSystem {
            files,
            dirs,
            top_level,
        })
    }

    fn locate(&self, path: &str) -> Option<String> {
        self.top_level
            .iter()
            .map(|top| join(top, path))
            .find(|cand| self.files.contains_key(cand))
    }
}

impl FileSystem for TarFileSystem {
    fn isfile(&self, path: &str) -> bool {
        self.locate(path).is_some()
    }

    fn isdir(&self, path: &str) -> bool {
        self.top_level
            .iter()
            .any(|top| self.dirs.contains(&join(top, path)))
    }

    fn read(&self, path: &str) -> io::Result<String> {
        let key = self.locate(path).ok_or_else(|| not_found(path))?;
        Ok(self.files[&key].clone())
    }

    fn refer_to(&self, path: &str) -> String {
        format!("tar:{path}")
    }
}
