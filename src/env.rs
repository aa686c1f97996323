//! The analysis environment: ordered search path plus Python version.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::fs::{ExtensionRemappingFileSystem, FsRef, OsFileSystem, TarFileSystem};
use crate::utils::expand_path;

/// Fatal startup problem: the operator pointed the tool at something that
/// does not exist. Printed with guidance and exits nonzero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentError {
    pub message: String,
}

impl EnvironmentError {
    pub fn new(message: impl Into<String>) -> Self {
        EnvironmentError {
            message: message.into(),
        }
    }
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EnvironmentError {}

/// Parses a `major.minor` version string.
pub fn parse_version(version: &str) -> Result<(u32, u32), EnvironmentError> {
    let parts: Vec<&str> = version.split('.').collect();
    if let [major, minor] = parts.as_slice()
        && let (Ok(major), Ok(minor)) = (major.parse(), minor.parse())
    {
        return Ok((major, minor));
    }
    Err(EnvironmentError::new(format!(
        "Invalid python version: {version} (expected MAJOR.MINOR, e.g. 3.6)"
    )))
}

/// Typeshed stdlib subdirectories that apply to `version`, most specific
/// lineage first.
pub fn typeshed_subdirs(version: (u32, u32)) -> Vec<String> {
    let (major, minor) = version;
    let mut subdirs = vec![format!("stdlib/{major}"), "stdlib/2and3".to_string()];
    if major == 3 {
        for i in 0..=minor {
            subdirs.push(format!("stdlib/3.{i}"));
        }
    }
    subdirs
}

/// Resolves the stub directory: an explicit argument wins, otherwise the
/// `TYPESHED_HOME` environment variable.
pub fn typeshed_location(arg: Option<&str>) -> Option<String> {
    arg.map(str::to_string)
        .or_else(|| std::env::var("TYPESHED_HOME").ok())
}

/// Ordered search path and language version, as consumed by the resolver.
#[derive(Debug)]
pub struct Environment {
    pub path: Vec<FsRef>,
    pub python_version: (u32, u32),
    pub typeshed_location: Option<String>,
}

impl Environment {
    /// Builds the search path from `pythonpath` entries (directories, or
    /// plain `.tar` archives) and layers `.pyi` stub filesystems for the
    /// typeshed, when one is configured.
    pub fn new(
        pythonpath: &[String],
        typeshed: Option<&str>,
        python_version: (u32, u32),
    ) -> Result<Self, EnvironmentError> {
        let mut path: Vec<FsRef> = Vec::new();
        for entry in pythonpath {
            let entry = expand_path(entry);
            if entry.ends_with(".tar") && Path::new(&entry).is_file() {
                let fs = TarFileSystem::from_archive(Path::new(&entry)).map_err(|e| {
                    EnvironmentError::new(format!("Cannot read archive {entry}: {e}"))
                })?;
                path.push(Arc::new(fs));
            } else {
                path.push(Arc::new(OsFileSystem::new(entry.as_str())));
            }
        }
        let mut location = None;
        if let Some(typeshed) = typeshed {
            let typeshed = expand_path(typeshed);
            if !Path::new(&typeshed).join("stdlib").is_dir() {
                return Err(EnvironmentError::new(format!(
                    "Cannot find a valid typeshed installation in {typeshed}\n\
                     Point --typeshed or TYPESHED_HOME at a checkout of\n\
                     https://github.com/python/typeshed"
                )));
            }
            for subdir in typeshed_subdirs(python_version) {
                let dir = Path::new(&typeshed).join(subdir);
                path.push(Arc::new(ExtensionRemappingFileSystem::pyi(Box::new(
                    OsFileSystem::new(dir),
                ))));
            }
            location = Some(typeshed);
        }
        Ok(Environment {
            path,
            python_version,
            typeshed_location: location,
        })
    }

    /// An environment over an already-assembled search path.
    pub fn from_path(path: Vec<FsRef>, python_version: (u32, u32)) -> Self {
        Environment {
            path,
            python_version,
            typeshed_location: None,
        }
    }
}
