//! Project configuration file.
//!
//! A TOML file with four keys: `projects` (directories analyzed with full
//! error reporting), `deps` (directories analyzed without), `output_dir`,
//! and `python_version`. Relative paths are resolved against the config
//! file's own directory.

use std::fmt;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::utils::expand_paths_from;

pub const DEFAULT_PYTHON_VERSION: &str = "3.6";
pub const DEFAULT_OUTPUT_DIR: &str = "pyimports_output";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Invalid(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Keys accepted in the config file; everything optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    projects: Option<Vec<String>>,
    deps: Option<Vec<String>>,
    output_dir: Option<String>,
    python_version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Files under these directories get full error reporting downstream.
    pub projects: Vec<String>,
    /// Dependencies: analyzed, but not reported on.
    pub deps: Vec<String>,
    pub output_dir: String,
    pub python_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            projects: Vec::new(),
            deps: Vec::new(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let raw: RawConfig = toml::from_str(&content).map_err(|e| {
            ConfigError::Invalid(format!(
                "Invalid config file {}: {e}\n\
                 Valid options are: projects, deps, output_dir, python_version\n\
                 To generate a complete sample config file, run:\n  \
                 pyimports --generate-config sample.toml",
                path.display()
            ))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let output_dir = raw.output_dir.unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
        Ok(Config {
            projects: expand_paths_from(&raw.projects.unwrap_or_default(), base),
            deps: expand_paths_from(&raw.deps.unwrap_or_default(), base),
            output_dir: expand_paths_from(&[output_dir], base).remove(0),
            python_version: raw
                .python_version
                .unwrap_or_else(|| DEFAULT_PYTHON_VERSION.to_string()),
        })
    }

    /// The search path implied by the config: projects first, then deps.
    pub fn make_pythonpath(&self) -> Vec<String> {
        self.projects.iter().chain(&self.deps).cloned().collect()
    }
}

pub const SAMPLE_CONFIG: &str = r#"# NOTE: All relative paths are relative to the location of this file.

# Python version ('major.minor')
python_version = "3.6"

# Dependencies within these directories will be checked for type errors.
projects = [
  # "/path/to/project",
]

# Dependencies within these directories will have type inference
# run on them, but will not be checked for errors.
deps = [
  # "/path/to/project",
]

# All output goes here.
output_dir = "pyimports_output"
"#;

/// Writes a commented sample config, refusing to clobber an existing file.
pub fn generate_default(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::Invalid(format!(
            "Not overwriting existing file: {}",
            path.display()
        )));
    }
    std::fs::write(path, SAMPLE_CONFIG)?;
    Ok(())
}
