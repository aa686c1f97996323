//! pyimports - Import dependency graph analyzer for Python projects

// Allow some pedantic clippy lints that are acceptable in this codebase
#![allow(clippy::module_name_repetitions)] // types named after modules
#![allow(clippy::similar_names)] // similar variable names
#![allow(clippy::format_push_string)] // acceptable for simple string building
#![allow(clippy::return_self_not_must_use)] // builders don't need must_use
#![allow(clippy::case_sensitive_file_extension_comparisons)] // .py files are always lowercase

pub mod builtins;
pub mod config;
pub mod discovery;
pub mod env;
pub mod fs;
pub mod graph;
pub mod output;
pub mod parser;
pub mod resolve;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

// Re-export main types and functions for easy access
pub use config::{Config, ConfigError, generate_default};
pub use env::{Environment, EnvironmentError, parse_version, typeshed_location};
pub use fs::{
    ExtensionRemappingFileSystem, FileSystem, FsRef, OsFileSystem, StoredFileSystem, TarFileSystem,
};
pub use graph::{
    Cycle, DependencyGraph, DependencySource, FileDeps, ImportGraph, ImportSource, Node, NodeSet,
};
pub use output::{
    deps_json, find_root, format_node, format_topological_sort, format_tree, format_unresolved,
    formatted_deps_list, inspect_graph,
};
pub use parser::{ImportStatement, ParseError, get_imports, get_imports_from_source};
pub use resolve::{
    ImportNotFound, ResolvedFile, Resolver, convert_to_path, get_absolute_name, infer_module_name,
};
