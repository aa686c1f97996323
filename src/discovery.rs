//! File discovery for directory roots.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Finds all Python files under the given root directory, sorted for
/// deterministic graph construction. Respects .gitignore rules.
pub fn find_python_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(false) // Don't skip hidden files (let gitignore handle it)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| ext == "py")
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Expands each root: directories become their contained Python files,
/// plain files pass through untouched.
pub fn expand_source_files(roots: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for root in roots {
        let path = Path::new(root);
        if path.is_dir() {
            out.extend(
                find_python_files(path)
                    .into_iter()
                    .map(|p| p.to_string_lossy().into_owned()),
            );
        } else {
            out.push(root.clone());
        }
    }
    out
}
