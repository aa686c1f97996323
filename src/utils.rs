//! Path string helpers.
//!
//! Graph node keys and filesystem-relative lookups are plain strings, so the
//! usual `Path` methods are wrapped here in string-in, string-out form.

use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path};

/// Joins two path fragments, skipping empty parts.
pub fn join(a: &str, b: &str) -> String {
    if a.is_empty() {
        return b.to_string();
    }
    if b.is_empty() {
        return a.to_string();
    }
    if a.ends_with(MAIN_SEPARATOR) {
        return format!("{a}{b}");
    }
    format!("{a}{MAIN_SEPARATOR}{b}")
}

/// Everything up to the last separator; empty string for bare filenames.
pub fn dirname(path: &str) -> String {
    match path.rfind(MAIN_SEPARATOR) {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

/// The component after the last separator.
pub fn basename(path: &str) -> &str {
    match path.rfind(MAIN_SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Splits off a trailing extension: `foo/bar.py` -> (`foo/bar`, `.py`).
/// Dotfiles like `.bashrc` have no extension.
pub fn splitext(path: &str) -> (String, String) {
    let base = basename(path);
    match base.rfind('.') {
        Some(idx) if idx > 0 => {
            let cut = path.len() - (base.len() - idx);
            (path[..cut].to_string(), path[cut..].to_string())
        }
        _ => (path.to_string(), String::new()),
    }
}

/// Lexically removes `.` and `..` segments, like `os.path.normpath`.
pub fn normpath(path: &str) -> String {
    let rooted = path.starts_with(MAIN_SEPARATOR);
    let mut out: Vec<&str> = Vec::new();
    for seg in path.split(MAIN_SEPARATOR) {
        match seg {
            "" | "." => {}
            ".." => {
                if out.last().is_some_and(|s| *s != "..") {
                    out.pop();
                } else if !rooted {
                    out.push("..");
                }
            }
            seg => out.push(seg),
        }
    }
    let joined = out.join(MAIN_SEPARATOR_STR);
    match (rooted, joined.is_empty()) {
        (true, _) => format!("{MAIN_SEPARATOR}{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Absolute, normalized form of `path`, used as a graph node key.
/// Synthetic archive keys (`tar:...`) are already stable and pass through.
pub fn absolutize(path: &str) -> String {
    if path.starts_with("tar:") || path.starts_with(MAIN_SEPARATOR) {
        return normpath_keep_synthetic(path);
    }
    let cwd = std::env::current_dir().unwrap_or_default();
    normpath(&join(&cwd.to_string_lossy(), path))
}

fn normpath_keep_synthetic(path: &str) -> String {
    if path.starts_with("tar:") {
        path.to_string()
    } else {
        normpath(path)
    }
}

/// `~`-expanded, absolutized form of a user-supplied path.
pub fn expand_path(path: &str) -> String {
    let expanded = match path.strip_prefix("~") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => join(
                &home.to_string_lossy(),
                rest.trim_start_matches(MAIN_SEPARATOR),
            ),
            None => path.to_string(),
        },
        None => path.to_string(),
    };
    absolutize(&expanded)
}

/// Expands a list of user-supplied paths relative to `base`.
pub fn expand_paths_from(paths: &[String], base: &Path) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            if p.starts_with(MAIN_SEPARATOR) || p.starts_with('~') {
                expand_path(p)
            } else {
                normpath(&join(&base.to_string_lossy(), p))
            }
        })
        .collect()
}

/// `path` relative to `base`, walking up with `..` where needed.
/// An empty `base` leaves the path untouched.
pub fn relpath(path: &str, base: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    let path_segs: Vec<&str> = path.split(MAIN_SEPARATOR).filter(|s| !s.is_empty()).collect();
    let base_segs: Vec<&str> = base.split(MAIN_SEPARATOR).filter(|s| !s.is_empty()).collect();
    let common = path_segs
        .iter()
        .zip(&base_segs)
        .take_while(|(a, b)| *a == *b)
        .count();
    let ups = base_segs.len() - common;
    let mut out: Vec<&str> = vec![".."; ups];
    out.extend(&path_segs[common..]);
    if out.is_empty() {
        return ".".to_string();
    }
    out.join(MAIN_SEPARATOR_STR)
}

/// Longest common string prefix, like `os.path.commonprefix`.
pub fn common_prefix<'a, I: IntoIterator<Item = &'a str>>(paths: I) -> String {
    let mut it = paths.into_iter();
    let Some(first) = it.next() else {
        return String::new();
    };
    let mut prefix = first;
    for p in it {
        let mut shared = prefix.len().min(p.len());
        for ((i, a), b) in prefix.char_indices().zip(p.chars()) {
            if a != b {
                shared = i;
                break;
            }
        }
        prefix = &prefix[..shared];
    }
    prefix.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_dirname() {
        assert_eq!(join("foo", "bar.py"), "foo/bar.py");
        assert_eq!(join("", "bar.py"), "bar.py");
        assert_eq!(join("foo", ""), "foo");
        assert_eq!(dirname("foo/bar.py"), "foo");
        assert_eq!(dirname("bar.py"), "");
        assert_eq!(basename("foo/bar.py"), "bar.py");
        assert_eq!(basename("bar.py"), "bar.py");
    }

    #[test]
    fn test_splitext() {
        assert_eq!(splitext("foo/bar.py"), ("foo/bar".into(), ".py".into()));
        assert_eq!(splitext("foo/bar"), ("foo/bar".into(), String::new()));
        assert_eq!(splitext("a/.hidden"), ("a/.hidden".into(), String::new()));
        assert_eq!(splitext("x.tar"), ("x".into(), ".tar".into()));
    }

    #[test]
    fn test_normpath() {
        assert_eq!(normpath("foo/../a"), "a");
        assert_eq!(normpath("foo/./bar"), "foo/bar");
        assert_eq!(normpath("foo/bar/../../baz"), "baz");
        assert_eq!(normpath("../x"), "../x");
        assert_eq!(normpath("/a/b/../c"), "/a/c");
        assert_eq!(normpath(""), ".");
        assert_eq!(normpath("foo/"), "foo");
    }

    #[test]
    fn test_relpath() {
        assert_eq!(relpath("/a/b/c.py", "/a"), "b/c.py");
        assert_eq!(relpath("/a/b/c.py", "/a/b"), "c.py");
        assert_eq!(relpath("/a/x.py", "/a/b"), "../x.py");
        assert_eq!(relpath("a.py", ""), "a.py");
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(["/a/b/c", "/a/b/d"]), "/a/b/");
        assert_eq!(common_prefix(["/a", "/b"]), "/");
        assert_eq!(common_prefix(Vec::<&str>::new()), "");
    }

    #[test]
    fn test_absolutize_keeps_archive_keys() {
        assert_eq!(absolutize("tar:pkg/mod.py"), "tar:pkg/mod.py");
        assert!(absolutize("x.py").starts_with('/'));
    }
}
