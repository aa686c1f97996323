//! Import path resolution emulating Python's module search rules.
//!
//! Given a parsed import statement and the ordered search path, the resolver
//! locates the file Python's import machinery would load: package
//! initializers before module files, symbol-vs-module fallback for
//! `from`-imports, relative-import arithmetic against the importing module,
//! and a last-resort hint supplied by the surrounding environment.

use std::fmt;
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path};

use crate::builtins;
use crate::fs::FsRef;
use crate::parser::ImportStatement;
use crate::utils::{basename, dirname, join, normpath, splitext};

/// Filename whose presence marks a directory as a package.
pub const INIT_FILE: &str = "__init__.py";

/// The resolver could not locate an import anywhere. Recoverable: callers
/// record the reference as broken and keep going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportNotFound {
    pub module_name: String,
}

impl ImportNotFound {
    pub fn new(module_name: impl Into<String>) -> Self {
        ImportNotFound {
            module_name: module_name.into(),
        }
    }
}

impl fmt::Display for ImportNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown module: {}", self.module_name)
    }
}

impl std::error::Error for ImportNotFound {}

/// Where a resolved file came from. Exactly one variant holds per success.
#[derive(Debug, Clone)]
pub enum ResolvedFile {
    /// Supplied directly as a root argument.
    Direct { path: String, module_name: String },
    /// Found inside one of the search-path filesystems.
    Local {
        path: String,
        module_name: String,
        fs: FsRef,
    },
    /// Found via relative-import arithmetic from the importing file.
    Relative { path: String, module_name: String },
    /// Not on the search path; located through the import's source hint.
    System { path: String, module_name: String },
    /// Matched the statically known builtin-module list.
    Builtin { path: String, module_name: String },
}

impl ResolvedFile {
    pub fn path(&self) -> &str {
        match self {
            ResolvedFile::Direct { path, .. }
            | ResolvedFile::Local { path, .. }
            | ResolvedFile::Relative { path, .. }
            | ResolvedFile::System { path, .. }
            | ResolvedFile::Builtin { path, .. } => path,
        }
    }

    pub fn module_name(&self) -> &str {
        match self {
            ResolvedFile::Direct { module_name, .. }
            | ResolvedFile::Local { module_name, .. }
            | ResolvedFile::Relative { module_name, .. }
            | ResolvedFile::System { module_name, .. }
            | ResolvedFile::Builtin { module_name, .. } => module_name,
        }
    }

    /// Native extension modules have no source to analyze.
    pub fn is_extension(&self) -> bool {
        matches!(self, ResolvedFile::Builtin { .. }) || self.path().ends_with(".so")
    }

    fn is_init(&self) -> bool {
        basename(self.path()).starts_with("__init__.")
    }

    /// The package this module belongs to: the module itself for an
    /// initializer file, its dotted parent otherwise, `None` at top level.
    pub fn package_name(&self) -> Option<String> {
        if self.is_init() {
            return Some(self.module_name().to_string());
        }
        self.module_name()
            .rsplit_once('.')
            .map(|(parent, _)| parent.to_string())
    }

    /// The trailing path segments that spell out the module: one segment per
    /// dotted component, plus the initializer file when there is one.
    pub fn short_path(&self) -> String {
        let parts: Vec<&str> = self.path().split(MAIN_SEPARATOR).collect();
        let mut n = self.module_name().matches('.').count() + 1;
        if self.is_init() {
            n += 1;
        }
        let start = parts.len().saturating_sub(n);
        parts[start..].join(MAIN_SEPARATOR_STR)
    }
}

/// Variant + path + module name equality; the owning filesystem of a Local
/// is compared by identity.
impl PartialEq for ResolvedFile {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ResolvedFile::Local { path: p1, module_name: m1, fs: f1 },
                ResolvedFile::Local { path: p2, module_name: m2, fs: f2 },
            ) => p1 == p2 && m1 == m2 && std::sync::Arc::ptr_eq(f1, f2),
            (ResolvedFile::Direct { path: p1, module_name: m1 }, ResolvedFile::Direct { path: p2, module_name: m2 })
            | (ResolvedFile::Relative { path: p1, module_name: m1 }, ResolvedFile::Relative { path: p2, module_name: m2 })
            | (ResolvedFile::System { path: p1, module_name: m1 }, ResolvedFile::System { path: p2, module_name: m2 })
            | (ResolvedFile::Builtin { path: p1, module_name: m1 }, ResolvedFile::Builtin { path: p2, module_name: m2 }) => {
                p1 == p2 && m1 == m2
            }
            _ => false,
        }
    }
}

/// Converts `.module` to `module`, `..module` to `../module`, etc.
/// Returns the filesystem-relative path and the leading-dot count.
pub fn convert_to_path(name: &str) -> (String, usize) {
    let remainder = name.trim_start_matches('.');
    let level = name.len() - remainder.len();
    let body = remainder.replace('.', MAIN_SEPARATOR_STR);
    if level > 1 {
        let ups = vec![".."; level - 1].join(MAIN_SEPARATOR_STR);
        (join(&ups, &body), level)
    } else {
        (body, level)
    }
}

/// Qualifies a relative name against a package: `(x.y, .a.b)` -> `x.y.a.b`,
/// `(x.y, ..a.b)` -> `x.a.b`. Plain names are nested under the package:
/// `(x.y, a.b)` -> `x.y.a.b`. More dots than package depth is unanswerable
/// and yields `None`.
pub fn get_absolute_name(package: &str, relative_name: &str) -> Option<String> {
    let name = relative_name.trim_start_matches('.');
    let ndots = relative_name.len() - name.len();
    let parts: Vec<&str> = if package.is_empty() {
        Vec::new()
    } else {
        package.split('.').collect()
    };
    if ndots > parts.len() {
        return None;
    }
    let keep = std::cmp::min(parts.len(), parts.len() + 1 - ndots);
    let mut out: Vec<&str> = parts[..keep].to_vec();
    if !name.is_empty() {
        out.push(name);
    }
    Some(out.join("."))
}

/// Infers the dotted module name of a file by stripping the longest matching
/// OS-filesystem root from the search path. Initializer files name their
/// directory. Returns the empty string when no root matches.
pub fn infer_module_name(filename: &str, fs_path: &[FsRef]) -> String {
    let (stem, _) = splitext(filename);
    let mut best: Option<String> = None;
    for fs in fs_path {
        if let Some(short) = fs.relative_path(&stem)
            && best.as_ref().is_none_or(|b| short.len() < b.len())
        {
            best = Some(short);
        }
    }
    let Some(mut short) = best else {
        return String::new();
    };
    if let Some(parent) = short.strip_suffix(&format!("{MAIN_SEPARATOR}__init__")) {
        short = parent.to_string();
    }
    short.replace(MAIN_SEPARATOR, ".")
}

/// Resolves import statements against an ordered search path, in the context
/// of the importing module.
pub struct Resolver<'a> {
    fs_path: &'a [FsRef],
    current_module: ResolvedFile,
    current_directory: String,
    python_version: (u32, u32),
}

impl<'a> Resolver<'a> {
    pub fn new(
        fs_path: &'a [FsRef],
        current_module: ResolvedFile,
        python_version: (u32, u32),
    ) -> Self {
        let current_directory = dirname(current_module.path());
        Resolver {
            fs_path,
            current_module,
            current_directory,
            python_version,
        }
    }

    /// Package initializer first, module file second.
    fn find_file(&self, fs: &FsRef, name: &str) -> Option<String> {
        let init = join(name, INIT_FILE);
        let module = format!("{name}.py");
        for cand in [init, module] {
            if fs.isfile(&cand) {
                return Some(fs.refer_to(&cand));
            }
        }
        None
    }

    /// Simulates how Python resolves one import in the current module.
    ///
    /// Returns where the source file Python would load came from, or
    /// [`ImportNotFound`] if no search-path layer and no source hint can
    /// satisfy the reference.
    pub fn resolve_import(&self, item: &ImportStatement) -> Result<ResolvedFile, ImportNotFound> {
        let name = item.name.as_str();

        // The last part in `from a.b.c import d` might be a symbol rather
        // than a module, so a.b.c is tried after a.b.c.d.
        let short_name: Option<String> = if item.is_from && !item.is_star {
            let stripped = name.trim_start_matches('.');
            let rindex = if stripped.contains('.') {
                name.rfind('.')
            } else {
                name.rfind('.').map(|i| i + 1)
            };
            rindex.filter(|&i| i > 0).map(|i| name[..i].to_string())
        } else {
            None
        };

        if builtins::is_builtin(name, self.python_version) {
            return Ok(ResolvedFile::Builtin {
                path: format!("{name}.so"),
                module_name: name.to_string(),
            });
        }

        let (mut filename, level) = convert_to_path(name);
        if level > 0 {
            // Relative import: anchor at the importing file's directory.
            filename = normpath(&join(&self.current_directory, &filename));
        }

        let mut candidates: Vec<(String, String)> = vec![(name.to_string(), filename.clone())];
        if let Some(short) = &short_name {
            candidates.push((short.clone(), dirname(&filename)));
        }

        for fs in self.fs_path {
            for (module_name, path) in &candidates {
                let Some(found) = self.find_file(fs, path) else {
                    continue;
                };
                if found == self.current_module.path() {
                    // A module cannot import itself.
                    continue;
                }
                if item.is_relative() {
                    let Some(package_name) = self.current_module.package_name() else {
                        // Relative import in a non-package.
                        return Err(ImportNotFound::new(name));
                    };
                    let module_name =
                        get_absolute_name(&package_name, module_name).unwrap_or_default();
                    return Ok(match self.current_module {
                        ResolvedFile::System { .. } => ResolvedFile::System {
                            path: found,
                            module_name,
                        },
                        _ => ResolvedFile::Relative {
                            path: found,
                            module_name,
                        },
                    });
                }
                return Ok(ResolvedFile::Local {
                    path: found,
                    module_name: module_name.clone(),
                    fs: fs.clone(),
                });
            }
        }

        // The search path came up empty; fall back to wherever the
        // surrounding environment says the import machinery found it.
        if let Some(source) = &item.source {
            let (prefix, ext) = splitext(source);
            let mut module_name = name.to_string();
            if let Some(short) = &short_name {
                let dotted = prefix.replace(MAIN_SEPARATOR, ".");
                let dotted = dotted.strip_suffix(".__init__").unwrap_or(&dotted);
                if !dotted.ends_with(name) && dotted.ends_with(short.as_str()) {
                    module_name = short.clone();
                }
            }
            if ext == ".pyc" {
                // Prefer the source sibling of a bytecode hint, if present.
                let pyfile = format!("{prefix}.py");
                if Path::new(&pyfile).exists() {
                    return Ok(ResolvedFile::System {
                        path: pyfile,
                        module_name,
                    });
                }
            } else if ext.is_empty() {
                // A hint naming a package directory means its initializer.
                let pyfile = join(&prefix, INIT_FILE);
                if Path::new(&pyfile).exists() {
                    return Ok(ResolvedFile::System {
                        path: pyfile,
                        module_name,
                    });
                }
            }
            return Ok(ResolvedFile::System {
                path: source.clone(),
                module_name,
            });
        }

        Err(ImportNotFound::new(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{ExtensionRemappingFileSystem, StoredFileSystem};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn stored(entries: &[(&str, &str)]) -> StoredFileSystem {
        StoredFileSystem::new(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    struct Setup {
        py_fs: FsRef,
        pyi_fs: FsRef,
        path: Vec<FsRef>,
    }

    fn setup() -> Setup {
        let py_fs: FsRef = Arc::new(stored(&[
            ("a.py", "contents of a"),
            ("b.py", "contents of b"),
            ("foo/c.py", "contents of c"),
            ("foo/d.py", "contents of d"),
            ("bar/e.py", "contents of e"),
            ("baz/__init__.py", "contents of init"),
            ("baz/f.py", "contents of f"),
        ]));
        let pyi_fs: FsRef = Arc::new(ExtensionRemappingFileSystem::pyi(Box::new(stored(&[
            ("x.pyi", "contents of x"),
            ("y.pyi", "contents of y"),
        ]))));
        let path = vec![pyi_fs.clone(), py_fs.clone()];
        Setup { py_fs, pyi_fs, path }
    }

    fn resolver<'a>(s: &'a Setup, filename: &str, module_name: &str) -> Resolver<'a> {
        let module = ResolvedFile::Local {
            path: filename.to_string(),
            module_name: module_name.to_string(),
            fs: s.py_fs.clone(),
        };
        Resolver::new(&s.path, module, (3, 6))
    }

    #[test]
    fn test_resolve_with_filesystem() {
        let s = setup();
        let f = resolver(&s, "b.py", "b")
            .resolve_import(&ImportStatement::new("a"))
            .unwrap();
        let ResolvedFile::Local { path, module_name, fs } = &f else {
            panic!("expected Local, got {f:?}");
        };
        assert!(Arc::ptr_eq(fs, &s.py_fs));
        assert_eq!(path, "a.py");
        assert_eq!(module_name, "a");
    }

    #[test]
    fn test_resolve_package_file() {
        let s = setup();
        let f = resolver(&s, "b.py", "b")
            .resolve_import(&ImportStatement::new("foo.c"))
            .unwrap();
        assert_eq!(f.path(), "foo/c.py");
        assert_eq!(f.module_name(), "foo.c");
    }

    #[test]
    fn test_resolve_same_package_file() {
        let s = setup();
        let f = resolver(&s, "foo/d.py", "foo.d")
            .resolve_import(&ImportStatement::new(".c"))
            .unwrap();
        assert_eq!(f.path(), "foo/c.py");
        assert_eq!(f.module_name(), "foo.c");
        assert!(matches!(f, ResolvedFile::Relative { .. }));
    }

    #[test]
    fn test_resolve_parent_package_file() {
        // Two dots from a depth-one package go beyond the top level: the
        // file is still found, but the absolute name is unknowable.
        let s = setup();
        let f = resolver(&s, "foo/d.py", "foo.d")
            .resolve_import(&ImportStatement::new("..a"))
            .unwrap();
        assert_eq!(f.path(), "a.py");
        assert_eq!(f.module_name(), "");
    }

    #[test]
    fn test_resolve_parent_package_file_with_module() {
        let s = setup();
        let f = resolver(&s, "foo/d.py", "bar.foo.d")
            .resolve_import(&ImportStatement::new("..a"))
            .unwrap();
        assert_eq!(f.path(), "a.py");
        assert_eq!(f.module_name(), "bar.a");
    }

    #[test]
    fn test_resolve_sibling_package_file() {
        // Invalid relative import beyond the top-level package: the walk
        // still finds the file, the module name comes back empty.
        let s = setup();
        let f = resolver(&s, "foo/d.py", "foo.d")
            .resolve_import(&ImportStatement::new("..bar.e"))
            .unwrap();
        assert_eq!(f.path(), "bar/e.py");
        assert_eq!(f.module_name(), "");
    }

    #[test]
    fn test_resolve_init_file() {
        let s = setup();
        let f = resolver(&s, "b.py", "b")
            .resolve_import(&ImportStatement::new("baz"))
            .unwrap();
        assert_eq!(f.path(), "baz/__init__.py");
        assert_eq!(f.module_name(), "baz");
    }

    #[test]
    fn test_resolve_relative_from_init_file() {
        let s = setup();
        let parent = ResolvedFile::Direct {
            path: "baz/__init__.py".to_string(),
            module_name: "baz".to_string(),
        };
        let f = Resolver::new(&s.path, parent, (3, 6))
            .resolve_import(&ImportStatement::new(".f"))
            .unwrap();
        assert!(matches!(f, ResolvedFile::Relative { .. }));
        assert_eq!(f.path(), "baz/f.py");
        assert_eq!(f.module_name(), "baz.f");
    }

    #[test]
    fn test_resolve_relative_symbol() {
        // Importing a symbol from baz/__init__.py while inside baz/f.py.
        let s = setup();
        let parent = ResolvedFile::Direct {
            path: "baz/f.py".to_string(),
            module_name: "baz.f".to_string(),
        };
        let f = Resolver::new(&s.path, parent, (3, 6))
            .resolve_import(&ImportStatement::from_import(".Symbol"))
            .unwrap();
        assert_eq!(f.path(), "baz/__init__.py");
        assert_eq!(f.module_name(), "baz");
    }

    #[test]
    fn test_resolve_symbol_from_file() {
        // from foo.c import X
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(&ImportStatement::from_import("foo.c.X"))
            .unwrap();
        assert_eq!(f.path(), "foo/c.py");
        assert_eq!(f.module_name(), "foo.c");
    }

    #[test]
    fn test_override_source() {
        // A hint is ignored when the search path already answers.
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(&ImportStatement::from_import("foo.c").with_source("/system/c.py"))
            .unwrap();
        assert_eq!(f.path(), "foo/c.py");
        assert_eq!(f.module_name(), "foo.c");
    }

    #[test]
    fn test_fall_back_to_source() {
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(&ImportStatement::new("f").with_source("/system/f.py"))
            .unwrap();
        assert!(matches!(f, ResolvedFile::System { .. }));
        assert_eq!(f.path(), "/system/f.py");
        assert_eq!(f.module_name(), "f");
    }

    #[test]
    fn test_resolve_system_symbol() {
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(
                &ImportStatement::from_import("argparse.ArgumentParser")
                    .with_source("/system/argparse.pyc"),
            )
            .unwrap();
        assert!(matches!(f, ResolvedFile::System { .. }));
        assert_eq!(f.module_name(), "argparse");
    }

    #[test]
    fn test_resolve_system_symbol_name_clash() {
        // from foo.foo import foo
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(
                &ImportStatement::from_import("foo.foo.foo")
                    .with_source("/system/bar/foo/foo.pyc"),
            )
            .unwrap();
        assert!(matches!(f, ResolvedFile::System { .. }));
        assert_eq!(f.module_name(), "foo.foo");
    }

    #[test]
    fn test_resolve_system_file_name_clash() {
        // `import a` inside a.py must not resolve to itself.
        let s = setup();
        let f = resolver(&s, "a.py", "a")
            .resolve_import(&ImportStatement::new("a").with_source("/system/a.py"))
            .unwrap();
        assert!(matches!(f, ResolvedFile::System { .. }));
        assert_eq!(f.path(), "/system/a.py");
        assert_eq!(f.module_name(), "a");
    }

    #[test]
    fn test_resolve_system_init_file() {
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(
                &ImportStatement::from_import("foo.bar.X")
                    .with_source("/system/foo/bar/__init__.pyc"),
            )
            .unwrap();
        assert!(matches!(f, ResolvedFile::System { .. }));
        assert_eq!(f.module_name(), "foo.bar");
    }

    #[test]
    fn test_resolve_system_package_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("foo")).unwrap();
        let py_file = tmp.path().join("foo/__init__.py");
        std::fs::write(&py_file, "").unwrap();
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(
                &ImportStatement::from_import("foo")
                    .with_source(tmp.path().join("foo").to_string_lossy()),
            )
            .unwrap();
        assert!(matches!(f, ResolvedFile::System { .. }));
        assert_eq!(f.module_name(), "foo");
        assert_eq!(f.path(), py_file.to_string_lossy());
    }

    #[test]
    fn test_get_py_from_pyc_source() {
        // A bytecode hint is overridden by its source sibling when present.
        let tmp = tempfile::TempDir::new().unwrap();
        let py_file = tmp.path().join("f.py");
        std::fs::write(&py_file, "").unwrap();
        std::fs::write(tmp.path().join("f.pyc"), "").unwrap();
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(
                &ImportStatement::new("f")
                    .with_source(tmp.path().join("f.pyc").to_string_lossy()),
            )
            .unwrap();
        assert_eq!(f.path(), py_file.to_string_lossy());
        assert_eq!(f.module_name(), "f");
    }

    #[test]
    fn test_pyc_source_without_py() {
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(&ImportStatement::new("f").with_source("/system/f.pyc"))
            .unwrap();
        assert_eq!(f.path(), "/system/f.pyc");
        assert_eq!(f.module_name(), "f");
    }

    #[test]
    fn test_resolve_builtin() {
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(&ImportStatement::new("sys"))
            .unwrap();
        assert!(matches!(f, ResolvedFile::Builtin { .. }));
        assert_eq!(f.path(), "sys.so");
        assert_eq!(f.module_name(), "sys");
        assert!(f.is_extension());
    }

    #[test]
    fn test_resolve_star_import() {
        let s = setup();
        let f = resolver(&s, "x.py", "x")
            .resolve_import(&ImportStatement::star("foo.c"))
            .unwrap();
        assert_eq!(f.path(), "foo/c.py");
        assert_eq!(f.module_name(), "foo.c");

        let b = resolver(&s, "x.py", "x")
            .resolve_import(&ImportStatement::star("sys"))
            .unwrap();
        assert!(matches!(b, ResolvedFile::Builtin { .. }));
        assert_eq!(b.path(), "sys.so");
    }

    #[test]
    fn test_resolve_star_import_system() {
        let s = setup();
        let mut imp = ImportStatement::star("f");
        imp.source = Some("/system/f.py".to_string());
        let f = resolver(&s, "x.py", "x").resolve_import(&imp).unwrap();
        assert_eq!(f.path(), "/system/f.py");
        assert_eq!(f.module_name(), "f");
    }

    #[test]
    fn test_resolve_pyi_file() {
        // The stub overlay is earlier in the search path and wins.
        let s = setup();
        let f = resolver(&s, "b.py", "b")
            .resolve_import(&ImportStatement::new("x"))
            .unwrap();
        let ResolvedFile::Local { path, fs, .. } = &f else {
            panic!("expected Local, got {f:?}");
        };
        assert!(Arc::ptr_eq(fs, &s.pyi_fs));
        assert_eq!(path, "x.pyi");
        assert_eq!(f.module_name(), "x");
    }

    #[test]
    fn test_resolve_system_relative() {
        // A relative import under a System parent stays System.
        let tree = crate::test_utils::SourceTree::new();
        let x = tree.create_file("foo/x.py", "");
        tree.create_file("foo/y.py", "");
        let path = vec![tree.filesystem()];
        let module = ResolvedFile::System {
            path: x,
            module_name: "foo.x".to_string(),
        };
        let f = Resolver::new(&path, module, (3, 6))
            .resolve_import(&ImportStatement::new(".y"))
            .unwrap();
        assert!(matches!(f, ResolvedFile::System { .. }));
        assert_eq!(f.module_name(), "foo.y");
        assert_eq!(f.path(), tree.path("foo/y.py"));
    }

    #[test]
    fn test_resolve_relative_in_non_package() {
        let s = setup();
        let err = resolver(&s, "a.py", "a")
            .resolve_import(&ImportStatement::from_import(".b"))
            .unwrap_err();
        assert_eq!(err.module_name, ".b");
    }

    #[test]
    fn test_provenance_idempotence() {
        let s = setup();
        let r = resolver(&s, "b.py", "b");
        let imp = ImportStatement::new("foo.c");
        let first = r.resolve_import(&imp).unwrap();
        let second = r.resolve_import(&imp).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_infer_module_name() {
        let tree = crate::test_utils::SourceTree::new();
        tree.create_file("foo/bar.py", "");
        let fs_path = vec![tree.filesystem()];
        assert_eq!(
            infer_module_name(&tree.path("foo/bar.py"), &fs_path),
            "foo.bar"
        );
        // Standalone scripts often have no extension.
        assert_eq!(infer_module_name(&tree.path("foo/baz"), &fs_path), "foo.baz");
        assert_eq!(
            infer_module_name(&tree.path("random/src.py"), &fs_path),
            "random.src"
        );
        assert_eq!(infer_module_name("/some/random/file", &fs_path), "");
    }

    #[test]
    fn test_infer_init_module_name() {
        let tree = crate::test_utils::SourceTree::new();
        let py_file = tree.create_file("foo/__init__.py", "");
        let fs_path = vec![tree.filesystem()];
        assert_eq!(infer_module_name(&py_file, &fs_path), "foo");
    }

    #[test]
    fn test_get_absolute_name() {
        let cases = [
            ("x.y", "a.b", Some("x.y.a.b")),
            ("", "a.b", Some("a.b")),
            ("x.y", ".a.b", Some("x.y.a.b")),
            ("x.y", "..a.b", Some("x.a.b")),
            ("x.y", "...a.b", None),
        ];
        for (package, name, expected) in cases {
            assert_eq!(
                get_absolute_name(package, name),
                expected.map(str::to_string),
                "({package}, {name})"
            );
        }
    }

    #[test]
    fn test_convert_to_path() {
        assert_eq!(convert_to_path("a.b.c"), ("a/b/c".to_string(), 0));
        assert_eq!(convert_to_path(".c"), ("c".to_string(), 1));
        assert_eq!(convert_to_path("..a"), ("../a".to_string(), 2));
        assert_eq!(convert_to_path("...a.b"), ("../../a/b".to_string(), 3));
    }

    #[test]
    fn test_short_path() {
        let f = ResolvedFile::System {
            path: "/system/foo/bar.py".to_string(),
            module_name: "foo.bar".to_string(),
        };
        assert_eq!(f.short_path(), "foo/bar.py");
        let init = ResolvedFile::Direct {
            path: "/src/baz/__init__.py".to_string(),
            module_name: "baz".to_string(),
        };
        assert_eq!(init.short_path(), "baz/__init__.py");
    }

    #[test]
    fn test_package_name() {
        let init = ResolvedFile::Direct {
            path: "baz/__init__.py".to_string(),
            module_name: "baz".to_string(),
        };
        assert_eq!(init.package_name(), Some("baz".to_string()));
        let module = ResolvedFile::Direct {
            path: "foo/d.py".to_string(),
            module_name: "foo.d".to_string(),
        };
        assert_eq!(module.package_name(), Some("foo".to_string()));
        let top = ResolvedFile::Direct {
            path: "a.py".to_string(),
            module_name: "a".to_string(),
        };
        assert_eq!(top.package_name(), None);
    }
}
