//! Import statement extraction using tree-sitter.

use std::fmt;
use std::io;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Error type for extraction failures. Syntax errors are recoverable data:
/// the graph records the file as unreadable and moves on.
#[derive(Debug)]
pub enum ParseError {
    Io(io::Error),
    ParserInit,
    Syntax,
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        ParseError::Io(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "IO error: {}", e),
            ParseError::ParserInit => write!(f, "Failed to initialize Python parser"),
            ParseError::Syntax => write!(f, "Failed to parse Python code"),
        }
    }
}

impl std::error::Error for ParseError {}

/// One parsed import statement, such as `import foo.bar as baz`.
///
/// `name` keeps any leading dots of a relative import; `new_name` is the
/// locally bound name and defaults to `name`. `is_from` marks statements that
/// may name a symbol inside a module rather than a module (`from sys import
/// argv`), `is_star` wildcard imports. `source` is an externally supplied
/// hint: an absolute path the surrounding environment already resolved the
/// import to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportStatement {
    pub name: String,
    pub new_name: String,
    pub is_from: bool,
    pub is_star: bool,
    pub source: Option<String>,
}

impl ImportStatement {
    /// A plain `import name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        ImportStatement {
            new_name: name.clone(),
            name,
            is_from: false,
            is_star: false,
            source: None,
        }
    }

    /// `import name as new_name`.
    pub fn renamed(name: impl Into<String>, new_name: impl Into<String>) -> Self {
        ImportStatement {
            name: name.into(),
            new_name: new_name.into(),
            is_from: false,
            is_star: false,
            source: None,
        }
    }

    /// `from <parent of name> import <last part of name>`.
    pub fn from_import(name: impl Into<String>) -> Self {
        ImportStatement {
            is_from: true,
            ..Self::new(name)
        }
    }

    /// `from name import *`.
    pub fn star(name: impl Into<String>) -> Self {
        ImportStatement {
            is_from: true,
            is_star: true,
            ..Self::new(name)
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// True iff the name is resolved against the importing module's package.
    pub fn is_relative(&self) -> bool {
        self.name.starts_with('.')
    }
}

impl fmt::Display for ImportStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_star {
            return write!(f, "from {} import *", self.name);
        }
        // Bracket the part that might be a symbol rather than a module.
        let module = if self.is_from {
            match self.name.rsplit_once('.') {
                Some((left, right)) if !left.is_empty() => format!("{left}[.{right}]"),
                _ => format!("[{}]", self.name),
            }
        } else {
            self.name.clone()
        };
        if self.new_name != self.name {
            write!(f, "import {module} as {}", self.new_name)
        } else {
            write!(f, "import {module}")
        }
    }
}

fn create_parser() -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    let language = tree_sitter_python::LANGUAGE;
    parser
        .set_language(&language.into())
        .map_err(|_| ParseError::ParserInit)?;
    Ok(parser)
}

/// Extracts every import statement of `filename`, in source order, at any
/// nesting depth. `version` is the Python version of the project being
/// analyzed; sources that the grammar for that lineage cannot parse are a
/// [`ParseError::Syntax`].
pub fn get_imports(filename: &Path, version: (u32, u32)) -> Result<Vec<ImportStatement>, ParseError> {
    let source = std::fs::read_to_string(filename)?;
    get_imports_from_source(&source, version)
}

/// String-input variant of [`get_imports`].
pub fn get_imports_from_source(
    source: &str,
    _version: (u32, u32),
) -> Result<Vec<ImportStatement>, ParseError> {
    let mut parser = create_parser()?;
    let tree = parser.parse(source, None).ok_or(ParseError::Syntax)?;
    if tree.root_node().has_error() {
        return Err(ParseError::Syntax);
    }
    let mut imports = Vec::new();
    collect_imports(tree.root_node(), source, &mut imports);
    Ok(imports)
}

fn collect_imports(node: Node, source: &str, imports: &mut Vec<ImportStatement>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_statement" => collect_plain_import(child, source, imports),
            "import_from_statement" => collect_from_import(child, source, imports),
            _ => collect_imports(child, source, imports),
        }
    }
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// `import a.b.c` / `import a.b.c as d`, possibly comma-separated.
fn collect_plain_import(node: Node, source: &str, imports: &mut Vec<ImportStatement>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "dotted_name" => imports.push(ImportStatement::new(node_text(child, source))),
            "aliased_import" => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let name = node_text(name, source);
                match child.child_by_field_name("alias") {
                    Some(alias) => {
                        imports.push(ImportStatement::renamed(name, node_text(alias, source)));
                    }
                    None => imports.push(ImportStatement::new(name)),
                }
            }
            _ => {}
        }
    }
}

/// `from x import a, b as c` yields one statement per imported name, each
/// carrying the fully dotted path `x.a` / `x.b`. The module prefix of a
/// relative import keeps its leading dots (`from .. import y` -> `..y`).
fn collect_from_import(node: Node, source: &str, imports: &mut Vec<ImportStatement>) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };
    let module = node_text(module_node, source);
    let prefix = if module.ends_with('.') {
        module.to_string()
    } else {
        format!("{module}.")
    };
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.id() == module_node.id() {
            continue;
        }
        match child.kind() {
            "wildcard_import" => imports.push(ImportStatement::star(module)),
            "dotted_name" => {
                let name = node_text(child, source);
                imports.push(ImportStatement::from_import(format!("{prefix}{name}")));
            }
            "aliased_import" => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let name = node_text(name, source);
                let mut imp = ImportStatement::from_import(format!("{prefix}{name}"));
                if let Some(alias) = child.child_by_field_name("alias") {
                    imp.new_name = node_text(alias, source).to_string();
                }
                imports.push(imp);
            }
            _ => {}
        }
    }
}
