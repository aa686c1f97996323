//! Rendering of dependency graphs for terminal and machine consumption.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde_json::json;

use crate::graph::{DependencyGraph, DependencySource, Node};
use crate::utils::{common_prefix, dirname, relpath};

/// The directory prefix shared by every file that imports something:
/// the longest common prefix of edge tails, trimmed to a real directory.
pub fn find_root<S: DependencySource>(graph: &DependencyGraph<S>) -> String {
    let mut tails: Vec<String> = Vec::new();
    for (tail, _) in graph.edges() {
        match tail {
            Node::File(f) => tails.push(f),
            Node::Cycle(c) => tails.extend(c.flatten_nodes()),
            Node::Set(s) => tails.extend(s.nodes),
        }
    }
    let prefix = common_prefix(tails.iter().map(String::as_str));
    if Path::new(&prefix).is_dir() {
        prefix
    } else {
        dirname(&prefix)
    }
}

/// One node, human readable: files relative to the source root, typeshed
/// stubs bracketed relative to the stub directory, collapsed components in
/// their `[a->b]` form.
pub fn format_node(node: &Node, root: &str, typeshed: Option<&str>) -> String {
    match node {
        Node::Set(set) => {
            let parts: Vec<String> = set.nodes.iter().map(|f| relpath(f, root)).collect();
            format!("[{}]", parts.join("->"))
        }
        Node::Cycle(cycle) => cycle.pp(),
        Node::File(f) => match typeshed {
            Some(ts) if f.starts_with(ts) => format!("[{}]", relpath(f, ts)),
            _ => relpath(f, root),
        },
    }
}

/// Raw adjacency dump: one `k -> v` line per edge, `k -> <imp>` per broken
/// import, grouped and sorted by tail.
pub fn inspect_graph<S: DependencySource>(
    graph: &DependencyGraph<S>,
    typeshed: Option<&str>,
) -> String {
    let root = find_root(graph);
    // keyed by the raw tail path so broken deps can be joined back in
    let mut by_tail: BTreeMap<String, (String, Vec<String>)> = BTreeMap::new();
    for (tail, head) in graph.edges() {
        let raw = match &tail {
            Node::File(f) => f.clone(),
            other => other.pp(),
        };
        let entry = by_tail
            .entry(raw)
            .or_insert_with(|| (format_node(&tail, &root, typeshed), Vec::new()));
        entry.1.push(format_node(&head, &root, typeshed));
    }
    let mut out = String::new();
    for (raw, (tail, mut heads)) in by_tail {
        heads.sort();
        for head in heads {
            out.push_str(&format!("  {tail} -> {head}\n"));
        }
        if let Some(broken) = graph.broken_deps().get(&raw) {
            for imp in broken {
                out.push_str(&format!("  {tail} -> <{imp}>\n"));
            }
        }
    }
    out
}

/// Dependency tree from the import roots down, two-space indent per level.
pub fn format_tree<S: DependencySource>(graph: &DependencyGraph<S>, typeshed: Option<&str>) -> String {
    let root = find_root(graph);
    let adjacency: HashMap<Node, Vec<Node>> = graph.adjacency().into_iter().collect();
    let mut out = String::new();
    let mut seen: HashSet<Node> = HashSet::new();
    for start in graph.graph_roots() {
        print_subtree(&start, &adjacency, &mut seen, 0, &root, typeshed, &mut out);
    }
    out
}

fn print_subtree(
    node: &Node,
    adjacency: &HashMap<Node, Vec<Node>>,
    seen: &mut HashSet<Node>,
    indent: usize,
    root: &str,
    typeshed: Option<&str>,
    out: &mut String,
) {
    if seen.contains(node) || !node.is_source() {
        return;
    }
    seen.insert(node.clone());
    out.push_str(&"  ".repeat(indent));
    out.push_str(&format_node(node, root, typeshed));
    out.push('\n');
    for dep in adjacency.get(node).map(Vec::as_slice).unwrap_or_default() {
        print_subtree(dep, adjacency, seen, indent + 1, root, typeshed, out);
    }
}

/// Source nodes in topological order, one per line, dependents first.
pub fn format_topological_sort<S: DependencySource>(
    graph: &DependencyGraph<S>,
    typeshed: Option<&str>,
) -> String {
    let root = find_root(graph);
    let mut out = String::new();
    for (node, _) in graph.adjacency() {
        if node.is_source() {
            out.push_str(&format_node(&node, &root, typeshed));
            out.push('\n');
        }
    }
    out
}

/// `source:`/`deps:` blocks over the frozen deps list.
pub fn formatted_deps_list<S: DependencySource>(
    graph: &DependencyGraph<S>,
    typeshed: Option<&str>,
) -> String {
    let root = find_root(graph);
    let mut out: Vec<String> = Vec::new();
    for (node, deps) in graph.deps_list() {
        out.push(format!("source: {}", format_node(&node, &root, typeshed)));
        if !deps.is_empty() {
            out.push("deps:".to_string());
            for dep in deps {
                out.push(format!("  {}", format_node(&dep, &root, typeshed)));
            }
        }
    }
    out.join("\n")
}

/// Unresolved imports, sorted, one per line.
pub fn format_unresolved<S: DependencySource>(graph: &DependencyGraph<S>) -> String {
    let mut out = String::new();
    for imp in graph.get_all_unresolved() {
        out.push_str(&imp.to_string());
        out.push('\n');
    }
    out
}

/// Machine-readable dump of the frozen graph.
pub fn deps_json<S: DependencySource>(graph: &DependencyGraph<S>) -> serde_json::Value {
    let deps: Vec<serde_json::Value> = graph
        .deps_list()
        .into_iter()
        .map(|(node, deps)| {
            json!({
                "source": node.pp(),
                "deps": deps.iter().map(Node::pp).collect::<Vec<String>>(),
            })
        })
        .collect();
    json!({
        "sorted_source_files": graph.sorted_source_files(),
        "deps": deps,
        "unresolved": graph
            .get_all_unresolved()
            .iter()
            .map(|imp| imp.name.clone())
            .collect::<Vec<String>>(),
        "unreadable": graph.unreadable_files(),
    })
}
