//! Dependency graph construction and cycle collapse.
//!
//! The graph is built in two phases: `add_file_recursive` crawls imports
//! breadth-first from each root, then `build` repeatedly extracts directed
//! cycles into composite nodes until the graph is acyclic and freezes it.
//! After `build`, read queries are safe and mutation is a programmer error.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::env::Environment;
use crate::parser::{self, ImportStatement, ParseError};
use crate::resolve::{self, ResolvedFile, Resolver};
use crate::utils::absolutize;

const SOURCE_EXT: &str = ".py";

/// A graph node: a file path, or a collapsed strongly connected component.
/// `Cycle` nodes only exist between cycle extraction and freeze; a frozen
/// graph contains only files and flat `NodeSet`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    File(String),
    Cycle(Cycle),
    Set(NodeSet),
}

impl Node {
    pub fn pp(&self) -> String {
        match self {
            Node::File(f) => f.clone(),
            Node::Cycle(c) => c.pp(),
            Node::Set(s) => s.pp(),
        }
    }

    /// Files and collapsed components count; stubs and other non-source
    /// artifacts do not.
    pub fn is_source(&self) -> bool {
        match self {
            Node::File(f) => f.ends_with(SOURCE_EXT),
            Node::Cycle(_) | Node::Set(_) => true,
        }
    }
}

/// A cycle of nodes, some of which might themselves be cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cycle {
    pub nodes: Vec<Node>,
}

impl Cycle {
    /// `edges` is the ordered edge list of the cycle; the member nodes are
    /// the edge tails in traversal order.
    pub fn new(edges: Vec<(Node, Node)>) -> Self {
        Cycle {
            nodes: edges.into_iter().map(|(tail, _)| tail).collect(),
        }
    }

    /// Leaf file paths of this cycle, depth-first, order preserved.
    pub fn flatten_nodes(&self) -> Vec<String> {
        let mut out = Vec::new();
        for n in &self.nodes {
            match n {
                Node::File(f) => out.push(f.clone()),
                Node::Cycle(c) => out.extend(c.flatten_nodes()),
                Node::Set(s) => out.extend(s.nodes.iter().cloned()),
            }
        }
        out
    }

    pub fn pp(&self) -> String {
        let parts: Vec<String> = self.nodes.iter().map(Node::pp).collect();
        format!("Cycle({})", parts.join("->"))
    }
}

/// The flattened form of a cycle: a set of mutually dependent files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodeSet {
    pub nodes: Vec<String>,
}

impl NodeSet {
    pub fn from_cycle(cycle: &Cycle) -> Self {
        NodeSet {
            nodes: cycle.flatten_nodes(),
        }
    }

    pub fn pp(&self) -> String {
        format!("[{}]", self.nodes.join("->"))
    }
}

/// One file's imports, split into resolved and unresolved.
#[derive(Debug, Clone, Default)]
pub struct FileDeps {
    /// (absolute path, provenance) pairs, native extensions already dropped.
    pub resolved: Vec<(String, ResolvedFile)>,
    pub unresolved: Vec<ImportStatement>,
}

/// Per-file hooks the graph builder calls while crawling.
pub trait DependencySource {
    /// Extracts and resolves the imports of `filename`. `current` is the
    /// provenance under which the file entered the graph, used as the
    /// resolution context for its relative imports.
    fn file_deps(&self, current: &ResolvedFile, filename: &str) -> Result<FileDeps, ParseError>;

    /// Provenance for a file added directly as a root.
    fn source_file_provenance(&self, filename: &str) -> ResolvedFile {
        ResolvedFile::Direct {
            path: filename.to_string(),
            module_name: String::new(),
        }
    }
}

/// A set of file dependencies stored in a graph structure.
///
/// Construct in two phases: call [`add_file_recursive`] for every root, then
/// [`build`] to collapse cycles. Building freezes the graph; mutating it
/// afterwards (or querying it before) panics.
///
/// [`add_file_recursive`]: DependencyGraph::add_file_recursive
/// [`build`]: DependencyGraph::build
pub struct DependencyGraph<S> {
    source: S,
    graph: StableDiGraph<Node, ()>,
    indices: HashMap<String, NodeIndex>,
    broken_deps: BTreeMap<String, BTreeSet<ImportStatement>>,
    sources: BTreeSet<String>,
    provenance: HashMap<String, ResolvedFile>,
    unreadable_files: BTreeSet<String>,
    finalized: bool,
}

impl<S: DependencySource> DependencyGraph<S> {
    pub fn new(source: S) -> Self {
        DependencyGraph {
            source,
            graph: StableDiGraph::new(),
            indices: HashMap::new(),
            broken_deps: BTreeMap::new(),
            sources: BTreeSet::new(),
            provenance: HashMap::new(),
            unreadable_files: BTreeSet::new(),
            finalized: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn ensure_node(&mut self, path: &str) -> NodeIndex {
        if let Some(&idx) = self.indices.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(Node::File(path.to_string()));
        self.indices.insert(path.to_string(), idx);
        idx
    }

    fn add_source_file(&mut self, filename: &str) {
        self.sources.insert(filename.to_string());
        if !self.provenance.contains_key(filename) {
            let provenance = self.source.source_file_provenance(filename);
            self.provenance.insert(filename.to_string(), provenance);
        }
    }

    fn current_provenance(&self, filename: &str) -> ResolvedFile {
        match self.provenance.get(filename) {
            Some(p) => p.clone(),
            None => self.source.source_file_provenance(filename),
        }
    }

    /// Scans one file: records its edges and broken imports, and returns the
    /// dependency paths it discovered.
    fn scan_file(&mut self, filename: &str) -> Vec<String> {
        self.ensure_node(filename);
        let current = self.current_provenance(filename);
        let deps = match self.source.file_deps(&current, filename) {
            Ok(deps) => deps,
            Err(_) => {
                // An unparsable source file stays in the graph so importers
                // know it exists, but its dependencies are never explored.
                // Non-source artifacts that fail are dropped entirely.
                self.unreadable_files.insert(filename.to_string());
                if !filename.ends_with(SOURCE_EXT) && !self.sources.contains(filename) {
                    if let Some(idx) = self.indices.remove(filename) {
                        self.graph.remove_node(idx);
                    }
                }
                return Vec::new();
            }
        };
        for imp in deps.unresolved {
            self.broken_deps
                .entry(filename.to_string())
                .or_default()
                .insert(imp);
        }
        let mut discovered = Vec::new();
        for (path, provenance) in deps.resolved {
            self.provenance.entry(path.clone()).or_insert(provenance);
            discovered.push(path.clone());
            let from = self.ensure_node(filename);
            let to = self.ensure_node(&path);
            self.graph.update_edge(from, to, ());
        }
        discovered
    }

    /// Adds a file and its immediate dependencies to the graph.
    pub fn add_file(&mut self, filename: &str) {
        assert!(!self.finalized, "Trying to mutate a final graph.");
        self.add_source_file(filename);
        self.scan_file(filename);
    }

    /// Adds a file and all its recursive dependencies to the graph.
    ///
    /// With `trim`, the crawl does not descend into files whose provenance
    /// is System or Builtin, keeping the standard library out of the graph
    /// while still recording the direct edges into it.
    pub fn add_file_recursive(&mut self, filename: &str, trim: bool) {
        assert!(!self.finalized, "Trying to mutate a final graph.");
        self.add_source_file(filename);
        let mut queue = VecDeque::from([filename.to_string()]);
        let mut seen: HashSet<String> = HashSet::new();
        while let Some(file) = queue.pop_front() {
            let mut was_present: HashSet<String> = self.indices.keys().cloned().collect();
            was_present.insert(file.clone());
            for path in self.scan_file(&file) {
                let follow = !was_present.contains(&path)
                    && !seen.contains(&path)
                    && path.ends_with(SOURCE_EXT)
                    && (!trim || self.follow_when_trimming(&path));
                if follow {
                    queue.push_back(path.clone());
                    seen.insert(path);
                }
            }
        }
    }

    fn follow_when_trimming(&self, path: &str) -> bool {
        !matches!(
            self.provenance.get(path),
            Some(ResolvedFile::System { .. } | ResolvedFile::Builtin { .. })
        )
    }

    /// Finalizes the graph after all roots have been added: extracts cycles
    /// until none remain, then flattens them into [`NodeSet`]s.
    pub fn build(&mut self) {
        assert!(!self.finalized, "Trying to mutate a final graph.");
        while let Some(edges) = self.find_cycle() {
            self.extract_cycle(&edges);
        }
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for idx in indices {
            if let Node::Cycle(cycle) = &self.graph[idx] {
                let set = NodeSet::from_cycle(cycle);
                self.graph[idx] = Node::Set(set);
            }
        }
        self.finalized = true;
    }

    /// Outgoing neighbors in edge insertion order.
    fn out_neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        out.reverse();
        out
    }

    /// First directed cycle reachable in the graph, as an ordered edge list,
    /// or None if the graph is already acyclic.
    fn find_cycle(&self) -> Option<Vec<(NodeIndex, NodeIndex)>> {
        let mut done: HashSet<NodeIndex> = HashSet::new();
        for start in self.graph.node_indices() {
            if done.contains(&start) {
                continue;
            }
            let mut stack: Vec<(NodeIndex, Vec<NodeIndex>)> =
                vec![(start, self.out_neighbors(start))];
            let mut on_path: HashSet<NodeIndex> = HashSet::from([start]);
            while !stack.is_empty() {
                let (node, next) = {
                    let (node, neighbors) = stack.last_mut().expect("stack is non-empty");
                    (*node, neighbors.pop())
                };
                match next {
                    Some(next) if next == node => {
                        return Some(vec![(node, node)]);
                    }
                    Some(next) if on_path.contains(&next) => {
                        let from = stack
                            .iter()
                            .position(|(n, _)| *n == next)
                            .unwrap_or_default();
                        let mut edges: Vec<(NodeIndex, NodeIndex)> = stack[from..]
                            .windows(2)
                            .map(|w| (w[0].0, w[1].0))
                            .collect();
                        edges.push((node, next));
                        return Some(edges);
                    }
                    Some(next) => {
                        if !done.contains(&next) {
                            on_path.insert(next);
                            stack.push((next, self.out_neighbors(next)));
                        }
                    }
                    None => {
                        stack.pop();
                        on_path.remove(&node);
                        done.insert(node);
                    }
                }
            }
        }
        None
    }

    /// Replaces the members of one cycle with a single composite node,
    /// rerouting every crossing edge and dropping the internal ones.
    fn extract_cycle(&mut self, cycle_edges: &[(NodeIndex, NodeIndex)]) {
        let members: Vec<NodeIndex> = cycle_edges.iter().map(|&(tail, _)| tail).collect();
        let member_set: HashSet<NodeIndex> = members.iter().copied().collect();
        let crossing: Vec<(NodeIndex, NodeIndex)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .filter(|(k, v)| member_set.contains(k) != member_set.contains(v))
            .collect();
        let edges: Vec<(Node, Node)> = members
            .iter()
            .enumerate()
            .map(|(i, &tail)| {
                let head = members[(i + 1) % members.len()];
                (self.graph[tail].clone(), self.graph[head].clone())
            })
            .collect();
        let cycle_idx = self.graph.add_node(Node::Cycle(Cycle::new(edges)));
        for (k, v) in crossing {
            if member_set.contains(&k) {
                self.graph.update_edge(cycle_idx, v, ());
            } else {
                self.graph.update_edge(k, cycle_idx, ());
            }
        }
        for idx in members {
            if let Node::File(path) = &self.graph[idx] {
                self.indices.remove(path);
            }
            self.graph.remove_node(idx);
        }
    }

    fn topo_indices(&self) -> Vec<NodeIndex> {
        assert!(self.finalized, "Call build() before using the graph.");
        toposort(&self.graph, None).expect("frozen graph is acyclic")
    }

    /// Targets in topologically sorted order, dependencies first. Each
    /// collapsed component is one group; plain files are singleton groups.
    pub fn sorted_source_files(&self) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        for idx in self.topo_indices() {
            match &self.graph[idx] {
                Node::Set(set) => out.push(set.nodes.clone()),
                Node::File(f) if f.ends_with(SOURCE_EXT) => out.push(vec![f.clone()]),
                // Stub and extension deps carry no source to process.
                _ => {}
            }
        }
        out.reverse();
        out
    }

    /// (target, dependencies) pairs over source nodes, dependents first.
    pub fn deps_list(&self) -> Vec<(Node, Vec<Node>)> {
        self.topo_indices()
            .into_iter()
            .filter(|&idx| self.graph[idx].is_source())
            .map(|idx| {
                let deps = self
                    .out_neighbors(idx)
                    .into_iter()
                    .filter(|&n| self.graph[n].is_source())
                    .map(|n| self.graph[n].clone())
                    .collect();
                (self.graph[idx].clone(), deps)
            })
            .collect()
    }

    /// Union of all unresolved imports across scanned files.
    pub fn get_all_unresolved(&self) -> BTreeSet<ImportStatement> {
        assert!(self.finalized, "Call build() before using the graph.");
        self.broken_deps.values().flatten().cloned().collect()
    }

    /// Every node with its outgoing neighbors, topologically ordered.
    pub fn adjacency(&self) -> Vec<(Node, Vec<Node>)> {
        self.topo_indices()
            .into_iter()
            .map(|idx| {
                let deps = self
                    .out_neighbors(idx)
                    .into_iter()
                    .map(|n| self.graph[n].clone())
                    .collect();
                (self.graph[idx].clone(), deps)
            })
            .collect()
    }

    /// Nodes with no incoming edges, topologically ordered.
    pub fn graph_roots(&self) -> Vec<Node> {
        self.topo_indices()
            .into_iter()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Edges in insertion order, available before and after freeze.
    pub fn edges(&self) -> Vec<(Node, Node)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(k, v)| (self.graph[k].clone(), self.graph[v].clone()))
            .collect()
    }

    pub fn provenance(&self) -> &HashMap<String, ResolvedFile> {
        &self.provenance
    }

    pub fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    pub fn broken_deps(&self) -> &BTreeMap<String, BTreeSet<ImportStatement>> {
        &self.broken_deps
    }

    pub fn unreadable_files(&self) -> &BTreeSet<String> {
        &self.unreadable_files
    }

    pub fn is_final(&self) -> bool {
        self.finalized
    }
}

/// Hook implementation backed by the real extractor and resolver.
pub struct ImportSource {
    env: Environment,
}

impl ImportSource {
    pub fn new(env: Environment) -> Self {
        ImportSource { env }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }
}

impl DependencySource for ImportSource {
    fn file_deps(&self, current: &ResolvedFile, filename: &str) -> Result<FileDeps, ParseError> {
        if filename.starts_with("tar:") {
            // Archive entries are terminal: the node key has no OS path to
            // read imports from.
            return Ok(FileDeps::default());
        }
        let imports = parser::get_imports(std::path::Path::new(filename), self.env.python_version)?;
        let resolver = Resolver::new(&self.env.path, current.clone(), self.env.python_version);
        let mut deps = FileDeps::default();
        for imp in imports {
            match resolver.resolve_import(&imp) {
                Err(_) => deps.unresolved.push(imp),
                Ok(resolved) => {
                    if resolved.is_extension() {
                        continue;
                    }
                    deps.resolved.push((absolutize(resolved.path()), resolved));
                }
            }
        }
        Ok(deps)
    }

    fn source_file_provenance(&self, filename: &str) -> ResolvedFile {
        let module_name = resolve::infer_module_name(filename, &self.env.path);
        ResolvedFile::Direct {
            path: filename.to_string(),
            module_name,
        }
    }
}

/// The dependency graph of a set of Python files.
pub type ImportGraph = DependencyGraph<ImportSource>;

impl DependencyGraph<ImportSource> {
    /// Crawls every root recursively, then freezes the graph.
    pub fn create(env: Environment, filenames: &[String], trim: bool) -> Self {
        let mut graph = DependencyGraph::new(ImportSource::new(env));
        for filename in filenames {
            graph.add_file_recursive(&absolutize(filename), trim);
        }
        graph.build();
        graph
    }

    pub fn env(&self) -> &Environment {
        self.source().env()
    }
}
