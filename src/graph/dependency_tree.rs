//! Installed dependency tree built on petgraph.
//!
//! The tree mirrors the nesting reported by `npm ls --all --json`: every
//! occurrence of a package is its own node, so the same name can appear at
//! several depths with different versions. Edges point from a package to the
//! dependencies installed beneath it.

use std::collections::{BTreeMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Deserialize;

/// Errors raised while reading a dependency listing.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Failed to parse dependency listing: {0}")]
    Json(#[from] serde_json::Error),
}

/// One installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    /// Package name (e.g., "@carbon/react")
    pub name: String,
    /// Installed version; empty when the listing omits it (missing packages)
    pub version: String,
}

impl DependencyNode {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Returns true if this node is `name` at exactly `version`.
    pub fn is(&self, name: &str, version: &str) -> bool {
        self.name == name && self.version == version
    }
}

/// A package that installs the instrumented package directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallingPackage {
    pub name: String,
    pub version: String,
    /// `(name, version)` of every dependency installed beneath it.
    pub dependencies: Vec<(String, String)>,
}

/// Raw shape of one `npm ls --json` entry.
#[derive(Debug, Deserialize)]
struct ListingEntry {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, ListingEntry>,
}

/// A rooted tree of installed packages.
///
/// # Example
///
/// ```rust
/// use usagescope::graph::DependencyTree;
///
/// let json = r#"{
///     "name": "app",
///     "version": "1.0.0",
///     "dependencies": {
///         "ui-kit": {
///             "version": "2.0.0",
///             "dependencies": { "icons": { "version": "1.0.1" } }
///         }
///     }
/// }"#;
///
/// let tree = DependencyTree::from_npm_ls_json(json).unwrap();
/// let installers = tree.find_installers(tree.root(), "icons", "1.0.1");
/// assert_eq!(installers.len(), 1);
/// assert_eq!(installers[0].name, "ui-kit");
/// ```
#[derive(Debug, Clone)]
pub struct DependencyTree {
    graph: DiGraph<DependencyNode, ()>,
    root: NodeIndex,
}

impl DependencyTree {
    /// Creates a tree holding only its root package.
    pub fn new(root: DependencyNode) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(root);
        Self { graph, root }
    }

    /// Parses the output of `npm ls --all --json`.
    ///
    /// # Arguments
    ///
    /// * `json` - The listing as printed by npm
    ///
    /// # Returns
    ///
    /// The tree, or a [`TreeError`] if the listing is not valid JSON.
    pub fn from_npm_ls_json(json: &str) -> Result<Self, TreeError> {
        let entry: ListingEntry = serde_json::from_str(json)?;

        let mut tree = Self::new(DependencyNode::new(
            entry.name.clone().unwrap_or_default(),
            entry.version.clone().unwrap_or_default(),
        ));
        let root = tree.root;
        tree.add_entries(root, entry.dependencies);

        tracing::debug!(packages = tree.len(), "dependency tree parsed");
        Ok(tree)
    }

    fn add_entries(&mut self, parent: NodeIndex, entries: BTreeMap<String, ListingEntry>) {
        let mut pending: Vec<(NodeIndex, String, ListingEntry)> = entries
            .into_iter()
            .map(|(name, entry)| (parent, name, entry))
            .collect();

        while let Some((parent, name, entry)) = pending.pop() {
            let node = DependencyNode::new(name, entry.version.unwrap_or_default());
            let idx = self.add_child(parent, node);
            pending.extend(
                entry
                    .dependencies
                    .into_iter()
                    .map(|(name, child)| (idx, name, child)),
            );
        }
    }

    /// Adds `node` as a dependency installed beneath `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, node: DependencyNode) -> NodeIndex {
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        idx
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Number of package occurrences in the tree, root included.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&DependencyNode> {
        self.graph.node_weight(idx)
    }

    /// The package `idx` is installed beneath; `None` for the root.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .next()
            .map(|edge| edge.source())
    }

    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| edge.target())
            .collect();
        children.sort();
        children
    }

    /// Finds the shallowest occurrence of `name` at `version`.
    pub fn find(&self, name: &str, version: &str) -> Option<NodeIndex> {
        self.find_shallowest(|n| n.is(name, version))
    }

    /// Finds the shallowest occurrence of `name` at any version.
    pub fn find_named(&self, name: &str) -> Option<NodeIndex> {
        self.find_shallowest(|n| n.name == name)
    }

    fn find_shallowest<P>(&self, predicate: P) -> Option<NodeIndex>
    where
        P: Fn(&DependencyNode) -> bool,
    {
        let mut queue = VecDeque::from([self.root]);
        while let Some(idx) = queue.pop_front() {
            if self.node(idx).is_some_and(&predicate) {
                return Some(idx);
            }
            queue.extend(self.children(idx));
        }
        None
    }

    /// Collects every path from `from` down to a descendant matching `predicate`.
    ///
    /// Each path starts at `from` and ends at the match. The search does not
    /// descend below a match.
    pub fn find_paths<P>(&self, from: NodeIndex, predicate: P) -> Vec<Vec<NodeIndex>>
    where
        P: Fn(&DependencyNode) -> bool,
    {
        let mut paths = Vec::new();
        let mut stack = vec![vec![from]];

        while let Some(path) = stack.pop() {
            let Some(&last) = path.last() else {
                continue;
            };
            for child in self.children(last).into_iter().rev() {
                let mut next = path.clone();
                next.push(child);
                if self.node(child).is_some_and(&predicate) {
                    paths.push(next);
                } else {
                    stack.push(next);
                }
            }
        }

        paths
    }

    /// Finds the packages that install `name` at exactly `version`.
    ///
    /// The search starts in the subtree of `from`. When nothing matches
    /// there, it moves up to the parent's subtree and retries, until a match
    /// is found or the root has been searched.
    ///
    /// # Arguments
    ///
    /// * `from` - Node of the package whose files are being analysed
    /// * `name` - Instrumented package name
    /// * `version` - Exact instrumented package version
    pub fn find_installers(
        &self,
        from: NodeIndex,
        name: &str,
        version: &str,
    ) -> Vec<InstallingPackage> {
        let mut current = Some(from);

        while let Some(idx) = current {
            let paths = self.find_paths(idx, |n| n.is(name, version));
            if !paths.is_empty() {
                return self.installers_of(&paths);
            }
            current = self.parent(idx);
        }

        Vec::new()
    }

    fn installers_of(&self, paths: &[Vec<NodeIndex>]) -> Vec<InstallingPackage> {
        let mut seen = HashSet::new();

        paths
            .iter()
            .filter_map(|path| path.len().checked_sub(2).map(|i| path[i]))
            .filter_map(|idx| {
                let node = self.node(idx)?;
                if !seen.insert((node.name.clone(), node.version.clone())) {
                    return None;
                }
                Some(InstallingPackage {
                    name: node.name.clone(),
                    version: node.version.clone(),
                    dependencies: self
                        .children(idx)
                        .into_iter()
                        .filter_map(|c| self.node(c))
                        .map(|c| (c.name.clone(), c.version.clone()))
                        .collect(),
                })
            })
            .collect()
    }
}
