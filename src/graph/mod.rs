//! Graph module for installed dependency trees.
//!
//! This module provides the [`DependencyTree`] struct, a petgraph-backed
//! view of `npm ls --all --json` output used to find which packages install
//! the instrumented package at an exact version.
//!
//! # Example
//!
//! ```rust
//! use usagescope::graph::{DependencyNode, DependencyTree};
//!
//! let mut tree = DependencyTree::new(DependencyNode::new("app", "1.0.0"));
//! let kit = tree.add_child(tree.root(), DependencyNode::new("ui-kit", "2.0.0"));
//! tree.add_child(kit, DependencyNode::new("icons", "1.0.1"));
//!
//! assert_eq!(tree.len(), 3);
//! assert_eq!(tree.find_installers(tree.root(), "icons", "1.0.1")[0].name, "ui-kit");
//! ```

mod dependency_tree;

pub use dependency_tree::{DependencyNode, DependencyTree, InstallingPackage, TreeError};
