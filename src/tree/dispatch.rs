//! Depth-first handler dispatch.
//!
//! [`dispatch`] walks every node of a unit once, pre-order. When the
//! [`HandlerMap`] has an entry for a node's kind the handler runs; the walk
//! then descends into the node's children whether or not a handler matched,
//! so independent usages nested under a matched node are still seen.

use std::collections::HashMap;

use thiserror::Error;

use super::node::{NodeHandle, NodeKind};
use super::unit::{ParseError, ParsedUnit};

/// Failure of a single handler on a single node.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// An otherwise matched node lacks a child the handler needs.
    #[error("{kind:?} at line {line} has no {expected}")]
    MissingChild {
        kind: NodeKind,
        expected: &'static str,
        line: usize,
    },

    #[error("Failed to parse embedded source: {0}")]
    Embedded(#[from] ParseError),
}

impl HandlerError {
    pub fn missing(node: &NodeHandle<'_>, expected: &'static str) -> Self {
        HandlerError::MissingChild {
            kind: node.kind(),
            expected,
            line: node.line(),
        }
    }
}

/// A node handler: inspects one node and records what it finds.
pub type Handler<A> = fn(&ParsedUnit, NodeHandle<'_>, &mut A) -> Result<(), HandlerError>;

/// Table of handlers keyed by node kind, one handler per kind.
pub struct HandlerMap<A> {
    handlers: HashMap<NodeKind, Handler<A>>,
}

impl<A> Default for HandlerMap<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> HandlerMap<A> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for `kind`, replacing any previous one.
    pub fn with(mut self, kind: NodeKind, handler: Handler<A>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn get(&self, kind: NodeKind) -> Option<Handler<A>> {
        self.handlers.get(&kind).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Walk `root` depth-first, pre-order, invoking matching handlers.
///
/// A failing handler is logged and its node skipped; the walk continues.
pub fn dispatch<A>(
    unit: &ParsedUnit,
    root: NodeHandle<'_>,
    handlers: &HandlerMap<A>,
    accumulator: &mut A,
) {
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(handler) = handlers.get(node.kind()) {
            if let Err(e) = handler(unit, node, accumulator) {
                tracing::debug!(
                    file = %unit.path().display(),
                    kind = ?node.kind(),
                    error = %e,
                    "handler failed, node skipped"
                );
            }
        }

        let mut children = node.children();
        children.reverse();
        stack.extend(children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SourceLanguage;

    fn record(unit: &ParsedUnit, node: NodeHandle<'_>, seen: &mut Vec<String>) -> Result<(), HandlerError> {
        seen.push(unit.text(&node).to_string());
        Ok(())
    }

    fn fail(_: &ParsedUnit, node: NodeHandle<'_>, _: &mut Vec<String>) -> Result<(), HandlerError> {
        Err(HandlerError::missing(&node, "anything"))
    }

    #[test]
    fn test_dispatch_visits_nested_matches_in_preorder() {
        let unit =
            ParsedUnit::parse("a.js", "a(b(c()));", SourceLanguage::JavaScript).unwrap();
        let map = HandlerMap::new().with(NodeKind::CallExpression, record);
        let mut seen = Vec::new();

        dispatch(&unit, unit.root(), &map, &mut seen);

        assert_eq!(seen, vec!["a(b(c()))", "b(c())", "c()"]);
    }

    #[test]
    fn test_dispatch_visits_each_node_once() {
        let unit = ParsedUnit::parse("a.js", "x.y.z;", SourceLanguage::JavaScript).unwrap();
        let map = HandlerMap::new().with(NodeKind::Identifier, record);
        let mut seen = Vec::new();

        dispatch(&unit, unit.root(), &map, &mut seen);

        assert_eq!(seen, vec!["x"]);
    }

    #[test]
    fn test_failing_handler_does_not_abort_walk() {
        let unit = ParsedUnit::parse("a.js", "a(); b();", SourceLanguage::JavaScript).unwrap();
        let map = HandlerMap::new()
            .with(NodeKind::CallExpression, fail)
            .with(NodeKind::Identifier, record);
        let mut seen = Vec::new();

        dispatch(&unit, unit.root(), &map, &mut seen);

        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_map_matches_nothing() {
        let unit = ParsedUnit::parse("a.js", "a();", SourceLanguage::JavaScript).unwrap();
        let map: HandlerMap<Vec<String>> = HandlerMap::new();
        let mut seen = Vec::new();

        dispatch(&unit, unit.root(), &map, &mut seen);

        assert!(map.is_empty());
        assert!(seen.is_empty());
    }
}
