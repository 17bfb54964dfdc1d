//! Token and function-call extraction.
//!
//! A property or element access is only captured at the outermost node of
//! its chain: when it is the receiver of another access or the callee of a
//! call, the enclosing node captures it instead. Calls are always captured,
//! so `foo().bar()` yields two calls that deduplication later narrows.

use crate::tree::{HandlerError, HandlerMap, NodeHandle, NodeKind, ParsedUnit, SourceRange};

use super::access_path::access_path;
use super::accumulator::Accumulator;
use super::model::{CallUsage, TokenUsage, UsageSite, Value};
use super::values::value_of;

/// Handlers that fill [`Accumulator::tokens`].
pub fn token_handlers() -> HandlerMap<Accumulator> {
    HandlerMap::new()
        .with(NodeKind::MemberExpression, handle_access)
        .with(NodeKind::SubscriptExpression, handle_access)
        .with(NodeKind::Identifier, handle_identifier)
}

/// Handlers that fill [`Accumulator::functions`].
pub fn function_handlers() -> HandlerMap<Accumulator> {
    HandlerMap::new()
        .with(NodeKind::CallExpression, handle_call)
        .with(NodeKind::NewExpression, handle_call)
}

/// Returns true if an enclosing access or call will capture this node.
fn is_wrapped(node: NodeHandle<'_>) -> bool {
    let mut inner = node;
    while let Some(parent) = inner.parent() {
        match parent.kind() {
            NodeKind::ParenthesizedExpression | NodeKind::NonNullExpression => inner = parent,
            NodeKind::MemberExpression | NodeKind::SubscriptExpression => {
                return inner.is_field_of_parent("object")
            }
            NodeKind::CallExpression => return inner.is_field_of_parent("function"),
            NodeKind::NewExpression => return inner.is_field_of_parent("constructor"),
            NodeKind::JsxOpeningElement
            | NodeKind::JsxClosingElement
            | NodeKind::JsxSelfClosingElement
            | NodeKind::NestedIdentifier => return true,
            _ => return false,
        }
    }
    false
}

fn handle_access(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    acc: &mut Accumulator,
) -> Result<(), HandlerError> {
    if is_wrapped(node) {
        return Ok(());
    }

    acc.tokens.push(UsageSite::Token(TokenUsage {
        name: unit.text(&node).to_string(),
        access_path: access_path(unit, node),
        range: node.range(),
    }));
    Ok(())
}

/// Returns true if an identifier is being declared or bound rather than read.
fn is_binding_position(node: NodeHandle<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };

    let binding_parent = matches!(
        parent.kind(),
        NodeKind::ImportClause
            | NodeKind::ImportSpecifier
            | NodeKind::NamespaceImport
            | NodeKind::ExportSpecifier
            | NodeKind::ObjectPattern
            | NodeKind::PairPattern
            | NodeKind::ArrayPattern
            | NodeKind::RestPattern
            | NodeKind::FormalParameters
            | NodeKind::JsxAttribute
            | NodeKind::JsxNamespaceName
            | NodeKind::LabeledStatement
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
    );

    binding_parent
        || ["name", "parameter", "alias", "label", "pattern"]
            .iter()
            .any(|field| node.is_field_of_parent(field))
        || (parent.kind() == NodeKind::AssignmentPattern && node.is_field_of_parent("left"))
}

fn handle_identifier(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    acc: &mut Accumulator,
) -> Result<(), HandlerError> {
    if is_wrapped(node) || is_binding_position(node) {
        return Ok(());
    }

    let name = unit.text(&node);
    if name == "undefined" {
        return Ok(());
    }

    acc.tokens.push(UsageSite::Token(TokenUsage {
        name: name.to_string(),
        access_path: access_path(unit, node),
        range: node.range(),
    }));
    Ok(())
}

fn handle_call(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    acc: &mut Accumulator,
) -> Result<(), HandlerError> {
    let callee_field = if node.kind() == NodeKind::NewExpression {
        "constructor"
    } else {
        "function"
    };
    let callee = node
        .child_by_field(callee_field)
        .ok_or_else(|| HandlerError::missing(&node, callee_field))?;

    let name = unit.text(&callee);
    if matches!(name, "import" | "require" | "super") {
        return Ok(());
    }

    acc.functions.push(UsageSite::Call(CallUsage {
        name: name.to_string(),
        access_path: access_path(unit, callee),
        arguments: call_arguments(unit, node),
        range: SourceRange::new(node.range().start, callee.range().end),
    }));
    Ok(())
}

fn call_arguments(unit: &ParsedUnit, node: NodeHandle<'_>) -> Vec<Value> {
    let Some(arguments) = node.child_by_field("arguments") else {
        return Vec::new();
    };

    match arguments.kind() {
        // Tagged template: lib.css`...`
        NodeKind::TemplateString => vec![value_of(unit, arguments)],
        _ => arguments
            .named_children()
            .into_iter()
            .filter(|a| a.raw().kind() != "comment")
            .map(|a| value_of(unit, a))
            .collect(),
    }
}
