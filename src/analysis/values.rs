//! Static evaluation of literal expressions.

use crate::tree::{NodeHandle, NodeKind, ParsedUnit};

use super::model::Value;

/// Evaluate an expression node to a [`Value`].
///
/// Literals evaluate to themselves; anything else becomes
/// [`Value::Complex`] carrying the raw source text.
pub fn value_of(unit: &ParsedUnit, node: NodeHandle<'_>) -> Value {
    let text = unit.text(&node);

    match node.kind() {
        NodeKind::String => Value::String(unquote(text)),
        NodeKind::TemplateString => {
            if node.child_of_kind(NodeKind::TemplateSubstitution).is_some() {
                Value::Complex(text.to_string())
            } else {
                Value::String(text.trim_matches('`').to_string())
            }
        }
        NodeKind::Number => parse_number(text)
            .map(Value::Number)
            .unwrap_or_else(|| Value::Complex(text.to_string())),
        NodeKind::True => Value::Boolean(true),
        NodeKind::False => Value::Boolean(false),
        NodeKind::Null => Value::Null,
        NodeKind::Undefined => Value::Undefined,
        NodeKind::Identifier if text == "undefined" => Value::Undefined,
        NodeKind::UnaryExpression => negative_number(unit, node)
            .map(Value::Number)
            .unwrap_or_else(|| Value::Complex(text.to_string())),
        NodeKind::ParenthesizedExpression => match node.named_children().first() {
            Some(inner) => value_of(unit, *inner),
            None => Value::Complex(text.to_string()),
        },
        _ => Value::Complex(text.to_string()),
    }
}

/// Remove surrounding quotes (single, double, or backticks).
pub fn unquote(text: &str) -> String {
    text.trim_start_matches(['"', '\'', '`'])
        .trim_end_matches(['"', '\'', '`'])
        .to_string()
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace('_', "");
    let lower = cleaned.to_lowercase();

    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return i64::from_str_radix(bin, 2).ok().map(|n| n as f64);
    }
    if let Some(oct) = lower.strip_prefix("0o") {
        return i64::from_str_radix(oct, 8).ok().map(|n| n as f64);
    }
    lower.trim_end_matches('n').parse::<f64>().ok()
}

fn negative_number(unit: &ParsedUnit, node: NodeHandle<'_>) -> Option<f64> {
    let operator = node.child_by_field("operator")?;
    let argument = node.child_by_field("argument")?;
    if unit.text(&operator) != "-" || argument.kind() != NodeKind::Number {
        return None;
    }
    parse_number(unit.text(&argument)).map(|n| -n)
}
