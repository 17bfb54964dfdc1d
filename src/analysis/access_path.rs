//! Access-path reconstruction for property and element access chains.

use crate::tree::{NodeHandle, NodeKind, ParsedUnit};

use super::model::AccessSegment;
use super::values::value_of;

/// Build the access path of an expression, left to right as written.
///
/// The receiver chain is walked from the outermost hop inward; calls in the
/// chain contribute no segment of their own, only their callee's. Computed
/// keys that are not literals become [`AccessSegment::Opaque`].
///
/// `a.b["c"].d()` yields `["a", "b", "c", "d"]`.
pub fn access_path(unit: &ParsedUnit, node: NodeHandle<'_>) -> Vec<AccessSegment> {
    let mut segments = Vec::new();
    let mut current = Some(node);

    while let Some(node) = current {
        current = match node.kind() {
            NodeKind::MemberExpression => {
                if let Some(property) = node.child_by_field("property") {
                    segments.push(AccessSegment::String(unit.text(&property).to_string()));
                }
                node.child_by_field("object")
            }
            NodeKind::SubscriptExpression => {
                if let Some(index) = node.child_by_field("index") {
                    let value = value_of(unit, index);
                    segments.push(match value.literal_text() {
                        Some(text) => AccessSegment::String(text),
                        None => AccessSegment::Opaque(unit.text(&index).to_string()),
                    });
                }
                node.child_by_field("object")
            }
            NodeKind::CallExpression => node.child_by_field("function"),
            NodeKind::NewExpression => node.child_by_field("constructor"),
            NodeKind::ParenthesizedExpression | NodeKind::NonNullExpression => {
                node.named_children().into_iter().next()
            }
            NodeKind::Identifier
            | NodeKind::PropertyIdentifier
            | NodeKind::This => {
                segments.push(AccessSegment::String(unit.text(&node).to_string()));
                None
            }
            _ => {
                segments.push(AccessSegment::Opaque(unit.text(&node).to_string()));
                None
            }
        };
    }

    segments.reverse();
    segments
}
