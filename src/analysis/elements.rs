//! JSX element extraction.

use crate::tree::{HandlerError, HandlerMap, NodeHandle, NodeKind, ParsedUnit};

use super::accumulator::Accumulator;
use super::model::{Attribute, CustomElementUsage, ElementUsage, UsageSite, Value};
use super::values::{unquote, value_of};

/// Handlers that capture every JSX element as [`UsageSite::Element`].
pub fn jsx_element_handlers() -> HandlerMap<Accumulator> {
    HandlerMap::new()
        .with(NodeKind::JsxOpeningElement, handle_jsx_element)
        .with(NodeKind::JsxSelfClosingElement, handle_jsx_element)
}

/// Handlers that capture custom-element tags written in JSX.
pub fn jsx_custom_element_handlers() -> HandlerMap<Accumulator> {
    HandlerMap::new()
        .with(NodeKind::JsxOpeningElement, handle_jsx_custom_element)
        .with(NodeKind::JsxSelfClosingElement, handle_jsx_custom_element)
}

/// Returns true for valid custom element names (`cds-button`).
pub fn is_custom_element_name(name: &str) -> bool {
    name.contains('-')
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && !name.chars().any(|c| c.is_ascii_uppercase())
}

/// Split a JSX tag name into `(namespace prefix, name)`.
fn element_name(unit: &ParsedUnit, name: NodeHandle<'_>) -> (Option<String>, String) {
    if name.kind() == NodeKind::JsxNamespaceName {
        let parts = name.named_children();
        if let [prefix, local] = parts.as_slice() {
            return (
                Some(unit.text(prefix).to_string()),
                unit.text(local).to_string(),
            );
        }
    }
    (None, unit.text(&name).to_string())
}

fn handle_jsx_element(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    acc: &mut Accumulator,
) -> Result<(), HandlerError> {
    // Fragments (`<>`) have no name.
    let Some(name_node) = node.child_by_field("name") else {
        return Ok(());
    };
    let (namespace_prefix, name) = element_name(unit, name_node);

    acc.elements.push(UsageSite::Element(ElementUsage {
        name,
        namespace_prefix,
        attributes: jsx_attributes(unit, node),
        range: node.range(),
    }));
    Ok(())
}

fn handle_jsx_custom_element(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    acc: &mut Accumulator,
) -> Result<(), HandlerError> {
    let Some(name_node) = node.child_by_field("name") else {
        return Ok(());
    };
    let name = unit.text(&name_node);
    if !is_custom_element_name(name) {
        return Ok(());
    }

    acc.elements.push(UsageSite::CustomElement(CustomElementUsage {
        name: name.to_string(),
        attributes: jsx_attributes(unit, node),
    }));
    Ok(())
}

/// Attributes of an opening element. An attribute that cannot be read is
/// logged and dropped; the element is kept.
fn jsx_attributes(unit: &ParsedUnit, node: NodeHandle<'_>) -> Vec<Attribute> {
    node.children()
        .into_iter()
        .filter(|c| c.kind() == NodeKind::JsxAttribute)
        .filter_map(|attr| match jsx_attribute(unit, attr) {
            Ok(attribute) => Some(attribute),
            Err(e) => {
                tracing::debug!(file = %unit.path().display(), error = %e, "attribute dropped");
                None
            }
        })
        .collect()
}

fn jsx_attribute(unit: &ParsedUnit, attr: NodeHandle<'_>) -> Result<Attribute, HandlerError> {
    let parts = attr.named_children();
    let name = parts
        .first()
        .ok_or_else(|| HandlerError::missing(&attr, "name"))?;
    let name = unit.text(name);

    let value = match parts.get(1) {
        None => Value::Boolean(true),
        Some(value) => match value.kind() {
            NodeKind::String => Value::String(unquote(unit.text(value))),
            NodeKind::JsxExpression => {
                let expression = value
                    .named_children()
                    .into_iter()
                    .find(|c| c.raw().kind() != "comment")
                    .ok_or_else(|| HandlerError::missing(value, "expression"))?;
                value_of(unit, expression)
            }
            _ => Value::Complex(unit.text(value).to_string()),
        },
    };

    Ok(Attribute::new(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{dispatch, SourceLanguage};

    fn elements_of(source: &str) -> Vec<UsageSite> {
        let unit = ParsedUnit::parse("test.jsx", source, SourceLanguage::Jsx).unwrap();
        let mut acc = Accumulator::new();
        dispatch(&unit, unit.root(), &jsx_element_handlers(), &mut acc);
        acc.elements
    }

    fn element(usage: &UsageSite) -> &ElementUsage {
        match usage {
            UsageSite::Element(e) => e,
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_element_with_attributes() {
        let elements =
            elements_of(r#"const a = <Button kind="primary" size={2} disabled onClick={go} />;"#);
        assert_eq!(elements.len(), 1);
        let button = element(&elements[0]);
        assert_eq!(button.name, "Button");
        assert_eq!(
            button.attributes,
            vec![
                Attribute::new("kind", Value::String("primary".to_string())),
                Attribute::new("size", Value::Number(2.0)),
                Attribute::new("disabled", Value::Boolean(true)),
                Attribute::new("onClick", Value::Complex("go".to_string())),
            ]
        );
    }

    #[test]
    fn test_nested_elements_are_each_captured() {
        let elements = elements_of("const a = <Tile><Button>Go</Button></Tile>;");
        let names: Vec<_> = elements.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Tile", "Button"]);
    }

    #[test]
    fn test_member_element_name() {
        let elements = elements_of("const a = <Lib.Button />;");
        assert_eq!(element(&elements[0]).name, "Lib.Button");
    }

    #[test]
    fn test_empty_expression_attribute_is_dropped() {
        let elements = elements_of("const a = <Button kind={} size=\"sm\" />;");
        let button = element(&elements[0]);
        assert_eq!(
            button.attributes,
            vec![Attribute::new("size", Value::String("sm".to_string()))]
        );
    }

    #[test]
    fn test_fragments_are_skipped() {
        assert!(elements_of("const a = <></>;").is_empty());
    }

    #[test]
    fn test_custom_elements_in_jsx() {
        let unit = ParsedUnit::parse(
            "test.jsx",
            r#"const a = <div><cds-button kind="ghost" /></div>;"#,
            SourceLanguage::Jsx,
        )
        .unwrap();
        let mut acc = Accumulator::for_markup();
        dispatch(&unit, unit.root(), &jsx_custom_element_handlers(), &mut acc);
        assert_eq!(acc.elements.len(), 1);
        assert_eq!(acc.elements[0].name(), "cds-button");
    }

    #[test]
    fn test_custom_element_name_rules() {
        assert!(is_custom_element_name("cds-button"));
        assert!(!is_custom_element_name("button"));
        assert!(!is_custom_element_name("Cds-Button"));
    }
}
