//! Extraction from markup (HTML) trees.
//!
//! Custom element tags become [`UsageSite::CustomElement`] records.
//! `<script>` tags contribute their `src` to the accumulator's script
//! sources, and inline module bodies are parsed as JavaScript so their
//! imports join the page's bindings.

use crate::tree::{
    dispatch, HandlerError, HandlerMap, NodeHandle, NodeKind, ParsedUnit, SourceLanguage,
};

use super::accumulator::Accumulator;
use super::elements::is_custom_element_name;
use super::imports::import_handlers;
use super::model::{Attribute, CustomElementUsage, UsageSite, Value};

/// Handlers that collect script sources and inline-script imports.
pub fn markup_import_handlers() -> HandlerMap<Accumulator> {
    HandlerMap::new().with(NodeKind::ScriptElement, handle_script_element)
}

/// Handlers that capture custom element tags.
pub fn markup_element_handlers() -> HandlerMap<Accumulator> {
    HandlerMap::new().with(NodeKind::Element, handle_element)
}

fn tag_of<'t>(node: NodeHandle<'t>) -> Option<NodeHandle<'t>> {
    node.child_of_kind(NodeKind::StartTag)
        .or_else(|| node.child_of_kind(NodeKind::SelfClosingTag))
}

fn handle_element(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    acc: &mut Accumulator,
) -> Result<(), HandlerError> {
    let tag = tag_of(node).ok_or_else(|| HandlerError::missing(&node, "start tag"))?;
    let name = tag
        .child_of_kind(NodeKind::TagName)
        .ok_or_else(|| HandlerError::missing(&tag, "tag name"))?;
    let name = unit.text(&name).to_lowercase();

    if !is_custom_element_name(&name) {
        return Ok(());
    }

    acc.elements.push(UsageSite::CustomElement(CustomElementUsage {
        name,
        attributes: markup_attributes(unit, tag),
    }));
    Ok(())
}

fn handle_script_element(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    acc: &mut Accumulator,
) -> Result<(), HandlerError> {
    let tag = tag_of(node).ok_or_else(|| HandlerError::missing(&node, "start tag"))?;

    let src = markup_attributes(unit, tag)
        .into_iter()
        .find(|a| a.name.eq_ignore_ascii_case("src"))
        .and_then(|a| match a.value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        });
    if let Some(src) = src {
        acc.script_sources.push(src);
    }

    if let Some(body) = node.child_of_kind(NodeKind::RawText) {
        let body = unit.text(&body);
        if !body.trim().is_empty() {
            let inline = ParsedUnit::parse(unit.path(), body, SourceLanguage::JavaScript)?;
            dispatch(&inline, inline.root(), &import_handlers(), acc);
        }
    }

    Ok(())
}

fn markup_attributes(unit: &ParsedUnit, tag: NodeHandle<'_>) -> Vec<Attribute> {
    tag.children()
        .into_iter()
        .filter(|c| c.kind() == NodeKind::Attribute)
        .filter_map(|attr| match markup_attribute(unit, attr) {
            Ok(attribute) => Some(attribute),
            Err(e) => {
                tracing::debug!(file = %unit.path().display(), error = %e, "attribute dropped");
                None
            }
        })
        .collect()
}

fn markup_attribute(unit: &ParsedUnit, attr: NodeHandle<'_>) -> Result<Attribute, HandlerError> {
    let name = attr
        .child_of_kind(NodeKind::AttributeName)
        .ok_or_else(|| HandlerError::missing(&attr, "attribute name"))?;

    let value = if let Some(quoted) = attr.child_of_kind(NodeKind::QuotedAttributeValue) {
        quoted
            .child_of_kind(NodeKind::AttributeValue)
            .map(|v| unit.text(&v).to_string())
            .unwrap_or_default()
    } else if let Some(bare) = attr.child_of_kind(NodeKind::AttributeValue) {
        unit.text(&bare).to_string()
    } else {
        String::new()
    };

    Ok(Attribute::new(unit.text(&name), Value::String(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::ImportBinding;

    fn extract(source: &str) -> Accumulator {
        let unit = ParsedUnit::parse("index.html", source, SourceLanguage::Html).unwrap();
        let mut acc = Accumulator::for_markup();
        dispatch(&unit, unit.root(), &markup_import_handlers(), &mut acc);
        dispatch(&unit, unit.root(), &markup_element_handlers(), &mut acc);
        acc
    }

    #[test]
    fn test_custom_elements_and_attributes() {
        let acc = extract(
            r#"<main><cds-button kind="primary" disabled>Go</cds-button><div class="x"></div></main>"#,
        );
        assert_eq!(acc.elements.len(), 1);
        let UsageSite::CustomElement(button) = &acc.elements[0] else {
            panic!("expected custom element");
        };
        assert_eq!(button.name, "cds-button");
        assert_eq!(
            button.attributes,
            vec![
                Attribute::new("kind", Value::String("primary".to_string())),
                Attribute::new("disabled", Value::String(String::new())),
            ]
        );
    }

    #[test]
    fn test_script_sources_are_collected() {
        let acc = extract(
            r#"<head><script type="module" src="https://cdn.jsdelivr.net/npm/@carbon/web-components@2.1.0/dist/button.min.js"></script><script src="./app.js"></script></head>"#,
        );
        assert_eq!(
            acc.script_sources,
            vec![
                "https://cdn.jsdelivr.net/npm/@carbon/web-components@2.1.0/dist/button.min.js",
                "./app.js"
            ]
        );
    }

    #[test]
    fn test_inline_module_imports() {
        let acc = extract(
            r#"<script type="module">import '@carbon/web-components/es/components/button/index.js';</script>"#,
        );
        assert_eq!(
            acc.imports,
            vec![ImportBinding::side_effect(
                "@carbon/web-components/es/components/button/index.js"
            )]
        );
    }
}
