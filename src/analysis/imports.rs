//! Import binding extraction.
//!
//! Every import-like declaration is run through a fixed list of parsers,
//! each contributing bindings on its own, so `import Lib, { a, b as c }
//! from 'lib'` yields a default binding plus a named and a renamed one.
//! Side-effect imports (`import 'lib/button.js'`) only matter to markup
//! scopes, where they identify custom element definitions.

use crate::tree::{HandlerError, HandlerMap, NodeHandle, NodeKind, ParsedUnit};

use super::accumulator::Accumulator;
use super::model::{ImportBinding, DEFAULT_EXPORT};
use super::values::unquote;

/// Derives bindings from one import declaration.
type ImportParser = fn(&ParsedUnit, NodeHandle<'_>, &str) -> Vec<ImportBinding>;

const STATEMENT_PARSERS: &[ImportParser] = &[parse_default, parse_namespace, parse_named];

/// Handlers that fill [`Accumulator::imports`].
pub fn import_handlers() -> HandlerMap<Accumulator> {
    HandlerMap::new()
        .with(NodeKind::ImportStatement, handle_import_statement)
        .with(NodeKind::CallExpression, handle_import_call)
}

/// Module specifier of an import or re-export statement.
pub fn statement_source(unit: &ParsedUnit, node: NodeHandle<'_>) -> Option<String> {
    node.child_by_field("source")
        .or_else(|| node.child_of_kind(NodeKind::String))
        .map(|s| unquote(unit.text(&s)))
}

fn handle_import_statement(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    acc: &mut Accumulator,
) -> Result<(), HandlerError> {
    let module_path =
        statement_source(unit, node).ok_or_else(|| HandlerError::missing(&node, "source"))?;

    for parser in STATEMENT_PARSERS {
        for binding in parser(unit, node, &module_path) {
            acc.add_import(binding);
        }
    }

    if acc.is_markup() {
        for binding in parse_side_effect(unit, node, &module_path) {
            acc.add_import(binding);
        }
    }

    Ok(())
}

/// `import Lib from 'lib'`
fn parse_default(unit: &ParsedUnit, node: NodeHandle<'_>, module: &str) -> Vec<ImportBinding> {
    let Some(clause) = node.child_of_kind(NodeKind::ImportClause) else {
        return Vec::new();
    };

    clause
        .children()
        .into_iter()
        .filter(|c| c.kind() == NodeKind::Identifier)
        .map(|c| ImportBinding::default_import(unit.text(&c), module))
        .collect()
}

/// `import * as lib from 'lib'`
fn parse_namespace(unit: &ParsedUnit, node: NodeHandle<'_>, module: &str) -> Vec<ImportBinding> {
    let Some(clause) = node.child_of_kind(NodeKind::ImportClause) else {
        return Vec::new();
    };

    clause
        .children()
        .into_iter()
        .filter(|c| c.kind() == NodeKind::NamespaceImport)
        .filter_map(|ns| ns.child_of_kind(NodeKind::Identifier))
        .map(|ident| ImportBinding::namespace(unit.text(&ident), module))
        .collect()
}

/// `import { a, b as c, default as D } from 'lib'`
fn parse_named(unit: &ParsedUnit, node: NodeHandle<'_>, module: &str) -> Vec<ImportBinding> {
    let Some(clause) = node.child_of_kind(NodeKind::ImportClause) else {
        return Vec::new();
    };
    let Some(named) = clause.child_of_kind(NodeKind::NamedImports) else {
        return Vec::new();
    };

    named
        .children()
        .into_iter()
        .filter(|c| c.kind() == NodeKind::ImportSpecifier)
        .filter_map(|specifier| {
            let name = unquote(unit.text(&specifier.child_by_field("name")?));
            let alias = specifier.child_by_field("alias").map(|a| unit.text(&a).to_string());
            Some(binding_for_specifier(name, alias, module))
        })
        .collect()
}

fn binding_for_specifier(name: String, alias: Option<String>, module: &str) -> ImportBinding {
    match alias {
        Some(alias) if name == DEFAULT_EXPORT => ImportBinding::default_import(alias, module),
        Some(alias) if alias != name => ImportBinding::renamed(name, alias, module),
        _ => ImportBinding::named(name, module),
    }
}

/// `import 'lib/button.js'`
fn parse_side_effect(
    _unit: &ParsedUnit,
    node: NodeHandle<'_>,
    module: &str,
) -> Vec<ImportBinding> {
    if node.child_of_kind(NodeKind::ImportClause).is_some() {
        return Vec::new();
    }
    vec![ImportBinding::side_effect(module)]
}

/// `require('lib')` and, in markup scopes, `import('lib/button.js')`.
fn handle_import_call(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    acc: &mut Accumulator,
) -> Result<(), HandlerError> {
    let Some(callee) = node.child_by_field("function") else {
        return Ok(());
    };
    let callee = unit.text(&callee);
    if callee != "require" && callee != "import" {
        return Ok(());
    }

    let arguments = node
        .child_by_field("arguments")
        .ok_or_else(|| HandlerError::missing(&node, "arguments"))?;
    let Some(first) = arguments.named_children().into_iter().next() else {
        return Ok(());
    };
    if first.kind() != NodeKind::String {
        return Ok(());
    }
    let module = unquote(unit.text(&first));

    if callee == "import" {
        if acc.is_markup() {
            acc.add_import(ImportBinding::side_effect(module));
        }
        return Ok(());
    }

    let bindings = require_bindings(unit, node, &module);
    if bindings.is_empty() {
        if acc.is_markup() {
            acc.add_import(ImportBinding::side_effect(module));
        }
    } else {
        for binding in bindings {
            acc.add_import(binding);
        }
    }
    Ok(())
}

/// Bindings declared by `const x = require(...)` or `const { a, b: c } = require(...)`.
fn require_bindings(unit: &ParsedUnit, call: NodeHandle<'_>, module: &str) -> Vec<ImportBinding> {
    let Some(declarator) = call.parent().filter(|p| p.kind() == NodeKind::VariableDeclarator)
    else {
        return Vec::new();
    };
    let Some(name) = declarator.child_by_field("name") else {
        return Vec::new();
    };

    match name.kind() {
        NodeKind::Identifier => vec![ImportBinding::namespace(unit.text(&name), module)],
        NodeKind::ObjectPattern => name
            .named_children()
            .into_iter()
            .filter_map(|property| match property.kind() {
                NodeKind::ShorthandPropertyIdentifierPattern => {
                    Some(ImportBinding::named(unit.text(&property), module))
                }
                NodeKind::PairPattern => {
                    let key = unquote(unit.text(&property.child_by_field("key")?));
                    let value = property.child_by_field("value")?;
                    if value.kind() != NodeKind::Identifier {
                        return None;
                    }
                    Some(binding_for_specifier(
                        key,
                        Some(unit.text(&value).to_string()),
                        module,
                    ))
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
