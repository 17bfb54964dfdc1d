//! Records produced by extraction and consumed by resolution.

use std::fmt;

use crate::tree::SourceRange;

/// Key of a default export.
pub const DEFAULT_EXPORT: &str = "default";

/// Imported name recorded for namespace bindings.
pub const NAMESPACE_EXPORT: &str = "*";

/// A statically evaluated expression.
///
/// Anything whose literal value cannot be known without running the code is
/// `Complex`, carrying the raw source text so it can be redacted wherever it
/// appears verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
    Complex(String),
}

impl Value {
    pub fn is_complex(&self) -> bool {
        matches!(self, Value::Complex(_))
    }

    /// Literal text of a statically known value, if it has one.
    pub fn literal_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Null => Some("null".to_string()),
            Value::Undefined => Some("undefined".to_string()),
            Value::Complex(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Complex(raw) => write!(f, "{}", raw),
            other => write!(f, "{}", other.literal_text().unwrap_or_default()),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One hop of an access path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessSegment {
    String(String),
    /// A computed key whose value is not statically known.
    Opaque(String),
}

impl AccessSegment {
    pub fn text(&self) -> &str {
        match self {
            AccessSegment::String(s) | AccessSegment::Opaque(s) => s,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, AccessSegment::Opaque(_))
    }
}

/// A named attribute on an element usage.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A property read such as `tokens.color.red`, or an identifier read.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenUsage {
    pub name: String,
    pub access_path: Vec<AccessSegment>,
    pub range: SourceRange,
}

/// A call such as `lib.format(value, "short")`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallUsage {
    pub name: String,
    pub access_path: Vec<AccessSegment>,
    pub arguments: Vec<Value>,
    /// From the start of the call through the end of its callee.
    pub range: SourceRange,
}

/// A JSX element such as `<Button kind="primary">`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementUsage {
    pub name: String,
    pub namespace_prefix: Option<String>,
    pub attributes: Vec<Attribute>,
    pub range: SourceRange,
}

/// A custom element tag such as `<cds-button>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomElementUsage {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

/// A concrete occurrence of something that may come from the instrumented package.
#[derive(Debug, Clone, PartialEq)]
pub enum UsageSite {
    Token(TokenUsage),
    Call(CallUsage),
    Element(ElementUsage),
    CustomElement(CustomElementUsage),
}

/// Discriminant of a [`UsageSite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageKind {
    Token,
    Call,
    Element,
    CustomElement,
}

impl UsageSite {
    pub fn kind(&self) -> UsageKind {
        match self {
            UsageSite::Token(_) => UsageKind::Token,
            UsageSite::Call(_) => UsageKind::Call,
            UsageSite::Element(_) => UsageKind::Element,
            UsageSite::CustomElement(_) => UsageKind::CustomElement,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            UsageSite::Token(t) => &t.name,
            UsageSite::Call(c) => &c.name,
            UsageSite::Element(e) => &e.name,
            UsageSite::CustomElement(e) => &e.name,
        }
    }

    /// The access path of the usage. Element names like `Lib.Button` are
    /// split on `.`; a custom element's path is its tag name.
    pub fn access_path(&self) -> Vec<AccessSegment> {
        match self {
            UsageSite::Token(t) => t.access_path.clone(),
            UsageSite::Call(c) => c.access_path.clone(),
            UsageSite::Element(e) => e
                .name
                .split('.')
                .map(|s| AccessSegment::String(s.to_string()))
                .collect(),
            UsageSite::CustomElement(e) => vec![AccessSegment::String(e.name.clone())],
        }
    }

    pub fn range(&self) -> Option<SourceRange> {
        match self {
            UsageSite::Token(t) => Some(t.range),
            UsageSite::Call(c) => Some(c.range),
            UsageSite::Element(e) => Some(e.range),
            UsageSite::CustomElement(_) => None,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            UsageSite::Element(e) => &e.attributes,
            UsageSite::CustomElement(e) => &e.attributes,
            _ => &[],
        }
    }
}

/// An import resolved from a CDN script URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CdnImport {
    pub package: String,
    pub version: String,
    pub is_latest: bool,
    /// Component inferred from the script's file name; `None` for whole-library bundles.
    pub component: Option<String>,
    pub url: String,
}

/// One name bound by an import-like declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportBinding {
    /// Name exported by the module: the original name, `default`, `*`, or
    /// empty for side-effect imports.
    pub name: String,
    pub module_path: String,
    /// Local alias when it differs from `name`.
    pub rename: Option<String>,
    pub is_default: bool,
    pub is_namespace: bool,
    pub is_side_effect: bool,
    pub cdn: Option<CdnImport>,
}

impl ImportBinding {
    fn base(name: impl Into<String>, module_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module_path: module_path.into(),
            rename: None,
            is_default: false,
            is_namespace: false,
            is_side_effect: false,
            cdn: None,
        }
    }

    /// `import { name } from 'module'`
    pub fn named(name: impl Into<String>, module_path: impl Into<String>) -> Self {
        Self::base(name, module_path)
    }

    /// `import { name as alias } from 'module'`
    pub fn renamed(
        name: impl Into<String>,
        alias: impl Into<String>,
        module_path: impl Into<String>,
    ) -> Self {
        Self {
            rename: Some(alias.into()),
            ..Self::base(name, module_path)
        }
    }

    /// `import local from 'module'` or `import { default as local } from 'module'`
    pub fn default_import(local: impl Into<String>, module_path: impl Into<String>) -> Self {
        Self {
            rename: Some(local.into()),
            is_default: true,
            ..Self::base(DEFAULT_EXPORT, module_path)
        }
    }

    /// `import * as local from 'module'`
    pub fn namespace(local: impl Into<String>, module_path: impl Into<String>) -> Self {
        Self {
            rename: Some(local.into()),
            is_namespace: true,
            ..Self::base(NAMESPACE_EXPORT, module_path)
        }
    }

    /// `import 'module'`
    pub fn side_effect(module_path: impl Into<String>) -> Self {
        Self {
            is_side_effect: true,
            ..Self::base("", module_path)
        }
    }

    /// The name this binding is visible under in the importing file.
    pub fn local_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }
}

/// What a usage resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedImport {
    Binding(ImportBinding),
    Cdn(CdnImport),
}

impl ResolvedImport {
    /// The module specifier (or CDN package) the usage came from.
    pub fn module_path(&self) -> &str {
        match self {
            ResolvedImport::Binding(b) => &b.module_path,
            ResolvedImport::Cdn(c) => &c.package,
        }
    }
}

/// A usage paired with the import that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedUsage {
    pub usage: UsageSite,
    pub import: ResolvedImport,
}
