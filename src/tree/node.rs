//! Uniform node view over script and markup trees.

use tree_sitter::Node;

/// Closed set of node kinds the engine cares about.
///
/// Script grammars (JavaScript, TypeScript, TSX) and the HTML grammar name
/// their nodes differently; both are folded into this one enum so handler
/// tables can be keyed without knowing which grammar produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Script trees
    Program,
    ImportStatement,
    ImportClause,
    NamespaceImport,
    NamedImports,
    ImportSpecifier,
    ExportStatement,
    ExportClause,
    ExportSpecifier,
    VariableDeclarator,
    ObjectPattern,
    PairPattern,
    ShorthandPropertyIdentifierPattern,
    ArrayPattern,
    AssignmentPattern,
    RestPattern,
    CallExpression,
    NewExpression,
    Arguments,
    MemberExpression,
    SubscriptExpression,
    ParenthesizedExpression,
    NonNullExpression,
    UnaryExpression,
    SpreadElement,
    Identifier,
    PropertyIdentifier,
    NestedIdentifier,
    This,
    String,
    TemplateString,
    TemplateSubstitution,
    Number,
    True,
    False,
    Null,
    Undefined,
    JsxElement,
    JsxSelfClosingElement,
    JsxOpeningElement,
    JsxClosingElement,
    JsxAttribute,
    JsxExpression,
    JsxNamespaceName,
    FormalParameters,
    LabeledStatement,
    BreakStatement,
    ContinueStatement,

    // Markup trees
    Document,
    Element,
    ScriptElement,
    StartTag,
    SelfClosingTag,
    TagName,
    Attribute,
    AttributeName,
    AttributeValue,
    QuotedAttributeValue,
    RawText,

    /// Any node kind no handler is keyed on.
    Other,
}

impl NodeKind {
    fn from_script(kind: &str) -> Self {
        match kind {
            "program" => NodeKind::Program,
            "import_statement" => NodeKind::ImportStatement,
            "import_clause" => NodeKind::ImportClause,
            "namespace_import" => NodeKind::NamespaceImport,
            "named_imports" => NodeKind::NamedImports,
            "import_specifier" => NodeKind::ImportSpecifier,
            "export_statement" => NodeKind::ExportStatement,
            "export_clause" => NodeKind::ExportClause,
            "export_specifier" => NodeKind::ExportSpecifier,
            "variable_declarator" => NodeKind::VariableDeclarator,
            "object_pattern" => NodeKind::ObjectPattern,
            "pair_pattern" => NodeKind::PairPattern,
            "shorthand_property_identifier_pattern" => {
                NodeKind::ShorthandPropertyIdentifierPattern
            }
            "array_pattern" => NodeKind::ArrayPattern,
            "assignment_pattern" => NodeKind::AssignmentPattern,
            "rest_pattern" => NodeKind::RestPattern,
            "call_expression" => NodeKind::CallExpression,
            "new_expression" => NodeKind::NewExpression,
            "arguments" => NodeKind::Arguments,
            "member_expression" => NodeKind::MemberExpression,
            "subscript_expression" => NodeKind::SubscriptExpression,
            "parenthesized_expression" => NodeKind::ParenthesizedExpression,
            "non_null_expression" => NodeKind::NonNullExpression,
            "unary_expression" => NodeKind::UnaryExpression,
            "spread_element" => NodeKind::SpreadElement,
            "identifier" => NodeKind::Identifier,
            "property_identifier" => NodeKind::PropertyIdentifier,
            "nested_identifier" => NodeKind::NestedIdentifier,
            "this" => NodeKind::This,
            "string" => NodeKind::String,
            "template_string" => NodeKind::TemplateString,
            "template_substitution" => NodeKind::TemplateSubstitution,
            "number" => NodeKind::Number,
            "true" => NodeKind::True,
            "false" => NodeKind::False,
            "null" => NodeKind::Null,
            "undefined" => NodeKind::Undefined,
            "jsx_element" => NodeKind::JsxElement,
            "jsx_self_closing_element" => NodeKind::JsxSelfClosingElement,
            "jsx_opening_element" => NodeKind::JsxOpeningElement,
            "jsx_closing_element" => NodeKind::JsxClosingElement,
            "jsx_attribute" => NodeKind::JsxAttribute,
            "jsx_expression" => NodeKind::JsxExpression,
            "jsx_namespace_name" => NodeKind::JsxNamespaceName,
            "formal_parameters" => NodeKind::FormalParameters,
            "labeled_statement" => NodeKind::LabeledStatement,
            "break_statement" => NodeKind::BreakStatement,
            "continue_statement" => NodeKind::ContinueStatement,
            _ => NodeKind::Other,
        }
    }

    fn from_markup(kind: &str) -> Self {
        match kind {
            "document" | "fragment" => NodeKind::Document,
            "element" => NodeKind::Element,
            "script_element" => NodeKind::ScriptElement,
            "start_tag" => NodeKind::StartTag,
            "self_closing_tag" => NodeKind::SelfClosingTag,
            "tag_name" => NodeKind::TagName,
            "attribute" => NodeKind::Attribute,
            "attribute_name" => NodeKind::AttributeName,
            "attribute_value" => NodeKind::AttributeValue,
            "quoted_attribute_value" => NodeKind::QuotedAttributeValue,
            "raw_text" => NodeKind::RawText,
            _ => NodeKind::Other,
        }
    }
}

/// Half-open `[start, end)` byte interval in a unit's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns true if `other` lies entirely within this range.
    pub fn contains(&self, other: &SourceRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Adapter over a single tree-sitter node.
///
/// Every concrete node is reachable from exactly one root through
/// [`NodeHandle::children`].
#[derive(Debug, Clone, Copy)]
pub struct NodeHandle<'t> {
    node: Node<'t>,
    markup: bool,
}

impl<'t> NodeHandle<'t> {
    pub(crate) fn new(node: Node<'t>, markup: bool) -> Self {
        Self { node, markup }
    }

    pub fn kind(&self) -> NodeKind {
        if self.markup {
            NodeKind::from_markup(self.node.kind())
        } else {
            NodeKind::from_script(self.node.kind())
        }
    }

    /// All direct children, named and anonymous, in source order.
    pub fn children(&self) -> Vec<NodeHandle<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|child| NodeHandle::new(child, self.markup))
            .collect()
    }

    /// Named children only, in source order.
    pub fn named_children(&self) -> Vec<NodeHandle<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .map(|child| NodeHandle::new(child, self.markup))
            .collect()
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<NodeHandle<'t>> {
        self.children().into_iter().find(|c| c.kind() == kind)
    }

    pub fn child_by_field(&self, field: &str) -> Option<NodeHandle<'t>> {
        self.node
            .child_by_field_name(field)
            .map(|child| NodeHandle::new(child, self.markup))
    }

    pub fn parent(&self) -> Option<NodeHandle<'t>> {
        self.node
            .parent()
            .map(|parent| NodeHandle::new(parent, self.markup))
    }

    /// The underlying tree-sitter node.
    pub fn raw(&self) -> Node<'t> {
        self.node
    }

    pub fn range(&self) -> SourceRange {
        SourceRange::new(self.node.start_byte(), self.node.end_byte())
    }

    pub fn is_same(&self, other: &NodeHandle<'_>) -> bool {
        self.node.id() == other.node.id()
    }

    /// Returns true if this node is the value of `field` on its parent.
    pub fn is_field_of_parent(&self, field: &str) -> bool {
        self.parent()
            .and_then(|p| p.child_by_field(field))
            .is_some_and(|n| n.is_same(self))
    }

    /// 1-indexed line of the node's start.
    pub fn line(&self) -> usize {
        self.node.start_position().row + 1
    }
}
