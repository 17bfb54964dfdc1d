//! Parsed source units.
//!
//! A [`ParsedUnit`] owns one file's source text and its tree-sitter tree.
//! Script files use the JavaScript/TypeScript grammars; markup files use the
//! HTML grammar. Everything downstream sees the tree through [`NodeHandle`].

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tree_sitter::{Language, Parser, Tree};

use super::node::NodeHandle;

/// Errors that can occur while loading and parsing a source file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {path}")]
    Parse { path: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Language type for file analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
    Html,
}

impl SourceLanguage {
    /// Determine language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            "jsx" => Some(SourceLanguage::Jsx),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            "html" | "htm" => Some(SourceLanguage::Html),
            _ => None,
        }
    }

    /// Determine language from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns true for markup (DOM) sources.
    pub fn is_markup(&self) -> bool {
        matches!(self, SourceLanguage::Html)
    }

    /// Returns true for sources that may contain JSX.
    pub fn allows_jsx(&self) -> bool {
        matches!(
            self,
            SourceLanguage::JavaScript | SourceLanguage::Jsx | SourceLanguage::Tsx
        )
    }

    /// Get tree-sitter language for this source language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => {
                tree_sitter_javascript::LANGUAGE.into()
            }
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            SourceLanguage::Html => tree_sitter_html::LANGUAGE.into(),
        }
    }
}

/// A file's parsed root plus its path and source text.
pub struct ParsedUnit {
    path: PathBuf,
    source: String,
    language: SourceLanguage,
    tree: Tree,
}

impl std::fmt::Debug for ParsedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedUnit")
            .field("path", &self.path)
            .field("language", &self.language)
            .field("bytes", &self.source.len())
            .finish()
    }
}

impl ParsedUnit {
    /// Parse source text that is already in memory.
    pub fn parse(
        path: impl Into<PathBuf>,
        source: impl Into<String>,
        language: SourceLanguage,
    ) -> Result<Self, ParseError> {
        let path = path.into();
        let source = source.into();

        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|_| ParseError::LanguageInit)?;

        let tree = parser.parse(&source, None).ok_or_else(|| ParseError::Parse {
            path: path.display().to_string(),
        })?;

        Ok(Self {
            path,
            source,
            language,
            tree,
        })
    }

    /// Read and parse a file, picking the grammar from its extension.
    pub fn from_file(path: &Path) -> Result<Self, ParseError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let language = SourceLanguage::from_extension(ext)
            .ok_or_else(|| ParseError::UnsupportedFileType(ext.to_string()))?;

        let content = fs::read_to_string(path)?;
        Self::parse(path, content, language)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    /// The root node of the tree.
    pub fn root(&self) -> NodeHandle<'_> {
        NodeHandle::new(self.tree.root_node(), self.language.is_markup())
    }

    /// Extract the source text covered by a node.
    pub fn text<'a>(&'a self, node: &NodeHandle<'_>) -> &'a str {
        self.source.get(node.range().start..node.range().end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(
            SourceLanguage::from_extension("mjs"),
            Some(SourceLanguage::JavaScript)
        );
        assert_eq!(SourceLanguage::from_extension("TSX"), Some(SourceLanguage::Tsx));
        assert_eq!(SourceLanguage::from_extension("htm"), Some(SourceLanguage::Html));
        assert_eq!(SourceLanguage::from_extension("css"), None);
    }

    #[test]
    fn test_parse_script_root() {
        let unit = ParsedUnit::parse("a.js", "foo();", SourceLanguage::JavaScript).unwrap();
        assert_eq!(unit.root().kind(), NodeKind::Program);
        assert_eq!(unit.text(&unit.root()), "foo();");
    }

    #[test]
    fn test_parse_markup_root() {
        let unit = ParsedUnit::parse("a.html", "<p>hi</p>", SourceLanguage::Html).unwrap();
        assert_eq!(unit.root().kind(), NodeKind::Document);
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let result = ParsedUnit::from_file(Path::new("styles.css"));
        assert!(matches!(result, Err(ParseError::UnsupportedFileType(_))));
    }
}
