//! Per-file aggregate filled in by the extractors.

use std::path::PathBuf;

use super::model::{CdnImport, ImportBinding, ResolvedUsage, UsageSite};

/// Everything extracted from one file.
///
/// A fresh accumulator is created at the start of a file's analysis and
/// dropped once its usages have been captured.
#[derive(Debug, Default)]
pub struct Accumulator {
    pub imports: Vec<ImportBinding>,
    pub tokens: Vec<UsageSite>,
    pub functions: Vec<UsageSite>,
    pub elements: Vec<UsageSite>,
    pub resolved: Vec<ResolvedUsage>,

    /// `src` attributes of `<script>` tags (markup scopes only).
    pub script_sources: Vec<String>,
    /// Imports resolved from CDN script URLs (markup scopes only).
    pub cdn_imports: Vec<CdnImport>,
    /// Same-origin scripts already folded into this accumulator.
    pub followed_scripts: Vec<PathBuf>,

    markup: bool,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An accumulator for a markup-flavored scope.
    pub fn for_markup() -> Self {
        Self {
            markup: true,
            ..Self::default()
        }
    }

    pub fn is_markup(&self) -> bool {
        self.markup
    }

    pub fn add_import(&mut self, binding: ImportBinding) {
        self.imports.push(binding);
    }

    /// Total number of captured usage sites.
    pub fn usage_count(&self) -> usize {
        self.tokens.len() + self.functions.len() + self.elements.len()
    }
}
