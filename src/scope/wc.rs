//! Custom elements (web components) in HTML pages and JSX.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::analysis::{
    follow_script_sources, import_handlers, jsx_custom_element_handlers, markup_element_handlers,
    markup_import_handlers, resolve_accumulator, Accumulator, AggregatorMap, UsageSite,
};
use crate::relevance::find_installed_package;
use crate::tree::{dispatch, ParsedUnit, SourceLanguage};

use super::{run_files, Allowlists, FileScope, MetricSink, Scope, ScopeContext};

pub const ELEMENT_METRIC: &str = "wc.element";

/// Collects custom element tags.
///
/// Pages usually load components through side-effect imports of a
/// package's `index` aggregators, so those imports are expanded against the
/// installed copy of the package before tags are matched to components.
#[derive(Debug, Default)]
pub struct WcScope {
    aggregators: Mutex<HashMap<PathBuf, Arc<AggregatorMap>>>,
}

impl WcScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregators of the installed package nearest to `file`.
    fn aggregators_for(&self, ctx: &ScopeContext<'_>, file: &Path) -> Arc<AggregatorMap> {
        let package = &ctx.filter.package().name;
        let start = file.parent().unwrap_or(ctx.root);
        let dir = match find_installed_package(start, ctx.root, package) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::debug!(file = %file.display(), error = %e, "no installed copy to expand aggregators from");
                return Arc::new(AggregatorMap::new());
            }
        };

        let mut cache = self
            .aggregators
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .entry(dir.clone())
            .or_insert_with(|| Arc::new(AggregatorMap::build(&dir, package)))
            .clone()
    }
}

impl FileScope for WcScope {
    fn accepts(&self, language: SourceLanguage) -> bool {
        language.is_markup() || language.allows_jsx()
    }

    fn analyze(&self, ctx: &ScopeContext<'_>, unit: &ParsedUnit) -> Accumulator {
        // Markup mode records side-effect imports, which JSX files need too.
        let mut acc = Accumulator::for_markup();
        if ctx.config.wc.as_ref().and_then(|wc| wc.elements.as_ref()).is_none() {
            return acc;
        }

        if unit.language().is_markup() {
            dispatch(unit, unit.root(), &markup_import_handlers(), &mut acc);
            dispatch(unit, unit.root(), &markup_element_handlers(), &mut acc);
            follow_script_sources(unit.path(), &mut acc);
        } else {
            dispatch(unit, unit.root(), &import_handlers(), &mut acc);
            dispatch(unit, unit.root(), &jsx_custom_element_handlers(), &mut acc);
        }

        if !acc.elements.is_empty() {
            let aggregators = self.aggregators_for(ctx, unit.path());
            acc.imports = aggregators.expand_bindings(std::mem::take(&mut acc.imports));
        }

        resolve_accumulator(&mut acc, &ctx.filter.package().name);
        acc
    }

    fn metric_name(&self, _usage: &UsageSite) -> &'static str {
        ELEMENT_METRIC
    }

    fn allowlists<'c>(&self, ctx: &'c ScopeContext<'_>) -> Allowlists<'c> {
        match ctx.config.wc.as_ref().and_then(|wc| wc.elements.as_ref()) {
            Some(elements) => Allowlists {
                attribute_names: &elements.allowed_attribute_names,
                attribute_values: &elements.allowed_attribute_string_values,
                ..Allowlists::default()
            },
            None => Allowlists::default(),
        }
    }
}

impl Scope for WcScope {
    fn name(&self) -> &'static str {
        "wc"
    }

    #[tracing::instrument(name = "wc_scope", skip_all)]
    fn run(&self, ctx: &ScopeContext<'_>, sink: &dyn MetricSink) -> usize {
        run_files(self, ctx, sink)
    }
}
