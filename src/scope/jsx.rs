//! JSX elements.

use crate::analysis::{
    import_handlers, jsx_element_handlers, resolve_accumulator, Accumulator, UsageSite,
};
use crate::tree::{dispatch, ParsedUnit, SourceLanguage};

use super::{run_files, Allowlists, FileScope, MetricSink, Scope, ScopeContext};

pub const ELEMENT_METRIC: &str = "jsx.element";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsxScope;

impl FileScope for JsxScope {
    fn accepts(&self, language: SourceLanguage) -> bool {
        language.allows_jsx()
    }

    fn analyze(&self, ctx: &ScopeContext<'_>, unit: &ParsedUnit) -> Accumulator {
        let mut acc = Accumulator::new();
        if ctx.config.jsx.as_ref().and_then(|jsx| jsx.elements.as_ref()).is_none() {
            return acc;
        }

        dispatch(unit, unit.root(), &import_handlers(), &mut acc);
        dispatch(unit, unit.root(), &jsx_element_handlers(), &mut acc);
        resolve_accumulator(&mut acc, &ctx.filter.package().name);
        acc
    }

    fn metric_name(&self, _usage: &UsageSite) -> &'static str {
        ELEMENT_METRIC
    }

    fn allowlists<'c>(&self, ctx: &'c ScopeContext<'_>) -> Allowlists<'c> {
        match ctx.config.jsx.as_ref().and_then(|jsx| jsx.elements.as_ref()) {
            Some(elements) => Allowlists {
                attribute_names: &elements.allowed_attribute_names,
                attribute_values: &elements.allowed_attribute_string_values,
                ..Allowlists::default()
            },
            None => Allowlists::default(),
        }
    }
}

impl Scope for JsxScope {
    fn name(&self) -> &'static str {
        "jsx"
    }

    #[tracing::instrument(name = "jsx_scope", skip_all)]
    fn run(&self, ctx: &ScopeContext<'_>, sink: &dyn MetricSink) -> usize {
        run_files(self, ctx, sink)
    }
}
