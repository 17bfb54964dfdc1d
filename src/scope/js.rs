//! Tokens and function calls in script sources.

use crate::analysis::{
    dedupe_functions, dedupe_tokens, function_handlers, import_handlers, resolve_accumulator,
    token_handlers, Accumulator, UsageKind, UsageSite,
};
use crate::tree::{dispatch, ParsedUnit, SourceLanguage};

use super::{run_files, Allowlists, FileScope, MetricSink, Scope, ScopeContext};

pub const TOKEN_METRIC: &str = "js.token";
pub const FUNCTION_METRIC: &str = "js.function";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsScope;

impl FileScope for JsScope {
    fn accepts(&self, language: SourceLanguage) -> bool {
        !language.is_markup()
    }

    fn analyze(&self, ctx: &ScopeContext<'_>, unit: &ParsedUnit) -> Accumulator {
        let mut acc = Accumulator::new();
        let Some(js) = ctx.config.js.as_ref() else {
            return acc;
        };

        dispatch(unit, unit.root(), &import_handlers(), &mut acc);
        if js.tokens {
            dispatch(unit, unit.root(), &token_handlers(), &mut acc);
        }
        // Calls are needed to prune tokens read off call results even when
        // they are not reported themselves.
        dispatch(unit, unit.root(), &function_handlers(), &mut acc);

        let raw_functions = std::mem::take(&mut acc.functions);
        acc.tokens = dedupe_tokens(std::mem::take(&mut acc.tokens), &raw_functions);
        if js.functions.is_some() {
            acc.functions = dedupe_functions(raw_functions);
        }

        resolve_accumulator(&mut acc, &ctx.filter.package().name);
        acc
    }

    fn metric_name(&self, usage: &UsageSite) -> &'static str {
        match usage.kind() {
            UsageKind::Call => FUNCTION_METRIC,
            _ => TOKEN_METRIC,
        }
    }

    fn allowlists<'c>(&self, ctx: &'c ScopeContext<'_>) -> Allowlists<'c> {
        let argument_values = ctx
            .config
            .js
            .as_ref()
            .and_then(|js| js.functions.as_ref())
            .map(|f| f.allowed_argument_string_values.as_slice())
            .unwrap_or_default();
        Allowlists {
            argument_values,
            ..Allowlists::default()
        }
    }
}

impl Scope for JsScope {
    fn name(&self) -> &'static str {
        "js"
    }

    #[tracing::instrument(name = "js_scope", skip_all)]
    fn run(&self, ctx: &ScopeContext<'_>, sink: &dyn MetricSink) -> usize {
        run_files(self, ctx, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::graph::{DependencyNode, DependencyTree};
    use crate::parser::PackageIdentity;
    use crate::relevance::RelevanceFilter;
    use crate::scope::RunMode;
    use crate::session::Session;

    const SOURCE: &str = "import { colors, format } from 'lib';\nconst a = colors.red;\nconst b = format().trim;\n";

    fn resolved(config: &str) -> Vec<String> {
        let config = Config::from_json(config).unwrap();
        let filter = RelevanceFilter::new(
            Path::new("/project"),
            PackageIdentity::new("lib", "1.0.0"),
            Arc::new(DependencyTree::new(DependencyNode::new("app", "0.1.0"))),
        );
        let session = Session::new();
        let ctx = ScopeContext {
            root: Path::new("/project"),
            files: &[],
            config: &config.collect,
            filter: &filter,
            session: &session,
            mode: RunMode::Sequential,
        };
        let unit = ParsedUnit::parse("/project/a.js", SOURCE, SourceLanguage::JavaScript).unwrap();

        JsScope
            .analyze(&ctx, &unit)
            .resolved
            .iter()
            .map(|r| format!("{}:{}", JsScope.metric_name(&r.usage), r.usage.name()))
            .collect()
    }

    #[test]
    fn test_tokens_off_call_results_are_pruned_without_reporting_calls() {
        assert_eq!(resolved(r#"{"collect": {"js": {"tokens": null}}}"#), vec!["js.token:colors.red"]);
    }

    #[test]
    fn test_tokens_and_functions() {
        assert_eq!(
            resolved(r#"{"collect": {"js": {"tokens": null, "functions": {}}}}"#),
            vec!["js.token:colors.red", "js.function:format"]
        );
    }

    #[test]
    fn test_functions_only() {
        assert_eq!(
            resolved(r#"{"collect": {"js": {"functions": {}}}}"#),
            vec!["js.function:format"]
        );
    }
}
