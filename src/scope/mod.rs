//! Collection scopes.
//!
//! A scope selects the files it understands, analyses each relevant one in
//! its own task and hands every resolved usage to a [`MetricSink`]:
//!
//! - [`JsScope`]: tokens and function calls in script sources
//! - [`JsxScope`]: JSX elements
//! - [`WcScope`]: custom elements in HTML pages and JSX
//! - [`NpmScope`]: one metric per package installing the instrumented one

mod attributes;
mod host;
mod js;
mod jsx;
mod metric;
mod npm;
mod runner;
mod wc;

use std::path::{Path, PathBuf};

use crate::analysis::{Accumulator, UsageSite};
use crate::config::CollectConfig;
use crate::relevance::RelevanceFilter;
use crate::session::Session;
use crate::tree::{ParsedUnit, SourceLanguage};

pub use attributes::{
    dependency_attributes, exported_path, import_kind, key, usage_attributes, usage_metrics,
    Allowlists, ACCESS_PATH, ARGUMENTS, ATTRIBUTE_NAMES, ATTRIBUTE_VALUES, CDN_IS_LATEST,
    CDN_VERSION, DEFAULT_NAME, DEPENDENCY_NAME, DEPENDENCY_VERSION, HASHED, IMPORT_KIND,
    INSTALLER_NAME, INSTALLER_VERSION, MODULE_SPECIFIER, NAME,
};
pub use host::{collect, enabled_scopes};
pub use js::JsScope;
pub use jsx::JsxScope;
pub use metric::{AttributeValue, Attributes, JsonLinesSink, MemorySink, Metric, MetricSink};
pub use npm::NpmScope;
pub use runner::{settle_all, FileTask, RunMode};
pub use wc::WcScope;

/// What every scope sees during one run.
pub struct ScopeContext<'a> {
    pub root: &'a Path,
    /// Candidate files; each scope picks the ones it can analyse.
    pub files: &'a [PathBuf],
    pub config: &'a CollectConfig,
    pub filter: &'a RelevanceFilter,
    pub session: &'a Session,
    pub mode: RunMode,
}

/// A unit of collection.
pub trait Scope: Send + Sync {
    fn name(&self) -> &'static str;

    /// Capture this scope's metrics into `sink`, returning how many.
    fn run(&self, ctx: &ScopeContext<'_>, sink: &dyn MetricSink) -> usize;
}

/// A scope that analyses source files one at a time.
pub trait FileScope: Send + Sync {
    fn accepts(&self, language: SourceLanguage) -> bool;

    /// Extract and resolve the usages of one file.
    fn analyze(&self, ctx: &ScopeContext<'_>, unit: &ParsedUnit) -> Accumulator;

    /// Metric name for a resolved usage.
    fn metric_name(&self, usage: &UsageSite) -> &'static str;

    fn allowlists<'c>(&self, ctx: &'c ScopeContext<'_>) -> Allowlists<'c>;
}

/// Run a [`FileScope`] over the relevant files of `ctx`.
///
/// Metrics of one file are only captured once the whole file has been
/// analysed, so a failing file contributes nothing.
pub fn run_files<S: FileScope>(scope: &S, ctx: &ScopeContext<'_>, sink: &dyn MetricSink) -> usize {
    let candidates: Vec<PathBuf> = ctx
        .files
        .iter()
        .filter(|f| SourceLanguage::from_path(f).is_some_and(|l| scope.accepts(l)))
        .cloned()
        .collect();
    let tasks = ctx.filter.relevant_files(&candidates);
    tracing::debug!(
        candidates = candidates.len(),
        relevant = tasks.len(),
        "files selected"
    );

    let package = ctx.filter.package();
    let allow = scope.allowlists(ctx);
    let metrics = settle_all(&tasks, ctx.mode, |(path, installers)| {
        let unit = ParsedUnit::from_file(path)?;
        let acc = scope.analyze(ctx, &unit);
        Ok(acc
            .resolved
            .iter()
            .flat_map(|resolved| {
                usage_metrics(
                    scope.metric_name(&resolved.usage),
                    resolved,
                    package,
                    installers,
                    allow,
                    &ctx.session.substitutions,
                )
            })
            .collect())
    });

    let count = metrics.len();
    for metric in metrics {
        sink.capture(metric);
    }
    count
}
