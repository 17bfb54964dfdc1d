//! Packages installing the instrumented package.

use super::attributes::dependency_attributes;
use super::{Metric, MetricSink, Scope, ScopeContext};

pub const DEPENDENCY_METRIC: &str = "npm.dependency";

/// Emits one metric per package that installs the instrumented package at
/// its exact version, as seen from the project root.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpmScope;

impl Scope for NpmScope {
    fn name(&self) -> &'static str {
        "npm"
    }

    #[tracing::instrument(name = "npm_scope", skip_all)]
    fn run(&self, ctx: &ScopeContext<'_>, sink: &dyn MetricSink) -> usize {
        let package = ctx.filter.package();
        let installers = ctx.filter.project_installers();
        tracing::debug!(package = %package, installers = installers.len(), "installers found");

        for installer in &installers {
            sink.capture(Metric {
                name: DEPENDENCY_METRIC.to_string(),
                attributes: dependency_attributes(package, installer, &ctx.session.substitutions),
            });
        }
        installers.len()
    }
}
