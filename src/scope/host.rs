//! Running every enabled scope over a project.

use std::path::Path;

use crate::command::CommandBridge;
use crate::config::CollectConfig;
use crate::files::source_files;
use crate::relevance::RelevanceFilter;
use crate::session::Session;

use super::{JsScope, JsxScope, MetricSink, NpmScope, RunMode, Scope, ScopeContext, WcScope};

/// Scopes switched on by `config`, in collection order.
pub fn enabled_scopes(config: &CollectConfig) -> Vec<Box<dyn Scope>> {
    let mut scopes: Vec<Box<dyn Scope>> = Vec::new();
    if config.npm {
        scopes.push(Box::new(NpmScope));
    }
    if config.js.is_some() {
        scopes.push(Box::new(JsScope));
    }
    if config.jsx.is_some() {
        scopes.push(Box::new(JsxScope));
    }
    if config.wc.is_some() {
        scopes.push(Box::new(WcScope::new()));
    }
    scopes
}

/// Collect metrics for the package in `cwd` across the project at `root`.
///
/// Returns the number of metrics captured. Failures never abort the run:
/// a project that does not install the package at its exact version
/// yields nothing, and a failing file only loses its own metrics.
#[tracing::instrument(skip(config, bridge, sink))]
pub fn collect(
    cwd: &Path,
    root: &Path,
    config: &CollectConfig,
    mode: RunMode,
    bridge: &dyn CommandBridge,
    sink: &dyn MetricSink,
) -> usize {
    let session = Session::new();
    let filter = match RelevanceFilter::load(cwd, root, &session.trees, bridge) {
        Ok(filter) => filter,
        Err(e) => {
            tracing::error!(error = %e, "nothing collected");
            return 0;
        }
    };

    let files = source_files(root);
    let ctx = ScopeContext {
        root,
        files: &files,
        config,
        filter: &filter,
        session: &session,
        mode,
    };

    let mut total = 0;
    for scope in enabled_scopes(config) {
        let captured = scope.run(&ctx, sink);
        tracing::info!(scope = scope.name(), metrics = captured, "scope finished");
        total += captured;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_enabled_scopes_follow_config() {
        let config = Config::from_json(r#"{"collect": {"npm": {}, "wc": {}}}"#).unwrap();
        let names: Vec<_> = enabled_scopes(&config.collect)
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["npm", "wc"]);

        assert!(enabled_scopes(&CollectConfig::default()).is_empty());
    }
}
