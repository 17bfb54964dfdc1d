//! Per-file task runner.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::graph::InstallingPackage;

use super::metric::Metric;

/// How file tasks are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Every file on the rayon pool; completion order is unspecified.
    #[default]
    Concurrent,
    /// One file at a time, in input order.
    Sequential,
}

/// A relevant file and the packages through which it reaches the
/// instrumented package.
pub type FileTask = (PathBuf, Vec<InstallingPackage>);

/// Run `analyze` over every task and wait for all of them to settle.
///
/// A failing task is logged and contributes nothing; the others are
/// unaffected.
pub fn settle_all<F>(tasks: &[FileTask], mode: RunMode, analyze: F) -> Vec<Metric>
where
    F: Fn(&FileTask) -> anyhow::Result<Vec<Metric>> + Sync,
{
    match mode {
        RunMode::Concurrent => tasks
            .par_iter()
            .filter_map(|task| match analyze(task) {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    tracing::error!(file = %task.0.display(), error = %e, "file analysis failed");
                    None
                }
            })
            .flatten()
            .collect(),
        RunMode::Sequential => {
            let mut all_metrics = Vec::new();
            for task in tasks {
                match analyze(task) {
                    Ok(metrics) => all_metrics.extend(metrics),
                    Err(e) => {
                        tracing::error!(file = %task.0.display(), error = %e, "file analysis failed")
                    }
                }
            }
            all_metrics
        }
    }
}
