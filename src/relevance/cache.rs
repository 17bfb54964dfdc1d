//! Memoized dependency-tree listings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::command::CommandBridge;
use crate::graph::DependencyTree;

use super::error::RelevanceError;

pub const LIST_COMMAND: &str = "npm ls --all --json";

type Loaded = Result<Arc<DependencyTree>, RelevanceError>;
type Slots = HashMap<(PathBuf, PathBuf), Arc<OnceLock<Loaded>>>;

/// Dependency trees keyed by `(cwd, root)`.
///
/// Each key is loaded at most once, and a failed load is cached like a
/// successful one: asking again with the same key returns the same error.
#[derive(Debug, Default)]
pub struct DependencyTreeCache {
    entries: Mutex<Slots>,
}

impl DependencyTreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys requested so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The tree listed in `root`, loading it on first request.
    #[tracing::instrument(level = "debug", skip(self, bridge))]
    pub fn get_or_load(&self, cwd: &Path, root: &Path, bridge: &dyn CommandBridge) -> Loaded {
        let slot = {
            let mut entries = self.lock();
            entries
                .entry((cwd.to_path_buf(), root.to_path_buf()))
                .or_default()
                .clone()
        };

        slot.get_or_init(|| load(root, bridge).map(Arc::new)).clone()
    }
}

fn load(root: &Path, bridge: &dyn CommandBridge) -> Result<DependencyTree, RelevanceError> {
    let output = bridge.run(LIST_COMMAND, root)?;

    // npm exits non-zero for peer problems but still prints the tree.
    if output.stdout.trim().is_empty() {
        return Err(RelevanceError::Command(format!(
            "`{}` exited with {}: {}",
            LIST_COMMAND,
            output.exit_code,
            output.stderr.trim()
        )));
    }
    if !output.success() {
        tracing::debug!(exit_code = output.exit_code, "dependency listing reported problems");
    }

    Ok(DependencyTree::from_npm_ls_json(&output.stdout)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandError, CommandOutput};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBridge {
        stdout: &'static str,
        calls: AtomicUsize,
    }

    impl CommandBridge for CountingBridge {
        fn run(&self, _command: &str, _cwd: &Path) -> Result<CommandOutput, CommandError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CommandOutput {
                stdout: self.stdout.to_string(),
                stderr: "npm ERR! missing".to_string(),
                exit_code: 1,
            })
        }
    }

    #[test]
    fn test_tree_is_loaded_once_per_key() {
        let bridge = CountingBridge {
            stdout: r#"{"name": "app", "version": "1.0.0"}"#,
            calls: AtomicUsize::new(0),
        };
        let cache = DependencyTreeCache::new();

        let a = cache.get_or_load(Path::new("/w"), Path::new("/r"), &bridge).unwrap();
        let b = cache.get_or_load(Path::new("/w"), Path::new("/r"), &bridge).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(bridge.calls.load(Ordering::SeqCst), 1);

        cache.get_or_load(Path::new("/w"), Path::new("/other"), &bridge).unwrap();
        assert_eq!(bridge.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failure_is_cached() {
        let bridge = CountingBridge {
            stdout: "",
            calls: AtomicUsize::new(0),
        };
        let cache = DependencyTreeCache::new();

        let first = cache.get_or_load(Path::new("/w"), Path::new("/r"), &bridge).unwrap_err();
        let second = cache.get_or_load(Path::new("/w"), Path::new("/r"), &bridge).unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(first, RelevanceError::Command(_)));
        assert_eq!(bridge.calls.load(Ordering::SeqCst), 1);
    }
}
