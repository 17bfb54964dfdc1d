//! Per-file relevance decisions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use petgraph::graph::NodeIndex;

use crate::command::CommandBridge;
use crate::files::normalize;
use crate::graph::{DependencyTree, InstallingPackage};
use crate::parser::{self, PackageIdentity};

use super::cache::DependencyTreeCache;
use super::dirs::{find_package_dir, PACKAGE_JSON};
use super::error::RelevanceError;

pub const IDENTITY_COMMAND: &str = "npm pkg get name version";

/// Decides which files can see the instrumented package at its exact version.
///
/// Results are memoized per package directory, so every file under the same
/// `package.json` costs one tree search.
#[derive(Debug)]
pub struct RelevanceFilter {
    root: PathBuf,
    package: PackageIdentity,
    tree: Arc<DependencyTree>,
    by_package_dir: Mutex<HashMap<PathBuf, Result<Vec<InstallingPackage>, RelevanceError>>>,
}

impl RelevanceFilter {
    /// Load the instrumented package's identity (from `cwd`) and the
    /// project's dependency tree (from `root`).
    #[tracing::instrument(level = "debug", skip(cache, bridge))]
    pub fn load(
        cwd: &Path,
        root: &Path,
        cache: &DependencyTreeCache,
        bridge: &dyn CommandBridge,
    ) -> Result<Self, RelevanceError> {
        let output = bridge.run(IDENTITY_COMMAND, cwd)?;
        if !output.success() {
            return Err(RelevanceError::Command(format!(
                "`{}` exited with {}: {}",
                IDENTITY_COMMAND,
                output.exit_code,
                output.stderr.trim()
            )));
        }
        let package = parser::identity(&parser::parse_str(&output.stdout)?)?;

        let tree = cache.get_or_load(cwd, root, bridge)?;
        tracing::debug!(package = %package, "instrumented package identified");
        Ok(Self::new(root, package, tree))
    }

    pub fn new(root: &Path, package: PackageIdentity, tree: Arc<DependencyTree>) -> Self {
        Self {
            root: normalize(root),
            package,
            tree,
            by_package_dir: Mutex::new(HashMap::new()),
        }
    }

    /// The instrumented package.
    pub fn package(&self) -> &PackageIdentity {
        &self.package
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Packages installing the instrumented package, as seen from the root.
    pub fn project_installers(&self) -> Vec<InstallingPackage> {
        self.tree
            .find_installers(self.tree.root(), &self.package.name, &self.package.version)
    }

    /// Packages through which `file` reaches the instrumented package.
    ///
    /// Fails with `NoInstallationFound` when the package is not reachable at
    /// the required version from any ancestor of the file's package.
    pub fn installers_for_file(
        &self,
        file: &Path,
    ) -> Result<Vec<InstallingPackage>, RelevanceError> {
        let package_dir = find_package_dir(file, &self.root)?;
        if let Some(cached) = self.memo().get(&package_dir) {
            return cached.clone();
        }

        // Manifest reads and the tree search run unlocked; concurrent misses
        // for one directory compute the same answer and the first insert wins.
        let computed = self.installers_for_package_dir(&package_dir);
        self.memo()
            .entry(package_dir)
            .or_insert(computed)
            .clone()
    }

    fn memo(
        &self,
    ) -> MutexGuard<'_, HashMap<PathBuf, Result<Vec<InstallingPackage>, RelevanceError>>> {
        self.by_package_dir
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of package directories already decided.
    pub fn memoized_dirs(&self) -> usize {
        self.memo().len()
    }

    fn installers_for_package_dir(
        &self,
        package_dir: &Path,
    ) -> Result<Vec<InstallingPackage>, RelevanceError> {
        let node = self.locate(package_dir)?;
        let installers = self
            .tree
            .find_installers(node, &self.package.name, &self.package.version);

        if installers.is_empty() {
            return Err(RelevanceError::NoInstallationFound {
                package: self.package.to_string(),
                path: package_dir.display().to_string(),
            });
        }
        tracing::debug!(
            dir = %package_dir.display(),
            installers = installers.len(),
            "package directory is relevant"
        );
        Ok(installers)
    }

    /// Node of the package that owns `package_dir`.
    fn locate(&self, package_dir: &Path) -> Result<NodeIndex, RelevanceError> {
        if package_dir == self.root {
            return Ok(self.tree.root());
        }

        let manifest = parser::parse_file(&package_dir.join(PACKAGE_JSON))?;
        let name = manifest.name.unwrap_or_default();
        let found = match manifest.version.as_deref() {
            Some(version) => self.tree.find(&name, version),
            None => self.tree.find_named(&name),
        };

        found.ok_or_else(|| RelevanceError::NoInstallationFound {
            package: self.package.to_string(),
            path: package_dir.display().to_string(),
        })
    }

    /// Pair each relevant file with its installers, logging and dropping
    /// the rest.
    pub fn relevant_files(&self, files: &[PathBuf]) -> Vec<(PathBuf, Vec<InstallingPackage>)> {
        files
            .iter()
            .filter_map(|file| match self.installers_for_file(file) {
                Ok(installers) => Some((file.clone(), installers)),
                Err(e) => {
                    tracing::debug!(file = %file.display(), error = %e, "file skipped");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandError, CommandOutput};
    use std::fs;

    const LISTING: &str = r#"{
        "name": "app",
        "version": "0.1.0",
        "dependencies": {
            "ui": { "version": "1.0.0" },
            "web": {
                "version": "2.0.0",
                "dependencies": {
                    "shell": {
                        "version": "3.0.0",
                        "dependencies": { "ui": { "version": "1.0.1" } }
                    }
                }
            },
            "docs": { "version": "0.0.1" }
        }
    }"#;

    struct FakeNpm;

    impl CommandBridge for FakeNpm {
        fn run(&self, command: &str, _cwd: &Path) -> Result<CommandOutput, CommandError> {
            let stdout = match command {
                IDENTITY_COMMAND => r#"{"name": "ui", "version": "1.0.1"}"#,
                _ => LISTING,
            };
            Ok(CommandOutput {
                stdout: stdout.to_string(),
                ..CommandOutput::default()
            })
        }
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("packages/web/src")).unwrap();
        fs::create_dir_all(root.join("packages/docs")).unwrap();
        fs::write(root.join("package.json"), r#"{"name": "app", "version": "0.1.0"}"#).unwrap();
        fs::write(
            root.join("packages/web/package.json"),
            r#"{"name": "web", "version": "2.0.0"}"#,
        )
        .unwrap();
        fs::write(
            root.join("packages/docs/package.json"),
            r#"{"name": "docs", "version": "0.0.1"}"#,
        )
        .unwrap();
        dir
    }

    fn filter(root: &Path) -> RelevanceFilter {
        RelevanceFilter::load(root, root, &DependencyTreeCache::new(), &FakeNpm).unwrap()
    }

    #[test]
    fn test_load_identifies_package() {
        let dir = project();
        let filter = filter(dir.path());
        assert_eq!(filter.package(), &PackageIdentity::new("ui", "1.0.1"));
    }

    #[test]
    fn test_exact_version_found_below_package() {
        let dir = project();
        let filter = filter(dir.path());
        let installers = filter
            .installers_for_file(&dir.path().join("packages/web/src/app.js"))
            .unwrap();
        assert_eq!(installers.len(), 1);
        assert_eq!(installers[0].name, "shell");
    }

    #[test]
    fn test_root_files_search_from_tree_root() {
        let dir = project();
        let filter = filter(dir.path());
        let installers = filter
            .installers_for_file(&dir.path().join("src/index.js"))
            .unwrap();
        assert_eq!(installers[0].name, "shell");
        assert_eq!(filter.project_installers(), installers);
    }

    #[test]
    fn test_sibling_package_climbs_to_root() {
        let dir = project();
        let filter = filter(dir.path());
        let installers = filter
            .installers_for_file(&dir.path().join("packages/docs/readme.js"))
            .unwrap();
        assert_eq!(installers[0].name, "shell");
    }

    #[test]
    fn test_unknown_package_is_not_relevant() {
        let dir = project();
        fs::create_dir_all(dir.path().join("packages/ghost")).unwrap();
        fs::write(
            dir.path().join("packages/ghost/package.json"),
            r#"{"name": "ghost", "version": "1.0.0"}"#,
        )
        .unwrap();

        let filter = filter(dir.path());
        let err = filter
            .installers_for_file(&dir.path().join("packages/ghost/a.js"))
            .unwrap_err();
        assert!(matches!(err, RelevanceError::NoInstallationFound { .. }));
    }

    #[test]
    fn test_relevant_files_drops_failures() {
        let dir = project();
        let filter = filter(dir.path());
        let files = vec![
            dir.path().join("src/a.js"),
            PathBuf::from("/outside/root.js"),
        ];
        let relevant = filter.relevant_files(&files);
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].0, dir.path().join("src/a.js"));
    }

    #[test]
    fn test_parallel_lookups_share_one_answer_per_package_dir() {
        use rayon::prelude::*;

        let dir = project();
        let filter = filter(dir.path());
        let files: Vec<PathBuf> = (0..64)
            .map(|i| {
                let sub = if i % 2 == 0 { "src" } else { "packages/web/src" };
                dir.path().join(sub).join(format!("f{}.js", i))
            })
            .collect();

        let names: Vec<String> = files
            .par_iter()
            .map(|file| filter.installers_for_file(file).unwrap()[0].name.clone())
            .collect();

        assert!(names.iter().all(|name| name == "shell"));
        assert_eq!(filter.memoized_dirs(), 2);
    }
}
