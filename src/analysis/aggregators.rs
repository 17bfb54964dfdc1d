//! Index re-export aggregators of an installed package.
//!
//! Packages that ship custom elements usually offer an `index.js` that
//! pulls in every component (`import './components/button/index.js'` or
//! `export * from './button.js'`). Importing the aggregator defines every
//! element it reaches, so a side-effect import of it is expanded into one
//! synthetic side-effect binding per sub-path.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::files::normalize;
use crate::tree::{dispatch, HandlerError, HandlerMap, NodeHandle, NodeKind, ParsedUnit};

use super::imports::statement_source;
use super::model::ImportBinding;

const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts", "mts"];
const MAX_EXPANSION_DEPTH: usize = 8;

/// Map of aggregator module → module specifiers it re-exports or imports.
#[derive(Debug, Default, Clone)]
pub struct AggregatorMap {
    entries: HashMap<String, Vec<String>>,
}

impl AggregatorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an aggregator by module specifier.
    pub fn insert(&mut self, module_path: &str, sub_paths: Vec<String>) {
        self.entries.insert(module_key(module_path), sub_paths);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scan every `index.*` module under an installed package directory.
    pub fn build(package_dir: &Path, package_name: &str) -> Self {
        let mut map = Self::new();

        for entry in WalkDir::new(package_dir)
            .into_iter()
            .filter_entry(|e| e.file_name() != "node_modules")
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_index_file(path) {
                continue;
            }

            let unit = match ParsedUnit::from_file(path) {
                Ok(unit) => unit,
                Err(e) => {
                    tracing::debug!(file = %path.display(), error = %e, "skipping aggregator");
                    continue;
                }
            };

            let mut sources = Vec::new();
            dispatch(&unit, unit.root(), &reexport_handlers(), &mut sources);

            let index_dir = path.parent().unwrap_or(package_dir);
            let sub_paths: Vec<String> = sources
                .iter()
                .filter_map(|s| to_package_specifier(s, index_dir, package_dir, package_name))
                .collect();
            if sub_paths.is_empty() {
                continue;
            }

            if let Some(specifier) = to_package_specifier(
                &path.to_string_lossy(),
                package_dir,
                package_dir,
                package_name,
            ) {
                map.insert(&specifier, sub_paths);
            }
        }

        tracing::debug!(package = package_name, aggregators = map.len(), "aggregator map built");
        map
    }

    /// Sub-paths reached from `module_path`, following nested aggregators.
    /// Returns `None` if `module_path` is not an aggregator.
    pub fn expand(&self, module_path: &str) -> Option<Vec<String>> {
        self.lookup(module_path)?;

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.expand_into(module_path, 0, &mut seen, &mut out);
        Some(out)
    }

    fn lookup(&self, module_path: &str) -> Option<&Vec<String>> {
        let key = module_key(module_path);
        self.entries
            .get(&key)
            .or_else(|| self.entries.get(&format!("{}/index", key)))
    }

    fn expand_into(
        &self,
        module_path: &str,
        depth: usize,
        seen: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) {
        if !seen.insert(module_key(module_path)) {
            return;
        }
        let Some(subs) = self.lookup(module_path) else {
            out.push(module_path.to_string());
            return;
        };
        if depth >= MAX_EXPANSION_DEPTH {
            return;
        }
        for sub in subs {
            self.expand_into(sub, depth + 1, seen, out);
        }
    }

    /// Replace side-effect imports of aggregators with their expansions.
    pub fn expand_bindings(&self, imports: Vec<ImportBinding>) -> Vec<ImportBinding> {
        let mut out = Vec::with_capacity(imports.len());
        for binding in imports {
            if binding.is_side_effect {
                if let Some(subs) = self.expand(&binding.module_path) {
                    out.extend(subs.into_iter().map(ImportBinding::side_effect));
                    continue;
                }
            }
            out.push(binding);
        }
        out
    }
}

fn reexport_handlers() -> HandlerMap<Vec<String>> {
    HandlerMap::new()
        .with(NodeKind::ImportStatement, collect_source)
        .with(NodeKind::ExportStatement, collect_source)
}

fn collect_source(
    unit: &ParsedUnit,
    node: NodeHandle<'_>,
    sources: &mut Vec<String>,
) -> Result<(), HandlerError> {
    // `export const x = ...` has no source.
    if node.kind() == NodeKind::ExportStatement && node.child_by_field("source").is_none() {
        return Ok(());
    }
    if let Some(source) = statement_source(unit, node) {
        sources.push(source);
    }
    Ok(())
}

fn is_index_file(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    stem == "index" && SCRIPT_EXTENSIONS.contains(&ext)
}

/// Module specifier with any script extension removed.
fn module_key(module_path: &str) -> String {
    for ext in SCRIPT_EXTENSIONS {
        if let Some(stripped) = module_path.strip_suffix(&format!(".{}", ext)) {
            return stripped.to_string();
        }
    }
    module_path.trim_end_matches('/').to_string()
}

/// Turn a source found in `base_dir` into a `package/sub/path` specifier.
fn to_package_specifier(
    source: &str,
    base_dir: &Path,
    package_dir: &Path,
    package_name: &str,
) -> Option<String> {
    if source == package_name || source.starts_with(&format!("{}/", package_name)) {
        return Some(source.to_string());
    }

    let absolute = if Path::new(source).is_absolute() {
        PathBuf::from(source)
    } else if source.starts_with('.') {
        base_dir.join(source)
    } else {
        return None;
    };

    let relative = normalize(&absolute)
        .strip_prefix(normalize(package_dir))
        .ok()?
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    Some(format!("{}/{}", package_name, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PKG: &str = "@acme/elements";

    fn map() -> AggregatorMap {
        let mut map = AggregatorMap::new();
        map.insert(
            "@acme/elements/es/index.js",
            vec![
                "@acme/elements/es/components/button/index.js".to_string(),
                "@acme/elements/es/components/index.js".to_string(),
            ],
        );
        map.insert(
            "@acme/elements/es/components/index.js",
            vec!["@acme/elements/es/components/tile/tile.js".to_string()],
        );
        map
    }

    #[test]
    fn test_expand_follows_nested_aggregators() {
        let expanded = map().expand("@acme/elements/es/index.js").unwrap();
        assert_eq!(
            expanded,
            vec![
                "@acme/elements/es/components/button/index.js",
                "@acme/elements/es/components/tile/tile.js",
            ]
        );
    }

    #[test]
    fn test_expand_matches_without_extension_or_index() {
        assert!(map().expand("@acme/elements/es/index").is_some());
        assert!(map().expand("@acme/elements/es").is_some());
        assert!(map().expand("@acme/elements/es/components/tile/tile.js").is_none());
    }

    #[test]
    fn test_expand_bindings_replaces_aggregator() {
        let bindings = vec![
            ImportBinding::side_effect("@acme/elements/es/components/index.js"),
            ImportBinding::named("x", "@acme/elements"),
        ];
        let expanded = map().expand_bindings(bindings);
        assert_eq!(
            expanded,
            vec![
                ImportBinding::side_effect("@acme/elements/es/components/tile/tile.js"),
                ImportBinding::named("x", "@acme/elements"),
            ]
        );
    }

    #[test]
    fn test_build_from_installed_package() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("node_modules/@acme/elements");
        fs::create_dir_all(pkg.join("es/components/button")).unwrap();
        fs::write(
            pkg.join("es/index.js"),
            "import './components/button/index.js';\nexport * from './components/tile.js';\nexport const version = '1';\n",
        )
        .unwrap();
        fs::write(pkg.join("es/components/button/index.js"), "export const x = 1;\n").unwrap();

        let map = AggregatorMap::build(&pkg, PKG);
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.expand("@acme/elements/es/index.js").unwrap(),
            vec![
                "@acme/elements/es/components/button/index.js",
                "@acme/elements/es/components/tile.js",
            ]
        );
    }
}
