//! Following `<script src>` references out of a markup file.
//!
//! A source is one of:
//!
//! - a CDN URL, parsed into a [`CdnImport`](super::model::CdnImport)
//! - a build artifact under `node_modules/`, recorded as a side-effect import
//! - a same-origin script, parsed and folded into the page's accumulator,
//!   along with the relative modules it imports in turn

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::files::normalize;
use crate::tree::{dispatch, ParseError, ParsedUnit, SourceLanguage};

use super::accumulator::Accumulator;
use super::cdn::{is_remote, parse_cdn_url};
use super::imports::import_handlers;
use super::model::ImportBinding;

const NODE_MODULES: &str = "node_modules/";

/// Classify every collected script source and follow local scripts.
pub fn follow_script_sources(page: &Path, acc: &mut Accumulator) {
    let base = page.parent().unwrap_or(Path::new("")).to_path_buf();
    let mut queue = VecDeque::new();

    for src in acc.script_sources.clone() {
        if is_remote(&src) {
            match parse_cdn_url(&src) {
                Some(cdn) => acc.cdn_imports.push(cdn),
                None => tracing::debug!(src = %src, "unrecognised remote script"),
            }
        } else if let Some(idx) = src.rfind(NODE_MODULES) {
            acc.add_import(ImportBinding::side_effect(&src[idx + NODE_MODULES.len()..]));
        } else {
            queue.push_back(local_script_path(&base, &src));
        }
    }

    while let Some(path) = queue.pop_front() {
        if acc.followed_scripts.contains(&path) {
            continue;
        }
        acc.followed_scripts.push(path.clone());

        let before = acc.imports.len();
        if let Err(e) = fold_script(&path, acc) {
            tracing::debug!(file = %path.display(), error = %e, "script not followed");
            continue;
        }

        let dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
        for binding in &acc.imports[before..] {
            if binding.module_path.starts_with('.') {
                queue.push_back(normalize(&dir.join(&binding.module_path)));
            }
        }
    }

    attach_cdn_bindings(acc);
}

/// Site-root paths (`/js/app.js`) are taken relative to the page's directory.
fn local_script_path(base: &Path, src: &str) -> PathBuf {
    normalize(&base.join(src.trim_start_matches('/')))
}

fn fold_script(path: &Path, acc: &mut Accumulator) -> Result<(), ParseError> {
    let unit = match SourceLanguage::from_path(path) {
        Some(language) if !language.is_markup() => ParsedUnit::from_file(path)?,
        _ => {
            let source = std::fs::read_to_string(path)?;
            ParsedUnit::parse(path, source, SourceLanguage::JavaScript)?
        }
    };
    dispatch(&unit, unit.root(), &import_handlers(), acc);
    Ok(())
}

/// Point side-effect imports of CDN URLs at the package they load.
fn attach_cdn_bindings(acc: &mut Accumulator) {
    for binding in acc.imports.iter_mut() {
        if !binding.is_side_effect || binding.cdn.is_some() || !is_remote(&binding.module_path) {
            continue;
        }
        if let Some(cdn) = parse_cdn_url(&binding.module_path) {
            binding.module_path = cdn.package.clone();
            binding.cdn = Some(cdn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sources_are_classified() {
        let mut acc = Accumulator::for_markup();
        acc.script_sources = vec![
            "https://cdn.jsdelivr.net/npm/wc@1.2.0/dist/button.min.js".to_string(),
            "../node_modules/wc/es/components/tile/index.js".to_string(),
            "https://example.com/analytics.js".to_string(),
        ];
        follow_script_sources(Path::new("/nonexistent/site/index.html"), &mut acc);

        assert_eq!(acc.cdn_imports.len(), 1);
        assert_eq!(acc.cdn_imports[0].package, "wc");
        assert_eq!(
            acc.imports,
            vec![ImportBinding::side_effect("wc/es/components/tile/index.js")]
        );
    }

    #[test]
    fn test_local_scripts_are_followed_transitively() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        fs::create_dir_all(site.join("js")).unwrap();
        fs::write(
            site.join("js/app.js"),
            "import './widgets.js';\nimport 'wc/es/components/button/index.js';\n",
        )
        .unwrap();
        fs::write(
            site.join("js/widgets.js"),
            "import './app.js';\nimport 'https://cdn.jsdelivr.net/npm/wc@2.0.0/dist/tile.min.js';\n",
        )
        .unwrap();

        let mut acc = Accumulator::for_markup();
        acc.script_sources = vec!["./js/app.js".to_string()];
        follow_script_sources(&site.join("index.html"), &mut acc);

        assert_eq!(acc.followed_scripts.len(), 2);
        assert!(acc
            .imports
            .contains(&ImportBinding::side_effect("wc/es/components/button/index.js")));

        let cdn = acc
            .imports
            .iter()
            .find(|b| b.cdn.is_some())
            .expect("cdn binding");
        assert_eq!(cdn.module_path, "wc");
        assert_eq!(cdn.cdn.as_ref().unwrap().component.as_deref(), Some("tile"));
    }

    #[test]
    fn test_missing_local_script_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut acc = Accumulator::for_markup();
        acc.script_sources = vec!["/missing.js".to_string()];
        follow_script_sources(&dir.path().join("index.html"), &mut acc);
        assert!(acc.imports.is_empty());
        assert_eq!(acc.followed_scripts.len(), 1);
    }
}
