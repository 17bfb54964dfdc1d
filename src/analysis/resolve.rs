//! Linking usage sites back to the imports that produced them.
//!
//! Matchers run in a fixed order and the first hit wins:
//!
//! 1. namespace: `lib.a.b` where `lib` is `import * as lib`
//! 2. named: `Button` where `Button` was imported under its own name
//! 3. renamed: `Btn` where `Btn` aliases an export (default aliases win ties)
//!
//! Custom element tags are matched afterwards against side-effect imports,
//! whose module path names the element (`.../button/index.js` defines
//! `*-button`), and finally against CDN scripts of the instrumented package.

use super::accumulator::Accumulator;
use super::model::{
    CdnImport, ImportBinding, ResolvedImport, ResolvedUsage, UsageKind, UsageSite,
};

/// Returns true if `module_path` is the package itself or one of its sub-paths.
pub fn has_package_prefix(module_path: &str, package: &str) -> bool {
    module_path == package
        || module_path
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Bindings that come from the instrumented package.
pub fn package_imports(imports: &[ImportBinding], package: &str) -> Vec<ImportBinding> {
    imports
        .iter()
        .filter(|b| has_package_prefix(&b.module_path, package))
        .cloned()
        .collect()
}

type Matcher = fn(&UsageSite, &[ImportBinding]) -> Option<ImportBinding>;

const MATCHERS: &[Matcher] = &[match_namespace, match_named, match_renamed];

/// First segment of the usage's access path, or its name.
fn head(usage: &UsageSite) -> String {
    usage
        .access_path()
        .first()
        .map(|s| s.text().to_string())
        .unwrap_or_else(|| usage.name().to_string())
}

fn match_namespace(usage: &UsageSite, imports: &[ImportBinding]) -> Option<ImportBinding> {
    let path = usage.access_path();
    if path.len() < 2 {
        return None;
    }
    let first = path[0].text();
    imports
        .iter()
        .find(|b| b.is_namespace && b.local_name() == first)
        .cloned()
}

fn match_named(usage: &UsageSite, imports: &[ImportBinding]) -> Option<ImportBinding> {
    let head = head(usage);
    imports
        .iter()
        .filter(|b| b.rename.is_none() && !b.is_namespace && !b.is_default && !b.is_side_effect)
        .find(|b| b.name == usage.name() || b.name == head)
        .cloned()
}

fn match_renamed(usage: &UsageSite, imports: &[ImportBinding]) -> Option<ImportBinding> {
    let head = head(usage);
    let mut candidates = imports.iter().filter(|b| {
        !b.is_namespace
            && b.rename
                .as_deref()
                .is_some_and(|alias| alias == usage.name() || alias == head)
    });

    let first = candidates.next()?;
    if first.is_default {
        return Some(first.clone());
    }
    Some(candidates.find(|b| b.is_default).unwrap_or(first).clone())
}

/// Resolve one usage against bindings already narrowed to the package.
pub fn resolve_usage(usage: &UsageSite, imports: &[ImportBinding]) -> Option<ImportBinding> {
    MATCHERS.iter().find_map(|matcher| matcher(usage, imports))
}

/// Tag name a side-effect import defines: the file stem, or the directory
/// name when the file is an `index`.
pub fn inferred_tag(binding: &ImportBinding) -> Option<String> {
    if let Some(component) = binding.cdn.as_ref().and_then(|c| c.component.clone()) {
        return Some(component.to_lowercase());
    }

    let mut segments = binding.module_path.rsplit('/');
    let file = segments.next()?;
    let stem = file.split('.').next().unwrap_or("");
    let tag = if stem.is_empty() || stem == "index" {
        segments.next()?
    } else {
        stem
    };
    Some(tag.to_lowercase())
}

/// Returns true if a custom element tag is the element `inferred` names.
fn tag_matches(tag: &str, inferred: &str) -> bool {
    tag == inferred || tag.ends_with(&format!("-{}", inferred))
}

fn match_side_effect(usage: &UsageSite, imports: &[ImportBinding]) -> Option<ImportBinding> {
    let tag = usage.name();
    imports
        .iter()
        .filter(|b| b.is_side_effect)
        .filter_map(|b| inferred_tag(b).map(|inferred| (b, inferred)))
        .filter(|(_, inferred)| tag_matches(tag, inferred))
        .max_by_key(|(_, inferred)| inferred.len())
        .map(|(b, _)| b.clone())
}

fn match_cdn(usage: &UsageSite, cdn_imports: &[CdnImport]) -> Option<CdnImport> {
    let tag = usage.name();
    cdn_imports
        .iter()
        .filter(|c| match c.component.as_deref() {
            Some(component) => tag_matches(tag, &component.to_lowercase()),
            None => true,
        })
        .max_by_key(|c| c.component.as_ref().map_or(0, |component| component.len()))
        .cloned()
}

/// Resolve a custom element tag, falling back to CDN scripts.
pub fn resolve_custom_element(
    usage: &UsageSite,
    imports: &[ImportBinding],
    cdn_imports: &[CdnImport],
) -> Option<ResolvedImport> {
    match_side_effect(usage, imports)
        .map(ResolvedImport::Binding)
        .or_else(|| match_cdn(usage, cdn_imports).map(ResolvedImport::Cdn))
}

/// Resolve every captured usage in `acc` against the package's bindings.
///
/// Usages that match nothing are dropped. The results replace
/// `acc.resolved`, in capture order: tokens, calls, elements.
pub fn resolve_accumulator(acc: &mut Accumulator, package: &str) {
    let imports = package_imports(&acc.imports, package);
    let cdn_imports: Vec<CdnImport> = acc
        .cdn_imports
        .iter()
        .filter(|c| c.package == package)
        .cloned()
        .collect();

    let usages = acc
        .tokens
        .iter()
        .chain(acc.functions.iter())
        .chain(acc.elements.iter());

    let mut resolved = Vec::new();
    for usage in usages {
        let import = match usage.kind() {
            UsageKind::CustomElement => resolve_custom_element(usage, &imports, &cdn_imports),
            _ => resolve_usage(usage, &imports).map(ResolvedImport::Binding),
        };
        if let Some(import) = import {
            resolved.push(ResolvedUsage {
                usage: usage.clone(),
                import,
            });
        }
    }

    tracing::debug!(
        captured = acc.usage_count(),
        resolved = resolved.len(),
        "usages resolved"
    );
    acc.resolved = resolved;
}
