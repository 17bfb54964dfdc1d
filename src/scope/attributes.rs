//! Attribute names and the conversion of resolved usages into metrics.
//!
//! Usage attributes are keyed `<metric name>.<attribute>`, e.g.
//! `js.function.arguments`. Every metric also carries the instrumented
//! package and one installing package, whose identity is hashed.

use crate::analysis::{
    AccessSegment, ImportBinding, ResolvedImport, ResolvedUsage, UsageKind, UsageSite, Value,
    NAMESPACE_EXPORT,
};
use crate::anonymize::{hash, substitute, substitute_values, SubstitutionTable};
use crate::graph::InstallingPackage;
use crate::parser::PackageIdentity;

use super::metric::{AttributeValue, Attributes, Metric};

pub const DEPENDENCY_NAME: &str = "npm.dependency.name";
pub const DEPENDENCY_VERSION: &str = "npm.dependency.version";
pub const INSTALLER_NAME: &str = "npm.installer.name";
pub const INSTALLER_VERSION: &str = "npm.installer.version";

/// Attributes replaced by their digest before capture.
pub const HASHED: [&str; 2] = [INSTALLER_NAME, INSTALLER_VERSION];

pub const NAME: &str = "name";
pub const ACCESS_PATH: &str = "accessPath";
pub const ARGUMENTS: &str = "arguments";
pub const ATTRIBUTE_NAMES: &str = "attributeNames";
pub const ATTRIBUTE_VALUES: &str = "attributeValues";
pub const MODULE_SPECIFIER: &str = "module.specifier";
pub const IMPORT_KIND: &str = "import.kind";
pub const CDN_VERSION: &str = "cdn.version";
pub const CDN_IS_LATEST: &str = "cdn.isLatest";

/// Name reported in place of a default import's local alias.
pub const DEFAULT_NAME: &str = "[Default]";

/// Full attribute key for `attribute` of metric `kind`.
pub fn key(kind: &str, attribute: &str) -> String {
    format!("{}.{}", kind, attribute)
}

/// Values that may be reported verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allowlists<'a> {
    pub argument_values: &'a [String],
    pub attribute_names: &'a [String],
    pub attribute_values: &'a [String],
}

/// How the usage's import was written.
pub fn import_kind(import: &ResolvedImport) -> &'static str {
    match import {
        ResolvedImport::Cdn(_) => "cdn",
        ResolvedImport::Binding(b) if b.cdn.is_some() => "cdn",
        ResolvedImport::Binding(b) if b.is_side_effect => "sideEffect",
        ResolvedImport::Binding(b) if b.is_namespace => "namespace",
        ResolvedImport::Binding(b) if b.is_default => "default",
        ResolvedImport::Binding(b) if b.rename.is_some() => "renamed",
        ResolvedImport::Binding(_) => "named",
    }
}

/// Rewrite the leading segment of `path` from the local binding to what
/// the package actually exports.
pub fn exported_path(path: &[AccessSegment], binding: &ImportBinding) -> Vec<AccessSegment> {
    let mut path = path.to_vec();
    if path.is_empty() || binding.is_side_effect {
        return path;
    }

    if binding.is_namespace {
        path.remove(0);
        if path.is_empty() {
            path.push(AccessSegment::String(NAMESPACE_EXPORT.to_string()));
        }
    } else if binding.is_default {
        path[0] = AccessSegment::String(DEFAULT_NAME.to_string());
    } else if binding.rename.is_some() {
        path[0] = AccessSegment::String(binding.name.clone());
    }
    path
}

fn render_path(path: &[AccessSegment], table: &SubstitutionTable) -> Vec<String> {
    path.iter()
        .map(|segment| match segment {
            AccessSegment::String(s) => s.clone(),
            AccessSegment::Opaque(raw) => table.placeholder(&Value::Complex(raw.clone())),
        })
        .collect()
}

/// Attributes describing one resolved usage, without package or installer.
pub fn usage_attributes(
    kind: &str,
    resolved: &ResolvedUsage,
    allow: Allowlists<'_>,
    table: &SubstitutionTable,
) -> Attributes {
    let path = match &resolved.import {
        ResolvedImport::Binding(binding) => exported_path(&resolved.usage.access_path(), binding),
        ResolvedImport::Cdn(_) => resolved.usage.access_path(),
    };
    let path = render_path(&path, table);

    let mut attributes = Attributes::new();
    attributes.insert(key(kind, NAME), AttributeValue::String(path.join(".")));
    attributes.insert(key(kind, ACCESS_PATH), AttributeValue::Strings(path));
    attributes.insert(
        key(kind, MODULE_SPECIFIER),
        AttributeValue::String(resolved.import.module_path().to_string()),
    );
    attributes.insert(
        key(kind, IMPORT_KIND),
        AttributeValue::String(import_kind(&resolved.import).to_string()),
    );

    if let UsageSite::Call(call) = &resolved.usage {
        let arguments = substitute_values(&call.arguments, allow.argument_values, table);
        attributes.insert(
            key(kind, ARGUMENTS),
            AttributeValue::Strings(arguments.iter().map(|v| v.to_string()).collect()),
        );
    }

    if matches!(
        resolved.usage.kind(),
        UsageKind::Element | UsageKind::CustomElement
    ) {
        let entries: Vec<_> = resolved
            .usage
            .attributes()
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect();
        let redacted = substitute(&entries, allow.attribute_names, allow.attribute_values, table);
        let (names, values): (Vec<_>, Vec<_>) = redacted
            .into_iter()
            .map(|(name, value)| (name, value.to_string()))
            .unzip();
        attributes.insert(key(kind, ATTRIBUTE_NAMES), AttributeValue::Strings(names));
        attributes.insert(key(kind, ATTRIBUTE_VALUES), AttributeValue::Strings(values));
    }

    let cdn = match &resolved.import {
        ResolvedImport::Cdn(cdn) => Some(cdn),
        ResolvedImport::Binding(binding) => binding.cdn.as_ref(),
    };
    if let Some(cdn) = cdn {
        attributes.insert(key(kind, CDN_VERSION), AttributeValue::String(cdn.version.clone()));
        attributes.insert(key(kind, CDN_IS_LATEST), AttributeValue::Boolean(cdn.is_latest));
    }

    attributes
}

/// Package and installer attributes, installer hashed.
pub fn dependency_attributes(
    package: &PackageIdentity,
    installer: &InstallingPackage,
    table: &SubstitutionTable,
) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(DEPENDENCY_NAME.to_string(), package.name.as_str().into());
    attributes.insert(DEPENDENCY_VERSION.to_string(), package.version.as_str().into());
    attributes.insert(INSTALLER_NAME.to_string(), installer.name.as_str().into());
    attributes.insert(INSTALLER_VERSION.to_string(), installer.version.as_str().into());
    hash(&mut attributes, &HASHED, table);
    attributes
}

/// One metric per installer for a resolved usage.
pub fn usage_metrics(
    kind: &str,
    resolved: &ResolvedUsage,
    package: &PackageIdentity,
    installers: &[InstallingPackage],
    allow: Allowlists<'_>,
    table: &SubstitutionTable,
) -> Vec<Metric> {
    let usage = usage_attributes(kind, resolved, allow, table);
    installers
        .iter()
        .map(|installer| {
            let mut attributes = dependency_attributes(package, installer, table);
            attributes.extend(usage.clone());
            Metric {
                name: kind.to_string(),
                attributes,
            }
        })
        .collect()
}
