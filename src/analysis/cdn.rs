//! CDN script URL parsing.
//!
//! Two URL shapes are recognised:
//!
//! - npm mirrors: `https://cdn.jsdelivr.net/npm/@scope/pkg@1.2.3/dist/button.min.js`,
//!   `https://unpkg.com/pkg@1.2.3/button.js`
//! - versioned paths: `https://host/common/carbon/web-components/version/v2.0.0/button.min.js`,
//!   where the two segments before `version` are the scope and package name.

use std::sync::OnceLock;

use regex::Regex;

use super::model::CdnImport;

const LATEST: &str = "latest";

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

fn regex_npm_mirror() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(r"^(?:https?:)?//[^/]+/(?:npm/)?((?:@[^/@]+/)?[^/@]+)@([^/]+)(?:/(.*))?$")
    })
}

fn regex_versioned_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"^(?:https?:)?//[^/]+/(?:[^/]+/)*?([^/]+)/([^/]+)/version/([^/]+)/(.+)$"))
}

/// Returns true if `src` points at another origin.
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//")
}

/// Parse a script URL into a [`CdnImport`], if it has a recognised shape.
pub fn parse_cdn_url(src: &str) -> Option<CdnImport> {
    let url = src
        .split(['?', '#'])
        .next()
        .unwrap_or(src)
        .trim();

    if let Some(caps) = regex_npm_mirror().captures(url) {
        let package = caps.get(1)?.as_str().to_string();
        let version = caps.get(2)?.as_str();
        let file = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        return Some(cdn_import(package, version, file, src));
    }

    if let Some(caps) = regex_versioned_path().captures(url) {
        let package = format!("@{}/{}", caps.get(1)?.as_str(), caps.get(2)?.as_str());
        let version = caps.get(3)?.as_str();
        let file = caps.get(4)?.as_str();
        return Some(cdn_import(package, version, file, src));
    }

    None
}

fn cdn_import(package: String, version: &str, file: &str, src: &str) -> CdnImport {
    let is_latest = version.eq_ignore_ascii_case(LATEST);
    let version = if is_latest {
        LATEST.to_string()
    } else {
        version.trim_start_matches('v').to_string()
    };

    CdnImport {
        package,
        version,
        is_latest,
        component: component_from_file(file),
        url: src.to_string(),
    }
}

/// Component name implied by a bundle's file name: `button.min.js` → `button`.
fn component_from_file(file: &str) -> Option<String> {
    let last = file.rsplit('/').next().unwrap_or("");
    let stem = last.split('.').next().unwrap_or("");
    match stem {
        "" | "index" | "bundle" | "all" => None,
        stem => Some(stem.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsdelivr_scoped_package() {
        let cdn = parse_cdn_url(
            "https://cdn.jsdelivr.net/npm/@carbon/web-components@2.1.0/dist/button.min.js",
        )
        .unwrap();
        assert_eq!(cdn.package, "@carbon/web-components");
        assert_eq!(cdn.version, "2.1.0");
        assert!(!cdn.is_latest);
        assert_eq!(cdn.component.as_deref(), Some("button"));
    }

    #[test]
    fn test_unpkg_unscoped_package() {
        let cdn = parse_cdn_url("https://unpkg.com/lit-widgets@1.0.0/index.js?module").unwrap();
        assert_eq!(cdn.package, "lit-widgets");
        assert_eq!(cdn.version, "1.0.0");
        assert_eq!(cdn.component, None);
    }

    #[test]
    fn test_versioned_path_latest() {
        let cdn = parse_cdn_url(
            "https://1.www.s81c.com/common/carbon/web-components/version/latest/ui-shell.min.js",
        )
        .unwrap();
        assert_eq!(cdn.package, "@carbon/web-components");
        assert_eq!(cdn.version, "latest");
        assert!(cdn.is_latest);
        assert_eq!(cdn.component.as_deref(), Some("ui-shell"));
    }

    #[test]
    fn test_versioned_path_strips_v_prefix() {
        let cdn = parse_cdn_url(
            "//1.www.s81c.com/common/carbon/web-components/version/v2.0.0/button.min.js",
        )
        .unwrap();
        assert_eq!(cdn.version, "2.0.0");
    }

    #[test]
    fn test_unrecognised_urls() {
        assert!(parse_cdn_url("https://example.com/app.js").is_none());
        assert!(parse_cdn_url("./local.js").is_none());
        assert!(is_remote("//cdn.example.com/x.js"));
        assert!(!is_remote("/scripts/x.js"));
    }
}
