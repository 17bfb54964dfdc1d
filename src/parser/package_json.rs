//! Parser for npm package.json files.
//!
//! Manifests are read to learn a package's exact identity: the files of a
//! package are located in the dependency tree by the name and version their
//! nearest manifest declares.

use std::fs;
use std::path::Path;

use super::types::{PackageIdentity, PackageJson};

/// Errors raised while reading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read manifest: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse manifest JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Name or version missing.
    #[error("Invalid package.json: {0}")]
    InvalidPackage(String),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Reads and parses the manifest at `path`.
pub fn parse_file(path: &Path) -> ParseResult<PackageJson> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a package.json from a string.
///
/// Also accepts the output of `npm pkg get name version`, which has the
/// same shape.
///
/// # Example
///
/// ```
/// use usagescope::parser::package_json::parse_str;
///
/// let pkg = parse_str(r#"{"name": "ui", "version": "1.0.1"}"#).unwrap();
/// assert_eq!(pkg.version.as_deref(), Some("1.0.1"));
/// ```
pub fn parse_str(content: &str) -> ParseResult<PackageJson> {
    let pkg: PackageJson = serde_json::from_str(content)?;
    Ok(pkg)
}

/// Extracts the exact name and version of a package.
///
/// # Returns
///
/// The identity, or `InvalidPackage` if either field is missing or empty.
pub fn identity(pkg: &PackageJson) -> ParseResult<PackageIdentity> {
    let name = pkg
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ParseError::InvalidPackage("missing name".to_string()))?;
    let version = pkg
        .version
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ParseError::InvalidPackage(format!("{} has no version", name)))?;

    Ok(PackageIdentity::new(name, version))
}
