//! Shared manifest types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity fields of a `package.json`. Everything else in the
/// manifest is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageJson {
    pub name: Option<String>,
    /// Exact installed version, not a range.
    pub version: Option<String>,
}

/// A package's exact name and version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
