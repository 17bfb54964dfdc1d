//! Parser module for package manifests.
//!
//! # Example
//!
//! ```
//! use usagescope::parser::{identity, parse_str};
//!
//! let pkg = parse_str(r#"{"name": "ui", "version": "1.0.1"}"#).unwrap();
//! assert_eq!(identity(&pkg).unwrap().to_string(), "ui@1.0.1");
//! ```

pub mod package_json;
pub mod types;

pub use package_json::{identity, parse_file, parse_str, ParseError, ParseResult};

pub use types::{PackageIdentity, PackageJson};
