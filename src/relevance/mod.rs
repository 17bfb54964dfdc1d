//! Which files can see the instrumented package.
//!
//! A file is relevant when, starting from the package that owns it (its
//! nearest `package.json`), the installed dependency tree reaches the
//! instrumented package at exactly the version being measured. Files that
//! are not relevant are skipped without being parsed.

mod cache;
mod dirs;
mod error;
mod filter;

pub use cache::{DependencyTreeCache, LIST_COMMAND};
pub use dirs::{find_installed_package, find_package_dir};
pub use error::RelevanceError;
pub use filter::{RelevanceFilter, IDENTITY_COMMAND};
