//! UsageScope - usage metrics for an instrumented npm package
//!
//! This crate finds where a project uses a given npm package, at the exact
//! version installed, and turns every usage into an anonymized metric:
//! tokens and calls in JavaScript/TypeScript, JSX elements, and custom
//! elements in HTML pages.

pub mod analysis;
pub mod anonymize;
pub mod command;
pub mod config;
pub mod files;
pub mod graph;
pub mod parser;
pub mod relevance;
pub mod scope;
pub mod session;
pub mod tree;
