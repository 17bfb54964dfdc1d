//! Redaction of captured values.
//!
//! Two modes share one run-scoped [`SubstitutionTable`]:
//!
//! - [`hash`] replaces listed attributes with a SHA-256 digest
//! - [`substitute`] replaces keys and values missing from allow-lists with
//!   `[redactedN]` placeholders

mod hash;
mod substitution;

pub use hash::{hash, sha256_hex};
pub use substitution::{substitute, substitute_values, SubstitutionTable};
