//! Usage extraction and resolution.
//!
//! This module turns one parsed file into resolved usages of the
//! instrumented package:
//!
//! - Parse `import` declarations and `require()` calls into [`ImportBinding`]s
//! - Capture tokens, calls, JSX elements and custom element tags as [`UsageSite`]s
//! - Prune redundant captures ([`dedupe_functions`], [`dedupe_tokens`])
//! - Resolve each usage to the binding it came from ([`resolve_accumulator`])
//!
//! Markup pages additionally follow their `<script src>` references and
//! expand index aggregators before custom elements are resolved.
//!
//! # Example
//!
//! ```
//! use usagescope::analysis::{function_handlers, import_handlers, resolve_accumulator, Accumulator};
//! use usagescope::tree::{dispatch, ParsedUnit, SourceLanguage};
//!
//! let unit = ParsedUnit::parse(
//!     "app.js",
//!     "import { format } from 'lib';\nformat(date, 'short');",
//!     SourceLanguage::JavaScript,
//! )
//! .unwrap();
//!
//! let mut acc = Accumulator::new();
//! dispatch(&unit, unit.root(), &import_handlers(), &mut acc);
//! dispatch(&unit, unit.root(), &function_handlers(), &mut acc);
//! resolve_accumulator(&mut acc, "lib");
//!
//! assert_eq!(acc.resolved.len(), 1);
//! assert_eq!(acc.resolved[0].usage.name(), "format");
//! ```

pub mod access_path;
pub mod accumulator;
pub mod aggregators;
pub mod cdn;
pub mod dedup;
pub mod elements;
pub mod imports;
pub mod markup;
pub mod model;
pub mod resolve;
pub mod scripts;
pub mod usages;
pub mod values;

pub use access_path::access_path;
pub use accumulator::Accumulator;
pub use aggregators::AggregatorMap;
pub use cdn::parse_cdn_url;
pub use dedup::{dedupe_functions, dedupe_tokens};
pub use elements::{is_custom_element_name, jsx_custom_element_handlers, jsx_element_handlers};
pub use imports::import_handlers;
pub use markup::{markup_element_handlers, markup_import_handlers};
pub use model::{
    AccessSegment, Attribute, CallUsage, CdnImport, CustomElementUsage, ElementUsage,
    ImportBinding, ResolvedImport, ResolvedUsage, TokenUsage, UsageKind, UsageSite, Value,
    DEFAULT_EXPORT, NAMESPACE_EXPORT,
};
pub use resolve::{has_package_prefix, resolve_accumulator, resolve_usage};
pub use scripts::follow_script_sources;
pub use usages::{function_handlers, token_handlers};
pub use values::value_of;
