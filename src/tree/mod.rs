//! Tree adapter and dispatcher.
//!
//! Script sources (JavaScript, TypeScript, JSX/TSX) and markup sources (HTML)
//! are parsed with tree-sitter and exposed through one adapter,
//! [`NodeHandle`], whose [`NodeKind`] folds both grammars into a single
//! closed enum. [`dispatch`] walks a tree and calls the handler registered
//! for each node kind in a [`HandlerMap`].
//!
//! # Example
//!
//! ```
//! use usagescope::tree::{dispatch, HandlerMap, NodeKind, ParsedUnit, SourceLanguage};
//!
//! let unit = ParsedUnit::parse("a.js", "foo(); bar();", SourceLanguage::JavaScript).unwrap();
//! let map = HandlerMap::<usize>::new().with(NodeKind::CallExpression, |_, _, count| {
//!     *count += 1;
//!     Ok(())
//! });
//!
//! let mut count = 0;
//! dispatch(&unit, unit.root(), &map, &mut count);
//! assert_eq!(count, 2);
//! ```

mod dispatch;
mod node;
mod unit;

pub use dispatch::{dispatch, Handler, HandlerError, HandlerMap};
pub use node::{NodeHandle, NodeKind, SourceRange};
pub use unit::{ParseError, ParsedUnit, SourceLanguage};
