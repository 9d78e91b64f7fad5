//! # pegrat: Packrat PEG Parsing from Composable Atoms
//!
//! pegrat builds parsers out of small, immutable parsing expressions ("atoms")
//! and runs them with a memoizing packrat engine that also accepts
//! left-recursive rules.
//!
//! ## Building Blocks
//!
//! ### 1. Atoms
//! Grammars are composed from atoms ([`atoms`]):
//! - Terminals: literals, character classes, any character ([`prelude`])
//! - Combinators: sequence `>>`, ordered choice `|`, repetition, lookahead
//! - Result shaping: named values, ignore, map, capture
//!
//! ### 2. Grammars
//! Named rules that refer to each other, including recursively, form a
//! [`Grammar`]. Rule bodies are built lazily on first use.
//!
//! ### 3. Results
//! Matches are flattened into a [`Tree`] of strings, lists and maps. Only named
//! values survive into maps, see [`tree`] for the exact merge rules.
//!
//! ### 4. Diagnostics
//! A failed parse yields a [`Cause`] tree. The active [`reporter`] decides which
//! cause is surfaced; by default that is the failure anchored furthest into the
//! input.
//!
//! ## Parse Pipeline
//!
//! ```text
//! text → Source → root atom (memoized rule applications) → raw value → flatten → Tree
//!                                  ↘ failure → reporter → Cause (located)
//! ```
//!
//! ### Memoization and Left Recursion
//!
//! Every rule application is cached per start offset for the duration of one
//! parse. Left-recursive rules are grown from a failing seed
//! until the match stops getting longer.
//!
//! ## Example
//!
//! ```ignore
//! use pegrat::prelude::*;
//! use pegrat::{Grammar, Parser};
//!
//! let grammar = Grammar::builder()
//!     .rule("sum", |r| (r.rule("sum").named("l") >> lit("+") >> r.rule("num").named("r")) | r.rule("num"))
//!     .rule("num", |_| class("[0-9]").many1())
//!     .root("sum")
//!     .build()?;
//!
//! let tree = grammar.parse("1+2")?;
//! ```

pub mod atoms;
pub mod cause;
pub mod config;
mod context;
pub mod error;
pub mod grammar;
mod memo;
pub mod reporter;
pub mod source;
pub mod tree;

pub use atoms::prelude;

// Re-exports
pub use atoms::{Atom, Parsed, Parser};
pub use cause::{Cause, Message};
pub use config::ParseOptions;
pub use context::Captures;
pub use error::*;
pub use grammar::{Grammar, GrammarBuilder, RuleId, Rules};
pub use reporter::{ErrorReporter, ReporterKind};
pub use source::{Position, Slice, Source};
pub use tree::{DuplicateKey, Tree};
