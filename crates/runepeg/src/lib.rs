//! # runepeg
//!
//! A scannerless PEG packrat parsing library over Unicode code points.
//!
//! ## Overview
//!
//! runepeg builds grammars from a small set of composable expression
//! operators and evaluates them directly against UTF-8 input, with no
//! separate tokenizer. It provides:
//!
//! - **Expression algebra**: a closed set of operators ([`Expr`]) whose
//!   printed form is canonical and parseable back
//! - **Memoizing grammar builder**: terms lower into identified rules,
//!   deduplicated by canonical text, with recursion tied through the
//!   rule table
//! - **Check engine**: PEG semantics (ordered choice, greedy
//!   repetition, non-consuming lookahead, furthest-failure reporting)
//!   producing a [`Match`] tree with exact code-point spans
//! - **Context-sensitive constructs**: save/value capture of matched
//!   text for fenced blocks and here-docs
//!
//! ## Quick Start
//!
//! ```rust
//! use runepeg::{Expr, Grammar};
//!
//! // Seq{One{"foo", "bar"}, End{}}
//! let grammar = Grammar::pack([
//!     Expr::one([Expr::lit("foo"), Expr::lit("bar")]),
//!     Expr::end(),
//! ]);
//!
//! let result = grammar.scan("bar");
//! assert!(result.is_success());
//! assert_eq!((result.begin, result.end), (0, 3));
//!
//! // Failures carry the farthest position reached and a typed failure.
//! let failed = grammar.scan("baz");
//! assert!(!failed.is_success());
//! assert_eq!(failed.begin, 0);
//! ```
//!
//! ## Concurrency
//!
//! Grammar construction is single-writer. After construction the rule
//! table is read-only and any number of scans may run concurrently on
//! one grammar: each scan owns its state, including the saved-literal
//! table used by the save/value operators.
//!
//! ## Modules
//!
//! - [`expr`] - Expression terms, named rune classes, canonical printing
//! - [`grammar`] - Rule table, memoizing lowering, pack/scan/check
//! - [`engine`] - Per-operator check strategies, scan state, tracing
//! - [`result`] - The [`Match`] parse-tree node and its JSON form
//! - [`text`] - The [`Runes`] buffer and input coercion
//! - [`error`] - The [`Failure`] taxonomy and sentinel contract

pub mod engine;
pub mod error;
pub mod expr;
pub mod grammar;
pub mod result;
pub mod text;

// Re-export commonly used types
pub use engine::{NullTracer, ScanState, StderrTracer, TraceEvent, TraceHandler};
pub use error::{Failure, GrammarError};
pub use expr::{class, CharClass, Expr};
pub use grammar::{Grammar, PackMode, Rule};
pub use result::Match;
pub use text::{read_runes, Input, InputError, Runes};
