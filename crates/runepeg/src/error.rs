//! # Error Types
//!
//! Typed failures produced by rule checks, and grammar-level errors.
//!
//! ## Overview
//!
//! A rule check never panics and never returns a bare error: it returns a
//! [`Match`](crate::Match) whose `failure` field carries one of the
//! [`Failure`] variants below. The taxonomy:
//!
//! - [`Failure::Expected`]: the input did not satisfy an operator's
//!   assertion; carries the operator's canonical text or the expected rune.
//! - [`Failure::EndOfInput`]: a literal, class, range, or any-N operator
//!   ran out of buffer before the expected number of runes.
//! - [`Failure::NotFound`]: a reference or saved-literal lookup named a
//!   rule that does not exist.
//! - [`Failure::Usage`]: an expression term was constructed with wrong
//!   arity or argument types; such terms lower to rules that always fail.
//! - [`Failure::Error`]: any other scan-time semantic error (malformed
//!   UTF-8 input, missing entry rule, uninstalled check function).
//!
//! ## Sentinels
//!
//! The rendered strings are a stable contract, not prose: usage failures
//! begin with `%!USAGE:` and semantic errors with `%!ERROR:`. Plain match
//! failures render as `expected: <context>`.

use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Sentinel prefix for ill-constructed expression terms.
pub const USAGE_PREFIX: &str = "%!USAGE: ";

/// Sentinel prefix for scan-time semantic errors.
pub const ERROR_PREFIX: &str = "%!ERROR: ";

/// A typed rule failure.
///
/// Presence of a `Failure` on a [`Match`](crate::Match) is the sole
/// success/failure signal; a zero-width result without one is a success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum Failure {
    /// The input does not satisfy the operator named by the context.
    #[error("expected: {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(runepeg::check::expected)))]
    Expected(CompactString),

    /// The buffer ended before the operator saw what it needed.
    #[error("expected: {0} (end of input)")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(runepeg::check::eoi)))]
    EndOfInput(CompactString),

    /// A reference or saved-literal lookup to an absent name.
    #[error("%!ERROR: does not exist: {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(runepeg::check::not_found)))]
    NotFound(CompactString),

    /// An expression term built with wrong arity or argument types.
    #[error("%!USAGE: {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(runepeg::expr::usage)))]
    Usage(CompactString),

    /// Any other scan-time semantic error.
    #[error("%!ERROR: {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(runepeg::check::error)))]
    Error(CompactString),
}

/// Errors from grammar-level operations outside checking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("unknown rule: {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(runepeg::grammar::unknown_rule)))]
    UnknownRule(CompactString),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_prefixes_are_stable() {
        let usage = Failure::Usage("Rng{lo, hi} with lo <= hi".into());
        assert!(usage.to_string().starts_with(USAGE_PREFIX));

        let not_found = Failure::NotFound("Foo".into());
        assert_eq!(not_found.to_string(), "%!ERROR: does not exist: Foo");

        let err = Failure::Error("no entry rule packed".into());
        assert!(err.to_string().starts_with(ERROR_PREFIX));
    }

    #[test]
    fn expected_renders_like_a_match_failure() {
        assert_eq!(Failure::Expected("o".into()).to_string(), "expected: o");
        assert_eq!(
            Failure::EndOfInput("End{}".into()).to_string(),
            "expected: End{} (end of input)"
        );
    }
}
