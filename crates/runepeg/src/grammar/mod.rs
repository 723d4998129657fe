//! # Grammar
//!
//! The memoizing builder that lowers expression terms into rules, and
//! the scan surface over the result.
//!
//! ## Overview
//!
//! A [`Grammar`] owns a table of [`Rule`]s keyed by name. Lowering a term
//! computes its canonical text, reuses any rule already cached under
//! that text, and otherwise installs a new rule whose closure is built
//! from the check engine, recursing through sub-terms that memoize the
//! same way. Anonymous rules are named by their canonical text;
//! named rules (the naming operator) are additionally reachable under
//! their label, which is how references, save, and value resolve at
//! check time.
//!
//! Rules are immutable once installed and the table only grows during
//! construction, so a built grammar is freely shareable: any number of
//! scans may run concurrently against it (each scan owns its own
//! [`ScanState`], including the saved-literal table).
//!
//! ## Example
//!
//! ```rust
//! use runepeg::{Expr, Grammar};
//!
//! let g = Grammar::pack([Expr::one([Expr::lit("foo"), Expr::lit("bar")])]);
//! let result = g.scan("foobar");
//! assert!(result.is_success());
//! assert_eq!((result.begin, result.end), (0, 3));
//! ```

mod lower;

use std::fmt;
use std::io::Read;
use std::sync::{Arc, OnceLock};

use compact_str::{format_compact, CompactString};

use crate::engine::{CheckBox, ScanState, StderrTracer, TraceHandler};
use crate::error::{Failure, GrammarError};
use crate::result::Match;
use crate::text::{read_runes, Input, Runes};

type RuleMap = hashbrown::HashMap<CompactString, Arc<Rule>, ahash::RandomState>;

/// How [`Grammar::pack`] combines multiple top-level terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackMode {
    /// Wrap the terms in an implicit sequence (the default).
    #[default]
    Sequence,
    /// Wrap the terms in an implicit ordered choice.
    Choice,
}

/// A named check closure over an input cursor.
///
/// `name` identifies the rule within a grammar; `text` is the canonical
/// printed form of the term it was lowered from (for anonymous rules the
/// two coincide). The closure is installed after the rule is inserted
/// into the table, which is what lets recursive references resolve.
pub struct Rule {
    name: CompactString,
    text: CompactString,
    check: OnceLock<CheckBox>,
}

impl Rule {
    pub(crate) fn pending(name: CompactString, text: CompactString) -> Self {
        Self {
            name,
            text,
            check: OnceLock::new(),
        }
    }

    pub(crate) fn install(&self, check: CheckBox) {
        // a rule is only ever built once; a second install is a no-op
        let _ = self.check.set(check);
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical text of the term this rule was lowered from.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check the buffer in `state` at `pos`.
    ///
    /// Always returns a [`Match`] with `begin == pos`; failure is carried
    /// in the match, never panicked or short-circuited.
    pub fn check(&self, state: &mut ScanState<'_>, pos: usize) -> Match {
        state.trace_enter(&self.name, pos);
        let result = match self.check.get() {
            Some(check) => check(state, pos),
            None => Match::failure(
                pos,
                pos,
                Failure::Error(format_compact!("no check function assigned: {}", self.name)),
            ),
        };
        state.trace_exit(&self.name, &result);
        result
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

/// An aggregation of memoized rules with an entry rule for scanning.
///
/// Construction is single-writer; once built, the grammar is read-only
/// and scans may run concurrently (see the module docs).
#[derive(Default)]
pub struct Grammar {
    rules: RuleMap,
    entry: Option<Arc<Rule>>,
    rule_num: u32,
    mode: PackMode,
    trace: bool,
}

impl Grammar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grammar from `terms` and set the resulting rule as entry.
    ///
    /// More than one term is wrapped in an implicit *sequence*
    /// ([`PackMode::Sequence`], the default); use [`pack_with`] for an
    /// implicit ordered choice instead.
    ///
    /// [`pack_with`]: Self::pack_with
    #[must_use]
    pub fn pack<I: IntoIterator<Item = crate::Expr>>(terms: I) -> Self {
        Self::pack_with(PackMode::default(), terms)
    }

    /// [`pack`](Self::pack) with an explicit combination mode.
    #[must_use]
    pub fn pack_with<I: IntoIterator<Item = crate::Expr>>(mode: PackMode, terms: I) -> Self {
        let mut grammar = Self::new();
        grammar.mode = mode;
        grammar.pack_terms(terms);
        grammar
    }

    /// Lower `terms` into this grammar and set the result as the entry
    /// rule. Combination of multiple terms follows the grammar's
    /// [`PackMode`].
    pub fn pack_terms<I: IntoIterator<Item = crate::Expr>>(&mut self, terms: I) -> &mut Self {
        let mut terms: Vec<crate::Expr> = terms.into_iter().collect();
        let term = match terms.len() {
            0 => return self,
            1 => terms.remove(0),
            _ => match self.mode {
                PackMode::Sequence => crate::Expr::Seq(terms),
                PackMode::Choice => crate::Expr::One(terms),
            },
        };
        let rule = self.make_rule(&term);
        self.entry = Some(rule);
        self
    }

    /// Register a hand-written rule. An empty `name` is replaced with
    /// `Rule<counter>` from the grammar's monotonically increasing rule
    /// counter.
    pub fn add_rule<F>(&mut self, name: &str, text: &str, check: F) -> Arc<Rule>
    where
        F: Fn(&mut ScanState<'_>, usize) -> Match + Send + Sync + 'static,
    {
        self.rule_num += 1;
        let name: CompactString = if name.is_empty() {
            format_compact!("Rule{}", self.rule_num)
        } else {
            name.into()
        };
        let rule = Arc::new(Rule::pending(name.clone(), text.into()));
        rule.install(Box::new(check));
        self.rules.insert(name, rule.clone());
        rule
    }

    /// Look up an installed rule by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<Arc<Rule>> {
        self.rules.get(name).cloned()
    }

    /// Iterate every installed rule.
    pub fn rules(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.values()
    }

    /// Number of installed rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule [`scan`](Self::scan) and [`check`](Self::check) run.
    #[must_use]
    pub fn entry(&self) -> Option<&Arc<Rule>> {
        self.entry.as_ref()
    }

    /// Reassign the entry rule to the installed rule named `name`.
    ///
    /// # Errors
    ///
    /// [`GrammarError::UnknownRule`] if no such rule is installed.
    pub fn set_entry(&mut self, name: &str) -> Result<(), GrammarError> {
        match self.rule(name) {
            Some(rule) => {
                self.entry = Some(rule);
                Ok(())
            }
            None => Err(GrammarError::UnknownRule(name.into())),
        }
    }

    /// Route rule enter/exit events of subsequent plain scans to stderr.
    pub fn set_trace(&mut self, on: bool) {
        self.trace = on;
    }

    /// The combination mode [`pack_terms`](Self::pack_terms) uses for
    /// multiple terms.
    #[must_use]
    pub fn pack_mode(&self) -> PackMode {
        self.mode
    }

    pub fn set_pack_mode(&mut self, mode: PackMode) {
        self.mode = mode;
    }

    /// Run the entry rule against an already-converted buffer, starting
    /// at `pos`. The returned root match carries a buffer reference.
    #[must_use]
    pub fn check(&self, runes: &Runes, pos: usize) -> Match {
        let mut tracer = StderrTracer;
        let mut state = if self.trace {
            ScanState::traced(runes.clone(), self, &mut tracer)
        } else {
            ScanState::new(runes.clone(), self)
        };
        self.run_entry(&mut state, runes, pos)
    }

    /// [`check`](Self::check) with a caller-supplied trace handler.
    #[must_use]
    pub fn check_traced(
        &self,
        runes: &Runes,
        pos: usize,
        tracer: &mut dyn TraceHandler,
    ) -> Match {
        let mut state = ScanState::traced(runes.clone(), self, tracer);
        self.run_entry(&mut state, runes, pos)
    }

    /// Coerce `input` to a code-point buffer and run the entry rule at
    /// position 0. Malformed UTF-8 yields an immediate failure result
    /// with no parsing attempted.
    #[must_use]
    pub fn scan(&self, input: impl Input) -> Match {
        match input.into_runes() {
            Ok(runes) => self.check(&runes, 0),
            Err(err) => Match::failure(0, 0, Failure::Error(format_compact!("{err}"))),
        }
    }

    /// [`scan`](Self::scan) with a caller-supplied trace handler.
    #[must_use]
    pub fn scan_traced(&self, input: impl Input, tracer: &mut dyn TraceHandler) -> Match {
        match input.into_runes() {
            Ok(runes) => self.check_traced(&runes, 0, tracer),
            Err(err) => Match::failure(0, 0, Failure::Error(format_compact!("{err}"))),
        }
    }

    /// Read `reader` to completion and [`scan`](Self::scan) the bytes.
    #[must_use]
    pub fn scan_reader(&self, reader: impl Read) -> Match {
        match read_runes(reader) {
            Ok(runes) => self.check(&runes, 0),
            Err(err) => Match::failure(0, 0, Failure::Error(format_compact!("{err}"))),
        }
    }

    fn run_entry(&self, state: &mut ScanState<'_>, runes: &Runes, pos: usize) -> Match {
        let mut result = match &self.entry {
            Some(rule) => rule.check(state, pos),
            None => Match::failure(pos, pos, Failure::Error("no entry rule packed".into())),
        };
        result.buffer = Some(runes.clone());
        result
    }
}

impl fmt::Display for Grammar {
    /// Renders the entry rule's canonical text, or nothing when no entry
    /// is set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(rule) => f.write_str(rule.text()),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("rules", &self.rules.len())
            .field("entry", &self.entry.as_ref().map(|r| r.name()))
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
