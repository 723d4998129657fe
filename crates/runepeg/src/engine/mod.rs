//! # Check Engine
//!
//! Per-operator evaluation strategies, and the state threaded through a
//! scan.
//!
//! ## Overview
//!
//! Every rule closure is built here, by one of the `pub(crate)` builder
//! functions the grammar calls while lowering expression terms. A check
//! takes `(&mut ScanState, position)` and returns a
//! [`Match`](crate::Match); it never panics and never allocates global
//! state.
//!
//! [`ScanState`] is the per-scan context object: the code-point buffer,
//! a borrow of the grammar for check-time rule lookup (references,
//! save), the saved-literal table, and an optional trace hook. Because
//! the saved-literal table lives here rather than on the grammar,
//! concurrent scans on one grammar are always safe, including grammars
//! that use the save operator.
//!
//! Engine guarantees, for every operator:
//!
//! - `begin` of the returned match equals the position checked;
//! - `end` is the farthest position any sub-rule reached, success or not;
//! - failure is signaled only through the match's `failure` field.

mod trace;

use std::sync::Arc;

use compact_str::{format_compact, CompactString};
use smallvec::SmallVec;

use crate::error::Failure;
use crate::expr::CharClass;
use crate::grammar::{Grammar, Rule};
use crate::result::Match;
use crate::text::Runes;

pub use trace::{NullTracer, RecordingTracer, StderrTracer, TraceEvent, TraceHandler};

/// Boxed check closure stored inside a [`Rule`].
pub(crate) type CheckBox = Box<dyn Fn(&mut ScanState<'_>, usize) -> Match + Send + Sync>;

/// Sub-rules captured by a composite operator's closure.
pub(crate) type RuleList = SmallVec<[Arc<Rule>; 4]>;

type SavedMap = hashbrown::HashMap<CompactString, CompactString, ahash::RandomState>;

/// Mutable state of one scan.
///
/// Created per `scan`/`check` call; the grammar itself stays read-only.
pub struct ScanState<'g> {
    runes: Runes,
    grammar: &'g Grammar,
    saved: SavedMap,
    tracer: Option<&'g mut dyn TraceHandler>,
    depth: usize,
}

impl<'g> ScanState<'g> {
    /// State for an untraced scan of `runes` against `grammar`.
    #[must_use]
    pub fn new(runes: Runes, grammar: &'g Grammar) -> Self {
        Self {
            runes,
            grammar,
            saved: SavedMap::default(),
            tracer: None,
            depth: 0,
        }
    }

    /// State routing every rule enter/exit to `tracer`.
    #[must_use]
    pub fn traced(runes: Runes, grammar: &'g Grammar, tracer: &'g mut dyn TraceHandler) -> Self {
        Self {
            tracer: Some(tracer),
            ..Self::new(runes, grammar)
        }
    }

    /// The buffer being scanned.
    #[must_use]
    pub fn runes(&self) -> &Runes {
        &self.runes
    }

    pub(crate) fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub(crate) fn save_literal(&mut self, name: CompactString, text: CompactString) {
        self.saved.insert(name, text);
    }

    pub(crate) fn saved_literal(&self, name: &str) -> Option<&CompactString> {
        self.saved.get(name)
    }

    pub(crate) fn trace_enter(&mut self, rule: &str, pos: usize) {
        let depth = self.depth;
        if let Some(tracer) = self.tracer.as_deref_mut() {
            tracer.handle(TraceEvent::Enter { rule, pos, depth });
        }
        self.depth += 1;
    }

    pub(crate) fn trace_exit(&mut self, rule: &str, result: &Match) {
        self.depth = self.depth.saturating_sub(1);
        let depth = self.depth;
        if let Some(tracer) = self.tracer.as_deref_mut() {
            tracer.handle(TraceEvent::Exit {
                rule,
                begin: result.begin,
                end: result.end,
                success: result.is_success(),
                depth,
            });
        }
    }
}

/// Literal matching shared by the literal operator and saved-literal
/// replay. Advances past the matched prefix; the failure names the first
/// expected rune not found.
pub(crate) fn check_literal(buf: &Runes, start: usize, lit: &[char]) -> Match {
    let data = buf.as_slice();
    let mut end = start;
    let mut n = 0;
    while end < data.len() && n < lit.len() {
        if data[end] != lit[n] {
            return Match::failure(start, end, Failure::Expected(format_compact!("{}", lit[n])));
        }
        end += 1;
        n += 1;
    }
    if n < lit.len() {
        return Match::failure(start, end, Failure::EndOfInput(format_compact!("{}", lit[n])));
    }
    Match::success(start, end)
}

pub(crate) fn lit(value: CompactString) -> CheckBox {
    let runes: Box<[char]> = value.chars().collect();
    Box::new(move |state, start| check_literal(state.runes(), start, &runes))
}

pub(crate) fn rng(lo: char, hi: char, text: CompactString) -> CheckBox {
    Box::new(move |state, start| match state.runes().at(start) {
        Some(c) if lo <= c && c <= hi => Match::success(start, start + 1),
        Some(_) => Match::failure(start, start, Failure::Expected(text.clone())),
        None => Match::failure(start, start, Failure::EndOfInput(text.clone())),
    })
}

pub(crate) fn any_n(n: usize, text: CompactString) -> CheckBox {
    Box::new(move |state, start| {
        let len = state.runes().len();
        if start + n > len {
            Match::failure(start, len, Failure::EndOfInput(text.clone()))
        } else {
            Match::success(start, start + n)
        }
    })
}

pub(crate) fn any_between(min: usize, max: Option<usize>, text: CompactString) -> CheckBox {
    Box::new(move |state, start| {
        let len = state.runes().len();
        if start + min > len {
            return Match::failure(start, len, Failure::EndOfInput(text.clone()));
        }
        let end = max.map_or(len, |mx| (start + mx).min(len));
        Match::success(start, end)
    })
}

pub(crate) fn is(class: CharClass, text: CompactString) -> CheckBox {
    Box::new(move |state, start| match state.runes().at(start) {
        Some(c) if class.test(c) => Match::success(start, start + 1),
        Some(_) => Match::failure(start, start, Failure::Expected(text.clone())),
        None => Match::failure(start, start, Failure::EndOfInput(text.clone())),
    })
}

pub(crate) fn seq(rules: RuleList) -> CheckBox {
    Box::new(move |state, start| {
        let mut pos = start;
        let mut children = Vec::with_capacity(rules.len());
        for rule in &rules {
            let result = rule.check(state, pos);
            pos = result.end;
            let failed = result.failure.clone();
            children.push(result);
            // first failing sub-rule stops the sequence; its failure and
            // farthest position become the sequence's
            if let Some(failure) = failed {
                return Match::failure_with(start, pos, children, failure);
            }
        }
        Match::success_with(start, pos, children)
    })
}

pub(crate) fn one(rules: RuleList, text: CompactString) -> CheckBox {
    Box::new(move |state, start| {
        // every alternative starts from the same position
        for rule in &rules {
            let result = rule.check(state, start);
            if result.is_success() {
                let end = result.end;
                return Match::success_with(start, end, vec![result]);
            }
        }
        Match::failure(start, start, Failure::Expected(text.clone()))
    })
}

pub(crate) fn mmx(
    min: usize,
    max: Option<usize>,
    rule: Arc<Rule>,
    text: CompactString,
) -> CheckBox {
    Box::new(move |state, start| {
        let mut pos = start;
        let mut count = 0usize;
        let mut furthest = start;
        let mut children = Vec::new();
        loop {
            if let Some(mx) = max {
                if count >= mx {
                    break;
                }
            }
            let result = rule.check(state, pos);
            furthest = furthest.max(result.end);
            if result.is_success() {
                let advanced = result.end > pos;
                pos = result.end;
                count += 1;
                children.push(result);
                if !advanced {
                    // a zero-width match cannot make further progress
                    break;
                }
            } else {
                children.push(result);
                break;
            }
        }
        if count < min {
            Match::failure_with(start, furthest, children, Failure::Expected(text.clone()))
        } else {
            Match::success_with(start, pos, children)
        }
    })
}

pub(crate) fn see(rule: Arc<Rule>, text: CompactString) -> CheckBox {
    Box::new(move |state, start| {
        if rule.check(state, start).is_success() {
            Match::success(start, start)
        } else {
            Match::failure(start, start, Failure::Expected(text.clone()))
        }
    })
}

pub(crate) fn not(rule: Arc<Rule>, text: CompactString) -> CheckBox {
    Box::new(move |state, start| {
        if rule.check(state, start).is_success() {
            Match::failure(start, start, Failure::Expected(text.clone()))
        } else {
            Match::success(start, start)
        }
    })
}

pub(crate) fn to(rule: Arc<Rule>, text: CompactString) -> CheckBox {
    Box::new(move |state, start| {
        let len = state.runes().len();
        let mut pos = start;
        loop {
            if rule.check(state, pos).is_success() {
                return Match::success(start, pos);
            }
            if pos >= len {
                return Match::failure(start, len, Failure::Expected(text.clone()));
            }
            pos += 1;
        }
    })
}

pub(crate) fn end(text: CompactString) -> CheckBox {
    Box::new(move |state, start| {
        if start >= state.runes().len() {
            Match::success(start, start)
        } else {
            Match::failure(start, start, Failure::Expected(text.clone()))
        }
    })
}

pub(crate) fn named(inner: Arc<Rule>, name: CompactString, id: u32) -> CheckBox {
    Box::new(move |state, start| {
        let mut result = inner.check(state, start);
        result.name = Some(name.clone());
        if id != 0 {
            result.id = id;
        }
        result
    })
}

pub(crate) fn reference(name: CompactString) -> CheckBox {
    Box::new(move |state, start| match state.grammar().rule(&name) {
        Some(rule) => rule.check(state, start),
        None => Match::failure(start, start, Failure::NotFound(name.clone())),
    })
}

pub(crate) fn save(name: CompactString) -> CheckBox {
    Box::new(move |state, start| {
        let Some(rule) = state.grammar().rule(&name) else {
            return Match::failure(start, start, Failure::NotFound(name.clone()));
        };
        let result = rule.check(state, start);
        if result.is_success() {
            let text = state.runes().slice(result.begin, result.end);
            state.save_literal(name.clone(), text.into());
        }
        result
    })
}

pub(crate) fn val(name: CompactString) -> CheckBox {
    Box::new(move |state, start| match state.saved_literal(&name) {
        Some(text) => {
            let lit: Vec<char> = text.chars().collect();
            check_literal(state.runes(), start, &lit)
        }
        None => Match::failure(start, start, Failure::NotFound(name.clone())),
    })
}

pub(crate) fn usage(message: CompactString) -> CheckBox {
    Box::new(move |_state, start| Match::failure(start, start, Failure::Usage(message.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runes(s: &str) -> Runes {
        s.into()
    }

    #[test]
    fn literal_matches_a_prefix() {
        let foo: Vec<char> = "foo".chars().collect();

        let exact = check_literal(&runes("foo"), 0, &foo);
        assert!(exact.is_success());
        assert_eq!((exact.begin, exact.end), (0, 3));

        // trailing input is left for the next rule
        let overlong = check_literal(&runes("fooo"), 0, &foo);
        assert!(overlong.is_success());
        assert_eq!(overlong.end, 3);
    }

    #[test]
    fn literal_failure_names_the_expected_rune() {
        let foo: Vec<char> = "foo".chars().collect();
        let short = check_literal(&runes("fo"), 0, &foo);
        assert_eq!((short.begin, short.end), (0, 2));
        assert_eq!(short.failure, Some(Failure::EndOfInput("o".into())));

        let oo: Vec<char> = "oo".chars().collect();
        let miss = check_literal(&runes("fooo"), 0, &oo);
        assert_eq!((miss.begin, miss.end), (0, 0));
        assert_eq!(miss.failure, Some(Failure::Expected("o".into())));

        assert!(check_literal(&runes("fooo"), 1, &oo).is_success());
        assert_eq!(check_literal(&runes("fooo"), 2, &oo).end, 4);
    }

    #[test]
    fn saved_literals_are_per_state() {
        let g = Grammar::new();
        let mut a = ScanState::new(runes("x"), &g);
        let b = ScanState::new(runes("x"), &g);

        a.save_literal("k".into(), "v".into());
        assert_eq!(a.saved_literal("k").map(|s| s.as_str()), Some("v"));
        assert!(b.saved_literal("k").is_none());
    }

    #[test]
    fn trace_depth_balances_across_enter_and_exit() {
        let g = Grammar::new();
        let mut tracer = RecordingTracer::default();
        let mut state = ScanState::traced(runes("x"), &g, &mut tracer);

        state.trace_enter("outer", 0);
        state.trace_enter("inner", 0);
        state.trace_exit("inner", &Match::success(0, 0));
        state.trace_exit("outer", &Match::success(0, 0));
        assert_eq!(state.depth, 0);
        assert_eq!(tracer.events.len(), 4);
    }
}
