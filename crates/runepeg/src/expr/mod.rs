//! # Expression Terms
//!
//! The closed operator algebra from which grammars are built.
//!
//! ## Overview
//!
//! An [`Expr`] is a tagged value enumerating every PEG operator: literal,
//! rune range, any-N, class test, sequence, ordered choice, bounded
//! greedy repetition, positive and negative lookahead, scan-until,
//! end-of-input, naming, reference, save, and value. Terms are plain
//! data; [`Grammar::make_rule`](crate::Grammar::make_rule) lowers them
//! into checkable rules.
//!
//! Every term prints to a unique canonical string (its `Display` form),
//! which doubles as the memoization key during lowering. Printing is
//! total: ill-typed constructions become [`Expr::Usage`] terms whose
//! canonical form starts with the `%!USAGE:` sentinel and which lower to
//! rules that always fail. The constructor methods below validate their
//! arguments and degrade to `Usage` rather than panic.
//!
//! ## Example
//!
//! ```rust
//! use runepeg::Expr;
//!
//! let term = Expr::seq([
//!     Expr::one([Expr::lit("foo"), Expr::lit("bar")]),
//!     Expr::end(),
//! ]);
//! assert_eq!(term.to_string(), r#"Seq{One{"foo", "bar"}, End{}}"#);
//! ```

pub mod class;
mod print;

use compact_str::{format_compact, CompactString};

pub use class::CharClass;

/// A PEG expression term.
///
/// Prefer the constructor methods over building variants directly: they
/// validate arguments (degrading to [`Expr::Usage`]) and unwrap
/// single-element composites the way canonical printing expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Literal string of code points.
    Lit(CompactString),
    /// Single rune in the inclusive range `[lo, hi]`.
    Rng { lo: char, hi: char },
    /// Exactly `n` runes, values unexamined.
    Any { n: usize },
    /// Greedily between `min` and `max` runes (`None` = unbounded),
    /// values unexamined.
    AnyMmx { min: usize, max: Option<usize> },
    /// Single rune satisfying a named class predicate.
    Is(CharClass),
    /// Each sub-rule in order, every result kept as a child.
    Seq(Vec<Expr>),
    /// Ordered choice: first success wins, at the same starting position.
    One(Vec<Expr>),
    /// Greedy repetition of a sub-rule between `min` and `max` times
    /// (`None` = unbounded).
    Mmx {
        min: usize,
        max: Option<usize>,
        expr: Box<Expr>,
    },
    /// Positive lookahead: zero-width success iff the sub-rule matches.
    See(Box<Expr>),
    /// Negative lookahead: zero-width success iff the sub-rule fails.
    Not(Box<Expr>),
    /// Scan forward to the first position where the sub-rule matches,
    /// non-inclusive.
    To(Box<Expr>),
    /// Succeeds only at end-of-input. Never advances.
    End,
    /// Same as the sub-rule, labeling its result and aliasing it in the
    /// rule table under `name`.
    Name {
        name: CompactString,
        /// Optional integer label; `0` means unset.
        id: u32,
        expr: Box<Expr>,
    },
    /// Delegate to the rule registered under `name`, resolved at check
    /// time (permits forward references and recursion).
    Ref(CompactString),
    /// Check the rule registered under `name`; on success save its
    /// matched text as a literal for later [`Expr::Val`] use.
    Save(CompactString),
    /// Match the literal most recently saved under `name` in this scan.
    Val(CompactString),
    /// An ill-typed construction. Prints with the `%!USAGE:` sentinel and
    /// lowers to an always-failing rule.
    Usage(CompactString),
}

impl Expr {
    /// Literal string.
    #[must_use]
    pub fn lit(value: impl Into<CompactString>) -> Self {
        Self::Lit(value.into())
    }

    /// Single rune in `[lo, hi]`.
    #[must_use]
    pub fn rng(lo: char, hi: char) -> Self {
        if lo > hi {
            return Self::Usage("Rng{lo, hi} with lo <= hi".into());
        }
        Self::Rng { lo, hi }
    }

    /// Exactly `n` runes of any value.
    #[must_use]
    pub fn any(n: usize) -> Self {
        Self::Any { n }
    }

    /// Between `min` and `max` runes of any value, greedy. `None` means
    /// no upper bound. A bounded `max` must satisfy `min < max` and
    /// `max > 0`.
    #[must_use]
    pub fn any_between(min: usize, max: Option<usize>) -> Self {
        if let Some(mx) = max {
            if mx == 0 || min >= mx {
                return Self::Usage(
                    "Any{n} or Any{min, max} with min < max and max > 0".into(),
                );
            }
        }
        Self::AnyMmx { min, max }
    }

    /// Single rune satisfying the named class.
    #[must_use]
    pub fn is(class: CharClass) -> Self {
        if class.name().is_empty() {
            return Self::Usage("Is{class} requires a named class".into());
        }
        Self::Is(class)
    }

    /// Sequence of sub-rules. A single element is returned unwrapped.
    #[must_use]
    pub fn seq<I: IntoIterator<Item = Self>>(items: I) -> Self {
        let mut items: Vec<Self> = items.into_iter().collect();
        match items.len() {
            0 => Self::Usage("Seq{rule, ...} requires at least one rule".into()),
            1 => items.remove(0),
            _ => Self::Seq(items),
        }
    }

    /// Ordered choice over alternatives. A single element is returned
    /// unwrapped.
    #[must_use]
    pub fn one<I: IntoIterator<Item = Self>>(items: I) -> Self {
        let mut items: Vec<Self> = items.into_iter().collect();
        match items.len() {
            0 => Self::Usage("One{rule, ...} requires at least one rule".into()),
            1 => items.remove(0),
            _ => Self::One(items),
        }
    }

    /// Greedy repetition between `min` and `max` times; `None` means
    /// unbounded. A bounded `max` must satisfy `min <= max` and `max > 0`.
    #[must_use]
    pub fn mmx(min: usize, max: Option<usize>, expr: Self) -> Self {
        if let Some(mx) = max {
            if mx == 0 || min > mx {
                return Self::Usage(
                    "Mmx{min, max, rule} with min <= max and max > 0, or unbounded max".into(),
                );
            }
        }
        Self::Mmx {
            min,
            max,
            expr: Box::new(expr),
        }
    }

    /// Zero or one (`rule?`).
    #[must_use]
    pub fn opt(expr: Self) -> Self {
        Self::mmx(0, Some(1), expr)
    }

    /// Zero or more (`rule*`).
    #[must_use]
    pub fn star(expr: Self) -> Self {
        Self::mmx(0, None, expr)
    }

    /// One or more (`rule+`).
    #[must_use]
    pub fn plus(expr: Self) -> Self {
        Self::mmx(1, None, expr)
    }

    /// At least `n` (`rule{n,}`).
    #[must_use]
    pub fn at_least(n: usize, expr: Self) -> Self {
        Self::mmx(n, None, expr)
    }

    /// At most `n` (`rule{0,n}`).
    #[must_use]
    pub fn at_most(n: usize, expr: Self) -> Self {
        Self::mmx(0, Some(n), expr)
    }

    /// Exactly `n` (`rule{n}`).
    #[must_use]
    pub fn exactly(n: usize, expr: Self) -> Self {
        Self::mmx(n, Some(n), expr)
    }

    /// Positive lookahead (`&rule`).
    #[must_use]
    pub fn see(expr: Self) -> Self {
        Self::See(Box::new(expr))
    }

    /// Negative lookahead (`!rule`).
    #[must_use]
    pub fn not(expr: Self) -> Self {
        Self::Not(Box::new(expr))
    }

    /// Scan forward until the sub-rule matches, non-inclusive (`..rule`).
    #[must_use]
    pub fn to(expr: Self) -> Self {
        Self::To(Box::new(expr))
    }

    /// End of input (`!.`).
    #[must_use]
    pub fn end() -> Self {
        Self::End
    }

    /// Label the sub-rule's result and alias it in the rule table.
    #[must_use]
    pub fn name(name: impl Into<CompactString>, expr: Self) -> Self {
        Self::name_id(name, 0, expr)
    }

    /// Like [`name`](Self::name) with an additional integer label.
    #[must_use]
    pub fn name_id(name: impl Into<CompactString>, id: u32, expr: Self) -> Self {
        let name = name.into();
        if name.is_empty() {
            return Self::Usage("Name{name, rule} requires a non-empty name".into());
        }
        Self::Name {
            name,
            id,
            expr: Box::new(expr),
        }
    }

    /// Delegate to the rule registered under `name`, looked up at check
    /// time.
    #[must_use]
    pub fn reference(name: impl Into<CompactString>) -> Self {
        let name = name.into();
        if name.is_empty() {
            return Self::Usage("Ref{name} requires a non-empty name".into());
        }
        Self::Ref(name)
    }

    /// Check the rule registered under `name` and save its matched text.
    #[must_use]
    pub fn save(name: impl Into<CompactString>) -> Self {
        let name = name.into();
        if name.is_empty() {
            return Self::Usage("Save{name} requires a non-empty name".into());
        }
        Self::Save(name)
    }

    /// Match the literal saved under `name` earlier in the scan.
    #[must_use]
    pub fn val(name: impl Into<CompactString>) -> Self {
        let name = name.into();
        if name.is_empty() {
            return Self::Usage("Val{name} requires a non-empty name".into());
        }
        Self::Val(name)
    }

    /// True for terms whose canonical form carries the usage sentinel.
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// The canonical shape of this term: adjacent literals inside
    /// sequences combined, single-element composites unwrapped, empty
    /// composites degraded to usage terms.
    ///
    /// Canonical printing and rule lowering both operate on this shape,
    /// so `seq([lit("a"), lit("b")])` and `lit("ab")` memoize to the same
    /// rule.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::Seq(items) => {
                let mut out: Vec<Self> = Vec::with_capacity(items.len());
                for item in items {
                    let normalized = item.normalized();
                    // combine adjacent literals; recognition is unchanged
                    if let (Some(Self::Lit(run)), Self::Lit(next)) =
                        (out.last_mut(), &normalized)
                    {
                        run.push_str(next);
                        continue;
                    }
                    out.push(normalized);
                }
                match out.len() {
                    0 => Self::Usage("Seq{rule, ...} requires at least one rule".into()),
                    1 => out.remove(0),
                    _ => Self::Seq(out),
                }
            }
            Self::One(items) => {
                let mut out: Vec<Self> = items.iter().map(Self::normalized).collect();
                match out.len() {
                    0 => Self::Usage("One{rule, ...} requires at least one rule".into()),
                    1 => out.remove(0),
                    _ => Self::One(out),
                }
            }
            Self::Mmx { min, max, expr } => Self::Mmx {
                min: *min,
                max: *max,
                expr: Box::new(expr.normalized()),
            },
            Self::See(expr) => Self::See(Box::new(expr.normalized())),
            Self::Not(expr) => Self::Not(Box::new(expr.normalized())),
            Self::To(expr) => Self::To(Box::new(expr.normalized())),
            Self::Name { name, id, expr } => Self::Name {
                name: name.clone(),
                id: *id,
                expr: Box::new(expr.normalized()),
            },
            other => other.clone(),
        }
    }

    /// The usage message for ill-typed terms, if this is one.
    #[must_use]
    pub fn usage_message(&self) -> Option<&str> {
        match self {
            Self::Usage(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::lit(value)
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Lit(value.into())
    }
}

impl From<char> for Expr {
    fn from(value: char) -> Self {
        Self::Lit(format_compact!("{value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_element_composites_unwrap() {
        assert_eq!(Expr::seq([Expr::lit("a")]), Expr::lit("a"));
        assert_eq!(Expr::one([Expr::end()]), Expr::End);
    }

    #[test]
    fn ill_typed_constructions_degrade_to_usage() {
        assert!(Expr::rng('z', 'a').is_usage());
        assert!(Expr::any_between(3, Some(3)).is_usage());
        assert!(Expr::any_between(0, Some(0)).is_usage());
        assert!(Expr::mmx(4, Some(2), Expr::lit("x")).is_usage());
        assert!(Expr::seq([]).is_usage());
        assert!(Expr::name("", Expr::lit("x")).is_usage());
        assert!(Expr::reference("").is_usage());
    }

    #[test]
    fn unbounded_forms_are_accepted() {
        assert!(!Expr::any_between(2, None).is_usage());
        assert!(!Expr::star(Expr::lit("x")).is_usage());
    }

    #[test]
    fn normalization_combines_adjacent_literals() {
        let term = Expr::Seq(vec![
            Expr::lit("a"),
            Expr::lit("b"),
            Expr::end(),
            Expr::lit("c"),
        ]);
        let normalized = term.normalized();
        assert_eq!(
            normalized,
            Expr::Seq(vec![Expr::lit("ab"), Expr::End, Expr::lit("c")])
        );
    }

    #[test]
    fn normalization_collapses_to_single_literal() {
        let term = Expr::Seq(vec![Expr::lit("a"), Expr::lit("b"), Expr::lit("c")]);
        assert_eq!(term.normalized(), Expr::lit("abc"));
    }

    #[test]
    fn combination_stops_at_non_literals() {
        let term = Expr::Seq(vec![
            Expr::lit("a"),
            Expr::reference("Foo"),
            Expr::lit("b"),
        ]);
        let normalized = term.normalized();
        assert_eq!(
            normalized,
            Expr::Seq(vec![
                Expr::lit("a"),
                Expr::Ref("Foo".into()),
                Expr::lit("b"),
            ])
        );
    }
}
