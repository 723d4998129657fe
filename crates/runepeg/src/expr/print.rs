//! Canonical printing of expression terms.
//!
//! The `Display` form of an [`Expr`] is its canonical text: the unique,
//! deterministic string that serves as the memoization key during
//! lowering. Composites print as `Op{arg1, arg2}`, literals print
//! quoted, and ill-typed terms print with the `%!USAGE:` sentinel (which
//! can never collide with a well-typed form). Printing normalizes first,
//! so `Seq{"a", "b"}` and `"ab"` render identically.

use std::fmt;

use super::Expr;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.normalized().fmt_canonical(f)
    }
}

impl Expr {
    /// Print a term assumed to already be in normalized shape.
    fn fmt_canonical(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lit(value) => write!(f, "{:?}", value.as_str()),
            Self::Rng { lo, hi } => write!(f, "Rng{{{lo:?}, {hi:?}}}"),
            Self::Any { n } => write!(f, "Any{{{n}}}"),
            Self::AnyMmx { min, max } => match max {
                Some(mx) => write!(f, "Any{{{min}, {mx}}}"),
                None => write!(f, "Any{{{min}, -1}}"),
            },
            Self::Is(class) => write!(f, "Is{{{}}}", class.name()),
            Self::Seq(items) => fmt_list(f, "Seq", items),
            Self::One(items) => fmt_list(f, "One", items),
            Self::Mmx { min, max, expr } => {
                match max {
                    Some(mx) => write!(f, "Mmx{{{min}, {mx}, ")?,
                    None => write!(f, "Mmx{{{min}, -1, ")?,
                }
                expr.fmt_canonical(f)?;
                f.write_str("}")
            }
            Self::See(expr) => fmt_wrapped(f, "See", expr),
            Self::Not(expr) => fmt_wrapped(f, "Not", expr),
            Self::To(expr) => fmt_wrapped(f, "To", expr),
            Self::End => f.write_str("End{}"),
            Self::Name { name, id, expr } => {
                write!(f, "Name{{{:?}, ", name.as_str())?;
                if *id != 0 {
                    write!(f, "{id}, ")?;
                }
                expr.fmt_canonical(f)?;
                f.write_str("}")
            }
            Self::Ref(name) => write!(f, "Ref{{{:?}}}", name.as_str()),
            Self::Save(name) => write!(f, "Save{{{:?}}}", name.as_str()),
            Self::Val(name) => write!(f, "Val{{{:?}}}", name.as_str()),
            Self::Usage(message) => write!(f, "%!USAGE: {message}"),
        }
    }
}

fn fmt_list(f: &mut fmt::Formatter<'_>, op: &str, items: &[Expr]) -> fmt::Result {
    write!(f, "{op}{{")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.fmt_canonical(f)?;
    }
    f.write_str("}")
}

fn fmt_wrapped(f: &mut fmt::Formatter<'_>, op: &str, expr: &Expr) -> fmt::Result {
    write!(f, "{op}{{")?;
    expr.fmt_canonical(f)?;
    f.write_str("}")
}

#[cfg(test)]
mod tests {
    use crate::expr::{class, Expr};

    #[test]
    fn literals_print_quoted() {
        assert_eq!(Expr::lit("foo").to_string(), r#""foo""#);
        assert_eq!(Expr::lit("a\nb").to_string(), r#""a\nb""#);
    }

    #[test]
    fn composites_print_as_op_braces() {
        let term = Expr::seq([
            Expr::one([Expr::lit("foo"), Expr::lit("bar")]),
            Expr::rng('a', 'f'),
            Expr::end(),
        ]);
        assert_eq!(
            term.to_string(),
            r#"Seq{One{"foo", "bar"}, Rng{'a', 'f'}, End{}}"#
        );
    }

    #[test]
    fn repetition_prints_unbounded_as_minus_one() {
        assert_eq!(
            Expr::star(Expr::lit("x")).to_string(),
            r#"Mmx{0, -1, "x"}"#
        );
        assert_eq!(
            Expr::mmx(1, Some(3), Expr::lit("x")).to_string(),
            r#"Mmx{1, 3, "x"}"#
        );
        assert_eq!(Expr::any_between(2, None).to_string(), "Any{2, -1}");
    }

    #[test]
    fn adjacent_literals_combine_in_print() {
        let combined = Expr::Seq(vec![Expr::lit("a"), Expr::lit("b"), Expr::lit("c")]);
        assert_eq!(combined.to_string(), Expr::lit("abc").to_string());
    }

    #[test]
    fn class_and_lookup_forms() {
        assert_eq!(Expr::is(class::DIGIT).to_string(), "Is{Digit}");
        assert_eq!(Expr::reference("Foo").to_string(), r#"Ref{"Foo"}"#);
        assert_eq!(Expr::save("Post").to_string(), r#"Save{"Post"}"#);
        assert_eq!(Expr::val("Post").to_string(), r#"Val{"Post"}"#);
        assert_eq!(
            Expr::name("Foo", Expr::lit("foo")).to_string(),
            r#"Name{"Foo", "foo"}"#
        );
        assert_eq!(
            Expr::name_id("Foo", 7, Expr::lit("foo")).to_string(),
            r#"Name{"Foo", 7, "foo"}"#
        );
    }

    #[test]
    fn usage_sentinel_never_looks_well_typed() {
        let usage = Expr::rng('z', 'a');
        assert!(usage.to_string().starts_with("%!USAGE: "));
    }

    #[test]
    fn equal_terms_print_identically() {
        let a = Expr::seq([Expr::lit("x"), Expr::see(Expr::lit("y"))]);
        let b = Expr::seq([Expr::lit("x"), Expr::see(Expr::lit("y"))]);
        assert_eq!(a.to_string(), b.to_string());
    }
}
