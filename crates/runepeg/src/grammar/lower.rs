//! Memoized lowering of expression terms into rules.
//!
//! Lowering a term: compute its canonical text, return the cached rule
//! if one exists, otherwise insert a pending rule *before* building its
//! closure and recurse through sub-terms. The pre-insertion is what
//! makes the table the join point for recursion: a reference operator
//! resolves through it at check time, so mutually recursive and
//! forward-referencing grammars lower without cycles in ownership:
//! closures capture `Arc`s to their direct sub-rules and nothing else.

use std::sync::Arc;

use compact_str::CompactString;

use super::{Grammar, Rule};
use crate::engine::{self, CheckBox, RuleList};
use crate::expr::Expr;

impl Grammar {
    /// Lower `term` into this grammar, memoized by canonical text, and
    /// return its rule.
    ///
    /// Equal canonical forms always return the same rule object. Terms
    /// under the naming operator are additionally cached under their
    /// label. Ill-typed (`Usage`) terms lower to rules that always fail;
    /// their sentinel text never collides with a well-typed form.
    pub fn make_rule(&mut self, term: &Expr) -> Arc<Rule> {
        let normalized = term.normalized();
        self.lower(&normalized)
    }

    /// Lowering proper; expects `term` in normalized shape.
    pub(crate) fn lower(&mut self, term: &Expr) -> Arc<Rule> {
        // named rules are identified by their label
        if let Expr::Name { name, .. } = term {
            if let Some(rule) = self.rules.get(name.as_str()) {
                return rule.clone();
            }
        }
        let text: CompactString = term.to_string().into();
        if let Some(rule) = self.rules.get(&text) {
            return rule.clone();
        }
        let key = match term {
            Expr::Name { name, .. } => name.clone(),
            _ => text.clone(),
        };
        let rule = Arc::new(Rule::pending(key.clone(), text));
        // insert before building the closure so sub-term lowering and
        // check-time references can see this rule
        self.rules.insert(key, rule.clone());
        let check = self.build_check(term);
        rule.install(check);
        rule
    }

    fn build_check(&mut self, term: &Expr) -> CheckBox {
        let text: CompactString = term.to_string().into();
        match term {
            Expr::Lit(value) => engine::lit(value.clone()),
            Expr::Rng { lo, hi } => engine::rng(*lo, *hi, text),
            Expr::Any { n } => engine::any_n(*n, text),
            Expr::AnyMmx { min, max } => engine::any_between(*min, *max, text),
            Expr::Is(class) => engine::is(*class, text),
            Expr::Seq(items) => {
                let rules: RuleList = items.iter().map(|item| self.lower(item)).collect();
                engine::seq(rules)
            }
            Expr::One(items) => {
                let rules: RuleList = items.iter().map(|item| self.lower(item)).collect();
                engine::one(rules, text)
            }
            Expr::Mmx { min, max, expr } => engine::mmx(*min, *max, self.lower(expr), text),
            Expr::See(expr) => engine::see(self.lower(expr), text),
            Expr::Not(expr) => engine::not(self.lower(expr), text),
            Expr::To(expr) => engine::to(self.lower(expr), text),
            Expr::End => engine::end(text),
            Expr::Name { name, id, expr } => engine::named(self.lower(expr), name.clone(), *id),
            Expr::Ref(name) => engine::reference(name.clone()),
            Expr::Save(name) => engine::save(name.clone()),
            Expr::Val(name) => engine::val(name.clone()),
            Expr::Usage(message) => engine::usage(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowering_memoizes_by_canonical_text() {
        let mut g = Grammar::new();
        let a = g.make_rule(&Expr::lit("foo"));
        let b = g.make_rule(&Expr::lit("foo"));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn equivalent_terms_memoize_to_one_rule() {
        let mut g = Grammar::new();
        let combined = g.make_rule(&Expr::Seq(vec![Expr::lit("a"), Expr::lit("b")]));
        let literal = g.make_rule(&Expr::lit("ab"));
        assert!(Arc::ptr_eq(&combined, &literal));
    }

    #[test]
    fn sub_terms_are_cached_too() {
        let mut g = Grammar::new();
        g.make_rule(&Expr::seq([Expr::lit("foo"), Expr::end()]));
        assert!(g.rule(r#""foo""#).is_some());
        assert!(g.rule("End{}").is_some());
    }

    #[test]
    fn named_terms_key_the_table_by_label() {
        let mut g = Grammar::new();
        let named = g.make_rule(&Expr::name("Foo", Expr::lit("foo")));
        assert_eq!(named.name(), "Foo");
        assert_eq!(named.text(), r#"Name{"Foo", "foo"}"#);

        let found = g.rule("Foo").expect("alias installed");
        assert!(Arc::ptr_eq(&named, &found));
        // the inner rule lives in the cache as well
        assert!(g.rule(r#""foo""#).is_some());
    }

    #[test]
    fn usage_terms_lower_to_failing_rules() {
        let mut g = Grammar::new();
        let rule = g.make_rule(&Expr::rng('z', 'a'));
        assert!(rule.text().starts_with("%!USAGE: "));

        let runes: crate::Runes = "anything".into();
        let mut state = crate::engine::ScanState::new(runes, &g);
        let result = rule.check(&mut state, 0);
        assert!(!result.is_success());
        assert!(result.to_json().contains("%!USAGE: "));
    }

    #[test]
    fn anonymous_added_rules_use_the_counter() {
        let mut g = Grammar::new();
        let rule = g.add_rule("", "", |_state: &mut crate::ScanState<'_>, pos| {
            crate::Match::success(pos, pos)
        });
        assert_eq!(rule.name(), "Rule1");
        assert!(g.rule("Rule1").is_some());
    }
}
