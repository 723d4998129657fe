//! # Match Results
//!
//! The parse-tree node returned by every rule check.
//!
//! A [`Match`] records the span a rule covered, the sub-matches it
//! consumed, and (on failure) a typed [`Failure`]. Presence of the
//! failure is the sole success indicator: `begin == end` is a legitimate
//! zero-width success for lookahead and optional rules. On failure `end`
//! still holds the farthest position any sub-rule reached, which is the
//! primary diagnostic and recovery aid.
//!
//! Matches serialize to a deterministic single-line JSON object with
//! fixed key order: `N` (name, omitted if empty), `I` (id, omitted if
//! zero), `B`, `E`, `X` (failure string, omitted if none), `C` (children,
//! omitted if empty), `R` (the full input, root only). `Display` renders
//! the same JSON.

use std::fmt;

use compact_str::CompactString;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::Failure;
use crate::text::Runes;

/// Result of one rule check: a node of the parse tree.
///
/// All matches in a tree alias the same underlying buffer; only the root
/// carries a reference to it (children omit it for serialization
/// economy).
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Label assigned by the naming operator, if any.
    pub name: Option<CompactString>,
    /// Integer label assigned by the naming operator; `0` means unset.
    pub id: u32,
    /// Inclusive position where the match started.
    pub begin: usize,
    /// Exclusive farthest position advanced, whether or not the match
    /// succeeded.
    pub end: usize,
    /// Set iff the rule failed.
    pub failure: Option<Failure>,
    /// Sub-matches in left-to-right consumption order.
    pub children: Vec<Match>,
    /// Buffer reference, present only on the root of a scan.
    pub buffer: Option<Runes>,
}

impl Match {
    /// A successful match over `[begin, end)` with no children.
    #[must_use]
    pub fn success(begin: usize, end: usize) -> Self {
        Self {
            name: None,
            id: 0,
            begin,
            end,
            failure: None,
            children: Vec::new(),
            buffer: None,
        }
    }

    /// A successful match carrying sub-matches.
    #[must_use]
    pub fn success_with(begin: usize, end: usize, children: Vec<Match>) -> Self {
        Self {
            children,
            ..Self::success(begin, end)
        }
    }

    /// A failed match. `end` must be the farthest position reached.
    #[must_use]
    pub fn failure(begin: usize, end: usize, failure: Failure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::success(begin, end)
        }
    }

    /// A failed match carrying the sub-matches checked before failing.
    #[must_use]
    pub fn failure_with(
        begin: usize,
        end: usize,
        children: Vec<Match>,
        failure: Failure,
    ) -> Self {
        Self {
            children,
            failure: Some(failure),
            ..Self::success(begin, end)
        }
    }

    /// True iff no failure is set.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// The matched substring, resolved against `runes`.
    ///
    /// Children carry no buffer of their own, so the caller supplies the
    /// buffer the tree was scanned against (the root's
    /// [`buffer`](Self::buffer) when available).
    #[must_use]
    pub fn text(&self, runes: &Runes) -> String {
        runes.slice(self.begin, self.end)
    }

    /// Depth-first pre-order traversal of this match and every
    /// descendant.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Every match in the tree labeled `name`, in pre-order.
    #[must_use]
    pub fn named(&self, name: &str) -> Vec<&Match> {
        self.walk()
            .filter(|m| m.name.as_deref() == Some(name))
            .collect()
    }

    /// Every match in the tree labeled with integer `id`, in pre-order.
    #[must_use]
    pub fn with_id(&self, id: u32) -> Vec<&Match> {
        self.walk().filter(|m| m.id == id).collect()
    }

    /// The single-line JSON form described in the module docs.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("null"))
    }

    /// Indented, one-line-per-node rendering of the tree with the
    /// matched text resolved against `runes`. A debugging aid, not a
    /// serialization format.
    #[must_use]
    pub fn tree_string(&self, runes: &Runes) -> String {
        let mut out = String::new();
        self.tree_into(runes, 0, &mut out);
        out
    }

    fn tree_into(&self, runes: &Runes, depth: usize, out: &mut String) {
        use std::fmt::Write;

        let label = self.name.as_deref().unwrap_or("-");
        let _ = write!(
            out,
            "{:indent$}{label} [{},{}) {:?}",
            "",
            self.begin,
            self.end,
            self.text(runes),
            indent = depth * 2
        );
        if let Some(failure) = &self.failure {
            let _ = write!(out, " ! {failure}");
        }
        out.push('\n');
        for child in &self.children {
            child.tree_into(runes, depth + 1, out);
        }
    }
}

/// Iterator returned by [`Match::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Match>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Match;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

impl Serialize for Match {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Key order is part of the contract: N, I, B, E, X, C, R.
        let mut s = serializer.serialize_struct("Match", 7)?;
        if let Some(name) = &self.name {
            s.serialize_field("N", name.as_str())?;
        }
        if self.id != 0 {
            s.serialize_field("I", &self.id)?;
        }
        s.serialize_field("B", &self.begin)?;
        s.serialize_field("E", &self.end)?;
        if let Some(failure) = &self.failure {
            s.serialize_field("X", &failure.to_string())?;
        }
        if !self.children.is_empty() {
            s.serialize_field("C", &self.children)?;
        }
        if let Some(buffer) = &self.buffer {
            s.serialize_field("R", &buffer.to_string())?;
        }
        s.end()
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_key_order_and_omissions() {
        let mut root = Match::success_with(0, 3, vec![Match::success(0, 3)]);
        root.buffer = Some("foo".into());
        assert_eq!(root.to_json(), r#"{"B":0,"E":3,"C":[{"B":0,"E":3}],"R":"foo"}"#);
    }

    #[test]
    fn json_includes_name_id_and_failure() {
        let mut m = Match::failure(1, 1, Failure::Expected("o".into()));
        m.name = Some("Foo".into());
        m.id = 7;
        assert_eq!(m.to_json(), r#"{"N":"Foo","I":7,"B":1,"E":1,"X":"expected: o"}"#);
    }

    #[test]
    fn display_is_json() {
        let m = Match::success(2, 4);
        assert_eq!(m.to_string(), r#"{"B":2,"E":4}"#);
    }

    #[test]
    fn zero_width_success_is_not_failure() {
        let m = Match::success(3, 3);
        assert!(m.is_success());
    }

    #[test]
    fn named_descends_depth_first() {
        let mut a = Match::success(0, 1);
        a.name = Some("X".into());
        let mut b = Match::success(1, 2);
        b.name = Some("X".into());
        let inner = Match::success_with(1, 2, vec![b]);
        let root = Match::success_with(0, 2, vec![a, inner]);

        let found = root.named("X");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].begin, 0);
        assert_eq!(found[1].begin, 1);
    }

    #[test]
    fn text_resolves_against_buffer() {
        let runes: Runes = "hello".into();
        let m = Match::success(1, 4);
        assert_eq!(m.text(&runes), "ell");
    }

    #[test]
    fn tree_string_indents_children_and_marks_failures() {
        let runes: Runes = "ab".into();
        let mut child = Match::failure(1, 1, Failure::Expected("b".into()));
        child.name = Some("B".into());
        let root = Match::failure_with(0, 1, vec![Match::success(0, 1), child], Failure::Expected("b".into()));

        let rendered = root.tree_string(&runes);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("- [0,1)"));
        assert!(lines[1].starts_with("  - [0,1)"));
        assert!(lines[2].starts_with("  B [1,1)"));
        assert!(lines[2].ends_with("! expected: b"));
    }
}
