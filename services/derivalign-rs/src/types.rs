//! Shared data structures for the derivation alignment engine.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// One phoneme (or sentinel) token of an aligned sequence
pub type Symbol = String;

/// Beginning-of-sequence sentinel
pub const BOS: &str = "^";
/// End-of-sequence sentinel
pub const EOS: &str = "$";
/// Rendering used for an absent symbol
pub const EMPTY: &str = "∅";

pub fn is_sentinel(symbol: &str) -> bool {
    symbol == BOS || symbol == EOS
}

/// Edit operation in sequence alignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Nop(Symbol),
    Delete(Symbol),
    Insert(Symbol),
    Substitute(Symbol, Symbol),
}

impl Operation {
    /// Diagonal move: `Nop` when both sides agree, `Substitute` otherwise.
    pub fn diagonal(d_in: &str, d_out: &str) -> Self {
        if d_in == d_out {
            Operation::Nop(d_in.to_string())
        } else {
            Operation::Substitute(d_in.to_string(), d_out.to_string())
        }
    }

    /// Consumed source symbol, empty for insertions
    pub fn d_in(&self) -> &str {
        match self {
            Operation::Nop(s) | Operation::Delete(s) => s,
            Operation::Insert(_) => "",
            Operation::Substitute(s, _) => s,
        }
    }

    /// Produced target symbol, empty for deletions
    pub fn d_out(&self) -> &str {
        match self {
            Operation::Nop(s) | Operation::Insert(s) => s,
            Operation::Delete(_) => "",
            Operation::Substitute(_, s) => s,
        }
    }

    pub fn is_nop(&self) -> bool {
        matches!(self, Operation::Nop(_))
    }

    /// Whether this move consumes a source symbol
    pub fn consumes_source(&self) -> bool {
        !matches!(self, Operation::Insert(_))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Nop(_) => write!(f, "nop"),
            Operation::Delete(s) => write!(f, "del {s}"),
            Operation::Insert(s) => write!(f, "ins {s}"),
            Operation::Substitute(a, b) => write!(f, "{a}->{b}"),
        }
    }
}

/// Where a transition sits relative to the root/suffix boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPosition {
    Before,
    At,
    After,
}

/// One step of a change sequence.
///
/// `span` holds the padded source rows the step consumed. A pure insertion
/// has an empty span placed right after the last consumed row, so it
/// inherits that row as its anchor. Equality and hashing only look at
/// `(d_in, d_out)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub d_in: String,
    pub d_out: String,
    pub span: Range<usize>,
}

impl Transition {
    pub fn new(d_in: impl Into<String>, d_out: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            d_in: d_in.into(),
            d_out: d_out.into(),
            span,
        }
    }

    /// Transition for `op` landing in matrix row `row`
    pub fn from_operation(op: &Operation, row: usize) -> Self {
        let span = if op.consumes_source() {
            row..row + 1
        } else {
            row + 1..row + 1
        };
        Self::new(op.d_in(), op.d_out(), span)
    }

    /// The leading `BOS -> BOS` step every raw path starts with
    pub fn start() -> Self {
        Self::new(BOS, BOS, 0..1)
    }

    /// False for zero-effect steps (`d_in == d_out`)
    pub fn is_change(&self) -> bool {
        self.d_in != self.d_out
    }

    pub fn is_insertion(&self) -> bool {
        self.d_in.is_empty()
    }

    /// Merge `next` (the step immediately after `self`) into `self`
    pub fn absorb(&mut self, next: &Transition) {
        self.d_in.push_str(&next.d_in);
        self.d_out.push_str(&next.d_out);
        self.span = match (self.span.is_empty(), next.span.is_empty()) {
            (true, false) => next.span.clone(),
            (false, false) => self.span.start..next.span.end,
            (_, true) => self.span.clone(),
        };
    }

    /// Unpadded index of the first consumed source symbol
    pub fn source_position(&self) -> Option<isize> {
        if self.span.is_empty() {
            None
        } else {
            Some(self.span.start as isize - 1)
        }
    }

    /// Unpadded index of the source symbol consumed just before this step
    pub fn anchor_position(&self) -> isize {
        self.span.start as isize - 2
    }

    /// Bucket for this step given the last root index of the source
    pub fn position_relative_to(&self, boundary: isize) -> BoundaryPosition {
        match self.source_position() {
            Some(pos) if pos < boundary => BoundaryPosition::Before,
            Some(pos) if pos == boundary => BoundaryPosition::At,
            Some(_) => BoundaryPosition::After,
            None if self.anchor_position() < boundary => BoundaryPosition::Before,
            None => BoundaryPosition::After,
        }
    }

    fn render(s: &str) -> &str {
        if s.is_empty() {
            EMPTY
        } else {
            s
        }
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.d_in == other.d_in && self.d_out == other.d_out
    }
}

impl Eq for Transition {}

impl Hash for Transition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.d_in.hash(state);
        self.d_out.hash(state);
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}",
            Self::render(&self.d_in),
            Self::render(&self.d_out)
        )
    }
}

/// Ordered edit path from the start to the end of the padded sequences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSequence {
    transitions: Vec<Transition>,
    source_len: usize,
}

impl ChangeSequence {
    pub fn new(transitions: Vec<Transition>, source_len: usize) -> Self {
        Self {
            transitions,
            source_len,
        }
    }

    /// Length of the unpadded source sequence this path consumes
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    /// Steps immediately before and after position `idx`
    pub fn neighbors(&self, idx: usize) -> (Option<&Transition>, Option<&Transition>) {
        let before = idx.checked_sub(1).and_then(|i| self.transitions.get(i));
        let after = self.transitions.get(idx + 1);
        (before, after)
    }

    /// Steps with a visible effect, in order
    pub fn edits(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(|t| t.is_change())
    }

    /// Number of groups with a visible effect
    pub fn edit_count(&self) -> usize {
        self.edits().count()
    }

    /// Copy keeping only the steps with a visible effect
    pub fn without_noops(&self) -> ChangeSequence {
        ChangeSequence::new(self.edits().cloned().collect(), self.source_len)
    }
}

impl<'a> IntoIterator for &'a ChangeSequence {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}

impl fmt::Display for ChangeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.transitions.iter().map(|t| t.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Canonical edits split around the root/suffix boundary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEdits {
    pub before: Vec<Transition>,
    pub at: Vec<Transition>,
    pub after: Vec<Transition>,
}

impl ClassifiedEdits {
    pub fn bucket(&self, position: BoundaryPosition) -> &[Transition] {
        match position {
            BoundaryPosition::Before => &self.before,
            BoundaryPosition::At => &self.at,
            BoundaryPosition::After => &self.after,
        }
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.at.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All edits in sequence order
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.before.iter().chain(&self.at).chain(&self.after)
    }
}

impl fmt::Display for ClassifiedEdits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |ts: &[Transition]| {
            ts.iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        write!(
            f,
            "{}\t{}\t{}",
            join(&self.before),
            join(&self.at),
            join(&self.after)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_accessors() {
        let sub = Operation::diagonal("a", "ă");
        assert_eq!(sub, Operation::Substitute("a".into(), "ă".into()));
        assert_eq!(sub.d_in(), "a");
        assert_eq!(sub.d_out(), "ă");
        assert_eq!(sub.to_string(), "a->ă");

        let nop = Operation::diagonal("s", "s");
        assert!(nop.is_nop());
        assert_eq!(Operation::Insert("u".into()).d_in(), "");
        assert_eq!(Operation::Delete("e".into()).to_string(), "del e");
    }

    #[test]
    fn test_transition_equality_ignores_span() {
        let a = Transition::new("t", "ț", 2..3);
        let b = Transition::new("t", "ț", 5..6);
        assert_eq!(a, b);
        assert!(a.is_change());
        assert!(!Transition::start().is_change());
    }

    #[test]
    fn test_insertion_inherits_anchor() {
        let ins = Transition::from_operation(&Operation::Insert("u".into()), 3);
        assert!(ins.is_insertion());
        assert_eq!(ins.source_position(), None);
        assert_eq!(ins.anchor_position(), 2);
        assert_eq!(ins.position_relative_to(2), BoundaryPosition::After);
        assert_eq!(ins.position_relative_to(3), BoundaryPosition::Before);
    }

    #[test]
    fn test_absorb_concatenates_and_spans() {
        let mut first = Transition::new("", "i", 3..3);
        first.absorb(&Transition::new("a", "e", 3..4));
        assert_eq!(first.d_in, "a");
        assert_eq!(first.d_out, "ie");
        assert_eq!(first.span, 3..4);

        let mut sub = Transition::new("t", "č", 2..3);
        sub.absorb(&Transition::new("", "i", 3..3));
        assert_eq!(sub.span, 2..3);
        assert_eq!(sub.to_string(), "t->či");
    }

    #[test]
    fn test_display_uses_empty_marker() {
        assert_eq!(Transition::new("", "u", 1..1).to_string(), "∅->u");
        assert_eq!(Transition::new("e", "", 1..2).to_string(), "e->∅");
    }

    #[test]
    fn test_neighbors() {
        let seq = ChangeSequence::new(
            vec![
                Transition::start(),
                Transition::new("a", "a", 1..2),
                Transition::new(EOS, EOS, 2..3),
            ],
            1,
        );
        let (before, after) = seq.neighbors(1);
        assert_eq!(before, Some(&Transition::start()));
        assert_eq!(after.map(|t| t.d_in.as_str()), Some(EOS));
        assert_eq!(seq.neighbors(0).0, None);
        assert_eq!(seq.edit_count(), 0);
    }
}
