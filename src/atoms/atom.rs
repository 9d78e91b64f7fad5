//! # Atoms
//!
//! An [`Atom`] is an immutable, cheaply cloned handle to one node of a grammar.
//! The node kinds form a closed set ([`AtomKind`]), so evaluation, rendering and
//! any other consumer match on them exhaustively.
//!
//! Atoms are usually built with the functions in [`prelude`](super::prelude) and
//! the builder methods and operators defined here:
//!
//! ```ignore
//! use pegrat::prelude::*;
//!
//! let digit = class("[0-9]");
//! let number = digit.many1().named("number");
//! let sum = number.clone() >> lit("+") >> number;
//! ```

use std::fmt;
use std::ops::{BitOr, Shr};
use std::sync::Arc;

use regex::Regex;

use crate::context::Captures;
use crate::grammar::RuleId;
use crate::source::Source;
use crate::tree::Tree;

/// Transform applied to a flattened result by [`Atom::map`].
pub type MapFn = Arc<dyn Fn(Tree) -> Tree + Send + Sync>;
/// Builds an atom at parse time from the source and the current captures.
pub type DynamicFn = Arc<dyn Fn(&Source, &Captures) -> Atom + Send + Sync>;
pub type CharPredicate = Arc<dyn Fn(char) -> bool + Send + Sync>;
/// Folds `left`, `operator`, `right` into one tree.
pub type Reducer = Arc<dyn Fn(Tree, Tree, Tree) -> Tree + Send + Sync>;

/// A parsing expression. Cloning is cheap and shares the node.
#[derive(Clone)]
pub struct Atom(Arc<AtomKind>);

/// Every kind of atom.
pub enum AtomKind {
    /// Matches the exact text.
    Literal(Arc<str>),
    /// Matches one character.
    Class(CharClass),
    /// Matches every child in order.
    Sequence(Vec<Atom>),
    /// Matches the first child that matches, trying them left to right.
    Alternative(Vec<Atom>),
    /// Matches the child between `min` and `max` times, greedily. `maybe` marks
    /// the `0..=1` form whose value is the child's value rather than a list.
    Repetition {
        atom: Atom,
        min: usize,
        max: Option<usize>,
        maybe: bool,
    },
    /// Checks the child without consuming input.
    Lookahead { atom: Atom, positive: bool },
    /// Stores the child's value under `name`.
    Named { atom: Atom, name: Arc<str> },
    /// A reference to a grammar rule.
    Rule(RuleRef),
    /// Matches the child but drops its value.
    Ignore(Atom),
    /// Transforms the child's flattened value.
    Map { atom: Atom, f: MapFn },
    /// Matches the child and yields its value, leaving the input where it was.
    Mark(Atom),
    /// Matches the child and remembers its value for later [`AtomKind::Dynamic`]
    /// atoms.
    Capture { atom: Atom, name: Arc<str> },
    /// Runs the child in a fresh capture scope.
    Scope(Atom),
    /// Picks the atom to run at evaluation time.
    Dynamic(DynamicFn),
    /// Binary operator expression parsed by precedence climbing.
    Infix(Infix),
    /// Tags failures inside the child with a human readable name.
    Label { atom: Atom, label: Arc<str> },
    /// Accepts the rest of the input without producing a value.
    Halt,
}

/// Single-character matchers.
pub enum CharClass {
    Any,
    Pattern { pattern: Arc<str>, regex: Regex },
    Predicate { name: Arc<str>, test: CharPredicate },
}

impl CharClass {
    pub fn accepts(&self, c: char) -> bool {
        match self {
            CharClass::Any => true,
            CharClass::Pattern { regex, .. } => {
                let mut buf = [0u8; 4];
                regex.is_match(c.encode_utf8(&mut buf))
            }
            CharClass::Predicate { test, .. } => test(c),
        }
    }
}

/// Reference from an atom to a rule of the grammar that created it.
#[derive(Debug, Clone)]
pub struct RuleRef {
    pub(crate) id: Option<RuleId>,
    pub(crate) table: usize,
    pub(crate) name: Arc<str>,
}

impl RuleRef {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// An operand atom and its operator table, parsed by precedence climbing.
#[derive(Clone)]
pub struct Infix {
    pub(crate) element: Atom,
    pub(crate) operators: Vec<(Atom, u32, Assoc)>,
    pub(crate) reducer: Option<Reducer>,
}

impl Atom {
    pub fn new(kind: AtomKind) -> Self {
        Atom(Arc::new(kind))
    }

    pub fn kind(&self) -> &AtomKind {
        &self.0
    }

    /// Are both handles the same node?
    pub fn ptr_eq(&self, other: &Atom) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// `self` followed by `next`. Nested sequences on either side are spliced
    /// into one.
    pub fn then(self, next: Atom) -> Atom {
        let mut children = self.sequence_children();
        children.extend(next.sequence_children());
        Atom::new(AtomKind::Sequence(children))
    }

    /// `self`, or `other` if `self` does not match. Nested choices on either
    /// side are spliced into one.
    pub fn or(self, other: Atom) -> Atom {
        let mut children = self.alternative_children();
        children.extend(other.alternative_children());
        Atom::new(AtomKind::Alternative(children))
    }

    fn sequence_children(self) -> Vec<Atom> {
        match self.kind() {
            AtomKind::Sequence(children) => children.clone(),
            _ => vec![self],
        }
    }

    fn alternative_children(self) -> Vec<Atom> {
        match self.kind() {
            AtomKind::Alternative(children) => children.clone(),
            _ => vec![self],
        }
    }

    /// Between `min` and `max` repetitions; `None` leaves the count unbounded.
    pub fn repeat(self, min: usize, max: impl Into<Option<usize>>) -> Atom {
        Atom::new(AtomKind::Repetition {
            atom: self,
            min,
            max: max.into(),
            maybe: false,
        })
    }

    /// Zero or more.
    pub fn many(self) -> Atom {
        self.repeat(0, None)
    }

    /// One or more.
    pub fn many1(self) -> Atom {
        self.repeat(1, None)
    }

    /// Zero or one; yields the child's value or unit.
    pub fn maybe(self) -> Atom {
        Atom::new(AtomKind::Repetition {
            atom: self,
            min: 0,
            max: Some(1),
            maybe: true,
        })
    }

    /// Positive lookahead.
    pub fn present(self) -> Atom {
        Atom::new(AtomKind::Lookahead {
            atom: self,
            positive: true,
        })
    }

    /// Negative lookahead.
    pub fn absent(self) -> Atom {
        Atom::new(AtomKind::Lookahead {
            atom: self,
            positive: false,
        })
    }

    /// Wraps the result as `{name: value}`.
    pub fn named(self, name: impl AsRef<str>) -> Atom {
        Atom::new(AtomKind::Named {
            atom: self,
            name: Arc::from(name.as_ref()),
        })
    }

    pub fn ignore(self) -> Atom {
        Atom::new(AtomKind::Ignore(self))
    }

    pub fn map<F>(self, f: F) -> Atom
    where
        F: Fn(Tree) -> Tree + Send + Sync + 'static,
    {
        Atom::new(AtomKind::Map {
            atom: self,
            f: Arc::new(f),
        })
    }

    pub fn mark(self) -> Atom {
        Atom::new(AtomKind::Mark(self))
    }

    pub fn capture(self, name: impl AsRef<str>) -> Atom {
        Atom::new(AtomKind::Capture {
            atom: self,
            name: Arc::from(name.as_ref()),
        })
    }

    pub fn label(self, label: impl AsRef<str>) -> Atom {
        Atom::new(AtomKind::Label {
            atom: self,
            label: Arc::from(label.as_ref()),
        })
    }
}

impl Shr for Atom {
    type Output = Atom;

    fn shr(self, rhs: Atom) -> Atom {
        self.then(rhs)
    }
}

impl BitOr for Atom {
    type Output = Atom;

    fn bitor(self, rhs: Atom) -> Atom {
        self.or(rhs)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self)
    }
}
