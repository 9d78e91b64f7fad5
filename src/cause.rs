//! # Failure Causes
//!
//! A [`Cause`] explains why an atom failed at a given input offset. Composite
//! atoms attach the causes of their failing children, so a failed parse yields a
//! tree that can be walked or rendered with [`Cause::ascii_tree`].
//!
//! Messages are kept structured ([`Message`]) and only turned into text when
//! displayed; most causes built during a parse are discarded unread when a
//! sibling alternative succeeds.

use std::fmt;
use std::sync::Arc;

use crate::atoms::{Atom, AtomKind};
use crate::source::{Position, Slice, Source};

/// What went wrong, rendered on demand.
#[derive(Debug, Clone)]
pub enum Message {
    /// Fewer bytes left than the atom needs.
    PrematureEnd,
    /// A literal did not match.
    Expected { expected: Arc<str>, got: Slice },
    /// A character class or predicate rejected the next character.
    NoMatch { atom: Atom },
    /// One element of a sequence failed.
    Sequence { atom: Atom },
    /// Every alternative of a choice failed.
    Alternatives { atom: Atom },
    /// A repetition matched fewer times than its minimum.
    AtLeast { min: usize, atom: Atom },
    /// A lookahead saw the opposite of what it asserts.
    Lookahead { positive: bool, atom: Atom },
    /// The root matched but left input behind.
    Unconsumed { rest: Slice },
    /// An infix expression is missing an operand.
    ElementExpected { atom: Atom },
    /// A rule failed without trying its body: the base case of a left-recursive
    /// rule, or a rule outside the cluster being grown.
    RuleFailed { name: Arc<str> },
    /// A reference to a rule that has no definition.
    UndefinedRule { name: Arc<str> },
    Custom(String),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::PrematureEnd => f.write_str("Premature end of input"),
            Message::Expected { expected, got } => {
                write!(f, "Expected {:?}, but got {:?}", expected, got.as_str())
            }
            Message::NoMatch { atom } => write!(f, "Failed to match {}", atom),
            Message::Sequence { atom } => write!(f, "Failed to match sequence ({})", atom),
            Message::Alternatives { atom } => {
                f.write_str("Expected one of [")?;
                if let AtomKind::Alternative(alternatives) = atom.kind() {
                    for (i, alt) in alternatives.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", alt)?;
                    }
                } else {
                    write!(f, "{}", atom)?;
                }
                f.write_str("]")
            }
            Message::AtLeast { min, atom } => write!(f, "Expected at least {} of {}", min, atom),
            Message::Lookahead { positive: true, atom } => {
                write!(f, "Input should start with {}", atom)
            }
            Message::Lookahead {
                positive: false,
                atom,
            } => write!(f, "Input should not start with {}", atom),
            Message::Unconsumed { rest } => {
                write!(f, "Don't know what to do with {:?}", rest.as_str())
            }
            Message::ElementExpected { atom } => write!(f, "{} was expected", atom),
            Message::RuleFailed { name } => write!(f, "Failed to match {}", name.to_uppercase()),
            Message::UndefinedRule { name } => write!(f, "Rule {:?} is not defined", name),
            Message::Custom(text) => f.write_str(text),
        }
    }
}

/// A position-anchored failure with the failures that led to it.
///
/// Children are shared between clones, so memoized failures and the causes
/// reporters hold on to cost a pointer copy.
#[derive(Debug, Clone)]
pub struct Cause {
    message: Message,
    offset: usize,
    position: Option<Position>,
    label: Option<Arc<str>>,
    children: Arc<Vec<Cause>>,
}

impl Cause {
    /// A cause at `offset` explained further by `children`.
    pub fn new(message: Message, offset: usize, children: Vec<Cause>) -> Self {
        Self {
            message,
            offset,
            position: None,
            label: None,
            children: Arc::new(children),
        }
    }

    /// A cause without children.
    pub fn leaf(message: Message, offset: usize) -> Self {
        Self::new(message, offset, Vec::new())
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Byte offset the failure is anchored at.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Line and column, filled in once the cause leaves the parser.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// The innermost label active when the cause was built.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The failures this one is made of, in the order they happened.
    pub fn children(&self) -> &[Cause] {
        self.children.as_slice()
    }

    pub(crate) fn with_label(mut self, label: Arc<str>) -> Self {
        self.label = Some(label);
        self
    }

    /// The cause in this tree anchored furthest into the input. Ties go to the
    /// one met first in a depth-first walk.
    pub fn deepest(&self) -> &Cause {
        let mut best = self;
        for child in self.children.iter() {
            let candidate = child.deepest();
            if candidate.offset > best.offset {
                best = candidate;
            }
        }
        best
    }

    /// Resolves line and column for this cause and all of its children.
    pub(crate) fn locate(&mut self, source: &mut Source) {
        self.position = Some(source.position(self.offset));
        for child in Arc::make_mut(&mut self.children).iter_mut() {
            child.locate(source);
        }
    }

    /// Renders the cause tree, one cause per line.
    ///
    /// ```text
    /// Expected one of ['a' 'b' 'c', 'a' 'b' 'd'] at line 1 char 1.
    /// |- Failed to match sequence ('a' 'b' 'c') at line 1 char 3.
    /// |  `- Expected "c", but got "x" at line 1 char 3.
    /// `- Failed to match sequence ('a' 'b' 'd') at line 1 char 3.
    ///    `- Expected "d", but got "x" at line 1 char 3.
    /// ```
    pub fn ascii_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, &mut Vec::new());
        out
    }

    fn write_tree(&self, out: &mut String, last: &mut Vec<bool>) {
        if let Some((own, ancestors)) = last.split_last() {
            for ancestor_last in ancestors {
                out.push_str(if *ancestor_last { "   " } else { "|  " });
            }
            out.push_str(if *own { "`- " } else { "|- " });
        }
        out.push_str(&self.to_string());
        out.push('\n');

        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            last.push(i + 1 == count);
            child.write_tree(out, last);
            last.pop();
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{}: ", label)?;
        }
        write!(f, "{}", self.message)?;
        match self.position {
            Some(p) => write!(f, " at line {} char {}.", p.line, p.column),
            None => write!(f, " at offset {}.", self.offset),
        }
    }
}
