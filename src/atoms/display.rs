//! PEG-style rendering of atoms, used in error messages and `Debug` output.
//!
//! Each kind binds with a precedence; a child that binds looser than the
//! position it is printed in gets parenthesized:
//!
//! ```text
//! ('a' / 'b') 'c'*     (sequence of a choice and a repetition)
//! ('a' 'b')+           (repetition of a sequence)
//! ```

use std::fmt;

use super::atom::{Atom, AtomKind, CharClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Base = 1,
    Lookahead,
    Repetition,
    Sequence,
    Alternate,
    Outer,
}

impl Atom {
    fn precedence(&self) -> Precedence {
        match self.kind() {
            AtomKind::Lookahead { .. } => Precedence::Lookahead,
            AtomKind::Repetition { .. } => Precedence::Repetition,
            AtomKind::Sequence(_) => Precedence::Sequence,
            AtomKind::Alternative(_) => Precedence::Alternate,
            _ => Precedence::Base,
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, outer: Precedence) -> fmt::Result {
        if outer < self.precedence() {
            f.write_str("(")?;
            self.write_inner(f, outer)?;
            f.write_str(")")
        } else {
            self.write_inner(f, outer)
        }
    }

    fn write_inner(&self, f: &mut fmt::Formatter<'_>, outer: Precedence) -> fmt::Result {
        match self.kind() {
            AtomKind::Literal(text) => write!(f, "'{}'", text),
            AtomKind::Class(CharClass::Any) => f.write_str("."),
            AtomKind::Class(CharClass::Pattern { pattern, .. }) => f.write_str(pattern),
            AtomKind::Class(CharClass::Predicate { name, .. }) => f.write_str(name),
            AtomKind::Sequence(children) => join(f, children, " ", Precedence::Sequence),
            AtomKind::Alternative(children) => join(f, children, " / ", Precedence::Alternate),
            AtomKind::Repetition {
                atom,
                min,
                max,
                maybe,
            } => {
                atom.write(f, Precedence::Repetition)?;
                match (min, max) {
                    _ if *maybe => f.write_str("?"),
                    (0, None) => f.write_str("*"),
                    (1, None) => f.write_str("+"),
                    (0, Some(1)) => f.write_str("?"),
                    (min, Some(max)) => write!(f, "{{{}, {}}}", min, max),
                    (min, None) => write!(f, "{{{}, }}", min),
                }
            }
            AtomKind::Lookahead { atom, positive } => {
                f.write_str(if *positive { "&" } else { "!" })?;
                atom.write(f, Precedence::Lookahead)
            }
            AtomKind::Named { atom, name } => {
                write!(f, "{}:", name)?;
                atom.write(f, outer)
            }
            AtomKind::Rule(reference) => f.write_str(&reference.name().to_uppercase()),
            AtomKind::Capture { atom, name } => {
                write!(f, "({} = ", name)?;
                atom.write(f, Precedence::Outer)?;
                f.write_str(")")
            }
            AtomKind::Ignore(atom)
            | AtomKind::Map { atom, .. }
            | AtomKind::Mark(atom)
            | AtomKind::Scope(atom)
            | AtomKind::Label { atom, .. } => atom.write(f, outer),
            AtomKind::Dynamic(_) => f.write_str("dynamic { ... }"),
            AtomKind::Infix(infix) => {
                f.write_str("infix_expression(")?;
                infix.element.write(f, Precedence::Outer)?;
                f.write_str(", [")?;
                for (i, (op, _, _)) in infix.operators.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    op.write(f, Precedence::Outer)?;
                }
                f.write_str("])")
            }
            AtomKind::Halt => f.write_str("halt"),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, atoms: &[Atom], sep: &str, prec: Precedence) -> fmt::Result {
    for (i, atom) in atoms.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        atom.write(f, prec)?;
    }
    Ok(())
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, Precedence::Outer)
    }
}
