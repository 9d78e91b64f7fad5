//! Constructors for building grammars.
//!
//! ```ignore
//! use pegrat::prelude::*;
//!
//! let ident = class("[a-z]") >> class("[a-z0-9_]").many();
//! let call = ident.named("name") >> lit("(") >> lit(")");
//! ```

use std::sync::Arc;

use regex::Regex;

pub use super::atom::{Assoc, Atom, AtomKind, CharClass};
use crate::context::Captures;
use crate::error::GrammarError;
use crate::source::Source;
use crate::tree::Tree;

/// Matches `text` exactly.
pub fn lit(text: impl AsRef<str>) -> Atom {
    Atom::new(AtomKind::Literal(Arc::from(text.as_ref())))
}

/// Matches one character against a regex character class such as `[a-z]` or
/// `\s`.
///
/// # Panics
///
/// Panics if `pattern` is not a valid regex; use [`try_class`] for patterns
/// that are not known ahead of time.
pub fn class(pattern: &str) -> Atom {
    match try_class(pattern) {
        Ok(atom) => atom,
        Err(err) => panic!("{}", err),
    }
}

/// Like [`class`], but returns the regex error instead of panicking.
pub fn try_class(pattern: &str) -> Result<Atom, GrammarError> {
    let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| GrammarError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(Atom::new(AtomKind::Class(CharClass::Pattern {
        pattern: Arc::from(pattern),
        regex,
    })))
}

/// Matches one character accepted by `test`; `name` is used in messages.
pub fn satisfy<F>(name: impl AsRef<str>, test: F) -> Atom
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    Atom::new(AtomKind::Class(CharClass::Predicate {
        name: Arc::from(name.as_ref()),
        test: Arc::new(test),
    }))
}

/// Matches any single character.
pub fn any() -> Atom {
    Atom::new(AtomKind::Class(CharClass::Any))
}

/// Matches every atom in order.
pub fn seq(atoms: impl IntoIterator<Item = Atom>) -> Atom {
    Atom::new(AtomKind::Sequence(atoms.into_iter().collect()))
}

/// Ordered choice: the first atom that matches wins.
pub fn alt(atoms: impl IntoIterator<Item = Atom>) -> Atom {
    Atom::new(AtomKind::Alternative(atoms.into_iter().collect()))
}

/// Same as [`Atom::maybe`].
pub fn maybe(atom: Atom) -> Atom {
    atom.maybe()
}

/// Chooses the atom to match when the parse reaches this point, based on the
/// input and the captured values. The choice is never memoized.
pub fn dynamic<F>(pick: F) -> Atom
where
    F: Fn(&Source, &Captures) -> Atom + Send + Sync + 'static,
{
    Atom::new(AtomKind::Dynamic(Arc::new(pick)))
}

/// Values captured inside `atom` are forgotten once it finishes.
pub fn scope(atom: Atom) -> Atom {
    Atom::new(AtomKind::Scope(atom))
}

/// Accepts whatever input is left.
pub fn halt() -> Atom {
    Atom::new(AtomKind::Halt)
}

/// `element (op element)*` reduced by operator precedence into nested
/// `{l, o, r}` maps. Higher precedences bind tighter; 0 is the loosest.
pub fn infix_expression(element: Atom, operators: Vec<(Atom, u32, Assoc)>) -> Atom {
    Atom::new(AtomKind::Infix(super::atom::Infix {
        element,
        operators,
        reducer: None,
    }))
}

/// Like [`infix_expression`], reducing each `left op right` with `reducer`.
pub fn infix_expression_with<F>(element: Atom, operators: Vec<(Atom, u32, Assoc)>, reducer: F) -> Atom
where
    F: Fn(Tree, Tree, Tree) -> Tree + Send + Sync + 'static,
{
    Atom::new(AtomKind::Infix(super::atom::Infix {
        element,
        operators,
        reducer: Some(Arc::new(reducer)),
    }))
}
