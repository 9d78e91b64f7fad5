mod atom;
mod combinators;
pub mod core;
mod display;
mod infix;
pub mod prelude;

pub use atom::{
    Assoc, Atom, AtomKind, CharClass, CharPredicate, DynamicFn, Infix, MapFn, Reducer, RuleRef,
};
pub(crate) use self::core::Outcome;
pub use self::core::{Parsed, Parser};
