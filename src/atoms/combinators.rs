//! Matching logic for every [`AtomKind`].
//!
//! All entry goes through [`Atom::apply`], which owns the position contract: on
//! failure the cursor is back where the atom started, on success it sits right
//! after the match. The per-kind functions below may therefore leave the cursor
//! anywhere when they fail.

use std::sync::Arc;

use super::atom::{Atom, AtomKind, CharClass, MapFn};
use super::core::Outcome;
use super::infix;
use crate::cause::{Cause, Message};
use crate::context::Context;
use crate::memo;
use crate::source::Source;
use crate::tree::{Raw, Tree};

impl Atom {
    /// Matches this atom at the cursor.
    pub(crate) fn apply(&self, source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
        let start = source.pos();
        let outcome = self.try_match(source, ctx);
        match &outcome {
            Ok(_) => ctx.succeeded(source.pos()),
            Err(_) => source.set_pos(start),
        }
        outcome
    }

    fn try_match(&self, source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
        match self.kind() {
            AtomKind::Literal(text) => literal(text, source, ctx),
            AtomKind::Class(class) => char_class(self, class, source, ctx),
            AtomKind::Sequence(children) => sequence(self, children, source, ctx),
            AtomKind::Alternative(children) => alternative(self, children, source, ctx),
            AtomKind::Repetition {
                atom,
                min,
                max,
                maybe,
            } => repetition(atom, *min, *max, *maybe, source, ctx),
            AtomKind::Lookahead { atom, positive } => lookahead(atom, *positive, source, ctx),
            AtomKind::Named { atom, name } => {
                let raw = atom.apply(source, ctx)?;
                let value = ctx.flatten(raw, true);
                Ok(Raw::Leaf(Tree::map([(name.to_string(), value)])))
            }
            AtomKind::Rule(reference) => memo::apply_rule(reference, source, ctx),
            AtomKind::Ignore(atom) => atom.apply(source, ctx).map(|_| Raw::unit()),
            AtomKind::Map { atom, f } => map(atom, f, source, ctx),
            AtomKind::Mark(atom) => {
                let start = source.pos();
                let raw = atom.apply(source, ctx)?;
                source.set_pos(start);
                Ok(raw)
            }
            AtomKind::Capture { atom, name } => {
                let raw = atom.apply(source, ctx)?;
                let value = ctx.flatten(raw, false);
                ctx.captures_mut().insert(name, value.clone());
                Ok(Raw::Leaf(value))
            }
            AtomKind::Scope(atom) => {
                ctx.captures_mut().push_scope();
                let outcome = atom.apply(source, ctx);
                ctx.captures_mut().pop_scope();
                outcome
            }
            AtomKind::Dynamic(pick) => {
                let chosen = pick(source, ctx.captures());
                chosen.apply(source, ctx)
            }
            AtomKind::Infix(spec) => infix::evaluate(spec, source, ctx),
            AtomKind::Label { atom, label } => {
                ctx.push_label(Arc::clone(label));
                let outcome = atom.apply(source, ctx);
                ctx.pop_label();
                outcome
            }
            AtomKind::Halt => {
                source.consume(source.remaining());
                Ok(Raw::unit())
            }
        }
    }
}

fn literal(text: &Arc<str>, source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
    let start = source.pos();
    if source.remaining() < text.len() {
        return Err(ctx.err(Message::PrematureEnd, start, Vec::new()));
    }
    if source.matches(text) {
        return Ok(Raw::Leaf(Tree::Str(source.consume(text.len()))));
    }
    let got = source.peek_chars(text.chars().count());
    let expected = Arc::clone(text);
    Err(ctx.err(Message::Expected { expected, got }, start, Vec::new()))
}

fn char_class(atom: &Atom, class: &CharClass, source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
    let start = source.pos();
    match source.next_char() {
        None => Err(ctx.err(Message::PrematureEnd, start, Vec::new())),
        Some(c) if class.accepts(c) => Ok(Raw::Leaf(Tree::Str(source.consume(c.len_utf8())))),
        Some(_) => Err(ctx.err(Message::NoMatch { atom: atom.clone() }, start, Vec::new())),
    }
}

fn sequence(atom: &Atom, children: &[Atom], source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
    let mut values = Vec::with_capacity(children.len());
    for child in children {
        match child.apply(source, ctx) {
            Ok(value) => values.push(value),
            Err(cause) => {
                // anchored where the failing element started
                let at = source.pos();
                return Err(ctx.err(Message::Sequence { atom: atom.clone() }, at, vec![cause]));
            }
        }
    }
    Ok(Raw::Sequence(values))
}

fn alternative(atom: &Atom, children: &[Atom], source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
    let start = source.pos();
    let mut causes = Vec::with_capacity(children.len());
    ctx.choice_started();
    for child in children {
        match child.apply(source, ctx) {
            Ok(value) => {
                ctx.choice_finished(true);
                return Ok(value);
            }
            Err(cause) => causes.push(cause),
        }
    }
    ctx.choice_finished(false);
    Err(ctx.err(Message::Alternatives { atom: atom.clone() }, start, causes))
}

fn repetition(
    atom: &Atom,
    min: usize,
    max: Option<usize>,
    maybe: bool,
    source: &mut Source,
    ctx: &mut Context<'_>,
) -> Outcome {
    let start = source.pos();
    let mut values = Vec::new();
    let mut stopped_by = None;
    while max.map_or(true, |max| values.len() < max) {
        let before = source.pos();
        match atom.apply(source, ctx) {
            Ok(value) => {
                values.push(value);
                if source.pos() == before {
                    // an empty match would repeat forever
                    break;
                }
            }
            Err(cause) => {
                stopped_by = Some(cause);
                break;
            }
        }
    }

    if values.len() < min {
        let children = stopped_by.into_iter().collect();
        return Err(ctx.err(
            Message::AtLeast {
                min,
                atom: atom.clone(),
            },
            start,
            children,
        ));
    }
    tracing::trace!(
        target: "pegrat::repetition",
        start,
        end = source.pos(),
        count = values.len(),
        "repetition stopped"
    );
    if maybe {
        Ok(Raw::Maybe(values.pop().map(Box::new)))
    } else {
        Ok(Raw::Repetition(values))
    }
}

fn lookahead(atom: &Atom, positive: bool, source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
    let start = source.pos();
    let outcome = atom.apply(source, ctx);
    source.set_pos(start);
    let children = match (outcome, positive) {
        (Ok(_), true) | (Err(_), false) => return Ok(Raw::unit()),
        (Ok(_), false) => Vec::new(),
        (Err(cause), true) => vec![cause],
    };
    Err(ctx.err(
        Message::Lookahead {
            positive,
            atom: atom.clone(),
        },
        start,
        children,
    ))
}

fn map(atom: &Atom, f: &MapFn, source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
    let raw = atom.apply(source, ctx)?;
    let value = ctx.flatten(raw, false);
    Ok(Raw::Leaf(f(value)))
}

/// Causes produced while matching `atom` standalone, for tests.
#[cfg(test)]
pub(crate) fn run_raw(atom: &Atom, text: &str) -> (Result<Tree, Cause>, usize) {
    let table = crate::grammar::RuleTable::default();
    let mut source = Source::new(text);
    let mut ctx = Context::new(&table, &Default::default());
    let outcome = atom.apply(&mut source, &mut ctx).map(|raw| ctx.flatten(raw, false));
    (outcome, source.pos())
}
