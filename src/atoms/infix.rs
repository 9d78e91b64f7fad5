//! Binary operator expressions by precedence climbing.
//!
//! Every operator carries a precedence (higher binds tighter, 0 is the loosest)
//! and an associativity. `1+2*3` with `+` at 1 and `*` at 2 reduces to
//! `{l: 1, o: +, r: {l: 2, o: *, r: 3}}` unless a custom reducer is given.

use super::atom::{Assoc, Infix};
use super::core::Outcome;
use crate::cause::{Cause, Message};
use crate::context::Context;
use crate::source::Source;
use crate::tree::{Raw, Tree};

pub(crate) fn evaluate(infix: &Infix, source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
    climb(infix, 0, source, ctx).map(Raw::Leaf)
}

fn climb(infix: &Infix, min_precedence: u32, source: &mut Source, ctx: &mut Context<'_>) -> Result<Tree, Cause> {
    let mut left = element(infix, source, ctx)?;
    loop {
        let before = source.pos();
        let Some((op, precedence, assoc)) = operator(infix, source, ctx) else {
            break;
        };
        if precedence < min_precedence {
            source.set_pos(before);
            break;
        }
        let next = match assoc {
            Assoc::Left => precedence + 1,
            Assoc::Right => precedence,
        };
        let right = climb(infix, next, source, ctx)?;
        left = reduce(infix, left, op, right);
    }
    Ok(left)
}

fn element(infix: &Infix, source: &mut Source, ctx: &mut Context<'_>) -> Result<Tree, Cause> {
    match infix.element.apply(source, ctx) {
        Ok(raw) => Ok(ctx.flatten(raw, true)),
        Err(cause) => {
            let at = source.pos();
            let atom = infix.element.clone();
            Err(ctx.err(Message::ElementExpected { atom }, at, vec![cause]))
        }
    }
}

/// The first operator matching at the cursor.
fn operator(infix: &Infix, source: &mut Source, ctx: &mut Context<'_>) -> Option<(Tree, u32, Assoc)> {
    infix.operators.iter().find_map(|(atom, precedence, assoc)| {
        let raw = atom.apply(source, ctx).ok()?;
        Some((ctx.flatten(raw, true), *precedence, *assoc))
    })
}

fn reduce(infix: &Infix, left: Tree, op: Tree, right: Tree) -> Tree {
    match &infix.reducer {
        Some(reducer) => reducer(left, op, right),
        None => Tree::map([("l", left), ("o", op), ("r", right)]),
    }
}
