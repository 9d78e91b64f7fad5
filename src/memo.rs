//! # Memoization and Left Recursion
//!
//! Rule applications are cached per `(rule, start offset)`, so each rule is
//! evaluated at most once per position and backtracking stays linear.
//!
//! Left recursion is handled by seed growing. When a rule re-enters itself at
//! the same offset before its first evaluation finished, the inner call fails
//! (or returns the current seed). Once the first evaluation completes, the body
//! is evaluated again from the same start with the previous result memoized,
//! and this repeats as long as the match gets longer:
//!
//! ```text
//! expr := expr "+" num / num          input "1+2+3"
//!
//! round 0: expr -> fail (seed)        => "1"
//! round 1: expr -> "1"                => "1+2"
//! round 2: expr -> "1+2"              => "1+2+3"
//! round 3: expr -> "1+2+3"            => "1+2+3" (no progress, stop)
//! ```
//!
//! Rules reached between the head and its re-entry form the head's involved
//! set; they are re-evaluated once per growth round while other rules at that
//! offset only answer from the memo. When growing stops, involved rules the
//! last round did not reach are dropped from the memo: their entries still
//! describe an earlier round.
//!
//! Cached results are [`Tree`]s and [`Cause`]s, both of which share their
//! children, so storing and recalling an entry never copies a whole result.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::atoms::{Atom, Outcome, RuleRef};
use crate::cause::{Cause, Message};
use crate::context::Context;
use crate::error::GrammarError;
use crate::grammar::RuleId;
use crate::source::Source;
use crate::tree::{Raw, Tree};

type LrId = usize;
type HeadId = usize;

#[derive(Debug, Clone)]
enum Answer {
    Done(Result<Tree, Cause>),
    /// The rule is still being evaluated at this offset.
    InProgress(LrId),
}

#[derive(Debug, Clone)]
struct MemoEntry {
    answer: Answer,
    end: usize,
}

/// An application of a rule that has not finished yet.
#[derive(Debug)]
struct LeftRecursion {
    rule: RuleId,
    seed: Result<Tree, Cause>,
    head: Option<HeadId>,
    next: Option<LrId>,
}

/// The rule a left-recursive cluster grows from.
#[derive(Debug)]
struct Head {
    rule: RuleId,
    involved: HashSet<RuleId>,
    eval: HashSet<RuleId>,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct MemoStats {
    pub hits: usize,
    pub misses: usize,
    pub left_recursions: usize,
    pub growth_rounds: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Memo {
    entries: HashMap<(RuleId, usize), MemoEntry>,
    lrs: Vec<LeftRecursion>,
    lr_stack: Option<LrId>,
    heads: HashMap<usize, HeadId>,
    head_arena: Vec<Head>,
    stats: MemoStats,
}

impl Memo {
    pub(crate) fn stats(&self) -> MemoStats {
        self.stats
    }

    pub(crate) fn log_stats(&self) {
        tracing::debug!(
            target: "pegrat::memo",
            entries = self.entries.len(),
            hits = self.stats.hits,
            misses = self.stats.misses,
            left_recursions = self.stats.left_recursions,
            growth_rounds = self.stats.growth_rounds,
            "memo statistics"
        );
    }

    fn push_lr(&mut self, rule: RuleId, seed: Result<Tree, Cause>) -> LrId {
        let id = self.lrs.len();
        self.lrs.push(LeftRecursion {
            rule,
            seed,
            head: None,
            next: self.lr_stack,
        });
        self.lr_stack = Some(id);
        id
    }

    fn pop_lr(&mut self, lr: LrId) {
        self.lr_stack = self.lrs[lr].next;
    }

    /// Frees the record of an application that never saw left recursion.
    fn release(&mut self, lr: LrId) {
        if lr + 1 == self.lrs.len() {
            self.lrs.pop();
        }
    }

    /// Whether `lr` belongs to an application still on the call path.
    fn is_active(&self, lr: LrId) -> bool {
        let mut cursor = self.lr_stack;
        while let Some(id) = cursor {
            if id == lr {
                return true;
            }
            cursor = self.lrs[id].next;
        }
        false
    }

    /// Drops the entries of `rules` at `start`.
    fn forget(&mut self, rules: &HashSet<RuleId>, start: usize) {
        for rule in rules {
            if self.entries.remove(&(*rule, start)).is_some() {
                tracing::trace!(target: "pegrat::memo", rule = rule.0, start, "dropped stale entry");
            }
        }
    }
}

/// A resolved rule reference.
struct Rule<'g> {
    id: RuleId,
    name: &'g Arc<str>,
    body: &'g Atom,
}

impl Rule<'_> {
    fn failed(&self, start: usize) -> Cause {
        Cause::leaf(
            Message::RuleFailed {
                name: Arc::clone(self.name),
            },
            start,
        )
    }
}

/// Applies the rule `reference` points at, through the memo table.
pub(crate) fn apply_rule(reference: &RuleRef, source: &mut Source, ctx: &mut Context<'_>) -> Outcome {
    let start = source.pos();
    let table = ctx.rules();
    let resolved = reference
        .id
        .filter(|_| reference.table == table.id())
        .and_then(|id| table.body(id).map(|body| (id, body)));
    let Some((id, body)) = resolved else {
        ctx.set_fatal(GrammarError::UndefinedRule(reference.name.to_string()));
        let name = Arc::clone(&reference.name);
        return Err(ctx.err(Message::UndefinedRule { name }, start, Vec::new()));
    };
    let rule = Rule {
        id,
        name: &reference.name,
        body,
    };

    let result = match recall(&rule, start, source, ctx) {
        Some(MemoEntry {
            answer: Answer::Done(result),
            end,
        }) => {
            source.set_pos(end);
            result
        }
        Some(MemoEntry {
            answer: Answer::InProgress(lr),
            end,
        }) if ctx.memo.is_active(lr) => {
            source.set_pos(end);
            setup_lr(id, lr, ctx);
            ctx.memo.lrs[lr].seed.clone()
        }
        // a finished application whose cluster never came back to it
        Some(_) | None => evaluate_fresh(&rule, start, source, ctx),
    };
    result.map(Raw::Leaf)
}

fn evaluate_body(body: &Atom, source: &mut Source, ctx: &mut Context<'_>) -> Result<Tree, Cause> {
    let raw = body.apply(source, ctx)?;
    Ok(ctx.flatten(raw, false))
}

fn recall(rule: &Rule<'_>, start: usize, source: &mut Source, ctx: &mut Context<'_>) -> Option<MemoEntry> {
    let key = (rule.id, start);
    let entry = ctx.memo.entries.get(&key).cloned();
    let Some(&head) = ctx.memo.heads.get(&start) else {
        if entry.is_some() {
            ctx.memo.stats.hits += 1;
        }
        return entry;
    };

    let growing = &ctx.memo.head_arena[head];
    if entry.is_none() && rule.id != growing.rule && !growing.involved.contains(&rule.id) {
        return Some(MemoEntry {
            answer: Answer::Done(Err(rule.failed(start))),
            end: start,
        });
    }

    if ctx.memo.head_arena[head].eval.remove(&rule.id) {
        let result = evaluate_body(rule.body, source, ctx);
        let entry = MemoEntry {
            answer: Answer::Done(result),
            end: source.pos(),
        };
        ctx.memo.entries.insert(key, entry.clone());
        return Some(entry);
    }

    if entry.is_some() {
        ctx.memo.stats.hits += 1;
    }
    entry
}

fn evaluate_fresh(rule: &Rule<'_>, start: usize, source: &mut Source, ctx: &mut Context<'_>) -> Result<Tree, Cause> {
    ctx.memo.stats.misses += 1;
    let key = (rule.id, start);
    let lr = ctx.memo.push_lr(rule.id, Err(rule.failed(start)));
    ctx.memo.entries.insert(
        key,
        MemoEntry {
            answer: Answer::InProgress(lr),
            end: start,
        },
    );

    let result = evaluate_body(rule.body, source, ctx);
    ctx.memo.pop_lr(lr);
    let end = source.pos();

    match ctx.memo.lrs[lr].head {
        Some(head) => {
            ctx.memo.lrs[lr].seed = result;
            ctx.memo.entries.insert(
                key,
                MemoEntry {
                    answer: Answer::InProgress(lr),
                    end,
                },
            );
            lr_answer(rule, start, lr, head, source, ctx)
        }
        None => {
            ctx.memo.release(lr);
            ctx.memo.entries.insert(
                key,
                MemoEntry {
                    answer: Answer::Done(result.clone()),
                    end,
                },
            );
            result
        }
    }
}

/// Marks `lr` as left-recursive and every application above it on the stack as
/// involved in its cluster.
fn setup_lr(rule: RuleId, lr: LrId, ctx: &mut Context<'_>) {
    let memo = &mut ctx.memo;
    let head = match memo.lrs[lr].head {
        Some(head) => head,
        None => {
            let head = memo.head_arena.len();
            memo.head_arena.push(Head {
                rule,
                involved: HashSet::new(),
                eval: HashSet::new(),
            });
            memo.lrs[lr].head = Some(head);
            memo.stats.left_recursions += 1;
            tracing::trace!(target: "pegrat::memo", rule = rule.0, "left recursion detected");
            head
        }
    };

    let mut cursor = memo.lr_stack;
    while let Some(s) = cursor {
        if memo.lrs[s].head == Some(head) {
            break;
        }
        memo.lrs[s].head = Some(head);
        let involved = memo.lrs[s].rule;
        memo.head_arena[head].involved.insert(involved);
        cursor = memo.lrs[s].next;
    }
}

fn lr_answer(
    rule: &Rule<'_>,
    start: usize,
    lr: LrId,
    head: HeadId,
    source: &mut Source,
    ctx: &mut Context<'_>,
) -> Result<Tree, Cause> {
    let seed = ctx.memo.lrs[lr].seed.clone();
    if ctx.memo.head_arena[head].rule != rule.id {
        return seed;
    }

    let end = source.pos();
    ctx.memo.entries.insert(
        (rule.id, start),
        MemoEntry {
            answer: Answer::Done(seed.clone()),
            end,
        },
    );
    match seed {
        Ok(seed) => Ok(grow_lr(rule, start, head, seed, end, source, ctx)),
        Err(cause) => {
            // nothing to grow; the cluster's entries at `start` hold failed seeds
            let involved = std::mem::take(&mut ctx.memo.head_arena[head].involved);
            if !ctx.memo.heads.contains_key(&start) {
                ctx.memo.forget(&involved, start);
            }
            Err(cause)
        }
    }
}

fn grow_lr(
    rule: &Rule<'_>,
    start: usize,
    head: HeadId,
    mut best: Tree,
    mut best_end: usize,
    source: &mut Source,
    ctx: &mut Context<'_>,
) -> Tree {
    let outer = ctx.memo.heads.insert(start, head);
    loop {
        source.set_pos(start);
        let growing = &mut ctx.memo.head_arena[head];
        growing.eval = growing.involved.clone();

        let result = evaluate_body(rule.body, source, ctx);
        let end = source.pos();
        match result {
            Ok(tree) if end > best_end => {
                ctx.memo.stats.growth_rounds += 1;
                tracing::trace!(target: "pegrat::memo", rule = %rule.name, start, end, "seed grew");
                best = tree;
                best_end = end;
                ctx.memo.entries.insert(
                    (rule.id, start),
                    MemoEntry {
                        answer: Answer::Done(Ok(best.clone())),
                        end,
                    },
                );
            }
            _ => break,
        }
    }

    let stale = std::mem::take(&mut ctx.memo.head_arena[head].eval);
    match outer {
        Some(outer) => {
            ctx.memo.heads.insert(start, outer);
        }
        None => {
            ctx.memo.heads.remove(&start);
            ctx.memo.forget(&stale, start);
        }
    }
    source.set_pos(best_end);
    best
}
