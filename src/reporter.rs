//! # Error Reporters
//!
//! Every failure built during a parse is shown to the active [`ErrorReporter`],
//! and every success is announced to it. When the parse fails, the reporter
//! decides which cause the caller gets to see.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cause::Cause;

/// Strategy for choosing the cause to surface from a failed parse.
pub trait ErrorReporter: Send {
    /// Called for every cause an atom produces, children before parents.
    fn record(&mut self, cause: &Cause);

    /// Called after every successful match, with the offset reached.
    fn success(&mut self, _offset: usize) {}

    /// Called before a choice tries its first alternative.
    fn choice_started(&mut self) {}

    /// Called when a choice is decided. `matched` is false when every
    /// alternative failed.
    fn choice_finished(&mut self, _matched: bool) {}

    /// Picks the cause to report, given the root atom's own cause.
    fn finish(&mut self, root: Cause) -> Cause;
}

/// Selects one of the built-in reporters, e.g. from configuration.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReporterKind {
    #[default]
    Deepest,
    Tree,
    Contextual,
}

impl ReporterKind {
    /// A fresh reporter of this kind, for one parse.
    pub fn build(self) -> Box<dyn ErrorReporter> {
        match self {
            ReporterKind::Deepest => Box::new(Deepest::default()),
            ReporterKind::Tree => Box::new(TreeReporter),
            ReporterKind::Contextual => Box::new(Contextual::default()),
        }
    }
}

/// Surfaces the cause anchored furthest into the input.
///
/// Only a strictly deeper cause replaces the current one, so among causes at the
/// same offset the first one recorded wins. Once an alternative of a choice
/// succeeds, whatever its failed siblings recorded is forgotten: those branches
/// lost, and their failures say nothing about the input.
#[derive(Default)]
pub struct Deepest {
    deepest: Option<Cause>,
    /// What was tracked when each open choice started.
    choices: Vec<Option<Cause>>,
}

impl Deepest {
    /// The cause that would be reported if the parse failed now.
    pub fn current(&self) -> Option<&Cause> {
        self.deepest.as_ref()
    }
}

impl ErrorReporter for Deepest {
    fn record(&mut self, cause: &Cause) {
        let deeper = self
            .deepest
            .as_ref()
            .map_or(true, |current| cause.offset() > current.offset());
        if deeper {
            self.deepest = Some(cause.clone());
        }
    }

    fn choice_started(&mut self) {
        self.choices.push(self.deepest.clone());
    }

    fn choice_finished(&mut self, matched: bool) {
        let Some(before) = self.choices.pop() else {
            return;
        };
        if matched {
            self.deepest = before;
        }
    }

    fn finish(&mut self, root: Cause) -> Cause {
        self.choices.clear();
        match self.deepest.take() {
            Some(deepest) if deepest.offset() > root.offset() => deepest,
            _ => root,
        }
    }
}

impl fmt::Debug for Deepest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deepest")
            .field("offset", &self.deepest.as_ref().map(Cause::offset))
            .finish()
    }
}

/// Surfaces the root cause with its complete tree of children.
#[derive(Debug, Default)]
pub struct TreeReporter;

impl ErrorReporter for TreeReporter {
    fn record(&mut self, _cause: &Cause) {}

    fn finish(&mut self, root: Cause) -> Cause {
        root
    }
}

/// Like [`Deepest`], but forgets what it has seen whenever the parse succeeds
/// at or beyond the point of the last reset, so the surfaced cause belongs to
/// the construct currently being matched. Choices need no extra bookkeeping:
/// the success of an alternative already resets.
#[derive(Debug, Default)]
pub struct Contextual {
    inner: Deepest,
    last_reset: usize,
}

impl ErrorReporter for Contextual {
    fn record(&mut self, cause: &Cause) {
        self.inner.record(cause);
    }

    fn success(&mut self, offset: usize) {
        if offset < self.last_reset {
            return;
        }
        self.last_reset = offset;
        self.inner.deepest = None;
    }

    /// Unlike [`Deepest`], the tracked cause also wins a tie with the root.
    fn finish(&mut self, root: Cause) -> Cause {
        match self.inner.deepest.take() {
            Some(tracked) if tracked.offset() >= root.offset() => tracked,
            _ => root,
        }
    }
}
