//! # Parse Context
//!
//! Everything one parse call owns besides the input: the rule table it resolves
//! references against, the memo table and left-recursion bookkeeping, the
//! capture scopes, the active error reporter and the result flattener.
//!
//! A context lives exactly as long as one parse, so nothing leaks between calls
//! and a grammar can be shared freely across threads.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cause::{Cause, Message};
use crate::config::ParseOptions;
use crate::error::{Error, GrammarError, ParseFailure};
use crate::grammar::RuleTable;
use crate::memo::Memo;
use crate::reporter::ErrorReporter;
use crate::source::Source;
use crate::tree::{DuplicateKey, Flattener, Raw, Tree};

/// Values remembered by capture atoms, visible to dynamic atoms.
///
/// Scopes nest: a lookup walks from the innermost scope outwards, and closing a
/// scope forgets everything captured inside it.
#[derive(Debug, Clone)]
pub struct Captures {
    scopes: Vec<HashMap<String, Tree>>,
}

impl Default for Captures {
    fn default() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }
}

impl Captures {
    /// The innermost value captured under `name`.
    pub fn get(&self, name: &str) -> Option<&Tree> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub(crate) fn insert(&mut self, name: &str, value: Tree) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub(crate) fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }
}

/// Per-parse state threaded through every atom.
pub(crate) struct Context<'g> {
    rules: &'g RuleTable,
    pub(crate) memo: Memo,
    captures: Captures,
    labels: Vec<Arc<str>>,
    reporter: Box<dyn ErrorReporter>,
    flattener: Flattener,
    fatal: Option<GrammarError>,
}

impl<'g> Context<'g> {
    pub(crate) fn new(rules: &'g RuleTable, options: &ParseOptions) -> Self {
        Self {
            rules,
            memo: Memo::default(),
            captures: Captures::default(),
            labels: Vec::new(),
            reporter: options.reporter.build(),
            flattener: Flattener::new(options.warn_duplicate_keys),
            fatal: None,
        }
    }

    pub(crate) fn rules(&self) -> &'g RuleTable {
        self.rules
    }

    pub(crate) fn captures(&self) -> &Captures {
        &self.captures
    }

    pub(crate) fn captures_mut(&mut self) -> &mut Captures {
        &mut self.captures
    }

    /// Builds a cause, tags it with the innermost active label and shows it to
    /// the reporter.
    pub(crate) fn err(&mut self, message: Message, offset: usize, children: Vec<Cause>) -> Cause {
        let mut cause = Cause::new(message, offset, children);
        if let Some(label) = self.labels.last() {
            cause = cause.with_label(Arc::clone(label));
        }
        self.reporter.record(&cause);
        cause
    }

    pub(crate) fn succeeded(&mut self, offset: usize) {
        self.reporter.success(offset);
    }

    pub(crate) fn choice_started(&mut self) {
        self.reporter.choice_started();
    }

    pub(crate) fn choice_finished(&mut self, matched: bool) {
        self.reporter.choice_finished(matched);
    }

    pub(crate) fn push_label(&mut self, label: Arc<str>) {
        self.labels.push(label);
    }

    pub(crate) fn pop_label(&mut self) {
        self.labels.pop();
    }

    pub(crate) fn flatten(&mut self, raw: Raw, named: bool) -> Tree {
        self.flattener.flatten(raw, named)
    }

    /// Records an error that aborts the parse; the first one wins.
    pub(crate) fn set_fatal(&mut self, error: GrammarError) {
        if self.fatal.is_none() {
            tracing::warn!(target: "pegrat::parse", error = %error, "aborting parse");
            self.fatal = Some(error);
        }
    }

    pub(crate) fn take_fatal(&mut self) -> Option<GrammarError> {
        self.fatal.take()
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<DuplicateKey> {
        self.flattener.take_warnings()
    }

    /// Turns the root atom's cause into the error handed to the caller.
    pub(crate) fn fail_parse(&mut self, root: Cause, source: &mut Source) -> Error {
        let mut cause = self.reporter.finish(root);
        cause.locate(source);
        tracing::debug!(target: "pegrat::parse", cause = %cause, "parse failed");
        Error::Parse(ParseFailure::new(cause))
    }
}
