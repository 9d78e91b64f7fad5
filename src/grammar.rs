//! # Grammars
//!
//! A [`Grammar`] is a set of named, possibly mutually recursive rules plus a
//! root rule. Rule bodies are built lazily, the first time a parse reaches
//! them, so a rule may refer to rules defined after it or to itself:
//!
//! ```ignore
//! use pegrat::prelude::*;
//! use pegrat::{Grammar, Parser};
//!
//! let grammar = Grammar::builder()
//!     .rule("expr", |r| (r.rule("expr") >> lit("+") >> r.rule("num")) | r.rule("num"))
//!     .rule("num", |_| class("[0-9]").many1())
//!     .root("expr")
//!     .build()?;
//!
//! assert_eq!(grammar.parse("1+2+3")?, "1+2+3");
//! ```
//!
//! A built grammar is immutable apart from its lazily filled bodies, and can be
//! shared across threads; every parse gets its own memo table.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use crate::atoms::{Atom, AtomKind, Parser, RuleRef};
use crate::error::GrammarError;

/// Index of a rule within its grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

type RuleBuilder = Box<dyn Fn(&Rules<'_>) -> Atom + Send + Sync>;

/// Table ids start at 1; 0 is the empty table standalone atoms parse with.
static NEXT_TABLE_ID: AtomicUsize = AtomicUsize::new(1);

struct RuleSlot {
    name: Arc<str>,
    build: RuleBuilder,
    body: OnceLock<Atom>,
}

/// The rules of one grammar.
#[derive(Default)]
pub struct RuleTable {
    id: usize,
    slots: Vec<RuleSlot>,
    by_name: HashMap<Arc<str>, RuleId>,
}

impl RuleTable {
    /// The table of a grammar without rules.
    pub fn empty() -> &'static RuleTable {
        static EMPTY: OnceLock<RuleTable> = OnceLock::new();
        EMPTY.get_or_init(RuleTable::default)
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| &*slot.name)
    }

    /// A reference atom for `name`. Unknown names yield a reference that
    /// aborts the parse when reached.
    pub(crate) fn reference(&self, name: &str) -> Atom {
        let (id, name) = match self.by_name.get_key_value(name) {
            Some((name, id)) => (Some(*id), Arc::clone(name)),
            None => (None, Arc::from(name)),
        };
        Atom::new(AtomKind::Rule(RuleRef {
            id,
            table: self.id,
            name,
        }))
    }

    /// The body of rule `id`, built on first use.
    pub(crate) fn body(&self, id: RuleId) -> Option<&Atom> {
        let slot = self.slots.get(id.0)?;
        Some(slot.body.get_or_init(|| {
            tracing::trace!(target: "pegrat::parse", rule = %slot.name, "building rule body");
            (slot.build)(&Rules { table: self })
        }))
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTable")
            .field("id", &self.id)
            .field("rules", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Handed to rule builders to refer to other rules by name.
pub struct Rules<'a> {
    table: &'a RuleTable,
}

impl Rules<'_> {
    /// A reference to rule `name`. The name is resolved when a parse reaches
    /// it, so rules may refer to each other in any order.
    pub fn rule(&self, name: &str) -> Atom {
        self.table.reference(name)
    }
}

/// Collects named rules and the root for [`Grammar::builder`].
#[derive(Default)]
pub struct GrammarBuilder {
    rules: Vec<(Arc<str>, RuleBuilder)>,
    root: Option<String>,
}

impl GrammarBuilder {
    /// Defines rule `name`; `build` runs once, the first time a parse needs the
    /// body.
    pub fn rule<F>(mut self, name: impl AsRef<str>, build: F) -> Self
    where
        F: Fn(&Rules<'_>) -> Atom + Send + Sync + 'static,
    {
        self.rules.push((Arc::from(name.as_ref()), Box::new(build)));
        self
    }

    /// Names the rule a parse starts with.
    pub fn root(mut self, name: impl Into<String>) -> Self {
        self.root = Some(name.into());
        self
    }

    /// Checks the rule names and the root. Rule bodies are not built yet.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let root = self.root.ok_or(GrammarError::MissingRoot)?;

        let mut table = RuleTable {
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::with_capacity(self.rules.len()),
            by_name: HashMap::with_capacity(self.rules.len()),
        };
        for (name, build) in self.rules {
            let id = RuleId(table.slots.len());
            if table.by_name.insert(Arc::clone(&name), id).is_some() {
                return Err(GrammarError::DuplicateRule(name.to_string()));
            }
            table.slots.push(RuleSlot {
                name,
                build,
                body: OnceLock::new(),
            });
        }

        let root = match table.by_name.get(root.as_str()) {
            Some(id) => *id,
            None => return Err(GrammarError::UndefinedRoot(root)),
        };
        tracing::debug!(target: "pegrat::parse", rules = table.len(), "grammar built");
        Ok(Grammar {
            table: Arc::new(table),
            root,
        })
    }
}

/// A set of named rules with a root, ready to parse.
///
/// Cloning is cheap and clones share the rule table, including bodies built
/// so far. A grammar can be used from many threads at once.
#[derive(Clone)]
pub struct Grammar {
    table: Arc<RuleTable>,
    root: RuleId,
}

impl Grammar {
    /// Starts an empty grammar definition.
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    /// A reference to the root rule.
    pub fn root(&self) -> Atom {
        self.entry()
    }

    /// Name of the root rule.
    pub fn root_name(&self) -> &str {
        &self.table.slots[self.root.0].name
    }

    /// A reference to rule `name`, if it is defined. Parsing with it runs that
    /// rule as the entry point via [`Grammar::parse_rule`].
    pub fn rule(&self, name: &str) -> Option<Atom> {
        self.table
            .by_name
            .contains_key(name)
            .then(|| self.table.reference(name))
    }

    /// The body of rule `name`, building it if no parse has yet.
    pub fn body(&self, name: &str) -> Option<Atom> {
        let id = *self.table.by_name.get(name)?;
        self.table.body(id).cloned()
    }

    /// Parses `text` starting from rule `name` instead of the root.
    pub fn parse_rule(&self, name: &str, text: &str) -> crate::PegResult<crate::Tree> {
        let entry = self.table.reference(name);
        EntryPoint {
            table: &self.table,
            entry,
        }
        .parse(text)
    }

    pub(crate) fn table(&self) -> &RuleTable {
        &self.table
    }
}

impl Parser for Grammar {
    fn rules(&self) -> &RuleTable {
        &self.table
    }

    fn entry(&self) -> Atom {
        let name = &self.table.slots[self.root.0].name;
        self.table.reference(name)
    }
}

struct EntryPoint<'a> {
    table: &'a RuleTable,
    entry: Atom,
}

impl Parser for EntryPoint<'_> {
    fn rules(&self) -> &RuleTable {
        self.table
    }

    fn entry(&self) -> Atom {
        self.entry.clone()
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("root", &self.root_name())
            .field("rules", &self.table.names().collect::<Vec<_>>())
            .finish()
    }
}
