use crate::cause::{Cause, Message};
use crate::config::ParseOptions;
use crate::context::Context;
use crate::grammar::RuleTable;
use crate::source::Source;
use crate::tree::{DuplicateKey, Raw, Tree};
use crate::PegResult;

use super::atom::Atom;

/// What matching an atom yields before flattening.
pub(crate) type Outcome = Result<Raw, Cause>;

/// Characters of leftover input quoted in an "unconsumed input" message.
const UNCONSUMED_PREVIEW: usize = 10;

/// A successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub tree: Tree,
    /// Named values that were overwritten while flattening.
    pub warnings: Vec<DuplicateKey>,
}

/// Anything that can run a parse: a single atom, or a grammar.
pub trait Parser {
    /// Rules that references inside [`Parser::entry`] resolve against.
    fn rules(&self) -> &RuleTable;

    /// The atom the parse starts with.
    fn entry(&self) -> Atom;

    /// Parses all of `text`.
    fn parse(&self, text: &str) -> PegResult<Tree> {
        self.parse_with(text, &ParseOptions::default())
            .map(|parsed| parsed.tree)
    }

    /// Parses the longest prefix of `text` the entry atom matches.
    fn parse_prefix(&self, text: &str) -> PegResult<Tree> {
        let options = ParseOptions::default().prefix(true);
        self.parse_with(text, &options).map(|parsed| parsed.tree)
    }

    fn parse_with(&self, text: &str, options: &ParseOptions) -> PegResult<Parsed> {
        run(self.rules(), &self.entry(), text, options)
    }
}

impl Parser for Atom {
    fn rules(&self) -> &RuleTable {
        RuleTable::empty()
    }

    fn entry(&self) -> Atom {
        self.clone()
    }
}

#[tracing::instrument(
    level = "debug",
    target = "pegrat::parse",
    skip_all,
    fields(len = text.len(), prefix = options.prefix)
)]
fn run(rules: &RuleTable, entry: &Atom, text: &str, options: &ParseOptions) -> PegResult<Parsed> {
    let mut source = Source::new(text);
    let mut ctx = Context::new(rules, options);
    let outcome = entry.apply(&mut source, &mut ctx);
    ctx.memo.log_stats();

    if let Some(error) = ctx.take_fatal() {
        return Err(error.into());
    }

    let raw = match outcome {
        Ok(raw) if options.prefix || source.at_end() => raw,
        Ok(_) => {
            let offset = source.pos();
            let rest = source.peek_chars(UNCONSUMED_PREVIEW);
            let cause = ctx.err(Message::Unconsumed { rest }, offset, Vec::new());
            return Err(ctx.fail_parse(cause, &mut source));
        }
        Err(cause) => return Err(ctx.fail_parse(cause, &mut source)),
    };

    let tree = ctx.flatten(raw, false);
    tracing::debug!(target: "pegrat::parse", end = source.pos(), "parse succeeded");
    Ok(Parsed {
        tree,
        warnings: ctx.take_warnings(),
    })
}
