use thiserror::Error;

use crate::cause::Cause;

/// Everything a parse or a config load can fail with.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseFailure),
    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("Config error: {0}")]
    Config(String),
}

pub type PegResult<T> = Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// The reported cause, if this is a parse failure.
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Error::Parse(failure) => Some(failure.cause()),
            _ => None,
        }
    }
}

/// The input did not match; carries the cause picked by the reporter.
#[derive(Error, Debug, Clone)]
#[error("{cause}")]
pub struct ParseFailure {
    cause: Cause,
}

impl ParseFailure {
    pub(crate) fn new(cause: Cause) -> Self {
        Self { cause }
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn into_cause(self) -> Cause {
        self.cause
    }

    pub fn ascii_tree(&self) -> String {
        self.cause.ascii_tree()
    }
}

/// A grammar that cannot be used as written.
#[derive(Error, Debug, Clone)]
pub enum GrammarError {
    #[error("rule {0:?} is referenced but not defined")]
    UndefinedRule(String),
    #[error("root rule {0:?} is not defined")]
    UndefinedRoot(String),
    #[error("grammar has no root rule")]
    MissingRoot,
    #[error("rule {0:?} is defined more than once")]
    DuplicateRule(String),
    #[error("invalid character class {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
