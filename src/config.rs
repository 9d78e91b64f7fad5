use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::{reporter::ReporterKind, Error, PegResult};

/// Per-call parse settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accept a match that leaves input behind.
    #[serde(default)]
    pub prefix: bool,

    /// Which cause to surface when the parse fails.
    #[serde(default)]
    pub reporter: ReporterKind,

    /// Record a warning whenever flattening overwrites a named value.
    #[serde(default = "default_true")]
    pub warn_duplicate_keys: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            prefix: false,
            reporter: ReporterKind::default(),
            warn_duplicate_keys: default_true(),
        }
    }
}

impl ParseOptions {
    pub fn prefix(mut self, prefix: bool) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn reporter(mut self, reporter: ReporterKind) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn warn_duplicate_keys(mut self, warn: bool) -> Self {
        self.warn_duplicate_keys = warn;
        self
    }

    pub fn from_file(path: impl AsRef<Path>) -> PegResult<Self> {
        from_file(path)
    }
}

fn default_true() -> bool {
    true
}

/// Reads a JSON config file.
pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> PegResult<T> {
    let file = File::open(path).map_err(|e| Error::Config(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> PegResult<T> {
    let config =
        serde_json::from_str(s).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}
