//! Append-only bibliography store

use crate::error::Result;
use crate::types::BibRecord;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Matches the `@book{reyero2013moby,` header of a well-formed entry.
fn entry_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"(?m)^\s*@\w+\s*\{\s*([^,{}\s]+)\s*,").unwrap())
}

/// Text-backed set of bib entries, keyed by entry identifier.
///
/// The backing file is created lazily on first append and only ever appended
/// to, never rewritten. Membership is decided against the set of entry keys
/// parsed out of record headers, so a key that happens to be a prefix of
/// another key never shadows it.
pub struct BibStore {
    path: PathBuf,
}

impl BibStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry keys currently recorded. A store whose file does not exist yet
    /// is empty, not an error.
    pub fn identifiers(&self) -> Result<BTreeSet<String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(entry_header()
            .captures_iter(&text)
            .map(|c| c[1].to_string())
            .collect())
    }

    /// Whether an entry with this key is already recorded.
    pub fn contains(&self, bibid: &str) -> Result<bool> {
        Ok(self.identifiers()?.contains(bibid))
    }

    /// Append `record` unless its key is already present, separated from the
    /// previous entry by a blank line. Returns whether it was newly added.
    pub fn append(&self, record: &BibRecord) -> Result<bool> {
        if self.contains(&record.bibid)? {
            tracing::debug!(bibid = %record.bibid, "entry already recorded");
            return Ok(false);
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write!(file, "\n{}\n", record.entry.trim_end())?;
        Ok(true)
    }
}
