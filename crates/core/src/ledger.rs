//! Durable identifier usage accounting.
//!
//! The ledger is a newline-delimited file of `identifier<TAB>extension`
//! records, appended in allocation order. It is the sole source of truth for
//! "is this identifier taken": every query re-reads the file, and the
//! allocator never caches uniqueness results across calls.
//!
//! Uniqueness is scoped to the identifier alone, ignoring the extension, so
//! a short code names at most one stored blob even across extensions. The
//! extension column exists for per-extension capacity accounting.
//!
//! The ledger does not enforce check-then-insert atomicity itself; the
//! service facade serialises allocation (see [`crate::service`]).

use crate::{DropError, DropResult};
use filedrop_types::Extension;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only mapping of issued identifier to extension.
///
/// Holds only the ledger file path; no in-memory state, so clones observe
/// the same persisted records.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    ledger_file: PathBuf,
}

/// A single parsed ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub identifier: String,
    pub extension: Extension,
}

impl UsageLedger {
    /// Creates a ledger over `ledger_file`.
    ///
    /// The file does not need to exist yet; a missing file reads as an
    /// empty ledger and is created on first insert.
    pub fn new(ledger_file: &Path) -> Self {
        Self {
            ledger_file: ledger_file.to_path_buf(),
        }
    }

    /// Returns true iff no stored record carries `identifier`.
    ///
    /// Scope is the identifier alone; the extension of stored records is
    /// irrelevant here.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::LedgerRead`] if the ledger exists but cannot be
    /// read.
    pub fn is_unique(&self, identifier: &str) -> DropResult<bool> {
        let entries = self.read_entries()?;
        Ok(!entries.iter().any(|e| e.identifier == identifier))
    }

    /// Durably appends `(identifier, extension)`.
    ///
    /// The append is fsynced before returning, so the record is visible to
    /// any [`is_unique`](Self::is_unique) or count query issued afterwards,
    /// including through other ledger handles.
    ///
    /// Callers must only pass an identifier that just passed `is_unique`
    /// within the same serialised allocation attempt, except when the
    /// exhaustion fallback deliberately commits a collision.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::LedgerWrite`] if the append or sync fails.
    pub fn insert(&self, identifier: &str, extension: &Extension) -> DropResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.ledger_file)
            .map_err(DropError::LedgerWrite)?;
        file.write_all(format!("{identifier}\t{extension}\n").as_bytes())
            .map_err(DropError::LedgerWrite)?;
        file.sync_all().map_err(DropError::LedgerWrite)?;
        Ok(())
    }

    /// Number of records whose extension matches `extension` exactly.
    pub fn count_by_extension(&self, extension: &Extension) -> DropResult<u64> {
        let entries = self.read_entries()?;
        Ok(entries.iter().filter(|e| &e.extension == extension).count() as u64)
    }

    /// Total number of records.
    pub fn total_count(&self) -> DropResult<u64> {
        Ok(self.read_entries()?.len() as u64)
    }

    /// Path of the underlying ledger file.
    pub fn ledger_file(&self) -> &Path {
        &self.ledger_file
    }

    /// Reads and parses every record, in insertion order.
    ///
    /// Unparsable lines are skipped with a warning rather than failing the
    /// whole read; a truncated trailing line must not take down every
    /// request that touches the ledger.
    fn read_entries(&self) -> DropResult<Vec<LedgerEntry>> {
        let contents = match fs::read_to_string(&self.ledger_file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DropError::LedgerRead(e)),
        };

        let mut entries = Vec::new();
        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(entry) => entries.push(entry),
                None => {
                    tracing::warn!(
                        "skipping malformed ledger line in {}: {:?}",
                        self.ledger_file.display(),
                        line
                    );
                }
            }
        }
        Ok(entries)
    }
}

fn parse_line(line: &str) -> Option<LedgerEntry> {
    let (identifier, extension) = line.split_once('\t')?;
    if identifier.is_empty() {
        return None;
    }
    let extension = Extension::parse(extension).ok()?;
    Some(LedgerEntry {
        identifier: identifier.to_owned(),
        extension,
    })
}
