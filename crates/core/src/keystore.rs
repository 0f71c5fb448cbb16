//! Append-only API key storage.
//!
//! Keys live in a newline-delimited file, one key per line. The file is the
//! sole source of truth: [`KeyStore::is_valid`] re-reads the whole set on
//! every call, so a key issued by another handle (or the CLI) is visible to
//! the very next validation without any cache invalidation protocol.
//!
//! Issuance appends and fsyncs before returning, so a freshly issued key is
//! durable and immediately usable.

use crate::constants::KEY_ALPHABET;
use crate::{DropError, DropResult};
use filedrop_types::ApiKey;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only set of accepted API keys.
///
/// The store holds only the key file path; it keeps no in-memory state, so
/// cloning is cheap and every instance observes the same persisted set.
#[derive(Debug, Clone)]
pub struct KeyStore {
    key_file: PathBuf,
    entropy: usize,
}

impl KeyStore {
    /// Creates a key store over `key_file`.
    ///
    /// The file does not need to exist yet; a missing file reads as the
    /// empty set and is created on first issuance.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::Validation`] if `entropy` is zero.
    pub fn new(key_file: &Path, entropy: usize) -> DropResult<Self> {
        if entropy == 0 {
            return Err(DropError::Validation(
                "key entropy must be at least 1".into(),
            ));
        }
        Ok(Self {
            key_file: key_file.to_path_buf(),
            entropy,
        })
    }

    /// Generates a fresh high-entropy key, durably appends it, and returns it.
    ///
    /// Key material comes from the fixed [`KEY_ALPHABET`], never from the
    /// configured identifier space: key entropy must not shrink with the
    /// identifier alphabet, and keys stay far outside the short-code
    /// namespace. The append is fsynced before returning, so the key passes
    /// [`is_valid`](Self::is_valid) as soon as this call completes.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::KeyFileWrite`] if the append or sync fails.
    pub fn issue(&self) -> DropResult<ApiKey> {
        let key = random_key(self.entropy);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.key_file)
            .map_err(DropError::KeyFileWrite)?;
        file.write_all(format!("{key}\n").as_bytes())
            .map_err(DropError::KeyFileWrite)?;
        file.sync_all().map_err(DropError::KeyFileWrite)?;

        Ok(ApiKey::new(key).expect("issued key is non-empty by construction"))
    }

    /// Returns true iff `candidate`, after trimming surrounding whitespace,
    /// exactly matches one stored key (case-sensitive).
    ///
    /// Keys themselves never contain whitespace, so the trim only strips
    /// transport artefacts like a trailing newline or a copy-pasted space.
    /// Reads the full persisted set on every call; stored lines are trimmed
    /// the same way, so keys written with or without a final newline behave
    /// identically.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::KeyFileRead`] if the key file exists but cannot
    /// be read. A missing file is treated as the empty set.
    pub fn is_valid(&self, candidate: &str) -> DropResult<bool> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Ok(false);
        }

        let contents = match fs::read_to_string(&self.key_file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(DropError::KeyFileRead(e)),
        };

        Ok(contents.lines().any(|line| line.trim() == candidate))
    }

    /// Path of the underlying key file.
    pub fn key_file(&self) -> &Path {
        &self.key_file
    }
}

/// Draws `entropy` characters uniformly from [`KEY_ALPHABET`].
fn random_key(entropy: usize) -> String {
    let alphabet = KEY_ALPHABET.as_bytes();
    (0..entropy)
        .map(|_| {
            *alphabet
                .choose(&mut OsRng)
                .expect("key alphabet is non-empty") as char
        })
        .collect()
}
