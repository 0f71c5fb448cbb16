//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the
//! service by value. Nothing in the core reads environment variables or
//! process-wide state during request handling; the service object owns its
//! handles and every tunable lives here.

use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_ALPHABET, DEFAULT_COLLISION_THRESHOLD, DEFAULT_KEY_ENTROPY,
    DEFAULT_MAX_LEN, DEFAULT_MIN_LEN, KEY_FILE_NAME, LEDGER_FILE_NAME, UPLOAD_DIR_NAME,
};
use crate::space::IdentifierSpace;
use crate::{DropError, DropResult};
use filedrop_types::Extension;
use std::path::{Path, PathBuf};

/// Service configuration resolved at startup.
///
/// Constructed with [`ServiceConfig::new`] (stock defaults: 62-symbol
/// alphabet, lengths 2..=4, the standard extension whitelist) and adjusted
/// with the `with_*` methods. The identifier space
/// itself is validated when [`identifier_space`](Self::identifier_space) is
/// called, which happens once during service construction.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    data_dir: PathBuf,
    allowed_extensions: Vec<Extension>,
    alphabet: String,
    min_len: usize,
    max_len: usize,
    collision_threshold: u32,
    key_entropy: usize,
    strict_exhaustion: bool,
}

impl ServiceConfig {
    /// Creates a configuration rooted at `data_dir` with stock defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::Validation`] only if the built-in default
    /// extension list fails to parse, which would be a programming error;
    /// the fallible signature exists so custom lists flow through the same
    /// validation.
    pub fn new(data_dir: impl Into<PathBuf>) -> DropResult<Self> {
        let allowed_extensions = DEFAULT_ALLOWED_EXTENSIONS
            .iter()
            .map(Extension::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            data_dir: data_dir.into(),
            allowed_extensions,
            alphabet: DEFAULT_ALPHABET.to_owned(),
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            collision_threshold: DEFAULT_COLLISION_THRESHOLD,
            key_entropy: DEFAULT_KEY_ENTROPY,
            strict_exhaustion: false,
        })
    }

    /// Replaces the allowed-extension set.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::Validation`] if `extensions` is empty.
    pub fn with_extensions(mut self, extensions: Vec<Extension>) -> DropResult<Self> {
        if extensions.is_empty() {
            return Err(DropError::Validation(
                "allowed extension set cannot be empty".into(),
            ));
        }
        self.allowed_extensions = extensions;
        Ok(self)
    }

    /// Replaces the identifier alphabet.
    pub fn with_alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.alphabet = alphabet.into();
        self
    }

    /// Replaces the identifier length range.
    pub fn with_length_range(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    /// Replaces the collision threshold.
    pub fn with_collision_threshold(mut self, threshold: u32) -> Self {
        self.collision_threshold = threshold;
        self
    }

    /// Replaces the API key entropy length.
    pub fn with_key_entropy(mut self, entropy: usize) -> Self {
        self.key_entropy = entropy;
        self
    }

    /// Enables or disables strict exhaustion mode. When enabled, a full
    /// namespace fails allocation instead of overwriting.
    pub fn with_strict_exhaustion(mut self, strict: bool) -> Self {
        self.strict_exhaustion = strict;
        self
    }

    /// Builds the (validated) identifier space from the configured alphabet
    /// and length range.
    pub fn identifier_space(&self) -> DropResult<IdentifierSpace> {
        IdentifierSpace::new(&self.alphabet, self.min_len, self.max_len)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn key_file(&self) -> PathBuf {
        self.data_dir.join(KEY_FILE_NAME)
    }

    pub fn ledger_file(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE_NAME)
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join(UPLOAD_DIR_NAME)
    }

    pub fn allowed_extensions(&self) -> &[Extension] {
        &self.allowed_extensions
    }

    pub fn collision_threshold(&self) -> u32 {
        self.collision_threshold
    }

    pub fn key_entropy(&self) -> usize {
        self.key_entropy
    }

    pub fn strict_exhaustion(&self) -> bool {
        self.strict_exhaustion
    }
}
