//! Constants used throughout the filedrop core crate.
//!
//! These are the defaults a service picks up when the operator configures
//! nothing; every one of them can be overridden through
//! [`ServiceConfig`](crate::ServiceConfig).

/// Default identifier alphabet: upper case, lower case, digits (62 symbols).
pub const DEFAULT_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default minimum identifier length.
pub const DEFAULT_MIN_LEN: usize = 2;

/// Default maximum identifier length.
///
/// With the 62-symbol alphabet, lengths 2 through 4 give 15,018,508
/// addressable identifiers per extension.
pub const DEFAULT_MAX_LEN: usize = 4;

/// Default number of colliding draws tolerated before the allocator warns
/// and arms the exhaustion fallback.
pub const DEFAULT_COLLISION_THRESHOLD: u32 = 100;

/// Default number of characters in a freshly issued API key.
pub const DEFAULT_KEY_ENTROPY: usize = 64;

/// Alphabet API key material is drawn from.
///
/// Fixed, deliberately not configurable: shrinking the identifier alphabet
/// to shorten URLs must not weaken key entropy.
pub const KEY_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Filename of the append-only API key list inside the data directory.
pub const KEY_FILE_NAME: &str = "api.keys";

/// Filename of the append-only identifier ledger inside the data directory.
pub const LEDGER_FILE_NAME: &str = "ledger.tsv";

/// Directory name for uploaded blobs inside the data directory.
pub const UPLOAD_DIR_NAME: &str = "uploads";

/// Default allowed-extension set (without dots; normalised on load).
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "jpg", "png", "ico", "bmp", "txt", "md", "gifv", "mp4", "gif", "webm", "mp3", "xml", "json",
    "csv",
];
