use filedrop_types::{Extension, TypeError};

/// Errors surfaced by the filedrop core.
///
/// The taxonomy deliberately separates what the caller can fix
/// ([`Validation`](DropError::Validation)) from what it cannot
/// ([`Storage`](DropError::Storage), fatal for the current request) and from
/// the strict-mode-only exhaustion signal
/// ([`Exhausted`](DropError::Exhausted)). Collisions below the configured
/// threshold are handled internally and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum DropError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("extension {0} is not in the allowed set")]
    ExtensionNotAllowed(Extension),
    #[error("failed to read key file: {0}")]
    KeyFileRead(#[source] std::io::Error),
    #[error("failed to append to key file: {0}")]
    KeyFileWrite(#[source] std::io::Error),
    #[error("failed to read ledger: {0}")]
    LedgerRead(#[source] std::io::Error),
    #[error("failed to append to ledger: {0}")]
    LedgerWrite(#[source] std::io::Error),
    #[error("failed to create data directory: {0}")]
    DataDirCreation(#[source] std::io::Error),
    #[error("identifier namespace for {extension} is exhausted")]
    Exhausted { extension: Extension },

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl DropError {
    /// Returns true if this error maps to the storage class of the error
    /// taxonomy (ledger or key store unreadable/unwritable).
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            DropError::KeyFileRead(_)
                | DropError::KeyFileWrite(_)
                | DropError::LedgerRead(_)
                | DropError::LedgerWrite(_)
                | DropError::DataDirCreation(_)
        )
    }
}

pub type DropResult<T> = std::result::Result<T, DropError>;
