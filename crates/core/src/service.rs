//! The service facade the I/O layer talks to.
//!
//! [`DropService`] owns the key store, the allocator and the diagnostics
//! reporter, resolved once from [`ServiceConfig`]. Handlers receive it by
//! reference; there are no module-level file handles or ambient database
//! connections anywhere in the core.
//!
//! # Allocation atomicity
//!
//! The check-then-insert sequence inside the allocator is serialised behind
//! a single mutex here. The flat-file ledger has no native unique
//! constraint, so without the mutex two concurrent requests could both see
//! the same candidate as unique and both commit it. Serialising the whole
//! allocation closes that race; the mutex is held across ledger I/O, which
//! is acceptable at the request rates this service is built for.

use crate::allocator::{Allocation, Allocator};
use crate::config::ServiceConfig;
use crate::diagnostics::{DiagnosticsReporter, UsageReport};
use crate::keystore::KeyStore;
use crate::ledger::UsageLedger;
use crate::{DropError, DropResult};
use filedrop_types::{ApiKey, Extension};
use std::fs::{self, OpenOptions};
use std::sync::{Mutex, PoisonError};

/// Owned handles to every core component, plus the allocation lock.
#[derive(Debug)]
pub struct DropService {
    config: ServiceConfig,
    keystore: KeyStore,
    allocator: Allocator,
    reporter: DiagnosticsReporter,
    alloc_lock: Mutex<()>,
}

impl DropService {
    /// Builds a service from `config`, validating every derived component.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::Validation`] if the identifier space, key
    /// entropy or collision threshold are invalid.
    pub fn new(config: ServiceConfig) -> DropResult<Self> {
        let space = config.identifier_space()?;
        let ledger = UsageLedger::new(&config.ledger_file());
        let keystore = KeyStore::new(&config.key_file(), config.key_entropy())?;
        let allocator = Allocator::new(
            space.clone(),
            ledger.clone(),
            config.collision_threshold(),
            config.strict_exhaustion(),
        )?;
        let reporter = DiagnosticsReporter::new(
            space,
            ledger,
            config.allowed_extensions().to_vec(),
            config.upload_dir(),
        );

        Ok(Self {
            config,
            keystore,
            allocator,
            reporter,
            alloc_lock: Mutex::new(()),
        })
    }

    /// Creates the data directory, upload directory, key file and ledger
    /// file if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns storage errors if any of the paths cannot be created.
    pub fn init_storage(&self) -> DropResult<()> {
        fs::create_dir_all(self.config.data_dir()).map_err(DropError::DataDirCreation)?;
        fs::create_dir_all(self.config.upload_dir()).map_err(DropError::DataDirCreation)?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.config.key_file())
            .map_err(DropError::KeyFileWrite)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.config.ledger_file())
            .map_err(DropError::LedgerWrite)?;

        Ok(())
    }

    /// Membership test for an uploaded API key. See
    /// [`KeyStore::is_valid`] for the trimming and freshness semantics.
    pub fn validate_key(&self, candidate: &str) -> DropResult<bool> {
        self.keystore.is_valid(candidate)
    }

    /// Issues a fresh API key. This operation is reserved for the CLI; it
    /// is not reachable through the upload interface.
    pub fn issue_key(&self) -> DropResult<ApiKey> {
        self.keystore.issue()
    }

    /// Returns true if `extension` is in the configured allow-list.
    pub fn is_allowed(&self, extension: &Extension) -> bool {
        self.config.allowed_extensions().contains(extension)
    }

    /// Allocates a short identifier for an upload with `extension`.
    ///
    /// Rejects disallowed extensions before touching the allocator. The
    /// allocation itself runs under the service-wide lock, so concurrent
    /// requests can never commit the same fresh identifier.
    ///
    /// # Errors
    ///
    /// [`DropError::ExtensionNotAllowed`] for extensions outside the
    /// allow-list; ledger storage errors; [`DropError::Exhausted`] in
    /// strict mode when the namespace is full.
    pub fn allocate_identifier(&self, extension: &Extension) -> DropResult<Allocation> {
        if !self.is_allowed(extension) {
            return Err(DropError::ExtensionNotAllowed(extension.clone()));
        }

        // A poisoned lock only means another allocation panicked; the
        // ledger itself stays consistent (append-only), so recover.
        let _guard = self
            .alloc_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.allocator.allocate(extension)
    }

    /// Computes the utilisation report. Read-only; does not take the
    /// allocation lock.
    pub fn diagnostics_report(&self) -> DropResult<UsageReport> {
        self.reporter.compute()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
