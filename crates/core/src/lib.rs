//! # filedrop core
//!
//! Short-identifier allocation and capacity accounting for the filedrop
//! upload service.
//!
//! The service stores uploaded blobs under short random identifiers drawn
//! from a deliberately small namespace (brevity of the retrieval URL is the
//! product feature; capacity is the trade-off). This crate is the
//! accounting authority for that namespace:
//!
//! - [`IdentifierSpace`] — alphabet, length range, exact capacity.
//! - [`KeyStore`] — append-only API key membership.
//! - [`UsageLedger`] — durable record of every issued identifier.
//! - [`Allocator`] — collision-aware allocation with a degrade-gracefully
//!   exhaustion policy.
//! - [`DiagnosticsReporter`] — per-extension utilisation statistics.
//! - [`DropService`] — the facade the I/O layer holds; owns all handles.
//!
//! **No API concerns**: HTTP routing, templates, static files and rate
//! limiting live in the (separate) web layer, which calls in with a
//! validated `(file bytes, extension, api key)` tuple and gets back an
//! identifier or a typed failure.

pub mod allocator;
pub mod config;
pub mod constants;
pub mod diagnostics;
mod error;
pub mod keystore;
pub mod ledger;
pub mod service;
pub mod space;

pub use allocator::{Allocation, Allocator};
pub use config::ServiceConfig;
pub use diagnostics::{DiagnosticsReporter, UsageReport, UsageRow, TOTAL_LABEL};
pub use error::{DropError, DropResult};
pub use keystore::KeyStore;
pub use ledger::UsageLedger;
pub use service::DropService;
pub use space::IdentifierSpace;

// Re-export the shared value types so the CLI and web layer can depend on
// one crate for the whole core surface.
pub use filedrop_types::{ApiKey, Extension, TypeError};
