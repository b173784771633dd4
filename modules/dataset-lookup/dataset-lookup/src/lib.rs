//! Dataset Lookup Module
//!
//! Spreadsheet functions backed by the remote dataset lookup service:
//! `GET` (batched), `INFO`, `LIFE` and `DATA`.
//!
//! ## Public API
//!
//! The public API is defined in the `dataset-lookup-sdk` crate and re-exported here:
//! - `DatasetLookupApi` - the four functions as an async trait
//! - `CellValue`, `FunctionName`, `Operation` - data models
//! - `LookupError` - error types
//!
//! Build the module with [`DatasetLookup::init`] and call functions through
//! [`DatasetLookup::api`] or, by name, through [`DatasetLookup::registry`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// === PUBLIC API (from SDK) ===
pub use dataset_lookup_sdk::{CellValue, DatasetLookupApi, FunctionName, LookupError, Operation};

// === MODULE DEFINITION ===
pub mod module;
pub use module::DatasetLookup;

pub mod config;
pub use config::LookupConfig;

pub mod local_client;
pub mod registry;
pub use registry::FunctionRegistry;

// === INTERNAL MODULES ===
// Exposed for integration tests and custom adapters; not a stable API.
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
