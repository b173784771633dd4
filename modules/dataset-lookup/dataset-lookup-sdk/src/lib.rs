//! Dataset Lookup SDK
//!
//! Public contract of the `dataset-lookup` module:
//! - `DatasetLookupApi` trait (the four spreadsheet functions)
//! - `CellValue`, `FunctionName` and `Operation` models
//! - `LookupError`
//!
//! ## Usage
//!
//! ```ignore
//! use dataset_lookup_sdk::DatasetLookupApi;
//!
//! let api = lookup.api();
//! let value = api.get("Concrete", "GWP", "A1-A3").await?;
//! let lifespan = api.life("Concrete").await;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod errors;
pub mod models;

pub use api::DatasetLookupApi;
pub use errors::LookupError;
pub use models::{CellValue, FunctionName, Operation};
