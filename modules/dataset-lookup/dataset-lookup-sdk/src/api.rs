//! `DatasetLookupApi` trait definition.

use async_trait::async_trait;

use crate::errors::LookupError;
use crate::models::CellValue;

/// Spreadsheet functions backed by the dataset lookup service.
///
/// `info`, `life` and `data` never fail: every failure is reported as a
/// sentinel text value. `get` is batched with other `get` calls issued in
/// the same window and fails only when the service reports an error for
/// that specific invocation.
#[async_trait]
pub trait DatasetLookupApi: Send + Sync {
    /// Indicator value of a dataset for a life-cycle module.
    ///
    /// # Errors
    /// [`LookupError::Service`] when the service rejects this invocation.
    async fn get(
        &self,
        name: &str,
        indicator: &str,
        module: &str,
    ) -> Result<CellValue, LookupError>;

    /// General information field of a dataset.
    async fn info(&self, name: &str, info: &str) -> CellValue;

    /// Lifespan of a dataset.
    async fn life(&self, name: &str) -> CellValue;

    /// Best matching dataset for a material or component name.
    async fn data(&self, name: &str) -> CellValue;
}
