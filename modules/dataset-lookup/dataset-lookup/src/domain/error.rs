//! Domain errors for the dataset lookup module.

use thiserror::Error;

/// Failures while wiring the module together.
///
/// Lookups themselves never fail with a `DomainError`; their failures become
/// sentinel values.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("http client: {0}")]
    HttpClient(#[from] lookup_http::HttpError),

    #[error("storage: {0}")]
    Storage(#[from] super::ports::StorageError),

    #[error("no tokio runtime available; the batch coordinator must be created inside one")]
    NoRuntime,
}

impl DomainError {
    #[must_use]
    pub fn invalid_base_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
