//! Output ports (interfaces) for domain services.

use async_trait::async_trait;
use thiserror::Error;

use super::model::{BatchItem, BatchResponse, ResultRecord};

/// Why an exchange with the lookup service did not produce a usable response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server could not be reached at all (DNS, refused, reset before response).
    #[error("lookup service unreachable: {0}")]
    Unreachable(String),

    /// Non-success HTTP status.
    #[error("lookup service returned status {0}")]
    Status(u16),

    /// The response body was not what the protocol promises.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Anything else (timeouts, TLS, oversized bodies).
    #[error("lookup exchange failed: {0}")]
    Other(String),
}

/// Port for talking to the remote lookup service.
#[async_trait]
pub trait LookupTransport: Send + Sync {
    /// `POST {base}/batch`
    ///
    /// # Errors
    /// A [`TransportError`] describing why no usable response arrived.
    async fn batch(&self, items: &[BatchItem]) -> Result<BatchResponse, TransportError>;

    /// `GET {base}/info?name=..&info=..`
    ///
    /// # Errors
    /// See [`LookupTransport::batch`].
    async fn info(&self, name: &str, info: &str) -> Result<ResultRecord, TransportError>;

    /// `GET {base}/lifespan/{name}`
    ///
    /// # Errors
    /// See [`LookupTransport::batch`].
    async fn lifespan(&self, name: &str) -> Result<ResultRecord, TransportError>;

    /// `GET {base}/material-match/{name}`
    ///
    /// # Errors
    /// See [`LookupTransport::batch`].
    async fn material_match(&self, name: &str) -> Result<ResultRecord, TransportError>;
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Port for the host's persistent key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    /// [`StorageError`] when the backing store cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// [`StorageError`] when the value cannot be persisted.
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Port answering "is this client online right now?".
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}
