//! HTTP adapter for the lookup service.

use async_trait::async_trait;
use lookup_http::{HttpClient, HttpError};
use tracing::instrument;
use url::Url;

use crate::domain::error::DomainError;
use crate::domain::model::{BatchItem, BatchRequest, BatchResponse, ResultRecord};
use crate::domain::ports::{LookupTransport, TransportError};

/// `LookupTransport` over the lookup service REST API.
///
/// Endpoint paths are appended to `base`, so `https://host/api` yields
/// `https://host/api/batch` and so on. Arguments are percent-encoded as path
/// segments or query pairs.
pub struct HttpLookupTransport {
    client: HttpClient,
    base: Url,
}

impl HttpLookupTransport {
    /// # Errors
    /// Returns [`DomainError::InvalidBaseUrl`] if `base` cannot carry a path.
    pub fn new(client: HttpClient, base: Url) -> Result<Self, DomainError> {
        if base.cannot_be_a_base() {
            return Err(DomainError::invalid_base_url(
                base.as_str(),
                "url cannot be a base",
            ));
        }
        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::Other(format!("invalid base url {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch(&self, url: &Url) -> Result<ResultRecord, TransportError> {
        self.client
            .get(url.as_str())
            .send()
            .await
            .map_err(map_http_error)?
            .json()
            .await
            .map_err(map_http_error)
    }
}

#[async_trait]
impl LookupTransport for HttpLookupTransport {
    #[instrument(skip_all, fields(base = %self.base, size = items.len()))]
    async fn batch(&self, items: &[BatchItem]) -> Result<BatchResponse, TransportError> {
        let url = self.endpoint(&["batch"])?;
        self.client
            .post(url.as_str())
            .json(&BatchRequest { batch: items })
            .map_err(|e| TransportError::Other(e.to_string()))?
            .send()
            .await
            .map_err(map_http_error)?
            .json()
            .await
            .map_err(map_http_error)
    }

    #[instrument(skip_all, fields(base = %self.base, name = %name, info = %info))]
    async fn info(&self, name: &str, info: &str) -> Result<ResultRecord, TransportError> {
        let mut url = self.endpoint(&["info"])?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("info", info);
        self.fetch(&url).await
    }

    #[instrument(skip_all, fields(base = %self.base, name = %name))]
    async fn lifespan(&self, name: &str) -> Result<ResultRecord, TransportError> {
        let url = self.endpoint(&["lifespan", name])?;
        self.fetch(&url).await
    }

    #[instrument(skip_all, fields(base = %self.base, name = %name))]
    async fn material_match(&self, name: &str) -> Result<ResultRecord, TransportError> {
        let url = self.endpoint(&["material-match", name])?;
        self.fetch(&url).await
    }
}

fn map_http_error(err: HttpError) -> TransportError {
    if err.is_connect() {
        return TransportError::Unreachable(err.to_string());
    }
    if let Some(status) = err.status() {
        return TransportError::Status(status.as_u16());
    }
    match err {
        HttpError::Json(e) => TransportError::Decode(e.to_string()),
        other => TransportError::Other(other.to_string()),
    }
}
