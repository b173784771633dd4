use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::buffer::Buffer;

/// Future type of the type-erased inner service
pub(crate) type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// Buffered service shared by every clone of [`HttpClient`]
pub(crate) type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client for the lookup service over a buffered tower stack.
///
/// `HttpClient` is `Clone + Send + Sync`; cloning only clones the buffer
/// channel, so it can be stored directly in adapters without a mutex.
///
/// Must be built inside a tokio runtime (the buffer worker is spawned on it).
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl HttpClient {
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Create a GET request builder for an absolute URL
    #[must_use]
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::GET, url)
    }

    /// Create a POST request builder for an absolute URL
    #[must_use]
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::POST, url)
    }

    fn request(&self, method: http::Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            method,
            url.to_owned(),
            self.transport_security,
        )
    }
}

/// Map buffer errors to `HttpError`
///
/// The buffer either forwards the inner service error (already an
/// `HttpError`) or reports that its worker is gone.
pub(crate) fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(
                error = %err,
                "buffer worker closed unexpectedly; service unavailable"
            );
            HttpError::ServiceClosed
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn test_client() -> HttpClient {
        HttpClientBuilder::new()
            .allow_insecure_http()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_json() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(GET).path("/lifespan/Concrete");
            then.status(200).json_body(json!({"value": 50}));
        }).await;

        let client = test_client();
        let url = format!("{}/lifespan/Concrete", server.base_url());
        let body: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();

        mock.assert_async().await;
        assert_eq!(body["value"], 50);
    }

    #[tokio::test]
    async fn test_post_json_sets_content_type() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(POST)
                .path("/batch")
                .header("content-type", "application/json")
                .json_body(json!({"batch": []}));
            then.status(200).json_body(json!({"results": []}));
        }).await;

        let client = test_client();
        let url = format!("{}/batch", server.base_url());
        let resp = client
            .post(&url)
            .json(&json!({"batch": []}))
            .unwrap()
            .send()
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_success_status_is_ok_until_checked() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/info");
            then.status(500).body("boom");
        }).await;

        let client = test_client();
        let url = format!("{}/info", server.base_url());
        let resp = client.get(&url).send().await.unwrap();
        assert_eq!(resp.status(), http::StatusCode::INTERNAL_SERVER_ERROR);

        let err = resp.json::<serde_json::Value>().await.unwrap_err();
        assert_eq!(err.status(), Some(http::StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_user_agent_header_sent() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(GET).path("/ua").header("user-agent", "sheet-lookup/test");
            then.status(200);
        }).await;

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .user_agent("sheet-lookup/test")
            .build()
            .unwrap();
        let url = format!("{}/ua", server.base_url());
        client.get(&url).send().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(500));
        }).await;

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let url = format!("{}/slow", server.base_url());
        let err = client.get(&url).send().await.unwrap_err();

        assert!(matches!(err, HttpError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        // Port 9 (discard) is closed on test machines
        let client = test_client();
        let err = client.get("http://127.0.0.1:9/batch").send().await.unwrap_err();

        assert!(err.is_connect(), "expected connect error, got {err:?}");
    }

    #[tokio::test]
    async fn test_https_required_by_default() {
        let client = HttpClient::builder().build().unwrap();
        let err = client.get("http://example.com/info").send().await.unwrap_err();

        assert!(matches!(err, HttpError::InvalidScheme { .. }));
    }

    #[tokio::test]
    async fn test_relative_url_rejected() {
        let client = test_client();
        let err = client.get("/batch").send().await.unwrap_err();

        assert!(matches!(
            err,
            HttpError::InvalidUri {
                kind: crate::InvalidUriKind::MissingAuthority,
                ..
            }
        ));
    }
}
