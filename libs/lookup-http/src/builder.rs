use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, TransportSecurity};
use crate::error::HttpError;
use crate::response::ResponseBody;
use crate::tls;
use bytes::Bytes;
use http::header::{HeaderValue, USER_AGENT};
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;
use tower_http::set_header::SetRequestHeaderLayer;

/// Requests waiting for the buffer worker; one sheet recalculation rarely exceeds this.
const BUFFER_CAPACITY: usize = 1024;
/// All lookups go to one host.
const POOL_MAX_IDLE: usize = 32;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Builder for an [`HttpClient`] over a tower middleware stack.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Allow insecure HTTP connections
    ///
    /// Only available in debug builds or with the `allow-insecure-http` feature.
    #[must_use]
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Build the HTTP client
    ///
    /// Request flow (outer to inner):
    /// `Buffer -> ErrorMapping -> Timeout -> User-Agent -> Decompression -> hyper`
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails or the user agent is not a valid header
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let HttpClientConfig {
            request_timeout,
            max_body_size,
            user_agent,
            transport,
        } = self.config;

        if transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!("insecure HTTP enabled; lookup traffic will not be encrypted");
        }

        let user_agent = HeaderValue::try_from(user_agent)?;
        let https = tls::build_https_connector(transport)?;

        let hyper_client = Client::builder(TokioExecutor::new())
            // pool_timer is required for pool_idle_timeout to take effect
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE)
            .build::<_, Full<Bytes>>(https);

        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(request_timeout))
            .layer(SetRequestHeaderLayer::overriding(USER_AGENT, user_agent))
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .map_response(box_response_body)
            .map_err(move |e: tower::BoxError| map_tower_error(e, request_timeout))
            .boxed_clone();

        let buffered: BufferedService = Buffer::new(service, BUFFER_CAPACITY);

        Ok(HttpClient {
            service: buffered,
            max_body_size,
            transport_security: transport,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Map tower errors to `HttpError`, keeping connect failures distinguishable.
fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }

    match err.downcast::<hyper_util::client::legacy::Error>() {
        Ok(hyper_err) => HttpError::from(*hyper_err),
        Err(other) => match other.downcast::<HttpError>() {
            Ok(http_err) => *http_err,
            Err(other) => HttpError::Transport(other),
        },
    }
}

fn box_response_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    let boxed: ResponseBody = body.map_err(Into::into).boxed();
    Response::from_parts(parts, boxed)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_builder_setters() {
        let builder = HttpClientBuilder::new()
            .timeout(Duration::from_secs(5))
            .user_agent("sheet-lookup/0.1");
        assert_eq!(builder.config.request_timeout, Duration::from_secs(5));
        assert_eq!(builder.config.user_agent, "sheet-lookup/0.1");
        assert_eq!(builder.config.transport, TransportSecurity::TlsOnly);
    }

    #[tokio::test]
    async fn test_invalid_user_agent_fails_build() {
        let result = HttpClientBuilder::new().user_agent("bad\nagent").build();
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }

    #[test]
    fn test_map_tower_error_timeout() {
        let err: tower::BoxError = Box::new(tower::timeout::error::Elapsed::new());
        let mapped = map_tower_error(err, Duration::from_secs(3));
        assert!(matches!(mapped, HttpError::Timeout(d) if d == Duration::from_secs(3)));
    }

    #[test]
    fn test_map_tower_error_passes_http_error_through() {
        let err: tower::BoxError = Box::new(HttpError::ServiceClosed);
        assert!(matches!(
            map_tower_error(err, Duration::from_secs(1)),
            HttpError::ServiceClosed
        ));
    }
}
