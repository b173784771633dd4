#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP client used by the dataset lookup functions
//!
//! A hyper-based client with:
//! - TLS via rustls with webpki roots (HTTPS only by default)
//! - Connection pooling
//! - A per-request timeout
//! - A fixed User-Agent on every lookup
//! - Transparent response decompression (gzip, brotli, deflate)
//! - Body size limits on decompressed bytes
//!
//! There is deliberately no retry layer: a failed lookup is reported to the
//! caller immediately.
//!
//! # Example
//!
//! ```ignore
//! use lookup_http::HttpClient;
//! use std::time::Duration;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(10))
//!     .user_agent("sheet-lookup/0.1")
//!     .build()?;
//!
//! let record: serde_json::Value = client
//!     .get("https://api.example.com/lifespan/Concrete")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod request;
mod response;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use request::RequestBuilder;
pub use response::HttpResponse;
