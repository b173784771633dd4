//! Connectivity probes.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use url::Url;

use crate::domain::error::DomainError;
use crate::domain::ports::ConnectivityProbe;

/// Online when a TCP connection to the service host succeeds in time.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    /// Probe the host and port of `base`.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidBaseUrl`] if `base` has no host or port.
    pub fn for_url(base: &Url, timeout: Duration) -> Result<Self, DomainError> {
        let host = base
            .host_str()
            .ok_or_else(|| DomainError::invalid_base_url(base.as_str(), "missing host"))?;
        let port = base
            .port_or_known_default()
            .ok_or_else(|| DomainError::invalid_base_url(base.as_str(), "unknown port"))?;
        Ok(Self {
            host: host.trim_start_matches('[').trim_end_matches(']').to_owned(),
            port,
            timeout,
        })
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_online(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        let online = matches!(tokio::time::timeout(self.timeout, connect).await, Ok(Ok(_)));
        tracing::debug!(host = %self.host, port = self.port, online, "connectivity probe");
        online
    }
}

/// Always reports online, so failed batches fall back to "no value".
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

#[async_trait]
impl ConnectivityProbe for AlwaysOnline {
    async fn is_online(&self) -> bool {
        true
    }
}
