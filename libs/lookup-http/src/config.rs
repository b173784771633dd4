use std::time::Duration;

/// User-Agent sent when the lookup configuration does not name one.
pub const DEFAULT_USER_AGENT: &str = concat!("lookup-http/", env!("CARGO_PKG_VERSION"));

/// Whether lookup requests may leave the machine unencrypted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportSecurity {
    /// Only `https://` lookup URLs are accepted.
    #[default]
    TlsOnly,
    /// `http://` is accepted too (local lookup servers and mocks).
    AllowInsecureHttp,
}

impl TransportSecurity {
    #[must_use]
    pub fn from_allow_insecure(allow: bool) -> Self {
        if allow {
            Self::AllowInsecureHttp
        } else {
            Self::TlsOnly
        }
    }
}

/// Settings the dataset lookup functions control per deployment.
///
/// Connection pooling and buffering are fixed by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Bound on one GET or batch POST, including reading the body.
    pub request_timeout: Duration,
    /// Largest decompressed response accepted.
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn lookups_require_tls_unless_allowed() {
        assert_eq!(HttpClientConfig::default().transport, TransportSecurity::TlsOnly);
        assert_eq!(
            TransportSecurity::from_allow_insecure(false),
            TransportSecurity::TlsOnly
        );
        assert_eq!(
            TransportSecurity::from_allow_insecure(true),
            TransportSecurity::AllowInsecureHttp
        );
    }

    #[test]
    fn default_user_agent_names_the_client() {
        let config = HttpClientConfig::default();
        assert!(config.user_agent.starts_with("lookup-http/"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
