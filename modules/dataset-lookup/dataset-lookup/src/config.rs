//! Configuration for the dataset lookup module.

use std::path::PathBuf;
use std::time::Duration;

use lookup_http::{HttpClientConfig, TransportSecurity};
use serde::{Deserialize, Serialize};

use crate::domain::classify::Sentinels;

/// Default User-Agent sent to the lookup service.
pub const DEFAULT_USER_AGENT: &str = concat!("dataset-lookup/", env!("CARGO_PKG_VERSION"));

/// Dataset lookup module configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupConfig {
    /// Base URL of the lookup service; endpoint paths are appended to it.
    pub api_base_url: String,

    /// How long `GET` invocations are collected before one batch is sent.
    #[serde(with = "humantime_serde")]
    pub batch_window: Duration,

    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub connectivity: ConnectivityConfig,
    pub sentinels: Sentinels,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            batch_window: default_batch_window(),
            http: HttpConfig::default(),
            storage: StorageConfig::default(),
            connectivity: ConnectivityConfig::default(),
            sentinels: Sentinels::default(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.example.com".to_owned()
}

fn default_batch_window() -> Duration {
    Duration::from_millis(100)
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub max_body_size: usize,
    pub user_agent: String,
    /// Permit `http://` base URLs (local servers, mocks).
    pub allow_insecure_http: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            allow_insecure_http: false,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn to_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            request_timeout: self.request_timeout,
            max_body_size: self.max_body_size,
            user_agent: self.user_agent.clone(),
            transport: TransportSecurity::from_allow_insecure(self.allow_insecure_http),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local map; status is lost on exit.
    Memory,
    /// JSON file under `storage.dir`.
    #[default]
    File,
}

/// Where warning flags and completion timestamps are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory of the file store. Defaults to the platform data dir.
    pub dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            dir: None,
        }
    }
}

impl StorageConfig {
    /// Resolved file store directory.
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("sheet-lookup")
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// TCP connect to the service host.
    #[default]
    Tcp,
    AlwaysOnline,
}

/// Reachability check used when a batch exchange fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectivityConfig {
    pub probe: ProbeKind,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe: ProbeKind::Tcp,
            timeout: Duration::from_secs(1),
        }
    }
}

/// `Duration` fields as humantime strings ("100ms", "30s").
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }
}
