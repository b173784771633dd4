//! Layered application configuration.
//!
//! defaults -> YAML file (`--config`) -> environment (`SHEET_LOOKUP__*`) -> CLI overrides

use std::path::Path;

use anyhow::Context;
use dataset_lookup::LookupConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "SHEET_LOOKUP__";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub lookup: LookupConfig,
}

/// Values given on the command line; `None` leaves the layered value alone.
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub api_base_url: Option<&'a str>,
}

impl AppConfig {
    /// Merge all configuration layers.
    ///
    /// # Errors
    /// Fails if the file cannot be parsed or a value has the wrong shape.
    pub fn load(path: Option<&Path>, overrides: &CliOverrides<'_>) -> anyhow::Result<Self> {
        Self::figment(path, overrides)
            .extract()
            .context("invalid configuration")
    }

    fn figment(path: Option<&Path>, overrides: &CliOverrides<'_>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        if let Some(url) = overrides.api_base_url {
            figment = figment.merge(Serialized::default("lookup.api_base_url", url));
        }
        figment
    }

    /// Effective configuration as pretty JSON.
    ///
    /// # Errors
    /// Fails only if a value cannot be serialized.
    pub fn to_pretty_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to render configuration")
    }
}
