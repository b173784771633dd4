//! Composition root: turns a [`LookupConfig`] into working functions.

use std::sync::Arc;

use anyhow::Context;
use dataset_lookup_sdk::DatasetLookupApi;
use lookup_http::HttpClientBuilder;
use tracing::{debug, info};
use url::Url;

use crate::config::{LookupConfig, ProbeKind, StorageBackend};
use crate::domain::batch::BatchCoordinator;
use crate::domain::error::DomainError;
use crate::domain::ports::{ConnectivityProbe, KeyValueStore, LookupTransport};
use crate::domain::service::LookupService;
use crate::domain::status::StatusStore;
use crate::infra::connectivity::{AlwaysOnline, TcpProbe};
use crate::infra::http::HttpLookupTransport;
use crate::infra::storage::{FileStore, InMemoryStore};
use crate::local_client::DatasetLookupLocalClient;
use crate::registry::FunctionRegistry;

/// The wired dataset lookup module.
#[derive(Clone)]
pub struct DatasetLookup {
    api: Arc<dyn DatasetLookupApi>,
    registry: FunctionRegistry,
    status: StatusStore,
    coordinator: BatchCoordinator,
}

impl DatasetLookup {
    /// Build the module with HTTP, storage and probe adapters from `config`.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Fails on an unusable base URL, HTTP client setup errors, or when no
    /// runtime is available.
    pub fn init(config: &LookupConfig) -> anyhow::Result<Self> {
        info!(api_base_url = %config.api_base_url, "initializing dataset_lookup module");

        // the HTTP client spawns its buffer worker on the current runtime
        tokio::runtime::Handle::try_current().map_err(|_| DomainError::NoRuntime)?;

        let base = Url::parse(&config.api_base_url)
            .with_context(|| format!("invalid api_base_url '{}'", config.api_base_url))?;

        let client = HttpClientBuilder::with_config(config.http.to_client_config())
            .build()
            .context("failed to build lookup HTTP client")?;
        let transport: Arc<dyn LookupTransport> =
            Arc::new(HttpLookupTransport::new(client, base.clone())?);

        let store: Arc<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemoryStore::new()),
            StorageBackend::File => {
                let dir = config.storage.resolved_dir();
                debug!(dir = %dir.display(), "using file status store");
                Arc::new(FileStore::new(dir))
            }
        };

        let probe: Arc<dyn ConnectivityProbe> = match config.connectivity.probe {
            ProbeKind::Tcp => Arc::new(TcpProbe::for_url(&base, config.connectivity.timeout)?),
            ProbeKind::AlwaysOnline => Arc::new(AlwaysOnline),
        };

        Ok(Self::with_ports(transport, store, probe, config)?)
    }

    /// Build the module around caller-supplied adapters.
    ///
    /// # Errors
    /// Returns [`DomainError::NoRuntime`] outside a tokio runtime.
    pub fn with_ports(
        transport: Arc<dyn LookupTransport>,
        store: Arc<dyn KeyValueStore>,
        probe: Arc<dyn ConnectivityProbe>,
        config: &LookupConfig,
    ) -> Result<Self, DomainError> {
        let status = StatusStore::new(store);
        let coordinator = BatchCoordinator::new(
            transport.clone(),
            probe,
            status.clone(),
            config.sentinels.clone(),
            config.batch_window,
        )?;
        let service = LookupService::new(transport, status.clone(), config.sentinels.clone());

        let api: Arc<dyn DatasetLookupApi> = Arc::new(DatasetLookupLocalClient::new(
            coordinator.clone(),
            service,
        ));
        let registry = FunctionRegistry::new(api.clone());

        Ok(Self {
            api,
            registry,
            status,
            coordinator,
        })
    }

    #[must_use]
    pub fn api(&self) -> Arc<dyn DatasetLookupApi> {
        self.api.clone()
    }

    #[must_use]
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn status(&self) -> &StatusStore {
        &self.status
    }

    #[must_use]
    pub fn coordinator(&self) -> &BatchCoordinator {
        &self.coordinator
    }
}
