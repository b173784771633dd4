//! Local implementation of `DatasetLookupApi`.
//!
//! `get` goes through the batch coordinator; the other functions call the
//! single-shot service directly.

use async_trait::async_trait;

use dataset_lookup_sdk::{CellValue, DatasetLookupApi, LookupError, Operation};

use crate::domain::batch::BatchCoordinator;
use crate::domain::service::LookupService;

pub struct DatasetLookupLocalClient {
    coordinator: BatchCoordinator,
    service: LookupService,
}

impl DatasetLookupLocalClient {
    #[must_use]
    pub fn new(coordinator: BatchCoordinator, service: LookupService) -> Self {
        Self {
            coordinator,
            service,
        }
    }
}

#[async_trait]
impl DatasetLookupApi for DatasetLookupLocalClient {
    async fn get(
        &self,
        name: &str,
        indicator: &str,
        module: &str,
    ) -> Result<CellValue, LookupError> {
        self.coordinator
            .enqueue(
                Operation::Get,
                vec![name.to_owned(), indicator.to_owned(), module.to_owned()],
            )
            .await
    }

    async fn info(&self, name: &str, info: &str) -> CellValue {
        self.service.info(name, info).await
    }

    async fn life(&self, name: &str) -> CellValue {
        self.service.life(name).await
    }

    async fn data(&self, name: &str) -> CellValue {
        self.service.data(name).await
    }
}
