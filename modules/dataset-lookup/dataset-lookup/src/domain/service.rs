//! Single-shot lookups: one request, one value.
//!
//! `info`, `life` and `data` validate their arguments, call one endpoint and
//! classify the response. They never fail; every failure becomes the
//! function's fallback sentinel. Completion is recorded on every path,
//! including rejected arguments.

use std::sync::Arc;

use dataset_lookup_sdk::{CellValue, FunctionName};
use tracing::{debug, instrument};

use super::classify::Sentinels;
use super::model::ResultRecord;
use super::ports::{LookupTransport, TransportError};
use super::status::StatusStore;

#[derive(Clone)]
pub struct LookupService {
    transport: Arc<dyn LookupTransport>,
    status: StatusStore,
    sentinels: Sentinels,
}

impl LookupService {
    #[must_use]
    pub fn new(
        transport: Arc<dyn LookupTransport>,
        status: StatusStore,
        sentinels: Sentinels,
    ) -> Self {
        Self {
            transport,
            status,
            sentinels,
        }
    }

    /// General information field of a dataset.
    #[instrument(skip(self))]
    pub async fn info(&self, name: &str, info: &str) -> CellValue {
        self.status
            .finish(async {
                let fallback = self.sentinels.no_value();
                if name.is_empty() || info.is_empty() {
                    return fallback;
                }
                let outcome = self.transport.info(name, info).await;
                self.resolve(FunctionName::Info, outcome, fallback, |r| r.value)
                    .await
            })
            .await
    }

    /// Lifespan of a dataset.
    #[instrument(skip(self))]
    pub async fn life(&self, name: &str) -> CellValue {
        self.status
            .finish(async {
                let fallback = self.sentinels.no_dataset();
                if name.is_empty() {
                    return fallback;
                }
                let outcome = self.transport.lifespan(name).await;
                self.resolve(FunctionName::Life, outcome, fallback, |r| r.value)
                    .await
            })
            .await
    }

    /// Best matching dataset for a material or component.
    #[instrument(skip(self))]
    pub async fn data(&self, name: &str) -> CellValue {
        self.status
            .finish(async {
                let fallback = self.sentinels.no_dataset();
                if name.is_empty() {
                    return fallback;
                }
                let outcome = self.transport.material_match(name).await;
                self.resolve(FunctionName::Data, outcome, fallback, |r| {
                    r.matched.and_then(|m| m.material).map(CellValue::Text)
                })
                .await
            })
            .await
    }

    async fn resolve(
        &self,
        function: FunctionName,
        outcome: Result<ResultRecord, TransportError>,
        fallback: CellValue,
        pick: impl FnOnce(ResultRecord) -> Option<CellValue>,
    ) -> CellValue {
        let record = match outcome {
            Ok(record) => record,
            Err(e) => {
                debug!(function = %function, error = %e, "lookup failed");
                return fallback;
            }
        };

        if record.warning {
            self.status.record_warning(function.as_str()).await;
        }
        if let Some(sentinel) = self.sentinels.for_status(record.status.as_ref()) {
            return sentinel;
        }
        pick(record)
            .filter(CellValue::is_present)
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::KeyValueStore;
    use crate::domain::status::{COMPLETION_KEY, WARNING_KEY};
    use crate::domain::test_support::{MockTransport, record};
    use crate::infra::storage::InMemoryStore;
    use serde_json::json;

    fn build(transport: MockTransport) -> (LookupService, Arc<MockTransport>, Arc<InMemoryStore>) {
        let transport = Arc::new(transport);
        let store = Arc::new(InMemoryStore::new());
        let service = LookupService::new(
            transport.clone(),
            StatusStore::new(store.clone()),
            Sentinels::default(),
        );
        (service, transport, store)
    }

    fn replying(value: serde_json::Value) -> MockTransport {
        MockTransport::echo().with_single(move |_| Ok(record(value.clone())))
    }

    #[tokio::test]
    async fn missing_arguments_short_circuit_without_a_request() {
        let (service, transport, store) = build(replying(json!({"value": "x"})));

        assert_eq!(service.info("", "x").await, CellValue::text("no value"));
        assert_eq!(service.info("A", "").await, CellValue::text("no value"));
        assert_eq!(service.life("").await, CellValue::text("no dataset found"));
        assert_eq!(service.data("").await, CellValue::text("no dataset found"));

        assert!(transport.single_calls().is_empty());
        assert!(store.get_item(COMPLETION_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn info_returns_value_and_passes_arguments() {
        let (service, transport, _) = build(replying(json!({"status": "ok", "value": "EN 15804"})));

        assert_eq!(
            service.info("Concrete", "standard").await,
            CellValue::text("EN 15804")
        );
        assert_eq!(
            transport.single_calls(),
            vec![(
                "info".to_owned(),
                vec!["Concrete".to_owned(), "standard".to_owned()]
            )]
        );
    }

    #[tokio::test]
    async fn numeric_zero_is_a_value() {
        let (service, _, _) = build(replying(json!({"value": 0})));
        assert_eq!(service.life("Brick").await, CellValue::Number(0.0));
    }

    #[tokio::test]
    async fn empty_values_fall_back() {
        for value in [json!(null), json!(""), json!(false)] {
            let (service, _, _) = build(replying(json!({ "value": value })));
            assert_eq!(service.life("Brick").await, CellValue::text("no dataset found"));
            assert_eq!(service.info("Brick", "unit").await, CellValue::text("no value"));
        }
    }

    #[tokio::test]
    async fn data_returns_matched_material() {
        let (service, transport, _) =
            build(replying(json!({"match": {"material": "Concrete C30/37"}})));

        assert_eq!(
            service.data("concrete").await,
            CellValue::text("Concrete C30/37")
        );
        assert_eq!(transport.single_calls()[0].0, "material-match");

        let (service, _, _) = build(replying(json!({"match": {}})));
        assert_eq!(service.data("concrete").await, CellValue::text("no dataset found"));
    }

    #[tokio::test]
    async fn business_statuses_win_over_values() {
        let (service, _, _) = build(replying(json!({"status": "limit_reached", "value": 40})));
        assert_eq!(service.life("Brick").await, CellValue::text("limit"));

        let (service, _, _) = build(replying(
            json!({"status": "free_token", "match": {"material": "Brick"}}),
        ));
        assert_eq!(service.data("Brick").await, CellValue::text("trial version"));
    }

    #[tokio::test]
    async fn transport_failures_use_function_fallback() {
        for error in [
            TransportError::Status(404),
            TransportError::Unreachable("refused".into()),
            TransportError::Decode("eof".into()),
        ] {
            let (service, _, store) = build(MockTransport::failing(error));
            assert_eq!(service.info("A", "b").await, CellValue::text("no value"));
            assert_eq!(service.life("A").await, CellValue::text("no dataset found"));
            assert_eq!(service.data("A").await, CellValue::text("no dataset found"));
            assert!(store.get_item(COMPLETION_KEY).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn warnings_are_tagged_with_the_function_name() {
        let (service, _, store) = build(replying(json!({"value": 50, "warning": true})));

        service.life("Brick").await;

        let raw = store.get_item(WARNING_KEY).await.unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored["function"], json!("life"));
    }
}
