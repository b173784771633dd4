//! In-memory doubles for the domain ports.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::model::{BatchItem, BatchResponse, ResultRecord};
use super::ports::{
    ConnectivityProbe, KeyValueStore, LookupTransport, StorageError, TransportError,
};

type BatchReply = Box<dyn Fn(&[BatchItem]) -> Result<BatchResponse, TransportError> + Send + Sync>;
type SingleReply = Box<dyn Fn(&str) -> Result<ResultRecord, TransportError> + Send + Sync>;

pub fn record(value: serde_json::Value) -> ResultRecord {
    serde_json::from_value(value).unwrap()
}

#[must_use]
pub fn response(results: serde_json::Value) -> BatchResponse {
    serde_json::from_value(serde_json::json!({ "results": results })).unwrap()
}

/// Transport that records every call and answers from closures.
pub struct MockTransport {
    batches: Mutex<Vec<Vec<BatchItem>>>,
    single_calls: Mutex<Vec<(String, Vec<String>)>>,
    batch_reply: BatchReply,
    single_reply: SingleReply,
    gate: Option<Arc<Semaphore>>,
    hang: bool,
}

impl MockTransport {
    /// Batch exchanges answer with `{"value": "<second arg>"}` per entry.
    #[must_use]
    pub fn echo() -> Self {
        Self::replying(|items| {
            let results = items
                .iter()
                .map(|item| serde_json::json!({ "value": item.args[1] }))
                .collect();
            Ok(BatchResponse { results })
        })
    }

    #[must_use]
    pub fn replying(
        reply: impl Fn(&[BatchItem]) -> Result<BatchResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            single_calls: Mutex::new(Vec::new()),
            batch_reply: Box::new(reply),
            single_reply: Box::new(|_| Ok(ResultRecord::default())),
            gate: None,
            hang: false,
        }
    }

    #[must_use]
    pub fn failing(error: TransportError) -> Self {
        let single = error.clone();
        Self::replying(move |_| Err(error.clone())).with_single(move |_| Err(single.clone()))
    }

    #[must_use]
    pub fn with_single(
        mut self,
        reply: impl Fn(&str) -> Result<ResultRecord, TransportError> + Send + Sync + 'static,
    ) -> Self {
        self.single_reply = Box::new(reply);
        self
    }

    /// Batch exchanges block until a permit is added to the returned semaphore.
    #[must_use]
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// Batch exchanges never complete.
    #[must_use]
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    #[must_use]
    pub fn batches(&self) -> Vec<Vec<BatchItem>> {
        self.batches.lock().clone()
    }

    #[must_use]
    pub fn single_calls(&self) -> Vec<(String, Vec<String>)> {
        self.single_calls.lock().clone()
    }

    fn single(&self, endpoint: &str, args: &[&str]) -> Result<ResultRecord, TransportError> {
        self.single_calls.lock().push((
            endpoint.to_owned(),
            args.iter().map(|a| (*a).to_owned()).collect(),
        ));
        (self.single_reply)(endpoint)
    }
}

#[async_trait]
impl LookupTransport for MockTransport {
    async fn batch(&self, items: &[BatchItem]) -> Result<BatchResponse, TransportError> {
        self.batches.lock().push(items.to_vec());
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        (self.batch_reply)(items)
    }

    async fn info(&self, name: &str, info: &str) -> Result<ResultRecord, TransportError> {
        self.single("info", &[name, info])
    }

    async fn lifespan(&self, name: &str) -> Result<ResultRecord, TransportError> {
        self.single("lifespan", &[name])
    }

    async fn material_match(&self, name: &str) -> Result<ResultRecord, TransportError> {
        self.single("material-match", &[name])
    }
}

/// Probe with a fixed answer that counts how often it was asked.
pub struct MockProbe {
    online: bool,
    calls: AtomicUsize,
}

impl MockProbe {
    #[must_use]
    pub fn online() -> Self {
        Self {
            online: true,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn offline() -> Self {
        Self {
            online: false,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityProbe for MockProbe {
    async fn is_online(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.online
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(std::io::Error::other("disk unplugged").into())
    }

    async fn set_item(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(std::io::Error::other("disk unplugged").into())
    }
}
