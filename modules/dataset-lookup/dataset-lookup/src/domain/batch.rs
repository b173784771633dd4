//! Request batching for lookups that share the `/batch` endpoint.
//!
//! Invocations issued within one batch window are queued and sent as a single
//! `POST /batch` exchange. Each invocation gets its own [`PendingResult`],
//! settled positionally from the response.
//!
//! The `flush_scheduled` flag is cleared when a flush takes its snapshot, not
//! when the exchange finishes, so invocations arriving while a batch is in
//! flight start a new, independent batch.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use dataset_lookup_sdk::{CellValue, LookupError, Operation};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use super::classify::Sentinels;
use super::error::DomainError;
use super::model::{BatchItem, ResultRecord};
use super::ports::{ConnectivityProbe, LookupTransport, TransportError};
use super::status::StatusStore;

/// Function name stored with warnings raised by batched responses.
///
/// Every batched operation reports as `get`, whatever its operation kind.
pub const BATCH_WARNING_SOURCE: &str = "get";

type Settlement = Result<CellValue, LookupError>;

struct PendingEntry {
    item: BatchItem,
    tx: oneshot::Sender<Settlement>,
}

#[derive(Default)]
struct QueueState {
    pending: Vec<PendingEntry>,
    flush_scheduled: bool,
}

struct Inner {
    state: Mutex<QueueState>,
    transport: Arc<dyn LookupTransport>,
    connectivity: Arc<dyn ConnectivityProbe>,
    status: StatusStore,
    sentinels: Sentinels,
    window: Duration,
    runtime: Handle,
    flushes: TaskTracker,
}

/// Collects invocations and sends them in windowed batches.
///
/// Cheap to clone; clones share one queue.
#[derive(Clone)]
pub struct BatchCoordinator {
    inner: Arc<Inner>,
}

impl BatchCoordinator {
    /// Create a coordinator bound to the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`DomainError::NoRuntime`] when called outside a tokio runtime.
    pub fn new(
        transport: Arc<dyn LookupTransport>,
        connectivity: Arc<dyn ConnectivityProbe>,
        status: StatusStore,
        sentinels: Sentinels,
        window: Duration,
    ) -> Result<Self, DomainError> {
        let runtime = Handle::try_current().map_err(|_| DomainError::NoRuntime)?;
        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                transport,
                connectivity,
                status,
                sentinels,
                window,
                runtime,
                flushes: TaskTracker::new(),
            }),
        })
    }

    /// Queue one invocation for the next batch.
    ///
    /// Never blocks and never fails. The first invocation of a window
    /// schedules the flush; later ones only join the queue.
    pub fn enqueue(&self, operation: Operation, args: Vec<String>) -> PendingResult {
        let (tx, rx) = oneshot::channel();
        let schedule = {
            let mut state = self.inner.state.lock();
            state.pending.push(PendingEntry {
                item: BatchItem { operation, args },
                tx,
            });
            !std::mem::replace(&mut state.flush_scheduled, true)
        };

        if schedule {
            let coordinator = self.clone();
            let window = self.inner.window;
            self.inner.flushes.spawn_on(
                async move {
                    tokio::time::sleep(window).await;
                    coordinator.flush().await;
                },
                &self.inner.runtime,
            );
        }

        PendingResult { rx }
    }

    /// Number of invocations waiting for the next flush.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Wait until every scheduled flush, including its completion write, is done.
    ///
    /// Callers settle before the completion timestamp is stored; processes
    /// that exit right after their last lookup call this first.
    pub async fn drain(&self) {
        let flushes = &self.inner.flushes;
        flushes.close();
        flushes.wait().await;
        flushes.reopen();
    }

    /// Send everything queued so far as one batch and settle it.
    ///
    /// Normally driven by the window timer. Records the completion timestamp
    /// once the batch is settled; an empty queue sends and records nothing.
    pub async fn flush(&self) {
        let entries = {
            let mut state = self.inner.state.lock();
            state.flush_scheduled = false;
            std::mem::take(&mut state.pending)
        };
        if entries.is_empty() {
            debug!("batch window closed with nothing queued");
            return;
        }

        let (items, senders): (Vec<_>, Vec<_>) =
            entries.into_iter().map(|e| (e.item, e.tx)).unzip();
        debug!(size = items.len(), "sending lookup batch");

        self.inner
            .status
            .finish(self.exchange(&items, senders))
            .await;
    }

    async fn exchange(&self, items: &[BatchItem], senders: Vec<oneshot::Sender<Settlement>>) {
        let outcome = match self.inner.transport.batch(items).await {
            Ok(response) if response.results.len() == items.len() => Ok(response.results),
            Ok(response) => Err(TransportError::Decode(format!(
                "expected {} results, got {}",
                items.len(),
                response.results.len()
            ))),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(results) => {
                for (tx, raw) in senders.into_iter().zip(results) {
                    let settlement = self.settle(raw).await;
                    deliver(tx, settlement);
                }
            }
            Err(e) => {
                let fallback = self.fallback_for(&e).await;
                warn!(error = %e, size = items.len(), fallback = %fallback, "lookup batch failed");
                for tx in senders {
                    deliver(tx, Ok(fallback.clone()));
                }
            }
        }
    }

    /// Settle one entry from its own raw record.
    ///
    /// A record that cannot be decoded settles only its entry, with `no value`.
    async fn settle(&self, raw: serde_json::Value) -> Settlement {
        let record = match ResultRecord::from_json(raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "malformed batch record");
                return Ok(self.inner.sentinels.no_value());
            }
        };
        if let Some(message) = record.error_message() {
            return Err(LookupError::service(message));
        }
        if record.warning {
            self.inner.status.record_warning(BATCH_WARNING_SOURCE).await;
        }
        Ok(self
            .inner
            .sentinels
            .for_status(record.status.as_ref())
            .unwrap_or_else(|| record.value.unwrap_or_default()))
    }

    /// One reachability decision for the whole failed batch.
    async fn fallback_for(&self, error: &TransportError) -> CellValue {
        let unreachable = matches!(error, TransportError::Unreachable(_));
        if unreachable || !self.inner.connectivity.is_online().await {
            self.inner.sentinels.no_connection()
        } else {
            self.inner.sentinels.no_value()
        }
    }
}

fn deliver(tx: oneshot::Sender<Settlement>, settlement: Settlement) {
    if tx.send(settlement).is_err() {
        debug!("lookup caller went away before its result arrived");
    }
}

/// Awaitable result of one queued invocation.
///
/// Resolves to [`LookupError::Abandoned`] if the coordinator is torn down
/// before the invocation is settled.
#[must_use = "a pending result does nothing unless awaited"]
pub struct PendingResult {
    rx: oneshot::Receiver<Settlement>,
}

impl PendingResult {
    /// Non-blocking peek; `None` while unsettled.
    ///
    /// Takes the value: once this returns `Some`, awaiting the handle yields
    /// `Abandoned`.
    pub fn try_result(&mut self) -> Option<Settlement> {
        match self.rx.try_recv() {
            Ok(settlement) => Some(settlement),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(LookupError::Abandoned)),
        }
    }
}

impl Future for PendingResult {
    type Output = Settlement;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(LookupError::Abandoned)))
    }
}
