//! Warning flags and completion timestamps kept in host storage.
//!
//! A status pane polls these keys to show quota warnings and the time the
//! last calculation finished. Writing them is best effort: storage failures
//! are logged and never change a lookup result.

use std::future::Future;
use std::sync::Arc;

use time::OffsetDateTime;

use super::model::WarningRecord;
use super::ports::{KeyValueStore, StorageError};

/// Storage key of the latest [`WarningRecord`].
pub const WARNING_KEY: &str = "your_warning_key";

/// Storage key of the last completion time, unix milliseconds.
pub const COMPLETION_KEY: &str = "customFunctionDone";

/// Writer and reader for the two status keys.
#[derive(Clone)]
pub struct StatusStore {
    store: Arc<dyn KeyValueStore>,
}

impl StatusStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a warning raised by `function`'s response.
    pub async fn record_warning(&self, function: &str) {
        let record = WarningRecord {
            warning: true,
            timestamp: now_millis(),
            function: function.to_owned(),
        };
        let value = match serde_json::to_string(&record) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode warning record");
                return;
            }
        };
        if let Err(e) = self.store.set_item(WARNING_KEY, value).await {
            tracing::warn!(error = %e, function, "failed to store warning record");
        }
    }

    /// Stamp the completion key with the current time.
    pub async fn record_completion(&self) {
        let now = now_millis().to_string();
        if let Err(e) = self.store.set_item(COMPLETION_KEY, now).await {
            tracing::warn!(error = %e, "failed to store completion timestamp");
        }
    }

    /// Run `work`, then record completion whatever it produced.
    pub async fn finish<F: Future>(&self, work: F) -> F::Output {
        let output = work.await;
        self.record_completion().await;
        output
    }

    /// Latest warning record, if any.
    ///
    /// # Errors
    /// Returns [`StorageError`] if the store cannot be read or holds garbage.
    pub async fn warning(&self) -> Result<Option<WarningRecord>, StorageError> {
        match self.store.get_item(WARNING_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Last completion time in unix milliseconds, if any.
    ///
    /// # Errors
    /// Returns [`StorageError`] if the store cannot be read or holds garbage.
    pub async fn last_completion(&self) -> Result<Option<i64>, StorageError> {
        match self.store.get_item(COMPLETION_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

fn now_millis() -> i64 {
    let elapsed = OffsetDateTime::now_utc() - OffsetDateTime::UNIX_EPOCH;
    i64::try_from(elapsed.whole_milliseconds()).unwrap_or(i64::MAX)
}
