//! Sentinel values and the status classification shared by all functions.

use dataset_lookup_sdk::CellValue;
use serde::{Deserialize, Serialize};

use super::model::ResponseStatus;

/// Fixed display strings returned instead of a lookup value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Sentinels {
    /// Generic failure, and validation failure of `INFO`.
    pub no_value: String,
    /// Service unreachable or client offline (batch path).
    pub no_connection: String,
    /// Validation and failure fallback of `LIFE` and `DATA`.
    pub no_dataset: String,
    /// `limit_reached` status.
    pub limit: String,
    /// `free_token` status.
    pub trial: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            no_value: "no value".to_owned(),
            no_connection: "no connection".to_owned(),
            no_dataset: "no dataset found".to_owned(),
            limit: "limit".to_owned(),
            trial: "trial version".to_owned(),
        }
    }
}

impl Sentinels {
    /// Informational sentinel overriding the value for a business status.
    #[must_use]
    pub fn for_status(&self, status: Option<&ResponseStatus>) -> Option<CellValue> {
        match status? {
            ResponseStatus::LimitReached => Some(CellValue::text(&self.limit)),
            ResponseStatus::FreeToken => Some(CellValue::text(&self.trial)),
            ResponseStatus::Ok | ResponseStatus::Other(_) => None,
        }
    }

    #[must_use]
    pub fn no_value(&self) -> CellValue {
        CellValue::text(&self.no_value)
    }

    #[must_use]
    pub fn no_connection(&self) -> CellValue {
        CellValue::text(&self.no_connection)
    }

    #[must_use]
    pub fn no_dataset(&self) -> CellValue {
        CellValue::text(&self.no_dataset)
    }
}
