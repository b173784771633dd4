//! Records exchanged with the lookup service.

use dataset_lookup_sdk::{CellValue, Operation};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One invocation as sent inside a batch request.
///
/// Settlement handles stay in the coordinator; only this part is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub operation: Operation,
    pub args: Vec<String>,
}

/// Body of `POST {base}/batch`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRequest<'a> {
    pub batch: &'a [BatchItem],
}

/// Response of `POST {base}/batch`; `results[i]` answers `batch[i]`.
///
/// Records stay raw JSON here and are decoded one by one with
/// [`ResultRecord::from_json`], so a malformed record only affects its own entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Business status reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    /// Quota exhausted, no usable value.
    LimitReached,
    /// Trial / unlicensed usage.
    FreeToken,
    Other(String),
}

impl From<String> for ResponseStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ok" => Self::Ok,
            "limit_reached" => Self::LimitReached,
            "free_token" => Self::FreeToken,
            _ => Self::Other(value),
        }
    }
}

/// `match` object of the material-match endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MaterialMatch {
    #[serde(default)]
    pub material: Option<String>,
}

/// One result record, shared by the batch and the single-shot endpoints.
///
/// Every field is read leniently: a field of an unexpected JSON type is
/// coerced instead of failing the record. Only a record that is not a JSON
/// object fails to decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultRecord {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<ResponseStatus>,
    #[serde(default, deserialize_with = "lenient_value")]
    pub value: Option<CellValue>,
    #[serde(default, deserialize_with = "truthy")]
    pub warning: bool,
    #[serde(default, deserialize_with = "error_text")]
    pub error: Option<String>,
    #[serde(default, rename = "match", deserialize_with = "lenient_match")]
    pub matched: Option<MaterialMatch>,
}

impl ResultRecord {
    /// Decode one raw record.
    ///
    /// # Errors
    /// Fails when `raw` is not a JSON object (`null`, a scalar, an array).
    pub fn from_json(raw: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(raw)
    }

    /// Service-reported error message, if any (blank messages do not count).
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|m| !m.is_empty())
    }
}

/// Persisted under the warning key whenever a response carries `warning`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    pub warning: bool,
    /// Unix time in milliseconds.
    pub timestamp: i64,
    /// Function whose response raised the warning.
    pub function: String,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The service is loose about the `warning` type; any truthy JSON value counts.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

/// Any truthy `error` is an error; non-string errors keep their JSON text.
fn error_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        v if !is_truthy(&v) => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ResponseStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(ResponseStatus::from(s)),
        other => Some(ResponseStatus::Other(other.to_string())),
    })
}

fn lenient_value<'de, D>(deserializer: D) -> Result<Option<CellValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(cell_value(Value::deserialize(deserializer)?))
}

/// Scalars map onto their cell variant; arrays and objects become their
/// compact JSON text.
fn cell_value(value: Value) -> Option<CellValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(CellValue::Bool(b)),
        Value::Number(n) => Some(
            n.as_f64()
                .map_or_else(|| CellValue::Text(n.to_string()), CellValue::Number),
        ),
        Value::String(s) => Some(CellValue::Text(s)),
        other @ (Value::Array(_) | Value::Object(_)) => Some(CellValue::Text(other.to_string())),
    }
}

/// A `match` that is not an object with a string `material` carries no match.
fn lenient_match<'de, D>(deserializer: D) -> Result<Option<MaterialMatch>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}
