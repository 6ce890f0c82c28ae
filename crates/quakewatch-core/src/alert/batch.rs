//! Schema-tolerant alert batch extraction.
//!
//! Fields are pulled out of a `serde_json::Value` one by one instead of being
//! deserialized into a strict struct: Alertmanager senders differ in which
//! keys they include, and a missing or oddly-typed field only degrades the
//! rendered record to a placeholder.

use serde_json::{Map, Value};

use crate::error::{QuakeWatchError, Result};

pub const DEFAULT_STATUS: &str = "unknown";
pub const DEFAULT_ALERTNAME: &str = "Unknown";
pub const DEFAULT_SEVERITY: &str = "unknown";
pub const DEFAULT_SERVICE: &str = "unknown";
pub const DEFAULT_SUMMARY: &str = "No summary";
pub const DEFAULT_DESCRIPTION: &str = "No description";
pub const DEFAULT_STARTS_AT: &str = "Unknown";

/// One inbound webhook payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlertBatch {
    pub alerts: Vec<AlertItem>,
}

impl AlertBatch {
    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| QuakeWatchError::MalformedPayload(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Extract a batch from an already parsed payload.
    ///
    /// `alerts` absent or `null` yields an empty batch.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            QuakeWatchError::MalformedPayload(format!(
                "expected a JSON object, got {}",
                type_name(value)
            ))
        })?;

        let alerts = match obj.get("alerts") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(AlertItem::from_value).collect(),
            Some(other) => {
                return Err(QuakeWatchError::MalformedPayload(format!(
                    "`alerts` must be an array, got {}",
                    type_name(other)
                )))
            }
        };

        Ok(Self { alerts })
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// One alert with every field defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertItem {
    pub status: String,
    pub alertname: String,
    pub severity: String,
    pub service: String,
    pub summary: String,
    pub description: String,
    pub starts_at: String,
    /// Present only when the alert has resolved.
    pub ends_at: Option<String>,
}

impl AlertItem {
    /// Never fails: an item that is not an object yields all defaults.
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let item = value.as_object().unwrap_or_else(|| {
            tracing::debug!(kind = type_name(value), "alert item is not an object; using defaults");
            &empty
        });
        let labels = nested(item, "labels").unwrap_or(&empty);
        let annotations = nested(item, "annotations").unwrap_or(&empty);

        Self {
            status: field(item, "status").unwrap_or_else(|| DEFAULT_STATUS.into()),
            alertname: field(labels, "alertname").unwrap_or_else(|| DEFAULT_ALERTNAME.into()),
            severity: field(labels, "severity").unwrap_or_else(|| DEFAULT_SEVERITY.into()),
            service: field(labels, "service").unwrap_or_else(|| DEFAULT_SERVICE.into()),
            summary: field(annotations, "summary").unwrap_or_else(|| DEFAULT_SUMMARY.into()),
            description: field(annotations, "description")
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.into()),
            starts_at: field(item, "startsAt").unwrap_or_else(|| DEFAULT_STARTS_AT.into()),
            ends_at: field(item, "endsAt").filter(|s| !s.is_empty()),
        }
    }
}

fn nested<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

/// Strings as-is, other scalars as JSON text, `null` as absent.
fn field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
