use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of write that produced the change.
#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ChangeKind {
    #[serde(rename = "created")]
    Created,
    #[serde(rename = "updated")]
    Updated,
}

/// A single change delivered by the trigger infrastructure.
///
/// Delivery is at-least-once, so the same envelope may show up more than once.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    /// Path of the changed value, e.g. `rooms/r1/users/u1/selectedFlower`.
    #[serde(rename = "ref")]
    pub reference: String,
    pub kind: ChangeKind,
    #[serde(default)]
    pub before: Option<Value>,
    #[serde(default)]
    pub after: Option<Value>,
}

impl ChangeEvent {
    pub fn created(reference: &str, value: Value) -> Self {
        Self {
            id: None,
            time: None,
            reference: reference.to_string(),
            kind: ChangeKind::Created,
            before: None,
            after: Some(value),
        }
    }

    pub fn updated(reference: &str, before: Value, after: Value) -> Self {
        Self {
            id: None,
            time: None,
            reference: reference.to_string(),
            kind: ChangeKind::Updated,
            before: Some(before),
            after: Some(after),
        }
    }

    /// String field of the `after` snapshot, e.g. the `uid` of a created message.
    pub fn after_field(&self, field: &str) -> Option<&str> {
        self.after
            .as_ref()
            .and_then(|value| value.get(field))
            .and_then(Value::as_str)
    }
}
