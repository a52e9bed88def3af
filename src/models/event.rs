use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// A persisted row of the `events` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i32,

    pub event_type: Option<String>,

    pub user_id: Option<String>,

    pub properties: Option<Value>,

    pub captured_at: DateTime<Utc>,
}

/// The subset of columns the stats fold reads.
#[derive(Debug, Clone, FromRow)]
pub struct EventKindRow {
    pub event_type: Option<String>,
    pub properties: Option<Value>,
}

/// Insert-side record extracted from a normalized request body.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub properties: Option<Value>,
    pub captured_at: DateTime<Utc>,
}

impl NewEvent {
    /// Picks the known fields out of a normalized body. Unknown keys are
    /// ignored; nothing is rejected.
    pub fn from_body(body: &Map<String, Value>) -> Self {
        let properties = body
            .get("properties")
            .filter(|value| is_truthy(value))
            .cloned();

        let captured_at = body
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        Self {
            event_type: text_field(body, "event"),
            user_id: text_field(body, "user_id"),
            properties,
            captured_at,
        }
    }
}

/// Shape returned by `GET /api/events`. The type and timestamp are exposed
/// under both their wire names and their column names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentEvent {
    pub id: i32,
    pub event: Option<String>,
    pub user_id: Option<String>,
    pub properties: Option<Value>,
    pub timestamp: String,
    pub event_type: Option<String>,
    pub captured_at: String,
}

impl From<Event> for RecentEvent {
    fn from(event: Event) -> Self {
        let captured_at = event.captured_at.to_rfc3339_opts(SecondsFormat::Micros, false);
        Self {
            id: event.id,
            event: event.event_type.clone(),
            user_id: event.user_id,
            properties: event.properties,
            timestamp: captured_at.clone(),
            event_type: event.event_type,
            captured_at,
        }
    }
}

/// Attaches a server-side `timestamp` when the client did not send one.
pub fn normalize(mut body: Map<String, Value>) -> Map<String, Value> {
    if !body.contains_key("timestamp") {
        body.insert("timestamp".to_string(), Value::String(now_iso8601()));
    }
    body
}

pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Accepts RFC 3339 (including a `Z` suffix), a naive date-time or a bare
/// date. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `null`, `false`, zero, and empty strings/arrays/objects count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn text_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
