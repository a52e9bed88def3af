use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::response::{ApiError, ApiResult};
use crate::models::event::normalize;

use super::AppState;

/// Fixed acknowledgment returned for every accepted write.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub status: u8,
}

impl Ack {
    pub const OK: Ack = Ack { status: 1 };
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("expected `batch` to be an array, got {0}")]
    BatchNotAnArray(&'static str),
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Json(e) => e.into(),
            _ => StatusCode::INTERNAL_SERVER_ERROR.into(),
        }
    }
}

#[axum::debug_handler]
pub async fn capture_event(State(state): State<AppState>, body: Bytes) -> ApiResult<Ack> {
    let event = decode_object(&body).inspect_err(|e| {
        error!("Error processing telemetry: {}", e);
    })?;

    state.recorder.record(&normalize(event)).await;

    Ok(Json(Ack::OK))
}

#[axum::debug_handler]
pub async fn capture_batch(State(state): State<AppState>, body: Bytes) -> ApiResult<Ack> {
    let entries = decode_batch(&body).inspect_err(|e| {
        error!("Error processing batch: {}", e);
    })?;

    info!("Received batch of {} event(s)", entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::Object(event) => state.recorder.record(&normalize(event)).await,
            other => warn!(
                "Skipping batch entry {}: expected an object, got {}",
                index,
                json_kind(&other)
            ),
        }
    }

    Ok(Json(Ack::OK))
}

fn decode_object(body: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::NotAnObject(json_kind(&other))),
    }
}

/// A missing `batch` key is an empty batch.
fn decode_batch(body: &[u8]) -> Result<Vec<Value>, DecodeError> {
    let mut envelope = decode_object(body)?;
    match envelope.remove("batch") {
        None => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries),
        Some(other) => Err(DecodeError::BatchNotAnArray(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_object_rejects_non_objects() {
        assert!(decode_object(br#"{"event": "x"}"#).is_ok());
        assert!(matches!(
            decode_object(b"[1, 2]"),
            Err(DecodeError::NotAnObject("array"))
        ));
        assert!(matches!(decode_object(b"{not json"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_decode_batch_shapes() {
        assert_eq!(decode_batch(br#"{}"#).unwrap().len(), 0);
        assert_eq!(decode_batch(br#"{"batch": [{}, 3, {}]}"#).unwrap().len(), 3);
        assert!(matches!(
            decode_batch(br#"{"batch": "nope"}"#),
            Err(DecodeError::BatchNotAnArray("string"))
        ));
    }
}
