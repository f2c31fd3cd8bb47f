//! Event requests and their wire envelope.

use serde_json::{json, Value};

use crate::config::Environment;
use crate::error::ApiError;

/// An event to deliver to a set of subscribers.
///
/// `payload` may be a plain string or any structured JSON value; it is
/// forwarded verbatim. The delivery environment is not part of the request:
/// the client injects its own.
#[derive(Debug, Clone)]
pub struct EventRequest {
    /// Name the subscribers receive the event under
    pub event_name: String,
    /// Event payload, forwarded verbatim
    pub payload: Value,
    /// Subscribers the event is addressed to
    pub subscribers_ids: Vec<String>,
}

impl EventRequest {
    /// Create an event request.
    pub fn new(
        event_name: impl Into<String>,
        payload: impl Into<Value>,
        subscribers_ids: Vec<String>,
    ) -> Self {
        Self { event_name: event_name.into(), payload: payload.into(), subscribers_ids }
    }

    /// Presence checks, enforced before any network activity.
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.event_name.is_empty() {
            return Err(ApiError::missing_parameter("eventName"));
        }
        if payload_missing(&self.payload) {
            return Err(ApiError::missing_parameter("payload"));
        }
        if self.subscribers_ids.is_empty() {
            return Err(ApiError::missing_parameter("subscribersIds"));
        }
        Ok(())
    }

    /// Wire envelope with the client's environment injected.
    ///
    /// Built once per dispatch so the worker and failsafe endpoints receive
    /// byte-identical payloads across every attempt.
    pub(crate) fn envelope(&self, environment: Environment) -> Value {
        json!({
            "eventName": self.event_name,
            "payload": self.payload,
            "subscribersIds": self.subscribers_ids,
            "environment": environment,
        })
    }
}

fn payload_missing(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
