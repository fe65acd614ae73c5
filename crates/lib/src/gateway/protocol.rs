//! Wire types: handshake response and channel push frames.

use serde::{Deserialize, Serialize};

/// Handshake body echoing the validation code back to the distribution
/// system: `{ "validationResponse": <code> }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub validation_response: String,
}

/// Frame pushed to an agent's channel:
/// `{ "type": "event", "event": <eventType>, "payload": {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushFrame {
    #[serde(rename = "type")]
    pub typ: String,
    pub event: String,
    pub payload: PushPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub caller_number: String,
    pub wait_duration: String,
    pub caller_name: String,
}

impl PushFrame {
    pub fn new(event: &str, caller_number: &str, wait_duration: &str, caller_name: &str) -> Self {
        Self {
            typ: "event".to_string(),
            event: event.to_string(),
            payload: PushPayload {
                caller_number: caller_number.to_string(),
                wait_duration: wait_duration.to_string(),
                caller_name: caller_name.to_string(),
            },
        }
    }
}
