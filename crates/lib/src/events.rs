//! Inbound event envelopes and classification.
//!
//! The distribution system POSTs a JSON array of envelopes. Only `eventType`
//! and `data` drive behavior; the other fields are carried for log context.
//! System events (subscription lifecycle) live in their own eventType
//! namespace and are handled before any domain routing.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// eventType namespace of distribution-system events.
pub const SYSTEM_EVENT_PREFIX: &str = "Microsoft.EventGrid.";

/// One-time handshake the distribution system requires when a new webhook
/// target is registered.
pub const EVENT_SUBSCRIPTION_VALIDATION: &str =
    "Microsoft.EventGrid.SubscriptionValidationEvent";

/// Domain event: an agent answered an inbound call.
pub const EVENT_CALL_ANSWERED: &str = "Demo.Telephony.CallAnswered";

/// One delivery envelope as posted to the webhook sink.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    pub event_type: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Payload of [`EVENT_SUBSCRIPTION_VALIDATION`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionValidationData {
    pub validation_code: String,
}

/// Payload of [`EVENT_CALL_ANSWERED`]. Aliases accept the PascalCase field
/// names some producers emit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAnsweredData {
    #[serde(alias = "AgentLogin")]
    pub agent_login: String,
    #[serde(alias = "CallerNumber")]
    pub caller_number: String,
    #[serde(alias = "WaitDuration")]
    pub wait_duration: String,
}

/// Malformed `data` for a recognized event type. Terminal for the request;
/// the distribution system's retry is the only recovery path.
#[derive(Debug, Error)]
#[error("malformed {event_type} payload: {source}")]
pub struct DecodeError {
    pub event_type: String,
    #[source]
    pub source: serde_json::Error,
}

/// Routing outcome for one envelope.
#[derive(Debug, Clone)]
pub enum Classified {
    /// Answer the handshake with the echoed code; never dispatched.
    SubscriptionValidation(SubscriptionValidationData),
    /// Hand to the dispatcher for targeted delivery.
    CallAnswered(CallAnsweredData),
    /// System event this relay does not handle.
    UnknownSystem,
    /// Domain event this relay does not handle.
    UnknownDomain,
}

/// Classify one envelope by eventType. Decoding only happens for recognized
/// types; unknown types are reported without touching `data`.
pub fn classify(envelope: &EventEnvelope) -> Result<Classified, DecodeError> {
    if envelope.event_type.starts_with(SYSTEM_EVENT_PREFIX) {
        if envelope.event_type == EVENT_SUBSCRIPTION_VALIDATION {
            Ok(Classified::SubscriptionValidation(decode(envelope)?))
        } else {
            Ok(Classified::UnknownSystem)
        }
    } else if envelope.event_type == EVENT_CALL_ANSWERED {
        Ok(Classified::CallAnswered(decode(envelope)?))
    } else {
        Ok(Classified::UnknownDomain)
    }
}

fn decode<T: DeserializeOwned>(envelope: &EventEnvelope) -> Result<T, DecodeError> {
    serde_json::from_value(envelope.data.clone()).map_err(|e| DecodeError {
        event_type: envelope.event_type.clone(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(event_type: &str, data: serde_json::Value) -> EventEnvelope {
        EventEnvelope {
            id: Some("1".to_string()),
            event_type: event_type.to_string(),
            subject: None,
            data,
        }
    }

    #[test]
    fn classifies_subscription_validation() {
        let env = envelope(
            EVENT_SUBSCRIPTION_VALIDATION,
            serde_json::json!({ "validationCode": "abc123" }),
        );
        match classify(&env).expect("classify") {
            Classified::SubscriptionValidation(data) => {
                assert_eq!(data.validation_code, "abc123");
            }
            other => panic!("expected SubscriptionValidation, got {:?}", other),
        }
    }

    #[test]
    fn classifies_call_answered_camel_case() {
        let env = envelope(
            EVENT_CALL_ANSWERED,
            serde_json::json!({
                "agentLogin": "agent1",
                "callerNumber": "+15550100",
                "waitDuration": "00:00:42"
            }),
        );
        match classify(&env).expect("classify") {
            Classified::CallAnswered(data) => {
                assert_eq!(data.agent_login, "agent1");
                assert_eq!(data.caller_number, "+15550100");
                assert_eq!(data.wait_duration, "00:00:42");
            }
            other => panic!("expected CallAnswered, got {:?}", other),
        }
    }

    #[test]
    fn classifies_call_answered_pascal_case_aliases() {
        let env = envelope(
            EVENT_CALL_ANSWERED,
            serde_json::json!({
                "AgentLogin": "agent1",
                "CallerNumber": "+15550100",
                "WaitDuration": "00:00:42"
            }),
        );
        assert!(matches!(
            classify(&env).expect("classify"),
            Classified::CallAnswered(_)
        ));
    }

    #[test]
    fn unknown_system_event_is_not_decoded() {
        let env = envelope(
            "Microsoft.EventGrid.SubscriptionDeletedEvent",
            serde_json::json!("not even an object"),
        );
        assert!(matches!(
            classify(&env).expect("classify"),
            Classified::UnknownSystem
        ));
    }

    #[test]
    fn unknown_domain_event_is_not_decoded() {
        let env = envelope("Demo.Telephony.CallEnded", serde_json::json!(null));
        assert!(matches!(
            classify(&env).expect("classify"),
            Classified::UnknownDomain
        ));
    }

    #[test]
    fn malformed_payload_for_known_type_is_a_decode_error() {
        let env = envelope(
            EVENT_CALL_ANSWERED,
            serde_json::json!({ "agentLogin": "agent1" }),
        );
        let err = classify(&env).expect_err("missing fields must not classify");
        assert_eq!(err.event_type, EVENT_CALL_ANSWERED);
    }
}
