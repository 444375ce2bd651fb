use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ================================================================================================
// DIAGNOSTICS
// ================================================================================================

/// A data line whose payload was not valid JSON. The event is dropped and the
/// stream keeps going.
#[derive(Debug)]
pub struct MalformedEventPayload {
    pub payload: String,
    pub error: serde_json::Error,
}

impl fmt::Display for MalformedEventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed event payload {:?}: {}", self.payload, self.error)
    }
}

// ================================================================================================
// AGENT ENVELOPE
// ================================================================================================

/// Typed view of the agent's `{"type": ..., "content": ...}` event envelope.
///
/// Unknown fields land in `extra` so nothing the agent sends is lost.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AgentEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl AgentEvent {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The relay reports upstream failures in-band as `type: "error"`.
    pub fn is_error(&self) -> bool {
        self.kind == "error"
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(|c| c.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_envelope() {
        let value = serde_json::json!({ "type": "error", "content": "Agent error" });
        let event = AgentEvent::from_value(value).unwrap();
        assert!(event.is_error());
        assert_eq!(event.text(), Some("Agent error"));
        assert!(event.extra.is_empty());
    }

    #[test]
    fn test_agent_envelope_keeps_extra_fields() {
        let value = serde_json::json!({ "type": "token", "content": "Hi", "session_id": "s1" });
        let event = AgentEvent::from_value(value).unwrap();
        assert!(!event.is_error());
        assert_eq!(event.extra["session_id"], "s1");
    }

    #[test]
    fn test_agent_envelope_requires_type() {
        let value = serde_json::json!({ "content": "orphan" });
        assert!(AgentEvent::from_value(value).is_err());
    }

    #[test]
    fn test_malformed_display() {
        let error = serde_json::from_str::<Value>("nope").unwrap_err();
        let diag = MalformedEventPayload {
            payload: "nope".into(),
            error,
        };
        assert!(diag.to_string().starts_with("malformed event payload \"nope\""));
    }
}
