//! Interrupt requests raised by a paused agent run

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pending suspension point inside one agent turn.
///
/// The payload is kept as raw JSON; [`Interrupt::kind`] classifies it. A
/// payload that is not an object, or that sets neither discriminator, is
/// [`InterruptKind::Malformed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interrupt {
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Authorization details attached to an authorization interrupt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    /// Authorization-request identifier to wait on
    pub id: String,
    /// Where the user approves access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// The well-known fields of an interrupt payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct InterruptPayload {
    authorization_required: Option<bool>,
    hitl_required: Option<bool>,
    tool_name: Option<String>,
    authorization_response: Option<AuthorizationResponse>,
    input: Option<Value>,
}

/// What an interrupt asks for
#[derive(Debug, Clone, PartialEq)]
pub enum InterruptKind {
    /// The tool needs out-of-band authorization before it can run
    Authorization {
        tool_name: String,
        authorization: AuthorizationResponse,
    },
    /// A human must approve the proposed tool call
    HumanApproval { tool_name: String, input: Value },
    /// Neither discriminator is set, or required details are missing
    Malformed,
}

impl Interrupt {
    /// Wrap a raw interrupt payload
    pub fn new(value: Value) -> Self {
        Self { value, id: None }
    }

    /// Build an authorization interrupt
    pub fn authorization(
        tool_name: impl Into<String>,
        authorization_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::new(serde_json::json!({
            "authorization_required": true,
            "tool_name": tool_name.into(),
            "authorization_response": {
                "id": authorization_id.into(),
                "url": url.into(),
                "status": "pending",
            },
        }))
    }

    /// Build a human-approval interrupt
    pub fn approval(tool_name: impl Into<String>, input: Value) -> Self {
        Self::new(serde_json::json!({
            "hitl_required": true,
            "tool_name": tool_name.into(),
            "input": input,
        }))
    }

    /// Set the interrupt id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Classify the payload. Authorization takes precedence when both
    /// discriminators are set.
    pub fn kind(&self) -> InterruptKind {
        let payload: InterruptPayload = match serde_json::from_value(self.value.clone()) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("Interrupt payload is not a request object: {}", e);
                return InterruptKind::Malformed;
            }
        };
        let tool_name = payload.tool_name.unwrap_or_default();

        if payload.authorization_required.unwrap_or(false) {
            return match payload.authorization_response {
                Some(authorization) => InterruptKind::Authorization {
                    tool_name,
                    authorization,
                },
                None => InterruptKind::Malformed,
            };
        }

        if payload.hitl_required.unwrap_or(false) {
            return InterruptKind::HumanApproval {
                tool_name,
                input: payload.input.unwrap_or(Value::Null),
            };
        }

        InterruptKind::Malformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_authorization_kind() {
        let interrupt = Interrupt::authorization(
            "GoogleCalendar_CreateEvent",
            "auth-123",
            "https://accounts.example.com/o/oauth2",
        );
        match interrupt.kind() {
            InterruptKind::Authorization {
                tool_name,
                authorization,
            } => {
                assert_eq!(tool_name, "GoogleCalendar_CreateEvent");
                assert_eq!(authorization.id, "auth-123");
                assert_eq!(
                    authorization.url.as_deref(),
                    Some("https://accounts.example.com/o/oauth2")
                );
            }
            other => panic!("expected Authorization, got {:?}", other),
        }
    }

    #[test]
    fn test_approval_kind() {
        let interrupt = Interrupt::approval("GoogleCalendar_DeleteEvent", json!({"event_id": "e1"}));
        assert_eq!(
            interrupt.kind(),
            InterruptKind::HumanApproval {
                tool_name: "GoogleCalendar_DeleteEvent".into(),
                input: json!({"event_id": "e1"}),
            }
        );
    }

    #[test]
    fn test_neither_discriminator_is_malformed() {
        let interrupt = Interrupt::new(json!({"tool_name": "x"}));
        assert_eq!(interrupt.kind(), InterruptKind::Malformed);

        let interrupt = Interrupt::new(json!({
            "authorization_required": false,
            "hitl_required": false,
        }));
        assert_eq!(interrupt.kind(), InterruptKind::Malformed);
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        assert_eq!(Interrupt::new(json!("confirm?")).kind(), InterruptKind::Malformed);
        assert_eq!(Interrupt::new(Value::Null).kind(), InterruptKind::Malformed);
    }

    #[test]
    fn test_null_discriminators_are_false() {
        let interrupt = Interrupt::new(json!({
            "authorization_required": null,
            "hitl_required": true,
            "tool_name": "t",
        }));
        assert!(matches!(interrupt.kind(), InterruptKind::HumanApproval { .. }));
    }

    #[test]
    fn test_authorization_without_response_is_malformed() {
        let interrupt = Interrupt::new(json!({
            "authorization_required": true,
            "tool_name": "GoogleCalendar_ListEvents",
        }));
        assert_eq!(interrupt.kind(), InterruptKind::Malformed);
    }

    #[test]
    fn test_authorization_wins_over_approval() {
        let interrupt = Interrupt::new(json!({
            "authorization_required": true,
            "hitl_required": true,
            "tool_name": "t",
            "authorization_response": {"id": "a1"},
        }));
        assert!(matches!(interrupt.kind(), InterruptKind::Authorization { .. }));
    }

    #[test]
    fn test_deserialize_wire_interrupt() {
        let interrupt: Interrupt = serde_json::from_value(json!({
            "value": {"hitl_required": true, "tool_name": "t", "input": {"a": 1}},
            "id": "5d2f"
        }))
        .unwrap();
        assert_eq!(interrupt.id.as_deref(), Some("5d2f"));
        assert!(matches!(interrupt.kind(), InterruptKind::HumanApproval { .. }));
    }
}
