//! WebSocket Message Types
//!
//! Gateway frame formats. Every frame is `{op, d, s, t}`; events in either
//! direction use the Dispatch opcode with `t` naming the event.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::application::dto::UserResponse;
use crate::domain::ChatEvent;
use crate::shared::error::AppError;

/// Gateway opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Event dispatch (both directions)
    Dispatch = 0,
    /// Heartbeat
    Heartbeat = 1,
    /// Identify
    Identify = 2,
    /// Invalid session
    InvalidSession = 9,
    /// Hello
    Hello = 10,
    /// Heartbeat ACK
    HeartbeatAck = 11,
}

impl OpCode {
    pub fn from_u8(op: u8) -> Option<Self> {
        match op {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Identify),
            9 => Some(Self::InvalidSession),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }
}

/// Incoming gateway message
#[derive(Debug, Deserialize)]
pub struct GatewayReceive {
    pub op: u8,
    #[serde(default)]
    pub d: Option<Value>,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

/// Outgoing gateway message
#[derive(Debug, Clone, Serialize)]
pub struct GatewaySend {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewaySend {
    fn op(op: OpCode, d: Option<Value>) -> Self {
        Self {
            op: op as u8,
            d,
            s: None,
            t: None,
        }
    }

    pub fn hello(heartbeat_interval: u64) -> Self {
        Self::op(OpCode::Hello, serde_json::to_value(HelloPayload { heartbeat_interval }).ok())
    }

    pub fn heartbeat_ack() -> Self {
        Self::op(OpCode::HeartbeatAck, None)
    }

    pub fn invalid_session() -> Self {
        Self::op(OpCode::InvalidSession, Some(json!(false)))
    }

    /// A named dispatch with its sequence number
    pub fn dispatch(name: &str, data: Value, sequence: u64) -> Self {
        Self {
            op: OpCode::Dispatch as u8,
            d: Some(data),
            s: Some(sequence),
            t: Some(name.to_string()),
        }
    }

    pub fn event(event: &ChatEvent, sequence: u64) -> Self {
        Self::dispatch(event.event_name(), event.to_json(), sequence)
    }

    /// Error reply to a client event, sent only to the originating session
    pub fn error(event: &str, error: &AppError, sequence: u64) -> Self {
        let (_, code) = error.status();
        Self::dispatch(
            "error",
            json!({
                "event": event,
                "code": code,
                "message": error.public_message(),
            }),
            sequence,
        )
    }
}

/// Hello payload (op 10)
#[derive(Debug, Serialize)]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
}

/// Ready payload (dispatch `ready`)
#[derive(Debug, Serialize)]
pub struct ReadyPayload {
    pub user: UserResponse,
    pub session_id: String,
    pub unread_mentions: u64,
}

/// Identify payload (op 2)
#[derive(Debug, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserJoinedEvent;

    #[test]
    fn test_event_frame_shape() {
        let event = ChatEvent::UserJoined(UserJoinedEvent { channel_id: 7 });

        let frame = serde_json::to_value(GatewaySend::event(&event, 3)).unwrap();

        assert_eq!(frame, json!({"op": 0, "t": "user_joined", "s": 3, "d": {"channel_id": "7"}}));
    }

    #[test]
    fn test_heartbeat_ack_has_no_payload() {
        let frame = serde_json::to_value(GatewaySend::heartbeat_ack()).unwrap();
        assert_eq!(frame, json!({"op": 11}));
    }

    #[test]
    fn test_receive_without_payload() {
        let frame: GatewayReceive = serde_json::from_str(r#"{"op": 1}"#).unwrap();
        assert_eq!(OpCode::from_u8(frame.op), Some(OpCode::Heartbeat));
        assert!(frame.d.is_none());
    }
}
