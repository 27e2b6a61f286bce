//! JSON messages exchanged over the lobby WebSocket.
//!
//! Every frame is a single object with a `type` discriminator. Decoding goes
//! through one validating step that tells unknown types apart from known
//! types with a bad shape, so callers can log them differently.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "playerJoined")]
    PlayerJoined {
        #[serde(rename = "playerName")]
        player_name: String,
    },
    #[serde(rename = "timer")]
    Timer { level: u32 },
    #[serde(rename = "timerEnd")]
    TimerEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "usersUpdate")]
    UsersUpdate {
        #[serde(deserialize_with = "null_as_empty")]
        users: Vec<String>,
    },
    #[serde(rename = "timer")]
    Timer { level: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    InvalidJson(String),
    MissingType,
    UnknownType(String),
    Malformed { message_type: String, reason: String },
    Encode(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidJson(reason) => write!(f, "invalid JSON: {}", reason),
            ProtocolError::MissingType => write!(f, "message has no string `type` field"),
            ProtocolError::UnknownType(t) => write!(f, "unknown message type `{}`", t),
            ProtocolError::Malformed { message_type, reason } => {
                write!(f, "malformed `{}` message: {}", message_type, reason)
            }
            ProtocolError::Encode(reason) => write!(f, "failed to encode message: {}", reason),
        }
    }
}

impl std::error::Error for ProtocolError {}

const CLIENT_TYPES: &[&str] = &["playerJoined", "timer", "timerEnd"];
const SERVER_TYPES: &[&str] = &["usersUpdate", "timer"];

impl ClientMessage {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        decode_tagged(text, CLIENT_TYPES)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

impl ServerMessage {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        decode_tagged(text, SERVER_TYPES)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

fn decode_tagged<T: DeserializeOwned>(text: &str, known: &[&str]) -> Result<T, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

    let message_type = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?
        .to_string();

    if !known.contains(&message_type.as_str()) {
        return Err(ProtocolError::UnknownType(message_type));
    }

    serde_json::from_value(value).map_err(|e| ProtocolError::Malformed {
        message_type,
        reason: e.to_string(),
    })
}

// The reference server marshals an empty roster as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_joined_wire_format() {
        let msg = ClientMessage::PlayerJoined { player_name: "Alice".to_string() };
        let json: Value = serde_json::from_str(&msg.encode().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"type": "playerJoined", "playerName": "Alice"}));
    }

    #[test]
    fn test_timer_end_has_only_type() {
        let json: Value = serde_json::from_str(&ClientMessage::TimerEnd.encode().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"type": "timerEnd"}));
    }

    #[test]
    fn test_decode_users_update() {
        let msg = ServerMessage::decode(r#"{"type":"usersUpdate","users":["A","B"]}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::UsersUpdate { users: vec!["A".to_string(), "B".to_string()] }
        );
    }

    #[test]
    fn test_decode_null_users_as_empty_roster() {
        let msg = ServerMessage::decode(r#"{"type":"usersUpdate","users":null}"#).unwrap();
        assert_eq!(msg, ServerMessage::UsersUpdate { users: vec![] });
    }

    #[test]
    fn test_decode_server_timer() {
        let msg = ServerMessage::decode(r#"{"type":"timer","level":12}"#).unwrap();
        assert_eq!(msg, ServerMessage::Timer { level: 12 });
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let err = ServerMessage::decode(r#"{"type":"chat","text":"hi"}"#).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownType("chat".to_string()));
    }

    #[test]
    fn test_client_only_type_is_unknown_to_server_decoder() {
        let err = ServerMessage::decode(r#"{"type":"timerEnd"}"#).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownType("timerEnd".to_string()));
    }

    #[test]
    fn test_known_type_with_bad_shape_is_malformed() {
        let err = ServerMessage::decode(r#"{"type":"timer","level":"soon"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed { ref message_type, .. } if message_type == "timer"));
    }

    #[test]
    fn test_missing_type_and_invalid_json() {
        assert_eq!(ClientMessage::decode(r#"{"level":3}"#).unwrap_err(), ProtocolError::MissingType);
        assert!(matches!(
            ClientMessage::decode("not json").unwrap_err(),
            ProtocolError::InvalidJson(_)
        ));
    }

    #[test]
    fn test_decode_client_timer_from_browser() {
        let msg = ClientMessage::decode(r#"{"type":"timer","level":7}"#).unwrap();
        assert_eq!(msg, ClientMessage::Timer { level: 7 });
    }
}
