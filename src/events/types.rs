//! Wire Event Types

use serde::{Deserialize, Serialize};

use crate::presence::ConnectionId;

/// Events received from clients over the real-time channel.
///
/// Payload fields default to empty strings when missing; a half-formed
/// identify or chat frame is stored/forwarded as-is rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "identify")]
    Identify(IdentifyPayload),
    #[serde(rename = "chat-message")]
    Chat(ChatPayload),
}

/// Payload of the inbound `identify` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifyPayload {
    #[serde(default, rename = "displayName")]
    pub display_name: String,
    #[serde(default, rename = "avatarURL")]
    pub avatar_url: String,
}

/// Payload of the inbound `chat-message` event.
///
/// The display name here is whatever the sender put on the message. It is
/// deliberately not cross-checked against the registry's stored identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    #[serde(default, rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub body: String,
}

/// Events broadcast to every connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Full presence snapshot, sent on every membership change.
    #[serde(rename = "active-users")]
    ActiveUsers(Vec<ActiveUser>),
    /// A relayed chat message.
    #[serde(rename = "chat-message")]
    Chat(ChatBroadcast),
}

/// One entry of the `active-users` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUser {
    pub id: ConnectionId,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

/// Outbound `chat-message` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatBroadcast {
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub body: String,
    #[serde(rename = "sentAtEpochMillis")]
    pub sent_at_epoch_millis: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_event_parses() {
        let json = r#"{"event":"identify","data":{"displayName":"Ana","avatarURL":"/a.png"}}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::Identify(IdentifyPayload {
                display_name: "Ana".to_string(),
                avatar_url: "/a.png".to_string(),
            })
        );
    }

    #[test]
    fn missing_payload_fields_default_to_empty() {
        let json = r#"{"event":"identify","data":{}}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, ClientEvent::Identify(IdentifyPayload::default()));

        let json = r#"{"event":"chat-message","data":{"body":"hi"}}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        match event {
            ClientEvent::Chat(payload) => {
                assert_eq!(payload.display_name, "");
                assert_eq!(payload.body, "hi");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn unknown_event_name_is_an_error() {
        let json = r#"{"event":"shutdown-server","data":{}}"#;
        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }

    #[test]
    fn server_events_use_wire_field_names() {
        let snapshot = ServerEvent::ActiveUsers(vec![ActiveUser {
            id: "c1".to_string(),
            display_name: "Ana".to_string(),
            avatar_url: "/a.png".to_string(),
        }]);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""event":"active-users""#));
        assert!(json.contains(r#""displayName":"Ana""#));
        assert!(json.contains(r#""avatarURL":"/a.png""#));

        let chat = ServerEvent::Chat(ChatBroadcast {
            display_name: "Ana".to_string(),
            body: "Oi".to_string(),
            sent_at_epoch_millis: 1_700_000_000_000,
        });
        let json = serde_json::to_string(&chat).unwrap();
        assert!(json.contains(r#""sentAtEpochMillis":1700000000000"#));
    }
}
