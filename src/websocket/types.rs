use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    conversation::conversation_dto::NewConversationRequest,
    message::message_dto::{GetMessagesRequest, MessageSender, NewMessageRequest},
    user::user_models::UserProfile,
    user::user_dto::UpdateProfileRequest,
};

/// Uniform response envelope used by every event reply and broadcast.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            msg: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            msg: Some(msg.into()),
        }
    }
}

/// Events a client may send. Frames are JSON objects tagged by `event` with
/// the payload fields inline, e.g.
/// `{"event":"newMessage","conversationId":"...","content":"hi",...}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    NewConversation(NewConversationRequest),
    GetConversations,
    NewMessage(NewMessageRequest),
    GetMessages(GetMessagesRequest),
    UpdateProfile(UpdateProfileRequest),
    GetContacts,
    Ping,
    Pong,
}

/// Events the server sends. Replies reuse the triggering event name.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerEvent {
    NewConversation(Envelope<ConversationPayload>),
    GetConversations(Envelope<Vec<ConversationPayload>>),
    NewMessage(Envelope<MessagePayload>),
    GetMessages(Envelope<Vec<MessagePayload>>),
    UpdateProfile(Envelope<TokenPayload>),
    GetContacts(Envelope<Vec<UserProfile>>),
    Ping,
    Pong,
}

/// Failure envelope on the given event name, for malformed payloads where
/// only the tag could be recovered. Unknown names yield `None` and the frame
/// is dropped.
pub fn failure(event: &str, msg: String) -> Option<ServerEvent> {
    match event {
        "newConversation" => Some(ServerEvent::NewConversation(Envelope::error(msg))),
        "getConversations" => Some(ServerEvent::GetConversations(Envelope::error(msg))),
        "newMessage" => Some(ServerEvent::NewMessage(Envelope::error(msg))),
        "getMessages" => Some(ServerEvent::GetMessages(Envelope::error(msg))),
        "updateProfile" => Some(ServerEvent::UpdateProfile(Envelope::error(msg))),
        "getContacts" => Some(ServerEvent::GetContacts(Envelope::error(msg))),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPayload {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub participants: Vec<UserProfile>,
    pub name: String,
    pub avatar: String,
    pub created_by: Uuid,
    pub last_message: Option<LastMessageSummary>,
    /// Present only on `newConversation` replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessageSummary {
    pub id: Uuid,
    pub content: String,
    pub sender_id: Uuid,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub content: String,
    pub sender: MessageSender,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPayload {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_new_conversation_event() {
        let frame = json!({
            "event": "newConversation",
            "type": "direct",
            "participants": [Uuid::new_v4(), Uuid::new_v4()],
        })
        .to_string();

        match serde_json::from_str::<ClientEvent>(&frame).unwrap() {
            ClientEvent::NewConversation(req) => {
                assert_eq!(req.kind, "direct");
                assert_eq!(req.participants.len(), 2);
                assert!(req.name.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn parses_new_message_event() {
        let conversation_id = Uuid::new_v4();
        let sender_id = Uuid::new_v4();
        let frame = json!({
            "event": "newMessage",
            "conversationId": conversation_id,
            "sender": {"id": sender_id, "name": "Ada", "avatar": ""},
            "content": "hi",
        })
        .to_string();

        match serde_json::from_str::<ClientEvent>(&frame).unwrap() {
            ClientEvent::NewMessage(req) => {
                assert_eq!(req.conversation_id, conversation_id);
                assert_eq!(req.sender.id, sender_id);
                assert_eq!(req.content, "hi");
                assert!(req.attachment.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn parses_payloadless_events() {
        assert!(matches!(
            serde_json::from_str::<ClientEvent>(r#"{"event":"getConversations"}"#).unwrap(),
            ClientEvent::GetConversations
        ));
        assert!(matches!(
            serde_json::from_str::<ClientEvent>(r#"{"event":"getContacts"}"#).unwrap(),
            ClientEvent::GetContacts
        ));
        assert!(matches!(
            serde_json::from_str::<ClientEvent>(r#"{"event":"ping"}"#).unwrap(),
            ClientEvent::Ping
        ));
    }

    #[test]
    fn rejects_unknown_event() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"selfDestruct"}"#).is_err());
    }

    #[test]
    fn server_event_carries_tag_and_envelope_inline() {
        let event = ServerEvent::UpdateProfile(Envelope::ok(TokenPayload {
            token: "abc".to_string(),
        }));

        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "updateProfile");
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["token"], "abc");
        assert!(value.get("msg").is_none());
    }

    #[test]
    fn failure_envelope_keeps_event_name_and_drops_data() {
        let event = failure("newMessage", "Failed to send new message".to_string()).unwrap();

        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "newMessage");
        assert_eq!(value["success"], false);
        assert_eq!(value["msg"], "Failed to send new message");
        assert!(value.get("data").is_none());

        assert!(failure("selfDestruct", "nope".to_string()).is_none());
    }
}
