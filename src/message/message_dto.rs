use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Sender display fields as supplied by the sending client. Broadcasts echo
/// these verbatim instead of re-fetching the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSender {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageRequest {
    pub conversation_id: Uuid,
    pub sender: MessageSender,
    #[validate(length(min = 1))]
    pub content: String,
    pub attachment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMessagesRequest {
    pub conversation_id: Uuid,
}
