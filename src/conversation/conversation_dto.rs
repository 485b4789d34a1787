use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct NewConversationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[validate(length(min = 1))]
    pub participants: Vec<Uuid>,
    pub name: Option<String>,
    pub avatar: Option<String>,
}
