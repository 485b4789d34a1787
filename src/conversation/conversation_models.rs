use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A broadcast scope: `direct` (exactly two participants, unique per pair)
/// or `group`. The participant set lives in `conversation_participants`;
/// messages are queried on demand, never held on the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub avatar: String,
    pub created_by: Uuid,
    pub last_message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
