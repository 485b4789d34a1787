use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable once created; there is no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Flat row for the message history query, sender profile joined in.
#[derive(Debug, Clone, FromRow)]
pub struct MessageWithSender {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub content: String,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_avatar: String,
}
