use crate::{
    error::Result,
    message::message_models::{Message, MessageWithSender},
};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
        attachment: Option<&str>,
    ) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (conversation_id, sender_id, content, attachment)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .bind(attachment)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn find_by_id(&self, message_id: Uuid) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    /// Full history for a conversation, newest first, sender profile joined.
    pub async fn find_for_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<MessageWithSender>> {
        let messages = sqlx::query_as::<_, MessageWithSender>(
            "SELECT m.id, m.conversation_id, m.content, m.attachment, m.created_at,
                    u.id AS sender_id, u.name AS sender_name, u.avatar AS sender_avatar
             FROM messages m
             INNER JOIN users u ON u.id = m.sender_id
             WHERE m.conversation_id = $1
             ORDER BY m.created_at DESC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
