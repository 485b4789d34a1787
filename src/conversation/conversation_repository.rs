use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::conversation_models::Conversation;
use crate::user::user_models::UserProfile;

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the conversation and its participant rows in one transaction.
    pub async fn create(
        &self,
        kind: &str,
        name: &str,
        avatar: &str,
        created_by: Uuid,
        participants: &[Uuid],
    ) -> Result<Conversation> {
        let mut tx = self.pool.begin().await?;

        let conversation = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (kind, name, avatar, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(kind)
        .bind(name)
        .bind(avatar)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in participants {
            sqlx::query(
                "INSERT INTO conversation_participants (conversation_id, user_id)
                 VALUES ($1, $2)",
            )
            .bind(conversation.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(conversation)
    }

    pub async fn find_by_id(&self, conversation_id: Uuid) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE id = $1",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    /// Direct-pair lookup. Callers pass the canonical (sorted) pair; since a
    /// direct conversation has exactly two participants, two membership joins
    /// pin it down.
    pub async fn find_direct_between(&self, a: Uuid, b: Uuid) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT c.* FROM conversations c
             INNER JOIN conversation_participants pa
                ON pa.conversation_id = c.id AND pa.user_id = $1
             INNER JOIN conversation_participants pb
                ON pb.conversation_id = c.id AND pb.user_id = $2
             WHERE c.kind = 'direct'",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    pub async fn find_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT c.* FROM conversations c
             INNER JOIN conversation_participants cp ON cp.conversation_id = c.id
             WHERE cp.user_id = $1
             ORDER BY c.updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    /// Conversation ids only, for the connect-time room join.
    pub async fn find_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT conversation_id FROM conversation_participants WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    pub async fn participants_of(&self, conversation_id: Uuid) -> Result<Vec<UserProfile>> {
        let participants = sqlx::query_as::<_, UserProfile>(
            "SELECT u.id, u.name, u.email, u.avatar FROM users u
             INNER JOIN conversation_participants cp ON cp.user_id = u.id
             WHERE cp.conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    pub async fn set_last_message(&self, conversation_id: Uuid, message_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE conversations
             SET last_message_id = $1, updated_at = NOW()
             WHERE id = $2",
        )
        .bind(message_id)
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
