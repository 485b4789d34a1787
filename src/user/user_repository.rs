use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::user_models::{User, UserProfile};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        avatar: &str,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, avatar)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(avatar)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users
             SET name = COALESCE($1, name),
                 avatar = COALESCE($2, avatar),
                 updated_at = NOW()
             WHERE id = $3
             RETURNING *",
        )
        .bind(name)
        .bind(avatar)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Everyone except the requesting user, projected down to contact fields.
    pub async fn find_contacts(&self, user_id: Uuid) -> Result<Vec<UserProfile>> {
        let contacts = sqlx::query_as::<_, UserProfile>(
            "SELECT id, name, email, avatar FROM users
             WHERE id != $1
             ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }
}
