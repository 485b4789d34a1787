use crate::{
    auth::create_jwt,
    error::{AppError, Result},
    user::{user_models::UserProfile, user_repository::UserRepository},
};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
    jwt_secret: String,
    jwt_expiration_hours: i64,
}

impl UserService {
    pub fn new(
        user_repository: UserRepository,
        jwt_secret: String,
        jwt_expiration_hours: i64,
    ) -> Self {
        Self {
            user_repository,
            jwt_secret,
            jwt_expiration_hours,
        }
    }

    /// Partial profile update. Returns a freshly minted token carrying the
    /// updated claims; the client swaps it in and reconnects with it later.
    /// The identity already attached to live sessions is left as it was at
    /// handshake time.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<String> {
        let user = self
            .user_repository
            .update_profile(user_id, name, avatar)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        create_jwt(&user, &self.jwt_secret, self.jwt_expiration_hours)
    }

    pub async fn contacts(&self, user_id: Uuid) -> Result<Vec<UserProfile>> {
        self.user_repository.find_contacts(user_id).await
    }
}
