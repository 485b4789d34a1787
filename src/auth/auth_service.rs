use crate::auth::{create_jwt, hash_password, verify_password};
use crate::error::{AppError, Result};
use crate::user::user_repository::UserRepository;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    jwt_expiration_hours: i64,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, jwt_expiration_hours: i64) -> Self {
        Self {
            user_repo,
            jwt_secret,
            jwt_expiration_hours,
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        avatar: Option<&str>,
    ) -> Result<String> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::BadRequest("User already exists".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_repo
            .create(name, email, &password_hash, avatar.unwrap_or(""))
            .await?;

        create_jwt(&user, &self.jwt_secret, self.jwt_expiration_hours)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        verify_password(password, &user.password_hash)?;

        create_jwt(&user, &self.jwt_secret, self.jwt_expiration_hours)
    }
}
