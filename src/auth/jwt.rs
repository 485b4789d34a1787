use crate::error::{AppError, Result};
use crate::user::user_models::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carry the full identity projection, not just the user id. The
/// WebSocket handshake attaches this projection to the session without a
/// database round-trip, and `updateProfile` re-mints a token from the
/// updated row.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub exp: i64,
}

/// Authenticated identity attached to a session for its whole lifetime.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl Identity {
    pub fn from_claims(claims: Claims) -> Result<Self> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        Ok(Self {
            id,
            name: claims.name,
            email: claims.email,
            avatar: claims.avatar,
        })
    }
}

pub fn create_jwt(user: &User, secret: &str, expiration_hours: i64) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(expiration_hours))
        .ok_or(AppError::InternalError)?
        .timestamp();

    let claims = Claims {
        sub: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        avatar: user.avatar.clone(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AppError::Authentication("Failed to create token".to_string()))
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            avatar: "".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn round_trip_preserves_identity_projection() {
        let user = sample_user();
        let token = create_jwt(&user, "secret", 1).unwrap();

        let claims = verify_jwt(&token, "secret").unwrap();
        let identity = Identity::from_claims(claims).unwrap();

        assert_eq!(identity.id, user.id);
        assert_eq!(identity.name, user.name);
        assert_eq!(identity.email, user.email);
        assert_eq!(identity.avatar, user.avatar);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = create_jwt(&sample_user(), "secret", 1).unwrap();
        assert!(verify_jwt(&token, "other-secret").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let user = sample_user();
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(verify_jwt(&token, "secret").is_err());
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(verify_jwt("not-a-token", "secret").is_err());
    }
}
