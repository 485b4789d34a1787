use crate::db::DbPool;
use std::sync::Arc;

use crate::{
    auth::auth_service::AuthService,
    conversation::{
        conversation_repository::ConversationRepository,
        conversation_service::ConversationService,
    },
    message::{message_repository::MessageRepository, message_service::MessageService},
    user::{user_repository::UserRepository, user_service::UserService},
    websocket::ConnectionManager,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub connections: ConnectionManager,
    pub user_repository: UserRepository,
    pub conversation_repository: ConversationRepository,
    pub message_repository: MessageRepository,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub conversation_service: ConversationService,
    pub message_service: MessageService,
}

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            jwt_expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a number"),
        }
    }
}
