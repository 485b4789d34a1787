mod auth;
mod conversation;
mod db;
mod error;
mod message;
mod middleware;
mod routes;
mod state;
mod user;
mod websocket;

use db::{create_pool, run_migrations};
use routes::create_router;
use state::{AppState, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chatline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());

    // Create database connection pool
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is not set"))?;

    tracing::info!("Connecting to database...");
    let db = create_pool(&database_url).await?;

    // Run migrations
    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    // Create WebSocket connection manager (session registry + room tables)
    let connections = websocket::ConnectionManager::new();

    // Create repositories
    let user_repository = user::user_repository::UserRepository::new(db.clone());
    let conversation_repository =
        conversation::conversation_repository::ConversationRepository::new(db.clone());
    let message_repository = message::message_repository::MessageRepository::new(db.clone());

    // Create services
    let auth_service = auth::auth_service::AuthService::new(
        user_repository.clone(),
        config.jwt_secret.clone(),
        config.jwt_expiration_hours,
    );
    let user_service = user::user_service::UserService::new(
        user_repository.clone(),
        config.jwt_secret.clone(),
        config.jwt_expiration_hours,
    );
    let conversation_service = conversation::conversation_service::ConversationService::new(
        conversation_repository.clone(),
        message_repository.clone(),
        connections.clone(),
    );
    let message_service = message::message_service::MessageService::new(
        message_repository.clone(),
        conversation_repository.clone(),
        connections.clone(),
    );

    // Create application state
    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        connections,
        user_repository,
        conversation_repository,
        message_repository,
        auth_service,
        user_service,
        conversation_service,
        message_service,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
