use crate::{
    auth::{
        auth_dto::{AuthResponse, LoginRequest, RegisterRequest},
        auth_handlers,
    },
    middleware::auth_middleware,
    state::AppState,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::auth_handlers::register,
        crate::auth::auth_handlers::login,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
        )
    ),
    tags(
        (name = "auth", description = "Registration and login, issuing the signed tokens the WebSocket handshake requires")
    )
)]
struct ApiDoc;

async fn health() -> &'static str {
    "Server is running"
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    // Public routes (no auth required)
    let auth_routes = Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login));

    // WebSocket route; the handshake token is checked by the middleware
    // before the upgrade, so unauthenticated connection attempts never
    // reach the socket handler.
    let ws_routes = Router::new()
        .route("/ws", get(crate::websocket::ws_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new().merge(ws_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(health))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
