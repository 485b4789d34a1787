use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    auth::auth_dto::{AuthResponse, LoginRequest, RegisterRequest},
    error::Result,
    state::AppState,
};

/// Register a new user and return a signed token
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid input or user already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let token = state
        .auth_service
        .register(
            &payload.name,
            &payload.email,
            &payload.password,
            payload.avatar.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            success: true,
            token,
        }),
    ))
}

/// Log in with email and password and return a signed token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let token = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            success: true,
            token,
        }),
    ))
}
