use crate::{
    auth::{verify_jwt, Identity},
    error::AppError,
    state::AppState,
};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};

/// Handshake gate: verifies the signed token and attaches the decoded
/// identity to the request. Runs before the WebSocket upgrade, so a missing
/// or invalid token refuses the connection before any session state exists.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = if let Some(auth_header) = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized("Invalid credentials".to_string()))?
    } else {
        // Browser WebSocket clients cannot set headers; accept the token as
        // a query parameter on the upgrade request instead.
        let query = req.uri().query().unwrap_or("");
        let token_param = query
            .split('&')
            .find(|p| p.starts_with("token="))
            .map(|p| &p[6..]);

        token_param.ok_or(AppError::Unauthorized("No token provided".to_string()))?
    };

    let claims = verify_jwt(token, &state.config.jwt_secret)?;
    let identity = Identity::from_claims(claims)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Extractor for the identity placed in request extensions by `auth_middleware`.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized("Invalid credentials".to_string()))
    }
}
