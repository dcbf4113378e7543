use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppError;

/// Identity resolved from a valid access token, available to handlers behind
/// the gate as an `Extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

/// Reject the request with 401 unless it carries a valid access token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)?;
    let (id, email) = state.sessions.authenticate(token).map_err(|err| {
        debug!(error = %err, "bearer token rejected");
        AppError::unauthorized("Invalid or expired token")
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { id, email });
    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Result<&str, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header"))
}
