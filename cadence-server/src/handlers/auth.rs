use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use cadence_core::auth::ACCESS_TOKEN_TTL_SECS;
use cadence_model::{
    AccessTokenResponse, Account, ApiResponse, LoginRequest, RefreshRequest,
    RegisterRequest, TokenResponse,
};

use crate::infra::{app_state::AppState, errors::AppResult};

const TOKEN_TYPE: &str = "Bearer";

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Account>>)> {
    let Json(request) = payload?;
    request.validate()?;

    let account = state
        .sessions
        .register(&request.email, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(account)
                .with_message("User registered successfully".to_string()),
        ),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let Json(request) = payload?;
    let pair = state
        .sessions
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(ApiResponse::success(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: ACCESS_TOKEN_TTL_SECS,
    })))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<AccessTokenResponse>>> {
    let Json(request) = payload?;
    let access_token =
        state.sessions.refresh_access_token(&request.refresh_token)?;

    Ok(Json(ApiResponse::success(AccessTokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: ACCESS_TOKEN_TTL_SECS,
    })))
}
