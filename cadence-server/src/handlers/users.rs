use axum::{Extension, Json, extract::State, extract::rejection::JsonRejection};
use cadence_model::{Account, ApiResponse, ProfileUpdate};

use crate::infra::{app_state::AppState, errors::AppResult};
use crate::middleware::AuthenticatedUser;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let account = state.accounts.profile(user.id).await?;
    Ok(Json(ApiResponse::success(account)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let Json(update) = payload?;
    update.validate()?;

    let account = state.accounts.update_profile(user.id, update).await?;
    Ok(Json(
        ApiResponse::success(account)
            .with_message("Profile updated".to_string()),
    ))
}
