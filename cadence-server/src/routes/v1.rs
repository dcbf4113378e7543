use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::{auth, tracks, users},
    middleware::auth_middleware,
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Public authentication endpoints
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh-token", post(auth::refresh_token))
        .merge(create_protected_routes(state))
}

fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/music",
            get(tracks::list_tracks).post(tracks::create_track),
        )
        .route(
            "/music/{id}",
            get(tracks::get_track)
                .put(tracks::update_track)
                .delete(tracks::delete_track),
        )
        .route(
            "/user",
            get(users::get_profile).put(users::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
