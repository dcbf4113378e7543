//! HTTP delivery for the Cadence music catalog.
//!
//! [`create_app`] assembles the full router: the versioned API under
//! `/api/v1`, a root `/health` check and, when the local storage backend is
//! active, static serving of uploaded media under `/uploads`.

pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::get,
};
use cadence_config::StorageConfig;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use infra::app_state::AppState;

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(routes::create_api_router(state.clone()));

    if let StorageConfig::Local { upload_dir, .. } = &config.storage {
        app = app.nest_service("/uploads", ServeDir::new(upload_dir));
    }

    let allow_origin = if config.cors.is_wildcard_included() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
            .collect();
        AllowOrigin::list(origins)
    };
    let cors_layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    app.layer(DefaultBodyLimit::max(config.limits.max_upload_bytes))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
