//! HTTP route handlers for the Assets+ API.
//!
//! - `assets`: per-root list, thumbnail, metadata, file and delete endpoints
//! - `panel`: panel config, translations and thumbnail-cache wipe
//! - `health`: health, readiness, metrics and version

pub mod assets;
pub mod health;
pub mod panel;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

/// Base path of the panel API.
pub use assets_plus_gallery::endpoints::API_PREFIX;

/// All API routes with state applied. Global layers and the static UI
/// fallback are added by the binary.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/config", get(panel::config))
        .route("/i18n", get(panel::i18n))
        .route("/thumb/clear", post(panel::thumb_clear))
        .route("/{root}/list", get(assets::list))
        .route("/{root}/thumb", get(assets::thumb))
        .route("/{root}/meta", get(assets::meta))
        .route("/{root}/file", get(assets::file))
        .route("/{root}/delete", post(assets::delete))
        // Bearer-Token nur für die Panel-API, Health bleibt offen
        .route_layer(from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .nest(API_PREFIX, api)
        .with_state(state)
}
