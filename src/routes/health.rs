use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Health check endpoint - lightweight, no rate limiting
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: the state dir must exist so hides and thumbnails can be written
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let state_dir = state.config.storage.state_dir();
    match tokio::fs::metadata(&state_dir).await {
        Ok(md) if md.is_dir() => (StatusCode::OK, "ready").into_response(),
        Ok(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: state dir is not a directory").into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.get_snapshot();
    Json(snapshot)
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP assets_plus_lists_served List requests served\n# TYPE assets_plus_lists_served counter\nassets_plus_lists_served {}\n\
# HELP assets_plus_thumbnails_rendered Thumbnails rendered\n# TYPE assets_plus_thumbnails_rendered counter\nassets_plus_thumbnails_rendered {}\n\
# HELP assets_plus_thumb_cache_hits Thumbnail cache hits\n# TYPE assets_plus_thumb_cache_hits counter\nassets_plus_thumb_cache_hits {}\n\
# HELP assets_plus_files_deleted Files removed via delete\n# TYPE assets_plus_files_deleted counter\nassets_plus_files_deleted {}\n\
# HELP assets_plus_delete_failures Failed removals\n# TYPE assets_plus_delete_failures counter\nassets_plus_delete_failures {}\n\
# HELP assets_plus_uptime_seconds Uptime seconds\n# TYPE assets_plus_uptime_seconds gauge\nassets_plus_uptime_seconds {}\n",
        m.lists_served,
        m.thumbnails_rendered,
        m.thumb_cache_hits,
        m.files_deleted,
        m.delete_failures,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
