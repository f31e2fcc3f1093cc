//! Root-independent panel endpoints: config, translations, cache wipe.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};

use crate::error::AppResult;
use crate::middleware::ip::{extract_ip_from_headers, MaybeRemoteAddr};
use crate::state::AppState;
use crate::types::{I18nQuery, I18nResponse, PanelConfig, ThumbClearResponse};

// Effective panel config (server defaults + config.json)
pub async fn config(State(state): State<AppState>) -> Json<PanelConfig> {
    Json(state.panel_config().await)
}

pub async fn i18n(State(state): State<AppState>, Query(q): Query<I18nQuery>) -> Json<I18nResponse> {
    Json(state.i18n.messages(q.locale.as_deref()).await)
}

pub async fn thumb_clear(
    State(state): State<AppState>,
    maybe_remote: MaybeRemoteAddr,
    headers: HeaderMap,
) -> AppResult<Json<ThumbClearResponse>> {
    let ip = extract_ip_from_headers(&headers, maybe_remote.0.map(|sa| sa.ip()));
    state.rate_limiter.check_endpoint_limit("thumb_clear", ip).await?;

    let resp = state.thumbs.clear().await?;
    tracing::info!("Thumbnail cache cleared: {} files, {} bytes", resp.removed, resp.freed_bytes);
    Ok(Json(resp))
}
