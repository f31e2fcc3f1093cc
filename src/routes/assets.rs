//! Per-root asset endpoints under `/assets_plus/{root}`.

use std::path::{Path as FsPath, PathBuf};

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, Request, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use serde_json::Value;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::{validation::require_relpath, AppError, AppResult};
use crate::library::{self, mtime_secs, ScanOptions};
use crate::metadata::read_text_chunks;
use crate::middleware::ip::{extract_ip_from_headers, MaybeRemoteAddr};
use crate::paths::resolve;
use crate::removal;
use crate::state::AppState;
use crate::thumbs::{cache_key, Thumb};
use crate::types::{
    AssetKind, DeleteMode, DeleteResponse, ListQuery, ListResponse, MetaResponse, RelpathQuery, Root, ThumbQuery,
};

/// `GET /assets_plus/{root}/list`: one page (or poll window) of the root.
pub async fn list(
    State(state): State<AppState>,
    Path(root): Path<String>,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<ListResponse>> {
    let root: Root = root.parse()?;
    let cursor = q.cursor()?;
    let since = q.since()?;

    let panel = state.panel_config().await;
    let limit = q.limit(panel.list_limit, state.config.limits.max_list_limit)?;
    let opts = ScanOptions {
        extensions: q.extensions().unwrap_or(panel.allowed_extensions),
        recursive: q.recursive(panel.recursive),
        scan_depth: q.scan_depth(panel.scan_depth),
    };

    let hidden = state.hidden.snapshot().await;
    let root_dir = state.root_dir(root).to_path_buf();
    let probe = state.probe.clone();
    let items = tokio::task::spawn_blocking(move || library::scan(root, &root_dir, &opts, &hidden, &probe)).await??;

    let resp = library::page(&items, cursor.as_ref(), since, limit);
    state.metrics.inc_lists();
    tracing::debug!(
        "list {}: {} of {} items (has_more={})",
        root,
        resp.items.len(),
        items.len(),
        resp.has_more
    );
    Ok(Json(resp))
}

/// `GET /assets_plus/{root}/thumb`: cached PNG thumbnail. Videos are served
/// as-is.
pub async fn thumb(
    State(state): State<AppState>,
    Path(root): Path<String>,
    Query(q): Query<ThumbQuery>,
    req: Request,
) -> AppResult<Response> {
    let root: Root = root.parse()?;
    let relpath = require_relpath(q.relpath.as_deref())?;
    let (path, md) = existing_file(state.root_dir(root), relpath).await?;

    if AssetKind::from_filename(relpath) == AssetKind::Video {
        return serve_file(&path, req).await;
    }

    let [w, h] = state.panel_config().await.thumbnail_size;
    let box_size = q.size((w, h))?;
    let key = cache_key(root, relpath, mtime_secs(&md), md.len(), box_size);
    let thumb = state.thumbs.get_or_render(&path, &key, box_size).await?;
    match &thumb {
        Thumb::Cached(_) => state.metrics.inc_thumb_cache_hits(),
        Thumb::Rendered(_) => state.metrics.inc_thumbnails_rendered(),
    }
    serve_file(thumb.path(), req).await
}

/// `GET /assets_plus/{root}/meta`: embedded `workflow`/`prompt` texts.
pub async fn meta(
    State(state): State<AppState>,
    Path(root): Path<String>,
    Query(q): Query<RelpathQuery>,
) -> AppResult<Json<MetaResponse>> {
    let root: Root = root.parse()?;
    let relpath = require_relpath(q.relpath.as_deref())?.to_string();
    let (path, _) = existing_file(state.root_dir(root), &relpath).await?;
    let metadata = tokio::task::spawn_blocking(move || read_text_chunks(&path)).await?;
    Ok(Json(MetaResponse { relpath, metadata }))
}

/// `GET /assets_plus/{root}/file`: the original file, range requests included.
pub async fn file(
    State(state): State<AppState>,
    Path(root): Path<String>,
    Query(q): Query<RelpathQuery>,
    req: Request,
) -> AppResult<Response> {
    let root: Root = root.parse()?;
    let relpath = require_relpath(q.relpath.as_deref())?;
    let (path, _) = existing_file(state.root_dir(root), relpath).await?;
    serve_file(&path, req).await
}

/// `POST /assets_plus/{root}/delete` with `{"relpaths": [...], "mode": "trash"|"delete"|"hide"}`.
pub async fn delete(
    State(state): State<AppState>,
    Path(root): Path<String>,
    maybe_remote: MaybeRemoteAddr,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DeleteResponse>> {
    let ip = extract_ip_from_headers(&headers, maybe_remote.0.map(|sa| sa.ip()));
    state.rate_limiter.check_endpoint_limit("delete", ip).await?;

    let root: Root = root.parse()?;
    let body: Value = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?
    };
    let Some(obj) = body.as_object() else {
        return Err(AppError::BadRequest("Expected a JSON object".to_string()));
    };

    let (relpaths, mut rejected) = match obj.get("relpaths") {
        None | Some(Value::Null) => (Vec::new(), Vec::new()),
        Some(Value::Array(entries)) => split_relpaths(entries),
        Some(_) => return Err(AppError::BadRequest("relpaths must be a list".to_string())),
    };
    let mode = match obj.get("mode") {
        None | Some(Value::Null) => state.panel_config().await.default_delete_mode,
        Some(Value::String(s)) if s.trim().is_empty() => state.panel_config().await.default_delete_mode,
        Some(Value::String(s)) => s.trim().parse::<DeleteMode>()?,
        Some(_) => {
            return Err(AppError::ValidationError {
                field: "mode".to_string(),
                message: "expected a string".to_string(),
            })
        }
    };

    let (guard, index) = state.hidden.lock().await;
    let root_dir: PathBuf = state.root_dir(root).to_path_buf();
    let (outcome, index) = tokio::task::spawn_blocking(move || {
        let mut index = index;
        let outcome = removal::remove(root, &root_dir, &relpaths, mode, &mut index);
        (outcome, index)
    })
    .await?;
    if outcome.index_changed {
        state.hidden.save(&guard, &index).await?;
    }
    drop(guard);

    let mut resp = outcome.response;
    resp.failed.append(&mut rejected);
    state.metrics.add_deleted(resp.removed.len() as u64);
    state.metrics.add_delete_failures(resp.failed.len() as u64);
    Ok(Json(resp))
}

/// String entries become relpaths; anything else is reported back as failed
/// in its JSON form.
fn split_relpaths(entries: &[Value]) -> (Vec<String>, Vec<String>) {
    let mut relpaths = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();
    for entry in entries {
        match entry {
            Value::String(s) => relpaths.push(s.clone()),
            other => rejected.push(other.to_string()),
        }
    }
    (relpaths, rejected)
}

async fn existing_file(root_dir: &FsPath, relpath: &str) -> AppResult<(PathBuf, std::fs::Metadata)> {
    let path = resolve(root_dir, relpath)?;
    match tokio::fs::metadata(&path).await {
        Ok(md) if md.is_file() => Ok((path, md)),
        Ok(_) => Err(AppError::NotFound("Asset not found".to_string())),
        Err(e) => Err(e.into()),
    }
}

async fn serve_file(path: &FsPath, req: Request) -> AppResult<Response> {
    match ServeFile::new(path).oneshot(req).await {
        Ok(res) => Ok(res.map(Body::new)),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_string_relpaths_are_rejected_individually() {
        let entries = vec![json!("a.png"), json!(3), json!(null), json!("b/c.png")];
        let (ok, rejected) = split_relpaths(&entries);
        assert_eq!(ok, vec!["a.png".to_string(), "b/c.png".to_string()]);
        assert_eq!(rejected, vec!["3".to_string(), "null".to_string()]);
    }

    #[tokio::test]
    async fn directories_are_not_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        assert!(matches!(existing_file(dir.path(), "sub").await, Err(AppError::NotFound(_))));
        assert!(matches!(existing_file(dir.path(), "nope.png").await, Err(AppError::NotFound(_))));
    }
}
