//! Fixtures shared by the router tests.

use std::fs::File;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

use axum::{
    body::Body,
    http::{Request, Response},
    middleware::from_fn_with_state,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;

use crate::config::{self, AppConfig};
use crate::routes;
use crate::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Storage rooted in a fresh temp dir; `tweak` may adjust the config.
    pub fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::rooted_at(dir.path());
        tweak(&mut cfg);
        std::fs::create_dir_all(&cfg.storage.output_dir).unwrap();
        std::fs::create_dir_all(&cfg.storage.input_dir).unwrap();
        config::ensure_state_dirs(&cfg.storage).unwrap();

        let state = AppState::new(cfg);
        let app = routes::router(state.clone()).layer(from_fn_with_state(
            state.config.clone(),
            crate::middleware::security_headers::security_headers_middleware,
        ));
        Self { app, state, dir }
    }

    pub fn output(&self) -> &Path {
        &self.state.config.storage.output_dir
    }

    pub fn input(&self) -> &Path {
        &self.state.config.storage.input_dir
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.app.clone().oneshot(req).await.unwrap()
    }
}

pub async fn body_bytes(res: Response<Body>) -> Vec<u8> {
    res.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(res: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}

/// Writes `bytes` to `root/relpath` and pins its mtime to `mtime` seconds.
pub fn put_file(root: &Path, relpath: &str, bytes: &[u8], mtime: u64) {
    let path = root.join(relpath);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, bytes).unwrap();
    set_mtime(&path, mtime);
}

pub fn set_mtime(path: &Path, mtime: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime)).unwrap();
}

/// A decodable `w`×`h` PNG at `root/relpath`.
pub fn put_image(root: &Path, relpath: &str, w: u32, h: u32, mtime: u64) {
    let path = root.join(relpath);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(w, h, image::Rgb([90, 120, 200])).save(&path).unwrap();
    set_mtime(&path, mtime);
}


pub fn relpaths(list: &Value) -> Vec<String> {
    list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["relpath"].as_str().unwrap().to_string())
        .collect()
}
