use assets_plus_gallery::endpoints::Endpoints;
use assets_plus_gallery::feed::{PageRequest, PollRequest};
use assets_plus_gallery::model::{
    DeleteRequest, DeleteResponse, I18nResponse, ListResponse, MetaResponse, PanelConfig, ThumbClearResponse,
};
use assets_plus_gallery::Root;
use serde::de::DeserializeOwned;

pub const BASE: &str = ""; // use same-origin relative URLs

pub fn endpoints() -> Endpoints {
    Endpoints::new(BASE)
}

fn map_net(e: reqwasm::Error) -> String {
    format!("Netzwerkfehler: {}", e)
}

// Server errors carry {"error": {"message": ...}}; fall back to the raw body.
async fn error_text(resp: reqwasm::http::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| if body.is_empty() { format!("HTTP {}", status) } else { body })
}

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let resp = reqwasm::http::Request::get(url).send().await.map_err(map_net)?;
    if !resp.ok() {
        return Err(error_text(resp).await);
    }
    resp.json().await.map_err(map_net)
}

pub async fn list_page(root: Root, req: &PageRequest, recursive: bool) -> Result<ListResponse, String> {
    get_json(&endpoints().page(root, req, recursive)).await
}

pub async fn poll(root: Root, req: &PollRequest, recursive: bool) -> Result<ListResponse, String> {
    get_json(&endpoints().poll(root, req, recursive)).await
}

pub async fn meta(root: Root, relpath: &str) -> Result<MetaResponse, String> {
    get_json(&endpoints().meta(root, relpath)).await
}

pub async fn config() -> Result<PanelConfig, String> {
    get_json(&endpoints().config()).await
}

pub async fn i18n(locale: &str) -> Result<I18nResponse, String> {
    get_json(&endpoints().i18n(locale)).await
}

pub async fn delete(root: Root, req: &DeleteRequest) -> Result<DeleteResponse, String> {
    let body = serde_json::to_string(req).map_err(|e| e.to_string())?;
    let resp = reqwasm::http::Request::post(&endpoints().delete(root))
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .map_err(map_net)?;
    if !resp.ok() {
        return Err(error_text(resp).await);
    }
    resp.json().await.map_err(map_net)
}

pub async fn thumb_clear() -> Result<ThumbClearResponse, String> {
    let resp = reqwasm::http::Request::post(&endpoints().thumb_clear()).send().await.map_err(map_net)?;
    if !resp.ok() {
        return Err(error_text(resp).await);
    }
    resp.json().await.map_err(map_net)
}
