//! User-editable panel config (`{user_dir}/__assets_plus/config.json`).
//!
//! The file is hand-edited, so every field is coerced leniently: a value of
//! the wrong shape falls back to the server default instead of failing the
//! request.

use std::path::Path;

use assets_plus_gallery::model::{DeleteMode, PanelConfig, ThumbnailQuality};
use serde_json::{Map, Value};

/// Normalizes an extension to its dotted form (`png` → `.png`).
pub fn dotted(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// Loads the panel config on top of `defaults`. Missing, unreadable or
/// malformed files yield the defaults.
pub async fn load(path: &Path, defaults: &PanelConfig) -> PanelConfig {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return defaults.clone(),
        Err(e) => {
            tracing::warn!("Cannot read {}: {}; using defaults", path.display(), e);
            return defaults.clone();
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(raw) => from_value(&raw, defaults),
        Err(e) => {
            tracing::warn!("Assets+ config.json is invalid ({}); using defaults", e);
            defaults.clone()
        }
    }
}

pub fn from_value(raw: &Value, defaults: &PanelConfig) -> PanelConfig {
    let Some(obj) = raw.as_object() else {
        return defaults.clone();
    };

    let allowed_extensions = match obj.get("allowed_extensions") {
        Some(Value::Array(list)) => list
            .iter()
            .map(|v| match v {
                Value::String(s) => dotted(s),
                other => dotted(&other.to_string()),
            })
            .collect(),
        _ => defaults.allowed_extensions.clone(),
    };

    let thumbnail_quality = obj
        .get("thumbnail_quality")
        .and_then(Value::as_str)
        .and_then(ThumbnailQuality::parse_lenient)
        .or_else(|| obj.get("thumbnail_size").and_then(quality_from_size))
        .unwrap_or(defaults.thumbnail_quality);
    let (w, h) = thumbnail_quality.size();

    let list_limit = int_field(obj, "list_limit")
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(defaults.list_limit);

    let recursive = match obj.get("recursive") {
        Some(Value::Bool(b)) => *b,
        _ => defaults.recursive,
    };

    let poll_seconds = match obj.get("poll_seconds") {
        None => defaults.poll_seconds,
        Some(v) => as_int(v).map(|v| v.max(1) as u64).unwrap_or(defaults.poll_seconds),
    }
    .max(1);

    let default_delete_mode = obj
        .get("default_delete_mode")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<DeleteMode>().ok())
        .unwrap_or(defaults.default_delete_mode);

    let scan_depth = match obj.get("scan_depth") {
        None => defaults.scan_depth,
        Some(v) => as_int(v).and_then(|d| u32::try_from(d).ok()),
    };

    PanelConfig {
        allowed_extensions,
        thumbnail_quality,
        thumbnail_size: [w, h],
        list_limit,
        recursive,
        poll_seconds,
        default_delete_mode,
        scan_depth,
    }
}

fn int_field(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    obj.get(key).and_then(as_int)
}

/// Integer coercion: integral numbers, truncated floats, booleans and
/// numeric strings.
fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Older configs stored `thumbnail_size` as a number or `[w, h]`.
fn quality_from_size(value: &Value) -> Option<ThumbnailQuality> {
    let size = match value {
        Value::Array(dims) if dims.len() >= 2 => as_int(&dims[0])?.max(as_int(&dims[1])?),
        Value::Number(_) | Value::Bool(_) => as_int(value)?,
        _ => return None,
    };
    Some(ThumbnailQuality::from_pixel_size(size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerce(raw: Value) -> PanelConfig {
        from_value(&raw, &PanelConfig::default())
    }

    #[test]
    fn non_object_yields_defaults() {
        assert_eq!(coerce(json!([1, 2])), PanelConfig::default());
        assert_eq!(coerce(json!("x")), PanelConfig::default());
    }

    #[test]
    fn extensions_gain_a_dot() {
        let cfg = coerce(json!({"allowed_extensions": ["png", ".gif"]}));
        assert_eq!(cfg.allowed_extensions, vec![".png".to_string(), ".gif".to_string()]);
        let cfg = coerce(json!({"allowed_extensions": "png"}));
        assert_eq!(cfg.allowed_extensions, PanelConfig::default().allowed_extensions);
    }

    #[test]
    fn quality_is_parsed_or_inferred() {
        assert_eq!(coerce(json!({"thumbnail_quality": " HIGH "})).thumbnail_quality, ThumbnailQuality::High);
        let cfg = coerce(json!({"thumbnail_quality": "ultra", "thumbnail_size": [640, 320]}));
        assert_eq!(cfg.thumbnail_quality, ThumbnailQuality::High);
        assert_eq!(cfg.thumbnail_size, [512, 512]);
        assert_eq!(coerce(json!({"thumbnail_size": 128})).thumbnail_quality, ThumbnailQuality::Low);
        assert_eq!(coerce(json!({"thumbnail_size": "big"})).thumbnail_quality, ThumbnailQuality::Low);
    }

    #[test]
    fn numbers_are_coerced() {
        let cfg = coerce(json!({"list_limit": "50", "poll_seconds": 0}));
        assert_eq!(cfg.list_limit, 50);
        assert_eq!(cfg.poll_seconds, 1);
        let cfg = coerce(json!({"list_limit": "many", "poll_seconds": "soon"}));
        assert_eq!(cfg.list_limit, 500);
        assert_eq!(cfg.poll_seconds, 5);
        assert_eq!(coerce(json!({"poll_seconds": 2.9})).poll_seconds, 2);
    }

    #[test]
    fn recursive_accepts_only_booleans() {
        assert!(!coerce(json!({"recursive": false})).recursive);
        assert!(coerce(json!({"recursive": 0})).recursive);
    }

    #[test]
    fn delete_mode_must_be_known() {
        assert_eq!(coerce(json!({"default_delete_mode": "hide"})).default_delete_mode, DeleteMode::Hide);
        assert_eq!(coerce(json!({"default_delete_mode": "shred"})).default_delete_mode, DeleteMode::Trash);
    }

    #[test]
    fn scan_depth_rules() {
        assert_eq!(coerce(json!({"scan_depth": 2})).scan_depth, Some(2));
        assert_eq!(coerce(json!({"scan_depth": "3"})).scan_depth, Some(3));
        assert_eq!(coerce(json!({"scan_depth": -1})).scan_depth, None);
        assert_eq!(coerce(json!({"scan_depth": null})).scan_depth, None);
        assert_eq!(coerce(json!({"scan_depth": "deep"})).scan_depth, None);
    }

    #[tokio::test]
    async fn missing_and_malformed_files_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(load(&path, &PanelConfig::default()).await, PanelConfig::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load(&path, &PanelConfig::default()).await, PanelConfig::default());

        std::fs::write(&path, r#"{"list_limit": 20}"#).unwrap();
        assert_eq!(load(&path, &PanelConfig::default()).await.list_limit, 20);
    }
}
