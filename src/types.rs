//! Query DTOs of the HTTP surface. Response bodies and shared wire types live
//! in the gallery crate and are re-exported here.

use serde::Deserialize;

pub use assets_plus_gallery::model::{
    AssetItem, AssetKind, DeleteMode, DeleteRequest, DeleteResponse, I18nResponse, ListResponse, MetaResponse,
    PageCursor, PanelConfig, Root, ThumbClearResponse, ThumbnailQuality,
};

use crate::error::{AppError, AppResult};

/// `GET /assets_plus/{root}/list`. Values arrive as raw strings and are
/// coerced leniently where a bad value has an obvious fallback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub cursor: Option<String>,
    pub since: Option<String>,
    pub limit: Option<String>,
    pub extensions: Option<String>,
    pub scan_depth: Option<String>,
    pub recursive: Option<String>,
}

impl ListQuery {
    pub fn cursor(&self) -> AppResult<Option<PageCursor>> {
        match self.cursor.as_deref().filter(|c| !c.is_empty()) {
            Some(raw) => Ok(Some(raw.parse::<PageCursor>()?)),
            None => Ok(None),
        }
    }

    pub fn since(&self) -> AppResult<Option<i64>> {
        parse_opt_int(self.since.as_deref(), "since")
    }

    /// Requested page size; 0 or absent means the configured default. The
    /// result never exceeds `max`.
    pub fn limit(&self, default: usize, max: usize) -> AppResult<usize> {
        let requested = parse_opt_int(self.limit.as_deref(), "limit")?;
        let limit = match requested {
            Some(n) if n > 0 => n as usize,
            _ => default,
        };
        Ok(if limit == 0 { max } else { limit.min(max) })
    }

    /// Comma list, dots optional. `None` when absent or empty.
    pub fn extensions(&self) -> Option<Vec<String>> {
        let raw = self.extensions.as_deref()?;
        let exts: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(crate::config::panel::dotted)
            .collect();
        if exts.is_empty() {
            None
        } else {
            Some(exts)
        }
    }

    /// Negative means unlimited; non-numeric falls back to `default`.
    pub fn scan_depth(&self, default: Option<u32>) -> Option<u32> {
        match self.scan_depth.as_deref().map(str::trim) {
            None => default,
            Some(raw) => match raw.parse::<i64>() {
                Ok(d) if d < 0 => None,
                Ok(d) => u32::try_from(d).ok(),
                Err(_) => default,
            },
        }
    }

    pub fn recursive(&self, default: bool) -> bool {
        match self.recursive.as_deref() {
            None => default,
            Some(v) => !matches!(v, "0" | "false" | "False"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelpathQuery {
    pub relpath: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbQuery {
    pub relpath: Option<String>,
    pub w: Option<String>,
    pub h: Option<String>,
}

pub const MIN_THUMB_SIDE: u32 = 16;
pub const MAX_THUMB_SIDE: u32 = 2048;

impl ThumbQuery {
    /// Requested bounding box, clamped to 16..=2048 per side.
    pub fn size(&self, default: (u32, u32)) -> AppResult<(u32, u32)> {
        let w = parse_opt_int(self.w.as_deref(), "w")?.map(clamp_side).unwrap_or(default.0);
        let h = parse_opt_int(self.h.as_deref(), "h")?.map(clamp_side).unwrap_or(default.1);
        Ok((w, h))
    }
}

fn clamp_side(v: i64) -> u32 {
    v.clamp(MIN_THUMB_SIDE as i64, MAX_THUMB_SIDE as i64) as u32
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct I18nQuery {
    pub locale: Option<String>,
}

fn parse_opt_int(raw: Option<&str>, field: &str) -> AppResult<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(|_| AppError::ValidationError {
            field: field.to_string(),
            message: format!("expected an integer, got '{}'", s),
        }),
    }
}
