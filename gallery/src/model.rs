//! Wire types shared by the Assets+ server and the web UI.
//!
//! Everything here is a plain DTO: the server produces these from directory
//! scans and the client treats them as immutable snapshots keyed by
//! [`AssetItem::relpath`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GalleryError;

/// One of the two fixed scan directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Root {
    Output,
    Input,
}

impl Root {
    pub const ALL: [Root; 2] = [Root::Output, Root::Input];

    pub fn as_str(self) -> &'static str {
        match self {
            Root::Output => "output",
            Root::Input => "input",
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Root {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "output" => Ok(Root::Output),
            "input" => Ok(Root::Input),
            other => Err(GalleryError::UnknownRoot(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
}

/// Extensions that are served as videos; everything else allowed is an image.
pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mov", ".mkv"];

impl AssetKind {
    /// Classifies a file name by its (case-insensitive) extension.
    pub fn from_filename(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            AssetKind::Video
        } else {
            AssetKind::Image
        }
    }
}

/// A single media file under a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetItem {
    pub relpath: String,
    pub filename: String,
    pub mtime: i64,
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    #[serde(default)]
    pub has_workflow: bool,
}

impl AssetItem {
    /// Newest first, relpath ascending on equal mtime.
    pub fn feed_order(a: &AssetItem, b: &AssetItem) -> Ordering {
        b.mtime.cmp(&a.mtime).then_with(|| a.relpath.cmp(&b.relpath))
    }

    pub fn position(&self) -> PageCursor {
        PageCursor { mtime: self.mtime, relpath: self.relpath.clone() }
    }
}

/// Position of the last delivered item in feed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub mtime: i64,
    pub relpath: String,
}

impl PageCursor {
    /// True when `item` comes strictly after this position in feed order.
    pub fn precedes(&self, item: &AssetItem) -> bool {
        match item.mtime.cmp(&self.mtime) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => item.relpath.as_str() > self.relpath.as_str(),
        }
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mtime, self.relpath)
    }
}

impl FromStr for PageCursor {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mtime, relpath) =
            s.split_once(':').ok_or_else(|| GalleryError::InvalidCursor(s.to_string()))?;
        let mtime = mtime.parse::<i64>().map_err(|_| GalleryError::InvalidCursor(s.to_string()))?;
        Ok(PageCursor { mtime, relpath: relpath.to_string() })
    }
}

impl Serialize for PageCursor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PageCursor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub items: Vec<AssetItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<PageCursor>,
    pub has_more: bool,
    #[serde(default)]
    pub newest_mtime: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaResponse {
    pub relpath: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    #[default]
    Trash,
    Delete,
    Hide,
}

impl DeleteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DeleteMode::Trash => "trash",
            DeleteMode::Delete => "delete",
            DeleteMode::Hide => "hide",
        }
    }
}

impl FromStr for DeleteMode {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trash" => Ok(DeleteMode::Trash),
            "delete" => Ok(DeleteMode::Delete),
            "hide" => Ok(DeleteMode::Hide),
            other => Err(GalleryError::UnknownDeleteMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub relpaths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DeleteMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub removed: Vec<String>,
    pub failed: Vec<String>,
    pub mode: DeleteMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailQuality {
    #[default]
    Low,
    High,
}

impl ThumbnailQuality {
    pub fn size(self) -> (u32, u32) {
        match self {
            ThumbnailQuality::Low => (256, 256),
            ThumbnailQuality::High => (512, 512),
        }
    }

    /// Lenient parse used for user-edited config values.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(ThumbnailQuality::Low),
            "high" => Some(ThumbnailQuality::High),
            _ => None,
        }
    }

    /// Legacy configs stored a pixel size instead of a quality name.
    pub fn from_pixel_size(size: i64) -> Self {
        if size >= 512 {
            ThumbnailQuality::High
        } else {
            ThumbnailQuality::Low
        }
    }
}

/// Server-declared panel defaults as returned by `GET /assets_plus/config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub allowed_extensions: Vec<String>,
    pub thumbnail_quality: ThumbnailQuality,
    pub thumbnail_size: [u32; 2],
    pub list_limit: usize,
    pub recursive: bool,
    pub poll_seconds: u64,
    pub default_delete_mode: DeleteMode,
    pub scan_depth: Option<u32>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let quality = ThumbnailQuality::Low;
        let (w, h) = quality.size();
        Self {
            allowed_extensions: [".png", ".jpg", ".jpeg", ".webp", ".mp4", ".webm"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            thumbnail_quality: quality,
            thumbnail_size: [w, h],
            list_limit: 500,
            recursive: true,
            poll_seconds: 5,
            default_delete_mode: DeleteMode::Trash,
            scan_depth: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbClearResponse {
    pub removed: u64,
    pub freed_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nResponse {
    pub locale: String,
    pub messages: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(relpath: &str, mtime: i64) -> AssetItem {
        AssetItem {
            relpath: relpath.to_string(),
            filename: relpath.rsplit('/').next().unwrap().to_string(),
            mtime,
            size: 1,
            kind: AssetKind::from_filename(relpath),
            has_workflow: false,
        }
    }

    #[test]
    fn feed_order_is_newest_first_with_relpath_tiebreak() {
        let mut items = vec![item("b.png", 10), item("a.png", 10), item("c.png", 20)];
        items.sort_by(AssetItem::feed_order);
        let order: Vec<_> = items.iter().map(|i| i.relpath.as_str()).collect();
        assert_eq!(order, vec!["c.png", "a.png", "b.png"]);
    }

    #[test]
    fn cursor_text_form_keeps_colons_in_relpath() {
        let cursor: PageCursor = "1700000000:sub/dir:odd.png".parse().unwrap();
        assert_eq!(cursor.mtime, 1700000000);
        assert_eq!(cursor.relpath, "sub/dir:odd.png");
        assert_eq!(cursor.to_string(), "1700000000:sub/dir:odd.png");
        assert!("nonsense".parse::<PageCursor>().is_err());
        assert!("abc:x.png".parse::<PageCursor>().is_err());
    }

    #[test]
    fn cursor_precedes_follows_feed_order() {
        let cursor = item("b.png", 10).position();
        assert!(cursor.precedes(&item("c.png", 10)));
        assert!(cursor.precedes(&item("a.png", 9)));
        assert!(!cursor.precedes(&item("b.png", 10)));
        assert!(!cursor.precedes(&item("a.png", 10)));
        assert!(!cursor.precedes(&item("z.png", 11)));
    }

    #[test]
    fn asset_item_uses_type_field_on_the_wire() {
        let json = serde_json::to_value(item("clip.MP4", 1)).unwrap();
        assert_eq!(json["type"], "video");
        let back: AssetItem = serde_json::from_value(serde_json::json!({
            "relpath": "x.png", "filename": "x.png", "mtime": 3, "size": 4, "type": "image"
        }))
        .unwrap();
        assert!(!back.has_workflow);
    }

    #[test]
    fn thumbnail_quality_coercion() {
        assert_eq!(ThumbnailQuality::parse_lenient(" HIGH "), Some(ThumbnailQuality::High));
        assert_eq!(ThumbnailQuality::parse_lenient("medium"), None);
        assert_eq!(ThumbnailQuality::from_pixel_size(512), ThumbnailQuality::High);
        assert_eq!(ThumbnailQuality::from_pixel_size(300), ThumbnailQuality::Low);
    }

    #[test]
    fn root_parsing() {
        assert_eq!("input".parse::<Root>().unwrap(), Root::Input);
        assert!("temp".parse::<Root>().is_err());
        assert_eq!(Root::Output.to_string(), "output");
    }
}
