//! # Assets+ gallery engine
//!
//! Wire types shared by the Assets+ server and its web panel, plus the
//! client-side state machines that drive the panel:
//!
//! - [`model`]: DTOs for list/meta/delete/config/i18n endpoints
//! - [`feed`]: cursor paging and live merge of newly produced items
//! - [`view`]: search/filter/sort over the loaded items
//! - [`overlay`]: the full-screen lens (navigation, zoom, pan, keys)
//! - [`selection`]: multi-select scoped to one root
//! - [`actions`]: delete/download/workflow planning over a selection
//! - [`endpoints`]: URL builders for the HTTP surface
//! - [`settings`]: server defaults merged with user overrides
//! - [`i18n`]: translation lookup
//!
//! Nothing in this crate performs I/O; the server and the web UI own the
//! network and the filesystem.

pub mod actions;
pub mod endpoints;
pub mod feed;
pub mod i18n;
pub mod model;
pub mod overlay;
pub mod selection;
pub mod settings;
pub mod view;

pub use model::{AssetItem, AssetKind, DeleteMode, PageCursor, PanelConfig, Root};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GalleryError {
    #[error("unknown root: {0}")]
    UnknownRoot(String),
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("unknown delete mode: {0}")]
    UnknownDeleteMode(String),
}
