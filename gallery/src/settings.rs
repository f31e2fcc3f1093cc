//! Effective panel settings: server defaults with user overrides on top.

use serde::{Deserialize, Serialize};

use crate::model::{DeleteMode, PanelConfig, ThumbnailQuality};

/// User-level overrides stored by the panel. Every field is optional; a
/// present value always wins over the server default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSettings {
    #[serde(default)]
    pub list_limit: Option<usize>,
    #[serde(default)]
    pub poll_seconds: Option<u64>,
    #[serde(default)]
    pub delete_mode: Option<DeleteMode>,
    #[serde(default)]
    pub thumbnail_quality: Option<ThumbnailQuality>,
    #[serde(default)]
    pub confirm_delete: Option<bool>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub recursive: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSettings {
    pub allowed_extensions: Vec<String>,
    pub list_limit: usize,
    pub poll_seconds: u64,
    pub delete_mode: DeleteMode,
    pub thumbnail_size: (u32, u32),
    pub recursive: bool,
    pub scan_depth: Option<u32>,
    pub confirm_delete: bool,
    pub locale: String,
}

impl EffectiveSettings {
    pub fn merge(server: &PanelConfig, host: &HostSettings) -> Self {
        let thumbnail_size = match host.thumbnail_quality {
            Some(quality) => quality.size(),
            None => (server.thumbnail_size[0], server.thumbnail_size[1]),
        };
        Self {
            allowed_extensions: server.allowed_extensions.clone(),
            list_limit: host.list_limit.filter(|v| *v > 0).unwrap_or(server.list_limit).max(1),
            poll_seconds: host.poll_seconds.unwrap_or(server.poll_seconds).max(1),
            delete_mode: host.delete_mode.unwrap_or(server.default_delete_mode),
            thumbnail_size,
            recursive: host.recursive.unwrap_or(server.recursive),
            scan_depth: server.scan_depth,
            confirm_delete: host.confirm_delete.unwrap_or(true),
            locale: host.locale.clone().unwrap_or_else(|| "en".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Number,
    Toggle,
    Choice(&'static [&'static str]),
}

/// A setting the panel renders in its settings drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDef {
    pub id: &'static str,
    pub label_key: &'static str,
    pub kind: SettingKind,
}

pub const SETTING_DEFS: &[SettingDef] = &[
    SettingDef { id: "list_limit", label_key: "settings.list_limit", kind: SettingKind::Number },
    SettingDef { id: "poll_seconds", label_key: "settings.poll_seconds", kind: SettingKind::Number },
    SettingDef {
        id: "delete_mode",
        label_key: "settings.delete_mode",
        kind: SettingKind::Choice(&["trash", "delete", "hide"]),
    },
    SettingDef {
        id: "thumbnail_quality",
        label_key: "settings.thumbnail_quality",
        kind: SettingKind::Choice(&["low", "high"]),
    },
    SettingDef { id: "recursive", label_key: "settings.recursive", kind: SettingKind::Toggle },
    SettingDef { id: "confirm_delete", label_key: "settings.confirm_delete", kind: SettingKind::Toggle },
    SettingDef { id: "locale", label_key: "settings.locale", kind: SettingKind::Choice(&["en", "de"]) },
];
