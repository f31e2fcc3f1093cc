//! Message catalog behind `GET /assets_plus/i18n`.
//!
//! `en` and `de` are compiled in. A `{locales_dir}/{locale}.json` file can
//! override keys or add a whole new locale; whatever a locale lacks is filled
//! from `en`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use assets_plus_gallery::i18n::normalize_locale;

use crate::types::I18nResponse;

pub const FALLBACK_LOCALE: &str = "en";

const BUILTIN: &[(&str, &str)] = &[
    ("en", include_str!("locales/en.json")),
    ("de", include_str!("locales/de.json")),
];

type Messages = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct Catalog {
    builtin: BTreeMap<&'static str, Messages>,
    locales_dir: Option<PathBuf>,
}

impl Catalog {
    pub fn new(locales_dir: Option<PathBuf>) -> Self {
        let builtin = BUILTIN
            .iter()
            .map(|(locale, text)| {
                let messages = serde_json::from_str::<Messages>(text).unwrap_or_else(|e| {
                    tracing::error!("built-in locale {} is broken: {}", locale, e);
                    Messages::new()
                });
                (*locale, messages)
            })
            .collect();
        Self { builtin, locales_dir }
    }

    /// Messages for `tag` with the `en` fallback applied. Tags are reduced to
    /// their language (`de-DE` → `de`); an empty or unknown one yields `en`.
    pub async fn messages(&self, tag: Option<&str>) -> I18nResponse {
        let requested = tag.map(normalize_locale).filter(|l| is_safe_locale(l)).unwrap_or_default();

        let mut messages = self.layer(FALLBACK_LOCALE).await.unwrap_or_default();
        let locale = match self.layer(&requested).await {
            Some(own) if requested != FALLBACK_LOCALE => {
                messages.extend(own);
                requested
            }
            _ => FALLBACK_LOCALE.to_string(),
        };
        I18nResponse { locale, messages }
    }

    /// Built-in table of `locale` with its file override on top, or `None`
    /// when neither exists.
    async fn layer(&self, locale: &str) -> Option<Messages> {
        if locale.is_empty() {
            return None;
        }
        let builtin = self.builtin.get(locale).cloned();
        let file = match &self.locales_dir {
            Some(dir) => read_locale_file(dir, locale).await,
            None => None,
        };
        match (builtin, file) {
            (None, None) => None,
            (base, extra) => {
                let mut messages = base.unwrap_or_default();
                messages.extend(extra.unwrap_or_default());
                Some(messages)
            }
        }
    }
}

/// Only plain language subtags may become file names.
fn is_safe_locale(locale: &str) -> bool {
    !locale.is_empty() && locale.len() <= 8 && locale.chars().all(|c| c.is_ascii_alphabetic())
}

async fn read_locale_file(dir: &Path, locale: &str) -> Option<Messages> {
    let path = dir.join(format!("{}.json", locale));
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("cannot read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&text) {
        Ok(raw) => Some(
            raw.into_iter()
                .filter_map(|(k, v)| match v {
                    serde_json::Value::String(s) => Some((k, s)),
                    _ => None,
                })
                .collect(),
        ),
        Err(e) => {
            tracing::warn!("ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}
