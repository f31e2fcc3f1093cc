//! Translation lookup for panel strings.

use std::collections::BTreeMap;

use crate::model::I18nResponse;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    locale: String,
    messages: BTreeMap<String, String>,
}

impl Translations {
    pub fn new(locale: impl Into<String>, messages: BTreeMap<String, String>) -> Self {
        Self { locale: locale.into(), messages }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The translated text, or the key itself when missing.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Like [`get`](Self::get) with `{name}` placeholders substituted.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.get(key).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }
}

impl From<I18nResponse> for Translations {
    fn from(resp: I18nResponse) -> Self {
        Self::new(resp.locale, resp.messages)
    }
}

/// Reduces a language tag to its primary subtag: `de-DE` → `de`.
pub fn normalize_locale(tag: &str) -> String {
    tag.trim().split(['-', '_']).next().unwrap_or("").to_ascii_lowercase()
}
