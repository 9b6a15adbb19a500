//! Locale identifiers, site language settings, and request locale negotiation.
//!
//! A [`LocaleId`] is a normalized language code (`en`, `pt`, `zh-hans`).
//! Site-level language administration lives outside this crate; what it hands
//! us is a [`LocaleSettings`] value: the default language plus the set of
//! languages the site publishes in.
//!
//! ## Negotiation
//!
//! [`negotiate`] picks the active locale for a request, first match wins:
//!
//! 1. The first path segment (`/fr/about/` → `fr`) if it is an available language
//! 2. `Accept-Language`, highest `q` first, exact tag before primary subtag
//!    (`pt-BR` matches an available `pt`)
//! 3. The default language

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages offered to site administrators, as `(code, display name)`.
pub const LANGUAGE_CHOICES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish / Español"),
    ("fr", "French / Français"),
    ("de", "German / Deutsch"),
    ("pt", "Portuguese / Português"),
    ("it", "Italian / Italiano"),
    ("nl", "Dutch / Nederlands"),
    ("da", "Danish / Dansk"),
    ("sv", "Swedish / Svenska"),
    ("no", "Norwegian / Norsk"),
    ("fi", "Finnish / Suomi"),
    ("is", "Icelandic / Íslenska"),
    ("ru", "Russian / Русский"),
    ("ja", "Japanese / 日本語"),
    ("zh-hans", "Chinese Simplified / 简体中文"),
    ("zh-hant", "Chinese Traditional / 繁體中文"),
    ("ko", "Korean / 한국어"),
    ("ar", "Arabic / العربية"),
    ("sw", "Swahili / Kiswahili"),
];

/// Display name for a language code, if it is one of [`LANGUAGE_CHOICES`].
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGE_CHOICES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// A normalized locale code: trimmed, lowercase, `_` replaced by `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LocaleId(String);

impl LocaleId {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_lowercase().replace('_', "-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language part before the first `-` (`pt-br` → `pt`).
    pub fn primary_subtag(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl From<String> for LocaleId {
    fn from(code: String) -> Self {
        Self::new(&code)
    }
}

impl From<&str> for LocaleId {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<LocaleId> for String {
    fn from(locale: LocaleId) -> Self {
        locale.0
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Site language settings: the default language and every published language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleSettings {
    /// Fallback language for content missing in the active locale.
    pub default_language: LocaleId,
    /// Languages the site is available in. Must include `default_language`.
    pub available_languages: Vec<LocaleId>,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            default_language: LocaleId::new("en"),
            available_languages: vec![LocaleId::new("en")],
        }
    }
}

impl LocaleSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.available_languages.is_empty() {
            return Err(ConfigError::Validation(
                "locales.available_languages: please select at least one language".into(),
            ));
        }
        if language_name(self.default_language.as_str()).is_none() {
            return Err(ConfigError::Validation(format!(
                "locales.default_language: '{}' is not one of the language choices",
                self.default_language
            )));
        }
        for (idx, locale) in self.available_languages.iter().enumerate() {
            if language_name(locale.as_str()).is_none() {
                return Err(ConfigError::Validation(format!(
                    "locales.available_languages: '{}' is not one of the language choices",
                    locale
                )));
            }
            if self.available_languages[..idx].contains(locale) {
                return Err(ConfigError::Validation(format!(
                    "locales.available_languages: '{}' is listed more than once",
                    locale
                )));
            }
        }
        if !self.available_languages.contains(&self.default_language) {
            return Err(ConfigError::Validation(format!(
                "locales.available_languages must include the default language '{}'",
                self.default_language
            )));
        }
        Ok(())
    }

    pub fn is_available(&self, locale: &LocaleId) -> bool {
        self.available_languages.contains(locale)
    }

    /// `(code, display name)` pairs.
    pub fn available_languages_list(&self) -> Vec<(&str, &str)> {
        self.available_languages
            .iter()
            .map(|l| (l.as_str(), language_name(l.as_str()).unwrap_or(l.as_str())))
            .collect()
    }
}

/// Choose the active locale for a request path and optional `Accept-Language` header.
pub fn negotiate(settings: &LocaleSettings, path: &str, accept_language: Option<&str>) -> LocaleId {
    if let Some(locale) = locale_from_path(settings, path) {
        return locale;
    }
    if let Some(locale) = accept_language.and_then(|h| locale_from_header(settings, h)) {
        return locale;
    }
    settings.default_language.clone()
}

fn locale_from_path(settings: &LocaleSettings, path: &str) -> Option<LocaleId> {
    let segment = path.trim_start_matches('/').split('/').next()?;
    if segment.is_empty() {
        return None;
    }
    let candidate = LocaleId::new(segment);
    settings.is_available(&candidate).then_some(candidate)
}

fn locale_from_header(settings: &LocaleSettings, header: &str) -> Option<LocaleId> {
    let mut ranges: Vec<(LocaleId, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let q = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (q > 0.0).then(|| (LocaleId::new(tag), q))
        })
        .collect();
    // Stable sort keeps header order among equal weights.
    ranges.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranges.iter().find_map(|(wanted, _)| {
        if settings.is_available(wanted) {
            return Some(wanted.clone());
        }
        settings
            .available_languages
            .iter()
            .find(|available| available.primary_subtag() == wanted.primary_subtag())
            .cloned()
    })
}
