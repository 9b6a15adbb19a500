//! Read-only collaborators consulted by the resolver.
//!
//! The page repository and locale administration belong to the surrounding
//! CMS. The resolver only ever sees them through two traits:
//!
//! - [`LocaleSource`]: the active locale for a request and the site default
//! - [`PageSource`]: a page's translation in a given locale, if any
//!
//! Both are `Send + Sync` so one source can serve many concurrent resolutions.
//! An `Err` from either is an infrastructure fault and fails the whole
//! resolution; a missing translation is `Ok(None)`, not an error.
//!
//! [`InMemoryPageSource`], [`NegotiatingLocaleSource`], and
//! [`FixedLocaleSource`] are the implementations used by the CLI and tests.

use crate::locale::{self, LocaleId, LocaleSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        collaborator: &'static str,
        reason: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate page id {0}")]
    DuplicatePage(PageId),
    #[error("Pages {existing} and {duplicate} are both the '{locale}' translation of '{key}'")]
    DuplicateTranslation {
        key: String,
        locale: LocaleId,
        existing: PageId,
        duplicate: PageId,
    },
}

/// Opaque page identity. Each translation of a page is a distinct page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the resolver needs to know about one translation of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub id: PageId,
    pub title: String,
    /// Absolute, locale-correct URL path (e.g. `/fr/a-propos/`).
    pub url: String,
    pub live: bool,
}

/// The page currently being served, plus what locale negotiation looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub path: String,
    pub page: Option<PageId>,
    pub accept_language: Option<String>,
}

impl RequestContext {
    pub fn for_page(path: impl Into<String>, page: PageId) -> Self {
        Self {
            path: path.into(),
            page: Some(page),
            accept_language: None,
        }
    }
}

pub trait LocaleSource: Send + Sync {
    fn active_locale(&self, request: &RequestContext) -> Result<LocaleId, SourceError>;
    fn default_locale(&self) -> Result<LocaleId, SourceError>;
}

pub trait PageSource: Send + Sync {
    /// The translation of `page` in `locale`, live or not.
    ///
    /// Returns the page itself when it is already in `locale`, `Ok(None)` when
    /// the page is unknown or has no translation there.
    fn translation(&self, page: PageId, locale: &LocaleId)
    -> Result<Option<PageView>, SourceError>;
}

/// Locale source driven by [`LocaleSettings`] and [`locale::negotiate`].
#[derive(Debug, Clone)]
pub struct NegotiatingLocaleSource {
    settings: LocaleSettings,
}

impl NegotiatingLocaleSource {
    pub fn new(settings: LocaleSettings) -> Self {
        Self { settings }
    }
}

impl LocaleSource for NegotiatingLocaleSource {
    fn active_locale(&self, request: &RequestContext) -> Result<LocaleId, SourceError> {
        Ok(locale::negotiate(
            &self.settings,
            &request.path,
            request.accept_language.as_deref(),
        ))
    }

    fn default_locale(&self) -> Result<LocaleId, SourceError> {
        Ok(self.settings.default_language.clone())
    }
}

/// Locale source that ignores the request (explicit `--locale` on the CLI).
#[derive(Debug, Clone)]
pub struct FixedLocaleSource {
    pub active: LocaleId,
    pub default: LocaleId,
}

impl LocaleSource for FixedLocaleSource {
    fn active_locale(&self, _request: &RequestContext) -> Result<LocaleId, SourceError> {
        Ok(self.active.clone())
    }

    fn default_locale(&self) -> Result<LocaleId, SourceError> {
        Ok(self.default.clone())
    }
}

/// One page as stored in a pages document.
///
/// Pages sharing a `translation_key` are translations of each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageRecord {
    pub id: PageId,
    pub translation_key: String,
    pub locale: LocaleId,
    pub title: String,
    pub url: String,
    #[serde(default = "default_live")]
    pub live: bool,
}

fn default_live() -> bool {
    true
}

impl PageRecord {
    fn view(&self) -> PageView {
        PageView {
            id: self.id,
            title: self.title.clone(),
            url: self.url.clone(),
            live: self.live,
        }
    }
}

/// Page source backed by a list of [`PageRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPageSource {
    pages: HashMap<PageId, PageRecord>,
    /// `(translation_key, locale)` → page id
    translations: HashMap<(String, LocaleId), PageId>,
}

impl InMemoryPageSource {
    pub fn new(records: Vec<PageRecord>) -> Result<Self, SourceError> {
        let mut source = Self::default();
        for record in records {
            source.insert(record)?;
        }
        Ok(source)
    }

    /// Parse a JSON array of page records.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let records: Vec<PageRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn insert(&mut self, record: PageRecord) -> Result<(), SourceError> {
        if self.pages.contains_key(&record.id) {
            return Err(SourceError::DuplicatePage(record.id));
        }
        let slot = (record.translation_key.clone(), record.locale.clone());
        if let Some(&existing) = self.translations.get(&slot) {
            return Err(SourceError::DuplicateTranslation {
                key: record.translation_key,
                locale: record.locale,
                existing,
                duplicate: record.id,
            });
        }
        self.translations.insert(slot, record.id);
        self.pages.insert(record.id, record);
        Ok(())
    }

    /// Publish or unpublish a page. Returns false if the page is unknown.
    pub fn set_live(&mut self, page: PageId, live: bool) -> bool {
        match self.pages.get_mut(&page) {
            Some(record) => {
                record.live = live;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, page: PageId) -> Option<&PageRecord> {
        self.pages.get(&page)
    }

    /// Live pages in `locale`, ordered by id.
    pub fn live_pages_in(&self, locale: &LocaleId) -> Vec<&PageRecord> {
        let mut pages: Vec<&PageRecord> = self
            .pages
            .values()
            .filter(|p| p.live && &p.locale == locale)
            .collect();
        pages.sort_by_key(|p| p.id);
        pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageSource for InMemoryPageSource {
    fn translation(
        &self,
        page: PageId,
        locale: &LocaleId,
    ) -> Result<Option<PageView>, SourceError> {
        let Some(record) = self.pages.get(&page) else {
            return Ok(None);
        };
        if &record.locale == locale {
            return Ok(Some(record.view()));
        }
        let key = (record.translation_key.clone(), locale.clone());
        Ok(self
            .translations
            .get(&key)
            .and_then(|id| self.pages.get(id))
            .map(PageRecord::view))
    }
}
