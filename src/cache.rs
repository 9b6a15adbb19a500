//! Resolution cache.
//!
//! Resolving a menu costs one page lookup per link per locale tried. On a
//! busy site the answer is the same for every request in a locale until an
//! editor changes the menu or publishes a page, so [`MenuCache`] keeps the
//! locale pass of [`resolve`](crate::resolve::resolve) and only re-applies the
//! per-request current-page marking.
//!
//! # Design
//!
//! ## Cache keys
//!
//! Entries are keyed by **(site, active locale)**. Each entry is tagged with
//! a fingerprint:
//!
//! - **`fingerprint`**: SHA-256 over every field of the menu configuration
//!   plus the default locale. Editing the menu (or changing the default
//!   locale) changes the fingerprint, and the stale entry is recomputed on
//!   its next lookup. Nothing has to be invalidated by hand.
//!
//! Page state is not fingerprinted: the cache cannot see into the page
//! source. Whoever publishes, unpublishes or retranslates a page must call
//! [`MenuCache::invalidate_site`].
//!
//! ## What is stored
//!
//! The tree from [`resolve_locale`], with nothing marked current. Lookups
//! clone it and run [`mark_current`] for the request, so one entry serves
//! every page in the locale.
//!
//! Failed resolutions are never stored.
//!
//! ## Concurrency
//!
//! Entries sit behind a `parking_lot::RwLock`; lookups share the read lock.
//! Two requests that miss at the same time both resolve, and the last write
//! wins. Both computed the same tree.

use crate::locale::LocaleId;
use crate::resolve::{RenderItem, ResolveError, mark_current, resolve_locale};
use crate::schema::{ChildItem, ExternalLink, MenuConfiguration, PageLink, TopLevelItem};
use crate::sources::{PageId, PageSource};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub site: String,
    pub locale: LocaleId,
}

#[derive(Debug, Clone)]
struct CachedTree {
    fingerprint: String,
    items: Vec<RenderItem>,
}

/// Cached locale passes for any number of sites.
#[derive(Debug, Default)]
pub struct MenuCache {
    entries: RwLock<HashMap<CacheKey, CachedTree>>,
    stats: CacheStats,
}

impl MenuCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same result as [`crate::resolve::resolve`], reusing the locale pass
    /// when the menu has not changed since it was stored.
    pub fn resolve(
        &self,
        site: &str,
        config: &MenuConfiguration,
        pages: &dyn PageSource,
        active: &LocaleId,
        default: &LocaleId,
        current: Option<PageId>,
    ) -> Result<Vec<RenderItem>, ResolveError> {
        let fingerprint = config_fingerprint(config, default);
        let key = CacheKey {
            site: site.to_string(),
            locale: active.clone(),
        };

        let cached = self
            .entries
            .read()
            .get(&key)
            .filter(|tree| tree.fingerprint == fingerprint)
            .map(|tree| tree.items.clone());

        let mut items = match cached {
            Some(items) => {
                self.stats.hit();
                trace!(site, locale = %active, "menu cache hit");
                items
            }
            None => {
                self.stats.miss();
                trace!(site, locale = %active, "menu cache miss");
                let items = resolve_locale(config, pages, active, default)?;
                self.entries.write().insert(
                    key,
                    CachedTree {
                        fingerprint,
                        items: items.clone(),
                    },
                );
                items
            }
        };

        mark_current(&mut items, current);
        Ok(items)
    }

    /// Drop every locale cached for `site`. Returns how many entries went.
    pub fn invalidate_site(&self, site: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.site != site);
        let removed = before - entries.len();
        trace!(site, removed, "menu cache invalidated");
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// SHA-256 of a menu configuration and the default locale, as hex.
///
/// Strings are length-prefixed and optional fields carry a presence byte, so
/// moving text between adjacent fields changes the hash.
pub fn config_fingerprint(config: &MenuConfiguration, default: &LocaleId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"menu\0");
    hash_str(&mut hasher, default.as_str());
    hash_len(&mut hasher, config.items.len());
    for item in &config.items {
        match item {
            TopLevelItem::PageLink(link) => hash_page_link(&mut hasher, link),
            TopLevelItem::ExternalLink(link) => hash_external_link(&mut hasher, link),
            TopLevelItem::Dropdown(dropdown) => {
                hasher.update(b"dropdown\0");
                hash_str(&mut hasher, &dropdown.title);
                hash_translations(&mut hasher, &dropdown.title_translations);
                hash_len(&mut hasher, dropdown.items.len());
                for child in &dropdown.items {
                    match child {
                        ChildItem::PageLink(link) => hash_page_link(&mut hasher, link),
                        ChildItem::ExternalLink(link) => hash_external_link(&mut hasher, link),
                    }
                }
            }
        }
    }
    format!("{:x}", hasher.finalize())
}

fn hash_page_link(hasher: &mut Sha256, link: &PageLink) {
    hasher.update(b"page_link\0");
    hasher.update(link.page.0.to_le_bytes());
    hash_opt(hasher, link.custom_title.as_deref());
    hash_opt(hasher, link.anchor.as_deref());
    hash_translations(hasher, &link.title_translations);
}

fn hash_external_link(hasher: &mut Sha256, link: &ExternalLink) {
    hasher.update(b"external_link\0");
    hash_str(hasher, &link.url);
    hash_str(hasher, &link.title);
    hash_opt(hasher, link.anchor.as_deref());
    hash_translations(hasher, &link.title_translations);
}

fn hash_translations(hasher: &mut Sha256, translations: &BTreeMap<LocaleId, String>) {
    hash_len(hasher, translations.len());
    for (locale, title) in translations {
        hash_str(hasher, locale.as_str());
        hash_str(hasher, title);
    }
}

fn hash_len(hasher: &mut Sha256, len: usize) {
    hasher.update((len as u64).to_le_bytes());
}

fn hash_str(hasher: &mut Sha256, value: &str) {
    hash_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn hash_opt(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update(b"\x01");
            hash_str(hasher, value);
        }
        None => {
            hasher.update(b"\x00");
        }
    }
}

/// Hit and miss counters, shared across threads.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.hits() + self.misses()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits() > 0 {
            write!(
                f,
                "{} cached, {} resolved ({} total)",
                self.hits(),
                self.misses(),
                self.total()
            )
        } else {
            write!(f, "{} resolved", self.misses())
        }
    }
}
