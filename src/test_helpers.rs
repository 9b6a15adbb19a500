//! Shared test utilities for the site-nav test suite.
//!
//! Provides page-record builders, locale shorthands, a failing page source,
//! and render-tree lookups and shape assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = page_source(vec![
//!     page(1, "about", "en", "About", "/en/about/"),
//!     page(2, "about", "fr", "À propos", "/fr/a-propos/"),
//! ]);
//! let items = resolve(&config, &source, &fr(), &en(), None).unwrap();
//!
//! assert_menu_shape(&items, &[
//!     ("À propos", &[]),
//!     ("Resources", &["Guide", "FAQ"]),
//! ]);
//! ```

use crate::locale::LocaleId;
use crate::resolve::{RenderDropdown, RenderItem, RenderLink};
use crate::sources::{InMemoryPageSource, PageId, PageRecord, PageSource, PageView, SourceError};

// =========================================================================
// Locales
// =========================================================================

pub fn en() -> LocaleId {
    LocaleId::new("en")
}

pub fn fr() -> LocaleId {
    LocaleId::new("fr")
}

pub fn es() -> LocaleId {
    LocaleId::new("es")
}

// =========================================================================
// Page sources
// =========================================================================

/// A live page record.
pub fn page(id: u64, key: &str, locale: &str, title: &str, url: &str) -> PageRecord {
    PageRecord {
        id: PageId(id),
        translation_key: key.to_string(),
        locale: LocaleId::new(locale),
        title: title.to_string(),
        url: url.to_string(),
        live: true,
    }
}

/// An unpublished page record.
pub fn draft(id: u64, key: &str, locale: &str, title: &str, url: &str) -> PageRecord {
    PageRecord {
        live: false,
        ..page(id, key, locale, title, url)
    }
}

/// Build an in-memory source. Panics on duplicate ids.
pub fn page_source(records: Vec<PageRecord>) -> InMemoryPageSource {
    InMemoryPageSource::new(records).unwrap_or_else(|e| panic!("bad test pages: {e}"))
}

/// A page repository that is down.
pub struct FailingPageSource;

impl PageSource for FailingPageSource {
    fn translation(&self, _page: PageId, _locale: &LocaleId) -> Result<Option<PageView>, SourceError> {
        Err(SourceError::Unavailable {
            collaborator: "page store",
            reason: "connection refused".to_string(),
        })
    }
}

// =========================================================================
// Render tree lookups (panic with a clear message on mismatch)
// =========================================================================

/// Unwrap a top-level page link.
pub fn page_link(item: &RenderItem) -> &RenderLink {
    match item {
        RenderItem::PageLink(link) => link,
        other => panic!("expected page link, got {other:?}"),
    }
}

/// Unwrap a top-level dropdown.
pub fn dropdown(item: &RenderItem) -> &RenderDropdown {
    match item {
        RenderItem::Dropdown(dropdown) => dropdown,
        other => panic!("expected dropdown, got {other:?}"),
    }
}

/// Top-level labels in order.
pub fn labels(items: &[RenderItem]) -> Vec<&str> {
    items.iter().map(RenderItem::label).collect()
}

/// Assert that the render tree matches an expected shape.
///
/// Each entry is `(label, children)`. Use `&[]` for links.
pub fn assert_menu_shape(items: &[RenderItem], expected: &[(&str, &[&str])]) {
    let expected_labels: Vec<&str> = expected.iter().map(|(l, _)| *l).collect();
    assert_eq!(labels(items), expected_labels, "menu top-level labels mismatch");

    for (item, (label, children)) in items.iter().zip(expected) {
        let actual_children: Vec<&str> = match item {
            RenderItem::Dropdown(dropdown) => dropdown
                .children
                .iter()
                .map(|c| c.link().label.as_str())
                .collect(),
            _ => Vec::new(),
        };
        assert_eq!(
            actual_children,
            children.to_vec(),
            "menu children of '{label}' mismatch"
        );
    }
}
