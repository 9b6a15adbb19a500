//! Request-time menu resolution.
//!
//! Turns the site's [`MenuConfiguration`] into the render model for one
//! request: every label and URL in the right language, every dead reference
//! removed, and the current page marked.
//!
//! ## Rules
//!
//! - **Page link**: use the page's translation in the active locale if it is
//!   live, otherwise its translation in the default locale if that is live,
//!   otherwise drop the link. A visitor never sees a link to a missing page.
//! - **External link**: always kept, URL untouched, never current.
//! - **Dropdown**: children resolved with the same rules. A dropdown left
//!   with no children is dropped; otherwise it is open when a child is current.
//!
//! Configuration order is preserved at both levels.
//!
//! ## Labels
//!
//! A configured label is chosen in this order: override for the active
//! locale, override for the default locale, the literal configured label.
//! Page links may leave the literal out; after any overrides they then use
//! the resolved page's own title, which is already in the right language.
//!
//! ## Failure
//!
//! Content problems never fail a resolution; they only make the tree smaller.
//! The only error is a [`SourceError`] from a collaborator, which fails the
//! whole resolution so the caller can decide how to render the page without
//! navigation.
//!
//! ## Two Passes
//!
//! [`resolve`] is [`resolve_locale`] (everything that depends on locale and
//! page state) followed by [`mark_current`] (everything that depends on the
//! request). The split lets [`crate::cache::MenuCache`] reuse the first pass.

use crate::locale::LocaleId;
use crate::schema::{ChildItem, Dropdown, ExternalLink, MenuConfiguration, PageLink, TopLevelItem};
use crate::sources::{LocaleSource, PageId, PageSource, PageView, RequestContext, SourceError};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("navigation source failed: {0}")]
    Source(#[from] SourceError),
}

/// A resolved top-level entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderItem {
    PageLink(RenderLink),
    ExternalLink(RenderLink),
    Dropdown(RenderDropdown),
}

/// A resolved dropdown entry. Like [`ChildItem`], it cannot be a dropdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderChild {
    PageLink(RenderLink),
    ExternalLink(RenderLink),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderLink {
    /// Final href, fragment included.
    pub url: String,
    pub label: String,
    pub is_current: bool,
    /// The page actually linked (after locale fallback). `None` for external links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderDropdown {
    pub label: String,
    pub children: Vec<RenderChild>,
    /// True when one of the children is the current page.
    pub is_open: bool,
}

impl RenderItem {
    pub fn label(&self) -> &str {
        match self {
            RenderItem::PageLink(link) | RenderItem::ExternalLink(link) => &link.label,
            RenderItem::Dropdown(dropdown) => &dropdown.label,
        }
    }

    pub fn is_current(&self) -> bool {
        match self {
            RenderItem::PageLink(link) | RenderItem::ExternalLink(link) => link.is_current,
            RenderItem::Dropdown(_) => false,
        }
    }
}

impl RenderChild {
    pub fn link(&self) -> &RenderLink {
        match self {
            RenderChild::PageLink(link) | RenderChild::ExternalLink(link) => link,
        }
    }

    fn link_mut(&mut self) -> &mut RenderLink {
        match self {
            RenderChild::PageLink(link) | RenderChild::ExternalLink(link) => link,
        }
    }
}

/// The two locales a resolution consults, in lookup order.
struct Locales<'a> {
    active: &'a LocaleId,
    default: &'a LocaleId,
}

impl Locales<'_> {
    /// Active first, then default unless it is the same locale.
    fn chain(&self) -> impl Iterator<Item = &LocaleId> {
        std::iter::once(self.active).chain((self.default != self.active).then_some(self.default))
    }

    fn translated<'l>(&self, translations: &'l BTreeMap<LocaleId, String>) -> Option<&'l str> {
        self.chain()
            .find_map(|locale| translations.get(locale))
            .map(String::as_str)
    }

    fn label<'l>(&self, literal: &'l str, translations: &'l BTreeMap<LocaleId, String>) -> &'l str {
        self.translated(translations).unwrap_or(literal)
    }
}

/// Resolve the menu for one request.
///
/// `current` is the page being served; it is compared against the page each
/// link resolves to, whichever locale that page ended up in.
pub fn resolve(
    config: &MenuConfiguration,
    pages: &dyn PageSource,
    active: &LocaleId,
    default: &LocaleId,
    current: Option<PageId>,
) -> Result<Vec<RenderItem>, ResolveError> {
    let mut items = resolve_locale(config, pages, active, default)?;
    mark_current(&mut items, current);
    Ok(items)
}

/// Resolve using the request to find the active locale and current page.
pub fn resolve_request(
    config: &MenuConfiguration,
    locales: &dyn LocaleSource,
    pages: &dyn PageSource,
    request: &RequestContext,
) -> Result<Vec<RenderItem>, ResolveError> {
    let active = locales.active_locale(request)?;
    let default = locales.default_locale()?;
    debug!(path = %request.path, active = %active, default = %default, "resolving menu");
    resolve(config, pages, &active, &default, request.page)
}

/// Locale-dependent pass: filter and localize, with nothing marked current.
pub fn resolve_locale(
    config: &MenuConfiguration,
    pages: &dyn PageSource,
    active: &LocaleId,
    default: &LocaleId,
) -> Result<Vec<RenderItem>, ResolveError> {
    let locales = Locales { active, default };
    let mut items = Vec::with_capacity(config.items.len());
    for item in &config.items {
        let resolved = match item {
            TopLevelItem::PageLink(link) => {
                resolve_page_link(link, &locales, pages)?.map(RenderItem::PageLink)
            }
            TopLevelItem::ExternalLink(link) => {
                Some(RenderItem::ExternalLink(resolve_external_link(link, &locales)))
            }
            TopLevelItem::Dropdown(dropdown) => {
                resolve_dropdown(dropdown, &locales, pages)?.map(RenderItem::Dropdown)
            }
        };
        items.extend(resolved);
    }
    Ok(items)
}

/// Request-dependent pass: set `is_current` and `is_open` for `current`.
///
/// Clears any previous marking, so it can be applied to a reused tree.
pub fn mark_current(items: &mut [RenderItem], current: Option<PageId>) {
    let is_served = |link: &RenderLink| current.is_some() && link.page == current;
    for item in items {
        match item {
            RenderItem::PageLink(link) | RenderItem::ExternalLink(link) => {
                link.is_current = is_served(link);
            }
            RenderItem::Dropdown(dropdown) => {
                let mut any_current = false;
                for child in &mut dropdown.children {
                    let link = child.link_mut();
                    link.is_current = is_served(link);
                    any_current |= link.is_current;
                }
                dropdown.is_open = any_current;
            }
        }
    }
}

fn resolve_page_link(
    link: &PageLink,
    locales: &Locales<'_>,
    pages: &dyn PageSource,
) -> Result<Option<RenderLink>, SourceError> {
    let Some(view) = live_translation(link.page, locales, pages)? else {
        debug!(page = %link.page, active = %locales.active, "dropping page link without a live translation");
        return Ok(None);
    };
    let label = locales
        .translated(&link.title_translations)
        .or(link.custom_title.as_deref())
        .unwrap_or(&view.title)
        .to_string();
    Ok(Some(RenderLink {
        url: with_anchor(&view.url, link.anchor.as_deref()),
        label,
        is_current: false,
        page: Some(view.id),
    }))
}

fn resolve_external_link(link: &ExternalLink, locales: &Locales<'_>) -> RenderLink {
    RenderLink {
        url: with_anchor(&link.url, link.anchor.as_deref()),
        label: locales.label(&link.title, &link.title_translations).to_string(),
        is_current: false,
        page: None,
    }
}

fn resolve_dropdown(
    dropdown: &Dropdown,
    locales: &Locales<'_>,
    pages: &dyn PageSource,
) -> Result<Option<RenderDropdown>, SourceError> {
    let mut children = Vec::with_capacity(dropdown.items.len());
    for child in &dropdown.items {
        let resolved = match child {
            ChildItem::PageLink(link) => {
                resolve_page_link(link, locales, pages)?.map(RenderChild::PageLink)
            }
            ChildItem::ExternalLink(link) => {
                Some(RenderChild::ExternalLink(resolve_external_link(link, locales)))
            }
        };
        children.extend(resolved);
    }
    if children.is_empty() {
        debug!(title = %dropdown.title, "dropping dropdown with no live children");
        return Ok(None);
    }
    Ok(Some(RenderDropdown {
        label: locales.label(&dropdown.title, &dropdown.title_translations).to_string(),
        children,
        is_open: false,
    }))
}

/// First live translation along the locale chain.
fn live_translation(
    page: PageId,
    locales: &Locales<'_>,
    pages: &dyn PageSource,
) -> Result<Option<PageView>, SourceError> {
    for locale in locales.chain() {
        if let Some(view) = pages.translation(page, locale)?
            && view.live
        {
            if locale != locales.active {
                trace!(page = %page, fallback = %locale, resolved = %view.id, "using default-locale translation");
            }
            return Ok(Some(view));
        }
    }
    Ok(None)
}

/// Append `#anchor`, replacing any fragment already on the URL.
fn with_anchor(url: &str, anchor: Option<&str>) -> String {
    match anchor.map(|a| a.trim_start_matches('#')).filter(|a| !a.is_empty()) {
        Some(anchor) => {
            let base = url.split('#').next().unwrap_or(url);
            format!("{base}#{anchor}")
        }
        None => url.to_string(),
    }
}
