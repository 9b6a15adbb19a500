//! Static preview generation.
//!
//! Renders a preview document for every live page in every available locale,
//! each with the navigation resolved for that page: the right language, dead
//! links gone, the page itself marked current. Useful to review a menu
//! before it goes live, or to serve a small static site as is.
//!
//! ## Output Structure
//!
//! Each page is written where its URL points:
//!
//! ```text
//! dist/
//! ├── en/
//! │   ├── index.html             # /en/
//! │   └── about/
//! │       └── index.html         # /en/about/
//! └── fr/
//!     ├── index.html             # /fr/
//!     └── a-propos/
//!         └── index.html         # /fr/a-propos/
//! ```
//!
//! URLs ending in `.html` are written to that file instead.
//!
//! ## Parallelism
//!
//! Pages render in parallel with [rayon](https://docs.rs/rayon). With
//! `[cache] enabled = true`, all pages in a locale share one
//! [`MenuCache`] entry and only current-page marking runs per page.

use crate::cache::MenuCache;
use crate::config::SiteConfig;
use crate::locale::LocaleId;
use crate::render::render_preview_document;
use crate::resolve::{self, RenderItem, ResolveError};
use crate::schema::MenuConfiguration;
use crate::sources::{InMemoryPageSource, PageId, PageRecord};
use rayon::prelude::*;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Cache key for the single site a build covers.
const SITE: &str = "preview";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Menu resolution failed for {locale}: {source}")]
    Resolve {
        locale: LocaleId,
        #[source]
        source: ResolveError,
    },
    #[error("Page {page} has URL '{url}', which does not map to a file in the output directory")]
    UnmappableUrl { page: PageId, url: String },
}

/// One written document.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPage {
    pub locale: LocaleId,
    pub page: PageId,
    pub title: String,
    /// Relative to the output directory.
    pub output: PathBuf,
    /// Top-level menu entries left after resolution.
    pub menu_items: usize,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    /// Grouped by locale in configuration order, then by page id.
    pub pages: Vec<BuiltPage>,
    /// Cache summary, when the cache was enabled.
    pub cache: Option<String>,
}

impl BuildReport {
    pub fn locale_count(&self) -> usize {
        let mut locales: Vec<&LocaleId> = self.pages.iter().map(|p| &p.locale).collect();
        locales.dedup();
        locales.len()
    }
}

pub fn generate(
    menu: &MenuConfiguration,
    pages: &InMemoryPageSource,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<BuildReport, GenerateError> {
    let default = &config.locales.default_language;
    let cache = config.cache.enabled.then(MenuCache::new);

    // A repeated locale would send two workers to the same file.
    let mut locales: Vec<&LocaleId> = Vec::new();
    for locale in &config.locales.available_languages {
        if !locales.contains(&locale) {
            locales.push(locale);
        }
    }
    let jobs: Vec<(&LocaleId, &PageRecord)> = locales
        .into_iter()
        .flat_map(|locale| pages.live_pages_in(locale).into_iter().map(move |p| (locale, p)))
        .collect();
    debug!(pages = jobs.len(), "rendering previews");

    fs::create_dir_all(output_dir)?;

    let built = jobs
        .par_iter()
        .map(|(locale, record)| {
            let items = resolve_for_page(menu, pages, cache.as_ref(), locale, default, record.id)
                .map_err(|source| GenerateError::Resolve {
                    locale: (*locale).clone(),
                    source,
                })?;
            write_page(&items, config, locale, record, output_dir)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let report = BuildReport {
        pages: built,
        cache: cache.map(|c| c.stats().to_string()),
    };
    info!(
        pages = report.pages.len(),
        locales = report.locale_count(),
        output = %output_dir.display(),
        "previews generated"
    );
    Ok(report)
}

fn resolve_for_page(
    menu: &MenuConfiguration,
    pages: &InMemoryPageSource,
    cache: Option<&MenuCache>,
    locale: &LocaleId,
    default: &LocaleId,
    current: PageId,
) -> Result<Vec<RenderItem>, ResolveError> {
    match cache {
        Some(cache) => cache.resolve(SITE, menu, pages, locale, default, Some(current)),
        None => resolve::resolve(menu, pages, locale, default, Some(current)),
    }
}

fn write_page(
    items: &[RenderItem],
    config: &SiteConfig,
    locale: &LocaleId,
    record: &PageRecord,
    output_dir: &Path,
) -> Result<BuiltPage, GenerateError> {
    let relative = output_path_for_url(&record.url).ok_or_else(|| GenerateError::UnmappableUrl {
        page: record.id,
        url: record.url.clone(),
    })?;
    let path = output_dir.join(&relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let html = render_preview_document(items, config, &record.title, locale.as_str());
    fs::write(&path, html.into_string())?;
    debug!(page = %record.id, locale = %locale, path = %relative.display(), "wrote preview");

    Ok(BuiltPage {
        locale: locale.clone(),
        page: record.id,
        title: record.title.clone(),
        output: relative,
        menu_items: items.len(),
    })
}

/// Map a page URL to a file path relative to the output directory.
///
/// Only the path of the URL counts; scheme, host, query and fragment are
/// ignored. Returns `None` for paths that would escape the output directory.
pub fn output_path_for_url(url: &str) -> Option<PathBuf> {
    let without_scheme = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => url,
    };
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let mut relative = PathBuf::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match Path::new(segment).components().next() {
            Some(Component::Normal(_)) if !segment.contains('\\') => relative.push(segment),
            _ => return None,
        }
    }

    let is_file = relative
        .extension()
        .is_some_and(|ext| ext == "html" || ext == "htm");
    if !is_file {
        relative.push("index.html");
    }
    Some(relative)
}
