//! Sample site for demos and manual testing.
//!
//! A small English/Spanish site with every kind of menu entry:
//!
//! ```text
//! About                        page link
//! Programs ▾                   dropdown
//!     Overview                 page link with a custom title
//!     Adult Education
//!     Youth Programs           no Spanish translation: falls back to English
//! Community Calendar           external link
//! Contact                      Spanish translation is a draft: falls back
//! ```
//!
//! [`write_sample_site`] writes `menu.json`, `pages.json` and `config.toml`
//! so the other CLI commands can run against it.

use crate::config;
use crate::locale::LocaleId;
use crate::schema::{Dropdown, ExternalLink, MenuConfiguration, PageLink, SchemaError};
use crate::sources::{PageId, PageRecord};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MENU_FILE: &str = "menu.json";
pub const PAGES_FILE: &str = "pages.json";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Schema(#[from] SchemaError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{} already exists (use --force to overwrite)", .0.display())]
    Exists(PathBuf),
}

fn record(id: u64, key: &str, locale: &str, title: &str, url: &str, live: bool) -> PageRecord {
    PageRecord {
        id: PageId(id),
        translation_key: key.to_string(),
        locale: LocaleId::new(locale),
        title: title.to_string(),
        url: url.to_string(),
        live,
    }
}

pub fn sample_pages() -> Vec<PageRecord> {
    vec![
        record(1, "about", "en", "About", "/en/about/", true),
        record(2, "about", "es", "Acerca de", "/es/acerca-de/", true),
        record(3, "programs", "en", "Programs", "/en/programs/", true),
        record(4, "programs", "es", "Programas", "/es/programas/", true),
        record(5, "adult-education", "en", "Adult Education", "/en/programs/adult-education/", true),
        record(6, "adult-education", "es", "Educación de adultos", "/es/programas/educacion-de-adultos/", true),
        record(7, "youth-programs", "en", "Youth Programs", "/en/programs/youth-programs/", true),
        record(8, "contact", "en", "Contact", "/en/contact/", true),
        record(9, "contact", "es", "Contacto", "/es/contacto/", false),
    ]
}

pub fn sample_menu() -> MenuConfiguration {
    MenuConfiguration::new(vec![
        PageLink::new(PageId(1)).into(),
        Dropdown::new(
            "Programs",
            vec![
                PageLink::new(PageId(3))
                    .with_title("Overview")
                    .with_title_translation("es", "Resumen")
                    .into(),
                PageLink::new(PageId(5)).into(),
                PageLink::new(PageId(7)).into(),
            ],
        )
        .with_title_translation("es", "Programas")
        .into(),
        ExternalLink::new("https://example.org/calendar/", "Community Calendar")
            .with_title_translation("es", "Calendario comunitario")
            .into(),
        PageLink::new(PageId(8)).into(),
    ])
}

/// Stock config with Spanish added to the published languages.
fn sample_config_toml() -> String {
    config::stock_config_toml().replace(
        r#"available_languages = ["en"]"#,
        r#"available_languages = ["en", "es"]"#,
    )
}

/// Write the sample site into `dir`, creating it if needed.
///
/// Refuses to overwrite existing files unless `force` is set. Returns the
/// paths written.
pub fn write_sample_site(dir: &Path, force: bool) -> Result<Vec<PathBuf>, ScaffoldError> {
    let files = [
        (dir.join(MENU_FILE), sample_menu().to_json_pretty()?),
        (dir.join(PAGES_FILE), serde_json::to_string_pretty(&sample_pages())?),
        (dir.join(CONFIG_FILE), sample_config_toml()),
    ];

    if !force && let Some((path, _)) = files.iter().find(|(path, _)| path.exists()) {
        return Err(ScaffoldError::Exists(path.clone()));
    }

    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        fs::write(&path, content)?;
        written.push(path);
    }
    Ok(written)
}
