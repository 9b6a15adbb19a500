//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entry leads with its position and label, the way a visitor or an
//! editor would name it. Targets (page ids, URLs, output files) follow as
//! indented context lines or after an arrow.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Menu
//! 001 About (Page Link)
//!     Page: 1
//! 002 Programs (Dropdown Menu, 2 items)
//!     Translations: es
//!     001 Overview (Page Link)
//!         Page: 3
//!     002 (page 5) (Page Link)
//!         Page: 5
//! 003 Community Calendar (External Link)
//!     URL: https://example.org/calendar/
//!
//! Valid: 3 items, 3 pages referenced
//! Languages: English (en, default), Spanish / Español (es)
//! ```
//!
//! ## Resolve
//!
//! ```text
//! Menu (es)
//! 001 Acerca de → /es/acerca-de/
//! 002 Programas [open]
//!     001 Resumen → /es/programas/
//!     002 Educación de adultos → /es/programas/educacion-de-adultos/ [current]
//! 003 Calendario comunitario → https://example.org/calendar/ (external)
//! ```
//!
//! ## Build
//!
//! ```text
//! en
//!     001 About → en/about/index.html
//!     002 Programs → en/programs/index.html
//! es
//!     001 Acerca de → es/acerca-de/index.html
//!
//! Generated 3 pages in 2 locales
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::BuildReport;
use crate::locale::{LocaleId, LocaleSettings};
use crate::resolve::{RenderChild, RenderItem, RenderLink};
use crate::schema::{ChildItem, ExternalLink, MenuConfiguration, PageLink, SchemaProblem, TopLevelItem};
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

fn translations_line(depth: usize, translations: &BTreeMap<LocaleId, String>) -> Option<String> {
    if translations.is_empty() {
        return None;
    }
    let locales: Vec<&str> = translations.keys().map(LocaleId::as_str).collect();
    Some(format!("{}Translations: {}", indent(depth), locales.join(", ")))
}

// ============================================================================
// Check
// ============================================================================

/// Page links without a custom title show the page id in parens: the title
/// comes from the page at request time.
fn page_link_lines(index: usize, depth: usize, link: &PageLink) -> Vec<String> {
    let title = match &link.custom_title {
        Some(title) => title.clone(),
        None => format!("(page {})", link.page),
    };
    let mut lines = vec![format!(
        "{}{} {} (Page Link)",
        indent(depth),
        format_index(index),
        title
    )];
    lines.push(format!("{}Page: {}", indent(depth + 1), link.page));
    if let Some(anchor) = &link.anchor {
        lines.push(format!("{}Anchor: #{}", indent(depth + 1), anchor));
    }
    lines.extend(translations_line(depth + 1, &link.title_translations));
    lines
}

fn external_link_lines(index: usize, depth: usize, link: &ExternalLink) -> Vec<String> {
    let mut lines = vec![format!(
        "{}{} {} (External Link)",
        indent(depth),
        format_index(index),
        link.title
    )];
    lines.push(format!("{}URL: {}", indent(depth + 1), link.url));
    if let Some(anchor) = &link.anchor {
        lines.push(format!("{}Anchor: #{}", indent(depth + 1), anchor));
    }
    lines.extend(translations_line(depth + 1, &link.title_translations));
    lines
}

/// Inventory of a menu document followed by its validation result.
pub fn format_check_output(menu: &MenuConfiguration, problems: &[SchemaProblem]) -> Vec<String> {
    let mut lines = vec!["Menu".to_string()];
    if menu.items.is_empty() {
        lines.push(format!("{}(empty)", indent(1)));
    }

    for (i, item) in menu.items.iter().enumerate() {
        match item {
            TopLevelItem::PageLink(link) => lines.extend(page_link_lines(i + 1, 0, link)),
            TopLevelItem::ExternalLink(link) => lines.extend(external_link_lines(i + 1, 0, link)),
            TopLevelItem::Dropdown(dropdown) => {
                lines.push(format!(
                    "{} {} (Dropdown Menu, {})",
                    format_index(i + 1),
                    dropdown.title,
                    plural(dropdown.items.len(), "item", "items")
                ));
                lines.extend(translations_line(1, &dropdown.title_translations));
                for (j, child) in dropdown.items.iter().enumerate() {
                    match child {
                        ChildItem::PageLink(link) => lines.extend(page_link_lines(j + 1, 1, link)),
                        ChildItem::ExternalLink(link) => {
                            lines.extend(external_link_lines(j + 1, 1, link))
                        }
                    }
                }
            }
        }
    }

    lines.push(String::new());
    if problems.is_empty() {
        let pages = menu.referenced_pages().len();
        lines.push(format!(
            "Valid: {}, {} referenced",
            plural(menu.items.len(), "item", "items"),
            plural(pages, "page", "pages")
        ));
    } else {
        lines.push(format!("Problems ({})", problems.len()));
        for problem in problems {
            lines.push(format!("{}{}", indent(1), problem));
        }
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(menu: &MenuConfiguration, problems: &[SchemaProblem]) {
    for line in format_check_output(menu, problems) {
        println!("{}", line);
    }
}

/// The languages menus are resolved in, with the default marked.
pub fn format_languages_line(settings: &LocaleSettings) -> String {
    let languages: Vec<String> = settings
        .available_languages_list()
        .into_iter()
        .map(|(code, name)| {
            if code == settings.default_language.as_str() {
                format!("{} ({}, default)", name, code)
            } else {
                format!("{} ({})", name, code)
            }
        })
        .collect();
    format!("Languages: {}", languages.join(", "))
}

// ============================================================================
// Resolve
// ============================================================================

fn link_line(index: usize, depth: usize, link: &RenderLink, external: bool) -> String {
    let mut line = format!(
        "{}{} {} → {}",
        indent(depth),
        format_index(index),
        link.label,
        link.url
    );
    if external {
        line.push_str(" (external)");
    }
    if link.is_current {
        line.push_str(" [current]");
    }
    line
}

/// The render tree one request would see.
pub fn format_resolve_output(items: &[RenderItem], locale: &LocaleId) -> Vec<String> {
    let mut lines = vec![format!("Menu ({})", locale)];
    if items.is_empty() {
        lines.push(format!("{}(empty)", indent(1)));
    }

    for (i, item) in items.iter().enumerate() {
        match item {
            RenderItem::PageLink(link) => lines.push(link_line(i + 1, 0, link, false)),
            RenderItem::ExternalLink(link) => lines.push(link_line(i + 1, 0, link, true)),
            RenderItem::Dropdown(dropdown) => {
                let open = if dropdown.is_open { " [open]" } else { "" };
                lines.push(format!("{} {}{}", format_index(i + 1), dropdown.label, open));
                for (j, child) in dropdown.children.iter().enumerate() {
                    let external = matches!(child, RenderChild::ExternalLink(_));
                    lines.push(link_line(j + 1, 1, child.link(), external));
                }
            }
        }
    }
    lines
}

/// Print resolve output to stdout.
pub fn print_resolve_output(items: &[RenderItem], locale: &LocaleId) {
    for line in format_resolve_output(items, locale) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Written documents grouped by locale, then a summary line.
pub fn format_build_output(report: &BuildReport, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_locale: Option<&LocaleId> = None;
    let mut index = 0;

    for page in &report.pages {
        if current_locale != Some(&page.locale) {
            lines.push(page.locale.to_string());
            current_locale = Some(&page.locale);
            index = 0;
        }
        index += 1;
        lines.push(format!(
            "{}{} {} → {}",
            indent(1),
            format_index(index),
            page.title,
            page.output.display()
        ));
    }

    if !report.pages.is_empty() {
        lines.push(String::new());
    }
    let mut summary = format!(
        "Generated {} in {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.locale_count(), "locale", "locales")
    );
    if let Some(cache) = &report.cache {
        summary.push_str(&format!(" (menus: {})", cache));
    }
    lines.push(summary);
    lines.push(format!("Output: {}", output_dir.display()));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport, output_dir: &Path) {
    for line in format_build_output(report, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
