//! Navigation markup.
//!
//! Turns a resolved menu into HTML for both layouts at once. CSS decides
//! which one is visible (see [`crate::config::generate_layout_css`]).
//!
//! ## Desktop
//!
//! A horizontal `ul.menubar` inside `<nav aria-label=…>`. Links are plain
//! `<a href>`. A dropdown trigger is a `<button>`, never a link; it carries
//! `aria-haspopup`, `aria-expanded` and `aria-controls` pointing at the
//! overlay list it reveals.
//!
//! ## Mobile
//!
//! An off-canvas drawer opened by a checkbox and its label, with every
//! dropdown rendered as a native `<details>` accordion. Both work with
//! scripting disabled.
//!
//! ## Shared
//!
//! - A skip link to the main content is emitted before either landmark.
//! - The current page's link carries `aria-current="page"`.
//! - A dropdown that contains the current page starts open in both layouts.
//!
//! The embedded script (`static/nav.js`) layers hover, Escape, outside-click
//! and positioning behaviour on top of the desktop menubar. [`DisclosureState`]
//! models the per-dropdown states it moves between.

use crate::config::{self, NavConfig, SiteConfig};
use crate::resolve::{RenderChild, RenderDropdown, RenderItem, RenderLink};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../static/nav.css");
const JS: &str = include_str!("../static/nav.js");

// ============================================================================
// Disclosure state machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Desktop,
    Mobile,
}

/// Something the visitor does to a dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureEvent {
    PointerEnter,
    PointerLeave,
    /// Click, tap, Enter or Space on the trigger.
    Activate,
    Escape,
    /// Click or focus anywhere outside the dropdown.
    OutsideInteraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureState {
    Closed,
    Open,
}

impl DisclosureState {
    /// State a dropdown is rendered in.
    pub fn initial(is_open: bool) -> Self {
        if is_open {
            DisclosureState::Open
        } else {
            DisclosureState::Closed
        }
    }

    pub fn is_open(self) -> bool {
        self == DisclosureState::Open
    }

    /// Value of the `data-state` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            DisclosureState::Closed => "closed",
            DisclosureState::Open => "open",
        }
    }

    fn toggled(self) -> Self {
        match self {
            DisclosureState::Closed => DisclosureState::Open,
            DisclosureState::Open => DisclosureState::Closed,
        }
    }

    /// Desktop follows the pointer as well as explicit activation. Mobile
    /// accordions only change on activation, plus Escape to collapse.
    pub fn transition(self, layout: Layout, event: DisclosureEvent) -> Self {
        use DisclosureEvent::*;
        match (layout, event) {
            (_, Activate) => self.toggled(),
            (_, Escape) => DisclosureState::Closed,
            (Layout::Desktop, PointerEnter) => DisclosureState::Open,
            (Layout::Desktop, PointerLeave | OutsideInteraction) => DisclosureState::Closed,
            (Layout::Mobile, PointerEnter | PointerLeave | OutsideInteraction) => self,
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Id of the overlay list for the dropdown at `index` in the menubar.
pub fn popup_id(index: usize) -> String {
    format!("nav-dropdown-{index}")
}

fn aria_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Render the skip link plus the desktop and mobile navigation landmarks.
pub fn render_navigation(items: &[RenderItem], nav: &NavConfig) -> Markup {
    html! {
        a.skip-link href={ "#" (nav.main_content_id) } { (nav.skip_link_text) }
        nav.nav-desktop aria-label=(nav.desktop_label) {
            ul.menubar {
                @for (index, item) in items.iter().enumerate() {
                    (render_desktop_item(index, item))
                }
            }
        }
        nav.nav-mobile aria-label=(nav.mobile_label) {
            input.nav-toggle type="checkbox" id="nav-toggle" aria-controls="nav-drawer"
                aria-label=(nav.menu_toggle_label);
            label.nav-hamburger for="nav-toggle" aria-hidden="true" {
                span.hamburger-line {}
                span.hamburger-line {}
                span.hamburger-line {}
            }
            div.nav-drawer id="nav-drawer" {
                label.nav-close for="nav-toggle" {
                    span aria-hidden="true" { "×" }
                    span.visually-hidden { (nav.close_label) }
                }
                ul.drawer-list {
                    @for item in items {
                        (render_mobile_item(item))
                    }
                }
            }
        }
    }
}

fn render_desktop_item(index: usize, item: &RenderItem) -> Markup {
    match item {
        RenderItem::PageLink(link) => html! { li.menu-item { (render_link(link, false)) } },
        RenderItem::ExternalLink(link) => html! { li.menu-item { (render_link(link, true)) } },
        RenderItem::Dropdown(dropdown) => render_desktop_dropdown(index, dropdown),
    }
}

fn render_desktop_dropdown(index: usize, dropdown: &RenderDropdown) -> Markup {
    let state = DisclosureState::initial(dropdown.is_open);
    let popup = popup_id(index);
    html! {
        li.menu-item.has-dropdown.opens-down data-state=(state.as_str()) {
            button.dropdown-trigger type="button" aria-haspopup="true"
                aria-expanded=(aria_bool(state.is_open())) aria-controls=(popup) {
                (dropdown.label)
                span.caret aria-hidden="true" { "▾" }
            }
            ul.dropdown-menu id=(popup) {
                @for child in &dropdown.children {
                    li { (render_child(child)) }
                }
            }
        }
    }
}

fn render_mobile_item(item: &RenderItem) -> Markup {
    match item {
        RenderItem::PageLink(link) => html! { li { (render_link(link, false)) } },
        RenderItem::ExternalLink(link) => html! { li { (render_link(link, true)) } },
        RenderItem::Dropdown(dropdown) => html! {
            li {
                details.accordion open[dropdown.is_open] {
                    summary { (dropdown.label) }
                    ul.accordion-panel {
                        @for child in &dropdown.children {
                            li { (render_child(child)) }
                        }
                    }
                }
            }
        },
    }
}

fn render_child(child: &RenderChild) -> Markup {
    match child {
        RenderChild::PageLink(link) => render_link(link, false),
        RenderChild::ExternalLink(link) => render_link(link, true),
    }
}

fn render_link(link: &RenderLink, external: bool) -> Markup {
    html! {
        a.nav-link.external[external] href=(link.url)
            aria-current=[link.is_current.then_some("page")] {
            (link.label)
        }
    }
}

// ============================================================================
// Assets and documents
// ============================================================================

/// The client script, for pages that embed the navigation themselves.
pub fn nav_script() -> &'static str {
    JS
}

/// Color properties, layout switch and base styles, in cascade order.
pub fn nav_styles(config: &SiteConfig) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        config::generate_color_css(&config.colors),
        config::generate_layout_css(&config.nav),
        CSS_STATIC
    )
}

/// Base HTML document structure.
fn base_document(title: &str, lang: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// A standalone page showing the navigation above an empty main region.
///
/// Used by `render --document` and `build` to preview a menu in a browser.
pub fn render_preview_document(
    items: &[RenderItem],
    config: &SiteConfig,
    title: &str,
    lang: &str,
) -> Markup {
    let css = nav_styles(config);
    let content = html! {
        header.site-header {
            (render_navigation(items, &config.nav))
        }
        main id=(config.nav.main_content_id) tabindex="-1" {
            h1 { (title) }
        }
    };
    base_document(title, lang, &css, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::PageId;

    fn link(label: &str, url: &str, current: bool) -> RenderLink {
        RenderLink {
            url: url.to_string(),
            label: label.to_string(),
            is_current: current,
            page: Some(PageId(1)),
        }
    }

    fn external(label: &str, url: &str) -> RenderLink {
        RenderLink {
            url: url.to_string(),
            label: label.to_string(),
            is_current: false,
            page: None,
        }
    }

    fn sample_items(current_child: bool) -> Vec<RenderItem> {
        vec![
            RenderItem::PageLink(link("About", "/en/about/", false)),
            RenderItem::Dropdown(RenderDropdown {
                label: "Resources".to_string(),
                children: vec![
                    RenderChild::PageLink(link("Guide", "/en/guide/", false)),
                    RenderChild::PageLink(link("FAQ", "/en/faq/", current_child)),
                ],
                is_open: current_child,
            }),
            RenderItem::ExternalLink(external("Docs", "https://example.org/docs")),
        ]
    }

    fn render(items: &[RenderItem]) -> String {
        render_navigation(items, &NavConfig::default()).into_string()
    }

    // =========================================================================
    // State machine
    // =========================================================================

    #[test]
    fn initial_state_follows_is_open() {
        assert_eq!(DisclosureState::initial(false), DisclosureState::Closed);
        assert_eq!(DisclosureState::initial(true), DisclosureState::Open);
    }

    #[test]
    fn desktop_opens_on_hover_and_closes_on_leave() {
        let s = DisclosureState::Closed.transition(Layout::Desktop, DisclosureEvent::PointerEnter);
        assert_eq!(s, DisclosureState::Open);
        let s = s.transition(Layout::Desktop, DisclosureEvent::PointerLeave);
        assert_eq!(s, DisclosureState::Closed);
    }

    #[test]
    fn desktop_closes_on_escape_and_outside_interaction() {
        for event in [DisclosureEvent::Escape, DisclosureEvent::OutsideInteraction] {
            assert_eq!(
                DisclosureState::Open.transition(Layout::Desktop, event),
                DisclosureState::Closed
            );
        }
    }

    #[test]
    fn activation_toggles_in_both_layouts() {
        for layout in [Layout::Desktop, Layout::Mobile] {
            let opened = DisclosureState::Closed.transition(layout, DisclosureEvent::Activate);
            assert_eq!(opened, DisclosureState::Open);
            let closed = opened.transition(layout, DisclosureEvent::Activate);
            assert_eq!(closed, DisclosureState::Closed);
        }
    }

    #[test]
    fn mobile_ignores_hover() {
        for state in [DisclosureState::Closed, DisclosureState::Open] {
            for event in [
                DisclosureEvent::PointerEnter,
                DisclosureEvent::PointerLeave,
                DisclosureEvent::OutsideInteraction,
            ] {
                assert_eq!(state.transition(Layout::Mobile, event), state);
            }
        }
    }

    #[test]
    fn mobile_escape_collapses() {
        assert_eq!(
            DisclosureState::Open.transition(Layout::Mobile, DisclosureEvent::Escape),
            DisclosureState::Closed
        );
    }

    // =========================================================================
    // Markup
    // =========================================================================

    #[test]
    fn landmarks_have_distinct_labels() {
        let html = render(&sample_items(false));
        assert!(html.contains(r#"<nav class="nav-desktop" aria-label="Main navigation">"#));
        assert!(html.contains(r#"<nav class="nav-mobile" aria-label="Mobile navigation">"#));
    }

    #[test]
    fn skip_link_comes_first() {
        let html = render(&sample_items(false));
        assert!(html.starts_with(r##"<a class="skip-link" href="#main-content">Skip to main content</a>"##));
    }

    #[test]
    fn dropdown_trigger_is_a_button_with_popup_attributes() {
        let html = render(&sample_items(false));
        assert!(html.contains(
            r#"<button class="dropdown-trigger" type="button" aria-haspopup="true" aria-expanded="false" aria-controls="nav-dropdown-1">"#
        ));
        assert!(html.contains(r#"<ul class="dropdown-menu" id="nav-dropdown-1">"#));
        assert!(!html.contains(r#"<a class="nav-link" href="Resources""#));
    }

    #[test]
    fn closed_dropdown_state() {
        let html = render(&sample_items(false));
        assert!(html.contains(r#"data-state="closed""#));
        assert!(html.contains(r#"<details class="accordion">"#));
        assert!(!html.contains("aria-current"));
    }

    #[test]
    fn current_child_opens_dropdown_in_both_layouts() {
        let html = render(&sample_items(true));
        assert!(html.contains(r#"data-state="open""#));
        assert!(html.contains(r#"aria-expanded="true""#));
        assert!(html.contains(r#"<details class="accordion" open>"#));
        assert!(html.contains(r#"href="/en/faq/" aria-current="page">FAQ</a>"#));
        // Once per layout.
        assert_eq!(html.matches(r#"aria-current="page""#).count(), 2);
    }

    #[test]
    fn external_links_are_marked() {
        let html = render(&sample_items(false));
        assert!(html.contains(r#"<a class="nav-link external" href="https://example.org/docs">Docs</a>"#));
    }

    #[test]
    fn mobile_drawer_works_without_script() {
        let html = render(&sample_items(false));
        assert!(html.contains(r#"<input class="nav-toggle" type="checkbox" id="nav-toggle""#));
        assert!(html.contains(r#"<label class="nav-hamburger" for="nav-toggle""#));
        assert!(html.contains(r#"<div class="nav-drawer" id="nav-drawer">"#));
        assert!(html.contains("<summary>Resources</summary>"));
    }

    #[test]
    fn labels_are_escaped() {
        let items = vec![RenderItem::PageLink(link("Q&A <live>", "/qa/", false))];
        let html = render(&items);
        assert!(html.contains("Q&amp;A &lt;live&gt;"));
    }

    #[test]
    fn empty_menu_still_renders_landmarks() {
        let html = render(&[]);
        assert!(html.contains(r#"<ul class="menubar"></ul>"#));
        assert!(html.contains(r#"<ul class="drawer-list"></ul>"#));
    }

    #[test]
    fn custom_labels_from_config() {
        let nav = NavConfig {
            desktop_label: "Primary".to_string(),
            skip_link_text: "Jump to content".to_string(),
            main_content_id: "content".to_string(),
            ..NavConfig::default()
        };
        let html = render_navigation(&sample_items(false), &nav).into_string();
        assert!(html.contains(r#"aria-label="Primary""#));
        assert!(html.contains(r##"href="#content">Jump to content"##));
    }

    // =========================================================================
    // Documents
    // =========================================================================

    #[test]
    fn preview_document_structure() {
        let config = SiteConfig::default();
        let doc = render_preview_document(&sample_items(false), &config, "About", "fr").into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(r#"<html lang="fr">"#));
        assert!(doc.contains(r#"<main id="main-content" tabindex="-1">"#));
        assert!(doc.contains("--nav-focus"));
        assert!(doc.contains("window.siteNav"));
    }

    #[test]
    fn styles_include_breakpoint_and_touch_targets() {
        let css = nav_styles(&SiteConfig::default());
        assert!(css.contains("@media (min-width: 48rem)"));
        assert!(css.contains("@media (pointer: coarse)"));
        assert!(css.contains("min-height: 44px"));
    }

    #[test]
    fn script_exposes_placement_for_embedders() {
        let js = nav_script();
        assert!(js.contains("window.siteNav = { choosePlacement: choosePlacement, isLaidOut: isLaidOut }"));
        assert!(js.contains("'opens-down', 'opens-left', 'opens-right'"));
    }
}
