//! Navigation menu schema.
//!
//! A site has exactly one [`MenuConfiguration`]: an ordered list of
//! [`TopLevelItem`]s. The tree is at most two levels deep, and that limit is a
//! property of the types rather than a check:
//!
//! - [`TopLevelItem`] is a page link, an external link, or a dropdown
//! - [`Dropdown`] holds [`ChildItem`]s, which are page links or external links
//!
//! `ChildItem` has no dropdown variant, so a dropdown inside a dropdown cannot
//! be built in Rust, and a persisted document that tries to nest one fails to
//! deserialize.
//!
//! ## Persisted Format
//!
//! The configuration is stored as JSON, one tagged node per item:
//!
//! ```json
//! [
//!   {"type": "page_link", "value": {"page": 3, "custom_title": "Home", "anchor": "top"}},
//!   {"type": "external_link", "value": {"url": "https://example.org", "title": "Docs"}},
//!   {"type": "dropdown", "value": {"title": "Resources", "items": [
//!     {"type": "page_link", "value": {"page": 4}}
//!   ]}}
//! ]
//! ```
//!
//! Blank strings for optional fields (`"custom_title": ""`) read as absent.
//!
//! ## Save-Time Limits
//!
//! Item counts, title lengths, and external URL shape are usability rules, not
//! structural invariants. [`MenuConfiguration::validate`] checks them against
//! [`MenuLimits`] when the configuration is saved; the resolver never does.

use crate::config::MenuLimits;
use crate::locale::LocaleId;
use crate::sources::PageId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid menu document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Menu validation error: {0}")]
    Validation(SchemaProblem),
    #[error("{0} cannot be placed inside a dropdown")]
    NotAChild(ItemKind),
}

/// One save-time rule violation, with the position of the offending item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaProblem {
    /// 1-based position, e.g. `item 2` or `item 2 › child 4`.
    pub location: String,
    pub message: String,
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// The item variants, for editors that offer "add item" choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    PageLink,
    ExternalLink,
    Dropdown,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::PageLink => "Page Link",
            ItemKind::ExternalLink => "External Link",
            ItemKind::Dropdown => "Dropdown Menu",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The site's navigation menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuConfiguration {
    pub items: Vec<TopLevelItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TopLevelItem {
    PageLink(PageLink),
    ExternalLink(ExternalLink),
    Dropdown(Dropdown),
}

/// An entry inside a dropdown. There is no `Dropdown` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ChildItem {
    PageLink(PageLink),
    ExternalLink(ExternalLink),
}

/// Link to a CMS page, resolved per locale at request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageLink {
    pub page: PageId,
    /// Overrides the page's own title.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    /// Fragment without the leading `#`.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    /// Per-locale overrides of `custom_title`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub title_translations: BTreeMap<LocaleId, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalLink {
    /// Absolute, scheme-qualified URL. Never localized.
    pub url: String,
    pub title: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub title_translations: BTreeMap<LocaleId, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dropdown {
    /// Label of the trigger. The trigger itself is not a link.
    pub title: String,
    #[serde(default)]
    pub items: Vec<ChildItem>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub title_translations: BTreeMap<LocaleId, String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl PageLink {
    pub fn new(page: PageId) -> Self {
        Self {
            page,
            custom_title: None,
            anchor: None,
            title_translations: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.custom_title = Some(title.into());
        self
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    pub fn with_title_translation(mut self, locale: &str, title: impl Into<String>) -> Self {
        self.title_translations
            .insert(LocaleId::new(locale), title.into());
        self
    }
}

impl ExternalLink {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            anchor: None,
            title_translations: BTreeMap::new(),
        }
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    pub fn with_title_translation(mut self, locale: &str, title: impl Into<String>) -> Self {
        self.title_translations
            .insert(LocaleId::new(locale), title.into());
        self
    }
}

impl Dropdown {
    pub fn new(title: impl Into<String>, items: Vec<ChildItem>) -> Self {
        Self {
            title: title.into(),
            items,
            title_translations: BTreeMap::new(),
        }
    }

    pub fn with_title_translation(mut self, locale: &str, title: impl Into<String>) -> Self {
        self.title_translations
            .insert(LocaleId::new(locale), title.into());
        self
    }
}

impl TopLevelItem {
    /// Choices an editor may offer at the top level.
    pub const ALLOWED_KINDS: &'static [ItemKind] =
        &[ItemKind::PageLink, ItemKind::ExternalLink, ItemKind::Dropdown];

    pub fn kind(&self) -> ItemKind {
        match self {
            TopLevelItem::PageLink(_) => ItemKind::PageLink,
            TopLevelItem::ExternalLink(_) => ItemKind::ExternalLink,
            TopLevelItem::Dropdown(_) => ItemKind::Dropdown,
        }
    }
}

impl ChildItem {
    /// Choices an editor may offer inside a dropdown.
    pub const ALLOWED_KINDS: &'static [ItemKind] = &[ItemKind::PageLink, ItemKind::ExternalLink];

    pub fn kind(&self) -> ItemKind {
        match self {
            ChildItem::PageLink(_) => ItemKind::PageLink,
            ChildItem::ExternalLink(_) => ItemKind::ExternalLink,
        }
    }
}

impl From<ChildItem> for TopLevelItem {
    fn from(child: ChildItem) -> Self {
        match child {
            ChildItem::PageLink(link) => TopLevelItem::PageLink(link),
            ChildItem::ExternalLink(link) => TopLevelItem::ExternalLink(link),
        }
    }
}

/// Moving a top-level item into a dropdown. Fails for dropdowns.
impl TryFrom<TopLevelItem> for ChildItem {
    type Error = SchemaError;

    fn try_from(item: TopLevelItem) -> Result<Self, Self::Error> {
        match item {
            TopLevelItem::PageLink(link) => Ok(ChildItem::PageLink(link)),
            TopLevelItem::ExternalLink(link) => Ok(ChildItem::ExternalLink(link)),
            TopLevelItem::Dropdown(_) => Err(SchemaError::NotAChild(ItemKind::Dropdown)),
        }
    }
}

impl From<PageLink> for TopLevelItem {
    fn from(link: PageLink) -> Self {
        TopLevelItem::PageLink(link)
    }
}

impl From<ExternalLink> for TopLevelItem {
    fn from(link: ExternalLink) -> Self {
        TopLevelItem::ExternalLink(link)
    }
}

impl From<Dropdown> for TopLevelItem {
    fn from(dropdown: Dropdown) -> Self {
        TopLevelItem::Dropdown(dropdown)
    }
}

impl From<PageLink> for ChildItem {
    fn from(link: PageLink) -> Self {
        ChildItem::PageLink(link)
    }
}

impl From<ExternalLink> for ChildItem {
    fn from(link: ExternalLink) -> Self {
        ChildItem::ExternalLink(link)
    }
}

impl MenuConfiguration {
    pub fn new(items: Vec<TopLevelItem>) -> Self {
        Self { items }
    }

    /// Parse a persisted menu document. Structure only; see [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every page referenced by the menu, in menu order.
    pub fn referenced_pages(&self) -> Vec<PageId> {
        let mut pages = Vec::new();
        for item in &self.items {
            match item {
                TopLevelItem::PageLink(link) => pages.push(link.page),
                TopLevelItem::ExternalLink(_) => {}
                TopLevelItem::Dropdown(dropdown) => {
                    pages.extend(dropdown.items.iter().filter_map(|child| match child {
                        ChildItem::PageLink(link) => Some(link.page),
                        ChildItem::ExternalLink(_) => None,
                    }));
                }
            }
        }
        pages
    }

    /// Save-time check: rejects with the first problem found.
    pub fn validate(&self, limits: &MenuLimits) -> Result<(), SchemaError> {
        match self.problems(limits).into_iter().next() {
            Some(problem) => Err(SchemaError::Validation(problem)),
            None => Ok(()),
        }
    }

    /// All save-time problems, in menu order.
    pub fn problems(&self, limits: &MenuLimits) -> Vec<SchemaProblem> {
        let mut problems = Vec::new();
        if self.items.len() > limits.max_top_level_items {
            problems.push(SchemaProblem {
                location: "menu".into(),
                message: format!(
                    "{} top-level items exceeds the limit of {}",
                    self.items.len(),
                    limits.max_top_level_items
                ),
            });
        }

        for (idx, item) in self.items.iter().enumerate() {
            let location = format!("item {}", idx + 1);
            match item {
                TopLevelItem::PageLink(link) => {
                    check_page_link(link, &location, limits, &mut problems)
                }
                TopLevelItem::ExternalLink(link) => {
                    check_external_link(link, &location, limits, &mut problems)
                }
                TopLevelItem::Dropdown(dropdown) => {
                    check_title(&dropdown.title, &location, limits, &mut problems);
                    check_translations(&dropdown.title_translations, &location, limits, &mut problems);
                    if dropdown.items.is_empty() {
                        problems.push(problem(&location, "Dropdown menu must contain at least one item"));
                    }
                    if dropdown.items.len() > limits.max_dropdown_items {
                        problems.push(problem(
                            &location,
                            &format!(
                                "{} items in dropdown '{}' exceeds the limit of {}",
                                dropdown.items.len(),
                                dropdown.title,
                                limits.max_dropdown_items
                            ),
                        ));
                    }
                    for (child_idx, child) in dropdown.items.iter().enumerate() {
                        let child_location = format!("{location} › child {}", child_idx + 1);
                        match child {
                            ChildItem::PageLink(link) => {
                                check_page_link(link, &child_location, limits, &mut problems)
                            }
                            ChildItem::ExternalLink(link) => {
                                check_external_link(link, &child_location, limits, &mut problems)
                            }
                        }
                    }
                }
            }
        }
        problems
    }
}

fn problem(location: &str, message: &str) -> SchemaProblem {
    SchemaProblem {
        location: location.to_string(),
        message: message.to_string(),
    }
}

fn check_page_link(link: &PageLink, location: &str, limits: &MenuLimits, out: &mut Vec<SchemaProblem>) {
    if let Some(title) = &link.custom_title
        && title.chars().count() > limits.max_title_len
    {
        out.push(problem(
            location,
            &format!("custom title is longer than {} characters", limits.max_title_len),
        ));
    }
    check_translations(&link.title_translations, location, limits, out);
    check_anchor(link.anchor.as_deref(), location, limits, out);
}

fn check_external_link(
    link: &ExternalLink,
    location: &str,
    limits: &MenuLimits,
    out: &mut Vec<SchemaProblem>,
) {
    if !is_absolute_http_url(&link.url) {
        out.push(problem(
            location,
            &format!("'{}' is not a full URL including http:// or https://", link.url),
        ));
    }
    check_title(&link.title, location, limits, out);
    check_translations(&link.title_translations, location, limits, out);
    check_anchor(link.anchor.as_deref(), location, limits, out);
}

fn check_title(title: &str, location: &str, limits: &MenuLimits, out: &mut Vec<SchemaProblem>) {
    if title.trim().is_empty() {
        out.push(problem(location, "title is required"));
    } else if title.chars().count() > limits.max_title_len {
        out.push(problem(
            location,
            &format!("title is longer than {} characters", limits.max_title_len),
        ));
    }
}

fn check_translations(
    translations: &BTreeMap<LocaleId, String>,
    location: &str,
    limits: &MenuLimits,
    out: &mut Vec<SchemaProblem>,
) {
    for (locale, title) in translations {
        check_title(title, &format!("{location} [{locale}]"), limits, out);
    }
}

fn check_anchor(anchor: Option<&str>, location: &str, limits: &MenuLimits, out: &mut Vec<SchemaProblem>) {
    let Some(anchor) = anchor else {
        return;
    };
    let anchor = anchor.trim_start_matches('#');
    if anchor.chars().count() > limits.max_anchor_len {
        out.push(problem(
            location,
            &format!("anchor is longer than {} characters", limits.max_anchor_len),
        ));
    }
    if anchor.chars().any(char::is_whitespace) {
        out.push(problem(location, "anchor must not contain whitespace"));
    }
}

/// `http(s)://host...` with a non-empty host and no whitespace.
fn is_absolute_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or("");
            !host.is_empty() && !url.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> MenuLimits {
        MenuLimits::default()
    }

    #[test]
    fn child_kinds_exclude_dropdown() {
        assert!(!ChildItem::ALLOWED_KINDS.contains(&ItemKind::Dropdown));
        assert!(TopLevelItem::ALLOWED_KINDS.contains(&ItemKind::Dropdown));
        assert_eq!(TopLevelItem::ALLOWED_KINDS.len(), 3);
    }

    #[test]
    fn dropdown_cannot_become_child() {
        let dropdown = TopLevelItem::Dropdown(Dropdown::new("Resources", vec![]));
        let result = ChildItem::try_from(dropdown);
        assert!(matches!(result, Err(SchemaError::NotAChild(ItemKind::Dropdown))));
    }

    #[test]
    fn link_moves_into_dropdown_and_back() {
        let item = TopLevelItem::from(PageLink::new(PageId(1)));
        let child = ChildItem::try_from(item.clone()).unwrap();
        assert_eq!(child.kind(), ItemKind::PageLink);
        assert_eq!(TopLevelItem::from(child), item);
    }

    #[test]
    fn parses_stream_document() {
        let json = r#"[
            {"type": "page_link", "value": {"page": 3, "custom_title": "", "anchor": "top"}},
            {"type": "external_link", "value": {"url": "https://example.org", "title": "Docs", "anchor": ""}},
            {"type": "dropdown", "value": {"title": "Resources", "items": [
                {"type": "page_link", "value": {"page": 4, "custom_title": "Guide"}},
                {"type": "external_link", "value": {"url": "https://example.org/faq", "title": "FAQ"}}
            ]}}
        ]"#;
        let config = MenuConfiguration::from_json(json).unwrap();
        assert_eq!(config.items.len(), 3);

        let TopLevelItem::PageLink(link) = &config.items[0] else {
            panic!("expected page link");
        };
        assert_eq!(link.custom_title, None, "blank title reads as absent");
        assert_eq!(link.anchor.as_deref(), Some("top"));

        let TopLevelItem::Dropdown(dropdown) = &config.items[2] else {
            panic!("expected dropdown");
        };
        assert_eq!(dropdown.items.len(), 2);
        assert_eq!(config.referenced_pages(), vec![PageId(3), PageId(4)]);
    }

    #[test]
    fn nested_dropdown_fails_to_parse() {
        let json = r#"[
            {"type": "dropdown", "value": {"title": "Outer", "items": [
                {"type": "dropdown", "value": {"title": "Inner", "items": []}}
            ]}}
        ]"#;
        let result = MenuConfiguration::from_json(json);
        assert!(matches!(result, Err(SchemaError::Json(_))));
    }

    #[test]
    fn unknown_field_fails_to_parse() {
        let json = r#"[{"type": "page_link", "value": {"page": 1, "titel": "Typo"}}]"#;
        assert!(MenuConfiguration::from_json(json).is_err());
    }

    #[test]
    fn serialization_matches_document_shape() {
        let config = MenuConfiguration::new(vec![
            ExternalLink::new("https://example.org", "Docs").into(),
        ]);
        let value: serde_json::Value = serde_json::to_value(&config).unwrap();
        assert_eq!(value[0]["type"], "external_link");
        assert_eq!(value[0]["value"]["title"], "Docs");
        assert!(value[0]["value"].get("anchor").is_none());
    }

    #[test]
    fn valid_menu_passes() {
        let config = MenuConfiguration::new(vec![
            PageLink::new(PageId(1)).with_anchor("intro").into(),
            Dropdown::new("More", vec![ExternalLink::new("http://example.org/x", "X").into()]).into(),
        ]);
        assert!(config.validate(&limits()).is_ok());
    }

    #[test]
    fn too_many_top_level_items_is_rejected() {
        let items: Vec<TopLevelItem> = (0..11)
            .map(|i| PageLink::new(PageId(i)).into())
            .collect();
        let err = MenuConfiguration::new(items).validate(&limits()).unwrap_err();
        assert!(err.to_string().contains("exceeds the limit of 10"), "{err}");
    }

    #[test]
    fn too_many_dropdown_items_is_rejected() {
        let children: Vec<ChildItem> = (0..21)
            .map(|i| PageLink::new(PageId(i)).into())
            .collect();
        let config = MenuConfiguration::new(vec![Dropdown::new("Big", children).into()]);
        let problems = config.problems(&limits());
        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("exceeds the limit of 20"));
    }

    #[test]
    fn empty_dropdown_is_rejected() {
        let config = MenuConfiguration::new(vec![Dropdown::new("Empty Dropdown", vec![]).into()]);
        let err = config.validate(&limits()).unwrap_err();
        assert!(err.to_string().contains("Dropdown menu must contain at least one item"));
    }

    #[test]
    fn problems_report_child_location() {
        let config = MenuConfiguration::new(vec![
            PageLink::new(PageId(1)).into(),
            Dropdown::new(
                "Links",
                vec![
                    ExternalLink::new("https://ok.example", "Ok").into(),
                    ExternalLink::new("ftp://files.example", "Files").into(),
                ],
            )
            .into(),
        ]);
        let problems = config.problems(&limits());
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].location, "item 2 › child 2");
    }

    #[test]
    fn blank_required_titles_are_rejected() {
        let config = MenuConfiguration::new(vec![
            ExternalLink::new("https://example.org", "  ").into(),
            Dropdown::new("", vec![PageLink::new(PageId(1)).into()]).into(),
        ]);
        let locations: Vec<String> = config
            .problems(&limits())
            .into_iter()
            .map(|p| p.location)
            .collect();
        assert_eq!(locations, vec!["item 1", "item 2"]);
    }

    #[test]
    fn long_titles_and_anchors_are_rejected() {
        let long = "x".repeat(101);
        let config = MenuConfiguration::new(vec![
            PageLink::new(PageId(1)).with_title(long.clone()).into(),
            PageLink::new(PageId(2)).with_anchor("a".repeat(51)).into(),
            PageLink::new(PageId(3)).with_anchor("two words").into(),
            PageLink::new(PageId(4)).with_title_translation("fr", long).into(),
        ]);
        assert_eq!(config.problems(&limits()).len(), 4);
    }

    #[test]
    fn url_shape() {
        assert!(is_absolute_http_url("https://example.org"));
        assert!(is_absolute_http_url("HTTP://example.org/path?q=1"));
        assert!(!is_absolute_http_url("example.org"));
        assert!(!is_absolute_http_url("https://"));
        assert!(!is_absolute_http_url("https:///path"));
        assert!(!is_absolute_http_url("https://exa mple.org"));
        assert!(!is_absolute_http_url("/relative/path"));
    }
}
