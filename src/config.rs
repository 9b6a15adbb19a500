//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. User values are
//! merged over stock defaults, so a config file only needs the keys it wants
//! to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [nav]
//! desktop_label = "Main navigation"    # Landmark label (desktop menubar)
//! mobile_label = "Mobile navigation"   # Landmark label (mobile drawer)
//! skip_link_text = "Skip to main content"
//! main_content_id = "main-content"     # Target of the skip link
//! menu_toggle_label = "Menu"
//! close_label = "Close menu"
//! mobile_breakpoint = "48rem"          # Desktop layout at and above this width
//!
//! [limits]
//! max_top_level_items = 10
//! max_dropdown_items = 20
//! max_title_len = 100
//! max_anchor_len = 50
//!
//! [locales]
//! default_language = "en"
//! available_languages = ["en"]
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! link = "#1a4d8f"
//! link_hover = "#0b2e59"
//! border = "#767676"
//! focus_ring = "#1a73e8"
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! link = "#8ab4f8"
//! link_hover = "#c6dafc"
//! border = "#8a8a8a"
//! focus_ring = "#8ab4f8"
//!
//! [cache]
//! enabled = false
//!
//! [processing]
//! max_processes = 4         # Max parallel workers for `build` (omit for auto)
//! ```
//!
//! ## Contrast
//!
//! Colors are checked against the background when the config is loaded:
//! text and links need 4.5:1, borders and the focus ring need 3:1. A theme
//! that fails is rejected with the offending key and its measured ratio.
//!
//! Unknown keys are rejected to catch typos early.

use crate::locale::LocaleSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Minimum contrast for text and links against the background.
pub const TEXT_CONTRAST: f64 = 4.5;
/// Minimum contrast for control borders and the focus indicator.
pub const NON_TEXT_CONTRAST: f64 = 3.0;

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Labels and ids emitted by the navigation markup.
    pub nav: NavConfig,
    /// Save-time usability limits for the menu document.
    pub limits: MenuLimits,
    /// Default and available languages.
    pub locales: LocaleSettings,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Resolution cache settings.
    pub cache: CacheConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.nav.validate()?;
        self.limits.validate()?;
        self.locales.validate()?;
        self.colors.light.validate("colors.light")?;
        self.colors.dark.validate("colors.dark")?;
        Ok(())
    }
}

/// Text and ids for the rendered navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    /// `aria-label` of the desktop navigation landmark.
    pub desktop_label: String,
    /// `aria-label` of the mobile navigation landmark.
    pub mobile_label: String,
    /// Text of the skip link emitted before the navigation.
    pub skip_link_text: String,
    /// Id of the page's main content element, target of the skip link.
    pub main_content_id: String,
    /// Accessible name of the mobile drawer toggle.
    pub menu_toggle_label: String,
    /// Accessible name of the mobile drawer close control.
    pub close_label: String,
    /// Viewport width (CSS length) at which the desktop menubar replaces the drawer.
    pub mobile_breakpoint: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            desktop_label: "Main navigation".to_string(),
            mobile_label: "Mobile navigation".to_string(),
            skip_link_text: "Skip to main content".to_string(),
            main_content_id: "main-content".to_string(),
            menu_toggle_label: "Menu".to_string(),
            close_label: "Close menu".to_string(),
            mobile_breakpoint: "48rem".to_string(),
        }
    }
}

impl NavConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.desktop_label.trim().is_empty() || self.mobile_label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "nav.desktop_label and nav.mobile_label must not be empty".into(),
            ));
        }
        if self.desktop_label == self.mobile_label {
            return Err(ConfigError::Validation(
                "nav.desktop_label and nav.mobile_label must differ so each landmark is distinguishable"
                    .into(),
            ));
        }
        if self.main_content_id.is_empty() || self.main_content_id.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "nav.main_content_id must be a non-empty id without whitespace".into(),
            ));
        }
        if self.skip_link_text.trim().is_empty() {
            return Err(ConfigError::Validation(
                "nav.skip_link_text must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Usability limits enforced when a menu document is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MenuLimits {
    pub max_top_level_items: usize,
    pub max_dropdown_items: usize,
    pub max_title_len: usize,
    pub max_anchor_len: usize,
}

impl Default for MenuLimits {
    fn default() -> Self {
        Self {
            max_top_level_items: 10,
            max_dropdown_items: 20,
            max_title_len: 100,
            max_anchor_len: 50,
        }
    }
}

impl MenuLimits {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_top_level_items == 0
            || self.max_dropdown_items == 0
            || self.max_title_len == 0
            || self.max_anchor_len == 0
        {
            return Err(ConfigError::Validation(
                "limits values must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Resolution cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Reuse locale-resolved menus across requests for the same site and locale.
    pub enabled: bool,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark). All values are hex colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Background color of the menubar, dropdowns, and drawer.
    pub background: String,
    /// Text color (dropdown triggers, drawer headings).
    pub text: String,
    /// Link color.
    pub link: String,
    /// Link hover color.
    pub link_hover: String,
    /// Border of dropdown overlays and controls.
    pub border: String,
    /// Keyboard focus indicator.
    pub focus_ring: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            link: "#1a4d8f".to_string(),
            link_hover: "#0b2e59".to_string(),
            border: "#767676".to_string(),
            focus_ring: "#1a73e8".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            link: "#8ab4f8".to_string(),
            link_hover: "#c6dafc".to_string(),
            border: "#8a8a8a".to_string(),
            focus_ring: "#8ab4f8".to_string(),
        }
    }

    /// Check every foreground color against the background.
    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        let background = parse_color(section, "background", &self.background)?;
        let pairs = [
            ("text", &self.text, TEXT_CONTRAST),
            ("link", &self.link, TEXT_CONTRAST),
            ("link_hover", &self.link_hover, TEXT_CONTRAST),
            ("border", &self.border, NON_TEXT_CONTRAST),
            ("focus_ring", &self.focus_ring, NON_TEXT_CONTRAST),
        ];
        for (key, value, minimum) in pairs {
            let color = parse_color(section, key, value)?;
            let ratio = contrast_ratio(color, background);
            if ratio < minimum {
                return Err(ConfigError::Validation(format!(
                    "{section}.{key} ({value}) has contrast {ratio:.2}:1 against the background, \
                     at least {minimum}:1 is required"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

fn parse_color(section: &str, key: &str, value: &str) -> Result<[u8; 3], ConfigError> {
    parse_hex_color(value).ok_or_else(|| {
        ConfigError::Validation(format!(
            "{section}.{key} must be a hex color (#rgb or #rrggbb), got '{value}'"
        ))
    })
}

/// Parse `#rgb` or `#rrggbb`.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let digit = c.to_digit(16)? as u8;
                *slot = digit * 17;
            }
            Some(rgb)
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some([channel(0)?, channel(2)?, channel(4)?])
        }
        _ => None,
    }
}

/// WCAG relative luminance of an sRGB color.
fn relative_luminance([r, g, b]: [u8; 3]) -> f64 {
    let linear = |c: u8| {
        let c = f64::from(c) / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

/// WCAG contrast ratio, from 1.0 (identical) to 21.0 (black on white).
pub fn contrast_ratio(a: [u8; 3], b: [u8; 3]) -> f64 {
    let (la, lb) = (relative_luminance(a), relative_luminance(b));
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(
        dir = %dir.display(),
        default_language = %config.locales.default_language,
        languages = config.locales.available_languages.len(),
        "loaded site config"
    );
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# site-nav Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Navigation markup
# ---------------------------------------------------------------------------
[nav]
# Accessible names of the two navigation landmarks. Must differ.
desktop_label = "Main navigation"
mobile_label = "Mobile navigation"

# Skip link emitted before the navigation, and the id it jumps to.
skip_link_text = "Skip to main content"
main_content_id = "main-content"

# Accessible names of the mobile drawer controls.
menu_toggle_label = "Menu"
close_label = "Close menu"

# The desktop menubar is shown at and above this viewport width.
mobile_breakpoint = "48rem"

# ---------------------------------------------------------------------------
# Menu limits (checked when a menu document is saved or checked)
# ---------------------------------------------------------------------------
[limits]
max_top_level_items = 10
max_dropdown_items = 20
max_title_len = 100
max_anchor_len = 50

# ---------------------------------------------------------------------------
# Languages
# ---------------------------------------------------------------------------
[locales]
# Fallback language when a page has no translation in the visitor's language.
default_language = "en"
# Languages the site is published in. Must include the default language.
available_languages = ["en"]

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# Text and links need 4.5:1 contrast against the background,
# border and focus_ring need 3:1.
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
link = "#1a4d8f"
link_hover = "#0b2e59"
border = "#767676"
focus_ring = "#1a73e8"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
link = "#8ab4f8"
link_hover = "#c6dafc"
border = "#8a8a8a"
focus_ring = "#8ab4f8"

# ---------------------------------------------------------------------------
# Resolution cache
# ---------------------------------------------------------------------------
[cache]
# Reuse the resolved menu per site and locale. The menu is re-resolved
# whenever the menu document changes.
enabled = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers for `build`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --nav-bg: {light_bg};
    --nav-text: {light_text};
    --nav-link: {light_link};
    --nav-link-hover: {light_link_hover};
    --nav-border: {light_border};
    --nav-focus: {light_focus};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --nav-bg: {dark_bg};
        --nav-text: {dark_text};
        --nav-link: {dark_link};
        --nav-link-hover: {dark_link_hover};
        --nav-border: {dark_border};
        --nav-focus: {dark_focus};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        light_border = colors.light.border,
        light_focus = colors.light.focus_ring,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
        dark_border = colors.dark.border,
        dark_focus = colors.dark.focus_ring,
    )
}

/// Generate the desktop/mobile layout switch from the configured breakpoint.
///
/// Media queries cannot read custom properties, so the breakpoint is baked in.
pub fn generate_layout_css(nav: &NavConfig) -> String {
    format!(
        r#".nav-desktop {{ display: none; }}

@media (min-width: {bp}) {{
    .nav-desktop {{ display: block; }}
    .nav-mobile {{ display: none; }}
}}"#,
        bp = nav.mobile_breakpoint,
    )
}
