//! # Site Nav
//!
//! Multilingual site navigation: an editor-maintained menu, resolved per
//! request into the links a visitor should see, rendered as accessible
//! desktop and mobile navigation.
//!
//! # Architecture
//!
//! ```text
//! menu.json ─┐
//!            ├─ resolve (locale, current page) ─→ render tree ─→ render ─→ HTML
//! pages ─────┘                                                     │
//!                                                      position (client script)
//! ```
//!
//! - The **menu** is a two-level tree of page links, external links, and
//!   dropdowns. It names pages by id and never goes stale by itself.
//! - **Resolution** runs per request. It picks each page's translation for the
//!   visitor's language, falls back to the default language, drops anything
//!   unpublished, and marks the page being served.
//! - **Rendering** turns the tree into a menubar for desktop and a drawer with
//!   accordions for mobile, both usable without JavaScript.
//! - **Positioning** keeps open dropdowns inside the viewport.
//!
//! Pages and the active locale come from collaborators behind the
//! [`sources::PageSource`] and [`sources::LocaleSource`] traits, so the core
//! runs the same against a CMS or the in-memory JSON source the CLI uses.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Menu document types, JSON format, save-time validation |
//! | [`sources`] | Page and locale collaborator traits, in-memory implementations |
//! | [`locale`] | Locale ids, site language settings, request negotiation |
//! | [`resolve`] | Per-request resolution into the render tree |
//! | [`cache`] | Per-site, per-locale cache in front of resolution |
//! | [`render`] | Navigation markup (Maud), disclosure state machine, preview documents |
//! | [`position`] | Dropdown placement geometry |
//! | [`config`] | `config.toml` loading, validation, CSS generation |
//! | [`generate`] | Parallel static preview build |
//! | [`scaffold`] | Sample site for demos and tests |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Nesting Lives in the Types
//!
//! Dropdowns hold [`schema::ChildItem`]s, which have no dropdown variant.
//! A third level cannot be built in Rust or deserialized from JSON, so the
//! resolver and renderer never need to handle one.
//!
//! ## Dropping Beats Erroring
//!
//! A link to a deleted or unpublished page is removed during resolution,
//! and a dropdown left empty goes with it. The only resolution error is a
//! collaborator failure, which the caller turns into "render without nav".
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Malformed markup
//! is a build error and every interpolation is escaped.

pub mod cache;
pub mod config;
pub mod generate;
pub mod locale;
pub mod output;
pub mod position;
pub mod render;
pub mod resolve;
pub mod scaffold;
pub mod schema;
pub mod sources;

#[cfg(test)]
pub(crate) mod test_helpers;
