//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; the project's `config.toml` overrides any subset of them.
//!
//! ## Config File Location
//!
//! ```text
//! my-docs/
//! ├── config.toml              # Overrides stock defaults
//! ├── navigation.toml          # Navbar / sidebar structure
//! ├── content/docs/            # Markdown and MDX sources
//! ├── public/                  # Copied to dist/assets/
//! └── assets/                  # fonts/ and top-level files copied to dist/assets/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Documentation"
//! description = "Project documentation"
//! home_slug = "readme"          # Target of "Get started" on the index page
//!
//! [paths]
//! content = "content/docs"
//! navigation = "navigation.toml"
//! public = "public"
//! assets = "assets"
//! output = "dist"
//!
//! [toc]
//! min_depth = 2                 # Shallowest heading shown under "On this page"
//! max_depth = 3                 # Deepest heading shown
//!
//! [search]
//! content_chars = 500           # Plain-text excerpt length per entry
//! max_results = 8
//! min_query_len = 2
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [redirects]
//! introduction = "readme"       # dist/docs/introduction.html -> readme
//!
//! [colors.light]
//! background = "#ffffff"
//! # ...
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [site]
//! title = "Acme Docs"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity shown in the header and page titles.
    pub site: SiteInfo,
    /// Input and output locations, relative to the project root.
    pub paths: PathsConfig,
    /// Footer links shown under the sidebar.
    pub links: LinksConfig,
    /// Which heading depths appear in the "On this page" list.
    pub toc: TocConfig,
    /// Search index and query settings.
    pub search: SearchConfig,
    /// Development server settings.
    pub server: ServerConfig,
    /// Redirect pages: `from` slug → `to` slug.
    pub redirects: BTreeMap<String, String>,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteInfo::default(),
            paths: PathsConfig::default(),
            links: LinksConfig::default(),
            toc: TocConfig::default(),
            search: SearchConfig::default(),
            server: ServerConfig::default(),
            redirects: BTreeMap::from([("introduction".to_string(), "readme".to_string())]),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation("site.title must not be empty".into()));
        }
        if self.site.home_slug.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.home_slug must not be empty".into(),
            ));
        }
        let toc = &self.toc;
        if !(1..=6).contains(&toc.min_depth) || !(1..=6).contains(&toc.max_depth) {
            return Err(ConfigError::Validation(
                "toc.min_depth and toc.max_depth must be 1-6".into(),
            ));
        }
        if toc.min_depth > toc.max_depth {
            return Err(ConfigError::Validation(
                "toc.min_depth must not exceed toc.max_depth".into(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(ConfigError::Validation(
                "search.max_results must be at least 1".into(),
            ));
        }
        for (name, value) in self.paths.entries() {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "paths.{name} must not be empty"
                )));
            }
        }
        for (from, to) in &self.redirects {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "redirect slugs must not be empty".into(),
                ));
            }
            if from == to {
                return Err(ConfigError::Validation(format!(
                    "redirect '{from}' points at itself"
                )));
            }
        }
        Ok(())
    }
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    /// Short line under the title on the index page.
    pub tagline: Option<String>,
    /// Logo URL or path, shown left of the title in the navbar.
    pub logo: Option<String>,
    /// Slug the index page's call to action links to.
    pub home_slug: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Documentation".to_string(),
            description: "Project documentation".to_string(),
            tagline: None,
            logo: None,
            home_slug: "readme".to_string(),
        }
    }
}

/// Input and output locations, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub content: String,
    pub navigation: String,
    pub public: String,
    pub assets: String,
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: "content/docs".to_string(),
            navigation: "navigation.toml".to_string(),
            public: "public".to_string(),
            assets: "assets".to_string(),
            output: "dist".to_string(),
        }
    }
}

impl PathsConfig {
    fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("content", self.content.as_str()),
            ("navigation", self.navigation.as_str()),
            ("public", self.public.as_str()),
            ("assets", self.assets.as_str()),
            ("output", self.output.as_str()),
        ]
    }

    /// Join every configured path onto `root`.
    pub fn resolve(&self, root: &Path) -> ProjectPaths {
        ProjectPaths {
            content: root.join(&self.content),
            navigation: root.join(&self.navigation),
            public: root.join(&self.public),
            assets: root.join(&self.assets),
            output: root.join(&self.output),
        }
    }
}

/// [`PathsConfig`] resolved against a project root.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub content: PathBuf,
    pub navigation: PathBuf,
    pub public: PathBuf,
    pub assets: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    pub github: Option<String>,
    pub discord: Option<String>,
}

/// Heading depth window for the table of contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    pub min_depth: u8,
    pub max_depth: u8,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            min_depth: 2,
            max_depth: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Characters of plain text kept per search entry.
    pub content_chars: usize,
    /// Maximum results returned by a query.
    pub max_results: usize,
    /// Queries shorter than this return nothing.
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            content_chars: 500,
            max_results: 8,
            min_query_len: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
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

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Navbar, sidebar and card background.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Secondary text (descriptions, TOC, breadcrumbs).
    pub text_muted: String,
    pub border: String,
    /// Links, active nav items, focus rings.
    pub accent: String,
    /// Text drawn on top of `accent`.
    pub accent_text: String,
    /// Code block background.
    pub code_background: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            surface: "#f8fafc".to_string(),
            text: "#0f172a".to_string(),
            text_muted: "#64748b".to_string(),
            border: "#e2e8f0".to_string(),
            accent: "#2563eb".to_string(),
            accent_text: "#ffffff".to_string(),
            code_background: "#f1f5f9".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0b0f19".to_string(),
            surface: "#111827".to_string(),
            text: "#e5e7eb".to_string(),
            text_muted: "#9ca3af".to_string(),
            border: "#1f2937".to_string(),
            accent: "#60a5fa".to_string(),
            accent_text: "#0b0f19".to_string(),
            code_background: "#161b26".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
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
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
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

/// Load config from `config.toml` in the project root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# docsite configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "Documentation"
description = "Project documentation"

# Short line under the title on the index page.
# tagline = "Everything you need to get going"

# Logo shown in the navbar, e.g. "/assets/logo.svg".
# logo = "/assets/logo.svg"

# Slug the index page's "Get started" button links to.
home_slug = "readme"

# ---------------------------------------------------------------------------
# Paths (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
content = "content/docs"
navigation = "navigation.toml"
public = "public"
assets = "assets"
output = "dist"

# ---------------------------------------------------------------------------
# Footer links under the sidebar
# ---------------------------------------------------------------------------
[links]
# github = "https://github.com/acme/project"
# discord = "https://discord.gg/acme"

# ---------------------------------------------------------------------------
# "On this page" table of contents
# ---------------------------------------------------------------------------
[toc]
# Heading depths (1-6) listed in the table of contents.
min_depth = 2
max_depth = 3

# ---------------------------------------------------------------------------
# Search
# ---------------------------------------------------------------------------
[search]
# Characters of plain text indexed per page.
content_chars = 500
max_results = 8
# Shorter queries return no results.
min_query_len = 2

# ---------------------------------------------------------------------------
# Development server (docsite serve)
# ---------------------------------------------------------------------------
[server]
host = "127.0.0.1"
port = 3000

# ---------------------------------------------------------------------------
# Redirect pages: dist/docs/<from>.html forwards to /docs/<to>.html
# ---------------------------------------------------------------------------
[redirects]
introduction = "readme"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
surface = "#f8fafc"         # Navbar, sidebar, cards
text = "#0f172a"
text_muted = "#64748b"      # Descriptions, TOC, breadcrumbs
border = "#e2e8f0"
accent = "#2563eb"          # Links, active items
accent_text = "#ffffff"
code_background = "#f1f5f9"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0b0f19"
surface = "#111827"
text = "#e5e7eb"
text_muted = "#9ca3af"
border = "#1f2937"
accent = "#60a5fa"
accent_text = "#0b0f19"
code_background = "#161b26"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    fn vars(scheme: &ColorScheme, indent: &str) -> String {
        [
            ("bg", &scheme.background),
            ("surface", &scheme.surface),
            ("text", &scheme.text),
            ("text-muted", &scheme.text_muted),
            ("border", &scheme.border),
            ("accent", &scheme.accent),
            ("accent-text", &scheme.accent_text),
            ("code-bg", &scheme.code_background),
        ]
        .iter()
        .map(|(name, value)| format!("{indent}--color-{name}: {value};\n"))
        .collect()
    }

    format!(
        ":root {{\n{light}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{dark}    }}\n}}",
        light = vars(&colors.light, "    "),
        dark = vars(&colors.dark, "        "),
    )
}
