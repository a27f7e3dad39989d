//! HTML page rendering.
//!
//! Every page shares one shell: a navbar across the top, the active navbar
//! section's sidebar on the left, content in the middle, and an "On this page"
//! table of contents on the right.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Logo Title   Runtime  Guides     [ search ]    API  ↗    │  navbar
//! ├────────────┬────────────────────────────┬────────────────┤
//! │ Getting    │ Runtime › Getting Started  │ On this page   │
//! │ Started    │ # Title                    │  Install       │
//! │  Intro     │ description                │  Configure     │
//! │  Install ● │ ...body...                 │                │
//! │ ────────── │                            │                │
//! │ Reference  │ ← Previous      Next →     │                │
//! └────────────┴────────────────────────────┴────────────────┘
//! ```
//!
//! ## Generated Pages
//!
//! - **Doc pages** (`/docs/{slug}.html`)
//! - **Index page** (`/index.html`): hero plus one card per navbar section
//! - **Redirect pages** (`/docs/{from}.html`): meta refresh to the target
//! - **Not-found page** (`/404.html`)
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time and inlined into each page:
//! - `static/style.css`: layout and components (colors injected from config)
//! - `static/site.js`: search box, TOC scroll tracking, sidebar toggles, copy buttons
//!
//! Templates are [maud](https://maud.lambda.xyz/) macros, so every
//! interpolated value is escaped unless wrapped in `PreEscaped`.

use crate::config::{self, SiteConfig};
use crate::markdown::{Heading, RenderedDoc};
use crate::nav::{NavItem, NavbarSection, Navigation, doc_href};
use crate::scan::Document;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/site.js");

/// Renders pages for one site: configuration, navigation, and the
/// precomputed stylesheet.
pub struct Renderer<'a> {
    config: &'a SiteConfig,
    nav: &'a Navigation,
    css: String,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a SiteConfig, nav: &'a Navigation) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        Self {
            config,
            nav,
            css: format!("{}\n\n{}", color_css, CSS_STATIC),
        }
    }

    fn page_title(&self, title: &str) -> String {
        format!("{} | {}", title, self.config.site.title)
    }

    /// A documentation page.
    pub fn doc_page(&self, doc: &Document, rendered: &RenderedDoc) -> Markup {
        let title = doc.title();
        let description = doc
            .frontmatter
            .description
            .as_deref()
            .or(self.nav.find_item(&doc.slug).and_then(|i| i.description.as_deref()));
        let active = self.active_navbar(&doc.slug);
        let toc = rendered.toc(self.config.toc.min_depth, self.config.toc.max_depth);
        let body_has_title = rendered.headings.first().is_some_and(|h| h.depth == 1);
        let crumbs = self.nav.breadcrumbs(&doc.slug);

        let content = html! {
            (self.navbar(active.map(|n| n.id.as_str())))
            div.layout {
                (self.sidebar(active, Some(doc.slug.as_str())))
                main.content {
                    @if !crumbs.is_empty() {
                        nav.breadcrumbs aria-label="Breadcrumb" {
                            @for (i, crumb) in crumbs.iter().enumerate() {
                                @if i > 0 { span.breadcrumb-separator { "›" } }
                                span.breadcrumb { (crumb) }
                            }
                        }
                    }
                    header.doc-header {
                        @if !body_has_title {
                            h1 { (title) }
                        }
                        @if let Some(desc) = description {
                            p.doc-description { (desc) }
                        }
                    }
                    article.doc-body {
                        (PreEscaped(&rendered.html))
                    }
                    (self.pager(&doc.slug))
                }
                (render_toc(&toc))
            }
        };

        base_document(&self.page_title(&title), description, &self.css, Some("doc-page"), content)
    }

    /// The landing page.
    pub fn index_page(&self) -> Markup {
        let site = &self.config.site;
        let content = html! {
            (self.navbar(None))
            main.index-page {
                section.hero {
                    h1 { (site.title) }
                    p.hero-tagline { (site.tagline.as_deref().unwrap_or(&site.description)) }
                    a.button.button-primary href=(doc_href(&site.home_slug)) { "Get started" }
                }
                div.card-grid {
                    @for navbar in &self.nav.navbar {
                        @let link = navbar.link();
                        div.card {
                            h3.card-title {
                                @match &link {
                                    Some(href) => { a href=(href) { (navbar.title) } }
                                    None => { (navbar.title) }
                                }
                            }
                            @for section in &navbar.sections {
                                h4.card-section { (section.title) }
                                ul.card-links {
                                    @for item in &section.items {
                                        li {
                                            @if item.coming_soon {
                                                span.coming-soon { (item.title) " " span.badge { "Soon" } }
                                            } @else if item.is_group() {
                                                span { (item.title) }
                                            } @else {
                                                a href=(item.href()) { (item.title) }
                                            }
                                            @if let Some(desc) = &item.description {
                                                span.card-link-description { (desc) }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        };
        base_document(&site.title, Some(&site.description), &self.css, Some("index"), content)
    }

    /// The not-found page.
    pub fn not_found_page(&self) -> Markup {
        let content = html! {
            (self.navbar(None))
            main.not-found {
                h1 { "Page not found" }
                p { "The page you are looking for does not exist or has moved." }
                a.button href="/" { "Back to overview" }
            }
        };
        base_document(&self.page_title("Page not found"), None, &self.css, Some("not-found-page"), content)
    }

    fn active_navbar(&self, slug: &str) -> Option<&'a NavbarSection> {
        self.nav
            .navbar_for_slug(slug)
            .or_else(|| self.nav.left().next())
    }

    /// Top bar: brand, left sections, search box, right sections.
    fn navbar(&self, active_id: Option<&str>) -> Markup {
        let site = &self.config.site;
        html! {
            header.navbar {
                button.sidebar-toggle type="button" aria-label="Toggle navigation" { "☰" }
                a.brand href="/" {
                    @if let Some(logo) = &site.logo {
                        img.brand-logo src=(logo) alt="";
                    }
                    span.brand-title { (site.title) }
                }
                nav.navbar-sections.navbar-left {
                    @for section in self.nav.left() {
                        (navbar_link(section, active_id))
                    }
                }
                div.search {
                    input id="search-input" type="search" placeholder="Search docs..."
                        autocomplete="off" aria-label="Search documentation";
                    div.search-results id="search-results" hidden {}
                }
                nav.navbar-sections.navbar-right {
                    @for section in self.nav.right() {
                        (navbar_link(section, active_id))
                    }
                }
            }
        }
    }

    /// Sidebar for the active navbar section.
    fn sidebar(&self, navbar: Option<&NavbarSection>, current: Option<&str>) -> Markup {
        let links = &self.config.links;
        html! {
            aside.sidebar {
                @if let Some(navbar) = navbar {
                    @for (i, section) in navbar.sections.iter().enumerate() {
                        @if i > 0 { hr.sidebar-separator; }
                        div.sidebar-section {
                            h4.sidebar-section-title { (section.title) }
                            ul.nav-list {
                                @for item in &section.items {
                                    (render_nav_item(item, current, 1))
                                }
                            }
                        }
                    }
                }
                @if links.github.is_some() || links.discord.is_some() {
                    div.sidebar-footer {
                        @if let Some(href) = &links.github {
                            a href=(href) target="_blank" rel="noopener noreferrer" { "GitHub" }
                        }
                        @if let Some(href) = &links.discord {
                            a href=(href) target="_blank" rel="noopener noreferrer" { "Discord" }
                        }
                    }
                }
            }
        }
    }

    /// Previous/next links in navigation order.
    fn pager(&self, slug: &str) -> Markup {
        let slugs = self.nav.buildable_slugs();
        let Some(pos) = slugs.iter().position(|s| s == slug) else {
            return html! {};
        };
        let link = |s: &String| {
            let title = self
                .nav
                .find_item(s)
                .map(|i| i.title.clone())
                .unwrap_or_else(|| s.clone());
            (doc_href(s), title)
        };
        let prev = pos.checked_sub(1).and_then(|i| slugs.get(i)).map(link);
        let next = slugs.get(pos + 1).map(link);
        html! {
            nav.pager {
                @if let Some((href, title)) = prev {
                    a.pager-prev href=(href) { span.pager-label { "Previous" } span.pager-title { (title) } }
                }
                @if let Some((href, title)) = next {
                    a.pager-next href=(href) { span.pager-label { "Next" } span.pager-title { (title) } }
                }
            }
        }
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(
    title: &str,
    description: Option<&str>,
    css: &str,
    body_class: Option<&str>,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if let Some(desc) = description {
                    meta name="description" content=(desc);
                }
                link rel="icon" type="image/svg+xml" href="/assets/favicon.svg";
                link rel="apple-touch-icon" href="/assets/apple-touch-icon.png";
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

fn navbar_link(section: &NavbarSection, active_id: Option<&str>) -> Markup {
    let is_active = active_id == Some(section.id.as_str());
    let href = section.link().unwrap_or_else(|| "#".to_string());
    let external = section.href.as_deref().is_some_and(|h| h.starts_with("http"));
    html! {
        @if external {
            a.navbar-link href=(href) target="_blank" rel="noopener noreferrer" { (section.title) " ↗" }
        } @else {
            a.navbar-link.active[is_active] href=(href) { (section.title) }
        }
    }
}

/// One sidebar entry and, up to three levels deep, its children.
///
/// Branches holding the current page render expanded.
pub fn render_nav_item(item: &NavItem, current: Option<&str>, depth: usize) -> Markup {
    let is_current = current.is_some_and(|c| !item.slug.is_empty() && item.slug == c && !item.external);
    let expanded = current.is_some_and(|c| item.contains_slug(c));
    let label = html! {
        @if item.external {
            a.nav-link.external href=(item.href()) target="_blank" rel="noopener noreferrer" {
                (item.title) span.external-marker aria-hidden="true" { "↗" }
            }
        } @else if item.coming_soon {
            span.nav-link.coming-soon aria-disabled="true" {
                (item.title) " " span.badge { "Soon" }
            }
        } @else if item.is_group() {
            span.nav-group-label { (item.title) }
        } @else {
            a.nav-link.current[is_current] href=(item.href())
                aria-current=[is_current.then_some("page")] {
                (item.title)
            }
        }
    };
    let show_children = !item.children.is_empty() && !item.coming_soon && depth < 3;

    html! {
        li class={ "nav-item depth-" (depth) } {
            @if show_children {
                details.nav-branch open[expanded || item.is_group()] {
                    summary { (label) }
                    ul.nav-children {
                        @for child in &item.children {
                            (render_nav_item(child, current, depth + 1))
                        }
                    }
                }
            } @else {
                (label)
            }
        }
    }
}

/// "On this page" list, or a placeholder when nothing qualifies.
pub fn render_toc(headings: &[&Heading]) -> Markup {
    html! {
        aside.toc {
            h4.toc-title { "On this page" }
            @if headings.is_empty() {
                p.toc-empty { "No sections found" }
            } @else {
                ul.toc-list {
                    @for heading in headings {
                        li class={ "toc-item toc-depth-" (heading.depth) } {
                            a href={ "#" (heading.id) } data-heading=(heading.id) { (heading.text) }
                        }
                    }
                }
            }
        }
    }
}

/// A page that forwards to `target` via meta refresh, canonical link, and script.
pub fn redirect_page(target: &str) -> Markup {
    let js_target = serde_json::Value::String(target.to_string())
        .to_string()
        .replace("</", "<\\/");
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "Redirecting..." }
                meta http-equiv="refresh" content={ "0; url=" (target) };
                link rel="canonical" href=(target);
                script { (PreEscaped(format!("window.location.replace({js_target});"))) }
            }
            body {
                p { "Redirecting to " a href=(target) { (target) } "..." }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
