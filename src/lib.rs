//! # docsite
//!
//! A static documentation site generator. Markdown and MDX files become
//! styled HTML pages with a navbar, a per-section sidebar, an "On this page"
//! table of contents, and a client-side search index.
//!
//! # Architecture: One Sequential Pipeline
//!
//! ```text
//! config.toml ─┐
//! navigation ──┼─> Site ──> build ──> dist/
//! content/ ────┘        └─> serve ──> HTTP (same pages, rendered per request)
//! ```
//!
//! [`site::build`] runs setup, asset copying, search indexing, document
//! rendering, and the fixed pages in order. A document that fails is recorded
//! and the build continues; the exit status reports it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, validation, merging over stock defaults, and CSS generation |
//! | [`nav`] | Navigation model (navbar → sidebar sections → items), loading, and queries |
//! | [`scan`] | Content discovery: slug → file resolution, document loading, the content tree |
//! | [`frontmatter`] | YAML frontmatter split and typed parse |
//! | [`markdown`] | MDX preprocessing and Markdown → HTML with heading ids and TOC |
//! | [`highlight`] | Token-based syntax highlighting for fenced code |
//! | [`slug`] | Slugify, de-duplicating slugger, titles from path segments |
//! | [`search`] | Search index entries and weighted query scoring |
//! | [`render`] | Maud templates: page shell, navbar, sidebar, TOC, index, redirect, 404 |
//! | [`assets`] | Byte-exact asset copying |
//! | [`site`] | Site loading and the build orchestrator |
//! | [`links`] | Navigation, redirect, and in-document link integrity |
//! | [`server`] | axum server with static files, JSON API, and rendered pages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Parser Events, Not Regexes
//!
//! Markdown goes through `pulldown-cmark`, and the event stream is rewritten
//! in place: headings get ids, code blocks are highlighted, tables wrapped,
//! and JSX spans mapped to HTML. Code is its own node type, so nothing inside
//! a fence is ever mistaken for a heading or a component.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Templates are
//! checked at compile time and every interpolated value is escaped.
//!
//! ## Navigation Is Configuration
//!
//! Page order and grouping come from `navigation.toml`, not from file names.
//! Only navigation items produce pages; [`links`] reports content files no
//! item reaches. Without a navigation file, one is derived from the content
//! tree so a bare directory of Markdown still builds.

pub mod assets;
pub mod config;
pub mod frontmatter;
pub mod highlight;
pub mod links;
pub mod markdown;
pub mod nav;
pub mod output;
pub mod render;
pub mod scan;
pub mod search;
pub mod server;
pub mod site;
pub mod slug;

#[cfg(test)]
pub(crate) mod test_helpers;
