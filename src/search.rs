//! Search index generation and query scoring.
//!
//! The index is a flat list of [`SearchEntry`] values, one per navigation item,
//! written to `dist/search-index.json` and scored client-side by `site.js`.
//! [`query`] implements the same scoring for the `search` CLI command and the
//! `/api/search` endpoint.
//!
//! ```text
//! navbar "Runtime" / section "Getting Started" / item "JavaScript" / child "Node API"
//!   → { title: "Node API", category: "Runtime", section: "Getting Started",
//!       path: "JavaScript > Node API", href: "/docs/node-api.html", content: "..." }
//! ```

use crate::markdown::plain_text;
use crate::nav::{NavItem, Navigation};
use crate::scan::{self, ScanError};
use serde::{Deserialize, Serialize};
use std::path::Path;

const TITLE_WEIGHT: f64 = 0.5;
const CONTENT_WEIGHT: f64 = 0.3;
const SECTION_WEIGHT: f64 = 0.1;
const CATEGORY_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub title: String,
    pub slug: String,
    pub href: String,
    /// Sidebar section title.
    pub section: String,
    /// Navbar section title.
    pub category: String,
    /// Ancestor item titles and this title, joined with ` > `.
    pub path: String,
    /// Leading plain text of the document.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit<'a> {
    pub score: f64,
    pub entry: &'a SearchEntry,
}

/// Build one entry per navigation item, recursively, skipping coming-soon
/// items and their subtrees. Group labels contribute to `path` only.
pub fn build_search_index(
    nav: &Navigation,
    content_dir: &Path,
    content_chars: usize,
) -> Vec<SearchEntry> {
    let mut entries = Vec::new();
    for navbar in &nav.navbar {
        for section in &navbar.sections {
            let ctx = EntryContext {
                section: &section.title,
                category: &navbar.title,
                content_dir,
                content_chars,
            };
            for item in &section.items {
                collect(item, &ctx, &[], &mut entries);
            }
        }
    }
    entries
}

struct EntryContext<'a> {
    section: &'a str,
    category: &'a str,
    content_dir: &'a Path,
    content_chars: usize,
}

fn collect(item: &NavItem, ctx: &EntryContext, parents: &[&str], out: &mut Vec<SearchEntry>) {
    if item.coming_soon {
        return;
    }
    let mut trail: Vec<&str> = parents.to_vec();
    trail.push(&item.title);

    if !item.is_group() {
        let content = if item.external {
            String::new()
        } else {
            excerpt(ctx.content_dir, &item.slug, ctx.content_chars)
        };
        out.push(SearchEntry {
            title: item.title.clone(),
            slug: item.slug.clone(),
            href: item.href(),
            section: ctx.section.to_string(),
            category: ctx.category.to_string(),
            path: trail.join(" > "),
            content,
        });
    }

    for child in &item.children {
        collect(child, ctx, &trail, out);
    }
}

/// First `max_chars` characters of a document's plain text. Missing or
/// unreadable documents give an empty excerpt.
pub fn excerpt(content_dir: &Path, slug: &str, max_chars: usize) -> String {
    match scan::load_document(content_dir, slug) {
        Ok(doc) => plain_text(&doc.body).chars().take(max_chars).collect(),
        Err(ScanError::DocumentNotFound(_)) => {
            tracing::debug!(slug, "no content file, indexing title only");
            String::new()
        }
        Err(e) => {
            tracing::warn!(slug, error = %e, "could not read document for search index");
            String::new()
        }
    }
}

// ============================================================================
// Querying
// ============================================================================

/// Score every entry against `q` and return the best `limit`, highest first.
///
/// Queries shorter than `min_len` characters (after trimming) match nothing.
pub fn query<'a>(
    index: &'a [SearchEntry],
    q: &str,
    min_len: usize,
    limit: usize,
) -> Vec<SearchHit<'a>> {
    let q = q.trim().to_lowercase();
    if q.chars().count() < min_len {
        return Vec::new();
    }
    let terms: Vec<&str> = q.split_whitespace().collect();

    let mut hits: Vec<SearchHit> = index
        .iter()
        .filter_map(|entry| {
            let score = TITLE_WEIGHT * field_score(&entry.title, &q, &terms)
                + CONTENT_WEIGHT * field_score(&entry.content, &q, &terms)
                + SECTION_WEIGHT * field_score(&entry.section, &q, &terms)
                + CATEGORY_WEIGHT * field_score(&entry.category, &q, &terms);
            (score > 0.0).then_some(SearchHit { score, entry })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.entry.title.cmp(&b.entry.title))
    });
    hits.truncate(limit);
    hits
}

/// 0.0–1.0 match strength of `q` in `field`.
///
/// Whole-query matches rank exact > prefix > word start > substring. Otherwise
/// the score is the fraction of terms found, scaled below a substring match.
fn field_score(field: &str, q: &str, terms: &[&str]) -> f64 {
    let field = field.to_lowercase();
    if field.is_empty() {
        return 0.0;
    }
    if field == q {
        return 1.0;
    }
    if field.starts_with(q) {
        return 0.8;
    }
    if let Some(pos) = field.find(q) {
        let at_word_start = field[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        return if at_word_start { 0.6 } else { 0.4 };
    }
    if terms.len() > 1 {
        let found = terms.iter().filter(|t| field.contains(*t)).count();
        return 0.3 * found as f64 / terms.len() as f64;
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{NavbarSection, Position, SidebarSection};
    use std::fs;
    use tempfile::TempDir;

    fn item(title: &str, slug: &str) -> NavItem {
        NavItem {
            title: title.into(),
            slug: slug.into(),
            ..Default::default()
        }
    }

    fn sample_nav() -> Navigation {
        let mut js = item("JavaScript", "javascript");
        js.children = vec![item("Node API", "node-api"), {
            let mut soon = item("Workers", "workers");
            soon.coming_soon = true;
            soon.children = vec![item("Hidden", "hidden")];
            soon
        }];
        let mut group = item("Guides", "");
        group.children = vec![item("Deploy", "deploy")];
        let github = NavItem {
            title: "GitHub".into(),
            external: true,
            href: Some("https://github.com/acme".into()),
            ..Default::default()
        };
        Navigation {
            navbar: vec![NavbarSection {
                id: "runtime".into(),
                title: "Runtime".into(),
                position: Position::Left,
                href: None,
                sections: vec![SidebarSection {
                    title: "Getting Started".into(),
                    items: vec![item("Introduction", "introduction"), js, group, github],
                }],
            }],
        }
    }

    fn entry(title: &str, content: &str, section: &str, category: &str) -> SearchEntry {
        SearchEntry {
            title: title.into(),
            slug: title.to_lowercase(),
            href: format!("/docs/{}.html", title.to_lowercase()),
            section: section.into(),
            category: category.into(),
            path: title.into(),
            content: content.into(),
        }
    }

    // =========================================================================
    // Index building
    // =========================================================================

    #[test]
    fn index_walks_children_and_skips_coming_soon() {
        let tmp = TempDir::new().unwrap();
        let index = build_search_index(&sample_nav(), tmp.path(), 500);
        let titles: Vec<&str> = index.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "JavaScript", "Node API", "Deploy", "GitHub"]);
    }

    #[test]
    fn index_entry_fields() {
        let tmp = TempDir::new().unwrap();
        let index = build_search_index(&sample_nav(), tmp.path(), 500);
        let node = index.iter().find(|e| e.slug == "node-api").unwrap();
        assert_eq!(node.href, "/docs/node-api.html");
        assert_eq!(node.section, "Getting Started");
        assert_eq!(node.category, "Runtime");
        assert_eq!(node.path, "JavaScript > Node API");

        let deploy = index.iter().find(|e| e.slug == "deploy").unwrap();
        assert_eq!(deploy.path, "Guides > Deploy");

        let github = index.iter().find(|e| e.title == "GitHub").unwrap();
        assert_eq!(github.href, "https://github.com/acme");
    }

    #[test]
    fn index_content_is_truncated_plain_text() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("introduction.mdx"),
            "---\ntitle: Intro\n---\n# Hello **world**\n\n```js\nsecret()\n```\n\nSome text here.\n",
        )
        .unwrap();
        let index = build_search_index(&sample_nav(), tmp.path(), 11);
        let intro = &index[0];
        assert_eq!(intro.content, "Hello world");
        assert!(index[1].content.is_empty(), "missing file gives empty excerpt");
    }

    #[test]
    fn excerpt_excludes_code() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "Before\n\n```sh\nrm -rf /\n```\n\nAfter\n").unwrap();
        let text = excerpt(tmp.path(), "a", 500);
        assert!(text.contains("Before"));
        assert!(text.contains("After"));
        assert!(!text.contains("rm -rf"));
    }

    // =========================================================================
    // Querying
    // =========================================================================

    #[test]
    fn short_query_returns_nothing() {
        let index = vec![entry("Install", "", "Start", "Docs")];
        assert!(query(&index, "i", 2, 8).is_empty());
        assert!(query(&index, "  i  ", 2, 8).is_empty());
        assert_eq!(query(&index, "in", 2, 8).len(), 1);
    }

    #[test]
    fn title_outweighs_content() {
        let index = vec![
            entry("Overview", "how to install the cli", "Start", "Docs"),
            entry("Install", "getting set up", "Start", "Docs"),
        ];
        let hits = query(&index, "install", 2, 8);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entry.title, "Install");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn query_is_case_insensitive() {
        let index = vec![entry("Node API", "", "Runtime", "Docs")];
        let hits = query(&index, "NODE", 2, 8);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn section_and_category_contribute() {
        let index = vec![
            entry("Tuning", "", "Performance", "Docs"),
            entry("Colors", "", "Theming", "Docs"),
        ];
        let hits = query(&index, "performance", 2, 8);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.title, "Tuning");
        assert!((hits[0].score - SECTION_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn results_are_limited() {
        let index: Vec<SearchEntry> = (0..20)
            .map(|i| entry(&format!("Page {i}"), "", "S", "C"))
            .collect();
        assert_eq!(query(&index, "page", 2, 8).len(), 8);
    }

    #[test]
    fn field_score_ranking() {
        let terms = ["api"];
        assert_eq!(field_score("API", "api", &terms), 1.0);
        assert_eq!(field_score("api reference", "api", &terms), 0.8);
        assert_eq!(field_score("node api", "api", &terms), 0.6);
        assert_eq!(field_score("rapid", "api", &terms), 0.4);
        assert_eq!(field_score("nothing", "api", &terms), 0.0);
    }

    #[test]
    fn multi_term_partial_match() {
        let terms = ["node", "deploy"];
        let score = field_score("node runtime", "node deploy", &terms);
        assert!((score - 0.15).abs() < 1e-9);
    }
}
