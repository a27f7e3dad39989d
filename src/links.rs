//! Link integrity between navigation, redirects, and content files.
//!
//! | Finding | Severity | Meaning |
//! |---|---|---|
//! | `MissingContent` | error | a buildable navigation slug has no `.md`/`.mdx` file |
//! | `BrokenRedirect` | error | a redirect points at a slug with no content file |
//! | `BrokenLink` | error | a document links to `/docs/<slug>` that will not exist |
//! | `Orphan` | info | a content file no navigation item points at |

use crate::nav::Navigation;
use crate::scan::{self, ScanError};
use pulldown_cmark::{Event, Parser, Tag};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Finding {
    MissingContent { slug: String, title: String },
    BrokenRedirect { from: String, to: String },
    BrokenLink { slug: String, target: String },
    Orphan { slug: String },
}

impl Finding {
    pub fn is_error(&self) -> bool {
        !matches!(self, Finding::Orphan { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkReport {
    /// Buildable navigation slugs checked.
    pub checked: usize,
    pub findings: Vec<Finding>,
}

impl LinkReport {
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_error())
    }
}

/// Cross-check navigation and redirects against the content directory.
pub fn check_links(
    nav: &Navigation,
    content_dir: &Path,
    redirects: &BTreeMap<String, String>,
) -> Result<LinkReport, ScanError> {
    let files: BTreeSet<String> = scan::list_doc_slugs(content_dir)?.into_iter().collect();
    let buildable = nav.buildable_slugs();
    let mut findings = Vec::new();

    for slug in &buildable {
        if scan::resolve_doc_path(content_dir, slug)?.is_none() {
            let title = nav
                .find_item(slug)
                .map(|i| i.title.clone())
                .unwrap_or_default();
            findings.push(Finding::MissingContent {
                slug: slug.clone(),
                title,
            });
        }
    }

    for (from, to) in redirects {
        if !matches!(scan::resolve_doc_path(content_dir, to), Ok(Some(_))) {
            findings.push(Finding::BrokenRedirect {
                from: from.clone(),
                to: to.clone(),
            });
        }
    }

    // Pages that will exist after a build.
    let published: BTreeSet<&str> = buildable
        .iter()
        .map(String::as_str)
        .chain(redirects.keys().map(String::as_str))
        .collect();
    for slug in &buildable {
        let Ok(doc) = scan::load_document(content_dir, slug) else {
            continue;
        };
        for target in doc_link_targets(&doc.body) {
            if !published.contains(target.as_str()) {
                findings.push(Finding::BrokenLink {
                    slug: slug.clone(),
                    target,
                });
            }
        }
    }

    let referenced: BTreeSet<&str> = nav
        .items()
        .flat_map(all_slugs)
        .chain(redirects.values().map(String::as_str))
        .collect();
    for slug in &files {
        if !referenced.contains(slug.as_str()) {
            findings.push(Finding::Orphan { slug: slug.clone() });
        }
    }

    Ok(LinkReport {
        checked: buildable.len(),
        findings,
    })
}

fn all_slugs(item: &crate::nav::NavItem) -> Vec<&str> {
    let mut out = Vec::new();
    if !item.external && !item.slug.is_empty() {
        out.push(item.slug.as_str());
    }
    for child in &item.children {
        out.extend(all_slugs(child));
    }
    out
}

/// Slugs of `/docs/...` links in a document body, fragments and `.html` removed.
pub fn doc_link_targets(body: &str) -> Vec<String> {
    let cleaned = crate::markdown::strip_mdx(body);
    let mut targets = BTreeSet::new();
    for event in Parser::new(&cleaned) {
        if let Event::Start(Tag::Link { dest_url, .. }) = event {
            let Some(rest) = dest_url.strip_prefix("/docs/") else {
                continue;
            };
            let path = rest.split(['#', '?']).next().unwrap_or("");
            let slug = path.strip_suffix(".html").unwrap_or(path);
            if !slug.is_empty() {
                targets.insert(slug.to_string());
            }
        }
    }
    targets.into_iter().collect()
}
