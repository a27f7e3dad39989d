//! Slug and title derivation shared by headings, content paths, and navigation.
//!
//! Every identifier that ends up in a URL or an `id=` attribute goes through
//! [`slugify`], so anchors, page filenames, and search hrefs agree on one
//! normalization:
//!
//! - `"Getting Started"` → `getting-started`
//! - `"  API: fs.readFile()  "` → `api-fs-readfile`
//! - `"--already-a-slug--"` → `already-a-slug`
//!
//! Headings inside one document are passed through a [`Slugger`], which
//! appends `-1`, `-2`, ... when the same text appears more than once.

use std::collections::HashMap;

/// Normalize text into a URL-safe slug.
///
/// Lowercases, replaces every run of characters outside `[a-z0-9]` with a
/// single `-`, and trims leading/trailing dashes. Idempotent.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// De-duplicating slug generator, scoped to one document.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify `text`, suffixing `-N` if the slug was already handed out.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() {
            "section".to_string()
        } else {
            base
        };

        let mut candidate = base.clone();
        while self.seen.contains_key(&candidate) {
            let count = self.seen.entry(base.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{}-{}", base, count);
        }
        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}

/// Turn a path segment into a display title.
///
/// `getting-started` → "Getting Started", `node_api` → "Node Api".
pub fn title_from_segment(segment: &str) -> String {
    segment
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
