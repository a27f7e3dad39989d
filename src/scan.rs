//! Content discovery: resolving slugs to files and reading documents.
//!
//! The content directory holds Markdown (`.md`) and MDX (`.mdx`) files.
//! A document's slug is its path relative to the content root, without the
//! extension; `index` files name their directory:
//!
//! ```text
//! content/docs/
//! ├── readme.mdx                   # slug: readme
//! ├── getting-started.md           # slug: getting-started
//! ├── javascript/
//! │   ├── index.mdx                # slug: javascript
//! │   └── node-fs.mdx              # slug: javascript/node-fs
//! └── _drafts/                     # leading `_` or `.` = ignored
//! ```
//!
//! ## Slug Resolution
//!
//! [`resolve_doc_path`] tries, in order: `<slug>.mdx`, `<slug>.md`,
//! `<slug>/index.mdx`, `<slug>/index.md`; the empty slug maps to the root
//! `index` file. Slugs that would escape the content root (`..`, absolute
//! paths) are rejected before touching the filesystem.
//!
//! ## Content Tree
//!
//! [`content_tree`] mirrors the directory structure as [`ContentNode`]s, with
//! titles and sort keys taken from frontmatter. Siblings are ordered by
//! `order` (missing sorts last), then by title.

use crate::frontmatter::{self, Frontmatter, FrontmatterError};
use crate::slug::title_from_segment;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Content directory not found: {0}")]
    ContentDirMissing(PathBuf),
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),
    #[error("{path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

pub const DOC_EXTENSIONS: &[&str] = &["mdx", "md"];

/// A loaded document: frontmatter split from the Markdown body.
#[derive(Debug, Clone)]
pub struct Document {
    pub slug: String,
    pub path: PathBuf,
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Document {
    /// Frontmatter title, else the first level-1 heading of the rendered
    /// body, else the slug's last segment as a title.
    pub fn title(&self) -> String {
        if let Some(title) = self.frontmatter.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title.trim().to_string();
        }
        crate::markdown::render(&self.body)
            .headings
            .into_iter()
            .find(|h| h.depth == 1)
            .map(|h| h.text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title_from_segment(self.slug.rsplit('/').next().unwrap_or(&self.slug)))
    }
}

/// A node of the content tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentNode {
    Doc {
        title: String,
        slug: String,
        order: Option<i64>,
        description: Option<String>,
    },
    Section {
        title: String,
        slug: String,
        order: Option<i64>,
        /// Has its own `index` page.
        index: bool,
        children: Vec<ContentNode>,
    },
}

impl ContentNode {
    pub fn title(&self) -> &str {
        match self {
            ContentNode::Doc { title, .. } | ContentNode::Section { title, .. } => title,
        }
    }

    pub fn order(&self) -> Option<i64> {
        match self {
            ContentNode::Doc { order, .. } | ContentNode::Section { order, .. } => *order,
        }
    }
}

/// Reject slugs that are empty or could escape the content root.
pub fn validate_slug(slug: &str) -> Result<(), ScanError> {
    let bad = slug.is_empty()
        || slug.contains('\\')
        || slug.contains('\0')
        || slug
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        Err(ScanError::InvalidSlug(slug.to_string()))
    } else {
        Ok(())
    }
}

/// Find the file backing `slug`, if any.
///
/// The empty slug is the content root's `index` file.
pub fn resolve_doc_path(content_dir: &Path, slug: &str) -> Result<Option<PathBuf>, ScanError> {
    if slug.is_empty() {
        return Ok(DOC_EXTENSIONS
            .iter()
            .map(|ext| content_dir.join(format!("index.{ext}")))
            .find(|p| p.is_file()));
    }
    validate_slug(slug)?;
    let base = content_dir.join(slug);
    let candidates = DOC_EXTENSIONS
        .iter()
        .map(|ext| base.with_extension(ext))
        .chain(DOC_EXTENSIONS.iter().map(|ext| base.join(format!("index.{ext}"))));
    for candidate in candidates {
        if candidate.is_file() {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Resolve, read, and split a document.
pub fn load_document(content_dir: &Path, slug: &str) -> Result<Document, ScanError> {
    let path = resolve_doc_path(content_dir, slug)?
        .ok_or_else(|| ScanError::DocumentNotFound(slug.to_string()))?;
    let source = fs::read_to_string(&path)?;
    let (frontmatter, body) = frontmatter::parse(&source).map_err(|source| ScanError::Frontmatter {
        path: path.clone(),
        source,
    })?;
    Ok(Document {
        slug: slug.to_string(),
        body: body.to_string(),
        path,
        frontmatter,
    })
}

pub fn ensure_content_dir(content_dir: &Path) -> Result<(), ScanError> {
    if content_dir.is_dir() {
        Ok(())
    } else {
        Err(ScanError::ContentDirMissing(content_dir.to_path_buf()))
    }
}

/// Every document slug under `content_dir`, sorted.
pub fn list_doc_slugs(content_dir: &Path) -> Result<Vec<String>, ScanError> {
    ensure_content_dir(content_dir)?;
    let mut slugs = Vec::new();
    let walker = WalkDir::new(content_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(e.file_name().to_string_lossy().as_ref()));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_doc_file(entry.path()) {
            continue;
        }
        let rel = entry.path().strip_prefix(content_dir).unwrap_or(entry.path());
        if let Some(slug) = slug_for_path(rel) {
            slugs.push(slug);
        }
    }
    slugs.sort();
    slugs.dedup();
    Ok(slugs)
}

/// Slug for a content-relative file path. `dir/index.md` → `dir`.
pub fn slug_for_path(rel: &Path) -> Option<String> {
    let stem = rel.file_stem()?.to_string_lossy().to_string();
    let parent: Vec<String> = rel
        .parent()
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    if stem == "index" && !parent.is_empty() {
        return Some(parent.join("/"));
    }
    let mut parts = parent;
    parts.push(stem);
    Some(parts.join("/"))
}

fn is_doc_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| DOC_EXTENSIONS.contains(&e.as_str()))
}

fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

// ============================================================================
// Content tree
// ============================================================================

/// Build the ordered content tree for `content_dir`.
pub fn content_tree(content_dir: &Path) -> Result<Vec<ContentNode>, ScanError> {
    ensure_content_dir(content_dir)?;
    scan_directory(content_dir, content_dir)
}

fn scan_directory(dir: &Path, root: &Path) -> Result<Vec<ContentNode>, ScanError> {
    let mut nodes = Vec::new();
    for path in collect_entries(dir)? {
        let rel = path.strip_prefix(root).unwrap_or(&path);
        if path.is_dir() {
            let children = scan_directory(&path, root)?;
            let Some(slug) = slug_for_path(&rel.join("index.md")) else {
                continue;
            };
            let index = DOC_EXTENSIONS
                .iter()
                .map(|ext| path.join(format!("index.{ext}")))
                .find(|p| p.is_file());
            if children.is_empty() && index.is_none() {
                continue;
            }
            let frontmatter = match &index {
                Some(p) => read_frontmatter(p)?,
                None => Frontmatter::default(),
            };
            let dir_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            nodes.push(ContentNode::Section {
                title: frontmatter
                    .title
                    .unwrap_or_else(|| title_from_segment(&dir_name)),
                slug,
                order: frontmatter.order,
                index: index.is_some(),
                children,
            });
        } else if is_doc_file(&path) {
            if path.file_stem().is_some_and(|s| s == "index") && dir != root {
                continue;
            }
            let Some(slug) = slug_for_path(rel) else {
                continue;
            };
            let frontmatter = read_frontmatter(&path)?;
            let fallback = slug.rsplit('/').next().unwrap_or(&slug).to_string();
            nodes.push(ContentNode::Doc {
                title: frontmatter
                    .title
                    .unwrap_or_else(|| title_from_segment(&fallback)),
                slug,
                order: frontmatter.order,
                description: frontmatter.description,
            });
        }
    }
    nodes.sort_by(compare_nodes);
    Ok(nodes)
}

fn compare_nodes(a: &ContentNode, b: &ContentNode) -> Ordering {
    let key = |n: &ContentNode| n.order().unwrap_or(i64::MAX);
    key(a)
        .cmp(&key(b))
        .then_with(|| a.title().cmp(b.title()))
}

fn collect_entries(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| !is_ignored(&n.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();
    Ok(entries)
}

fn read_frontmatter(path: &Path) -> Result<Frontmatter, ScanError> {
    let source = fs::read_to_string(path)?;
    frontmatter::parse(&source)
        .map(|(fm, _)| fm)
        .map_err(|source| ScanError::Frontmatter {
            path: path.to_path_buf(),
            source,
        })
}
