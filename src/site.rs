//! Site loading and the static build.
//!
//! [`Site::load`] resolves everything a build, check, or server needs:
//! configuration, project paths, and navigation. [`build`] then runs the
//! pipeline in a fixed order:
//!
//! ```text
//! 1. setup          remove dist/, create dist/{docs,assets}
//! 2. assets         public/ → dist/assets/, assets/fonts/ → dist/assets/fonts/
//! 3. search index   one entry per navigation item
//! 4. documents      each buildable slug → dist/docs/<slug>.html
//! 5. index page     dist/index.html
//! 6. redirects      dist/docs/<from>.html → /docs/<to>.html
//! 7. not found      dist/404.html
//! 8. search file    dist/search-index.json
//! ```
//!
//! A document that fails to load or render is recorded in
//! [`BuildReport::errors`] and the loop moves on. Anything else (missing
//! content directory, unwritable output) aborts with a [`BuildError`].

use crate::assets::{self, CopyStats};
use crate::config::{self, ConfigError, ProjectPaths, SiteConfig};
use crate::markdown;
use crate::nav::{self, NavError, Navigation, doc_href};
use crate::render::{self, Renderer};
use crate::scan::{self, ScanError};
use crate::search::{self, SearchEntry};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Nav(#[from] NavError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to copy {label}: {source}")]
    Assets {
        label: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Refusing to clear output directory {0}: it contains the project or its content")]
    UnsafeOutput(PathBuf),
}

/// Everything needed to build or serve one project.
#[derive(Debug, Clone)]
pub struct Site {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub paths: ProjectPaths,
    pub nav: Navigation,
    /// True when navigation was derived from the content tree.
    pub derived_nav: bool,
}

impl Site {
    /// Load config and navigation for the project at `root`.
    pub fn load(root: &Path) -> Result<Self, BuildError> {
        let config = config::load_config(root)?;
        Self::with_config(root, config)
    }

    pub fn with_config(root: &Path, config: SiteConfig) -> Result<Self, BuildError> {
        let paths = config.paths.resolve(root);
        scan::ensure_content_dir(&paths.content)?;
        let (nav, derived_nav) = load_navigation(&paths, &config)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            paths,
            nav,
            derived_nav,
        })
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.config, &self.nav)
    }

    pub fn search_index(&self) -> Vec<SearchEntry> {
        search::build_search_index(
            &self.nav,
            &self.paths.content,
            self.config.search.content_chars,
        )
    }
}

/// `navigation.toml` if present, else a navigation derived from the content tree.
pub fn load_navigation(
    paths: &ProjectPaths,
    config: &SiteConfig,
) -> Result<(Navigation, bool), BuildError> {
    if paths.navigation.is_file() {
        tracing::debug!(path = %paths.navigation.display(), "loading navigation");
        return Ok((nav::load(&paths.navigation)?, false));
    }
    tracing::info!(
        path = %paths.navigation.display(),
        "no navigation file, deriving navigation from content tree"
    );
    let tree = scan::content_tree(&paths.content)?;
    let nav = Navigation::from_content_tree(&tree, &config.site.title);
    nav.validate()?;
    Ok((nav, true))
}

// ============================================================================
// Build report and progress events
// ============================================================================

/// A document that could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub slug: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Documents written successfully.
    pub pages: usize,
    pub errors: Vec<PageError>,
    pub elapsed: Duration,
    pub output_dir: PathBuf,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Progress emitted while building.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    Stage {
        name: &'static str,
    },
    AssetsCopied {
        label: &'static str,
        files: usize,
        bytes: u64,
    },
    AssetsSkipped {
        label: &'static str,
        path: PathBuf,
    },
    SearchIndexBuilt {
        entries: usize,
    },
    PageBuilt {
        index: usize,
        slug: String,
        title: String,
        output: String,
    },
    PageFailed {
        index: usize,
        slug: String,
        message: String,
    },
    Written {
        label: String,
        output: String,
    },
}

fn emit(progress: &Option<Sender<BuildEvent>>, event: BuildEvent) {
    if let Some(tx) = progress {
        tx.send(event).ok();
    }
}

// ============================================================================
// Build
// ============================================================================

/// Build the static site into `site.paths.output`.
pub fn build(
    site: &Site,
    progress: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    let out = &site.paths.output;
    let docs_dir = out.join("docs");
    let assets_dir = out.join("assets");

    emit(&progress, BuildEvent::Stage { name: "Preparing output" });
    prepare_output(site)?;
    fs::create_dir_all(&docs_dir)?;
    fs::create_dir_all(&assets_dir)?;

    emit(&progress, BuildEvent::Stage { name: "Copying assets" });
    let asset_steps: [(&'static str, PathBuf, PathBuf, bool); 3] = [
        ("public", site.paths.public.clone(), assets_dir.clone(), true),
        ("fonts", site.paths.assets.join("fonts"), assets_dir.join("fonts"), true),
        ("assets", site.paths.assets.clone(), assets_dir.clone(), false),
    ];
    for (label, src, dst, recursive) in asset_steps {
        let copied = if recursive {
            assets::copy_dir(&src, &dst)
        } else {
            assets::copy_top_level_files(&src, &dst)
        }
        .map_err(|source| BuildError::Assets { label, source })?;
        match copied {
            Some(CopyStats { files, bytes }) => {
                emit(&progress, BuildEvent::AssetsCopied { label, files, bytes })
            }
            None => {
                tracing::warn!(path = %src.display(), "{label} directory not found, skipping");
                emit(&progress, BuildEvent::AssetsSkipped { label, path: src });
            }
        }
    }

    emit(&progress, BuildEvent::Stage { name: "Building search index" });
    let index = site.search_index();
    emit(&progress, BuildEvent::SearchIndexBuilt { entries: index.len() });

    emit(&progress, BuildEvent::Stage { name: "Rendering documents" });
    let renderer = site.renderer();
    let slugs = site.nav.buildable_slugs();
    let mut pages = 0;
    let mut errors = Vec::new();
    for (i, slug) in slugs.iter().enumerate() {
        let index = i + 1;
        match build_page(site, &renderer, slug, &docs_dir) {
            Ok(title) => {
                pages += 1;
                emit(
                    &progress,
                    BuildEvent::PageBuilt {
                        index,
                        slug: slug.clone(),
                        title,
                        output: format!("docs/{slug}.html"),
                    },
                );
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(slug = %slug, error = %message, "page failed");
                emit(
                    &progress,
                    BuildEvent::PageFailed {
                        index,
                        slug: slug.clone(),
                        message: message.clone(),
                    },
                );
                errors.push(PageError {
                    slug: slug.clone(),
                    message,
                });
            }
        }
    }

    emit(&progress, BuildEvent::Stage { name: "Writing site pages" });
    write_page(out, "index.html", &renderer.index_page().into_string())?;
    emit(&progress, written("Home", "index.html"));

    for (from, to) in &site.config.redirects {
        if slugs.contains(from) {
            tracing::warn!(from = %from, "redirect source is a real page, skipping");
            continue;
        }
        if let Err(e) = scan::validate_slug(from) {
            tracing::warn!(error = %e, "skipping redirect");
            continue;
        }
        let rel = format!("docs/{from}.html");
        write_page(out, &rel, &render::redirect_page(&doc_href(to)).into_string())?;
        emit(&progress, written(&format!("Redirect {from} \u{2192} {to}"), &rel));
    }

    write_page(out, "404.html", &renderer.not_found_page().into_string())?;
    emit(&progress, written("Not found", "404.html"));

    write_page(out, "search-index.json", &serde_json::to_string(&index)?)?;
    emit(&progress, written("Search index", "search-index.json"));

    Ok(BuildReport {
        pages,
        errors,
        elapsed: started.elapsed(),
        output_dir: out.clone(),
    })
}

fn written(label: &str, output: &str) -> BuildEvent {
    BuildEvent::Written {
        label: label.to_string(),
        output: output.to_string(),
    }
}

/// Render one document and write it. Returns the document title.
fn build_page(
    site: &Site,
    renderer: &Renderer,
    slug: &str,
    docs_dir: &Path,
) -> Result<String, BuildError> {
    let doc = scan::load_document(&site.paths.content, slug)?;
    let rendered = markdown::render(&doc.body);
    let html = renderer.doc_page(&doc, &rendered).into_string();
    write_page(docs_dir, &format!("{slug}.html"), &html)?;
    Ok(doc.title())
}

fn write_page(dir: &Path, rel: &str, content: &str) -> Result<(), BuildError> {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(())
}

/// Remove and recreate the output directory.
fn prepare_output(site: &Site) -> Result<(), BuildError> {
    let out = &site.paths.output;
    let root = absolute(&site.root);
    let out_abs = absolute(out);
    let content_abs = absolute(&site.paths.content);
    if root.starts_with(&out_abs) || content_abs.starts_with(&out_abs) {
        return Err(BuildError::UnsafeOutput(out.clone()));
    }
    if out.exists() {
        fs::remove_dir_all(out)?;
    }
    fs::create_dir_all(out)?;
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
