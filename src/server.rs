//! Development server.
//!
//! Serves the same site as the static build, rendered per request, plus a
//! small JSON API:
//!
//! | Route | Response |
//! |---|---|
//! | `GET /api/docs` | JSON array of content slugs |
//! | `GET /api/docs/{slug}` | `{slug, content, frontmatter, html, toc}` or 404 |
//! | `GET /api/search?q=` | scored search results |
//! | `GET /search-index.json` | the full search index |
//! | `/public/*`, `/assets/*`, `*.css` ... | static files from `public/` and `assets/` |
//! | `/`, `/docs/{slug}(.html)` | server-rendered pages; anything else → 404 page |
//!
//! Configuration and navigation are loaded once and shared read-only; content
//! files are read on every request so edits show up on reload.

use crate::frontmatter::Frontmatter;
use crate::markdown::{self, Heading};
use crate::nav::doc_href;
use crate::render;
use crate::scan::{self, ScanError};
use crate::search;
use crate::site::Site;
use axum::Router;
use axum::extract::{Path as UrlPath, Query, Request, State};
use axum::http::{StatusCode, Uri, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid listen address {0}")]
    Address(String),
}

const STATIC_EXTENSIONS: &[&str] = &["css", "js", "png", "jpg", "svg", "ico"];

/// Run the server until interrupted.
pub fn run(site: Site, host: &str, port: u16) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|_| ServerError::Address(format!("{host}:{port}")))?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(Arc::new(site), addr))
}

async fn run_async(site: Arc<Site>, addr: SocketAddr) -> Result<(), ServerError> {
    let app = router(site);
    tracing::info!("Serving documentation at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// All routes, with request logging.
pub fn router(site: Arc<Site>) -> Router {
    Router::new()
        .route("/api/docs", get(list_docs))
        .route("/api/docs/{*slug}", get(get_doc))
        .route("/api/search", get(search_docs))
        .route("/search-index.json", get(search_index))
        .fallback(fallback)
        .layer(middleware::from_fn(log_request))
        .with_state(site)
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    tracing::info!(%method, %path, status = response.status().as_u16(), "request");
    response
}

// ============================================================================
// JSON API
// ============================================================================

#[derive(Debug, Serialize)]
struct DocResponse {
    slug: String,
    content: String,
    frontmatter: Frontmatter,
    html: String,
    toc: Vec<Heading>,
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn list_docs(State(site): State<Arc<Site>>) -> Response {
    match scan::list_doc_slugs(&site.paths.content) {
        Ok(slugs) => Json(slugs).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "listing documents failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

async fn get_doc(State(site): State<Arc<Site>>, UrlPath(slug): UrlPath<String>) -> Response {
    let slug = slug.trim_matches('/');
    match scan::load_document(&site.paths.content, slug) {
        Ok(doc) => {
            let rendered = markdown::render(&doc.body);
            let toc = rendered
                .toc(site.config.toc.min_depth, site.config.toc.max_depth)
                .into_iter()
                .cloned()
                .collect();
            Json(DocResponse {
                slug: doc.slug,
                content: doc.body,
                frontmatter: doc.frontmatter,
                html: rendered.html,
                toc,
            })
            .into_response()
        }
        Err(ScanError::DocumentNotFound(_) | ScanError::InvalidSlug(_)) => {
            json_error(StatusCode::NOT_FOUND, "Document not found")
        }
        Err(e) => {
            tracing::error!(slug, error = %e, "loading document failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
struct SearchResult<'a> {
    score: f64,
    title: &'a str,
    href: &'a str,
    path: &'a str,
    section: &'a str,
    category: &'a str,
}

async fn search_docs(State(site): State<Arc<Site>>, Query(params): Query<SearchParams>) -> Response {
    let index = site.search_index();
    let cfg = &site.config.search;
    let results: Vec<SearchResult> = search::query(&index, &params.q, cfg.min_query_len, cfg.max_results)
        .into_iter()
        .map(|hit| SearchResult {
            score: hit.score,
            title: &hit.entry.title,
            href: &hit.entry.href,
            path: &hit.entry.path,
            section: &hit.entry.section,
            category: &hit.entry.category,
        })
        .collect();
    Json(results).into_response()
}

async fn search_index(State(site): State<Arc<Site>>) -> Response {
    Json(site.search_index()).into_response()
}

// ============================================================================
// Static files and pages
// ============================================================================

async fn fallback(State(site): State<Arc<Site>>, uri: Uri) -> Response {
    let path = uri.path();
    if let Some(file) = static_file_path(&site, path) {
        return serve_file(&file).await;
    }
    render_page(&site, path)
}

/// Content type for a file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "text/plain; charset=utf-8",
    }
}

/// Map a request path onto a file under `public/` or `assets/`.
///
/// `/public/*` and `/assets/*` are looked up as files; other paths only when
/// they end in a static extension. Returns `None` when no such file exists,
/// so the request falls through to page handling. Paths with `..` segments
/// never match.
pub fn static_file_path(site: &Site, url_path: &str) -> Option<PathBuf> {
    let rel = url_path.trim_start_matches('/');
    if rel.split('/').any(|seg| seg == ".." || seg == "." || seg.contains('\\')) {
        return None;
    }
    let paths = &site.paths;
    let candidates: Vec<PathBuf> = if let Some(rest) = rel.strip_prefix("public/") {
        vec![paths.public.join(rest)]
    } else if let Some(rest) = rel.strip_prefix("assets/") {
        vec![paths.public.join(rest), paths.assets.join(rest)]
    } else {
        let is_static = Path::new(rel)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| STATIC_EXTENSIONS.contains(&e.as_str()));
        if !is_static {
            return None;
        }
        vec![paths.public.join(rel)]
    };
    candidates.into_iter().find(|p| p.is_file())
}

async fn serve_file(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(path))], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "reading static file failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn render_page(site: &Site, path: &str) -> Response {
    let renderer = site.renderer();
    if path == "/" || path == "/index.html" {
        return Html(renderer.index_page().into_string()).into_response();
    }
    let Some(slug) = path
        .strip_prefix("/docs/")
        .map(|s| s.strip_suffix(".html").unwrap_or(s).trim_end_matches('/'))
        .filter(|s| !s.is_empty())
    else {
        return not_found(site);
    };

    match scan::load_document(&site.paths.content, slug) {
        Ok(doc) => {
            let rendered = markdown::render(&doc.body);
            Html(renderer.doc_page(&doc, &rendered).into_string()).into_response()
        }
        Err(ScanError::DocumentNotFound(_)) => match site.config.redirects.get(slug) {
            Some(target) => Html(render::redirect_page(&doc_href(target)).into_string()).into_response(),
            None => not_found(site),
        },
        Err(ScanError::InvalidSlug(_)) => not_found(site),
        Err(e) => {
            tracing::error!(slug, error = %e, "rendering page failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn not_found(site: &Site) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(site.renderer().not_found_page().into_string()),
    )
        .into_response()
}
