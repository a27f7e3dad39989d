//! HTTP routes, driven in-process through the axum router.

mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::setup_fixtures;
use docsite::server;
use docsite::site::Site;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> (TempDir, Router) {
    let tmp = setup_fixtures();
    let site = Site::load(tmp.path()).unwrap();
    (tmp, server::router(Arc::new(site)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

// =========================================================================
// JSON API
// =========================================================================

#[tokio::test]
async fn lists_document_slugs() {
    let (_tmp, app) = app();
    let (status, json) = get_json(app, "/api/docs").await;

    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = json.as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert!(slugs.contains(&"readme"));
    assert!(slugs.contains(&"guides"));
    assert!(slugs.contains(&"guides/deploy"));
    assert!(slugs.contains(&"api/reference"));
}

#[tokio::test]
async fn fetches_one_document() {
    let (_tmp, app) = app();
    let (status, json) = get_json(app, "/api/docs/guides/deploy").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["slug"], "guides/deploy");
    assert_eq!(json["frontmatter"]["title"], "Deploy");
    assert!(json["content"].as_str().unwrap().contains("## Static hosting"));
    assert!(json["html"].as_str().unwrap().contains("id=\"static-hosting\""));
    assert_eq!(json["toc"][0]["id"], "static-hosting");
    assert_eq!(json["toc"][0]["depth"], 2);
}

#[tokio::test]
async fn unknown_document_is_json_404() {
    let (_tmp, app) = app();
    let (status, json) = get_json(app, "/api/docs/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, serde_json::json!({ "error": "Document not found" }));
}

#[tokio::test]
async fn traversal_slug_is_404() {
    let (_tmp, app) = app();
    let (status, _, _) = get(app, "/api/docs/..%2Fconfig").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_ranks_title_match_first() {
    let (_tmp, app) = app();
    let (status, json) = get_json(app, "/api/search?q=deploy").await;

    assert_eq!(status, StatusCode::OK);
    let hits = json.as_array().unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0]["title"], "Deploy");
    assert_eq!(hits[0]["href"], "/docs/guides/deploy.html");
    assert_eq!(hits[0]["section"], "Guides");
}

#[tokio::test]
async fn short_query_returns_nothing() {
    let (_tmp, app) = app();
    let (status, json) = get_json(app, "/api/search?q=d").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn serves_search_index() {
    let (_tmp, app) = app();
    let (status, json) = get_json(app, "/search-index.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().iter().any(|e| e["slug"] == "readme"));
}

// =========================================================================
// Pages and static files
// =========================================================================

#[tokio::test]
async fn renders_document_page() {
    let (_tmp, app) = app();
    let (status, content_type, body) = get(app, "/docs/getting-started.html").await;
    let html = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(html.contains("<title>Getting Started | Acme Docs</title>"));
    assert!(html.contains("data-heading=\"install\""));
}

#[tokio::test]
async fn renders_page_without_html_suffix() {
    let (_tmp, app) = app();
    let (status, _, body) = get(app, "/docs/api/reference").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("API Reference"));
}

#[tokio::test]
async fn renders_index_page() {
    let (_tmp, app) = app();
    let (status, _, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Get started"));
}

#[tokio::test]
async fn redirect_slug_serves_redirect_page() {
    let (_tmp, app) = app();
    let (status, _, body) = get(app, "/docs/introduction.html").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("url=/docs/readme.html"));
}

#[tokio::test]
async fn unknown_page_is_html_404() {
    let (_tmp, app) = app();
    let (status, content_type, body) = get(app, "/docs/nope.html").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(content_type.starts_with("text/html"));
    assert!(String::from_utf8(body).unwrap().contains("Page not found"));
}

#[tokio::test]
async fn serves_static_files_with_content_type() {
    let (tmp, app) = app();
    let (status, content_type, body) = get(app.clone(), "/assets/favicon.svg").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "image/svg+xml");
    assert_eq!(body, std::fs::read(tmp.path().join("public/favicon.svg")).unwrap());

    let (status, content_type, body) = get(app, "/assets/fonts/inter.woff2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "font/woff2");
    assert_eq!(body, std::fs::read(tmp.path().join("assets/fonts/inter.woff2")).unwrap());
}

#[tokio::test]
async fn missing_static_file_is_404() {
    let (_tmp, app) = app();
    let (status, content_type, _) = get(app, "/public/missing.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(content_type.starts_with("text/html"), "rendered as the not-found page");
}
