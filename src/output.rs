//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each document is shown by its positional index and title first, with the
//! output path or slug as secondary context. The same helpers format `build`,
//! `check`, and `search` so a page reads the same everywhere.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! ==> Copying assets
//!     public: 3 files (14.2 KB)
//!     fonts: not found, skipped (assets/fonts)
//! ==> Rendering documents
//!     001 Readme → docs/readme.html
//!     002 Getting Started → docs/getting-started.html
//!     003 node-api FAILED: Document not found: node-api
//!
//! [BUILD COMPLETED WITH ERRORS] 2 pages built, 1 failed (0.04s)
//!   [ERROR] node-api: Document not found: node-api
//! ```
//!
//! ## Check
//!
//! ```text
//! Runtime
//!     Getting Started
//!         001 Readme
//!         002 JavaScript
//!             001 Node API
//!         003 GitHub ↗ https://github.com/acme
//!         004 Workers (coming soon)
//!
//! Findings
//!     [ERROR] missing content: node-api (Node API)
//!     [INFO] orphan: drafts/idea
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::links::{Finding, LinkReport};
use crate::nav::{NavItem, Navigation, Position};
use crate::search::SearchHit;
use crate::site::{BuildEvent, BuildReport};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    let line = match event {
        BuildEvent::Stage { name } => format!("==> {}", name),
        BuildEvent::AssetsCopied { label, files, bytes } => format!(
            "{}{}: {} file{} ({})",
            indent(1),
            label,
            files,
            if *files == 1 { "" } else { "s" },
            human_bytes(*bytes)
        ),
        BuildEvent::AssetsSkipped { label, path } => format!(
            "{}{}: not found, skipped ({})",
            indent(1),
            label,
            path.display()
        ),
        BuildEvent::SearchIndexBuilt { entries } => {
            format!("{}{} entries", indent(1), entries)
        }
        BuildEvent::PageBuilt {
            index,
            title,
            output,
            ..
        } => format!("{}{} {} \u{2192} {}", indent(1), format_index(*index), title, output),
        BuildEvent::PageFailed {
            index,
            slug,
            message,
        } => format!(
            "{}{} {} FAILED: {}",
            indent(1),
            format_index(*index),
            slug,
            message
        ),
        BuildEvent::Written { label, output } => {
            format!("{}{} \u{2192} {}", indent(1), label, output)
        }
    };
    vec![line]
}

/// Final build summary.
pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let secs = format!("{:.2}s", report.elapsed.as_secs_f64());
    if report.is_success() {
        return vec![format!(
            "[SUCCESS] All {} pages built successfully ({})",
            report.pages, secs
        )];
    }
    let mut lines = vec![format!(
        "[BUILD COMPLETED WITH ERRORS] {} pages built, {} failed ({})",
        report.pages,
        report.errors.len(),
        secs
    )];
    for err in &report.errors {
        lines.push(format!("  [ERROR] {}: {}", err.slug, err.message));
    }
    lines
}

/// Print the build summary. Failures go to stderr.
pub fn print_build_report(report: &BuildReport) {
    let lines = format_build_report(report);
    if report.is_success() {
        for line in lines {
            println!("{}", line);
        }
    } else {
        for line in lines {
            eprintln!("{}", line);
        }
    }
}

pub fn format_build_failure(err: &dyn std::error::Error) -> String {
    format!("[BUILD FAILED] {}", err)
}

// ============================================================================
// Check
// ============================================================================

/// Navigation tree with positional indices per sibling level.
pub fn format_nav_tree(nav: &Navigation) -> Vec<String> {
    let mut lines = Vec::new();
    for navbar in &nav.navbar {
        let side = match navbar.position {
            Position::Left => "",
            Position::Right => " (right)",
        };
        lines.push(format!("{}{}", navbar.title, side));
        for section in &navbar.sections {
            lines.push(format!("{}{}", indent(1), section.title));
            format_items(&section.items, 2, &mut lines);
        }
    }
    lines
}

fn format_items(items: &[NavItem], depth: usize, lines: &mut Vec<String>) {
    for (i, item) in items.iter().enumerate() {
        let marker = if item.external {
            format!(" \u{2197} {}", item.href.as_deref().unwrap_or(""))
        } else if item.coming_soon {
            " (coming soon)".to_string()
        } else {
            String::new()
        };
        lines.push(format!(
            "{}{} {}{}",
            indent(depth),
            format_index(i + 1),
            item.title,
            marker
        ));
        if !item.coming_soon {
            format_items(&item.children, depth + 1, lines);
        }
    }
}

fn format_finding(finding: &Finding) -> String {
    match finding {
        Finding::MissingContent { slug, title } => {
            format!("[ERROR] missing content: {} ({})", slug, title)
        }
        Finding::BrokenRedirect { from, to } => {
            format!("[ERROR] broken redirect: {} \u{2192} {}", from, to)
        }
        Finding::BrokenLink { slug, target } => {
            format!("[ERROR] broken link in {}: /docs/{}", slug, target)
        }
        Finding::Orphan { slug } => format!("[INFO] orphan: {}", slug),
    }
}

pub fn format_check_output(nav: &Navigation, derived: bool, report: &LinkReport) -> Vec<String> {
    let mut lines = Vec::new();
    if derived {
        lines.push("Navigation (derived from content)".to_string());
    } else {
        lines.push("Navigation".to_string());
    }
    lines.extend(format_nav_tree(nav).into_iter().map(|l| format!("{}{}", indent(1), l)));

    lines.push(String::new());
    if report.findings.is_empty() {
        lines.push(format!("All {} pages have content", report.checked));
        return lines;
    }
    lines.push("Findings".to_string());
    for finding in &report.findings {
        lines.push(format!("{}{}", indent(1), format_finding(finding)));
    }
    lines
}

pub fn print_check_output(nav: &Navigation, derived: bool, report: &LinkReport) {
    for line in format_check_output(nav, derived, report) {
        println!("{}", line);
    }
}

// ============================================================================
// Search
// ============================================================================

pub fn format_search_results(query: &str, hits: &[SearchHit]) -> Vec<String> {
    if hits.is_empty() {
        return vec![format!("No results for \"{}\"", query)];
    }
    let mut lines = Vec::new();
    for (i, hit) in hits.iter().enumerate() {
        let entry = hit.entry;
        lines.push(format!(
            "{} {} ({:.2})",
            format_index(i + 1),
            entry.title,
            hit.score
        ));
        lines.push(format!(
            "{}{} \u{203a} {} \u{2192} {}",
            indent(1),
            entry.category,
            entry.path,
            entry.href
        ));
        if !entry.content.is_empty() {
            lines.push(format!("{}{}", indent(1), truncate(&entry.content, 72)));
        }
    }
    lines
}

pub fn print_search_results(query: &str, hits: &[SearchHit]) {
    for line in format_search_results(query, hits) {
        println!("{}", line);
    }
}
