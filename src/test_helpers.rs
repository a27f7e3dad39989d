//! Shared test utilities for the docsite test suite.
//!
//! Provides the fixture project, lookup helpers, and navigation shape
//! assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = Site::load(tmp.path()).unwrap();
//!
//! let item = find_nav_item(&site.nav, "getting-started");
//! assert_eq!(item.title, "Getting Started");
//!
//! assert_nav_shape(&site.nav, "guide", &[
//!     ("Getting Started", &["Readme", "Getting Started", "Configuration"][..]),
//!     ("Guides", &["Overview", "Writing Content", "Plugins", "GitHub"][..]),
//! ]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::nav::{NavItem, Navigation};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Navigation lookups: panic with the available slugs on a miss
// =========================================================================

/// Find a navigation item by slug. Panics if not found.
pub fn find_nav_item<'a>(nav: &'a Navigation, slug: &str) -> &'a NavItem {
    nav.find_item(slug).unwrap_or_else(|| {
        let slugs = nav.buildable_slugs();
        panic!("nav item '{slug}' not found. Available: {slugs:?}")
    })
}

/// Assert the sidebar of navbar section `id`: section titles and their
/// top-level item titles, in order.
pub fn assert_nav_shape(nav: &Navigation, id: &str, expected: &[(&str, &[&str])]) {
    let navbar = nav.navbar.iter().find(|n| n.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = nav.navbar.iter().map(|n| n.id.as_str()).collect();
        panic!("navbar '{id}' not found. Available: {ids:?}")
    });
    let actual: Vec<(&str, Vec<&str>)> = navbar
        .sections
        .iter()
        .map(|s| {
            (
                s.title.as_str(),
                s.items.iter().map(|i| i.title.as_str()).collect(),
            )
        })
        .collect();
    let expected: Vec<(&str, Vec<&str>)> = expected
        .iter()
        .map(|(title, items)| (*title, items.to_vec()))
        .collect();
    assert_eq!(actual, expected, "sidebar shape of navbar '{id}'");
}
