//! Site navigation: navbar sections → sidebar sections → items.
//!
//! Navigation is static configuration, read from `navigation.toml`:
//!
//! ```toml
//! [[navbar]]
//! id = "runtime"
//! title = "Runtime"
//! position = "left"          # or "right"
//!
//! [[navbar.sections]]
//! title = "Getting Started"
//!
//! [[navbar.sections.items]]
//! title = "Introduction"
//! slug = "introduction"
//!
//! [[navbar.sections.items]]
//! title = "JavaScript"
//! slug = "javascript"
//!
//! [[navbar.sections.items.children]]
//! title = "Node API"
//! slug = "node-api"
//!
//! [[navbar.sections.items]]
//! title = "GitHub"
//! external = true
//! href = "https://github.com/example/project"
//! ```
//!
//! Items nest at most three levels (item → child → grandchild). An item is
//! *buildable* when it is neither `external` nor `coming_soon`; only buildable
//! items (and their buildable descendants) produce pages.
//!
//! An item without a slug but with children is a *group*: a label in the
//! sidebar with no page of its own.
//!
//! When no `navigation.toml` exists, [`Navigation::from_content_tree`] derives
//! a single left-hand navbar section from the content directory. Directory
//! index pages stay buildable, and directories deeper than [`MAX_DEPTH`] are
//! flattened so every page keeps a sidebar entry.

use crate::scan::ContentNode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Maximum item nesting below a sidebar section.
pub const MAX_DEPTH: usize = 3;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Navigation validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Navigation {
    #[serde(default)]
    pub navbar: Vec<NavbarSection>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Left,
    Right,
}

/// A top-level navbar entry owning its own sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavbarSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub position: Position,
    /// Overrides the link target; defaults to the first buildable item.
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub sections: Vec<SidebarSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidebarSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavItem {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    /// Explicit target. Required for external items.
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub coming_soon: bool,
    #[serde(default)]
    pub children: Vec<NavItem>,
}

impl NavItem {
    /// Produces a page: not external, not coming soon, and has a slug.
    pub fn is_buildable(&self) -> bool {
        !self.external && !self.coming_soon && !self.slug.is_empty()
    }

    /// A label with children but no page of its own.
    pub fn is_group(&self) -> bool {
        !self.external && self.slug.is_empty()
    }

    /// Link target: the explicit href, else the generated page.
    pub fn href(&self) -> String {
        match &self.href {
            Some(href) => href.clone(),
            None => doc_href(&self.slug),
        }
    }

    /// True if this item or any descendant has `slug`.
    pub fn contains_slug(&self, slug: &str) -> bool {
        (!self.external && !self.slug.is_empty() && self.slug == slug)
            || self.children.iter().any(|c| c.contains_slug(slug))
    }
}

/// URL of the generated page for a slug.
pub fn doc_href(slug: &str) -> String {
    format!("/docs/{slug}.html")
}

/// Load and validate `navigation.toml`.
pub fn load(path: &Path) -> Result<Navigation, NavError> {
    let content = fs::read_to_string(path)?;
    let nav: Navigation = toml::from_str(&content)?;
    nav.validate()?;
    Ok(nav)
}

impl Navigation {
    /// Check structural rules: unique navbar ids, slugs present, external
    /// items carry an href, and nesting stays within [`MAX_DEPTH`].
    pub fn validate(&self) -> Result<(), NavError> {
        let mut ids = HashSet::new();
        for navbar in &self.navbar {
            if navbar.id.trim().is_empty() {
                return Err(NavError::Validation(format!(
                    "navbar section '{}' has an empty id",
                    navbar.title
                )));
            }
            if !ids.insert(navbar.id.as_str()) {
                return Err(NavError::Validation(format!(
                    "duplicate navbar id '{}'",
                    navbar.id
                )));
            }
            for section in &navbar.sections {
                for item in &section.items {
                    validate_item(item, 1)?;
                }
            }
        }
        Ok(())
    }

    pub fn left(&self) -> impl Iterator<Item = &NavbarSection> {
        self.navbar.iter().filter(|n| n.position == Position::Left)
    }

    pub fn right(&self) -> impl Iterator<Item = &NavbarSection> {
        self.navbar.iter().filter(|n| n.position == Position::Right)
    }

    /// Every buildable slug, depth-first in navigation order, without repeats.
    pub fn buildable_slugs(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut slugs = Vec::new();
        for item in self.items() {
            collect_buildable(item, &mut seen, &mut slugs);
        }
        slugs
    }

    /// Top-level items across all navbar and sidebar sections.
    pub fn items(&self) -> impl Iterator<Item = &NavItem> {
        self.navbar
            .iter()
            .flat_map(|n| n.sections.iter())
            .flat_map(|s| s.items.iter())
    }

    pub fn find_item(&self, slug: &str) -> Option<&NavItem> {
        self.items().find_map(|item| find_in(item, slug))
    }

    /// The first navbar section whose tree contains `slug`.
    pub fn navbar_for_slug(&self, slug: &str) -> Option<&NavbarSection> {
        self.navbar.iter().find(|n| {
            n.sections
                .iter()
                .any(|s| s.items.iter().any(|i| i.contains_slug(slug)))
        })
    }

    /// Titles from the navbar section down to the item with `slug`.
    pub fn breadcrumbs(&self, slug: &str) -> Vec<String> {
        for navbar in &self.navbar {
            for section in &navbar.sections {
                for item in &section.items {
                    let mut trail = Vec::new();
                    if item_path(item, slug, &mut trail) {
                        let mut crumbs = vec![navbar.title.clone(), section.title.clone()];
                        crumbs.extend(trail);
                        return crumbs;
                    }
                }
            }
        }
        Vec::new()
    }

    /// Build a single left-hand navbar section from the content tree.
    ///
    /// Top-level documents go into a section named after the site; each
    /// top-level directory becomes its own sidebar section, led by its index
    /// page when it has one. Directories nested past [`MAX_DEPTH`] are
    /// flattened into the last level.
    pub fn from_content_tree(tree: &[ContentNode], title: &str) -> Self {
        let mut loose = Vec::new();
        let mut sections = Vec::new();
        for node in tree {
            match node {
                ContentNode::Doc { .. } => loose.extend(items_from_node(node, 1)),
                ContentNode::Section {
                    title,
                    slug,
                    index,
                    children,
                    ..
                } => {
                    let mut items = Vec::new();
                    if *index {
                        items.push(NavItem {
                            title: title.clone(),
                            slug: slug.clone(),
                            ..NavItem::default()
                        });
                    }
                    items.extend(children.iter().flat_map(|c| items_from_node(c, 1)));
                    if items.is_empty() {
                        continue;
                    }
                    sections.push(SidebarSection {
                        title: title.clone(),
                        items,
                    });
                }
            }
        }
        if !loose.is_empty() {
            sections.insert(
                0,
                SidebarSection {
                    title: title.to_string(),
                    items: loose,
                },
            );
        }
        Navigation {
            navbar: vec![NavbarSection {
                id: "docs".to_string(),
                title: "Docs".to_string(),
                position: Position::Left,
                href: None,
                sections,
            }],
        }
    }
}

impl NavbarSection {
    /// First buildable slug in this section's tree.
    pub fn first_slug(&self) -> Option<&str> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter())
            .find_map(first_buildable)
    }

    /// Navbar link target: explicit href, else the first buildable page.
    pub fn link(&self) -> Option<String> {
        self.href
            .clone()
            .or_else(|| self.first_slug().map(doc_href))
    }
}

fn validate_item(item: &NavItem, depth: usize) -> Result<(), NavError> {
    if depth > MAX_DEPTH {
        return Err(NavError::Validation(format!(
            "'{}' is nested {} levels deep (max {})",
            item.title, depth, MAX_DEPTH
        )));
    }
    if item.external {
        if item.href.as_deref().is_none_or(str::is_empty) {
            return Err(NavError::Validation(format!(
                "external item '{}' needs an href",
                item.title
            )));
        }
    } else if item.slug.trim().is_empty() {
        if item.children.is_empty() {
            return Err(NavError::Validation(format!(
                "item '{}' has no slug and no children",
                item.title
            )));
        }
    } else if item.slug.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(NavError::Validation(format!(
            "item '{}' has an invalid slug '{}'",
            item.title, item.slug
        )));
    }
    for child in &item.children {
        validate_item(child, depth + 1)?;
    }
    Ok(())
}

fn collect_buildable(item: &NavItem, seen: &mut HashSet<String>, out: &mut Vec<String>) {
    if item.external || item.coming_soon {
        return;
    }
    if !item.slug.is_empty() && seen.insert(item.slug.clone()) {
        out.push(item.slug.clone());
    }
    for child in &item.children {
        collect_buildable(child, seen, out);
    }
}

fn find_in<'a>(item: &'a NavItem, slug: &str) -> Option<&'a NavItem> {
    if !item.external && !item.slug.is_empty() && item.slug == slug {
        return Some(item);
    }
    item.children.iter().find_map(|c| find_in(c, slug))
}

fn first_buildable(item: &NavItem) -> Option<&str> {
    if item.external || item.coming_soon {
        return None;
    }
    if !item.slug.is_empty() {
        return Some(item.slug.as_str());
    }
    item.children.iter().find_map(first_buildable)
}

fn item_path(item: &NavItem, slug: &str, trail: &mut Vec<String>) -> bool {
    trail.push(item.title.clone());
    if !item.external && item.slug == slug {
        return true;
    }
    for child in &item.children {
        if item_path(child, slug, trail) {
            return true;
        }
    }
    trail.pop();
    false
}

/// Navigation items for a content node at `depth`. Empty directories give
/// nothing.
fn items_from_node(node: &ContentNode, depth: usize) -> Vec<NavItem> {
    match node {
        ContentNode::Doc {
            title,
            slug,
            description,
            ..
        } => vec![NavItem {
            title: title.clone(),
            slug: slug.clone(),
            description: description.clone(),
            ..NavItem::default()
        }],
        ContentNode::Section { .. } if depth >= MAX_DEPTH => {
            let mut flat = Vec::new();
            flatten_pages(node, &mut flat);
            flat
        }
        ContentNode::Section {
            title,
            slug,
            index,
            children,
            ..
        } => {
            let children: Vec<NavItem> = children
                .iter()
                .flat_map(|c| items_from_node(c, depth + 1))
                .collect();
            if !*index && children.is_empty() {
                return Vec::new();
            }
            vec![NavItem {
                title: title.clone(),
                slug: if *index { slug.clone() } else { String::new() },
                children,
                ..NavItem::default()
            }]
        }
    }
}

/// Every page under `node` as a leaf item, index pages first, in tree order.
fn flatten_pages(node: &ContentNode, out: &mut Vec<NavItem>) {
    match node {
        ContentNode::Doc { .. } => out.extend(items_from_node(node, 0)),
        ContentNode::Section {
            title,
            slug,
            index,
            children,
            ..
        } => {
            if *index {
                out.push(NavItem {
                    title: title.clone(),
                    slug: slug.clone(),
                    ..NavItem::default()
                });
            }
            for child in children {
                flatten_pages(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::assert_nav_shape;
    use tempfile::TempDir;

    fn item(title: &str, slug: &str) -> NavItem {
        NavItem {
            title: title.to_string(),
            slug: slug.to_string(),
            ..NavItem::default()
        }
    }

    fn sample() -> Navigation {
        toml::from_str(
            r#"
[[navbar]]
id = "runtime"
title = "Runtime"

[[navbar.sections]]
title = "Getting Started"

[[navbar.sections.items]]
title = "Introduction"
slug = "introduction"

[[navbar.sections.items]]
title = "JavaScript"
slug = "javascript"

[[navbar.sections.items.children]]
title = "Node API"
slug = "node-api"

[[navbar.sections.items.children.children]]
title = "fs"
slug = "node-fs"

[[navbar.sections.items.children.children]]
title = "worker_threads"
slug = "node-workers"
coming_soon = true

[[navbar.sections.items]]
title = "GitHub"
external = true
href = "https://github.com/example/project"

[[navbar]]
id = "releases"
title = "Releases"
position = "right"

[[navbar.sections]]
title = "Releases"

[[navbar.sections.items]]
title = "Changelog"
slug = "changelog"
"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_nested_structure() {
        let nav = sample();
        assert_eq!(nav.navbar.len(), 2);
        let js = &nav.navbar[0].sections[0].items[1];
        assert_eq!(js.children[0].children.len(), 2);
        assert_eq!(nav.navbar[1].position, Position::Right);
        assert!(nav.validate().is_ok());
    }

    #[test]
    fn buildable_slugs_skip_external_and_coming_soon() {
        let nav = sample();
        assert_eq!(
            nav.buildable_slugs(),
            vec!["introduction", "javascript", "node-api", "node-fs", "changelog"]
        );
    }

    #[test]
    fn buildable_slugs_are_unique() {
        let mut nav = sample();
        nav.navbar[1].sections[0]
            .items
            .push(item("Intro again", "introduction"));
        let slugs = nav.buildable_slugs();
        assert_eq!(slugs.iter().filter(|s| *s == "introduction").count(), 1);
    }

    #[test]
    fn coming_soon_parent_hides_children() {
        let mut nav = sample();
        nav.navbar[0].sections[0].items[1].coming_soon = true;
        assert_eq!(nav.buildable_slugs(), vec!["introduction", "changelog"]);
    }

    #[test]
    fn left_and_right() {
        let nav = sample();
        let left: Vec<&str> = nav.left().map(|n| n.id.as_str()).collect();
        let right: Vec<&str> = nav.right().map(|n| n.id.as_str()).collect();
        assert_eq!(left, vec!["runtime"]);
        assert_eq!(right, vec!["releases"]);
    }

    #[test]
    fn navbar_for_nested_slug() {
        let nav = sample();
        assert_eq!(nav.navbar_for_slug("node-fs").map(|n| n.id.as_str()), Some("runtime"));
        assert_eq!(nav.navbar_for_slug("changelog").map(|n| n.id.as_str()), Some("releases"));
        assert!(nav.navbar_for_slug("missing").is_none());
    }

    #[test]
    fn find_item_searches_children() {
        let nav = sample();
        assert_eq!(nav.find_item("node-fs").map(|i| i.title.as_str()), Some("fs"));
        assert!(nav.find_item("nope").is_none());
    }

    #[test]
    fn breadcrumbs_trace_path() {
        let nav = sample();
        assert_eq!(
            nav.breadcrumbs("node-fs"),
            vec!["Runtime", "Getting Started", "JavaScript", "Node API", "fs"]
        );
        assert!(nav.breadcrumbs("missing").is_empty());
    }

    #[test]
    fn navbar_link_uses_first_buildable() {
        let nav = sample();
        assert_eq!(nav.navbar[0].link().as_deref(), Some("/docs/introduction.html"));
        let mut custom = nav.navbar[1].clone();
        custom.href = Some("/releases".to_string());
        assert_eq!(custom.link().as_deref(), Some("/releases"));
    }

    #[test]
    fn item_href() {
        let nav = sample();
        let gh = &nav.navbar[0].sections[0].items[2];
        assert_eq!(gh.href(), "https://github.com/example/project");
        assert_eq!(item("Intro", "introduction").href(), "/docs/introduction.html");
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn rejects_fourth_level() {
        let mut nav = sample();
        nav.navbar[0].sections[0].items[1].children[0].children[0]
            .children
            .push(item("Too deep", "too-deep"));
        let err = nav.validate().unwrap_err();
        assert!(err.to_string().contains("nested 4 levels"));
    }

    #[test]
    fn rejects_external_without_href() {
        let mut nav = sample();
        nav.navbar[0].sections[0].items[2].href = None;
        assert!(matches!(nav.validate(), Err(NavError::Validation(_))));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut nav = sample();
        nav.navbar[1].id = "runtime".to_string();
        let err = nav.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate navbar id"));
    }

    #[test]
    fn rejects_missing_or_escaping_slug() {
        let mut nav = sample();
        nav.navbar[0].sections[0].items[0].slug = String::new();
        assert!(nav.validate().is_err());

        let mut nav = sample();
        nav.navbar[0].sections[0].items[0].slug = "../etc/passwd".to_string();
        assert!(nav.validate().is_err());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<Navigation, _> = toml::from_str(
            r#"
[[navbar]]
id = "x"
title = "X"
colour = "red"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_and_validates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("navigation.toml");
        fs::write(
            &path,
            "[[navbar]]\nid = \"a\"\ntitle = \"A\"\n[[navbar]]\nid = \"a\"\ntitle = \"B\"\n",
        )
        .unwrap();
        assert!(matches!(load(&path), Err(NavError::Validation(_))));

        fs::write(&path, "not [ toml").unwrap();
        assert!(matches!(load(&path), Err(NavError::Toml(_))));
    }

    // =========================================================================
    // Derived navigation
    // =========================================================================

    #[test]
    fn derived_from_content_tree() {
        let tree = vec![
            ContentNode::Doc {
                title: "Readme".to_string(),
                slug: "readme".to_string(),
                order: Some(1),
                description: None,
            },
            ContentNode::Section {
                title: "Guides".to_string(),
                slug: "guides".to_string(),
                order: None,
                index: false,
                children: vec![ContentNode::Doc {
                    title: "Deploy".to_string(),
                    slug: "guides/deploy".to_string(),
                    order: None,
                    description: Some("Ship it".to_string()),
                }],
            },
        ];
        let nav = Navigation::from_content_tree(&tree, "Overview");
        assert!(nav.validate().is_ok());
        let sections = &nav.navbar[0].sections;
        assert_eq!(sections[0].title, "Overview");
        assert_eq!(sections[0].items[0].slug, "readme");
        assert_eq!(sections[1].title, "Guides");
        assert_eq!(sections[1].items[0].slug, "guides/deploy");
        assert_eq!(nav.buildable_slugs(), vec!["readme", "guides/deploy"]);
    }

    fn doc(title: &str, slug: &str) -> ContentNode {
        ContentNode::Doc {
            title: title.to_string(),
            slug: slug.to_string(),
            order: None,
            description: None,
        }
    }

    fn dir(title: &str, slug: &str, index: bool, children: Vec<ContentNode>) -> ContentNode {
        ContentNode::Section {
            title: title.to_string(),
            slug: slug.to_string(),
            order: None,
            index,
            children,
        }
    }

    #[test]
    fn derived_keeps_directory_index_pages() {
        let tree = vec![dir(
            "Guides",
            "guides",
            true,
            vec![
                doc("Writing", "guides/writing"),
                dir("Advanced", "guides/advanced", true, vec![doc("Tuning", "guides/advanced/tuning")]),
            ],
        )];
        let nav = Navigation::from_content_tree(&tree, "Acme");
        assert!(nav.validate().is_ok());
        assert_nav_shape(&nav, "docs", &[("Guides", &["Guides", "Writing", "Advanced"][..])]);
        assert_eq!(
            nav.buildable_slugs(),
            vec!["guides", "guides/writing", "guides/advanced", "guides/advanced/tuning"]
        );
    }

    #[test]
    fn derived_flattens_directories_past_max_depth() {
        // docs/a/b/c/d/x.md: items a/b (1), a/b/c (2), then d's pages at 3.
        let tree = vec![dir(
            "A",
            "a",
            false,
            vec![dir(
                "B",
                "a/b",
                false,
                vec![dir(
                    "C",
                    "a/b/c",
                    false,
                    vec![
                        doc("W", "a/b/c/w"),
                        dir(
                            "D",
                            "a/b/c/d",
                            true,
                            vec![doc("X", "a/b/c/d/x"), dir("E", "a/b/c/d/e", false, vec![doc("Y", "a/b/c/d/e/y")])],
                        ),
                        dir("Empty", "a/b/c/empty", false, Vec::new()),
                    ],
                )],
            )],
        )];
        let nav = Navigation::from_content_tree(&tree, "Acme");
        assert!(nav.validate().is_ok(), "{:?}", nav.validate());
        assert_eq!(
            nav.buildable_slugs(),
            vec!["a/b/c/w", "a/b/c/d", "a/b/c/d/x", "a/b/c/d/e/y"]
        );
        let c = find_nav_item_by_title(&nav, "C");
        let leaves: Vec<&str> = c.children.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(leaves, vec!["W", "D", "X", "Y"]);
        assert!(c.children.iter().all(|i| i.children.is_empty()));
    }

    #[test]
    fn derived_skips_empty_directories() {
        let tree = vec![
            doc("Readme", "readme"),
            dir("Drafts", "drafts", false, vec![dir("Old", "drafts/old", false, Vec::new())]),
        ];
        let nav = Navigation::from_content_tree(&tree, "Acme");
        assert!(nav.validate().is_ok());
        assert_nav_shape(&nav, "docs", &[("Acme", &["Readme"][..])]);
    }

    fn find_nav_item_by_title<'a>(nav: &'a Navigation, title: &str) -> &'a NavItem {
        fn walk<'a>(item: &'a NavItem, title: &str) -> Option<&'a NavItem> {
            if item.title == title {
                return Some(item);
            }
            item.children.iter().find_map(|c| walk(c, title))
        }
        nav.navbar
            .iter()
            .flat_map(|n| n.sections.iter())
            .flat_map(|s| s.items.iter())
            .find_map(|i| walk(i, title))
            .unwrap_or_else(|| panic!("no nav item titled '{title}'"))
    }

    // =========================================================================
    // Fixture navigation
    // =========================================================================

    #[test]
    fn fixture_navigation_shape() {
        use crate::test_helpers::{find_nav_item, setup_fixtures};

        let tmp = setup_fixtures();
        let nav = load(&tmp.path().join("navigation.toml")).unwrap();

        assert_nav_shape(&nav, "guide", &[
            ("Getting Started", &["Readme", "Getting Started", "Configuration"][..]),
            ("Guides", &["Overview", "Writing Content", "Plugins", "GitHub"][..]),
        ]);
        assert_nav_shape(&nav, "api", &[("Reference", &["API Reference"][..])]);

        let deploy = find_nav_item(&nav, "guides/deploy");
        assert_eq!(deploy.title, "Deploy");
        assert_eq!(
            nav.breadcrumbs("guides/deploy"),
            vec!["Guide", "Guides", "Writing Content", "Deploy"]
        );
        assert_eq!(nav.navbar_for_slug("api/reference").map(|n| n.id.as_str()), Some("api"));
        assert_eq!(nav.right().count(), 1);
        assert!(!nav.buildable_slugs().contains(&"plugins".to_string()));
    }
}
