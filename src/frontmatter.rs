//! YAML frontmatter for Markdown/MDX documents.
//!
//! A document may open with a fenced YAML block:
//!
//! ```text
//! ---
//! title: Getting Started
//! description: Install and run your first project
//! order: 2
//! tags: [intro, setup]
//! ---
//!
//! # Getting Started
//! ...
//! ```
//!
//! The block is only recognized when the very first line is `---`. Anything
//! else means the whole file is body. Keys other than the known ones are kept
//! in [`Frontmatter::extra`] so custom metadata survives into the JSON API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("frontmatter opened with `---` but never closed")]
    Unterminated,
    #[error("invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Sort key among siblings in the content tree. Missing sorts last.
    pub order: Option<i64>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Split `source` into its raw YAML block (if any) and the remaining body.
pub fn split(source: &str) -> Result<(Option<&str>, &str), FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(first_end) = source.find('\n') else {
        return if source.trim_end() == "---" {
            Err(FrontmatterError::Unterminated)
        } else {
            Ok((None, source))
        };
    };
    if source[..first_end].trim_end() != "---" {
        return Ok((None, source));
    }

    let yaml_start = first_end + 1;
    let mut offset = yaml_start;
    for line in source[yaml_start..].split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &source[yaml_start..offset];
            let body = &source[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }
    Err(FrontmatterError::Unterminated)
}

/// Split and parse frontmatter, returning it with the document body.
pub fn parse(source: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let (yaml, body) = split(source)?;
    let frontmatter = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
        _ => Frontmatter::default(),
    };
    Ok((frontmatter, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_fields() {
        let src = "---\ntitle: Hello\ndescription: A page\norder: 3\ntags: [a, b]\n---\n# Body\n";
        let (fm, body) = parse(src).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.description.as_deref(), Some("A page"));
        assert_eq!(fm.order, Some(3));
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn no_fence_means_all_body() {
        let src = "# Just markdown\n\n---\n\nA rule above.";
        let (fm, body) = parse(src).unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, src);
    }

    #[test]
    fn unterminated_block_is_error() {
        let result = parse("---\ntitle: Oops\n# Body\n");
        assert!(matches!(result, Err(FrontmatterError::Unterminated)));
        assert!(matches!(parse("---"), Err(FrontmatterError::Unterminated)));
    }

    #[test]
    fn empty_block_gives_defaults() {
        let (fm, body) = parse("---\n---\nText").unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "Text");
    }

    #[test]
    fn wrong_type_is_error() {
        let result = parse("---\norder: first\n---\n");
        assert!(matches!(result, Err(FrontmatterError::Yaml(_))));
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let (fm, _) = parse("---\ntitle: T\nsidebar_label: Short\n---\n").unwrap();
        assert_eq!(
            fm.extra.get("sidebar_label"),
            Some(&serde_json::Value::String("Short".into()))
        );
    }

    #[test]
    fn crlf_line_endings() {
        let (fm, body) = parse("---\r\ntitle: Win\r\n---\r\nBody\r\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Win"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn leading_bom_is_ignored() {
        let (fm, _) = parse("\u{feff}---\ntitle: Bom\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Bom"));
    }
}
