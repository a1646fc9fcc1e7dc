//! Article header: the YAML block between `---` lines at the top of a post.

use serde::Deserialize;

const FENCE: &str = "---";

/// Metadata a post declares about itself.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct Frontmatter {
    /// Post title (required)
    pub title: String,

    /// Summary shown on the index page and in `<meta name="description">`
    #[serde(default)]
    pub description: Option<String>,

    /// Publication date, kept as written (e.g. `2024-05-01`)
    #[serde(default)]
    pub date: Option<String>,

    /// Topic tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Drafts are parsed but not published
    #[serde(default)]
    pub draft: bool,

    /// URL path override; defaults to the file's path under the articles dir
    #[serde(default)]
    pub slug: Option<String>,
}

/// Split a post into its header and Markdown body.
///
/// A post that does not open with a `---` line has no header and is returned whole.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let Some(header) = source.trim_start().strip_prefix(FENCE) else {
        return Ok((None, source));
    };

    let (yaml, body) = header
        .split_once("\n---")
        .ok_or(FrontmatterError::Unclosed)?;

    let frontmatter = serde_yaml::from_str(yaml.trim())
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    Ok((Some(frontmatter), body.trim_start()))
}

/// Why a post header could not be read.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Post header is missing its closing --- line")]
    Unclosed,

    #[error("Post header is not valid YAML: {0}")]
    InvalidYaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Shipping a blog in Rust
description: Notes from the rewrite
date: 2024-05-01
tags: [rust, web]
---

# Intro
"#;

        let (fm, content) = extract_frontmatter(source).unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.title, "Shipping a blog in Rust");
        assert_eq!(fm.description, Some("Notes from the rewrite".to_string()));
        assert_eq!(fm.date.as_deref(), Some("2024-05-01"));
        assert_eq!(fm.tags, vec!["rust", "web"]);
        assert!(!fm.draft);
        assert!(content.starts_with("# Intro"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn header_without_title_is_rejected() {
        let source = "---\ntags: [rust]\n---\nbody";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn reads_draft_flag() {
        let source = "---\ntitle: WIP\ndraft: true\n---\nbody";

        let (fm, _) = extract_frontmatter(source).unwrap();

        assert!(fm.unwrap().draft);
    }
}
