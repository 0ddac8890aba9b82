//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use super::post::RESERVED_KEYS;
use super::PostMeta;
use crate::error::{BlogError, Result};

/// Render a YAML scalar as the string an author would have typed
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts `title: 1984` as well as `title: "1984"`
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(value)
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected a string")),
    }
}

/// Handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .into_iter()
            .map(|item| {
                scalar_to_string(item).ok_or_else(|| D::Error::custom("expected a list of strings"))
            })
            .collect(),
        Some(value) => scalar_to_string(value)
            .map(|s| vec![s])
            .ok_or_else(|| D::Error::custom("expected a string or a list of strings")),
    }
}

/// Raw front-matter of a post, before coercion into [`PostMeta`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl FrontMatter {
    /// Split a document into its front-matter and body.
    ///
    /// A document without a leading `---` block is all body. A `---` block
    /// that does not contain `key: value` lines is a markdown thematic
    /// break and is left in the body as well.
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let trimmed = content.trim_start();
        if trimmed.starts_with("---") {
            return Self::parse_yaml(content, trimmed);
        }
        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml<'a>(original: &'a str, content: &'a str) -> Result<(Self, &'a str)> {
        let rest = content[3..].trim_start_matches(['\n', '\r']);

        let (yaml_content, remaining) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else if let Some(end_pos) = rest.find("\n---") {
            (&rest[..end_pos], &rest[end_pos + 4..])
        } else {
            if looks_like_yaml(rest) {
                return Err(parse_error("unterminated front-matter block"));
            }
            return Ok((FrontMatter::default(), original));
        };
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        if !looks_like_yaml(yaml_content) {
            return Ok((FrontMatter::default(), original));
        }

        serde_yaml::from_str::<FrontMatter>(yaml_content)
            .map(|fm| (fm, remaining))
            .map_err(|e| parse_error(&e.to_string()))
    }

    /// Coerce the raw fields into typed post metadata.
    ///
    /// A `date` that is present but not recognised is an error rather than a
    /// silently mis-sorted post.
    pub fn into_meta(self) -> Result<PostMeta> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date_string(raw).ok_or_else(|| BlogError::InvalidDate {
                path: PathBuf::new(),
                value: raw.to_string(),
            })?),
        };

        let mut extra = self.extra;
        extra.retain(|key, _| {
            let reserved = RESERVED_KEYS.contains(&key.as_str());
            if reserved {
                tracing::warn!("Ignoring reserved front-matter key {:?}", key);
            }
            !reserved
        });

        Ok(PostMeta {
            title: self.title,
            date,
            excerpt: self.excerpt,
            tags: self.tags,
            extra,
        })
    }
}

fn parse_error(message: &str) -> BlogError {
    BlogError::Parse {
        path: PathBuf::new(),
        message: message.to_string(),
    }
}

/// Valid front-matter has at least one `key: value` line.
/// Markdown lists and URLs (`https://...`) do not count.
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 with an offset; compare instants, not wall clocks
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Designing a Rate Limiter
date: 2024-01-15
excerpt: Token buckets and friends
tags:
  - architecture
  - system-design
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Designing a Rate Limiter"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.tags, vec!["architecture", "system-design"]);
        assert_eq!(remaining, "This is the content.\n");
    }

    #[test]
    fn test_no_frontmatter_is_all_body() {
        let content = "# Just a heading\n\nAnd text.";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_empty_frontmatter_block() {
        let (fm, remaining) = FrontMatter::parse("---\n---\nBody").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_parse_single_string_tags() {
        let content = "---\ntitle: One Tag\ntags: career\n---\nText";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["career"]);
    }

    #[test]
    fn test_numeric_title_is_kept_as_text() {
        let (fm, _) = FrontMatter::parse("---\ntitle: 1984\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("1984"));
    }

    #[test]
    fn test_extra_fields_preserved() {
        let (fm, _) = FrontMatter::parse("---\ntitle: T\ncover: /img/a.png\n---\n").unwrap();
        assert_eq!(
            fm.extra.get("cover"),
            Some(&Value::String("/img/a.png".to_string()))
        );
    }

    #[test]
    fn test_reserved_keys_dropped_from_extra() {
        let content = "---\ntitle: T\nslug: other\ncontent: x\ncover: c.png\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let meta = fm.into_meta().unwrap();
        assert!(!meta.extra.contains_key("slug"));
        assert!(!meta.extra.contains_key("content"));
        assert!(meta.extra.contains_key("cover"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let content = "---\ntitle: [unclosed\ndate: 2024-01-01\n---\nBody";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, BlogError::Parse { .. }));
    }

    #[test]
    fn test_unterminated_block_is_parse_error() {
        let err = FrontMatter::parse("---\ntitle: Never closed\n\nBody").unwrap_err();
        assert!(matches!(err, BlogError::Parse { .. }));
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Some random text with markdown lists:
- Item 1
- Item 2

---
More content here.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(remaining.contains("Some random text"));
        assert!(remaining.contains("More content here."));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = "---\nCheck out https://example.com/path\n---\nMore.";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(remaining.contains("https://example.com"));
    }

    #[test]
    fn test_into_meta_parses_date() {
        let fm = FrontMatter {
            date: Some("2024-06-01".to_string()),
            ..Default::default()
        };
        let meta = fm.into_meta().unwrap();
        assert_eq!(
            meta.date.unwrap().format("%Y-%m-%d %H:%M").to_string(),
            "2024-06-01 00:00"
        );
    }

    #[test]
    fn test_into_meta_rejects_bad_date() {
        let fm = FrontMatter {
            date: Some("June 1st".to_string()),
            ..Default::default()
        };
        let err = fm.into_meta().unwrap_err();
        assert!(matches!(err, BlogError::InvalidDate { ref value, .. } if value == "June 1st"));
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date_string("2024-01-15 10:30:00").is_some());
        assert!(parse_date_string("2024/01/15").is_some());
        assert!(parse_date_string("2024-01-15T10:30:00").is_some());
        let utc = parse_date_string("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(utc.format("%H:%M").to_string(), "08:30");
        assert!(parse_date_string("15.01.2024").is_none());
    }
}
