//! Post and Category models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::helpers;

/// Keys the post records already use; front-matter may not shadow them
pub(crate) const RESERVED_KEYS: &[&str] = &[
    "slug",
    "category",
    "categoryDisplayName",
    "content",
    "raw_content",
    "rawContent",
    "source",
    "formattedDate",
    "readingTime",
    "related",
    "newer",
    "older",
];

/// Typed front-matter of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostMeta {
    pub title: Option<String>,

    /// Publication date; undated posts sort after every dated one
    pub date: Option<NaiveDateTime>,

    pub excerpt: Option<String>,

    pub tags: Vec<String>,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// File name without extension, unique across the collection
    pub slug: String,

    /// Name of the directory the post was loaded from
    pub category: String,

    #[serde(flatten)]
    pub meta: PostMeta,

    /// Rendered HTML content
    pub content: String,

    /// Markdown body as written, used for search and reading time
    pub raw_content: String,

    /// Source file path
    pub source: PathBuf,
}

impl Post {
    /// Title for display, falling back to the slug
    pub fn display_title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or(&self.slug)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.meta.tags.iter().any(|t| t == tag)
    }

    /// Whether the two posts have at least one tag in common
    pub fn shares_tag_with(&self, other: &Post) -> bool {
        self.meta.tags.iter().any(|t| other.has_tag(t))
    }

    /// Estimated minutes to read the markdown body
    pub fn reading_time(&self, words_per_minute: usize) -> usize {
        helpers::reading_time(&self.raw_content, words_per_minute)
    }

    /// Case-insensitive match against title, excerpt, body and tags.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        let contains = |field: Option<&str>| {
            field
                .map(|s| s.to_lowercase().contains(needle))
                .unwrap_or(false)
        };

        contains(self.meta.title.as_deref())
            || contains(self.meta.excerpt.as_deref())
            || contains(Some(&self.raw_content))
            || self.meta.tags.iter().any(|t| t.to_lowercase() == needle)
    }
}

/// A category derived from the content directory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    pub display_name: String,
    pub count: usize,
}

impl Category {
    pub fn new(name: &str, count: usize) -> Self {
        Self {
            name: name.to_string(),
            display_name: helpers::category_display_name(name),
            count,
        }
    }
}

/// Listing view of a post, with the presentation fields pre-computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub slug: String,
    pub category: String,
    pub category_display_name: String,
    pub title: String,
    pub date: Option<NaiveDateTime>,
    pub formatted_date: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub reading_time: usize,

    /// Custom front-matter fields, passed through as written
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl PostSummary {
    pub fn new(post: &Post, words_per_minute: usize, date_format: &str) -> Self {
        Self {
            slug: post.slug.clone(),
            category: post.category.clone(),
            category_display_name: helpers::category_display_name(&post.category),
            title: post.display_title().to_string(),
            date: post.meta.date,
            formatted_date: post
                .meta
                .date
                .as_ref()
                .map(|d| helpers::format_date(d, date_format)),
            excerpt: post.meta.excerpt.clone(),
            tags: post.meta.tags.clone(),
            reading_time: post.reading_time(words_per_minute),
            extra: post.meta.extra.clone(),
        }
    }
}
