//! Show a single post

use anyhow::Result;
use serde::Serialize;

use super::list::ensure_exists;
use crate::{Folio, PostSummary};

/// Everything the detail page needs about one post
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
    pub related: Vec<PostSummary>,
    pub newer: Option<PostSummary>,
    pub older: Option<PostSummary>,
}

/// Build the detail view of `slug`, or `None` if there is no such post
pub fn detail(folio: &Folio, index: &crate::BlogIndex, slug: &str) -> Option<PostDetail> {
    let post = index.get_by_slug(slug)?;
    let neighbors = index.neighbors(slug).unwrap_or_default();

    Some(PostDetail {
        summary: folio.summary(post),
        content: post.content.clone(),
        related: index
            .related(slug, folio.config.related_limit)
            .into_iter()
            .map(|p| folio.summary(p))
            .collect(),
        newer: neighbors.newer.map(|p| folio.summary(p)),
        older: neighbors.older.map(|p| folio.summary(p)),
    })
}

/// Print a post: metadata header, then rendered HTML (or markdown with `raw`)
pub fn run(folio: &Folio, slug: &str, raw: bool, json: bool) -> Result<()> {
    let index = folio.load()?;
    ensure_exists(&index, slug)?;
    let Some(detail) = detail(folio, &index, slug) else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let summary = &detail.summary;
    println!("{}", summary.title);
    println!(
        "{} • {} • {} min read",
        summary.category_display_name,
        summary.formatted_date.as_deref().unwrap_or("undated"),
        summary.reading_time
    );
    if !summary.tags.is_empty() {
        println!("Tags: {}", summary.tags.join(", "));
    }
    if let Some(excerpt) = &summary.excerpt {
        println!("\n{}", excerpt);
    }

    println!();
    if raw {
        if let Some(post) = index.get_by_slug(slug) {
            println!("{}", post.raw_content);
        }
    } else {
        println!("{}", detail.content);
    }

    if !detail.related.is_empty() {
        println!("Related:");
        for related in &detail.related {
            println!("  {} ({})", related.title, related.slug);
        }
    }

    Ok(())
}
