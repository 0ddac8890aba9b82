//! List site content

use anyhow::Result;

use crate::content::Post;
use crate::helpers;
use crate::{BlogIndex, Folio};

/// List posts, optionally narrowed to a category and a search query
pub fn run(folio: &Folio, category: Option<&str>, query: Option<&str>, json: bool) -> Result<()> {
    let index = folio.load()?;
    let posts = index.filter(category, query.unwrap_or(""));
    print_posts(folio, "Posts", &posts, json)
}

/// List categories with their post counts
pub fn categories(folio: &Folio, json: bool) -> Result<()> {
    let categories = folio.load()?.categories();

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    println!("Categories ({}):", categories.len());
    for category in categories {
        println!(
            "  {} [{}] ({})",
            category.display_name, category.name, category.count
        );
    }
    Ok(())
}

/// The newest posts; defaults to the configured `recent_limit`
pub fn recent(folio: &Folio, limit: Option<usize>, json: bool) -> Result<()> {
    let index = folio.load()?;
    let limit = limit.unwrap_or(folio.config.recent_limit);
    let posts: Vec<&Post> = index.recent(limit).iter().collect();
    print_posts(folio, "Recent posts", &posts, json)
}

/// Full-text search over titles, excerpts, bodies and tags
pub fn search(folio: &Folio, query: &str, json: bool) -> Result<()> {
    let index = folio.load()?;
    let posts = index.search(query);
    print_posts(folio, &format!("Posts matching {:?}", query), &posts, json)
}

/// Posts related to `slug`; defaults to the configured `related_limit`
pub fn related(folio: &Folio, slug: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let index = folio.load()?;
    ensure_exists(&index, slug)?;
    let limit = limit.unwrap_or(folio.config.related_limit);
    let posts = index.related(slug, limit);
    print_posts(folio, &format!("Related to {}", slug), &posts, json)
}

pub(crate) fn ensure_exists(index: &BlogIndex, slug: &str) -> Result<()> {
    if index.get_by_slug(slug).is_none() {
        anyhow::bail!("No post with slug {:?}", slug);
    }
    Ok(())
}

fn print_posts(folio: &Folio, heading: &str, posts: &[&Post], json: bool) -> Result<()> {
    if json {
        let summaries: Vec<_> = posts.iter().map(|p| folio.summary(p)).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{} ({}):", heading, posts.len());
    for post in posts {
        println!("  {}", post_line(folio, post));
    }
    Ok(())
}

/// `2024-06-01 - Title [career] (3 min read)`
fn post_line(folio: &Folio, post: &Post) -> String {
    let date = post
        .meta
        .date
        .as_ref()
        .map(helpers::date_iso)
        .unwrap_or_else(|| "----------".to_string());
    format!(
        "{} - {} [{}] ({} min read)",
        date,
        post.display_title(),
        post.category,
        post.reading_time(folio.config.words_per_minute)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostMeta;
    use std::path::PathBuf;

    #[test]
    fn test_post_line() {
        let folio = Folio::with_config("/tmp/site", Default::default());
        let post = Post {
            slug: "hello".to_string(),
            category: "career".to_string(),
            meta: PostMeta {
                title: Some("Hello".to_string()),
                date: crate::content::parse_date_string("2024-06-01"),
                ..Default::default()
            },
            content: String::new(),
            raw_content: "one two three".to_string(),
            source: PathBuf::from("career/hello.md"),
        };
        assert_eq!(
            post_line(&folio, &post),
            "2024-06-01 - Hello [career] (1 min read)"
        );
    }
}
