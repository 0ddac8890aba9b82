//! Create a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::Folio;

/// Scaffold a post file in `category` and return its path
pub fn create_post(
    folio: &Folio,
    title: &str,
    category: &str,
    slug: Option<&str>,
    tags: &[String],
) -> Result<PathBuf> {
    let category = slug::slugify(category);
    if category.is_empty() {
        anyhow::bail!("Category name must contain at least one letter or digit");
    }

    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let target_dir = folio.content_dir.join(&category);
    fs::create_dir_all(&target_dir)
        .with_context(|| format!("Failed to create {:?}", target_dir))?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    // Slugs are unique across categories, not just within one
    let index = folio.load()?;
    if let Some(existing) = index.get_by_slug(&slug) {
        anyhow::bail!(
            "Slug {:?} is already used by {:?}",
            slug,
            existing.source
        );
    }

    let today = chrono::Local::now().format("%Y-%m-%d");
    // A JSON array is also a valid YAML flow sequence
    let tags = serde_json::to_string(tags)?;
    let content = format!(
        "---\ntitle: {}\ndate: {}\nexcerpt: \"\"\ntags: {}\n---\n\n",
        serde_yaml::to_string(title)?.trim_end(),
        today,
        tags
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;

    #[test]
    fn test_create_post() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(dir.path(), Default::default());
        fs::create_dir_all(&folio.content_dir).unwrap();

        let path = create_post(
            &folio,
            "Scaling: Reads vs Writes",
            "System Design",
            None,
            &["architecture".to_string()],
        )
        .unwrap();

        assert_eq!(
            path,
            folio
                .content_dir
                .join("system-design/scaling-reads-vs-writes.md")
        );

        let raw = fs::read_to_string(&path).unwrap();
        let (fm, _) = FrontMatter::parse(&raw).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Scaling: Reads vs Writes"));
        assert_eq!(fm.tags, vec!["architecture"]);

        let index = folio.load().unwrap();
        assert!(index.get_by_slug("scaling-reads-vs-writes").is_some());
    }

    #[test]
    fn test_create_post_rejects_duplicate_slug() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(dir.path(), Default::default());
        fs::create_dir_all(folio.content_dir.join("career")).unwrap();
        fs::write(
            folio.content_dir.join("career/hello.md"),
            "---\ntitle: Hello\n---\n",
        )
        .unwrap();

        let err = create_post(&folio, "Hello", "backend", None, &[]).unwrap_err();
        assert!(err.to_string().contains("already used"));
    }
}
