//! Export the index as JSON for the presentation layer
//!
//! Output layout under the public directory:
//!
//! - `index.json`: every post summary, the categories and the recent posts
//! - `categories.json`
//! - `paths.json`: the URL path of every post page
//! - `posts/<slug>.json`: one detail record per post
//!
//! Files are written to a sibling staging directory which then replaces the
//! public directory, so a failed export leaves the previous one intact.

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::show;
use crate::{BlogIndex, Category, Folio, PostSummary, CONFIG_FILE};

/// Unreserved URL characters stay as they are
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteIndex<'a> {
    title: &'a str,
    author: &'a str,
    url: &'a str,
    posts: Vec<PostSummary>,
    categories: Vec<Category>,
    recent: Vec<PostSummary>,
}

/// Load the content and export it; returns the number of posts written
pub fn run(folio: &Folio) -> Result<usize> {
    let start = std::time::Instant::now();
    let index = folio.load()?;
    write_site(folio, &index)?;

    tracing::info!(
        "Exported {} posts to {:?} in {:.2}s",
        index.len(),
        folio.public_dir,
        start.elapsed().as_secs_f64()
    );
    Ok(index.len())
}

/// URL path of a post page
pub fn post_path(slug: &str) -> String {
    format!("/blog/{}", utf8_percent_encode(slug, PATH_SEGMENT))
}

fn write_site(folio: &Folio, index: &BlogIndex) -> Result<()> {
    let staging = staging_dir(&folio.public_dir);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(staging.join("posts"))
        .with_context(|| format!("Failed to create {:?}", staging))?;

    let site = SiteIndex {
        title: &folio.config.title,
        author: &folio.config.author,
        url: folio.config.url.trim_end_matches('/'),
        posts: index.all().iter().map(|p| folio.summary(p)).collect(),
        categories: index.categories(),
        recent: index
            .recent(folio.config.recent_limit)
            .iter()
            .map(|p| folio.summary(p))
            .collect(),
    };
    write_json(&staging.join("index.json"), &site)?;
    write_json(&staging.join("categories.json"), &site.categories)?;

    let paths: Vec<String> = index.slugs().into_iter().map(post_path).collect();
    write_json(&staging.join("paths.json"), &paths)?;

    for slug in index.slugs() {
        if let Some(detail) = show::detail(folio, index, slug) {
            write_json(&staging.join("posts").join(format!("{}.json", slug)), &detail)?;
        }
    }

    if folio.public_dir.exists() {
        fs::remove_dir_all(&folio.public_dir)?;
    }
    fs::rename(&staging, &folio.public_dir)
        .with_context(|| format!("Failed to publish {:?}", folio.public_dir))?;

    Ok(())
}

fn staging_dir(public_dir: &Path) -> PathBuf {
    let mut name = public_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    public_dir.with_file_name(name)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

/// Watch the content directory and config, re-exporting on change
pub fn watch(folio: &Folio) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&folio.content_dir, RecursiveMode::Recursive)?;
    let config_path = folio.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", folio.content_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if !events.iter().any(|e| is_relevant(&e.path)) {
                    continue;
                }
                for event in &events {
                    tracing::debug!("Changed: {:?}", event.path);
                }

                // Config edits can move the content dir; re-read it on every change
                let result = Folio::new(&folio.base_dir)
                    .map_err(anyhow::Error::from)
                    .and_then(|folio| run(&folio));
                if let Err(e) = result {
                    tracing::error!("Export failed: {:#}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Skip editor swap files and VCS noise
pub(crate) fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}
