//! Read-only JSON API over a warm index
//!
//! The server keeps one [`BlogIndex`] behind an `Arc`. A reload builds a
//! complete new index first and only then swaps it in, so requests see either
//! the old collection or the new one, never a half-built one. A reload that
//! fails keeps the last good index.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::commands::{export::is_relevant, show};
use crate::{BlogIndex, Category, Folio, PostSummary};

/// Server state
pub struct AppState {
    folio: Folio,
    index: RwLock<Arc<BlogIndex>>,
}

impl AppState {
    pub fn new(folio: Folio, index: BlogIndex) -> Self {
        Self {
            folio,
            index: RwLock::new(Arc::new(index)),
        }
    }

    /// The index currently being served
    pub fn index(&self) -> Arc<BlogIndex> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuild the index from disk and publish it; returns the new post count
    pub fn reload(&self) -> crate::Result<usize> {
        let index = self.folio.load()?;
        let count = index.len();
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(index);
        Ok(count)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

/// Routes of the API
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(get_post))
        .route("/api/categories", get(categories))
        .route("/api/recent", get(recent))
        .route("/api/search", get(search))
        .route("/api/related/:slug", get(related))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn start(folio: Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    let index = {
        let folio = folio.clone();
        tokio::task::spawn_blocking(move || folio.load()).await??
    };
    let state = Arc::new(AppState::new(folio, index));

    if watch {
        let watcher_state = state.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&watcher_state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("API running at http://{}:{}/api/posts", ip, port);
    if watch {
        println!("Watching for content changes...");
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch the content directory and swap in a fresh index on change
fn watch_and_reload(state: &AppState) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let content_dir = &state.folio.content_dir;
    debouncer
        .watcher()
        .watch(content_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", content_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if !events.iter().any(|e| is_relevant(&e.path)) {
                    continue;
                }
                match state.reload() {
                    Ok(count) => tracing::info!("Reindexed {} posts", count),
                    Err(e) => tracing::error!("Reindex failed, keeping previous index: {}", e),
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

fn summaries<'a>(
    folio: &Folio,
    posts: impl IntoIterator<Item = &'a crate::Post>,
) -> Json<Vec<PostSummary>> {
    Json(posts.into_iter().map(|p| folio.summary(p)).collect())
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<PostSummary>> {
    let index = state.index();
    let posts = index.filter(params.category.as_deref(), params.q.as_deref().unwrap_or(""));
    summaries(&state.folio, posts)
}

async fn get_post(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    let index = state.index();
    match show::detail(&state.folio, &index, &slug) {
        Some(detail) => Json(detail).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "message": "Post not found" })),
        )
            .into_response(),
    }
}

async fn categories(State(state): State<Arc<AppState>>) -> Json<Vec<Category>> {
    Json(state.index().categories())
}

async fn recent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<PostSummary>> {
    let index = state.index();
    let limit = params.limit.unwrap_or(state.folio.config.recent_limit);
    summaries(&state.folio, index.recent(limit))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<PostSummary>> {
    let index = state.index();
    summaries(&state.folio, index.search(&params.q))
}

async fn related(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<PostSummary>> {
    let index = state.index();
    let limit = params.limit.unwrap_or(state.folio.config.related_limit);
    summaries(&state.folio, index.related(&slug, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn state() -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(dir.path(), Default::default());
        for (category, slug, date, tags) in [
            ("career", "first-job", "2024-06-01", "[architecture]"),
            ("system-design", "rate-limits", "2024-01-01", "[architecture]"),
        ] {
            let path = folio.content_dir.join(category);
            fs::create_dir_all(&path).unwrap();
            fs::write(
                path.join(format!("{}.md", slug)),
                format!("---\ntitle: {}\ndate: {}\ntags: {}\n---\nBody", slug, date, tags),
            )
            .unwrap();
        }
        let index = folio.load().unwrap();
        (dir, Arc::new(AppState::new(folio, index)))
    }

    #[tokio::test]
    async fn test_list_posts_filters() {
        let (_dir, state) = state();
        let Json(all) = list_posts(State(state.clone()), Query(ListParams::default())).await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].slug, "first-job");

        let params = ListParams {
            category: Some("system-design".to_string()),
            q: None,
        };
        let Json(filtered) = list_posts(State(state), Query(params)).await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].slug, "rate-limits");
    }

    #[tokio::test]
    async fn test_get_post_not_found() {
        let (_dir, state) = state();
        let response = get_post(State(state.clone()), Path("missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get_post(State(state), Path("first-job".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_related_and_search() {
        let (_dir, state) = state();
        let Json(posts) = related(
            State(state.clone()),
            Path("rate-limits".to_string()),
            Query(LimitParams::default()),
        )
        .await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "first-job");

        let Json(none) = search(State(state), Query(SearchParams::default())).await;
        assert!(none.is_empty());
    }

    #[test]
    fn test_reload_swaps_only_on_success() {
        let (_dir, state) = state();
        let before = state.index();

        let extra = state.folio.content_dir.join("career/second.md");
        fs::write(&extra, "---\ntitle: Second\ndate: 2025-01-01\n---\n").unwrap();
        assert_eq!(state.reload().unwrap(), 3);
        assert_eq!(state.index().all()[0].slug, "second");
        // readers holding the old snapshot are unaffected
        assert_eq!(before.len(), 2);

        fs::remove_dir_all(&state.folio.content_dir).unwrap();
        assert!(state.reload().is_err());
        assert_eq!(state.index().len(), 3);
    }
}
