//! Query layer over a fully loaded, immutable set of posts
//!
//! A [`BlogIndex`] is built once per load and never mutated. Every listing it
//! hands out preserves the global order: newest `date` first, posts sharing a
//! date kept in load order, undated posts last.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::content::{Category, Post};

/// Category name that selects every post in [`BlogIndex::filter`]
pub const ALL_CATEGORIES: &str = "all";

/// The posts immediately before and after one post in the global order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Neighbors<'a> {
    /// The next more recent post
    pub newer: Option<&'a Post>,
    /// The next older post
    pub older: Option<&'a Post>,
}

/// Sorted, slug-addressable collection of posts
#[derive(Debug, Clone, Default)]
pub struct BlogIndex {
    posts: Vec<Post>,
    by_slug: HashMap<String, usize>,
    categories: Vec<String>,
}

impl BlogIndex {
    /// Build an index from the category names of the content tree and the
    /// posts loaded from it, in load order.
    pub fn new(categories: Vec<String>, mut posts: Vec<Post>) -> Self {
        // Stable: equal dates keep load order. `None < Some`, so undated sort last.
        posts.sort_by(|a, b| b.meta.date.cmp(&a.meta.date));

        let mut by_slug = HashMap::with_capacity(posts.len());
        for (i, post) in posts.iter().enumerate() {
            by_slug.entry(post.slug.clone()).or_insert(i);
        }

        let mut categories = categories;
        for post in &posts {
            if !categories.contains(&post.category) {
                categories.push(post.category.clone());
            }
        }

        Self {
            posts,
            by_slug,
            categories,
        }
    }

    /// Build an index whose categories are exactly those of `posts`
    pub fn from_posts(posts: Vec<Post>) -> Self {
        let mut categories: Vec<String> = posts.iter().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Self::new(categories, posts)
    }

    /// Every post, newest first
    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&Post> {
        self.by_slug.get(slug).map(|&i| &self.posts[i])
    }

    /// Slugs of every post, for building static paths
    pub fn slugs(&self) -> Vec<&str> {
        self.posts.iter().map(|p| p.slug.as_str()).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Post> {
        self.posts.iter().filter(|p| p.category == category).collect()
    }

    /// One entry per category directory, in directory-name order, including
    /// categories that currently hold no posts.
    pub fn categories(&self) -> Vec<Category> {
        let mut counts: IndexMap<&str, usize> =
            self.categories.iter().map(|c| (c.as_str(), 0)).collect();
        for post in &self.posts {
            *counts.entry(post.category.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(name, count)| Category::new(name, count))
            .collect()
    }

    /// The `limit` newest posts
    pub fn recent(&self, limit: usize) -> &[Post] {
        &self.posts[..limit.min(self.posts.len())]
    }

    /// Up to `limit` other posts in the same category or sharing a tag with
    /// `slug`, in global order. Unknown slugs have no related posts.
    pub fn related(&self, slug: &str, limit: usize) -> Vec<&Post> {
        let Some(current) = self.get_by_slug(slug) else {
            return Vec::new();
        };

        self.posts
            .iter()
            .filter(|p| {
                p.slug != current.slug
                    && (p.category == current.category || p.shares_tag_with(current))
            })
            .take(limit)
            .collect()
    }

    /// Posts whose title, excerpt or body contains `query`, or that carry a
    /// tag equal to it, ignoring case. The query is matched as given; a
    /// blank (empty or whitespace-only) query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&Post> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();

        self.posts
            .iter()
            .filter(|p| p.matches_lowercase(&needle))
            .collect()
    }

    /// The blog listing filter: a category (or [`ALL_CATEGORIES`]) combined
    /// with a search. Unlike [`search`](Self::search), a blank query keeps
    /// every post of the category.
    pub fn filter(&self, category: Option<&str>, query: &str) -> Vec<&Post> {
        let category = category.filter(|c| *c != ALL_CATEGORIES);
        let blank = query.trim().is_empty();
        let needle = query.to_lowercase();

        self.posts
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .filter(|p| blank || p.matches_lowercase(&needle))
            .collect()
    }

    /// Posts adjacent to `slug`, or `None` if the slug is unknown
    pub fn neighbors(&self, slug: &str) -> Option<Neighbors<'_>> {
        let &pos = self.by_slug.get(slug)?;
        Some(Neighbors {
            newer: pos.checked_sub(1).map(|i| &self.posts[i]),
            older: self.posts.get(pos + 1),
        })
    }
}
