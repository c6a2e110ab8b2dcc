//! Tag normalization and the tag → posts index.

use std::collections::HashMap;

use postmill_core::{Post, TagRef, url};
use serde::Serialize;
use tracing::{debug, warn};

/// All posts carrying one normalized tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Normalization key, unique within the index.
    pub slug: String,

    /// Lowercased label of the first post that used the tag.
    pub name: String,

    pub permalink: String,

    /// Posts in traversal order.
    pub post_ids: Vec<String>,
}

/// Data blob describing a tag for the tag pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub all_tags_path: String,
    pub slug: String,
    pub name: String,
    pub count: usize,
    pub permalink: String,
}

/// Tag index in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    entries: Vec<TagEntry>,
    by_slug: HashMap<String, usize>,
}

impl TagIndex {
    /// Normalize the tags of `posts` and build the index.
    ///
    /// Raw labels become `Linked` tags pointing at `tags_path/<slug>`, keeping
    /// the label as written. Tags that arrive already linked are kept and are
    /// not indexed.
    pub fn index_posts(posts: &mut [Post], tags_path: &str) -> Self {
        let mut index = Self::default();

        for post in posts.iter_mut() {
            let tags = std::mem::take(&mut post.metadata.tags);
            if tags.is_empty() {
                continue;
            }

            post.metadata.tags = tags
                .into_iter()
                .filter_map(|tag| match tag {
                    TagRef::Raw(label) => index.register(&post.id, label, tags_path),
                    linked @ TagRef::Linked { .. } => Some(linked),
                })
                .collect();
        }

        debug!(tags = index.len(), "indexed tags");
        index
    }

    fn register(&mut self, post_id: &str, label: String, tags_path: &str) -> Option<TagRef> {
        let slug = url::slugify(&label);
        if slug.is_empty() {
            warn!(post = post_id, label = %label, "dropping tag without usable characters");
            return None;
        }

        let position = match self.by_slug.get(&slug) {
            Some(&position) => position,
            None => {
                self.entries.push(TagEntry {
                    permalink: url::normalize_url(&[tags_path, &slug]),
                    name: label.to_lowercase(),
                    slug: slug.clone(),
                    post_ids: Vec::new(),
                });
                self.by_slug.insert(slug, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[position];
        // a post listing the same tag twice counts once
        if entry.post_ids.last().map(String::as_str) != Some(post_id) {
            entry.post_ids.push(post_id.to_string());
        }

        Some(TagRef::Linked {
            label,
            permalink: entry.permalink.clone(),
        })
    }

    pub fn get(&self, slug: &str) -> Option<&TagEntry> {
        self.by_slug.get(slug).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Root of the tag pages, or `None` when nothing was indexed.
    pub fn list_path(&self, tags_path: &str) -> Option<String> {
        (!self.is_empty()).then(|| tags_path.to_string())
    }
}

impl TagEntry {
    pub fn summary(&self, all_tags_path: &str) -> TagSummary {
        TagSummary {
            all_tags_path: all_tags_path.to_string(),
            slug: self.slug.clone(),
            name: self.name.clone(),
            count: self.post_ids.len(),
            permalink: self.permalink.clone(),
        }
    }
}
