//! Post records as handed over by the document loader.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single blog post.
///
/// Created by the external loader; the body is never inspected by the
/// indexing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Stable identifier, unique across the collection.
    pub id: String,

    /// Metadata that every derived unit refers to.
    pub metadata: PostMetadata,

    /// Raw body as loaded (markdown or MDX source).
    #[serde(default)]
    pub body: String,
}

/// Per-post metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    /// Post title.
    pub title: String,

    /// Publication date.
    pub date: DateTime<Utc>,

    /// Canonical source reference (e.g. `@site/blog/2024-01-01-hello.md`).
    pub source: String,

    /// Public path of the post.
    pub permalink: String,

    /// Short description used by feeds and listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tags in front matter order.
    #[serde(default)]
    pub tags: Vec<TagRef>,

    /// The post before this one in listing order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_item: Option<NavItem>,

    /// The post after this one in listing order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_item: Option<NavItem>,

    /// Any further loader-supplied fields, passed through untouched.
    #[serde(default, flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Title and permalink of a neighbouring post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,
    pub permalink: String,
}

impl From<&PostMetadata> for NavItem {
    fn from(metadata: &PostMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            permalink: metadata.permalink.clone(),
        }
    }
}

/// A tag attached to a post.
///
/// Loaders usually supply plain labels; a label/permalink pair is taken as
/// already resolved and left alone by the tag indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagRef {
    /// A raw label still to be normalized.
    Raw(String),
    /// A resolved tag.
    Linked { label: String, permalink: String },
}

impl TagRef {
    /// Display label of the tag.
    pub fn label(&self) -> &str {
        match self {
            Self::Raw(label) => label,
            Self::Linked { label, .. } => label,
        }
    }

    /// Permalink, if the tag has been resolved.
    pub fn permalink(&self) -> Option<&str> {
        match self {
            Self::Raw(_) => None,
            Self::Linked { permalink, .. } => Some(permalink),
        }
    }
}

/// The part of `body` before the first truncate marker.
///
/// Returns the whole body when the marker does not occur.
pub fn excerpt<'a>(body: &'a str, marker: &Regex) -> &'a str {
    match marker.find(body) {
        Some(m) => &body[..m.start()],
        None => body,
    }
}
