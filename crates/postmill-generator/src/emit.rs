//! Route and data-blob emission.
//!
//! Every post is serialized once, into its own blob. List pages and tag
//! pages reference posts through [`ContentItem`] imports, so a post shown on
//! several listings is still stored a single time.

use std::collections::{HashMap, HashSet};

use postmill_core::{PostMetadata, ResolvedOptions, url::data_key};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    build::BlogContent,
    router::{ContentItem, Module, RouteConfig, Router, RouterError},
    tags::TagSummary,
};

/// Emission errors.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Router error.
    #[error("router error: {0}")]
    Router(#[from] RouterError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A listing references a post id that has no post unit.
    #[error("no post with id {0}")]
    MissingPost(String),

    /// Two posts share an id.
    #[error("duplicate post id {0}")]
    DuplicatePost(String),
}

/// Result type for emission.
pub type Result<T> = std::result::Result<T, EmitError>;

/// Counts of emitted units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitStats {
    pub posts: usize,
    pub pages: usize,
    pub tags: usize,
    pub data_blobs: usize,
}

type MetadataById<'a> = HashMap<&'a str, &'a PostMetadata>;

/// Turns loaded blog content into routes and data blobs.
#[derive(Debug)]
pub struct UnitEmitter<'a> {
    options: &'a ResolvedOptions,
}

impl<'a> UnitEmitter<'a> {
    #[must_use]
    pub fn new(options: &'a ResolvedOptions) -> Self {
        Self { options }
    }

    /// Emit all units for `content` through `router`.
    ///
    /// Post units are written first; page and tag units are only built once
    /// every post unit exists. Any failure aborts the emission.
    pub fn emit(&self, content: &BlogContent, router: &dyn Router) -> Result<EmitStats> {
        let metadata = self.emit_posts(content, router)?;
        let pages = self.emit_pages(content, &metadata, router)?;
        let tags = self.emit_tags(content, &metadata, router)?;

        let stats = EmitStats {
            posts: metadata.len(),
            pages,
            tags,
            data_blobs: metadata.len() + pages + tags + usize::from(tags > 0),
        };

        info!(
            posts = stats.posts,
            pages = stats.pages,
            tags = stats.tags,
            data_blobs = stats.data_blobs,
            "emitted blog units"
        );

        Ok(stats)
    }

    fn emit_posts<'c>(
        &self,
        content: &'c BlogContent,
        router: &dyn Router,
    ) -> Result<MetadataById<'c>> {
        let component = &self.options.components.blog_post;

        let metadata: MetadataById<'c> = content
            .posts
            .par_iter()
            .map(|post| -> Result<(&'c str, &'c PostMetadata)> {
                let json = serde_json::to_string_pretty(&post.metadata)?;
                router.create_data(&blob_name(&post.metadata.source), &json)?;
                router.add_route(
                    RouteConfig::new(&post.metadata.permalink, component)
                        .with_module("content", Module::Path(post.metadata.source.clone())),
                )?;

                debug!(id = %post.id, permalink = %post.metadata.permalink, "emitted post");
                Ok((post.id.as_str(), &post.metadata))
            })
            .collect::<Result<_>>()?;

        if metadata.len() != content.posts.len() {
            let mut seen = HashSet::new();
            if let Some(post) = content.posts.iter().find(|p| !seen.insert(p.id.as_str())) {
                return Err(EmitError::DuplicatePost(post.id.clone()));
            }
        }

        Ok(metadata)
    }

    fn emit_pages(
        &self,
        content: &BlogContent,
        metadata: &MetadataById<'_>,
        router: &dyn Router,
    ) -> Result<usize> {
        let component = &self.options.components.blog_list;

        content
            .list_pages
            .par_iter()
            .map(|page| -> Result<()> {
                let json = serde_json::to_string_pretty(page)?;
                let metadata_path = router.create_data(&blob_name(&page.permalink), &json)?;

                router.add_route(
                    RouteConfig::new(&page.permalink, component)
                        .with_module("items", items(&page.post_ids, metadata)?)
                        .with_module("metadata", Module::Path(metadata_path)),
                )?;
                Ok(())
            })
            .collect::<Result<Vec<()>>>()
            .map(|done| done.len())
    }

    fn emit_tags(
        &self,
        content: &BlogContent,
        metadata: &MetadataById<'_>,
        router: &dyn Router,
    ) -> Result<usize> {
        let Some(all_tags_path) = content.tags_list_path.as_deref() else {
            return Ok(0);
        };
        let component = &self.options.components.blog_tags_posts;

        let summaries: Vec<TagSummary> = content
            .tags
            .entries()
            .par_iter()
            .map(|tag| -> Result<TagSummary> {
                let summary = tag.summary(all_tags_path);
                let json = serde_json::to_string_pretty(&summary)?;
                let metadata_path = router.create_data(&blob_name(&tag.permalink), &json)?;

                router.add_route(
                    RouteConfig::new(&tag.permalink, component)
                        .with_module("items", items(&tag.post_ids, metadata)?)
                        .with_module("metadata", Module::Path(metadata_path)),
                )?;
                Ok(summary)
            })
            .collect::<Result<_>>()?;

        let mut tags_module = serde_json::Map::new();
        for summary in &summaries {
            tags_module.insert(summary.slug.clone(), serde_json::to_value(summary)?);
        }

        let json = serde_json::to_string_pretty(&tags_module)?;
        let tags_path = router.create_data(&blob_name(&format!("{all_tags_path}-tags")), &json)?;
        router.add_route(
            RouteConfig::new(all_tags_path, &self.options.components.blog_tags_list)
                .with_module("tags", Module::Path(tags_path)),
        )?;

        Ok(summaries.len())
    }
}

fn blob_name(key: &str) -> String {
    format!("{}.json", data_key(key))
}

/// Truncated content references for `ids`.
fn items(ids: &[String], metadata: &MetadataById<'_>) -> Result<Module> {
    ids.iter()
        .map(|id| {
            metadata
                .get(id.as_str())
                .map(|m| ContentItem::truncated(m.source.clone()))
                .ok_or_else(|| EmitError::MissingPost(id.clone()))
        })
        .collect::<Result<Vec<_>>>()
        .map(Module::Items)
}
