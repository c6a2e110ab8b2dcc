//! Build orchestration.
//!
//! A build runs strictly ordered phases over one [`BlogContent`] value:
//! load (sequence, paginate, index tags), emit units, then write feeds once
//! the rest of the site is done. Each phase receives the content explicitly.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use postmill_core::{
    Config, CoreError, Post, ResolvedOptions, config::ADMONITIONS_STYLESHEET, content::excerpt,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    emit::{EmitError, EmitStats, UnitEmitter},
    feed::{FeedError, FeedGenerator},
    head::{HeadTag, head_tags},
    paginate::{ListPage, paginate},
    router::Router,
    sequence::link_adjacent,
    tags::TagIndex,
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Configuration or core error.
    #[error("config error: {0}")]
    Core(#[from] CoreError),

    /// Unit emission error.
    #[error("emit error: {0}")]
    Emit(#[from] EmitError),

    /// Feed generation error.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Everything derived from one build's posts.
#[derive(Debug, Clone)]
pub struct BlogContent {
    /// Posts in listing order, linked and with normalized tags.
    pub posts: Vec<Post>,

    pub list_pages: Vec<ListPage>,

    pub tags: TagIndex,

    /// Root of the tag pages, `None` when no post has an indexed tag.
    pub tags_list_path: Option<String>,
}

/// Outcome of the load phase.
#[derive(Debug, Clone)]
pub enum LoadedContent {
    /// No posts: every later phase is a no-op.
    Empty,
    Ready(BlogContent),
}

impl LoadedContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn content(&self) -> Option<&BlogContent> {
        match self {
            Self::Empty => None,
            Self::Ready(content) => Some(content),
        }
    }
}

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub posts: usize,
    pub pages: usize,
    pub tags: usize,
    pub data_blobs: usize,
    pub feeds: Vec<PathBuf>,
    pub duration_ms: u64,
}

/// Blog builder holding the resolved options.
#[derive(Debug, Clone)]
pub struct Builder {
    options: ResolvedOptions,
}

impl Builder {
    /// Resolve `config` against `site_dir` and create a builder.
    ///
    /// Invalid options (including an unknown feed type) fail here, before
    /// any content is touched.
    pub fn new(config: &Config, site_dir: &Path) -> Result<Self> {
        Ok(Self::from_options(config.resolve(site_dir)?))
    }

    #[must_use]
    pub fn from_options(options: ResolvedOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Glob patterns a watcher should observe.
    pub fn paths_to_watch(&self) -> Vec<String> {
        let content_path = self.options.content_path.to_string_lossy();
        self.options
            .include
            .iter()
            .map(|pattern| format!("{}/{}", content_path.trim_end_matches('/'), pattern))
            .collect()
    }

    /// Modules every client page must load.
    pub fn client_modules(&self) -> Vec<String> {
        self.options
            .admonitions
            .as_ref()
            .map(|_| vec![ADMONITIONS_STYLESHEET.to_string()])
            .unwrap_or_default()
    }

    /// Sequence the posts, paginate them and index their tags.
    ///
    /// `posts` must already be in listing order (newest first).
    pub fn load_content(&self, mut posts: Vec<Post>) -> LoadedContent {
        if posts.is_empty() {
            info!("no blog posts found, nothing to do");
            return LoadedContent::Empty;
        }

        link_adjacent(&mut posts);

        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let list_pages = paginate(&ids, self.options.posts_per_page, &self.options.base_page_url);

        let tags = TagIndex::index_posts(&mut posts, &self.options.tags_path);
        let tags_list_path = tags.list_path(&self.options.tags_path);

        debug!(
            posts = posts.len(),
            pages = list_pages.len(),
            tags = tags.len(),
            "loaded blog content"
        );

        LoadedContent::Ready(BlogContent {
            posts,
            list_pages,
            tags,
            tags_list_path,
        })
    }

    /// Emit the post, list, tag and tag-index units.
    pub fn content_loaded(
        &self,
        content: &LoadedContent,
        router: &dyn Router,
    ) -> Result<Option<EmitStats>> {
        let Some(content) = content.content() else {
            return Ok(None);
        };

        Ok(Some(UnitEmitter::new(&self.options).emit(content, router)?))
    }

    /// Write the configured feeds below `out_dir`.
    pub fn post_build(&self, content: &LoadedContent, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let (Some(content), Some(generator)) =
            (content.content(), FeedGenerator::new(&self.options))
        else {
            return Ok(Vec::new());
        };

        Ok(generator.write_all(&content.posts, out_dir)?)
    }

    /// The part of `post` a truncated list item renders.
    pub fn excerpt<'p>(&self, post: &'p Post) -> &'p str {
        excerpt(&post.body, &self.options.truncate_marker)
    }

    /// Feed discovery links for the HTML head.
    pub fn head_tags(&self) -> Vec<HeadTag> {
        head_tags(&self.options)
    }

    /// Run every phase.
    ///
    /// Returns `None` when there are no posts, in which case nothing was
    /// emitted or written.
    pub fn build(
        &self,
        posts: Vec<Post>,
        router: &dyn Router,
        out_dir: &Path,
    ) -> Result<Option<BuildStats>> {
        let start = Instant::now();

        info!(
            posts = posts.len(),
            output = %out_dir.display(),
            "starting blog build"
        );

        let content = self.load_content(posts);
        let Some(emitted) = self.content_loaded(&content, router)? else {
            return Ok(None);
        };
        let feeds = self.post_build(&content, out_dir)?;

        let stats = BuildStats {
            posts: emitted.posts,
            pages: emitted.pages,
            tags: emitted.tags,
            data_blobs: emitted.data_blobs,
            feeds,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            posts = stats.posts,
            pages = stats.pages,
            tags = stats.tags,
            feeds = stats.feeds.len(),
            duration_ms = stats.duration_ms,
            "blog build complete"
        );

        Ok(Some(stats))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        router::MemoryRouter,
        test_support::{config, config_with_feed, post},
    };

    #[test]
    fn test_empty_is_sentinel() {
        let builder = Builder::new(&config_with_feed("all"), Path::new(".")).expect("builder");
        let out = TempDir::new().expect("temp dir");
        let router = MemoryRouter::new();

        let content = builder.load_content(Vec::new());
        assert!(content.is_empty());
        assert!(builder.content_loaded(&content, &router).expect("emit").is_none());
        assert!(builder.post_build(&content, out.path()).expect("feeds").is_empty());

        let stats = builder.build(Vec::new(), &router, out.path()).expect("build");
        assert!(stats.is_none());
        assert!(router.routes().expect("routes").is_empty());
        assert!(router.data().expect("data").is_empty());
        assert!(!out.path().join("blog").exists());
    }

    #[test]
    fn test_load_content_links_pages_and_tags() {
        let builder = Builder::new(&config(), Path::new(".")).expect("builder");
        let posts = vec![post("1", &["Rust"]), post("2", &["rust", "Web Dev"])];

        let LoadedContent::Ready(content) = builder.load_content(posts) else {
            panic!("expected content");
        };

        assert_eq!(
            content.posts[0].metadata.next_item.as_ref().map(|n| n.permalink.as_str()),
            Some("/blog/2")
        );
        assert_eq!(content.list_pages.len(), 1);
        assert_eq!(content.list_pages[0].post_ids, vec!["1", "2"]);
        assert_eq!(content.tags.len(), 2);
        assert!(content.tags.get("web-dev").is_some());
        assert_eq!(content.tags_list_path.as_deref(), Some("/blog/tags"));
    }

    #[test]
    fn test_build_writes_units_and_feeds() {
        let builder = Builder::new(&config_with_feed("all"), Path::new(".")).expect("builder");
        let out = TempDir::new().expect("temp dir");
        let router = MemoryRouter::new();

        let stats = builder
            .build(vec![post("1", &["rust"]), post("2", &[])], &router, out.path())
            .expect("build")
            .expect("stats");

        assert_eq!(stats.posts, 2);
        assert_eq!(stats.pages, 1);
        assert_eq!(stats.tags, 1);
        assert_eq!(stats.feeds.len(), 2);
        assert!(out.path().join("blog/rss.xml").exists());
        assert!(out.path().join("blog/atom.xml").exists());
    }

    #[test]
    fn test_no_feeds_without_feed_options() {
        let builder = Builder::new(&config(), Path::new(".")).expect("builder");
        let out = TempDir::new().expect("temp dir");
        let router = MemoryRouter::new();

        let stats = builder
            .build(vec![post("1", &[])], &router, out.path())
            .expect("build")
            .expect("stats");

        assert!(stats.feeds.is_empty());
        assert!(builder.head_tags().is_empty());
    }

    #[test]
    fn test_invalid_feed_type_fails_at_construction() {
        let err = Builder::new(&config_with_feed("json"), Path::new(".")).unwrap_err();
        assert!(matches!(err, BuildError::Core(CoreError::InvalidFeedType(ref v)) if v == "json"));
    }

    #[test]
    fn test_excerpt_uses_configured_marker() {
        let builder = Builder::new(&config(), Path::new(".")).expect("builder");
        assert_eq!(builder.excerpt(&post("1", &[])), "Intro of 1\n");

        let mut config = config();
        config.blog.truncate_marker = "<!-- more -->".to_string();
        let builder = Builder::new(&config, Path::new(".")).expect("builder");
        let whole = post("1", &[]);
        assert_eq!(builder.excerpt(&whole), whole.body);
    }

    #[test]
    fn test_paths_to_watch_and_client_modules() {
        let builder = Builder::new(&config(), Path::new("/site")).expect("builder");

        assert_eq!(
            builder.paths_to_watch(),
            vec!["/site/blog/*.md", "/site/blog/*.mdx"]
        );
        assert_eq!(builder.client_modules(), vec![ADMONITIONS_STYLESHEET]);

        let mut config = config();
        config.blog.admonitions.enabled = false;
        let builder = Builder::new(&config, Path::new("/site")).expect("builder");
        assert!(builder.client_modules().is_empty());
    }
}
