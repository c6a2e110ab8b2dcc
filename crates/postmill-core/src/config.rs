//! Site and blog configuration.
//!
//! [`Config`] mirrors the on-disk TOML file. [`Config::resolve`] turns it
//! into [`ResolvedOptions`] once per build: defaults are filled, the feed
//! type is validated and expanded, and derived paths are computed, so later
//! phases never re-check optional fields.

use std::{
    fmt,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    url::normalize_url,
};

/// Stylesheet shipped to clients when admonitions are enabled.
pub const ADMONITIONS_STYLESHEET: &str = "remark-admonitions/styles/infima.css";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Blog settings.
    #[serde(default)]
    pub blog: BlogOptions,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Public origin of the site (e.g., "https://example.com").
    pub url: String,

    /// Path prefix the site is served under.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Site description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Blog plugin options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogOptions {
    /// Content directory, relative to the site directory.
    #[serde(default = "default_path")]
    pub path: String,

    /// URL segment the blog is mounted at.
    #[serde(default = "default_route_base_path")]
    pub route_base_path: String,

    /// Glob patterns (relative to `path`) the loader picks posts from.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Number of posts on each list page.
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,

    /// Components bound to each route kind.
    #[serde(default)]
    pub components: Components,

    /// Pattern separating a post's excerpt from the rest of its body.
    #[serde(default = "default_truncate_marker")]
    pub truncate_marker: String,

    /// Admonition support.
    #[serde(default)]
    pub admonitions: AdmonitionsConfig,

    /// Feed settings; no feeds are produced when absent.
    #[serde(default)]
    pub feed: Option<FeedOptions>,
}

/// Component names for the four route kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default = "default_blog_list_component")]
    pub blog_list: String,

    #[serde(default = "default_blog_post_component")]
    pub blog_post: String,

    #[serde(default = "default_blog_tags_list_component")]
    pub blog_tags_list: String,

    #[serde(default = "default_blog_tags_posts_component")]
    pub blog_tags_posts: String,
}

/// Admonition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmonitionsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Options forwarded to the markdown pipeline.
    #[serde(default, flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// Feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedOptions {
    /// One of `rss`, `atom` or `all`.
    #[serde(rename = "type", default = "default_feed_type")]
    pub feed_type: String,

    /// Channel title; defaults to the site title.
    #[serde(default)]
    pub title: Option<String>,

    /// Channel description; defaults to "<site title> Blog".
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub copyright: Option<String>,

    #[serde(default)]
    pub language: Option<String>,
}

/// Syndication format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Rss,
    Atom,
}

impl FeedType {
    /// Expand a configured feed type into the formats to produce.
    ///
    /// `all` yields `[Rss, Atom]` in that order.
    pub fn from_config(value: &str) -> Result<Vec<Self>> {
        match value {
            "rss" => Ok(vec![Self::Rss]),
            "atom" => Ok(vec![Self::Atom]),
            "all" => Ok(vec![Self::Rss, Self::Atom]),
            other => Err(CoreError::InvalidFeedType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rss => "rss",
            Self::Atom => "atom",
        }
    }

    /// File name of the feed below the blog route.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Rss => "rss.xml",
            Self::Atom => "atom.xml",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Rss => "application/rss+xml",
            Self::Atom => "application/atom+xml",
        }
    }

    /// Human-readable format name used in titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Rss => "RSS",
            Self::Atom => "Atom",
        }
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options after validation, with defaults applied and paths derived.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub site: SiteConfig,

    /// Absolute content directory.
    pub content_path: PathBuf,

    pub route_base_path: String,

    /// `base_url` joined with `route_base_path`; the first list page.
    pub base_page_url: String,

    /// Root of the tag pages.
    pub tags_path: String,

    pub include: Vec<String>,

    pub posts_per_page: NonZeroUsize,

    pub components: Components,

    pub truncate_marker: Regex,

    /// Forwarded admonition options when admonitions are enabled.
    pub admonitions: Option<serde_json::Map<String, serde_json::Value>>,

    pub feed: Option<ResolvedFeed>,
}

/// Feed settings with types expanded and channel text filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFeed {
    pub types: Vec<FeedType>,
    pub title: String,
    pub description: String,
    pub copyright: Option<String>,
    pub language: Option<String>,
}

// Default value functions
fn default_base_url() -> String {
    "/".to_string()
}

fn default_path() -> String {
    "blog".to_string()
}

fn default_route_base_path() -> String {
    "blog".to_string()
}

fn default_include() -> Vec<String> {
    vec!["*.md".to_string(), "*.mdx".to_string()]
}

fn default_posts_per_page() -> usize {
    10
}

fn default_truncate_marker() -> String {
    r"<!--\s*(truncate)\s*-->".to_string()
}

fn default_blog_list_component() -> String {
    "@theme/BlogListPage".to_string()
}

fn default_blog_post_component() -> String {
    "@theme/BlogPostPage".to_string()
}

fn default_blog_tags_list_component() -> String {
    "@theme/BlogTagsListPage".to_string()
}

fn default_blog_tags_posts_component() -> String {
    "@theme/BlogTagsPostsPage".to_string()
}

fn default_feed_type() -> String {
    "all".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BlogOptions {
    fn default() -> Self {
        Self {
            path: default_path(),
            route_base_path: default_route_base_path(),
            include: default_include(),
            posts_per_page: default_posts_per_page(),
            components: Components::default(),
            truncate_marker: default_truncate_marker(),
            admonitions: AdmonitionsConfig::default(),
            feed: None,
        }
    }
}

impl Default for Components {
    fn default() -> Self {
        Self {
            blog_list: default_blog_list_component(),
            blog_post: default_blog_post_component(),
            blog_tags_list: default_blog_tags_list_component(),
            blog_tags_posts: default_blog_tags_posts_component(),
        }
    }
}

impl Default for AdmonitionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            options: serde_json::Map::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file with `POSTMILL__`-prefixed environment
    /// overrides (e.g. `POSTMILL__BLOG__POSTS_PER_PAGE=5`).
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("POSTMILL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.url.is_empty() {
            return Err(CoreError::config("site.url cannot be empty"));
        }

        if !self.site.base_url.starts_with('/') {
            return Err(CoreError::config(format!(
                "site.base_url must start with '/': {}",
                self.site.base_url
            )));
        }

        if self.blog.posts_per_page == 0 {
            return Err(CoreError::config("blog.posts_per_page must be positive"));
        }

        if self.site.url.ends_with('/') {
            tracing::warn!("site.url should not have a trailing slash");
        }

        Ok(())
    }

    /// Resolve the blog options against the directory holding the site.
    pub fn resolve(&self, site_dir: &Path) -> Result<ResolvedOptions> {
        self.validate()?;

        let blog = &self.blog;

        let posts_per_page = NonZeroUsize::new(blog.posts_per_page)
            .ok_or_else(|| CoreError::config("blog.posts_per_page must be positive"))?;

        let truncate_marker = Regex::new(&blog.truncate_marker).map_err(|e| {
            CoreError::config_with_source(
                format!("invalid blog.truncate_marker: {}", blog.truncate_marker),
                e,
            )
        })?;

        let feed = blog
            .feed
            .as_ref()
            .map(|feed| feed.resolve(&self.site))
            .transpose()?;

        let base_page_url = normalize_url(&[&self.site.base_url, &blog.route_base_path]);
        let tags_path = normalize_url(&[&base_page_url, "tags"]);

        let admonitions = blog
            .admonitions
            .enabled
            .then(|| blog.admonitions.options.clone());

        Ok(ResolvedOptions {
            site: self.site.clone(),
            content_path: site_dir.join(&blog.path),
            route_base_path: blog.route_base_path.clone(),
            base_page_url,
            tags_path,
            include: blog.include.clone(),
            posts_per_page,
            components: blog.components.clone(),
            truncate_marker,
            admonitions,
            feed,
        })
    }
}

impl FeedOptions {
    fn resolve(&self, site: &SiteConfig) -> Result<ResolvedFeed> {
        Ok(ResolvedFeed {
            types: FeedType::from_config(&self.feed_type)?,
            title: self.title.clone().unwrap_or_else(|| site.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| format!("{} Blog", site.title)),
            copyright: self.copyright.clone(),
            language: self.language.clone(),
        })
    }
}

impl ResolvedOptions {
    /// Feed types to produce, empty when feeds are not configured.
    pub fn feed_types(&self) -> &[FeedType] {
        self.feed.as_ref().map(|f| f.types.as_slice()).unwrap_or_default()
    }

    /// Absolute URL for a site path.
    pub fn absolute_url(&self, path: &str) -> String {
        normalize_url(&[&self.site.url, path])
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
title = "Test Site"
url = "https://example.com"
base_url = "/docs/"

[blog]
path = "posts"
route_base_path = "news"
posts_per_page = 5
truncate_marker = "<!-- more -->"

[blog.components]
blog_post = "@theme/Post"

[blog.admonitions]
enabled = true
tag = ":::"

[blog.feed]
type = "rss"
copyright = "Copyright 2024"
"#
        .to_string()
    }

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("postmill.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(content.as_bytes()).expect("write");
        (dir, config_path)
    }

    #[test]
    fn test_load_config() {
        let (_dir, config_path) = write_config(&create_test_config());

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.title, "Test Site");
        assert_eq!(config.site.base_url, "/docs/");
        assert_eq!(config.blog.path, "posts");
        assert_eq!(config.blog.route_base_path, "news");
        assert_eq!(config.blog.posts_per_page, 5);
        assert_eq!(config.blog.components.blog_post, "@theme/Post");
        assert_eq!(config.blog.components.blog_list, "@theme/BlogListPage");
        assert_eq!(config.blog.admonitions.options["tag"], ":::");
        let feed = config.blog.feed.expect("feed options");
        assert_eq!(feed.feed_type, "rss");
        assert_eq!(feed.copyright.as_deref(), Some("Copyright 2024"));
    }

    #[test]
    fn test_config_defaults() {
        let (_dir, config_path) = write_config(
            r#"
[site]
title = "Minimal Site"
url = "https://example.com"
"#,
        );

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.base_url, "/");
        assert_eq!(config.blog.path, "blog");
        assert_eq!(config.blog.route_base_path, "blog");
        assert_eq!(config.blog.include, vec!["*.md", "*.mdx"]);
        assert_eq!(config.blog.posts_per_page, 10);
        assert!(config.blog.admonitions.enabled);
        assert!(config.blog.feed.is_none());
    }

    #[test]
    fn test_resolve_paths() {
        let (dir, config_path) = write_config(&create_test_config());
        let config = Config::load(&config_path).expect("load config");

        let resolved = config.resolve(dir.path()).expect("resolve");

        assert_eq!(resolved.content_path, dir.path().join("posts"));
        assert_eq!(resolved.base_page_url, "/docs/news");
        assert_eq!(resolved.tags_path, "/docs/news/tags");
        assert_eq!(resolved.posts_per_page.get(), 5);
        assert!(resolved.truncate_marker.is_match("a <!-- more --> b"));
        assert_eq!(resolved.feed_types(), &[FeedType::Rss]);
        assert_eq!(
            resolved.absolute_url("/docs/news/hello"),
            "https://example.com/docs/news/hello"
        );
    }

    #[test]
    fn test_resolve_feed_defaults() {
        let (dir, config_path) = write_config(
            r#"
[site]
title = "My Site"
url = "https://example.com"

[blog.feed]
"#,
        );
        let config = Config::load(&config_path).expect("load config");
        let resolved = config.resolve(dir.path()).expect("resolve");

        let feed = resolved.feed.expect("feed");
        assert_eq!(feed.types, vec![FeedType::Rss, FeedType::Atom]);
        assert_eq!(feed.title, "My Site");
        assert_eq!(feed.description, "My Site Blog");
    }

    #[test]
    fn test_resolve_without_feed() {
        let (dir, config_path) = write_config(
            r#"
[site]
title = "My Site"
url = "https://example.com"

[blog.admonitions]
enabled = false
"#,
        );
        let config = Config::load(&config_path).expect("load config");
        let resolved = config.resolve(dir.path()).expect("resolve");

        assert!(resolved.feed.is_none());
        assert!(resolved.feed_types().is_empty());
        assert!(resolved.admonitions.is_none());
    }

    #[test]
    fn test_feed_type_expansion() {
        assert_eq!(
            FeedType::from_config("all").expect("all"),
            vec![FeedType::Rss, FeedType::Atom]
        );
        assert_eq!(FeedType::from_config("rss").expect("rss"), vec![FeedType::Rss]);
        assert_eq!(FeedType::from_config("atom").expect("atom"), vec![FeedType::Atom]);
    }

    #[test]
    fn test_invalid_feed_type() {
        let err = FeedType::from_config("json").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFeedType(ref v) if v == "json"));
        assert!(err.to_string().contains("json"));

        assert!(FeedType::from_config("RSS").is_err());
        assert!(FeedType::from_config("").is_err());
    }

    #[test]
    fn test_resolve_rejects_invalid_feed_type() {
        let (dir, config_path) = write_config(
            r#"
[site]
title = "My Site"
url = "https://example.com"

[blog.feed]
type = "xml"
"#,
        );
        let config = Config::load(&config_path).expect("load config");
        let err = config.resolve(dir.path()).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_resolve_rejects_bad_truncate_marker() {
        let (dir, config_path) = write_config(
            r#"
[site]
title = "My Site"
url = "https://example.com"

[blog]
truncate_marker = "(unclosed"
"#,
        );
        let config = Config::load(&config_path).expect("load config");
        let err = config.resolve(dir.path()).unwrap_err();
        assert!(err.to_string().contains("truncate_marker"));
    }

    #[test]
    fn test_config_validation_posts_per_page() {
        let (_dir, config_path) = write_config(
            r#"
[site]
title = "My Site"
url = "https://example.com"

[blog]
posts_per_page = 0
"#,
        );

        let result = Config::load(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("posts_per_page"));
    }

    #[test]
    fn test_config_validation_empty_title() {
        let (_dir, config_path) = write_config(
            r#"
[site]
title = ""
url = "https://example.com"
"#,
        );

        let result = Config::load(&config_path);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("title cannot be empty")
        );
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/postmill.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
