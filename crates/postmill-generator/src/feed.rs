//! RSS 2.0 and Atom 1.0 feed generation.
//!
//! [`FeedGenerator::render`] is a pure function of the ordered posts and the
//! format; [`FeedGenerator::write_all`] writes one file per configured format
//! and stops at the first failure.

use std::{
    fs,
    path::{Path, PathBuf},
};

use atom_syndication::{
    CategoryBuilder, EntryBuilder, FeedBuilder, FixedDateTime, GeneratorBuilder, LinkBuilder, Text,
};
use postmill_core::{FeedType, Post, ResolvedFeed, ResolvedOptions};
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder, validation::Validate};
use thiserror::Error;
use tracing::{debug, info};

const GENERATOR: &str = "postmill";

/// Feed generation errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The produced RSS channel failed validation.
    #[error("RSS validation failed: {0}")]
    Invalid(String),

    /// Writing a feed file failed.
    #[error("generating {feed_type} feed failed: {source}")]
    Write {
        feed_type: FeedType,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

/// Feed generator for a blog with feeds configured.
#[derive(Debug)]
pub struct FeedGenerator<'a> {
    options: &'a ResolvedOptions,
    feed: &'a ResolvedFeed,
}

impl<'a> FeedGenerator<'a> {
    /// Create a generator, or `None` when the blog has no feed settings.
    #[must_use]
    pub fn new(options: &'a ResolvedOptions) -> Option<Self> {
        options.feed.as_ref().map(|feed| Self { options, feed })
    }

    /// Serialize `posts` (newest first) in the given format.
    pub fn render(&self, posts: &[Post], feed_type: FeedType) -> Result<Vec<u8>> {
        debug!(count = posts.len(), %feed_type, "rendering feed");

        let xml = match feed_type {
            FeedType::Rss => self.rss(posts)?,
            FeedType::Atom => self.atom(posts),
        };

        Ok(xml.into_bytes())
    }

    /// Path of the `feed_type` file below `out_dir`.
    pub fn output_path(&self, out_dir: &Path, feed_type: FeedType) -> PathBuf {
        out_dir
            .join(self.options.route_base_path.trim_matches('/'))
            .join(feed_type.file_name())
    }

    /// Render and write every configured feed type, in order.
    ///
    /// The first failing write is reported with its feed type and the
    /// remaining types are not written.
    pub fn write_all(&self, posts: &[Post], out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.feed.types.len());

        for &feed_type in &self.feed.types {
            let bytes = self.render(posts, feed_type)?;
            let path = self.output_path(out_dir, feed_type);

            let write = || -> std::io::Result<()> {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, &bytes)
            };
            write().map_err(|source| FeedError::Write { feed_type, source })?;

            info!(path = %path.display(), %feed_type, "generated feed");
            written.push(path);
        }

        Ok(written)
    }

    fn blog_url(&self) -> String {
        self.options.absolute_url(&self.options.base_page_url)
    }

    fn rss(&self, posts: &[Post]) -> Result<String> {
        let items: Vec<Item> = posts.iter().map(|post| self.rss_item(post)).collect();

        let channel = ChannelBuilder::default()
            .title(&self.feed.title)
            .link(self.blog_url())
            .description(&self.feed.description)
            .copyright(self.feed.copyright.clone())
            .language(self.feed.language.clone())
            .last_build_date(posts.first().map(|p| p.metadata.date.to_rfc2822()))
            .generator(Some(GENERATOR.to_string()))
            .items(items)
            .build();

        channel
            .validate()
            .map_err(|e| FeedError::Invalid(e.to_string()))?;
        Ok(channel.to_string())
    }

    fn rss_item(&self, post: &Post) -> Item {
        let url = self.options.absolute_url(&post.metadata.permalink);
        let guid = GuidBuilder::default().value(&url).permalink(true).build();

        let mut builder = ItemBuilder::default();
        builder.title(Some(post.metadata.title.clone()));
        builder.link(Some(url));
        builder.guid(Some(guid));
        builder.pub_date(Some(post.metadata.date.to_rfc2822()));
        builder.description(post.metadata.description.clone());

        let categories: Vec<_> = post
            .metadata
            .tags
            .iter()
            .map(|tag| rss::Category {
                name: tag.label().to_string(),
                domain: None,
            })
            .collect();
        if !categories.is_empty() {
            builder.categories(categories);
        }

        builder.build()
    }

    fn atom(&self, posts: &[Post]) -> String {
        let blog_url = self.blog_url();

        let updated: FixedDateTime = posts
            .iter()
            .map(|p| p.metadata.date)
            .max()
            .map(|date| date.fixed_offset())
            .unwrap_or_default();

        let self_link = LinkBuilder::default()
            .href(format!(
                "{}/{}",
                blog_url.trim_end_matches('/'),
                FeedType::Atom.file_name()
            ))
            .rel("self".to_string())
            .mime_type(Some(FeedType::Atom.mime_type().to_string()))
            .build();
        let alternate_link = LinkBuilder::default()
            .href(blog_url.clone())
            .rel("alternate".to_string())
            .build();

        let entries: Vec<_> = posts
            .iter()
            .map(|post| {
                let link = self.options.absolute_url(&post.metadata.permalink);
                let date = post.metadata.date.fixed_offset();
                let categories: Vec<_> = post
                    .metadata
                    .tags
                    .iter()
                    .map(|tag| {
                        CategoryBuilder::default()
                            .term(tag.label().to_string())
                            .label(Some(tag.label().to_string()))
                            .build()
                    })
                    .collect();

                EntryBuilder::default()
                    .title(Text::plain(post.metadata.title.clone()))
                    .id(&link)
                    .updated(date)
                    .published(Some(date))
                    .links(vec![
                        LinkBuilder::default()
                            .href(link)
                            .rel("alternate".to_string())
                            .build(),
                    ])
                    .summary(post.metadata.description.clone().map(Text::plain))
                    .categories(categories)
                    .build()
            })
            .collect();

        FeedBuilder::default()
            .title(Text::plain(self.feed.title.clone()))
            .id(blog_url)
            .updated(updated)
            .links(vec![self_link, alternate_link])
            .subtitle(Some(Text::plain(self.feed.description.clone())))
            .rights(self.feed.copyright.clone().map(Text::plain))
            .lang(self.feed.language.clone())
            .generator(Some(GeneratorBuilder::default().value(GENERATOR).build()))
            .entries(entries)
            .build()
            .to_string()
    }
}
