//! postmill generator library
//!
//! Turns an ordered list of posts into linked post pages, paginated
//! listings, tag pages and syndication feeds.
//!
//! # Modules
//!
//! - [`sequence`] - Previous/next links between posts
//! - [`paginate`] - List page partitioning
//! - [`tags`] - Tag normalization and the tag index
//! - [`feed`] - RSS and Atom feed generation
//! - [`router`] - Router capability and route descriptors
//! - [`emit`] - Route and data-blob emission
//! - [`head`] - Feed discovery head tags
//! - [`build`] - Build orchestration

pub mod build;
pub mod emit;
pub mod feed;
pub mod head;
pub mod paginate;
pub mod router;
pub mod sequence;
pub mod tags;

pub use build::{BlogContent, BuildError, BuildStats, Builder, LoadedContent};
pub use emit::{EmitStats, UnitEmitter};
pub use feed::FeedGenerator;
pub use head::HeadTag;
pub use paginate::ListPage;
pub use router::{FsRouter, MemoryRouter, Module, RouteConfig, Router};
pub use tags::{TagEntry, TagIndex};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};
    use postmill_core::{
        Config, Post, PostMetadata, TagRef,
        config::{BlogOptions, FeedOptions, SiteConfig},
    };

    /// A post whose id doubles as its file and URL name.
    pub fn post(id: &str, tags: &[&str]) -> Post {
        let offset = id.parse::<i64>().unwrap_or(0);
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() - Duration::days(offset);

        Post {
            id: id.to_string(),
            metadata: PostMetadata {
                title: format!("Post {id}"),
                date,
                source: format!("@site/blog/{id}.md"),
                permalink: format!("/blog/{id}"),
                description: Some(format!("About {id}")),
                tags: tags.iter().map(|t| TagRef::Raw(t.to_string())).collect(),
                prev_item: None,
                next_item: None,
                extra: Default::default(),
            },
            body: format!("Intro of {id}\n<!-- truncate -->\nRest of {id}"),
        }
    }

    pub fn config() -> Config {
        Config {
            site: SiteConfig {
                title: "Test Site".to_string(),
                url: "https://example.com".to_string(),
                base_url: "/".to_string(),
                description: None,
            },
            blog: BlogOptions::default(),
        }
    }

    pub fn config_with_feed(feed_type: &str) -> Config {
        let mut config = config();
        config.blog.feed = Some(FeedOptions {
            feed_type: feed_type.to_string(),
            title: None,
            description: None,
            copyright: None,
            language: None,
        });
        config
    }
}
