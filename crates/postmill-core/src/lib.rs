//! postmill core library
//!
//! Post records, configuration and error handling shared by the postmill
//! generator and CLI.

pub mod config;
pub mod content;
pub mod error;
pub mod url;

pub use config::{Config, FeedType, ResolvedFeed, ResolvedOptions};
pub use content::{NavItem, Post, PostMetadata, TagRef};
pub use error::{CoreError, Result};
