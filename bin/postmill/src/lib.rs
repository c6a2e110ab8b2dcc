//! postmill CLI library
//!
//! Command implementations for the postmill binary, exposed as a library so
//! they can be driven from integration tests.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, check)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use postmill::cmd::build::{self, BuildArgs};
//!
//! build::run(&BuildArgs {
//!     config: Path::new("postmill.toml"),
//!     posts: Path::new("posts.json"),
//!     output: Path::new("build"),
//!     data_dir: Path::new(".postmill"),
//!     site_dir: None,
//! })
//! .unwrap();
//! ```

pub mod cmd;

pub use postmill_core::{Config, Post};
pub use postmill_generator::{BuildStats, Builder};

/// Initialize tracing with the specified verbosity level.
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
