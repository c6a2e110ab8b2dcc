//! Build command - emits blog routes, data blobs and feeds

use std::{fs, path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use postmill_core::{Config, Post};
use postmill_generator::{Builder, FsRouter};

/// Inputs of one build run.
#[derive(Debug, Clone, Copy)]
pub struct BuildArgs<'a> {
    pub config: &'a Path,
    pub posts: &'a Path,
    pub output: &'a Path,
    pub data_dir: &'a Path,
    pub site_dir: Option<&'a Path>,
}

/// Run the build command.
pub fn run(args: &BuildArgs<'_>) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?args, "Starting build");

    let config = Config::load_with_env(args.config).wrap_err("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let site_dir = args.site_dir.unwrap_or_else(|| site_dir_of(args.config));
    let builder = Builder::new(&config, site_dir).wrap_err("Invalid blog options")?;

    let posts = read_posts(args.posts)?;
    let router = FsRouter::new(args.data_dir);

    let Some(stats) = builder
        .build(posts, &router, args.output)
        .wrap_err("Build failed")?
    else {
        println!("  No blog posts found, nothing to do.");
        return Ok(());
    };

    let manifest = args.data_dir.join("routes.json");
    router
        .write_manifest(&manifest)
        .wrap_err("Failed to write route manifest")?;

    let head_tags = args.data_dir.join("head-tags.json");
    let json = serde_json::to_string_pretty(&builder.head_tags())?;
    fs::write(&head_tags, json)
        .wrap_err_with(|| format!("Failed to write {}", head_tags.display()))?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Posts:      {}", stats.posts);
    println!("  List pages: {}", stats.pages);
    println!("  Tags:       {}", stats.tags);
    println!("  Data blobs: {}", stats.data_blobs);
    for feed in &stats.feeds {
        println!("  Feed:       {}", feed.display());
    }
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Routes:     {}", manifest.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}

/// Directory holding the configuration file, or the working directory.
pub(crate) fn site_dir_of(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Read posts serialized as a JSON array, in listing order.
pub fn read_posts(path: &Path) -> Result<Vec<Post>> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read posts from {}", path.display()))?;
    let posts: Vec<Post> = serde_json::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse posts in {}", path.display()))?;

    tracing::debug!(count = posts.len(), path = %path.display(), "Read posts");
    Ok(posts)
}
