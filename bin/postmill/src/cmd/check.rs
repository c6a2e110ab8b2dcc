//! Check command - validate configuration and show resolved blog options

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use postmill_core::{Config, ResolvedOptions};
use postmill_generator::Builder;

use super::build::site_dir_of;

/// Run the check command.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration");

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ Configuration invalid: {e}");
            bail!("Validation failed: {e}");
        }
    };

    let builder = match Builder::new(&config, site_dir_of(config_path)) {
        Ok(b) => b,
        Err(e) => {
            println!("  ✗ Blog options invalid: {e}");
            bail!("Validation failed: {e}");
        }
    };
    println!("  ✓ Configuration valid");

    let options = builder.options();
    print_options(options);

    println!();
    println!("Watched paths:");
    for pattern in builder.paths_to_watch() {
        println!("  {pattern}");
    }

    let client_modules = builder.client_modules();
    if !client_modules.is_empty() {
        println!();
        println!("Client modules:");
        for module in &client_modules {
            println!("  {module}");
        }
    }

    let warnings = warnings(options);
    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warn in &warnings {
            println!("  ⚠ {warn}");
        }
    }

    if strict && !warnings.is_empty() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

fn print_options(options: &ResolvedOptions) {
    println!();
    println!("Blog:");
    println!("  Content:        {}", options.content_path.display());
    println!("  Route:          {}", options.base_page_url);
    println!("  Tags:           {}", options.tags_path);
    println!("  Posts per page: {}", options.posts_per_page);

    let feeds: Vec<_> = options.feed_types().iter().map(|t| t.as_str()).collect();
    if feeds.is_empty() {
        println!("  Feeds:          none");
    } else {
        println!("  Feeds:          {}", feeds.join(", "));
    }
}

/// Non-fatal problems with the resolved options.
fn warnings(options: &ResolvedOptions) -> Vec<String> {
    let mut warnings = Vec::new();

    if !options.content_path.exists() {
        warnings.push(format!(
            "Blog directory does not exist: {}",
            options.content_path.display()
        ));
    }

    if options.include.is_empty() {
        warnings.push("blog.include is empty, no posts will be watched".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("postmill.toml");
        fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn test_valid_config_passes() {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir(dir.path().join("blog")).expect("blog dir");
        let config = write_config(
            dir.path(),
            r#"
[site]
title = "Check"
url = "https://check.example"
"#,
        );

        assert!(run(&config, true).is_ok());
    }

    #[test]
    fn test_invalid_feed_type_fails() {
        let dir = TempDir::new().expect("temp dir");
        let config = write_config(
            dir.path(),
            r#"
[site]
title = "Check"
url = "https://check.example"

[blog.feed]
type = "json"
"#,
        );

        let err = run(&config, false).unwrap_err();
        assert!(err.to_string().contains("json"));
    }

    #[test]
    fn test_strict_fails_on_missing_blog_dir() {
        let dir = TempDir::new().expect("temp dir");
        let config = write_config(
            dir.path(),
            r#"
[site]
title = "Check"
url = "https://check.example"
"#,
        );

        assert!(run(&config, false).is_ok());
        assert!(run(&config, true).is_err());
    }

    #[test]
    fn test_missing_config_fails() {
        let dir = TempDir::new().expect("temp dir");
        assert!(run(&dir.path().join("absent.toml"), false).is_err());
    }
}
