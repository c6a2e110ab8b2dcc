//! postmill CLI
//!
//! Turns an ordered list of blog posts into post, list and tag routes plus
//! RSS/Atom feeds.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use postmill::cmd::build::BuildArgs;

/// Command-line interface for postmill.
#[derive(Parser)]
#[command(name = "postmill", version, about = "Blog indexer and feed generator")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "postmill.toml")]
    config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Emit routes, data blobs and feeds for a list of posts
    Build {
        /// JSON file holding the posts, newest first
        posts: PathBuf,
        /// Output directory for feeds
        #[arg(short, long, default_value = "build")]
        output: PathBuf,
        /// Directory for data blobs and the route manifest
        #[arg(long, default_value = ".postmill")]
        data_dir: PathBuf,
        /// Site directory the blog path is relative to (defaults to the config's directory)
        #[arg(long)]
        site_dir: Option<PathBuf>,
    },
    /// Validate configuration and show the resolved blog options
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    postmill::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            posts,
            output,
            data_dir,
            site_dir,
        } => {
            postmill::cmd::build::run(&BuildArgs {
                config: &cli.config,
                posts: &posts,
                output: &output,
                data_dir: &data_dir,
                site_dir: site_dir.as_deref(),
            })?;
        }
        Commands::Check { strict } => {
            postmill::cmd::check::run(&cli.config, strict)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_build_command_parsing() {
        let args = ["postmill", "build", "posts.json", "--output", "dist"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, PathBuf::from("postmill.toml"));
        assert_eq!(cli.verbose, 0);

        match cli.command {
            Commands::Build {
                posts,
                output,
                data_dir,
                site_dir,
            } => {
                assert_eq!(posts, PathBuf::from("posts.json"));
                assert_eq!(output, PathBuf::from("dist"));
                assert_eq!(data_dir, PathBuf::from(".postmill"));
                assert!(site_dir.is_none());
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_build_requires_posts() {
        assert!(Cli::try_parse_from(["postmill", "build"]).is_err());
    }

    #[test]
    fn test_cli_build_with_dirs() {
        let args = [
            "postmill",
            "build",
            "posts.json",
            "--data-dir",
            "gen",
            "--site-dir",
            "website",
        ];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Build {
                data_dir, site_dir, ..
            } => {
                assert_eq!(data_dir, PathBuf::from("gen"));
                assert_eq!(site_dir, Some(PathBuf::from("website")));
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_check_command_parsing() {
        let cli = Cli::parse_from(["postmill", "check", "--strict"]);

        match cli.command {
            Commands::Check { strict } => assert!(strict),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_verbosity_and_config() {
        let cli = Cli::parse_from(["postmill", "-vv", "--config", "site.toml", "check"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
    }
}
