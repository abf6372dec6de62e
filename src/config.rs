use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::retry::RetryConfig;

/// How the watch loop reacts to network-level upload failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TransportPolicy {
    /// Stop the process and leave restarts to the supervisor.
    #[default]
    Fatal,
    /// Retry with backoff, then stop if the endpoint stays unreachable.
    Retry,
}

/// Validated settings for the watch loop.
#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_url: String,
    pub username: Option<String>,
    pub directory: PathBuf,
    pub release_feed: Option<String>,
    pub interval: Duration,
    pub retry: RetryConfig,
    pub transport_policy: TransportPolicy,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let directory = match cli.directory {
            Some(dir) => PathBuf::from(dir),
            None => {
                tracing::info!("Defaulting to current directory");
                PathBuf::from("./")
            }
        };
        check_directory(&directory)?;

        if cli.webhook.trim().is_empty() {
            bail!("You must specify a --webhook URL");
        }

        Ok(Config {
            webhook_url: cli.webhook,
            username: Some(cli.username).filter(|u| !u.is_empty()),
            directory,
            release_feed: cli.release_feed,
            interval: Duration::from_secs(cli.watch),
            retry: RetryConfig {
                max_retries: cli.max_retries,
                base_delay_secs: cli.retry_delay,
                ..RetryConfig::default()
            },
            transport_policy: cli.transport_errors,
        })
    }
}

/// The watched root must exist and be a directory.
pub fn check_directory(path: &std::path::Path) -> Result<()> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("Cannot access {}", path.display()))?;
    if !meta.is_dir() {
        bail!("{} is not a directory", path.display());
    }
    Ok(())
}
