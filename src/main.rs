// Entrypoint for the watcher.
// - Keeps `main` small: parse flags, configure logging, build the client
//   and hand everything to the watch loop.
// - The loop only returns on a fatal error, which becomes a non-zero exit.

use anyhow::Context;
use autoupload::{api::WebhookClient, cli::Cli, config::Config, update, watch::Watcher};
use clap::Parser;
use std::time::SystemTime;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let started = SystemTime::now();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = Config::from_cli(cli)?;

    if let Some(feed) = &config.release_feed {
        update::check_for_updates(feed, env!("CARGO_PKG_VERSION"));
    }

    let client = WebhookClient::new(config.webhook_url.clone(), config.username.clone())?;
    let mut watcher = Watcher::from_config(&config, client, started).with_progress(true);

    match watcher.run() {
        Ok(never) => match never {},
        Err(e) => Err(e).context("could not watch path"),
    }
}
