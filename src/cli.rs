use clap::{ArgAction, Parser};

use crate::config::TransportPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "autoupload",
    about = "Watch a directory and upload new images to a webhook",
    version,
    disable_version_flag = true
)]
pub struct Cli {
    /// Webhook URL to upload to
    #[arg(short = 'w', long, env = "AUTOUPLOAD_WEBHOOK")]
    pub webhook: String,

    /// Directory to scan (defaults to the current directory)
    #[arg(short = 'd', long)]
    pub directory: Option<String>,

    /// Seconds to wait between scans
    #[arg(short = 's', long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub watch: u64,

    /// Username to send along with each upload
    #[arg(short = 'u', long, default_value = "")]
    pub username: String,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Release feed to check for a newer version at startup
    #[arg(long, env = "AUTOUPLOAD_RELEASE_FEED")]
    pub release_feed: Option<String>,

    /// What to do when an upload fails at the network level
    #[arg(long, value_enum, default_value = "fatal")]
    pub transport_errors: TransportPolicy,

    /// Retries per file when --transport-errors=retry
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Base delay in seconds between retries
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// Show version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}
