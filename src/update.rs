// Startup check against a release feed (GitHub "latest release" JSON).
// Failures are only logged: the watcher works fine without knowing about
// newer versions.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::cmp::Ordering;
use std::time::Duration;

use crate::api::USER_AGENT;

pub const UPDATE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Release {
    pub html_url: String,
    pub tag_name: String,
    pub name: String,
    pub body: String,
}

/// Compare dotted version strings numerically, ignoring a leading `v`.
/// Missing components count as zero, non-numeric ones compare as text.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parts = |v: &str| -> Vec<String> {
        v.trim()
            .trim_start_matches(['v', 'V'])
            .split('.')
            .map(str::to_string)
            .collect()
    };
    let (a, b) = (parts(a), parts(b));
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).map(String::as_str).unwrap_or("0");
        let y = b.get(i).map(String::as_str).unwrap_or("0");
        let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

pub fn fetch_latest(feed_url: &str) -> Result<Release> {
    let client = Client::builder()
        .timeout(UPDATE_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;
    let res = client
        .get(feed_url)
        .send()
        .context("could not check for updates")?;
    if !res.status().is_success() {
        anyhow::bail!("release feed answered {}", res.status());
    }
    let release: Release = res.json().context("could not parse release feed")?;
    Ok(release)
}

/// Print a notice when the feed advertises a newer version than `current`.
/// Returns the newer release, if any.
pub fn check_for_updates(feed_url: &str, current: &str) -> Option<Release> {
    let latest = match fetch_latest(feed_url) {
        Ok(release) => release,
        Err(e) => {
            tracing::warn!("Update check failed: {:#}", e);
            return None;
        }
    };
    if compare_versions(current, &latest.tag_name) != Ordering::Less {
        tracing::debug!("Up to date (latest release is {})", latest.tag_name);
        return None;
    }

    println!(
        "You are currently on version {}, but version {} is available",
        current, latest.tag_name
    );
    if !latest.html_url.is_empty() {
        println!("{}", latest.html_url);
    }
    println!("----------- Release Info -----------");
    println!("{}", latest.body);
    println!("------------------------------------");
    Some(latest)
}
