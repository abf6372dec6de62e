// Webhook client: a small blocking HTTP client that posts one image per
// request as multipart/form-data and reads back the attachment metadata
// the endpoint returns.

use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client};
use serde::{de, Deserialize, Deserializer};
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::UploadError;
use crate::scanner::ImageKind;

pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Holds a reqwest blocking client, the destination URL and the optional
/// username sent along with every file.
#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
    username: Option<String>,
}

/// One entry of the `attachments` list. Members the endpoint leaves out
/// (width and height for non-images, for instance) default to empty/zero.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Attachment {
    pub url: String,
    pub proxy_url: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub filename: String,
}

/// Body returned by the webhook on success. `id` arrives as a numeric
/// string.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct WebhookResponse {
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, deserialize_with = "numeric_string")]
    pub id: u64,
}

fn numeric_string<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.parse().map_err(de::Error::custom),
        Raw::Number(n) => Ok(n),
    }
}

/// What a successful upload reports.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub url: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub id: u64,
    pub elapsed: Duration,
}

impl UploadReceipt {
    pub fn rate_kib_per_sec(&self) -> f64 {
        transfer_rate(self.size, self.elapsed)
    }
}

/// KiB per second for `bytes` moved in `elapsed`. Zero when no time passed.
pub fn transfer_rate(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 / 1024.0 / secs
}

/// Parse a success body, keeping the raw text around for the error message.
pub fn parse_response(body: &str) -> std::result::Result<WebhookResponse, UploadError> {
    serde_json::from_str(body).map_err(|source| UploadError::Parse {
        source,
        body: body.to_string(),
    })
}

impl WebhookClient {
    /// Build a client for `url`. An empty `username` is treated as absent.
    pub fn new(url: impl Into<String>, username: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(WebhookClient {
            client,
            url: url.into(),
            username: username.filter(|u| !u.is_empty()),
        })
    }

    /// POST `path` as the `file` part, typed by `kind`. The file is streamed
    /// from disk rather than read into memory up front.
    pub fn upload(
        &self,
        path: &Path,
        kind: ImageKind,
    ) -> std::result::Result<UploadReceipt, UploadError> {
        let open_err = |source| UploadError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let length = file.metadata().map_err(open_err)?.len();
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".into());

        let part = multipart::Part::reader_with_length(file, length)
            .file_name(file_name)
            .mime_str(kind.mime())?;
        let mut form = multipart::Form::new().part("file", part);
        if let Some(username) = &self.username {
            form = form.text("username", username.clone());
        }

        let start = Instant::now();
        let res = self.client.post(&self.url).multipart(form).send()?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_else(|_| "".into());
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body = res.text()?;

        let response = parse_response(&body)?;
        let id = response.id;
        let attachment = response
            .attachments
            .into_iter()
            .next()
            .ok_or(UploadError::NoAttachments)?;

        Ok(UploadReceipt {
            url: attachment.url,
            size: attachment.size,
            width: attachment.width,
            height: attachment.height,
            id,
            elapsed: start.elapsed(),
        })
    }
}
