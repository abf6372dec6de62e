// The watch loop: scan, upload every candidate in walk order, commit the
// watermark once the pass has completed, sleep, repeat.

use std::convert::Infallible;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::api::{UploadReceipt, WebhookClient};
use crate::config::{Config, TransportPolicy};
use crate::error::{ErrorKind, UploadError, WatchError};
use crate::retry::{retry_with_backoff, RetryAction, RetryConfig};
use crate::scanner::{Candidate, Scanner};
use crate::ui;
use crate::watermark::Watermark;

/// Something that can send one file to the destination.
pub trait Deliver {
    fn deliver(&self, candidate: &Candidate) -> Result<UploadReceipt, UploadError>;
}

impl Deliver for WebhookClient {
    fn deliver(&self, candidate: &Candidate) -> Result<UploadReceipt, UploadError> {
        self.upload(&candidate.path, candidate.kind)
    }
}

/// Counters for one completed pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub candidates: usize,
    pub uploaded: usize,
    pub failed: usize,
    pub bytes: u64,
}

pub struct Watcher<D> {
    scanner: Scanner,
    uploader: D,
    watermark: Watermark,
    interval: Duration,
    policy: TransportPolicy,
    retry: RetryConfig,
    progress: bool,
}

impl<D: Deliver> Watcher<D> {
    /// Files modified at or before `start` are never uploaded.
    pub fn new(scanner: Scanner, uploader: D, start: SystemTime) -> Self {
        Watcher {
            scanner,
            uploader,
            watermark: Watermark::new(start),
            interval: Duration::from_secs(10),
            policy: TransportPolicy::Fatal,
            retry: RetryConfig::default(),
            progress: false,
        }
    }

    pub fn from_config(config: &Config, uploader: D, start: SystemTime) -> Self {
        Watcher::new(Scanner::new(&config.directory), uploader, start)
            .with_interval(config.interval)
            .with_transport_policy(config.transport_policy, config.retry.clone())
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_transport_policy(mut self, policy: TransportPolicy, retry: RetryConfig) -> Self {
        self.policy = policy;
        self.retry = retry;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn watermark(&self) -> SystemTime {
        self.watermark.get()
    }

    /// Scan the tree once, uploading candidates as they are found.
    ///
    /// Per-file upload failures are logged and counted. Any other error
    /// ends the pass and leaves the watermark where it was.
    pub fn run_pass(&mut self) -> Result<PassReport, WatchError> {
        let mut pass = self.scanner.pass(self.watermark.get());
        let mut report = PassReport::default();

        for candidate in pass.by_ref() {
            let candidate = candidate?;
            report.candidates += 1;
            match self.upload(&candidate) {
                Ok(receipt) => {
                    log_receipt(&receipt);
                    report.uploaded += 1;
                    report.bytes += receipt.size;
                }
                Err(e) if e.kind() == ErrorKind::PerFile => {
                    log_rejected(&candidate.path, &e);
                    report.failed += 1;
                }
                Err(source) => {
                    return Err(WatchError::Upload {
                        path: candidate.path,
                        source,
                    })
                }
            }
        }

        if self.watermark.advance(pass.observed()) {
            tracing::debug!("Watermark advanced to {:?}", self.watermark.get());
        }
        Ok(report)
    }

    /// Scan forever. Only returns when a pass fails.
    pub fn run(&mut self) -> Result<Infallible, WatchError> {
        tracing::info!("Waiting for images to appear in {}", self.scanner.root().display());
        loop {
            let report = self.run_pass()?;
            if report.candidates > 0 {
                tracing::info!(
                    uploaded = report.uploaded,
                    failed = report.failed,
                    bytes = report.bytes,
                    "Pass complete"
                );
            }
            std::thread::sleep(self.interval);
        }
    }

    fn upload(&self, candidate: &Candidate) -> Result<UploadReceipt, UploadError> {
        tracing::info!("Uploading {}", candidate.path.display());
        let attempt = || {
            if self.progress {
                ui::with_spinner(&candidate.path, |_| self.uploader.deliver(candidate))
            } else {
                self.uploader.deliver(candidate)
            }
        };
        match self.policy {
            TransportPolicy::Fatal => attempt(),
            TransportPolicy::Retry => retry_with_backoff(
                &self.retry,
                |e: &UploadError| match e.kind() {
                    ErrorKind::Transient => RetryAction::Retry,
                    _ => RetryAction::Abort,
                },
                attempt,
            ),
        }
    }
}

fn log_receipt(receipt: &UploadReceipt) {
    tracing::info!("Uploaded to {} {}x{}", receipt.url, receipt.width, receipt.height);
    tracing::info!(
        "id: {}, {} bytes transferred in {:.2} seconds ({:.2} KiB/s)",
        receipt.id,
        receipt.size,
        receipt.elapsed.as_secs_f64(),
        receipt.rate_kib_per_sec()
    );
}

fn log_rejected(path: &Path, err: &UploadError) {
    tracing::warn!("{}: {}", path.display(), err);
    match err {
        UploadError::Parse { body, .. } => tracing::warn!("Response was: {}", body),
        UploadError::Status { body, .. } if !body.is_empty() => {
            tracing::debug!("Response was: {}", body)
        }
        _ => {}
    }
}
