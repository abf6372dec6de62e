// Error types shared by the scanner, the webhook client and the watch loop.
// `kind()` is what the watch loop consults to decide whether a failed upload
// ends the process, gets retried, or is just logged and skipped.

use std::path::PathBuf;
use thiserror::Error;

/// A failure while walking the watched tree. Always aborts the pass.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("could not walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("could not stat {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// How an upload failure should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network-level trouble; the request may succeed if sent again.
    Transient,
    /// Local problem that another attempt will not fix.
    Structural,
    /// The endpoint answered but did not accept this file.
    PerFile,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error performing request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("bad response from server: {status}")]
    Status { status: u16, body: String },

    #[error("could not parse JSON: {source}")]
    Parse {
        source: serde_json::Error,
        body: String,
    },

    #[error("bad response - no attachments")]
    NoAttachments,
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::Transport(_) => ErrorKind::Transient,
            UploadError::Open { .. } => ErrorKind::Structural,
            UploadError::Status { .. } | UploadError::Parse { .. } | UploadError::NoAttachments => {
                ErrorKind::PerFile
            }
        }
    }
}

/// Anything that ends a pass early. The watermark is left untouched.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("upload of {path} failed: {source}")]
    Upload {
        path: PathBuf,
        source: UploadError,
    },
}
