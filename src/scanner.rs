// Directory scanner: one `Pass` is a lazy walk over the watched tree that
// yields the eligible files modified after a given watermark, while keeping
// track of the newest modification time it has seen.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::error::ScanError;

/// Image formats picked up by the watcher, keyed by lowercase extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    /// Classify a path by its extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" => Some(ImageKind::Jpeg),
            "gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
        }
    }
}

/// A file found during a pass that should be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub kind: ImageKind,
}

/// Walks a single root directory. Cheap to keep around; every call to
/// [`Scanner::pass`] starts a fresh traversal.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Scanner { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a pass that yields files modified strictly after `watermark`.
    pub fn pass(&self, watermark: SystemTime) -> Pass {
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Pass {
            root: self.root.clone(),
            walker,
            watermark,
            observed: watermark,
            failed: false,
        }
    }
}

/// One traversal of the tree.
///
/// Every regular file newer than the watermark raises [`Pass::observed`],
/// whether or not its extension is eligible; only eligible files are yielded.
/// The first error ends the iteration.
pub struct Pass {
    root: PathBuf,
    walker: walkdir::IntoIter,
    watermark: SystemTime,
    observed: SystemTime,
    failed: bool,
}

impl Pass {
    /// Newest modification time seen so far, never older than the watermark
    /// the pass started from.
    pub fn observed(&self) -> SystemTime {
        self.observed
    }

    fn walk_error(&mut self, source: walkdir::Error) -> ScanError {
        self.failed = true;
        let path = source
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        ScanError::Walk { path, source }
    }
}

impl Iterator for Pass {
    type Item = Result<Candidate, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(self.walk_error(e))),
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => return Some(Err(self.walk_error(e))),
            };
            let modified = match metadata.modified() {
                Ok(t) => t,
                Err(source) => {
                    self.failed = true;
                    return Some(Err(ScanError::Metadata {
                        path: entry.path().to_path_buf(),
                        source,
                    }));
                }
            };
            if modified <= self.watermark {
                continue;
            }
            self.observed = self.observed.max(modified);

            if let Some(kind) = ImageKind::from_path(entry.path()) {
                return Some(Ok(Candidate {
                    path: entry.into_path(),
                    modified,
                    kind,
                }));
            }
            tracing::debug!("Ignoring {}", entry.path().display());
        }
    }
}
