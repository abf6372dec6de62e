use std::time::SystemTime;

/// The committed cutoff: files modified at or before it count as handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    committed: SystemTime,
}

impl Watermark {
    pub fn new(start: SystemTime) -> Self {
        Watermark { committed: start }
    }

    pub fn get(&self) -> SystemTime {
        self.committed
    }

    /// Commit the newest mtime seen by a completed pass. Older values are
    /// ignored. Returns whether the watermark moved.
    pub fn advance(&mut self, observed: SystemTime) -> bool {
        if observed > self.committed {
            self.committed = observed;
            true
        } else {
            false
        }
    }
}
