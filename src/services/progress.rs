use tracing::{debug, trace, warn};

/// Byte counter for a single write or copy.
///
/// `transferred` never exceeds `total`: if the stream turns out longer than
/// announced, the total is raised to match.
#[derive(Debug, Clone)]
pub struct Progress {
    label: String,
    total: u64,
    transferred: u64,
}

impl Progress {
    pub fn new(label: impl Into<String>, total: u64) -> Self {
        Self {
            label: label.into(),
            total,
            transferred: 0,
        }
    }

    pub fn advance(&mut self, bytes: usize) {
        self.transferred = self.transferred.saturating_add(bytes as u64);
        if self.transferred > self.total {
            self.total = self.transferred;
        }
        trace!(
            "{}: {}/{} bytes ({}%)",
            self.label,
            self.transferred,
            self.total,
            self.percent()
        );
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.transferred * 100) / self.total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.transferred == self.total
    }

    /// Logs the final tally and returns the byte count.
    pub fn finish(self) -> u64 {
        if self.is_complete() {
            debug!("{}: done, {} bytes", self.label, self.transferred());
        } else {
            warn!(
                "{}: stopped short at {}/{} bytes",
                self.label,
                self.transferred(),
                self.total()
            );
        }
        self.transferred
    }
}
