//! Domain models passed between the poller, the scheduler and the state store.

/// A filesystem path scheduled for polling, together with its error streak.
///
/// A task is owned by exactly one component at a time (a poller worker while
/// measuring, a backoff sleeper while waiting) and moves between them through
/// channels. It is intentionally not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct PathTask {
    path: String,
    consecutive_error_count: u32,
}

impl PathTask {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            consecutive_error_count: 0,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn consecutive_error_count(&self) -> u32 {
        self.consecutive_error_count
    }

    pub fn record_success(&mut self) {
        self.consecutive_error_count = 0;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_error_count = self.consecutive_error_count.saturating_add(1);
    }
}

/// Bytes used under a path, as reported by one successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub path: String,
    pub bytes: u64,
}

impl Measurement {
    pub fn new(path: impl Into<String>, bytes: u64) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}
