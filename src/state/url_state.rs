/// URL state definitions for tracking crawl progress
///
/// A URL moves `Unseen -> Pending -> {Succeeded | Failed}` exactly once;
/// retries keep it `Pending`.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Never admitted to the frontier
    Unseen,

    /// Admitted; queued, being fetched, or waiting for a retry
    Pending,

    /// Returned a success response
    Succeeded,

    /// Exhausted its retries
    Failed,
}

impl UrlState {
    /// Returns true if no further processing will happen for the URL
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
