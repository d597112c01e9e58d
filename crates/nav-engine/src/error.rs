use std::fmt;

/// Why a page fetch failed.
///
/// Cloneable because a single failure is observed by every caller joined on
/// the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    Status { status: u16 },
    /// The request never produced a response (connect, timeout, DNS, ...).
    Transport { message: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status { status } => write!(f, "HTTP {status}"),
            FetchError::Transport { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport {
            message: message.into(),
        }
    }
}
