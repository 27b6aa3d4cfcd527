//! Error types for lead-scrape.
//!
//! Per-element and per-record failures are contained where they occur and
//! never surface here; only a malformed top-level request or an exhausted
//! relay retry budget is reported as an error.

/// Error type for scrape operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The invocation request was malformed or inconsistent.
    #[error("invalid scrape request: {0}")]
    InvalidRequest(String),

    /// The relay channel could not be (re)established.
    #[error("relay connection failed: {0}")]
    ConnectionFailed(String),
}

/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, Error>;
