//! Error types module.
//!
//! This module defines the error types used throughout the dnsperf application.
//! It uses `thiserror` for structured error handling and provides
//! a custom `Result` type alias for convenience.

use thiserror::Error;

/// A specialized `Result` type for dnsperf operations.
///
/// This type is used throughout the crate to handle errors consistently.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for dnsperf application.
///
/// Each variant represents a different category of error that can occur
/// while loading inputs, resolving queries, or emitting results.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations, network sockets, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (result batches, JSON output)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// DNS resolver error (DNS query failures)
    #[error("DNS resolver error: {0}")]
    Resolver(#[from] trust_dns_resolver::error::ResolveError),

    /// Configuration error (missing input files, bad identity state)
    #[error("Config error: {0}")]
    Config(String),

    /// Parse error (invalid input format, malformed data)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Remote source fetch error (URL input could not be retrieved)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Result upload error (HTTP POST of the report failed)
    #[error("Upload error: {0}")]
    Upload(String),
}

impl Error {
    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new parse error with a message.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new fetch error with a message.
    #[must_use]
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new upload error with a message.
    #[must_use]
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Whether this error should terminate the process with exit code 1.
    ///
    /// Missing local input files and identity-file misuse are configuration
    /// errors; everything else is reported but exits cleanly.
    #[must_use]
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
