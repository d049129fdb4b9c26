//! Error types for the transport module.
//!
//! Every variant carries the URL (or path) it concerns so log lines stay
//! self-explanatory without extra context from the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the remote site.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request did not complete within its timeout.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The server answered with a redirect, which is never followed.
    ///
    /// On this site a redirect means the session cookie was rejected and the
    /// login page is being offered instead.
    #[error("HTTP {status} redirect from {url} (to {location})")]
    Redirect {
        /// The URL that redirected.
        url: String,
        /// The 3xx status code.
        status: u16,
        /// The `Location` header, or `<none>`.
        location: String,
    },

    /// Non-success, non-redirect HTTP status.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing a download.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A download started writing to disk and then failed.
    ///
    /// The destination keeps the bytes written so far.
    #[error("download into {path} interrupted after {bytes_written} bytes: {source}")]
    Incomplete {
        /// The partially written file.
        path: PathBuf,
        /// Bytes written before the failure.
        bytes_written: u64,
        /// What interrupted the stream.
        #[source]
        source: Box<TransportError>,
    },

    /// The URL could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to set up HTTP client: {reason}")]
    Setup {
        /// What went wrong.
        reason: String,
    },
}

impl TransportError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a redirect error.
    pub fn redirect(url: impl Into<String>, status: u16, location: Option<String>) -> Self {
        Self::Redirect {
            url: url.into(),
            status,
            location: location.unwrap_or_else(|| "<none>".to_string()),
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Wraps a failure that happened after the destination was opened.
    pub fn incomplete(path: impl Into<PathBuf>, bytes_written: u64, source: Self) -> Self {
        Self::Incomplete {
            path: path.into(),
            bytes_written,
            source: Box::new(source),
        }
    }

    /// Creates a client setup error.
    pub fn setup(reason: impl Into<String>) -> Self {
        Self::Setup {
            reason: reason.into(),
        }
    }

    /// HTTP status carried by this error, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Redirect { status, .. } | Self::HttpStatus { status, .. } => Some(*status),
            Self::Network { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Incomplete { source, .. } => source.status(),
            Self::Timeout { .. }
            | Self::Io { .. }
            | Self::InvalidUrl { .. }
            | Self::Setup { .. } => None,
        }
    }

    /// URL the failed request targeted, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::Redirect { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::InvalidUrl { url } => Some(url),
            Self::Incomplete { source, .. } => source.url(),
            Self::Io { .. } | Self::Setup { .. } => None,
        }
    }
}
