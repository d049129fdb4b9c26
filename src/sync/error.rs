//! Error types for the sync engine.
//!
//! All of these are per-file: the orchestrator logs them and moves on to
//! the next file.

use std::path::PathBuf;

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that abort the synchronization of one file.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The local copy exists but the server gave no usable modification time.
    #[error("no usable Last-Modified header from {url} (got {value})")]
    MissingModifiedHeader {
        /// The checked URL.
        url: String,
        /// Raw header value, or `<absent>`.
        value: String,
    },

    /// The HEAD request for the modification time failed.
    #[error("could not check {url}: {source}")]
    Check {
        /// The checked URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: TransportError,
    },

    /// The content transfer failed.
    #[error("could not download into {path}: {source}")]
    Download {
        /// Destination path.
        path: PathBuf,
        /// The underlying transport error.
        #[source]
        source: TransportError,
    },

    /// A local filesystem operation failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The scraped href cannot be resolved to a URL.
    #[error("cannot resolve file href '{href}'")]
    InvalidHref {
        /// The href as scraped.
        href: String,
    },
}

impl SyncError {
    /// Creates a missing-header error.
    pub fn missing_modified_header(url: impl Into<String>, value: Option<&str>) -> Self {
        Self::MissingModifiedHeader {
            url: url.into(),
            value: value.unwrap_or("<absent>").to_string(),
        }
    }

    /// Creates a check error.
    pub fn check(url: impl Into<String>, source: TransportError) -> Self {
        Self::Check {
            url: url.into(),
            source,
        }
    }

    /// Creates a download error.
    pub fn download(path: impl Into<PathBuf>, source: TransportError) -> Self {
        Self::Download {
            path: path.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid href error.
    pub fn invalid_href(href: impl Into<String>) -> Self {
        Self::InvalidHref { href: href.into() }
    }

    /// The transport error behind this failure, if any.
    #[must_use]
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Self::Check { source, .. } | Self::Download { source, .. } => Some(source),
            Self::MissingModifiedHeader { .. } | Self::Io { .. } | Self::InvalidHref { .. } => {
                None
            }
        }
    }

    /// Whether a partially written file was left at the destination.
    #[must_use]
    pub fn left_partial_file(&self) -> bool {
        matches!(
            self,
            Self::Download {
                source: TransportError::Incomplete { .. },
                ..
            }
        )
    }
}
