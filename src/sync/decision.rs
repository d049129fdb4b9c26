//! Download-or-skip decision for a single file.
//!
//! Both timestamps are compared as [`SystemTime`], i.e. as instants on the
//! UTC-based system clock. `Last-Modified` is an RFC 7231 HTTP-date, which
//! is always GMT, so no timezone normalization is needed on either side.

use std::time::SystemTime;

/// Outcome of comparing the local mirror entry with the remote file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadDecision {
    /// No local copy; download.
    Missing,
    /// Local copy is not newer than the remote one; download and overwrite.
    RemoteNewer,
    /// Local copy was modified after the remote one; skip.
    LocalUpToDate,
    /// The server sent no usable `Last-Modified`; this file cannot be judged.
    NoModifiedHeader,
}

impl DownloadDecision {
    /// Decides for a file that exists locally.
    ///
    /// The local copy wins only if it is strictly newer than the remote
    /// timestamp; equal timestamps lead to a download.
    #[must_use]
    pub fn for_existing(local_modified: SystemTime, remote_last_modified: Option<&str>) -> Self {
        match remote_last_modified.and_then(parse_last_modified) {
            None => Self::NoModifiedHeader,
            Some(remote) if local_modified > remote => Self::LocalUpToDate,
            Some(_) => Self::RemoteNewer,
        }
    }
}

/// Parses an HTTP-date header value.
#[must_use]
pub fn parse_last_modified(value: &str) -> Option<SystemTime> {
    httpdate::parse_http_date(value.trim()).ok()
}
