//! Conditional download of one discovered file into the mirror.
//!
//! Per file:
//!
//! 1. stat `sync_directory/course/folder/file`
//! 2. missing → download
//! 3. present → HEAD the source, compare `Last-Modified` with the local mtime
//!    - no usable header → fail this file
//!    - local strictly newer → skip
//!    - otherwise → download, overwriting in place

use std::path::{Path, PathBuf};

use reqwest::header::LAST_MODIFIED;
use tracing::{debug, info, instrument};

use super::decision::DownloadDecision;
use super::error::SyncError;
use super::locks::PathLocks;
use crate::config::Config;
use crate::extract::FileDescriptor;
use crate::transport::HttpClient;

/// Why a file was transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadReason {
    /// There was no local copy.
    Missing,
    /// The remote copy was not older than the local one.
    RemoteNewer,
}

/// Terminal state of a successfully handled file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Content was written to disk.
    Downloaded(DownloadReason),
    /// The local copy is up to date.
    Skipped,
}

/// Mirrors single files; shared by all folder crawls of a run.
#[derive(Debug)]
pub struct SyncEngine {
    client: HttpClient,
    config: Config,
    locks: PathLocks,
}

impl SyncEngine {
    /// Creates an engine writing below `config.sync_directory`.
    #[must_use]
    pub fn new(client: HttpClient, config: Config) -> Self {
        Self {
            client,
            config,
            locks: PathLocks::new(),
        }
    }

    /// Local path a descriptor is mirrored to.
    #[must_use]
    pub fn destination(&self, file: &FileDescriptor) -> PathBuf {
        self.config
            .sync_directory
            .join(&file.course)
            .join(&file.folder)
            .join(&file.file)
    }

    /// Brings the local copy of `file` up to date.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] for this file only; nothing is retried here
    /// beyond what the transport already does.
    #[instrument(skip(self, file), fields(course = %file.course, folder = %file.folder, file = %file.file))]
    pub async fn sync_file(&self, file: &FileDescriptor) -> Result<SyncOutcome, SyncError> {
        let url = self
            .config
            .resolve_href(&file.source_url)
            .ok_or_else(|| SyncError::invalid_href(&file.source_url))?;
        let url = url.as_str();
        let destination = self.destination(file);

        let _guard = self.locks.lock(&destination).await;

        let (decision, last_modified) = match tokio::fs::metadata(&destination).await {
            Ok(metadata) => {
                let local_modified = metadata
                    .modified()
                    .map_err(|e| SyncError::io(&destination, e))?;
                let response = self
                    .client
                    .head(url)
                    .await
                    .map_err(|e| SyncError::check(url, e))?;
                let header = response
                    .headers()
                    .get(LAST_MODIFIED)
                    .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
                (
                    DownloadDecision::for_existing(local_modified, header.as_deref()),
                    header,
                )
            }
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    debug!(%error, path = %destination.display(), "stat failed; treating as missing");
                }
                (DownloadDecision::Missing, None)
            }
        };

        let reason = match decision {
            DownloadDecision::Missing => DownloadReason::Missing,
            DownloadDecision::RemoteNewer => DownloadReason::RemoteNewer,
            DownloadDecision::LocalUpToDate => {
                debug!(path = %destination.display(), "local copy is up to date");
                return Ok(SyncOutcome::Skipped);
            }
            DownloadDecision::NoModifiedHeader => {
                return Err(SyncError::missing_modified_header(
                    url,
                    last_modified.as_deref(),
                ));
            }
        };

        self.download(url, &destination).await?;

        match reason {
            DownloadReason::Missing => info!(
                path = %destination.display(),
                "file was downloaded because it is missing locally"
            ),
            DownloadReason::RemoteNewer => info!(
                path = %destination.display(),
                "file was downloaded again because there is a newer version online"
            ),
        }
        Ok(SyncOutcome::Downloaded(reason))
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<u64, SyncError> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::io(parent, e))?;
        }
        self.client
            .download_to_path(url, destination)
            .await
            .map_err(|e| SyncError::download(destination, e))
    }
}
