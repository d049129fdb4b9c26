//! Coursesync Core Library
//!
//! Authenticated, incremental mirroring of course material from a Moodle
//! LMS onto a local directory tree. Discovery is HTML scraping only; the
//! session cookie is the only credential.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Environment-driven run configuration
//! - [`transport`] - Cookie-authenticated HTTP client with timeouts and retry
//! - [`extract`] - Page extractors for courses, folders and files
//! - [`sync`] - Per-file download-or-skip decisions and transfers
//! - [`crawl`] - The course → folder → file traversal
//! - [`failure`] - Classification of failed requests for diagnostics
//! - [`keepalive`] - Single-request session keepalive

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod crawl;
pub mod extract;
pub mod failure;
pub mod keepalive;
pub mod sync;
#[cfg(test)]
pub mod test_support;
pub mod transport;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use crawl::{CrawlError, CrawlStats, Crawler};
pub use extract::{
    CourseId, ExtractError, FileDescriptor, FolderId, extract_courses, extract_files,
    extract_folders, purify_course_name, sanitize_path_component,
};
pub use failure::{FailureClass, FailureDescriptor, classify_status};
pub use keepalive::session_keepalive;
pub use sync::{DownloadDecision, DownloadReason, SyncEngine, SyncError, SyncOutcome};
pub use transport::{HttpClient, RetryPolicy, TransportError};
