//! Incremental file synchronization.
//!
//! The mirror lives at `sync_directory/<course>/<folder>/<file>`. A file is
//! transferred when it is missing locally or when the server's
//! `Last-Modified` is not older than the local modification time.
//! Nothing is ever deleted.

mod decision;
mod engine;
mod error;
mod locks;

pub use decision::{DownloadDecision, parse_last_modified};
pub use engine::{DownloadReason, SyncEngine, SyncOutcome};
pub use error::SyncError;
pub use locks::PathLocks;
