//! Crawl orchestration.
//!
//! [`Crawler::run`] walks course list → course pages → folder pages and
//! hands every discovered file to the [`crate::sync::SyncEngine`]. Failures
//! stay inside their branch: a broken file does not stop its folder, a
//! broken folder or course does not stop its siblings. Only a failure to
//! load the course list ends the run with an error.

mod error;
mod orchestrator;
mod stats;

pub use error::CrawlError;
pub use orchestrator::Crawler;
pub use stats::CrawlStats;
