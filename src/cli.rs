//! CLI argument definitions using clap derive macros.
//!
//! Everything else (session cookie, mirror root, course-name purification)
//! comes from the environment; log verbosity from `RUST_LOG`.

use clap::Parser;

/// Mirror the files of your LMS courses into a local directory.
///
/// Without flags, crawls every in-progress course and downloads new or
/// changed files below `SYNC_DIRECTORY`.
#[derive(Parser, Debug)]
#[command(name = "coursesync")]
#[command(author, version, about)]
pub struct Args {
    /// Only ping the LMS once to keep the session alive, then exit
    #[arg(long = "session-keepalive", alias = "sessionKeepalive")]
    pub session_keepalive: bool,
}
