//! Authenticated HTTP transport.
//!
//! Wraps a reqwest client that:
//!
//! - attaches the session cookie to every request
//! - never follows redirects (a 3xx means the session is gone)
//! - uses a 30s timeout for pages and HEAD requests, and a 30s first-byte /
//!   60s overall deadline for content downloads
//! - retries a request up to 3 times when it fails before the server answers
//!
//! # Example
//!
//! ```no_run
//! use coursesync_core::{Config, transport::HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let client = HttpClient::new(&config)?;
//! let html = client.get_text(&config.course_index_url()).await?;
//! println!("{} bytes of dashboard", html.len());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod retry;

pub use client::HttpClient;
pub use error::TransportError;
pub use retry::{FailureType, RetryDecision, RetryPolicy, classify_error};
