//! Session keepalive ping.
//!
//! One authenticated GET to the dashboard so the LMS does not expire the
//! session between crawl runs. Never touches the filesystem.

use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::failure::{self, FailureDescriptor};
use crate::transport::HttpClient;

/// Pings the LMS once with the session cookie.
///
/// Failures are classified and logged, never returned: a lost session is
/// reported, not repaired. Returns the failure descriptor when the ping did
/// not get a 2xx answer.
#[instrument(skip_all, fields(url = %config.keepalive_url()))]
pub async fn session_keepalive(client: &HttpClient, config: &Config) -> Option<FailureDescriptor> {
    let url = config.keepalive_url();
    match client.get_text(&url).await {
        Ok(body) => {
            debug!(bytes = body.len(), "keepalive response received");
            info!("session keepalive succeeded");
            None
        }
        Err(e) => Some(failure::report("session keepalive", &e)),
    }
}
