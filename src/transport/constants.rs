//! Timeouts and retry bounds for the transport.

use std::time::Duration;

/// TCP connect timeout for every request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Overall timeout for listing pages, HEAD requests and the keepalive ping.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed until response headers of a content download arrive.
pub const DOWNLOAD_FIRST_BYTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Overall deadline for a content download, body included.
pub const DOWNLOAD_DEADLINE: Duration = Duration::from_secs(60);

/// Maximum attempts (initial included) for a request failing transiently.
pub const MAX_ATTEMPTS: u32 = 3;
