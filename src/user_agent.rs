//! User-Agent string sent with every request.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/coursesync";

/// Default User-Agent for listing, metadata and download requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("coursesync/{version} (course-mirror; +{PROJECT_UA_URL})")
}
