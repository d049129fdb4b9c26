//! Failure classification and log-worthy descriptors for transport errors.
//!
//! Classification is purely diagnostic. Nothing here re-authenticates,
//! retries or alerts; it decides what a failure most likely means and
//! logs it once.

use tracing::warn;

use crate::transport::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailureClass {
    /// A 3xx or 4xx answer: the session is gone or the request was refused.
    SessionExpired,
    /// Anything else, including failures without a status.
    Unknown,
}

impl FailureClass {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SessionExpired => "session-expired",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureDescriptor {
    pub class: FailureClass,
    pub what: &'static str,
    pub why: &'static str,
}

/// Classifies an HTTP status; `None` means no response was received.
#[must_use]
pub fn classify_status(status: Option<u16>) -> FailureClass {
    match status {
        Some(300..=499) => FailureClass::SessionExpired,
        _ => FailureClass::Unknown,
    }
}

/// Classifies a transport error into a descriptor.
#[must_use]
pub fn classify(error: &TransportError) -> FailureDescriptor {
    let class = classify_status(error.status());
    match (class, error.status()) {
        (FailureClass::SessionExpired, Some(300..=399)) => FailureDescriptor {
            class,
            what: "Session expired",
            why: "The LMS answered with a redirect, usually to its login page; the session cookie is no longer accepted.",
        },
        (FailureClass::SessionExpired, _) => FailureDescriptor {
            class,
            what: "Request refused",
            why: "The LMS rejected the request with a client error; the session may have expired or the resource is not accessible.",
        },
        (FailureClass::Unknown, Some(_)) => FailureDescriptor {
            class,
            what: "Server error",
            why: "The LMS answered with an unexpected status.",
        },
        (FailureClass::Unknown, None) => match error {
            TransportError::Timeout { .. } => FailureDescriptor {
                class,
                what: "Request timed out",
                why: "The LMS did not respond within the request timeout window.",
            },
            TransportError::Network { .. } => FailureDescriptor {
                class,
                what: "Network request failed",
                why: "Connectivity, DNS or TLS conditions interrupted the request.",
            },
            _ => FailureDescriptor {
                class,
                what: "Unhandled failure",
                why: "The error did not match a known category and needs closer inspection.",
            },
        },
    }
}

/// Classifies `error` and logs one warning for it.
///
/// `context` names what was being fetched (for example `"course list"`).
pub fn report(context: &str, error: &TransportError) -> FailureDescriptor {
    let descriptor = classify(error);
    warn!(
        class = descriptor.class.label(),
        url = error.url().unwrap_or("-"),
        status = error.status(),
        error = %error,
        "{context}: {}. {}",
        descriptor.what,
        descriptor.why
    );
    descriptor
}
