//! Error types for the page extractors.

use thiserror::Error;

/// Errors raised while scraping a listing page.
///
/// Missing anchors or headings are not errors; they yield empty results
/// or empty names. Only a page that cannot be queried at all ends up here.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A CSS selector could not be compiled.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The selector source text.
        selector: &'static str,
        /// Parser message.
        reason: String,
    },
}

impl ExtractError {
    /// Creates an invalid selector error.
    pub fn invalid_selector(selector: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector,
            reason: reason.into(),
        }
    }
}
