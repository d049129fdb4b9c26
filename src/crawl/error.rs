//! Error types for the crawl orchestrator.

use thiserror::Error;

use crate::extract::ExtractError;
use crate::transport::TransportError;

/// Errors that abort a crawl run.
///
/// Only the top-level course listing can fail a run; failures further down
/// the tree are logged and counted in [`super::CrawlStats`].
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A listing page could not be fetched.
    #[error("could not fetch listing page {url}: {source}")]
    Listing {
        /// The listing page URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: TransportError,
    },

    /// A listing page could not be scraped.
    #[error("could not scrape listing page {url}: {source}")]
    Extraction {
        /// The listing page URL.
        url: String,
        /// The underlying extractor error.
        #[source]
        source: ExtractError,
    },
}

impl CrawlError {
    /// Creates a listing error.
    pub fn listing(url: impl Into<String>, source: TransportError) -> Self {
        Self::Listing {
            url: url.into(),
            source,
        }
    }

    /// Creates an extraction error.
    pub fn extraction(url: impl Into<String>, source: ExtractError) -> Self {
        Self::Extraction {
            url: url.into(),
            source,
        }
    }
}
