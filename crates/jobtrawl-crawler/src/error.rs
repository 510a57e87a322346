//! Error types for the crawl controller.

use jobtrawl_browser::BrowserError;
use thiserror::Error;

/// Result type alias using `CrawlError`
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Failures while driving a crawl.
///
/// Only [`CrawlError::is_fatal`] errors end the run early; everything else is
/// local to the keyword being searched.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The browser session could not be started
    #[error("browser session unavailable: {0}")]
    SessionUnavailable(#[source] BrowserError),

    /// Navigation kept failing after every retry
    #[error("could not reach {url} after {attempts} attempts: {source}")]
    NavigationExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: BrowserError,
    },

    /// No search input candidate appeared on the page
    #[error("search box not found while searching '{keyword}'")]
    SearchBoxMissing { keyword: String },

    /// A keyword could not be searched
    #[error("keyword '{keyword}' failed: {reason}")]
    KeywordFailed { keyword: String, reason: String },

    /// Site address in the configuration is not a URL
    #[error("invalid site address: {0}")]
    InvalidSite(#[from] url::ParseError),

    /// Cancellation was requested
    #[error("crawl cancelled")]
    Cancelled,

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl CrawlError {
    /// Whether the error ends the whole run rather than one keyword.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SessionUnavailable(_) | Self::NavigationExhausted { .. } | Self::InvalidSite(_)
        )
    }
}
