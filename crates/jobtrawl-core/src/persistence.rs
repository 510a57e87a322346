//! Persistence seam.
//!
//! The crawl controller hands its buffer to a [`Persistence`] implementation
//! exactly once, when the session finalizes. Output formats are opaque to the
//! controller; they travel in [`OutputSettings`].

use crate::config::OutputSettings;
use crate::error::PersistError;
use crate::stats::SessionStats;
use crate::types::JobRecord;
use async_trait::async_trait;

/// What a persistence call wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistSummary {
    /// Records written
    pub records: usize,
    /// Paths of the files written
    pub files: Vec<String>,
}

/// Writer for crawl output.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Write the session's records. May receive an empty slice.
    async fn persist(
        &self,
        records: &[JobRecord],
        stats: &SessionStats,
        output: &OutputSettings,
    ) -> Result<PersistSummary, PersistError>;

    /// Keep the raw HTML of a result page, if the output settings ask for it.
    async fn save_page_snapshot(&self, _label: &str, _html: &str) -> Result<(), PersistError> {
        Ok(())
    }

    /// Write a diagnostic artifact for offline inspection.
    async fn save_diagnostic(&self, name: &str, contents: &str) -> Result<(), PersistError>;
}
