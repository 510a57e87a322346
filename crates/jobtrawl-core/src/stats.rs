//! Run statistics and the end-of-run report.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Counters and timing for one crawl session.
///
/// Counters only move forward through the `record_*` methods; the end time is
/// set once by [`SessionStats::finish`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    attempted: u64,
    accepted: u64,
    rejected: u64,
    pages_visited: u64,
    empty_pages: u64,
    keywords_completed: u64,
    keywords_failed: u64,
    started_at: DateTime<Local>,
    ended_at: Option<DateTime<Local>>,
}

impl SessionStats {
    /// Start a new session clock.
    #[must_use]
    pub fn start() -> Self {
        Self {
            attempted: 0,
            accepted: 0,
            rejected: 0,
            pages_visited: 0,
            empty_pages: 0,
            keywords_completed: 0,
            keywords_failed: 0,
            started_at: Local::now(),
            ended_at: None,
        }
    }

    /// Account for one extracted page.
    pub fn record_page(&mut self, attempted: usize, accepted: usize) {
        let attempted = attempted as u64;
        let accepted = (accepted as u64).min(attempted);
        self.pages_visited += 1;
        self.attempted += attempted;
        self.accepted += accepted;
        self.rejected += attempted - accepted;
    }

    /// Account for a page on which no listing cards were found.
    pub fn record_empty_page(&mut self) {
        self.pages_visited += 1;
        self.empty_pages += 1;
    }

    /// Account for a keyword whose search ran to a normal stop.
    pub fn record_keyword_completed(&mut self) {
        self.keywords_completed += 1;
    }

    /// Account for a keyword abandoned on a hard failure.
    pub fn record_keyword_failed(&mut self) {
        self.keywords_failed += 1;
    }

    /// Stamp the end time. Later calls keep the first value.
    pub fn finish(&mut self) {
        if self.ended_at.is_none() {
            self.ended_at = Some(Local::now());
        }
    }

    /// Listing cards processed.
    #[must_use]
    pub fn attempted(&self) -> u64 {
        self.attempted
    }

    /// Cards that produced a record.
    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Cards rejected by validation.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Result pages visited, including empty ones.
    #[must_use]
    pub fn pages_visited(&self) -> u64 {
        self.pages_visited
    }

    /// Result pages without any listing card.
    #[must_use]
    pub fn empty_pages(&self) -> u64 {
        self.empty_pages
    }

    /// Keywords searched to a normal stop.
    #[must_use]
    pub fn keywords_completed(&self) -> u64 {
        self.keywords_completed
    }

    /// Keywords abandoned.
    #[must_use]
    pub fn keywords_failed(&self) -> u64 {
        self.keywords_failed
    }

    /// Session start time.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Session end time, once finished.
    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Local>> {
        self.ended_at
    }

    /// Share of attempted cards that were accepted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn acceptance_rate(&self) -> f64 {
        self.accepted as f64 / self.attempted.max(1) as f64
    }

    /// Wall-clock duration of the session.
    ///
    /// Measured up to now while the session is still running.
    #[must_use]
    pub fn duration(&self) -> Duration {
        let end = self.ended_at.unwrap_or_else(Local::now);
        (end - self.started_at).to_std().unwrap_or_default()
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every keyword was processed
    Completed,
    /// Progress became impossible
    Aborted {
        /// Why the run stopped
        reason: String,
    },
    /// Stopped on request
    Cancelled,
}

/// Final summary handed back by the crawl controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Terminal outcome
    pub outcome: RunOutcome,
    /// Final counters
    pub stats: SessionStats,
    /// Records handed to persistence
    pub records_persisted: usize,
    /// Files written by persistence
    pub files_written: Vec<String>,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        let stats = &self.stats;
        writeln!(f, "{rule}")?;
        writeln!(f, "Crawl summary")?;
        writeln!(f, "{rule}")?;
        match &self.outcome {
            RunOutcome::Completed => writeln!(f, "Outcome:   completed")?,
            RunOutcome::Aborted { reason } => writeln!(f, "Outcome:   aborted ({reason})")?,
            RunOutcome::Cancelled => writeln!(f, "Outcome:   cancelled")?,
        }
        writeln!(f, "Attempted: {}", stats.attempted())?;
        writeln!(f, "Accepted:  {}", stats.accepted())?;
        writeln!(f, "Rejected:  {}", stats.rejected())?;
        writeln!(
            f,
            "Pages:     {} ({} empty)",
            stats.pages_visited(),
            stats.empty_pages()
        )?;
        writeln!(
            f,
            "Keywords:  {} completed, {} failed",
            stats.keywords_completed(),
            stats.keywords_failed()
        )?;
        writeln!(f, "Rate:      {:.1}%", stats.acceptance_rate() * 100.0)?;
        writeln!(f, "Duration:  {:.1}s", stats.duration().as_secs_f64())?;
        write!(f, "{rule}")
    }
}
