//! Controller position within a run.

use jobtrawl_core::{JobRecord, SessionStats};
use std::fmt;

/// Phase of the crawl state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Created, browser not launched yet
    Idle,
    /// Opening the site root and dismissing dialogs
    Initializing,
    /// Searching the keyword at this index
    Searching(usize),
    /// A result page is loaded and about to be captured
    PageReady,
    /// Reading listings from the captured page
    Extracting,
    /// Deciding whether to turn to the next result page
    Paginating,
    /// Recording the keyword outcome and moving to the next one
    NextKeyword,
    /// Closing the session and persisting records
    Finalizing,
    /// Run finished, records persisted
    Done,
    /// Run stopped early
    Aborted,
}

impl CrawlPhase {
    /// Whether the run is over.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Initializing => write!(f, "Initializing"),
            Self::Searching(index) => write!(f, "Searching({index})"),
            Self::PageReady => write!(f, "PageReady"),
            Self::Extracting => write!(f, "Extracting"),
            Self::Paginating => write!(f, "Paginating"),
            Self::NextKeyword => write!(f, "NextKeyword"),
            Self::Finalizing => write!(f, "Finalizing"),
            Self::Done => write!(f, "Done"),
            Self::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Everything the controller accumulates during a run.
#[derive(Debug)]
pub struct CrawlState {
    phase: CrawlPhase,
    /// Keywords to search, in order
    pub keywords: Vec<String>,
    /// Index of the keyword being searched
    pub keyword_index: usize,
    /// 1-based result page within the current keyword
    pub page: u32,
    /// Accepted records of the whole run
    pub records: Vec<JobRecord>,
    /// Counters for the run
    pub stats: SessionStats,
    /// HTML of the page being extracted
    pub snapshot: Option<String>,
    /// Current keyword hit a hard failure
    pub keyword_failed: bool,
    /// A diagnostic has already been written for an empty page
    pub empty_page_reported: bool,
}

impl CrawlState {
    #[must_use]
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            phase: CrawlPhase::Idle,
            keywords,
            keyword_index: 0,
            page: 1,
            records: Vec::new(),
            stats: SessionStats::start(),
            snapshot: None,
            keyword_failed: false,
            empty_page_reported: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Move to `next`, logging the transition.
    pub fn advance(&mut self, next: CrawlPhase) {
        tracing::debug!("State: {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Keyword being searched.
    #[must_use]
    pub fn keyword(&self) -> &str {
        self.keywords
            .get(self.keyword_index)
            .map_or("", String::as_str)
    }

    /// Whether another keyword follows the current one.
    #[must_use]
    pub fn has_next_keyword(&self) -> bool {
        self.keyword_index + 1 < self.keywords.len()
    }
}
