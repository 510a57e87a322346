//! jobtrawl Core - Foundation crate for the jobtrawl listing extractor.
//!
//! This crate provides the shared record types, run statistics, configuration
//! management and the persistence seam that all other jobtrawl crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Job records and the salary model
//! - [`stats`] - Run statistics and the end-of-run report
//! - [`persistence`] - Trait implemented by the record writer
//!
//! # Example
//!
//! ```rust
//! use jobtrawl_core::{CrawlerConfig, SessionStats};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CrawlerConfig::quick_test();
//! config.validate()?;
//!
//! let stats = SessionStats::start();
//! assert_eq!(stats.acceptance_rate(), 0.0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod persistence;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use config::{
    BrowserSettings, CrawlerConfig, DelayRange, ExtractionSettings, OutputSettings,
    PacingSettings, SearchSettings, SelectorSet, SiteSettings, TimeoutSettings,
};
pub use error::{ConfigError, ConfigResult, PersistError};
pub use persistence::{PersistSummary, Persistence};
pub use stats::{RunOutcome, SessionReport, SessionStats};
pub use types::{
    JobRecord, SalaryRange, SalaryUnit, NEGOTIABLE_SALARY, UNKNOWN_COMPANY, UNKNOWN_TITLE,
};
