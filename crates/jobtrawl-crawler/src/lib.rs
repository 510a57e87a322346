//! jobtrawl Crawler - keyword search, pagination and session control.
//!
//! The [`CrawlController`] is generic over the browser launcher and the
//! persistence collaborator, so the same state machine runs against Chromium
//! in production and against scripted pages in tests.
//!
//! ```rust,no_run
//! use jobtrawl_browser::ChromiumLauncher;
//! use jobtrawl_core::{
//!     CrawlerConfig, JobRecord, OutputSettings, PersistError, PersistSummary, Persistence,
//!     SessionStats,
//! };
//! use jobtrawl_crawler::CrawlController;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Discard;
//!
//! #[async_trait::async_trait]
//! impl Persistence for Discard {
//!     async fn persist(
//!         &self,
//!         records: &[JobRecord],
//!         _stats: &SessionStats,
//!         _output: &OutputSettings,
//!     ) -> Result<PersistSummary, PersistError> {
//!         Ok(PersistSummary { records: records.len(), files: vec![] })
//!     }
//!
//!     async fn save_diagnostic(&self, _name: &str, _contents: &str) -> Result<(), PersistError> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = CrawlController::new(
//!     CrawlerConfig::quick_test(),
//!     ChromiumLauncher::new(),
//!     Discard,
//!     CancellationToken::new(),
//! )?;
//! let report = controller.run().await;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod pacing;
pub mod pagination;
pub mod state;

pub use controller::CrawlController;
pub use error::{CrawlError, Result};
pub use pacing::Pacer;
pub use pagination::NextPageAttrs;
pub use state::{CrawlPhase, CrawlState};
