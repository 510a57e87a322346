//! Browser automation for JavaScript-rendered job boards.
//!
//! The crawl controller talks to the browser only through the traits in
//! [`actions`]; [`engine`] implements them on top of chromiumoxide with a
//! randomized fingerprint and an anti-detection script injected before any
//! navigation.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod humanize;

pub use actions::{ElementHandle, PageDriver, SessionLauncher};
pub use engine::{ChromiumDriver, ChromiumElement, ChromiumLauncher};
pub use error::{BrowserError, Result};
pub use fingerprint::{FingerprintConfig, STEALTH_SCRIPT};
