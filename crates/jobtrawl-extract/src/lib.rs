//! jobtrawl Extract - turns a rendered result page into validated job records.
//!
//! Listing markup drifts, so every field is read through an ordered list of
//! selector candidates and falls back to a default instead of failing. The
//! pipeline works on a DOM snapshot and never touches the live page.
//!
//! # Example
//!
//! ```rust
//! use jobtrawl_core::SelectorSet;
//! use jobtrawl_extract::ExtractionPipeline;
//!
//! let html = r#"
//!     <ul class="job-list">
//!       <li class="job-card-wrapper">
//!         <a href="/job_detail/1.html"><span class="job-name">Rust Engineer</span></a>
//!         <span class="salary">20-40K</span>
//!         <h3 class="company-name">Acme</h3>
//!       </li>
//!     </ul>"#;
//!
//! let origin = url::Url::parse("https://www.zhipin.com").unwrap();
//! let pipeline = ExtractionPipeline::new(SelectorSet::default(), origin);
//! let page = pipeline.extract_html(html, 30, "Rust");
//!
//! assert_eq!(page.attempted, 1);
//! assert_eq!(page.records[0].link, "https://www.zhipin.com/job_detail/1.html");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod pipeline;
pub mod resolver;
pub mod salary;
pub mod validator;

pub use pipeline::{ExtractionPipeline, PageExtraction};
pub use resolver::{clean_text, resolve_all, resolve_attribute, resolve_text, Locatable};
pub use salary::{parse_salary, recover_salary};
pub use validator::{is_acceptable, ListingCandidate, Rejection};
