//! jobtrawl Export - file output for crawl runs.
//!
//! [`FileExporter`] is the production [`jobtrawl_core::Persistence`]
//! implementation: CSV and JSON record files, HTML page snapshots and
//! diagnostic artifacts, all under the configured output directory.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod exporter;

pub use error::{ExportError, Result};
pub use exporter::{encode_csv, encode_json, sanitize_file_name, FileExporter};
