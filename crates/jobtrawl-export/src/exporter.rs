//! File-backed [`Persistence`] implementation.
//!
//! Records go to `jobs_<timestamp>.csv` and `jobs_<timestamp>.json` in the
//! output directory. The CSV starts with a UTF-8 byte order mark so
//! spreadsheet tools pick the right encoding for CJK text.

use crate::error::{ExportError, Result};
use async_trait::async_trait;
use chrono::Local;
use jobtrawl_core::{
    JobRecord, OutputSettings, PersistError, PersistSummary, Persistence, SessionStats,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const FILE_STAMP: &str = "%Y%m%d_%H%M%S";

/// One CSV row, with the salary range flattened into columns.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    keyword: &'a str,
    title: &'a str,
    company: &'a str,
    salary_text: &'a str,
    salary_min: u64,
    salary_max: u64,
    salary_unit: &'static str,
    salary_avg: f64,
    experience: &'a str,
    education: &'a str,
    location: &'a str,
    welfare: &'a str,
    company_info: &'a str,
    link: &'a str,
    captured_at: String,
}

impl<'a> From<&'a JobRecord> for CsvRow<'a> {
    fn from(record: &'a JobRecord) -> Self {
        Self {
            keyword: &record.keyword,
            title: &record.title,
            company: &record.company,
            salary_text: &record.salary_text,
            salary_min: record.salary.min,
            salary_max: record.salary.max,
            salary_unit: record.salary.unit.as_str(),
            salary_avg: record.salary.avg,
            experience: &record.experience,
            education: &record.education,
            location: &record.location,
            welfare: &record.welfare,
            company_info: &record.company_info,
            link: &record.link,
            captured_at: record.captured_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Encode records as BOM-prefixed CSV.
pub fn encode_csv(records: &[JobRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

/// Encode records as a pretty-printed JSON array.
pub fn encode_json(records: &[JobRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// Replace anything that is not safe in a file name.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Writes run output under a directory.
#[derive(Debug, Clone)]
pub struct FileExporter {
    directory: PathBuf,
}

impl FileExporter {
    /// Exporter writing snapshots and diagnostics to `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Exporter for the configured output directory.
    #[must_use]
    pub fn from_settings(output: &OutputSettings) -> Self {
        Self::new(output.directory.clone())
    }

    /// Directory snapshots and diagnostics are written to.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn write(&self, directory: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|e| ExportError::io(directory, e))?;
        let path = directory.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| ExportError::io(&path, e))?;
        Ok(path)
    }

    /// Write the records in every enabled format and return the paths written.
    pub async fn export(&self, records: &[JobRecord], output: &OutputSettings) -> Result<Vec<PathBuf>> {
        let stamp = Local::now().format(FILE_STAMP).to_string();
        let mut written = Vec::new();

        if output.csv {
            let bytes = encode_csv(records)?;
            let path = self
                .write(&output.directory, &format!("jobs_{stamp}.csv"), &bytes)
                .await?;
            tracing::info!("Saved {} records to {}", records.len(), path.display());
            written.push(path);
        }

        if output.json {
            let bytes = encode_json(records)?;
            let path = self
                .write(&output.directory, &format!("jobs_{stamp}.json"), &bytes)
                .await?;
            tracing::info!("Saved {} records to {}", records.len(), path.display());
            written.push(path);
        }

        Ok(written)
    }
}

#[async_trait]
impl Persistence for FileExporter {
    async fn persist(
        &self,
        records: &[JobRecord],
        stats: &SessionStats,
        output: &OutputSettings,
    ) -> std::result::Result<PersistSummary, PersistError> {
        if records.is_empty() {
            tracing::warn!(
                "No records to save ({} listings attempted)",
                stats.attempted()
            );
            return Ok(PersistSummary::default());
        }
        if !output.csv && !output.json {
            tracing::warn!("CSV and JSON output are both disabled, nothing saved");
            return Ok(PersistSummary::default());
        }

        let files = self.export(records, output).await?;
        Ok(PersistSummary {
            records: records.len(),
            files: files.iter().map(|p| p.display().to_string()).collect(),
        })
    }

    async fn save_page_snapshot(
        &self,
        label: &str,
        html: &str,
    ) -> std::result::Result<(), PersistError> {
        let stamp = Local::now().format(FILE_STAMP);
        let name = format!("page_{}_{stamp}.html", sanitize_file_name(label));
        let path = self.write(&self.directory, &name, html.as_bytes()).await?;
        tracing::info!("Saved page source: {}", path.display());
        Ok(())
    }

    async fn save_diagnostic(
        &self,
        name: &str,
        contents: &str,
    ) -> std::result::Result<(), PersistError> {
        let name = sanitize_file_name(name);
        let path = self
            .write(&self.directory, &name, contents.as_bytes())
            .await?;
        tracing::debug!("Wrote diagnostic {}", path.display());
        Ok(())
    }
}
