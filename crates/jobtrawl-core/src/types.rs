//! Shared record types.
//!
//! A [`JobRecord`] is the unit of output. It is only ever built from a
//! candidate that passed validation, so every field here is final.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Salary text the site shows when compensation is not disclosed.
pub const NEGOTIABLE_SALARY: &str = "面议";

/// Placeholder used when no title candidate resolves.
pub const UNKNOWN_TITLE: &str = "未知职位";

/// Placeholder used when no company candidate resolves.
pub const UNKNOWN_COMPANY: &str = "未知公司";

/// Unit of a parsed salary range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryUnit {
    /// Thousands per month (`10-20K`)
    KPerMonth,
    /// Ten-thousands per year (`1-2万`), bounds already scaled to K
    TenThousandPerYear,
    /// Not disclosed
    Negotiable,
    /// Text carried no digits
    Unrecognized,
}

impl SalaryUnit {
    /// Stable label used in flat exports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KPerMonth => "k_per_month",
            Self::TenThousandPerYear => "ten_thousand_per_year",
            Self::Negotiable => "negotiable",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for SalaryUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured salary range derived from the displayed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    /// Lower bound
    pub min: u64,
    /// Upper bound
    pub max: u64,
    /// Unit of both bounds
    pub unit: SalaryUnit,
    /// Midpoint of the bounds
    pub avg: f64,
    /// Original text, kept only when it could not be parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl SalaryRange {
    /// Range for undisclosed compensation.
    #[must_use]
    pub fn negotiable() -> Self {
        Self {
            min: 0,
            max: 0,
            unit: SalaryUnit::Negotiable,
            avg: 0.0,
            raw: None,
        }
    }

    /// Range for text that could not be parsed; the text is preserved.
    #[must_use]
    pub fn unrecognized(raw: impl Into<String>) -> Self {
        Self {
            min: 0,
            max: 0,
            unit: SalaryUnit::Unrecognized,
            avg: 0.0,
            raw: Some(raw.into()),
        }
    }
}

/// One accepted job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Search keyword that surfaced this listing
    pub keyword: String,
    /// Job title
    pub title: String,
    /// Hiring company
    pub company: String,
    /// Salary exactly as displayed
    pub salary_text: String,
    /// Parsed salary
    pub salary: SalaryRange,
    /// Experience requirement
    pub experience: String,
    /// Education requirement
    pub education: String,
    /// Work location
    pub location: String,
    /// Benefits text
    pub welfare: String,
    /// Company size, industry and funding tags
    pub company_info: String,
    /// Absolute link to the listing
    pub link: String,
    /// Extraction time
    pub captured_at: DateTime<Local>,
}
