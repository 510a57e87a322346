//! Acceptance check for extracted listings.
//!
//! Lenient: it filters out template placeholders and cards where
//! the core fields did not resolve, not semantically odd values.

use chrono::{DateTime, Local};
use jobtrawl_core::{JobRecord, SalaryRange, UNKNOWN_COMPANY, UNKNOWN_TITLE};
use thiserror::Error;

/// Fields read from one card, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCandidate {
    /// Keyword whose results contained the card
    pub keyword: String,
    /// Job title, or the unknown-title placeholder
    pub title: String,
    /// Company name, or the unknown-company placeholder
    pub company: String,
    /// Salary as displayed
    pub salary_text: String,
    /// Salary normalized from `salary_text`
    pub salary: SalaryRange,
    /// Experience requirement
    pub experience: String,
    /// Education requirement
    pub education: String,
    /// Work location
    pub location: String,
    /// Benefits text as displayed
    pub welfare: String,
    /// Industry, funding and size text as displayed
    pub company_info: String,
    /// Absolute listing URL, empty when the card had no link
    pub link: String,
    /// When the card was read
    pub captured_at: DateTime<Local>,
}

/// Why a candidate was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Title empty or still the placeholder
    #[error("title missing")]
    MissingTitle,

    /// Company empty or still the placeholder
    #[error("company missing")]
    MissingCompany,

    /// No salary text at all
    #[error("salary text missing")]
    MissingSalary,
}

impl ListingCandidate {
    /// Check the candidate.
    pub fn check(&self) -> Result<(), Rejection> {
        if self.title.is_empty() || self.title == UNKNOWN_TITLE {
            return Err(Rejection::MissingTitle);
        }
        if self.company.is_empty() || self.company == UNKNOWN_COMPANY {
            return Err(Rejection::MissingCompany);
        }
        // The negotiable sentinel is non-empty and therefore accepted.
        if self.salary_text.is_empty() {
            return Err(Rejection::MissingSalary);
        }
        Ok(())
    }

    /// Turn an acceptable candidate into a record.
    pub fn accept(self) -> Result<JobRecord, Rejection> {
        self.check()?;
        Ok(JobRecord {
            keyword: self.keyword,
            title: self.title,
            company: self.company,
            salary_text: self.salary_text,
            salary: self.salary,
            experience: self.experience,
            education: self.education,
            location: self.location,
            welfare: self.welfare,
            company_info: self.company_info,
            link: self.link,
            captured_at: self.captured_at,
        })
    }
}

/// Whether a candidate would be accepted.
#[must_use]
pub fn is_acceptable(candidate: &ListingCandidate) -> bool {
    candidate.check().is_ok()
}
