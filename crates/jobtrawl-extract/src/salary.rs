//! Salary text normalization.
//!
//! [`parse_salary`] is total: any string maps to a [`SalaryRange`], with
//! unparseable text preserved in `raw`. [`recover_salary`] is a separate,
//! best-effort scan of a whole card's text, used only when the salary field
//! itself resolved to nothing.

use jobtrawl_core::{SalaryRange, SalaryUnit, NEGOTIABLE_SALARY};
use once_cell::sync::Lazy;
use regex::Regex;

/// ASCII digit runs. `\d` would also match full-width digits, which do not parse.
static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("digit regex is hardcoded and valid"));

/// Salary-shaped ranges inside free text: `10-20K`, `10K-20K`, `1-2万`.
static SALARY_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+[-~][0-9]+K|[0-9]+K[-~][0-9]+K|[0-9]+[-~][0-9]+万)")
        .expect("salary regex is hardcoded and valid")
});

const TEN_THOUSAND_MARKER: char = '万';

/// Parse displayed salary text into a structured range.
#[must_use]
pub fn parse_salary(text: &str) -> SalaryRange {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == NEGOTIABLE_SALARY {
        return SalaryRange::negotiable();
    }

    let bounds: Vec<u64> = DIGIT_RUN
        .find_iter(trimmed)
        .take(2)
        // Runs longer than u64 saturate rather than fail.
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .collect();

    let (low, high) = match bounds.as_slice() {
        [] => return SalaryRange::unrecognized(text),
        [only] => (*only, *only),
        [low, high, ..] => (*low, *high),
    };

    let (unit, scale) = detect_unit(trimmed);
    let (min, max) = (low.saturating_mul(scale), high.saturating_mul(scale));

    SalaryRange {
        min,
        max,
        unit,
        avg: midpoint(min, max),
        raw: None,
    }
}

fn detect_unit(text: &str) -> (SalaryUnit, u64) {
    if text.contains(TEN_THOUSAND_MARKER) {
        (SalaryUnit::TenThousandPerYear, 10)
    } else {
        // `K`/`k` or no marker at all both read as thousands per month.
        (SalaryUnit::KPerMonth, 1)
    }
}

#[allow(clippy::cast_precision_loss)]
fn midpoint(min: u64, max: u64) -> f64 {
    (min as f64 + max as f64) / 2.0
}

/// Find a salary-shaped range anywhere in a card's text.
#[must_use]
pub fn recover_salary(card_text: &str) -> Option<String> {
    SALARY_IN_TEXT
        .find(card_text)
        .map(|m| m.as_str().to_string())
}
