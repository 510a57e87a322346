//! Page extraction.
//!
//! Reads every listing card on a result page through the selector resolver,
//! normalizes the salary, validates, and returns the accepted records along
//! with how many cards were attempted.

use crate::resolver::{resolve_all, resolve_attribute, resolve_text, Locatable};
use crate::salary::{parse_salary, recover_salary};
use crate::validator::ListingCandidate;
use chrono::Local;
use jobtrawl_core::{
    CrawlerConfig, JobRecord, SelectorSet, NEGOTIABLE_SALARY, UNKNOWN_COMPANY, UNKNOWN_TITLE,
};
use scraper::Html;
use url::Url;

/// Result of extracting one page.
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    /// Accepted records, in page order
    pub records: Vec<JobRecord>,
    /// Cards processed (accepted or not)
    pub attempted: usize,
    /// Cards present on the page, before the per-page cap
    pub cards_found: usize,
}

impl PageExtraction {
    /// Cards processed but not accepted.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.attempted - self.records.len()
    }
}

/// Extraction settings bound to one site.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    selectors: SelectorSet,
    origin: Url,
    salary_recovery: bool,
}

impl ExtractionPipeline {
    /// Create a pipeline resolving relative links against `origin`.
    #[must_use]
    pub fn new(selectors: SelectorSet, origin: Url) -> Self {
        Self {
            selectors,
            origin,
            salary_recovery: true,
        }
    }

    /// Build a pipeline from crawler configuration.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, url::ParseError> {
        let origin = Url::parse(&config.site.base_url)?;
        Ok(Self::new(config.selectors.clone(), origin)
            .with_salary_recovery(config.extraction.salary_recovery))
    }

    /// Enable or disable scanning card text for a salary when the field is missing.
    #[must_use]
    pub fn with_salary_recovery(mut self, enabled: bool) -> Self {
        self.salary_recovery = enabled;
        self
    }

    /// Parse an HTML snapshot and extract it.
    #[must_use]
    pub fn extract_html(&self, html: &str, max_items: usize, keyword: &str) -> PageExtraction {
        let document = Html::parse_document(html);
        self.extract_page(&document.root_element(), max_items, keyword)
    }

    /// Markup of the first `count` cards on a page, each cut to `max_chars`
    /// characters.
    #[must_use]
    pub fn card_markup(&self, html: &str, count: usize, max_chars: usize) -> Vec<String> {
        let document = Html::parse_document(html);
        resolve_all(&document.root_element(), &self.selectors.job_card)
            .iter()
            .take(count)
            .map(|card| card.inner_html().trim().chars().take(max_chars).collect())
            .collect()
    }

    /// Extract up to `max_items` cards from a page.
    ///
    /// A page without any card yields an empty result with zero attempts.
    pub fn extract_page<L: Locatable>(
        &self,
        page: &L,
        max_items: usize,
        keyword: &str,
    ) -> PageExtraction {
        let cards = resolve_all(page, &self.selectors.job_card);
        if cards.is_empty() {
            tracing::warn!("No listing cards found on page");
            return PageExtraction::default();
        }

        let total = cards.len();
        let mut extraction = PageExtraction {
            records: Vec::new(),
            attempted: 0,
            cards_found: total,
        };

        for (i, card) in cards.iter().take(max_items).enumerate() {
            extraction.attempted += 1;
            let candidate = self.read_card(card, keyword);
            let title = candidate.title.clone();
            let salary_text = candidate.salary_text.clone();

            match candidate.accept() {
                Ok(record) => {
                    tracing::info!(
                        "[{}/{}] ✓ {} @ {} - {}",
                        i + 1,
                        total,
                        record.title,
                        record.company,
                        record.salary_text
                    );
                    extraction.records.push(record);
                }
                Err(reason) => {
                    tracing::warn!(
                        "[{}/{}] ✗ rejected ({}): {} | salary: {}",
                        i + 1,
                        total,
                        reason,
                        title,
                        salary_text
                    );
                }
            }
        }

        extraction
    }

    fn read_card<L: Locatable>(&self, card: &L, keyword: &str) -> ListingCandidate {
        let s = &self.selectors;

        let title = resolve_text(card, &s.job_title, UNKNOWN_TITLE);
        let href = resolve_attribute(card, &s.job_link, "href", "");
        let company = resolve_text(card, &s.company_name, UNKNOWN_COMPANY);

        let mut salary_text = resolve_text(card, &s.salary, NEGOTIABLE_SALARY);
        if self.salary_recovery && (salary_text.is_empty() || salary_text == NEGOTIABLE_SALARY) {
            if let Some(found) = recover_salary(&card.inner_text()) {
                tracing::debug!("Recovered salary '{}' from card text", found);
                salary_text = found;
            }
        }
        let salary = parse_salary(&salary_text);

        ListingCandidate {
            keyword: keyword.to_string(),
            title,
            company,
            salary_text,
            salary,
            experience: resolve_text(card, &s.experience, ""),
            education: resolve_text(card, &s.education, ""),
            location: resolve_text(card, &s.location, ""),
            welfare: resolve_text(card, &s.welfare, ""),
            company_info: resolve_text(card, &s.company_info, ""),
            link: absolutize(&self.origin, &href),
            captured_at: Local::now(),
        }
    }
}

/// Resolve a listing link against the site origin. Absolute links pass through.
fn absolutize(origin: &Url, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    match origin.join(href) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::debug!("Keeping unresolvable link '{}': {}", href, e);
            href.to_string()
        }
    }
}
