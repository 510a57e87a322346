//! Configuration management for jobtrawl.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Every section falls back to defaults, so a
//! config file only needs the values it changes.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest single delay a range may ask for.
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Main crawler configuration.
///
/// Loaded from `~/.config/jobtrawl/config.toml` (or platform equivalent)
/// unless an explicit path is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Target site
    pub site: SiteSettings,
    /// Keywords and page limits
    pub search: SearchSettings,
    /// Randomized delays and retries
    pub pacing: PacingSettings,
    /// Bounds for element waits and clicks
    pub timeouts: TimeoutSettings,
    /// Browser launch settings
    pub browser: BrowserSettings,
    /// Output directory and formats
    pub output: OutputSettings,
    /// Extraction switches
    pub extraction: ExtractionSettings,
    /// Selector candidate lists
    pub selectors: SelectorSet,
}

impl CrawlerConfig {
    /// Preset for quick selector debugging: one keyword, one page, five items.
    #[must_use]
    pub fn quick_test() -> Self {
        let mut config = Self::default().into_quick_run();
        config.search.keywords = vec!["Python".to_string()];
        config.browser.headless = false;
        config
    }

    /// Shrink this configuration to a quick run: its first keyword, one page
    /// of five items, short delays, CSV plus page snapshots. Site, selectors,
    /// timeouts, browser and output location are kept.
    #[must_use]
    pub fn into_quick_run(mut self) -> Self {
        self.search.keywords.truncate(1);
        self.search.max_pages = 1;
        self.search.items_per_page = 5;
        self.pacing.min_delay_secs = 2.0;
        self.pacing.max_delay_secs = 3.0;
        self.output.csv = true;
        self.output.json = false;
        self.output.html = true;
        self
    }

    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one, the XDG config
    /// file is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::load_file(path)
            }
            None => {
                let config_path = Self::config_path()?;
                if config_path.exists() {
                    Self::load_file(&config_path)
                } else {
                    tracing::debug!("Config file not found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration and apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `JOBTRAWL_HEADLESS`: Override browser headless mode (true/false)
    /// - `JOBTRAWL_OUTPUT_DIR`: Override the output directory
    /// - `JOBTRAWL_MAX_PAGES`: Override pages per keyword
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// [`CrawlerConfig::load_with_env`]). Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("JOBTRAWL_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("JOBTRAWL_OUTPUT_DIR") {
            if !val.trim().is_empty() {
                tracing::debug!("Override output.directory from env: {}", val);
                self.output.directory = PathBuf::from(val);
            }
        }

        if let Some(val) = lookup("JOBTRAWL_MAX_PAGES") {
            if let Ok(pages) = val.parse() {
                self.search.max_pages = pages;
                tracing::debug!("Override search.max_pages from env: {}", pages);
            }
        }
    }

    /// Check values that would make a run meaningless or panic later.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.search.keywords.is_empty() {
            return Err(invalid("search.keywords", "at least one keyword is required"));
        }
        if let Some(position) = self.search.keywords.iter().position(|k| k.trim().is_empty()) {
            return Err(invalid(
                &format!("search.keywords[{position}]"),
                "keywords cannot be blank",
            ));
        }
        if self.search.max_pages == 0 {
            return Err(invalid("search.max_pages", "must be at least 1"));
        }
        if self.search.items_per_page == 0 {
            return Err(invalid("search.items_per_page", "must be at least 1"));
        }

        self.pacing.between_pages().validate("pacing.min_delay_secs")?;
        for (field, range) in [
            ("pacing.settle", &self.pacing.settle),
            ("pacing.results_load", &self.pacing.results_load),
            ("pacing.interaction", &self.pacing.interaction),
            ("pacing.keystroke", &self.pacing.keystroke),
            ("pacing.before_submit", &self.pacing.before_submit),
        ] {
            range.validate(field)?;
        }

        url::Url::parse(&self.site.base_url)
            .map_err(|e| invalid("site.base_url", &format!("not a valid URL: {e}")))?;

        for (field, candidates) in self.selectors.fields() {
            if candidates.iter().all(|c| c.trim().is_empty()) {
                return Err(invalid(
                    &format!("selectors.{field}"),
                    "candidate list cannot be empty",
                ));
            }
        }

        Ok(())
    }

    /// Save configuration to a file, creating its directory.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        tracing::debug!("Saving config to {}", path.display());
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/jobtrawl/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "jobtrawl", "jobtrawl").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    fn load_file(path: &Path) -> ConfigResult<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Target site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Site root; also the origin relative listing links are resolved against
    pub base_url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.zhipin.com".to_string(),
        }
    }
}

/// Keyword and page limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Keywords, searched in order
    pub keywords: Vec<String>,
    /// Result pages per keyword
    pub max_pages: u32,
    /// Listing cards extracted per page
    pub items_per_page: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            keywords: vec!["Python".to_string()],
            max_pages: 3,
            items_per_page: 30,
        }
    }
}

/// Inclusive range of seconds a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Lower bound in seconds
    pub min_secs: f64,
    /// Upper bound in seconds
    pub max_secs: f64,
}

impl DelayRange {
    /// Range between two bounds in seconds.
    #[must_use]
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Zero-length delay.
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Lower bound as a duration.
    #[must_use]
    pub fn min(&self) -> Duration {
        clamped_secs(self.min_secs)
    }

    /// Upper bound as a duration.
    #[must_use]
    pub fn max(&self) -> Duration {
        clamped_secs(self.max_secs)
    }

    fn validate(&self, field: &str) -> ConfigResult<()> {
        if !self.min_secs.is_finite() || !self.max_secs.is_finite() || self.min_secs < 0.0 {
            return Err(invalid(field, "delays must be finite and non-negative"));
        }
        if self.max_secs > MAX_DELAY_SECS {
            return Err(invalid(
                field,
                &format!("delays cannot exceed {MAX_DELAY_SECS} seconds"),
            ));
        }
        if self.min_secs > self.max_secs {
            return Err(invalid(field, "lower bound exceeds upper bound"));
        }
        Ok(())
    }
}

fn clamped_secs(secs: f64) -> Duration {
    if secs.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(secs.clamp(0.0, MAX_DELAY_SECS))
}

/// Randomized delays and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    /// Lower bound of the delay between page cycles and keywords
    pub min_delay_secs: f64,
    /// Upper bound of the delay between page cycles and keywords
    pub max_delay_secs: f64,
    /// Move the pointer around after landing on the site
    pub mouse_move_enabled: bool,
    /// Navigation attempts before giving up
    pub max_retries: u32,
    /// Base backoff between navigation attempts
    pub retry_delay_ms: u64,
    /// Pause after landing on the site root
    pub settle: DelayRange,
    /// Pause after submitting a search or clicking next page
    pub results_load: DelayRange,
    /// Pause after a click on an input or a dismissed dialog
    pub interaction: DelayRange,
    /// Per-character typing delay
    pub keystroke: DelayRange,
    /// Pause between typing and submitting, and after scrolling
    pub before_submit: DelayRange,
}

impl PacingSettings {
    /// Delay drawn between page cycles and between keywords.
    #[must_use]
    pub fn between_pages(&self) -> DelayRange {
        DelayRange::new(self.min_delay_secs, self.max_delay_secs)
    }

    /// Settings without any waiting, for scripted drivers.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            min_delay_secs: 0.0,
            max_delay_secs: 0.0,
            mouse_move_enabled: true,
            max_retries: 3,
            retry_delay_ms: 0,
            settle: DelayRange::instant(),
            results_load: DelayRange::instant(),
            interaction: DelayRange::instant(),
            keystroke: DelayRange::instant(),
            before_submit: DelayRange::instant(),
        }
    }
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            min_delay_secs: 3.0,
            max_delay_secs: 6.0,
            mouse_move_enabled: true,
            max_retries: 3,
            retry_delay_ms: 2000,
            settle: DelayRange::new(3.0, 5.0),
            results_load: DelayRange::new(5.0, 8.0),
            interaction: DelayRange::new(0.5, 1.0),
            keystroke: DelayRange::new(0.05, 0.15),
            before_submit: DelayRange::new(1.0, 2.0),
        }
    }
}

/// Bounds for waits and clicks, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Wait per search-box candidate
    pub search_box_ms: u64,
    /// Search button click
    pub submit_click_ms: u64,
    /// Wait for the results container
    pub results_ms: u64,
    /// Each dialog dismiss attempt
    pub popup_click_ms: u64,
    /// Next-page click
    pub next_page_click_ms: u64,
}

impl TimeoutSettings {
    /// Convert a millisecond field into a duration.
    #[must_use]
    pub fn of(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            search_box_ms: 10_000,
            submit_click_ms: 5_000,
            results_ms: 15_000,
            popup_click_ms: 2_000,
            next_page_click_ms: 5_000,
        }
    }
}

/// Browser launch settings. Opaque to the crawl controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run browser in headless mode
    pub headless: bool,
    /// Chrome/Chromium executable; autodetected when unset
    pub chrome_path: Option<PathBuf>,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// `Accept-Language` locale
    pub locale: String,
}

impl BrowserSettings {
    /// Navigation timeout as a duration.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            chrome_path: None,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
            locale: "zh-CN".to_string(),
        }
    }
}

/// Output directory and formats. Opaque to the crawl controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct OutputSettings {
    /// Directory all files are written to
    pub directory: PathBuf,
    /// Write records as CSV
    pub csv: bool,
    /// Write records as JSON
    pub json: bool,
    /// Keep the HTML of every result page
    pub html: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            csv: true,
            json: true,
            html: false,
        }
    }
}

/// Extraction switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Scan the whole card text for a salary when the salary field is missing
    pub salary_recovery: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            salary_recovery: true,
        }
    }
}

/// Ordered selector candidates for every field the crawler reads.
///
/// Each list is tried front to back; overriding one field in TOML leaves the
/// others at their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    /// Search input
    pub search_box: Vec<String>,
    /// Search submit control
    pub search_button: Vec<String>,
    /// Overlay dialog dismiss controls
    pub close_buttons: Vec<String>,
    /// Results container
    pub job_list: Vec<String>,
    /// One listing card
    pub job_card: Vec<String>,
    /// Title inside a card
    pub job_title: Vec<String>,
    /// Link inside a card
    pub job_link: Vec<String>,
    /// Salary inside a card
    pub salary: Vec<String>,
    /// Company name inside a card
    pub company_name: Vec<String>,
    /// Experience tag
    pub experience: Vec<String>,
    /// Education tag
    pub education: Vec<String>,
    /// Location
    pub location: Vec<String>,
    /// Benefits
    pub welfare: Vec<String>,
    /// Company tags
    pub company_info: Vec<String>,
    /// Next-page control
    pub next_page: Vec<String>,
}

impl SelectorSet {
    /// Every field with its name, for validation and diagnostics.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &[String]); 15] {
        [
            ("search_box", self.search_box.as_slice()),
            ("search_button", self.search_button.as_slice()),
            ("close_buttons", self.close_buttons.as_slice()),
            ("job_list", self.job_list.as_slice()),
            ("job_card", self.job_card.as_slice()),
            ("job_title", self.job_title.as_slice()),
            ("job_link", self.job_link.as_slice()),
            ("salary", self.salary.as_slice()),
            ("company_name", self.company_name.as_slice()),
            ("experience", self.experience.as_slice()),
            ("education", self.education.as_slice()),
            ("location", self.location.as_slice()),
            ("welfare", self.welfare.as_slice()),
            ("company_info", self.company_info.as_slice()),
            ("next_page", self.next_page.as_slice()),
        ]
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            search_box: list(&[".ipt-search", "input[name='query']", "#search-input"]),
            search_button: list(&[".btn-search", "button[type='submit']", ".search-btn"]),
            close_buttons: list(&[".btn-close", ".dialog-close", ".close-btn", "[class*='close']"]),
            job_list: list(&[".job-list", ".job-list-box", "[class*='job-list']"]),
            job_card: list(&[
                ".job-card-wrapper",
                ".job-card",
                ".job-primary",
                "[class*='job-card']",
            ]),
            job_title: list(&[
                ".job-title",
                ".job-name",
                "a.job-name",
                ".info-primary h3",
                "span.job-name",
            ]),
            job_link: list(&["a", ".job-card-left a"]),
            salary: list(&[
                ".salary",
                ".red",
                "[class*='salary']",
                ".job-limit .red",
                "span.salary",
            ]),
            company_name: list(&[
                ".company-name",
                ".name",
                "h3.name",
                ".company-text h3",
                "span.company-name",
            ]),
            experience: list(&[".tag-list li:first-child", "[class*='experience']"]),
            education: list(&[".tag-list li:nth-child(2)", "[class*='education']"]),
            location: list(&[".job-area", ".area", "[class*='location']"]),
            welfare: list(&[".info-desc", ".tag-list", "[class*='welfare']"]),
            company_info: list(&[".company-tag-list", ".company-info", ".info-company"]),
            next_page: list(&[".next", ".page-next", "[class*='next']"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CrawlerConfig::default();
        assert_eq!(config.search.keywords, vec!["Python".to_string()]);
        assert_eq!(config.search.max_pages, 3);
        assert_eq!(config.search.items_per_page, 30);
        assert!(config.output.csv && config.output.json && !config.output.html);
        assert_eq!(config.selectors.search_box[0], ".ipt-search");
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_quick_test_preset() {
        let config = CrawlerConfig::quick_test();
        assert_eq!(config.search.max_pages, 1);
        assert_eq!(config.search.items_per_page, 5);
        assert!(config.output.html);
        assert!(!config.output.json);
        config.validate().expect("preset is valid");
    }

    #[test]
    fn test_quick_run_keeps_site_settings() {
        let mut config = CrawlerConfig::default();
        config.site.base_url = "https://jobs.example.com".to_string();
        config.search.keywords = vec!["Java".to_string(), "Go".to_string()];
        config.search.max_pages = 8;
        config.browser.headless = true;
        config.output.directory = PathBuf::from("/srv/jobs");

        let quick = config.into_quick_run();
        assert_eq!(quick.site.base_url, "https://jobs.example.com");
        assert_eq!(quick.search.keywords, vec!["Java"]);
        assert_eq!(quick.search.max_pages, 1);
        assert_eq!(quick.search.items_per_page, 5);
        assert!(quick.browser.headless);
        assert!(quick.output.html);
        assert_eq!(quick.output.directory, PathBuf::from("/srv/jobs"));
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("config.toml");

        let mut config = CrawlerConfig::default();
        config.search.keywords = vec!["Rust".to_string(), "数据分析".to_string()];
        config.pacing.min_delay_secs = 1.5;
        config.save(&config_path).expect("save config");

        let loaded = CrawlerConfig::load(Some(&config_path)).expect("load config");
        assert_eq!(loaded.search.keywords, config.search.keywords);
        assert!((loaded.pacing.min_delay_secs - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explicit_missing_path() {
        let tmp = TempDir::new().expect("create temp dir");
        let missing = tmp.path().join("absent.toml");
        let err = CrawlerConfig::load(Some(&missing)).expect_err("missing file");
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[search]
keywords = ["Go"]

[selectors]
salary = [".pay"]
"#;

        let config: CrawlerConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.search.keywords, vec!["Go".to_string()]);
        assert_eq!(config.selectors.salary, vec![".pay".to_string()]);
        // Untouched fields keep their defaults
        assert_eq!(config.search.max_pages, 3);
        assert_eq!(config.selectors.job_title, SelectorSet::default().job_title);
        assert!(config.extraction.salary_recovery);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("JOBTRAWL_HEADLESS", "true"),
            ("JOBTRAWL_OUTPUT_DIR", "/tmp/jobs"),
            ("JOBTRAWL_MAX_PAGES", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = CrawlerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert!(config.browser.headless);
        assert_eq!(config.output.directory, PathBuf::from("/tmp/jobs"));
        assert_eq!(config.search.max_pages, 3);
    }

    #[test]
    fn test_validate_rejects_inverted_delays() {
        let mut config = CrawlerConfig::default();
        config.pacing.min_delay_secs = 9.0;
        config.pacing.max_delay_secs = 1.0;
        let err = config.validate().expect_err("inverted delays");
        assert!(err.to_string().contains("pacing.min_delay_secs"));
    }

    #[test]
    fn test_validate_rejects_empty_inputs() {
        let mut config = CrawlerConfig::default();
        config.search.keywords = vec!["  ".to_string()];
        assert!(config.validate().is_err());

        let mut config = CrawlerConfig::default();
        config.search.keywords.clear();
        let err = config.validate().expect_err("no keywords");
        assert!(err.to_string().contains("search.keywords"));

        let mut config = CrawlerConfig::default();
        config.search.keywords = vec!["Rust".to_string(), " ".to_string()];
        let err = config.validate().expect_err("blank keyword among valid ones");
        assert!(err.to_string().contains("search.keywords[1]"));

        let mut config = CrawlerConfig::default();
        config.search.max_pages = 0;
        assert!(config.validate().is_err());

        let mut config = CrawlerConfig::default();
        config.selectors.job_card.clear();
        let err = config.validate().expect_err("empty selectors");
        assert!(err.to_string().contains("selectors.job_card"));

        let mut config = CrawlerConfig::default();
        config.site.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_delay_range_durations() {
        let range = DelayRange::new(0.5, 1.25);
        assert_eq!(range.min(), Duration::from_millis(500));
        assert_eq!(range.max(), Duration::from_millis(1250));
        assert_eq!(DelayRange::instant().max(), Duration::ZERO);
    }

    #[test]
    fn test_huge_delays_rejected_without_panicking() {
        let mut config = CrawlerConfig::default();
        config.pacing.min_delay_secs = 1e20;
        config.pacing.max_delay_secs = 1e20;
        let err = config.validate().expect_err("delay beyond the cap");
        assert!(err.to_string().contains("pacing.min_delay_secs"));

        let mut config = CrawlerConfig::default();
        config.pacing.keystroke = DelayRange::new(0.1, 7200.0);
        let err = config.validate().expect_err("keystroke delay beyond the cap");
        assert!(err.to_string().contains("pacing.keystroke"));

        let range = DelayRange::new(1e20, 1e20);
        assert_eq!(range.min(), Duration::from_secs(3600));
        assert_eq!(range.max(), Duration::from_secs(3600));
        assert_eq!(DelayRange::new(f64::NAN, -1.0).max(), Duration::ZERO);
    }
}
