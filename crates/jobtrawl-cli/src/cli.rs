//! Command-line arguments and config resolution.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use jobtrawl_core::CrawlerConfig;
use std::path::PathBuf;

/// Starting point for the effective configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// One keyword, one page, five items, page snapshots on. Applied on top
    /// of `--config` when one is given.
    Quick,
    /// Config file (or defaults) as-is
    Full,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "jobtrawl",
    version,
    about = "Extract job listings from a JavaScript-rendered job board"
)]
pub struct Cli {
    /// Config file (defaults to the XDG config location)
    #[arg(long, short, env = "JOBTRAWL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Configuration preset
    #[arg(long, value_enum, default_value_t = Preset::Full)]
    pub preset: Preset,

    /// Search keyword; repeat to search several. Replaces the configured list.
    #[arg(long = "keyword", short = 'k')]
    pub keywords: Vec<String>,

    /// Result pages per keyword
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Listings kept per page
    #[arg(long)]
    pub items_per_page: Option<usize>,

    /// Run the browser without a window
    #[arg(long, conflicts_with = "show_browser")]
    pub headless: bool,

    /// Show the browser window
    #[arg(long)]
    pub show_browser: bool,

    /// Chrome or Chromium executable
    #[arg(long)]
    pub chrome_path: Option<PathBuf>,

    /// Output directory
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Keep the HTML of every result page
    #[arg(long)]
    pub html: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,
}

impl Cli {
    /// Build the effective configuration: file and preset, then environment
    /// overrides from `env`, then command-line flags.
    pub fn resolve_config(&self, env: impl Fn(&str) -> Option<String>) -> Result<CrawlerConfig> {
        let mut config = match (self.preset, self.config.as_deref()) {
            (Preset::Quick, None) => CrawlerConfig::quick_test(),
            (Preset::Quick, Some(path)) => CrawlerConfig::load(Some(path))
                .context("Failed to load configuration")?
                .into_quick_run(),
            (Preset::Full, path) => {
                CrawlerConfig::load(path).context("Failed to load configuration")?
            }
        };
        config.apply_overrides(env);

        if !self.keywords.is_empty() {
            config.search.keywords.clone_from(&self.keywords);
        }
        if let Some(pages) = self.max_pages {
            config.search.max_pages = pages;
        }
        if let Some(items) = self.items_per_page {
            config.search.items_per_page = items;
        }
        if self.headless {
            config.browser.headless = true;
        }
        if self.show_browser {
            config.browser.headless = false;
        }
        if let Some(path) = &self.chrome_path {
            config.browser.chrome_path = Some(path.clone());
        }
        if let Some(dir) = &self.output {
            config.output.directory.clone_from(dir);
        }
        if self.html {
            config.output.html = true;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}
