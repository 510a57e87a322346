//! Crawl controller.
//!
//! Drives one browser session through every configured keyword: search,
//! extract each result page, paginate until a stop condition, then hand the
//! accumulated records to persistence exactly once. Only a failed launch or an
//! unreachable site root ends the run early; everything else is logged and
//! either skipped or confined to the keyword being searched.

use crate::error::{CrawlError, Result};
use crate::pacing::{backoff, sample, Pacer};
use crate::pagination::NextPageAttrs;
use crate::state::{CrawlPhase, CrawlState};
use jobtrawl_browser::{ElementHandle, PageDriver, SessionLauncher, STEALTH_SCRIPT};
use jobtrawl_core::{CrawlerConfig, Persistence, RunOutcome, SessionReport, TimeoutSettings};
use jobtrawl_extract::ExtractionPipeline;
use std::slice;
use tokio_util::sync::CancellationToken;

/// Cards whose markup is logged from the first result page of a run.
const DEBUG_CARDS: usize = 3;
const DEBUG_CARD_CHARS: usize = 500;

/// Sequential crawl over one automation session.
pub struct CrawlController<L, P> {
    config: CrawlerConfig,
    launcher: L,
    persistence: P,
    pipeline: ExtractionPipeline,
    pacer: Pacer,
}

impl<L: SessionLauncher, P: Persistence> CrawlController<L, P> {
    /// Create a controller. Fails only if the configured site is not a URL.
    pub fn new(
        config: CrawlerConfig,
        launcher: L,
        persistence: P,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let pipeline = ExtractionPipeline::from_config(&config)?;
        Ok(Self {
            config,
            launcher,
            persistence,
            pipeline,
            pacer: Pacer::new(cancel),
        })
    }

    /// The persistence collaborator.
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Run the whole session and report how it ended.
    ///
    /// Always finalizes: records gathered before an abort or cancellation are
    /// still persisted and the browser is closed.
    pub async fn run(&self) -> SessionReport {
        let mut state = CrawlState::new(self.config.search.keywords.clone());
        tracing::info!(
            "Starting crawl of {} for [{}], up to {} page(s) each",
            self.config.site.base_url,
            state.keywords.join(", "),
            self.config.search.max_pages
        );
        state.advance(CrawlPhase::Initializing);

        let mut driver = None;
        let outcome = match self.launch().await {
            Ok(launched) => {
                let driver = driver.insert(launched);
                self.drive(driver, &mut state).await
            }
            Err(e) => Self::stop(e),
        };

        self.finalize(state, driver, outcome).await
    }

    async fn launch(&self) -> Result<L::Driver> {
        self.pacer.check()?;
        self.pacer
            .guard(self.launcher.launch(&self.config.browser))
            .await?
            .map_err(CrawlError::SessionUnavailable)
    }

    fn stop(error: CrawlError) -> RunOutcome {
        if let CrawlError::Cancelled = error {
            tracing::info!("Cancellation requested, finalizing");
            RunOutcome::Cancelled
        } else {
            tracing::error!("Crawl aborted: {}", error);
            RunOutcome::Aborted {
                reason: error.to_string(),
            }
        }
    }

    async fn drive(&self, driver: &mut L::Driver, state: &mut CrawlState) -> RunOutcome {
        loop {
            let step = match state.phase() {
                CrawlPhase::Initializing => self.initialize(driver, state).await,
                CrawlPhase::Searching(_) => self.search(driver, state).await,
                CrawlPhase::PageReady => self.capture_page(&*driver, state).await,
                CrawlPhase::Extracting => self.extract(&*driver, state).await,
                CrawlPhase::Paginating => self.paginate(&*driver, state).await,
                CrawlPhase::NextKeyword => self.next_keyword(state).await,
                CrawlPhase::Finalizing => return RunOutcome::Completed,
                phase @ (CrawlPhase::Idle | CrawlPhase::Done | CrawlPhase::Aborted) => {
                    return RunOutcome::Aborted {
                        reason: format!("controller entered {phase} while running"),
                    };
                }
            };

            match step {
                Ok(next) => state.advance(next),
                Err(e) if e.is_fatal() || matches!(e, CrawlError::Cancelled) => {
                    return Self::stop(e);
                }
                Err(e) => {
                    tracing::error!("Giving up on keyword '{}': {}", state.keyword(), e);
                    state.keyword_failed = true;
                    state.advance(CrawlPhase::NextKeyword);
                }
            }
        }
    }

    async fn initialize<D: PageDriver>(
        &self,
        driver: &mut D,
        state: &CrawlState,
    ) -> Result<CrawlPhase> {
        if let Err(e) = driver.inject_behavior_script(STEALTH_SCRIPT).await {
            tracing::warn!("Could not inject behavior script: {}", e);
        }

        self.open_root(driver).await?;
        self.pacer.pause(&self.config.pacing.settle).await?;

        if self.config.pacing.mouse_move_enabled {
            if let Err(e) = self
                .pacer
                .guard(driver.simulate_human_pointer_movement())
                .await?
            {
                tracing::warn!("Pointer simulation failed: {}", e);
            }
        }

        self.dismiss_popups(&*driver).await?;

        if state.keywords.is_empty() {
            tracing::warn!("No keywords configured");
            return Ok(CrawlPhase::Finalizing);
        }
        Ok(CrawlPhase::Searching(0))
    }

    /// Navigate to the site root, retrying transient failures with linear backoff.
    async fn open_root<D: PageDriver>(&self, driver: &mut D) -> Result<()> {
        let url = self.config.site.base_url.as_str();
        let timeout = self.config.browser.navigation_timeout();
        let max_attempts = self.config.pacing.max_retries.max(1);

        tracing::info!("Opening {}", url);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let error = match self.pacer.guard(driver.navigate(url, timeout)).await? {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            if attempt >= max_attempts || !error.is_transient() {
                return Err(CrawlError::NavigationExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }

            let delay = backoff(self.config.pacing.retry_delay_ms, attempt);
            tracing::warn!(
                "Navigation to {} failed (attempt {}/{}), retrying in {:?}...: {}",
                url,
                attempt,
                max_attempts,
                delay,
                error
            );
            self.pacer.sleep(delay).await?;
        }
    }

    /// Click every dialog-close candidate that is present. Never fails except
    /// on cancellation.
    async fn dismiss_popups<D: PageDriver>(&self, driver: &D) -> Result<()> {
        let timeout = TimeoutSettings::of(self.config.timeouts.popup_click_ms);
        for candidate in &self.config.selectors.close_buttons {
            self.pacer.check()?;
            let Ok(Some(control)) = driver.find_first(slice::from_ref(candidate)).await else {
                continue;
            };
            match control.click(timeout).await {
                Ok(()) => {
                    tracing::info!("Dismissed dialog via '{}'", candidate);
                    self.pacer.pause(&self.config.pacing.interaction).await?;
                }
                Err(e) => tracing::trace!("Dialog control '{}' not clickable: {}", candidate, e),
            }
        }
        Ok(())
    }

    async fn search<D: PageDriver>(
        &self,
        driver: &mut D,
        state: &mut CrawlState,
    ) -> Result<CrawlPhase> {
        let index = state.keyword_index;
        let keyword = state.keyword().to_string();
        state.page = 1;
        state.keyword_failed = false;

        tracing::info!(
            "Searching keyword {}/{}: {}",
            index + 1,
            state.keywords.len(),
            keyword
        );

        if index > 0 {
            self.open_root(driver)
                .await
                .map_err(|e| keyword_local(&keyword, e))?;
            self.pacer.pause(&self.config.pacing.settle).await?;
            self.dismiss_popups(&*driver).await?;
        }

        let Some(search_box) = self.locate_search_box(&*driver).await? else {
            let html = driver.content().await.unwrap_or_default();
            self.save_diagnostic(&format!("search_box_missing_{}.html", index + 1), &html)
                .await;
            return Err(CrawlError::SearchBoxMissing { keyword });
        };

        self.enter_keyword(&search_box, &keyword)
            .await
            .map_err(|e| keyword_local(&keyword, e))?;
        self.submit_search(&*driver, &search_box).await?;
        self.pacer.pause(&self.config.pacing.results_load).await?;

        let results_timeout = TimeoutSettings::of(self.config.timeouts.results_ms);
        match self
            .pacer
            .guard(driver.wait_for(&self.config.selectors.job_list, results_timeout))
            .await?
        {
            Ok(matched) => tracing::info!("Result list loaded ('{}')", matched),
            Err(e) => tracing::warn!("Result list did not appear ({}), continuing", e),
        }

        Ok(CrawlPhase::PageReady)
    }

    async fn locate_search_box<D: PageDriver>(&self, driver: &D) -> Result<Option<D::Element>> {
        let timeout = TimeoutSettings::of(self.config.timeouts.search_box_ms);
        for candidate in &self.config.selectors.search_box {
            let candidates = slice::from_ref(candidate);
            match self.pacer.guard(driver.wait_for(candidates, timeout)).await? {
                Ok(_) => {
                    if let Ok(Some(element)) = driver.find_first(candidates).await {
                        tracing::info!("Search box found with '{}'", candidate);
                        return Ok(Some(element));
                    }
                }
                Err(e) => tracing::debug!("Search box candidate '{}' missed: {}", candidate, e),
            }
        }
        Ok(None)
    }

    async fn enter_keyword<E: ElementHandle>(&self, search_box: &E, keyword: &str) -> Result<()> {
        let pacing = &self.config.pacing;

        search_box
            .click(TimeoutSettings::of(self.config.timeouts.submit_click_ms))
            .await?;
        self.pacer.pause(&pacing.interaction).await?;

        // Sites restore the previous query on some inputs; clear it three ways.
        if let Err(e) = search_box.fill("").await {
            tracing::debug!("Clearing search box by value failed: {}", e);
        }
        if let Err(e) = search_box.select_all().await {
            tracing::debug!("Selecting search box contents failed: {}", e);
        }
        if let Err(e) = search_box.press_key("Backspace").await {
            tracing::debug!("Backspace in search box failed: {}", e);
        }
        self.pacer.pause(&pacing.interaction).await?;

        for ch in keyword.chars() {
            let delay = sample(&pacing.keystroke);
            self.pacer.guard(search_box.type_char(ch, delay)).await??;
        }

        self.pacer.pause(&pacing.before_submit).await
    }

    async fn submit_search<D: PageDriver>(&self, driver: &D, search_box: &D::Element) -> Result<()> {
        let timeout = TimeoutSettings::of(self.config.timeouts.submit_click_ms);
        for candidate in &self.config.selectors.search_button {
            self.pacer.check()?;
            let Ok(Some(button)) = driver.find_first(slice::from_ref(candidate)).await else {
                continue;
            };
            match button.click(timeout).await {
                Ok(()) => {
                    tracing::info!("Search submitted via '{}'", candidate);
                    return Ok(());
                }
                Err(e) => tracing::debug!("Search button '{}' not clickable: {}", candidate, e),
            }
        }

        tracing::warn!("No search button clickable, submitting with Enter");
        if let Err(e) = search_box.press_key("Enter").await {
            tracing::warn!("Could not submit search: {}", e);
        }
        Ok(())
    }

    async fn capture_page<D: PageDriver>(
        &self,
        driver: &D,
        state: &mut CrawlState,
    ) -> Result<CrawlPhase> {
        self.pacer.check()?;
        tracing::info!("Keyword '{}' - page {}", state.keyword(), state.page);

        match driver.find_all(&self.config.selectors.job_card).await {
            Ok(cards) => tracing::debug!("{} listing cards rendered", cards.len()),
            Err(e) => tracing::debug!("Could not count listing cards: {}", e),
        }

        let html = match driver.content().await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Could not read page content: {}", e);
                String::new()
            }
        };

        // The first result page of a run is always kept for selector debugging.
        let first_page = state.keyword_index == 0 && state.page == 1;
        if (self.config.output.html || first_page) && !html.is_empty() {
            let label = format!("{}_page{}", state.keyword(), state.page);
            if let Err(e) = self.persistence.save_page_snapshot(&label, &html).await {
                tracing::warn!("Could not save page snapshot: {}", e);
            }
        }
        if first_page {
            let markup = self.pipeline.card_markup(&html, DEBUG_CARDS, DEBUG_CARD_CHARS);
            for (i, card) in markup.iter().enumerate() {
                tracing::debug!("Card {} HTML: {}", i + 1, card);
            }
        }

        state.snapshot = Some(html);
        Ok(CrawlPhase::Extracting)
    }

    async fn extract<D: PageDriver>(
        &self,
        driver: &D,
        state: &mut CrawlState,
    ) -> Result<CrawlPhase> {
        let html = state.snapshot.take().unwrap_or_default();
        let page = self.pipeline.extract_html(
            &html,
            self.config.search.items_per_page,
            state.keyword(),
        );

        if page.attempted == 0 {
            state.stats.record_empty_page();
            tracing::warn!(
                "No listings found on page {} for '{}'",
                state.page,
                state.keyword()
            );
            if !state.empty_page_reported {
                state.empty_page_reported = true;
                let title = driver.title().await.unwrap_or_default();
                let url = driver.current_url().await.unwrap_or_default();
                let contents = format!("Page title: {title}\n\nPage URL: {url}\n");
                self.save_diagnostic("empty_page.txt", &contents).await;
            }
        } else {
            state.stats.record_page(page.attempted, page.records.len());
            tracing::info!(
                "Page {}: {} valid of {} attempted",
                state.page,
                page.records.len(),
                page.attempted
            );
            state.records.extend(page.records);
        }

        Ok(CrawlPhase::Paginating)
    }

    async fn paginate<D: PageDriver>(
        &self,
        driver: &D,
        state: &mut CrawlState,
    ) -> Result<CrawlPhase> {
        let next = if state.page >= self.config.search.max_pages {
            tracing::info!(
                "Reached page limit ({}) for '{}'",
                self.config.search.max_pages,
                state.keyword()
            );
            CrawlPhase::NextKeyword
        } else if self.turn_page(driver).await? {
            state.page += 1;
            CrawlPhase::PageReady
        } else {
            tracing::info!("No further pages for '{}'", state.keyword());
            CrawlPhase::NextKeyword
        };

        self.pacer
            .pause(&self.config.pacing.between_pages())
            .await?;
        Ok(next)
    }

    /// Click the next-page control. `false` means there is no further page.
    async fn turn_page<D: PageDriver>(&self, driver: &D) -> Result<bool> {
        if let Err(e) = driver.scroll_to_bottom().await {
            tracing::debug!("Scroll to bottom failed: {}", e);
        }
        self.pacer.pause(&self.config.pacing.before_submit).await?;

        let timeout = TimeoutSettings::of(self.config.timeouts.next_page_click_ms);
        for candidate in &self.config.selectors.next_page {
            self.pacer.check()?;
            let Ok(Some(control)) = driver.find_first(slice::from_ref(candidate)).await else {
                continue;
            };
            if !control.is_visible().await.unwrap_or(false) {
                continue;
            }

            match NextPageAttrs::read(&control).await {
                Ok(attrs) if attrs.is_disabled() => {
                    tracing::info!("Reached the last page");
                    return Ok(false);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Could not inspect next-page control '{}': {}", candidate, e);
                    continue;
                }
            }

            match control.click(timeout).await {
                Ok(()) => {
                    tracing::info!("Moved to the next page");
                    self.pacer.pause(&self.config.pacing.results_load).await?;
                    return Ok(true);
                }
                Err(e) => tracing::debug!("Next-page control '{}' not clickable: {}", candidate, e),
            }
        }

        tracing::warn!("Next-page control not found");
        Ok(false)
    }

    async fn next_keyword(&self, state: &mut CrawlState) -> Result<CrawlPhase> {
        if state.keyword_failed {
            state.stats.record_keyword_failed();
        } else {
            state.stats.record_keyword_completed();
        }

        if !state.has_next_keyword() {
            return Ok(CrawlPhase::Finalizing);
        }

        // A failed keyword skipped the per-page pause.
        if state.keyword_failed {
            self.pacer
                .pause(&self.config.pacing.between_pages())
                .await?;
        }
        state.keyword_index += 1;
        Ok(CrawlPhase::Searching(state.keyword_index))
    }

    async fn finalize(
        &self,
        mut state: CrawlState,
        driver: Option<L::Driver>,
        outcome: RunOutcome,
    ) -> SessionReport {
        state.advance(CrawlPhase::Finalizing);
        state.stats.finish();

        let (records_persisted, files_written) = match self
            .persistence
            .persist(&state.records, &state.stats, &self.config.output)
            .await
        {
            Ok(summary) => (summary.records, summary.files),
            Err(e) => {
                tracing::error!("Failed to save results: {}", e);
                (0, Vec::new())
            }
        };

        if let Some(mut driver) = driver {
            if let Err(e) = driver.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
        }

        let terminal = if matches!(outcome, RunOutcome::Aborted { .. }) {
            CrawlPhase::Aborted
        } else {
            CrawlPhase::Done
        };
        state.advance(terminal);

        let report = SessionReport {
            outcome,
            stats: state.stats,
            records_persisted,
            files_written,
        };
        tracing::info!("\n{}", report);
        report
    }

    async fn save_diagnostic(&self, name: &str, contents: &str) {
        match self.persistence.save_diagnostic(name, contents).await {
            Ok(()) => tracing::info!("Saved diagnostic {}", name),
            Err(e) => tracing::warn!("Could not save diagnostic {}: {}", name, e),
        }
    }
}

/// Confine a failure to the keyword being searched.
fn keyword_local(keyword: &str, error: CrawlError) -> CrawlError {
    match error {
        CrawlError::Cancelled => CrawlError::Cancelled,
        other => CrawlError::KeywordFailed {
            keyword: keyword.to_string(),
            reason: other.to_string(),
        },
    }
}
