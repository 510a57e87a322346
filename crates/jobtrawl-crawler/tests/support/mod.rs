//! Scripted in-memory job board for driving the controller without a browser.

#![allow(dead_code)]

use async_trait::async_trait;
use jobtrawl_browser::{BrowserError, ElementHandle, PageDriver, Result, SessionLauncher};
use jobtrawl_core::{
    BrowserSettings, CrawlerConfig, JobRecord, OutputSettings, PacingSettings, PersistError,
    PersistSummary, Persistence, SessionStats,
};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const BASE_URL: &str = "https://www.zhipin.com";

/// Config with instant pacing and the default selectors.
pub fn config(keywords: &[&str], max_pages: u32) -> CrawlerConfig {
    let mut config = CrawlerConfig::default();
    config.search.keywords = keywords.iter().map(|k| (*k).to_string()).collect();
    config.search.max_pages = max_pages;
    config.pacing = PacingSettings::instant();
    config.output.html = false;
    config
}

pub fn card(title: &str, company: &str, salary: &str) -> String {
    format!(
        r#"<li class="job-card-wrapper">
             <a href="/job_detail/{title}.html"><span class="job-name">{title}</span></a>
             <span class="salary">{salary}</span>
             <ul class="tag-list"><li>1-3年</li><li>本科</li></ul>
             <span class="job-area">上海·浦东新区</span>
             <h3 class="company-name">{company}</h3>
           </li>"#
    )
}

/// Valid cards titled `{prefix}1..={count}`.
pub fn cards(prefix: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| card(&format!("{prefix}{i}"), "Acme", "10-20K"))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextControl {
    /// Enabled on every page but the last, disabled on the last
    DisabledOnLast,
    /// No next-page control anywhere
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Blank,
    Root,
    Results { keyword: String, page: usize },
}

/// Mutable site state shared between the fake driver and the test.
#[derive(Debug)]
pub struct SiteState {
    results: HashMap<String, Vec<Vec<String>>>,
    next_control: NextControl,
    location: Location,
    typed: String,
    selected: bool,
    popup_open: bool,
    root_visits_without_search_box: usize,
    failing_navigations: usize,
    root_visits: usize,
    cancel_on_results: Option<CancellationToken>,
    pub launches: usize,
    pub navigations: Vec<String>,
    pub searches: Vec<String>,
    pub next_clicks: usize,
    pub popups_dismissed: usize,
    pub closed: bool,
    pub script_injected: bool,
    pub pointer_moves: usize,
}

impl SiteState {
    fn root_html(&self) -> String {
        let popup = if self.popup_open {
            r#"<div class="dialog-wrap"><a class="btn-close">×</a></div>"#
        } else {
            ""
        };
        let search = if self.root_visits <= self.root_visits_without_search_box {
            r#"<div class="banner">维护中</div>"#
        } else {
            r#"<input class="ipt-search" name="query"><button class="btn-search">搜索</button>"#
        };
        format!(
            r#"<html><head><title>BOSS直聘</title></head><body>{popup}{search}</body></html>"#
        )
    }

    fn results_html(&self, keyword: &str, page: usize) -> String {
        let pages = self.results.get(keyword).map_or(&[][..], Vec::as_slice);
        let body = pages.get(page).map(|c| c.join("")).unwrap_or_default();
        let last = page + 1 >= pages.len();
        let next = match self.next_control {
            NextControl::Missing => String::new(),
            NextControl::DisabledOnLast if last => {
                r#"<div class="options-pages"><a class="next disabled">下一页</a></div>"#.to_string()
            }
            NextControl::DisabledOnLast => {
                r#"<div class="options-pages"><a class="next">下一页</a></div>"#.to_string()
            }
        };
        format!(
            r#"<html><head><title>「{keyword}招聘」</title></head><body>
                 <ul class="job-list-box">{body}</ul>{next}
               </body></html>"#
        )
    }

    fn html(&self) -> String {
        match &self.location {
            Location::Blank => "<html><body></body></html>".to_string(),
            Location::Root => self.root_html(),
            Location::Results { keyword, page } => self.results_html(keyword, *page),
        }
    }

    fn url(&self) -> String {
        match &self.location {
            Location::Blank => "about:blank".to_string(),
            Location::Root => BASE_URL.to_string(),
            Location::Results { keyword, page } => {
                format!("{BASE_URL}/web/geek/job?query={keyword}&page={}", page + 1)
            }
        }
    }

    fn submit(&mut self) {
        let keyword = self.typed.trim().to_string();
        self.searches.push(keyword.clone());
        self.location = Location::Results { keyword, page: 0 };
    }

    fn click(&mut self, class: &str) {
        if class.contains("btn-close") {
            self.popup_open = false;
            self.popups_dismissed += 1;
        } else if class.contains("btn-search") {
            self.submit();
        } else if class.contains("next") && !class.contains("disabled") {
            if let Location::Results { page, .. } = &mut self.location {
                *page += 1;
                self.next_clicks += 1;
            }
        }
    }
}

/// Builder and shared handle for a scripted site.
#[derive(Clone)]
pub struct FakeSite {
    state: Arc<Mutex<SiteState>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SiteState {
                results: HashMap::new(),
                next_control: NextControl::DisabledOnLast,
                location: Location::Blank,
                typed: String::new(),
                selected: false,
                popup_open: false,
                root_visits_without_search_box: 0,
                failing_navigations: 0,
                root_visits: 0,
                cancel_on_results: None,
                launches: 0,
                navigations: Vec::new(),
                searches: Vec::new(),
                next_clicks: 0,
                popups_dismissed: 0,
                closed: false,
                script_injected: false,
                pointer_moves: 0,
            })),
        }
    }

    /// Result pages for a keyword, each a list of card snippets.
    pub fn keyword(self, keyword: &str, pages: Vec<Vec<String>>) -> Self {
        self.with(|s| {
            s.results.insert(keyword.to_string(), pages);
        })
    }

    pub fn next_control(self, control: NextControl) -> Self {
        self.with(|s| s.next_control = control)
    }

    pub fn with_popup(self) -> Self {
        self.with(|s| s.popup_open = true)
    }

    /// The first `visits` loads of the root page render without a search box.
    pub fn search_box_missing_for(self, visits: usize) -> Self {
        self.with(|s| s.root_visits_without_search_box = visits)
    }

    /// The search box starts out holding `query`, like a site restoring the
    /// last search. The box keeps its text across navigations.
    pub fn prefilled_query(self, query: &str) -> Self {
        self.with(|s| s.typed = query.to_string())
    }

    pub fn failing_navigations(self, count: usize) -> Self {
        self.with(|s| s.failing_navigations = count)
    }

    /// Cancel `token` the first time a results page is read.
    pub fn cancel_on_results(self, token: CancellationToken) -> Self {
        self.with(|s| s.cancel_on_results = Some(token))
    }

    fn with(self, f: impl FnOnce(&mut SiteState)) -> Self {
        f(&mut self.state.lock().expect("site lock"));
        self
    }

    pub fn inspect<T>(&self, f: impl FnOnce(&SiteState) -> T) -> T {
        f(&self.state.lock().expect("site lock"))
    }

    pub fn launcher(&self) -> FakeLauncher {
        FakeLauncher {
            site: self.clone(),
            fail: false,
        }
    }

    pub fn broken_launcher(&self) -> FakeLauncher {
        FakeLauncher {
            site: self.clone(),
            fail: true,
        }
    }
}

pub struct FakeLauncher {
    site: FakeSite,
    fail: bool,
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Driver = FakeDriver;

    async fn launch(&self, _settings: &BrowserSettings) -> Result<FakeDriver> {
        if self.fail {
            return Err(BrowserError::ChromiumError(
                "could not auto detect a chrome executable".to_string(),
            ));
        }
        self.site.state.lock().expect("site lock").launches += 1;
        Ok(FakeDriver {
            state: Arc::clone(&self.site.state),
        })
    }
}

/// Owned view of one matched element.
struct Matched {
    attrs: HashMap<String, String>,
    text: String,
}

fn select(html: &str, selector: &str) -> Vec<Matched> {
    let Ok(parsed) = Selector::parse(selector) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&parsed)
        .map(|el| Matched {
            attrs: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: el.text().collect::<String>().trim().to_string(),
        })
        .collect()
}

pub struct FakeDriver {
    state: Arc<Mutex<SiteState>>,
}

impl FakeDriver {
    fn current_html(&self) -> String {
        let state = self.state.lock().expect("site lock");
        if let Location::Results { .. } = state.location {
            if let Some(token) = &state.cancel_on_results {
                token.cancel();
            }
        }
        state.html()
    }

    fn element(&self, matched: Matched) -> FakeElement {
        FakeElement {
            state: Arc::clone(&self.state),
            attrs: matched.attrs,
            text: matched.text,
        }
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        let mut state = self.state.lock().expect("site lock");
        state.navigations.push(url.to_string());
        if state.failing_navigations > 0 {
            state.failing_navigations -= 1;
            return Err(BrowserError::NavigationError(format!(
                "{url}: net::ERR_CONNECTION_RESET"
            )));
        }
        state.root_visits += 1;
        state.location = Location::Root;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().expect("site lock").url())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.current_html())
    }

    async fn title(&self) -> Result<String> {
        let html = self.current_html();
        Ok(select(&html, "title")
            .into_iter()
            .next()
            .map(|m| m.text)
            .unwrap_or_default())
    }

    async fn find_first(&self, candidates: &[String]) -> Result<Option<FakeElement>> {
        let html = self.state.lock().expect("site lock").html();
        for candidate in candidates {
            if let Some(matched) = select(&html, candidate).into_iter().next() {
                return Ok(Some(self.element(matched)));
            }
        }
        Ok(None)
    }

    async fn find_all(&self, candidates: &[String]) -> Result<Vec<FakeElement>> {
        let html = self.state.lock().expect("site lock").html();
        for candidate in candidates {
            let found = select(&html, candidate);
            if !found.is_empty() {
                return Ok(found.into_iter().map(|m| self.element(m)).collect());
            }
        }
        Ok(Vec::new())
    }

    async fn wait_for(&self, candidates: &[String], timeout: Duration) -> Result<String> {
        let html = self.state.lock().expect("site lock").html();
        candidates
            .iter()
            .find(|candidate| !select(&html, candidate).is_empty())
            .cloned()
            .ok_or_else(|| {
                BrowserError::Timeout(format!("none of {candidates:?} within {timeout:?}"))
            })
    }

    async fn inject_behavior_script(&self, _script: &str) -> Result<()> {
        self.state.lock().expect("site lock").script_injected = true;
        Ok(())
    }

    async fn simulate_human_pointer_movement(&self) -> Result<()> {
        self.state.lock().expect("site lock").pointer_moves += 1;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.state.lock().expect("site lock").closed = true;
        Ok(())
    }
}

pub struct FakeElement {
    state: Arc<Mutex<SiteState>>,
    attrs: HashMap<String, String>,
    text: String,
}

impl FakeElement {
    fn class(&self) -> String {
        self.attrs.get("class").cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ElementHandle for FakeElement {
    async fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.attrs.get(name).cloned())
    }

    async fn click(&self, _timeout: Duration) -> Result<()> {
        let class = self.class();
        self.state.lock().expect("site lock").click(&class);
        Ok(())
    }

    async fn is_visible(&self) -> Result<bool> {
        Ok(!self.class().contains("hidden"))
    }

    async fn fill(&self, value: &str) -> Result<()> {
        let mut state = self.state.lock().expect("site lock");
        state.typed = value.to_string();
        state.selected = false;
        Ok(())
    }

    async fn select_all(&self) -> Result<()> {
        self.state.lock().expect("site lock").selected = true;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock().expect("site lock");
        match key {
            "Backspace" if state.selected => {
                state.typed.clear();
                state.selected = false;
            }
            "Backspace" => {
                state.typed.pop();
            }
            "Enter" => state.submit(),
            _ => {}
        }
        Ok(())
    }

    async fn type_char(&self, ch: char, _delay: Duration) -> Result<()> {
        self.state.lock().expect("site lock").typed.push(ch);
        Ok(())
    }
}

/// Persistence double that records every call.
#[derive(Default)]
pub struct RecordingSink {
    persisted: Mutex<Vec<Vec<JobRecord>>>,
    diagnostics: Mutex<Vec<(String, String)>>,
    snapshots: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn persist_calls(&self) -> Vec<Vec<JobRecord>> {
        self.persisted.lock().expect("sink lock").clone()
    }

    pub fn diagnostics(&self) -> Vec<(String, String)> {
        self.diagnostics.lock().expect("sink lock").clone()
    }

    pub fn snapshots(&self) -> Vec<String> {
        self.snapshots.lock().expect("sink lock").clone()
    }
}

#[async_trait]
impl Persistence for RecordingSink {
    async fn persist(
        &self,
        records: &[JobRecord],
        _stats: &SessionStats,
        _output: &OutputSettings,
    ) -> std::result::Result<PersistSummary, PersistError> {
        self.persisted
            .lock()
            .expect("sink lock")
            .push(records.to_vec());
        Ok(PersistSummary {
            records: records.len(),
            files: Vec::new(),
        })
    }

    async fn save_page_snapshot(
        &self,
        label: &str,
        _html: &str,
    ) -> std::result::Result<(), PersistError> {
        self.snapshots
            .lock()
            .expect("sink lock")
            .push(label.to_string());
        Ok(())
    }

    async fn save_diagnostic(
        &self,
        name: &str,
        contents: &str,
    ) -> std::result::Result<(), PersistError> {
        self.diagnostics
            .lock()
            .expect("sink lock")
            .push((name.to_string(), contents.to_string()));
        Ok(())
    }
}
