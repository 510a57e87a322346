use crate::actions::{ElementHandle, PageDriver, SessionLauncher};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use crate::humanize::{interpolate, plan_pointer_moves};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::element::Element;
use chromiumoxide::keys::get_key_definition;
use chromiumoxide::layout::Point;
use chromiumoxide::page::Page;
use futures_util::stream::StreamExt;
use jobtrawl_core::BrowserSettings;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Interval between selector checks while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

const AUTOMATION_ARGS: [&str; 3] = [
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
    "--start-maximized",
];

const IS_VISIBLE_FN: &str = "function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}";

const SELECT_ALL_FN: &str = "function() { if (this.select) { this.select(); } }";

/// Launches Chromium through chromiumoxide.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self
    }

    fn build_config(
        settings: &BrowserSettings,
        fingerprint: &FingerprintConfig,
    ) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(settings.window_width, settings.window_height);

        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &settings.chrome_path {
            builder = builder.chrome_executable(path);
        }
        for arg in AUTOMATION_ARGS {
            builder = builder.arg(arg);
        }
        for arg in fingerprint.launch_args() {
            builder = builder.arg(arg);
        }

        builder.build().map_err(BrowserError::ChromiumError)
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    type Driver = ChromiumDriver;

    async fn launch(&self, settings: &BrowserSettings) -> Result<ChromiumDriver> {
        let fingerprint = FingerprintConfig::randomized(&settings.locale);
        let config = Self::build_config(settings, &fingerprint)?;

        tracing::info!(
            "Launching browser (headless: {}, window: {}x{})",
            settings.headless,
            settings.window_width,
            settings.window_height
        );
        tracing::debug!("User agent: {}", fingerprint.user_agent);

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(BrowserError::ChromiumError(e.to_string()));
            }
        };

        Ok(ChromiumDriver {
            browser,
            page,
            handler,
        })
    }
}

/// A single Chromium tab plus the browser process behind it.
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    type Element = ChromiumElement;

    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigation to {url} exceeded {timeout:?}"
            ))),
        }
    }

    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn title(&self) -> Result<String> {
        self.page
            .get_title()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn find_first(&self, candidates: &[String]) -> Result<Option<ChromiumElement>> {
        for candidate in candidates {
            match self.page.find_element(candidate.as_str()).await {
                Ok(inner) => {
                    return Ok(Some(ChromiumElement {
                        inner,
                        page: self.page.clone(),
                    }))
                }
                Err(e) => tracing::trace!("Candidate '{}' not on page: {}", candidate, e),
            }
        }
        Ok(None)
    }

    async fn find_all(&self, candidates: &[String]) -> Result<Vec<ChromiumElement>> {
        for candidate in candidates {
            match self.page.find_elements(candidate.as_str()).await {
                Ok(found) if !found.is_empty() => {
                    return Ok(found
                        .into_iter()
                        .map(|inner| ChromiumElement {
                            inner,
                            page: self.page.clone(),
                        })
                        .collect());
                }
                Ok(_) => tracing::trace!("Candidate '{}' matched nothing", candidate),
                Err(e) => tracing::trace!("Candidate '{}' not on page: {}", candidate, e),
            }
        }
        Ok(Vec::new())
    }

    async fn wait_for(&self, candidates: &[String], timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        loop {
            for candidate in candidates {
                if self.page.find_element(candidate.as_str()).await.is_ok() {
                    return Ok(candidate.clone());
                }
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "none of {candidates:?} appeared within {timeout:?}"
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn inject_behavior_script(&self, script: &str) -> Result<()> {
        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(script))
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }

    async fn simulate_human_pointer_movement(&self) -> Result<()> {
        let mut at = (0.0, 0.0);
        for gesture in plan_pointer_moves() {
            for (x, y) in interpolate(at, gesture.target, gesture.steps) {
                self.page
                    .move_mouse(Point::new(x, y))
                    .await
                    .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
            }
            at = gesture.target;
            tokio::time::sleep(gesture.pause).await;
        }
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                tracing::debug!("Browser process did not exit cleanly: {}", e);
            }
        }
        self.handler.abort();
        closed.map(|_| ())
    }
}

/// An element on a [`ChromiumDriver`] page.
#[derive(Debug)]
pub struct ChromiumElement {
    inner: Element,
    page: Page,
}

impl ChromiumElement {
    async fn call_bool(&self, function: &str) -> Result<bool> {
        let returns = self
            .inner
            .call_js_fn(function, false)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        Ok(returns
            .result
            .value
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }
}

#[async_trait]
impl ElementHandle for ChromiumElement {
    async fn text(&self) -> Result<String> {
        self.inner
            .inner_text()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.inner
            .attribute(name)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn click(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.inner.click()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::ChromiumError(e.to_string())),
            Err(_) => Err(BrowserError::Timeout(format!("click exceeded {timeout:?}"))),
        }
    }

    async fn is_visible(&self) -> Result<bool> {
        self.call_bool(IS_VISIBLE_FN).await
    }

    async fn fill(&self, value: &str) -> Result<()> {
        let literal = serde_json::to_string(value)
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        let function = format!(
            "function() {{ this.value = {literal}; \
             this.dispatchEvent(new Event('input', {{ bubbles: true }})); return true; }}"
        );
        self.call_bool(&function).await.map(|_| ())
    }

    async fn select_all(&self) -> Result<()> {
        self.call_bool(SELECT_ALL_FN).await.map(|_| ())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.inner
            .press_key(key)
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn type_char(&self, ch: char, delay: Duration) -> Result<()> {
        let text = ch.to_string();
        // Key events only exist for keyboard-layout characters; CJK and other
        // IME-composed text goes in as committed input.
        if get_key_definition(text.as_str()).is_some() {
            self.inner
                .type_str(text)
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        } else {
            self.inner
                .focus()
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
            self.page
                .execute(InsertTextParams::new(text))
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        }
        tokio::time::sleep(delay).await;
        Ok(())
    }
}
