use crate::error::Result;
use async_trait::async_trait;
use jobtrawl_core::BrowserSettings;
use std::time::Duration;

/// Starts automation sessions.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Driver handed out for one session
    type Driver: PageDriver;

    /// Start a browser and open the single working page.
    async fn launch(&self, settings: &BrowserSettings) -> Result<Self::Driver>;
}

/// One live page. Owned exclusively by whoever drives the crawl.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Element handle type
    type Element: ElementHandle;

    /// Navigate and wait for the load, bounded by `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Address of the current document
    async fn current_url(&self) -> Result<String>;

    /// Serialized HTML of the current document
    async fn content(&self) -> Result<String>;

    /// Document title
    async fn title(&self) -> Result<String>;

    /// First element matched by any candidate, tried in order.
    async fn find_first(&self, candidates: &[String]) -> Result<Option<Self::Element>>;

    /// All elements of the first candidate that matches at least one.
    async fn find_all(&self, candidates: &[String]) -> Result<Vec<Self::Element>>;

    /// Wait until any candidate matches and return that candidate.
    async fn wait_for(&self, candidates: &[String], timeout: Duration) -> Result<String>;

    /// Register a script that runs in every new document before page scripts.
    async fn inject_behavior_script(&self, script: &str) -> Result<()>;

    /// Move the pointer around in a few human-paced gestures.
    async fn simulate_human_pointer_movement(&self) -> Result<()>;

    /// Scroll to the end of the document
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Close the page and the browser behind it.
    async fn close(&mut self) -> Result<()>;
}

/// Element actions for automation
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Rendered text, empty when the element has none
    async fn text(&self) -> Result<String>;

    /// Attribute value
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Click, bounded by `timeout`.
    async fn click(&self, timeout: Duration) -> Result<()>;

    /// Whether the element currently takes up space on screen.
    async fn is_visible(&self) -> Result<bool>;

    /// Replace an input's value without key events.
    async fn fill(&self, value: &str) -> Result<()>;

    /// Select the input's current contents
    async fn select_all(&self) -> Result<()>;

    /// Press a named key such as `Backspace` or `Enter`.
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Type one character, then wait `delay`.
    async fn type_char(&self, ch: char, delay: Duration) -> Result<()>;
}
