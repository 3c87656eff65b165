//! Rendering engine for pages that only reveal content after running script
//!
//! [`Renderer`] opens a [`RenderSession`] on a URL; the session evaluates
//! extraction scripts against the live DOM and must be closed by its owner.
//! [`ChromeRenderer`] is the headless Chrome implementation. Chrome's CDP
//! client is blocking, so every call runs on the blocking thread pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use thiserror::Error;

use crate::scraper::USER_AGENTS;

/// Errors that can occur during a rendering session
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("JavaScript execution error: {0}")]
    Script(String),

    #[error("Failed to close session: {0}")]
    Close(String),

    #[error("Rendering task failed: {0}")]
    Join(String),
}

/// When navigation counts as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// The load event fired
    Load,
    /// The document is complete and no new resources started for a quiet period
    NetworkIdle,
}

/// Generic "render URL and execute page script" capability
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Load `url` in a fresh session and wait according to `wait_until`
    async fn open(
        &self,
        url: &str,
        wait_until: WaitUntil,
    ) -> Result<Box<dyn RenderSession>, RenderError>;
}

/// A live page owned by exactly one caller
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Evaluate `script` in the page and return its result
    ///
    /// Scripts returning `JSON.stringify(...)` come back decoded.
    async fn evaluate(&self, script: &str) -> Result<Value, RenderError>;

    /// Release the session; consuming `self` makes a second close impossible
    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}

/// Configuration for headless browser
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Upper bound for navigation plus the network idle wait
    pub navigation_timeout: Duration,
    /// How long the resource count must stay unchanged to count as idle
    pub idle_quiet_period: Duration,
    pub user_agent: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            navigation_timeout: Duration::from_secs(30),
            idle_quiet_period: Duration::from_millis(500),
            user_agent: USER_AGENTS[0].to_string(),
        }
    }
}

/// Renderer launching one headless Chrome per session
#[derive(Debug, Clone, Default)]
pub struct ChromeRenderer {
    config: BrowserConfig,
}

impl ChromeRenderer {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Build Chrome launch options from our config
    fn build_launch_options(config: &BrowserConfig) -> Result<LaunchOptions<'static>, RenderError> {
        LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some(config.window_size))
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))
    }

    fn open_blocking(
        config: &BrowserConfig,
        url: &str,
        wait_until: WaitUntil,
    ) -> Result<ChromeSession, RenderError> {
        let options = Self::build_launch_options(config)?;
        let browser = Browser::new(options).map_err(|e| RenderError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // From here on the session owns the browser, so an early return still shuts it down.
        let session = ChromeSession {
            browser: Some(browser),
            tab,
        };

        session.tab.set_default_timeout(config.navigation_timeout);
        session
            .tab
            .set_user_agent(&config.user_agent, None, None)
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        tracing::info!("Rendering {}", url);
        session
            .tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        if wait_until == WaitUntil::NetworkIdle {
            wait_for_network_idle(&session.tab, config)?;
        }

        Ok(session)
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn open(
        &self,
        url: &str,
        wait_until: WaitUntil,
    ) -> Result<Box<dyn RenderSession>, RenderError> {
        let config = self.config.clone();
        let url = url.to_string();

        let session = tokio::task::spawn_blocking(move || {
            Self::open_blocking(&config, &url, wait_until)
        })
        .await
        .map_err(|e| RenderError::Join(e.to_string()))??;

        Ok(Box::new(session))
    }
}

/// Polls the page until it is complete and its resource count stops growing
fn wait_for_network_idle(tab: &Tab, config: &BrowserConfig) -> Result<(), RenderError> {
    const PROBE: &str =
        "document.readyState + '|' + performance.getEntriesByType('resource').length";

    let started = Instant::now();
    let mut last_count: Option<u64> = None;
    let mut quiet_since = Instant::now();

    loop {
        let probe = tab
            .evaluate(PROBE, false)
            .map_err(|e| RenderError::Script(e.to_string()))?
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let (state, count) = probe.split_once('|').unwrap_or((probe.as_str(), ""));
        let count = count.parse::<u64>().ok();

        if last_count != count {
            last_count = count;
            quiet_since = Instant::now();
        } else if state == "complete" && quiet_since.elapsed() >= config.idle_quiet_period {
            return Ok(());
        }

        if started.elapsed() > config.navigation_timeout {
            return Err(RenderError::Navigation(format!(
                "network did not become idle within {:?}",
                config.navigation_timeout
            )));
        }

        std::thread::sleep(Duration::from_millis(100));
    }
}

/// One browser process plus the tab it rendered into
struct ChromeSession {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl ChromeSession {
    fn shutdown(&mut self) -> Result<(), RenderError> {
        let closed = self
            .tab
            .close(true)
            .map(|_| ())
            .map_err(|e| RenderError::Close(e.to_string()));
        // Dropping the browser terminates the Chrome process.
        self.browser.take();
        closed
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if self.browser.is_some() {
            let _ = self.shutdown();
        }
    }
}

#[async_trait]
impl RenderSession for ChromeSession {
    async fn evaluate(&self, script: &str) -> Result<Value, RenderError> {
        let tab = Arc::clone(&self.tab);
        let script = script.to_string();

        let value = tokio::task::spawn_blocking(move || {
            tab.evaluate(&script, true)
                .map(|object| object.value)
                .map_err(|e| RenderError::Script(e.to_string()))
        })
        .await
        .map_err(|e| RenderError::Join(e.to_string()))??;

        Ok(decode_script_result(value))
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        tokio::task::spawn_blocking(move || {
            let mut session = *self;
            session.shutdown()
        })
            .await
            .map_err(|e| RenderError::Join(e.to_string()))?
    }
}

/// Scripts hand back structured data as JSON text; decode it when possible
fn decode_script_result(value: Option<Value>) -> Value {
    match value {
        Some(Value::String(text)) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        Some(other) => other,
        None => Value::Null,
    }
}
