//! Browser lifecycle management using Chrome DevTools Protocol

use crate::error::{Result, StyleGateError};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use stylegate_core::BrowserSettings;
use tracing::{debug, info};

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// User agent string
    pub user_agent: Option<String>,
    /// Default timeout for navigation and element waits
    pub timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserConfig {
    /// Build a launch config from audit settings and a navigation timeout
    pub fn from_settings(settings: &BrowserSettings, timeout: Duration) -> Self {
        Self {
            headless: settings.headless,
            window_width: settings.window_width,
            window_height: settings.window_height,
            user_agent: settings.user_agent.clone(),
            timeout,
        }
    }
}

/// Active browser session with Chrome DevTools Protocol
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    browser: Browser,
    /// Current active tab
    tab: Arc<Tab>,
    /// Configuration
    config: BrowserConfig,
}

impl BrowserSession {
    /// Launch a new browser instance
    ///
    /// # Example
    /// ```no_run
    /// use stylegate_browser::browser::BrowserSession;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let session = BrowserSession::launch().await.unwrap();
    ///     session.navigate("https://example.com").await.unwrap();
    /// }
    /// ```
    pub async fn launch() -> Result<Self> {
        Self::launch_with_config(BrowserConfig::default()).await
    }

    /// Launch browser with custom configuration
    pub async fn launch_with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            config.headless, config.window_width, config.window_height
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .build()
            .map_err(|e| StyleGateError::Browser(format!("Failed to launch browser: {}", e)))?;

        let user_agent_arg: Option<String> = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));
        if let Some(ref ua_arg) = user_agent_arg {
            launch_options.args.push(OsStr::new(ua_arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| StyleGateError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| StyleGateError::Browser(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(config.timeout);

        info!("Browser launched successfully");

        Ok(Self {
            browser,
            tab,
            config,
        })
    }

    /// Navigate to a URL and wait for the load to finish
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab.navigate_to(url).map_err(|e| StyleGateError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| StyleGateError::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {:?}: {}", self.config.timeout, e),
            })?;

        info!("Successfully navigated to {}", url);
        Ok(())
    }

    /// Wait for a pending navigation (form submit, redirect) to settle
    pub async fn wait_until_navigated(&self) -> Result<()> {
        self.tab
            .wait_until_navigated()
            .map_err(|e| StyleGateError::Browser(format!("Navigation did not settle: {}", e)))?;
        Ok(())
    }

    /// Pause for late rendering
    pub async fn settle(&self, millis: u64) {
        if millis > 0 {
            debug!("Settling for {}ms", millis);
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    /// Click the first element matching `xpath` if it shows up visible within `timeout`
    ///
    /// Returns `false` when no such element appears.
    pub async fn click_visible_xpath(&self, xpath: &str, timeout: Duration) -> Result<bool> {
        debug!("Looking for {} (timeout: {:?})", xpath, timeout);

        let element = match self.tab.wait_for_xpath_with_custom_timeout(xpath, timeout) {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };

        let visible = element
            .call_js_fn(IS_VISIBLE_FN, vec![], false)
            .map_err(|e| StyleGateError::Browser(format!("Visibility check failed: {}", e)))?
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if !visible {
            debug!("Element {} present but hidden", xpath);
            return Ok(false);
        }

        element
            .click()
            .map_err(|e| StyleGateError::Browser(format!("Failed to click {}: {}", xpath, e)))?;
        Ok(true)
    }

    /// Whether the first element matching `selector` is present and visible right now
    pub async fn is_element_visible(&self, selector: &str) -> Result<bool> {
        let element = match self.tab.find_element(selector) {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };

        let visible = element
            .call_js_fn(IS_VISIBLE_FN, vec![], false)
            .map_err(|e| self.classify(format!("Visibility check failed: {}", e)))?
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Ok(visible)
    }

    /// Focus the element matching `selector` and type `text` into it
    pub async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.tab.find_element(selector).map_err(|e| {
            StyleGateError::Browser(format!("Element not found: {}: {}", selector, e))
        })?;
        element
            .click()
            .map_err(|e| StyleGateError::Browser(format!("Failed to focus {}: {}", selector, e)))?;
        self.tab.type_str(text).map_err(|e| {
            StyleGateError::Browser(format!("Failed to type into {}: {}", selector, e))
        })?;
        Ok(())
    }

    /// Press a named key (`"Enter"`, `"Tab"`) in the focused element
    pub async fn press_key(&self, key: &str) -> Result<()> {
        self.tab
            .press_key(key)
            .map_err(|e| StyleGateError::Browser(format!("Failed to press {}: {}", key, e)))?;
        Ok(())
    }

    /// Execute JavaScript in the page context
    ///
    /// # Returns
    /// JSON result from JavaScript execution; only primitive results carry a value
    pub async fn evaluate_script(&self, script: &str) -> Result<serde_json::Value> {
        debug!("Evaluating JavaScript ({} bytes)", script.len());

        let result = self.tab.evaluate(script, false).map_err(|e| {
            self.classify(format!("JavaScript evaluation failed: {}", e))
        })?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Fail with `CollaboratorUnavailable` if the browser or tab has gone away
    pub async fn ensure_alive(&self) -> Result<()> {
        self.probe_alive()
    }

    pub(crate) fn probe_alive(&self) -> Result<()> {
        self.browser.get_version().map_err(|e| {
            StyleGateError::CollaboratorUnavailable(format!("browser not responding: {}", e))
        })?;
        self.tab.evaluate("document.readyState", false).map_err(|e| {
            StyleGateError::CollaboratorUnavailable(format!("page not responding: {}", e))
        })?;
        Ok(())
    }

    /// Turn a failure into `CollaboratorUnavailable` when the browser is gone
    pub(crate) fn classify(&self, message: String) -> StyleGateError {
        match self.probe_alive() {
            Ok(()) => StyleGateError::Browser(message),
            Err(gone) => gone,
        }
    }

    /// Get reference to the active tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Close the browser session
    pub async fn close(self) -> Result<()> {
        info!("Closing browser session");
        // Browser will be dropped and cleaned up automatically
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("BrowserSession dropped, browser will be cleaned up");
    }
}

/// `this`-bound visibility check, falling back to layout boxes where `checkVisibility` is missing
pub(crate) const IS_VISIBLE_FN: &str = r#"function() {
    if (typeof this.checkVisibility === 'function') {
        return this.checkVisibility();
    }
    return this.getClientRects().length > 0;
}"#;
