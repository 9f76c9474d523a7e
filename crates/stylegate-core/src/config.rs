//! Configuration for style audits
//!
//! Two things are configured here: the style rule table, which can come from
//! an inline JSON string, a JSON file or the built-in style guide, and the
//! audit run itself (URLs, selector, timeouts, password gate), loaded from
//! `stylegate.toml` and overridden by environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::fail_open::fail_open_sync;
use crate::rules::StyleRuleTable;
use crate::{Result, StyleGateError};

/// Inline rule table JSON
pub const ENV_RULES_JSON: &str = "STYLE_EXPECTATIONS_JSON";
/// Path to a rule table JSON file
pub const ENV_RULES_PATH: &str = "STYLE_EXPECTATIONS_PATH";
/// Comma separated list of pages to audit
pub const ENV_TARGET_URLS: &str = "TARGET_URLS";
/// Single page to audit, used when `TARGET_URLS` is unset
pub const ENV_TARGET_URL: &str = "TARGET_URL";
pub const ENV_ELEMENT_SELECTOR: &str = "ELEMENT_SELECTOR";
pub const ENV_TIMEOUT_MS: &str = "TEST_TIMEOUT_MS";
pub const ENV_LOGIN_PASSWORD: &str = "LOGIN_PASSWORD";

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "stylegate.toml";

/// Where a rule table should be read from, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTableSource {
    InlineJson(String),
    File(PathBuf),
    Builtin,
}

/// Where the rule table in use actually came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleTableOrigin {
    InlineJson,
    File { path: PathBuf },
    Builtin,
    /// The configured source could not be used
    BuiltinFallback { reason: String },
}

impl std::fmt::Display for RuleTableOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InlineJson => write!(f, "inline JSON"),
            Self::File { path } => write!(f, "file {}", path.display()),
            Self::Builtin => write!(f, "built-in style guide"),
            Self::BuiltinFallback { reason } => {
                write!(f, "built-in style guide (fallback: {})", reason)
            }
        }
    }
}

impl RuleTableSource {
    /// Pick a source from `STYLE_EXPECTATIONS_JSON` / `STYLE_EXPECTATIONS_PATH`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Pick a source using an arbitrary variable lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(json) = non_empty(ENV_RULES_JSON) {
            Self::InlineJson(json)
        } else if let Some(path) = non_empty(ENV_RULES_PATH) {
            Self::File(PathBuf::from(path))
        } else {
            Self::Builtin
        }
    }

    /// Read and parse the table without any fallback
    pub fn try_load(&self) -> Result<StyleRuleTable> {
        match self {
            Self::InlineJson(json) => StyleRuleTable::from_json(json)
                .map_err(|e| StyleGateError::ConfigLoad(format!("inline JSON: {}", e))),
            Self::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    StyleGateError::ConfigLoad(format!("{}: {}", path.display(), e))
                })?;
                StyleRuleTable::from_json(&content)
                    .map_err(|e| StyleGateError::ConfigLoad(format!("{}: {}", path.display(), e)))
            }
            Self::Builtin => Ok(StyleRuleTable::builtin()),
        }
    }

    /// Load the table, substituting the built-in style guide on any failure
    ///
    /// Never fails; problems with the configured source are logged as warnings.
    pub fn load(&self) -> (StyleRuleTable, RuleTableOrigin) {
        let origin = match self {
            Self::InlineJson(_) => RuleTableOrigin::InlineJson,
            Self::File(path) => RuleTableOrigin::File { path: path.clone() },
            Self::Builtin => RuleTableOrigin::Builtin,
        };

        match self.try_load() {
            Ok(table) => {
                info!("Loaded style rules from {}", origin);
                (table, origin)
            }
            Err(e) => {
                warn!("Could not load style rules ({}); using built-in style guide", e);
                (
                    StyleRuleTable::builtin(),
                    RuleTableOrigin::BuiltinFallback {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }
}

/// Load the rule table from the environment with built-in fallback
pub fn load_rule_table() -> (StyleRuleTable, RuleTableOrigin) {
    RuleTableSource::from_env().load()
}

/// Password gate shown in front of the pages under audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginConfig {
    pub password: String,

    /// Visible text of the button that opens the password form
    #[serde(default = "default_login_button_text")]
    pub button_text: String,

    /// `name` attribute of the password input
    #[serde(default = "default_password_input_name")]
    pub password_input_name: String,

    /// Pause after the post-login page load
    #[serde(default = "default_post_login_settle_ms")]
    pub post_login_settle_ms: u64,
}

impl LoginConfig {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            button_text: default_login_button_text(),
            password_input_name: default_password_input_name(),
            post_login_settle_ms: default_post_login_settle_ms(),
        }
    }
}

/// Browser window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Settings for one audit run
///
/// Loaded from `stylegate.toml`; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Pages to audit, in order
    #[serde(default = "default_target_urls")]
    pub target_urls: Vec<String>,

    /// CSS selector for the elements whose styles are checked
    #[serde(default = "default_element_selector")]
    pub element_selector: String,

    /// Overall budget per page; navigation gets this minus five seconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Pause after navigation for late rendering
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Rule table file, used when no rule source is set in the environment
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    /// Rule source chosen on the command line; beats environment and `rules_path`
    #[serde(skip)]
    pub rules_override: Option<RuleTableSource>,

    #[serde(default)]
    pub login: Option<LoginConfig>,

    #[serde(default)]
    pub browser: BrowserSettings,
}

// Default value providers
fn default_target_urls() -> Vec<String> {
    vec!["https://randys-worldwide.myshopify.com/".to_string()]
}

fn default_element_selector() -> String {
    "p, span, h1, h2, h3, h4, h5, h6, a, li, button, label, td, th, dd, dt, div".to_string()
}

fn default_timeout_ms() -> u64 {
    120_000
}

fn default_settle_ms() -> u64 {
    1_500
}

fn default_login_button_text() -> String {
    "Login using password".to_string()
}

fn default_password_input_name() -> String {
    "password".to_string()
}

fn default_post_login_settle_ms() -> u64 {
    1_000
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            target_urls: default_target_urls(),
            element_selector: default_element_selector(),
            timeout_ms: default_timeout_ms(),
            settle_ms: default_settle_ms(),
            rules_path: None,
            rules_override: None,
            login: None,
            browser: BrowserSettings::default(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: None,
        }
    }
}

/// Split a comma separated URL list, dropping blanks
pub fn parse_url_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

impl AuditConfig {
    /// Load `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            info!("Loaded audit config from {}", path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default configuration to `path`
    pub fn write_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Self::default()).map_err(|e| {
            StyleGateError::Other(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        self.apply_lookup(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let urls = lookup(ENV_TARGET_URLS)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| lookup(ENV_TARGET_URL));
        if let Some(urls) = urls {
            let parsed = parse_url_list(&urls);
            if !parsed.is_empty() {
                self.target_urls = parsed;
            }
        }

        if let Some(selector) = lookup(ENV_ELEMENT_SELECTOR).filter(|v| !v.trim().is_empty()) {
            self.element_selector = selector;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let parsed = fail_open_sync(ENV_TIMEOUT_MS, || {
                raw.trim().parse::<u64>().map_err(|e| {
                    StyleGateError::InvalidConfig(format!("{}={:?}: {}", ENV_TIMEOUT_MS, raw, e))
                })
            });
            if let Some(timeout_ms) = parsed {
                self.timeout_ms = timeout_ms;
            }
        }

        if let Some(password) = lookup(ENV_LOGIN_PASSWORD).filter(|v| !v.is_empty()) {
            match self.login.as_mut() {
                Some(login) => login.password = password,
                None => self.login = Some(LoginConfig::new(password)),
            }
        }
    }

    /// Rule source for this run: command line, environment, `rules_path`, then built-in
    pub fn rule_source(&self) -> RuleTableSource {
        self.rule_source_with(|key| std::env::var(key).ok())
    }

    /// Same as [`rule_source`](Self::rule_source) with an arbitrary variable lookup
    pub fn rule_source_with<F>(&self, lookup: F) -> RuleTableSource
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = &self.rules_override {
            return source.clone();
        }
        match RuleTableSource::from_lookup(lookup) {
            RuleTableSource::Builtin => match &self.rules_path {
                Some(path) => RuleTableSource::File(path.clone()),
                None => RuleTableSource::Builtin,
            },
            source => source,
        }
    }

    /// Time allowed for the initial page load
    pub fn navigation_timeout_ms(&self) -> u64 {
        self.timeout_ms.saturating_sub(5_000).max(1_000)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_urls.is_empty() {
            return Err(StyleGateError::InvalidConfig(
                "no target URLs configured".to_string(),
            ));
        }
        if self.element_selector.trim().is_empty() {
            return Err(StyleGateError::InvalidConfig(
                "element selector is empty".to_string(),
            ));
        }
        Ok(())
    }
}
