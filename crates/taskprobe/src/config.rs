//! Suite configuration.
//!
//! Loaded from YAML; every field is optional and falls back to the defaults
//! below.
//!
//! ```yaml
//! base_url: https://techglobal-training.com
//! timeout_ms: 5000
//! jobs: 2
//! browser:
//!   headless: true
//! ```

use crate::locator::LocatorOptions;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the todo application is hosted
pub const DEFAULT_BASE_URL: &str = "https://techglobal-training.com";

/// Default whole-scenario timeout (60 seconds)
pub const DEFAULT_SCENARIO_TIMEOUT_MS: u64 = 60_000;

/// Chromium launch options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,
    /// Chromium executable; discovered automatically when unset
    pub chromium_path: Option<PathBuf>,
    /// Keep the Chromium sandbox enabled
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the Chromium executable
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable the sandbox (needed in most containers)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Everything a suite run needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Name used in reports
    pub suite_name: String,
    /// Scheme and host of the application
    pub base_url: String,
    /// Path of the application under `base_url`
    pub app_path: String,
    /// Auto-wait timeout for actions and assertions
    pub timeout_ms: u64,
    /// Auto-wait polling interval
    pub poll_interval_ms: u64,
    /// Upper bound for one whole scenario
    pub scenario_timeout_ms: u64,
    /// Scenarios run concurrently
    pub jobs: usize,
    /// Skip remaining scenarios after the first failure
    pub fail_fast: bool,
    /// Where failure screenshots go
    pub artifacts_dir: Option<PathBuf>,
    /// Chromium launch options
    pub browser: BrowserConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            suite_name: "taskprobe".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            app_path: crate::todo_page::TODO_APP_PATH.to_string(),
            timeout_ms: crate::locator::DEFAULT_TIMEOUT_MS,
            poll_interval_ms: crate::locator::DEFAULT_POLL_INTERVAL_MS,
            scenario_timeout_ms: DEFAULT_SCENARIO_TIMEOUT_MS,
            jobs: 1,
            fail_fast: false,
            artifacts_dir: None,
            browser: BrowserConfig::default(),
        }
    }
}

impl SuiteConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_yaml_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if !self.app_path.starts_with('/') {
            return Err(ProbeError::config(format!(
                "app_path must start with '/', got '{}'",
                self.app_path
            )));
        }
        if self.jobs == 0 {
            return Err(ProbeError::config("jobs must be at least 1"));
        }
        if self.timeout_ms == 0 || self.scenario_timeout_ms == 0 {
            return Err(ProbeError::config("timeouts must be positive"));
        }
        Ok(())
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the auto-wait timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the auto-wait polling interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the whole-scenario timeout
    #[must_use]
    pub const fn with_scenario_timeout_ms(mut self, ms: u64) -> Self {
        self.scenario_timeout_ms = ms;
        self
    }

    /// Set concurrency
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Enable fail-fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set the screenshot directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Set the browser options
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Full application URL
    #[must_use]
    pub fn app_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.app_path.trim_start_matches('/')
        )
    }

    /// Auto-wait options for locators
    #[must_use]
    pub const fn locator_options(&self) -> LocatorOptions {
        LocatorOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    /// Whole-scenario timeout
    #[must_use]
    pub const fn scenario_timeout(&self) -> Duration {
        Duration::from_millis(self.scenario_timeout_ms)
    }
}
