//! Result and error types for taskprobe.

use thiserror::Error;

/// Result type for taskprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a page or asserting on it
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error (creation, teardown, lost connection)
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A wait did not complete in time
    #[error("Timed out after {ms}ms waiting for {waiting_for} (last observed: {observed})")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waiting_for: String,
        /// Last state seen before giving up
        observed: String,
    },

    /// An action targeted a locator resolving to several elements
    #[error("Strict mode violation: {locator} resolved to {count} elements")]
    StrictModeViolation {
        /// Locator description
        locator: String,
        /// Number of matched elements
        count: usize,
    },

    /// The resolved element cannot receive the action
    #[error("Element {locator} is not actionable: {reason}")]
    NotActionable {
        /// Locator description
        locator: String,
        /// Why the action was refused
        reason: String,
    },

    /// Selector could not be parsed
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The offending selector
        selector: String,
        /// Error message
        message: String,
    },

    /// Script evaluation error
    #[error("Evaluation failed: {message}")]
    Evaluation {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Assertion failed, with expected and observed state
    #[error("Assertion failed: {assertion} on {locator}: expected {expected}, got {actual}")]
    AssertionFailed {
        /// Assertion name (e.g. `to_have_text`)
        assertion: String,
        /// Locator or value description
        locator: String,
        /// Expected state
        expected: String,
        /// Observed state
        actual: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Create an input error
    #[must_use]
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is an assertion mismatch rather than an automation failure
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}
