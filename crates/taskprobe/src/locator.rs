//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a recipe, not a handle: it is re-resolved against the live
//! DOM on every operation, so it never goes stale when rows are added or
//! removed underneath it.
//!
//! # Design
//!
//! - **Lazy**: nothing is queried until a [`crate::Page`] operation runs
//! - **Chainable**: `Locator::new(".todo-item").filter_has_text("Task 1").locator(".destroy")`
//! - **Portable**: the same chain is rendered to JavaScript for Chromium and
//!   resolved natively by the simulated backend

use std::fmt;
use std::time::Duration;

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Scoped CSS query from every current match (the document for the first step)
    Css(String),
    /// Keep matches whose text content contains the text
    /// (case-insensitive, whitespace-normalized)
    HasText(String),
    /// Keep only the n-th match (zero based)
    Nth(usize),
}

/// Locator options for customizing behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Timeout for auto-waiting
    pub timeout: Duration,
    /// Polling interval for auto-waiting
    pub poll_interval: Duration,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// A lazily evaluated reference to zero or more elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    steps: Vec<Step>,
    options: LocatorOptions,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            steps: vec![Step::Css(selector.into())],
            options: LocatorOptions::default(),
        }
    }

    /// Narrow to descendants of every current match
    #[must_use]
    pub fn locator(&self, selector: impl Into<String>) -> Self {
        self.push(Step::Css(selector.into()))
    }

    /// Keep matches containing the text
    ///
    /// Mirrors `locator.filter({ hasText })`: substring, case-insensitive.
    #[must_use]
    pub fn filter_has_text(&self, text: impl Into<String>) -> Self {
        self.push(Step::HasText(text.into()))
    }

    /// First match only
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// The n-th match only (zero based)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.push(Step::Nth(index))
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set a custom polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self
    }

    /// Replace all options at once
    #[must_use]
    pub const fn with_options(mut self, options: LocatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the steps
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    fn push(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self {
            steps,
            options: self.options,
        }
    }

    /// Render the chain as a JavaScript expression evaluating to an array of
    /// elements in document order.
    #[must_use]
    pub fn to_js_query(&self) -> String {
        let mut js = String::from(
            "(() => {\n\
             const norm = (s) => (s || '').replace(/\\s+/g, ' ').trim().toLowerCase();\n\
             let els = [document];\n",
        );
        for step in &self.steps {
            match step {
                Step::Css(selector) => {
                    js.push_str(&format!(
                        "els = (() => {{ const out = []; for (const root of els) {{ \
                         for (const el of root.querySelectorAll({})) {{ if (!out.includes(el)) out.push(el); }} }} \
                         return out.sort((a, b) => (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING) ? -1 : 1); }})();\n",
                        js_string(selector)
                    ));
                }
                Step::HasText(text) => {
                    js.push_str(&format!(
                        "els = els.filter((el) => norm(el.textContent).includes(norm({})));\n",
                        js_string(text)
                    ));
                }
                Step::Nth(index) => {
                    js.push_str(&format!(
                        "els = els.length > {index} ? [els[{index}]] : [];\n"
                    ));
                }
            }
        }
        js.push_str("return els;\n})()");
        js
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match step {
                Step::Css(selector) => write!(f, "locator({selector:?})")?,
                Step::HasText(text) => write!(f, "filter(has_text={text:?})")?,
                Step::Nth(0) => f.write_str("first()")?,
                Step::Nth(index) => write!(f, "nth({index})")?,
            }
        }
        Ok(())
    }
}

/// Encode a Rust string as a JavaScript string literal
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Collapse whitespace runs to single spaces and trim, the way text
/// assertions compare rendered text.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text filter semantics shared by both backends
#[must_use]
pub fn text_matches(haystack: &str, needle: &str) -> bool {
    normalize_whitespace(haystack)
        .to_lowercase()
        .contains(&normalize_whitespace(needle).to_lowercase())
}
