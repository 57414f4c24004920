//! Driver seam between the page model and a concrete browser.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageDriver (async trait)                                    │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │  ChromiumDriver              │  SimulatedDriver              │
//! │  (feature = "browser")       │  (always available)           │
//! │  CDP via chromiumoxide       │  in-memory todo application   │
//! └──────────────────────────────┴───────────────────────────────┘
//! ```
//!
//! Drivers are deliberately dumb: they resolve a [`Locator`] and act on the
//! first element it yields. Auto-waiting and strictness live in
//! [`crate::Page`] so both backends behave identically.

use crate::locator::Locator;
use crate::result::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time view of a resolved element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Lower-case tag name
    pub tag_name: String,
    /// Rendered text (visible descendants only)
    pub inner_text: String,
    /// Raw text content (all descendants)
    pub text_content: String,
    /// Whether the element is rendered and not hidden
    pub visible: bool,
    /// Whether the element accepts input (not `disabled`)
    pub enabled: bool,
    /// Element attributes
    pub attributes: BTreeMap<String, String>,
}

impl ElementSnapshot {
    /// Create a new snapshot for a visible, enabled element
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            visible: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Look up an attribute
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Keys the page model presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Enter / Return
    Enter,
}

impl Key {
    /// DOM `KeyboardEvent.key` value
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Enter => "Enter",
        }
    }

    /// Windows virtual key code used by CDP key events
    #[must_use]
    pub const fn key_code(self) -> i64 {
        match self {
            Self::Enter => 13,
        }
    }

    /// Text produced by the key
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Enter => "\r",
        }
    }
}

/// Low-level page operations a backend must provide.
///
/// Element-targeted operations act on the first element the locator resolves
/// to; callers are expected to have verified the match first.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL and wait for the load event
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Resolve the locator against the live DOM
    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>>;

    /// Replace the value of an input and fire input events
    async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()>;

    /// Focus the element and press a key
    async fn press(&self, locator: &Locator, key: Key) -> ProbeResult<()>;

    /// Move the pointer over the element
    async fn hover(&self, locator: &Locator) -> ProbeResult<()>;

    /// Click the element
    async fn click(&self, locator: &Locator) -> ProbeResult<()>;

    /// Capture a PNG screenshot, if the backend can render one
    async fn screenshot(&self) -> ProbeResult<Option<Vec<u8>>>;

    /// Current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Close the page
    async fn close(&self) -> ProbeResult<()>;
}

/// Source of fresh, isolated pages (one per scenario)
#[async_trait]
pub trait PageFactory: Send + Sync {
    /// Backend name for logs and reports
    fn name(&self) -> &str;

    /// Open a new page
    async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults() {
        let snap = ElementSnapshot::new("button");
        assert_eq!(snap.tag_name, "button");
        assert!(snap.visible);
        assert!(snap.enabled);
        assert!(snap.attribute("style").is_none());
    }

    #[test]
    fn test_snapshot_attribute_lookup() {
        let mut snap = ElementSnapshot::new("span");
        snap.attributes.insert(
            "style".to_string(),
            "text-decoration: line-through;".to_string(),
        );
        assert_eq!(
            snap.attribute("style"),
            Some("text-decoration: line-through;")
        );
    }

    #[test]
    fn test_key_metadata() {
        assert_eq!(Key::Enter.name(), "Enter");
        assert_eq!(Key::Enter.key_code(), 13);
        assert_eq!(Key::Enter.text(), "\r");
    }
}
