//! Driver-agnostic page handle with auto-waiting actions.
//!
//! Every element action waits until its locator resolves to exactly one
//! element that can receive it. Zero matches, a hidden element or a disabled
//! control keep the wait going; several matches fail at once, since acting on
//! an arbitrary one of them would make the test order-dependent.

use crate::driver::{ElementSnapshot, Key, PageDriver};
use crate::locator::{Locator, LocatorOptions};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{wait_until, Poll, WaitOptions};
use tracing::{debug, info};

/// What an element must satisfy before an operation proceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Actionability {
    visible: bool,
    enabled: bool,
}

impl Actionability {
    const ATTACHED: Self = Self {
        visible: false,
        enabled: false,
    };
    const VISIBLE: Self = Self {
        visible: true,
        enabled: false,
    };
    const EDITABLE: Self = Self {
        visible: true,
        enabled: true,
    };

    fn describe(self) -> &'static str {
        match (self.visible, self.enabled) {
            (true, true) => "visible and enabled",
            (true, false) => "visible",
            _ => "attached",
        }
    }
}

/// A browser page bound to one driver instance.
///
/// Owned by exactly one page model for the lifetime of one scenario.
pub struct Page {
    driver: Box<dyn PageDriver>,
    base_url: String,
    defaults: LocatorOptions,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("base_url", &self.base_url)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl Page {
    /// Wrap a driver
    #[must_use]
    pub fn new(driver: Box<dyn PageDriver>) -> Self {
        Self {
            driver,
            base_url: String::new(),
            defaults: LocatorOptions::default(),
        }
    }

    /// Set the base URL relative paths are resolved against
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the default timeout and poll interval for locators built by this page
    #[must_use]
    pub const fn with_locator_options(mut self, options: LocatorOptions) -> Self {
        self.defaults = options;
        self
    }

    /// Build a locator carrying this page's default options
    #[must_use]
    pub fn locator(&self, selector: impl Into<String>) -> Locator {
        Locator::new(selector).with_options(self.defaults)
    }

    /// The underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// Resolve `target` against the base URL unless it is already absolute
    #[must_use]
    pub fn resolve_url(&self, target: &str) -> String {
        if target.contains("://") || target.starts_with("about:") || self.base_url.is_empty() {
            return target.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            target.trim_start_matches('/')
        )
    }

    /// Navigate to an absolute URL or a path under the base URL
    pub async fn goto(&self, target: &str) -> ProbeResult<()> {
        let url = self.resolve_url(target);
        info!(url = %url, "navigating");
        self.driver.navigate(&url).await
    }

    /// Current URL
    pub async fn url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Number of elements the locator resolves to right now
    pub async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        Ok(self.driver.query(locator).await?.len())
    }

    /// Inner text of every match, in document order, without waiting
    pub async fn all_inner_texts(&self, locator: &Locator) -> ProbeResult<Vec<String>> {
        Ok(self
            .driver
            .query(locator)
            .await?
            .into_iter()
            .map(|el| el.inner_text)
            .collect())
    }

    /// Inner text of the single match
    pub async fn inner_text(&self, locator: &Locator) -> ProbeResult<String> {
        let el = self.wait_for_single(locator, Actionability::ATTACHED).await?;
        Ok(el.inner_text)
    }

    /// Attribute value of the single match
    pub async fn get_attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        let el = self.wait_for_single(locator, Actionability::ATTACHED).await?;
        Ok(el.attributes.get(name).cloned())
    }

    /// Whether the locator currently resolves to a visible element.
    ///
    /// Does not wait; zero matches is `false`.
    pub async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        let matches = self.driver.query(locator).await?;
        match matches.as_slice() {
            [] => Ok(false),
            [el] => Ok(el.visible),
            many => Err(ProbeError::StrictModeViolation {
                locator: locator.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Whether the single match is enabled
    pub async fn is_enabled(&self, locator: &Locator) -> ProbeResult<bool> {
        let el = self.wait_for_single(locator, Actionability::ATTACHED).await?;
        Ok(el.enabled)
    }

    /// Replace the value of an input
    pub async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        self.wait_for_single(locator, Actionability::EDITABLE).await?;
        debug!(locator = %locator, text, "fill");
        self.driver.fill(locator, text).await
    }

    /// Press a key on the element
    pub async fn press(&self, locator: &Locator, key: Key) -> ProbeResult<()> {
        self.wait_for_single(locator, Actionability::EDITABLE).await?;
        debug!(locator = %locator, key = key.name(), "press");
        self.driver.press(locator, key).await
    }

    /// Hover the pointer over the element
    pub async fn hover(&self, locator: &Locator) -> ProbeResult<()> {
        self.wait_for_single(locator, Actionability::VISIBLE).await?;
        debug!(locator = %locator, "hover");
        self.driver.hover(locator).await
    }

    /// Click the element
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.wait_for_single(locator, Actionability::EDITABLE).await?;
        debug!(locator = %locator, "click");
        self.driver.click(locator).await
    }

    /// Capture a screenshot if the backend supports it
    pub async fn screenshot(&self) -> ProbeResult<Option<Vec<u8>>> {
        self.driver.screenshot().await
    }

    /// Close the page
    pub async fn close(&self) -> ProbeResult<()> {
        self.driver.close().await
    }

    async fn wait_for_single(
        &self,
        locator: &Locator,
        required: Actionability,
    ) -> ProbeResult<ElementSnapshot> {
        let driver = self.driver.as_ref();
        wait_until(
            WaitOptions::from(*locator.options()),
            format!("{locator} to be {}", required.describe()),
            move || async move {
                let mut matches = driver.query(locator).await?;
                match matches.len() {
                    0 => Ok(Poll::Pending("no matching elements".to_string())),
                    1 => {
                        let el = matches.remove(0);
                        if required.visible && !el.visible {
                            Ok(Poll::Pending(format!("<{}> is hidden", el.tag_name)))
                        } else if required.enabled && !el.enabled {
                            Ok(Poll::Pending(format!("<{}> is disabled", el.tag_name)))
                        } else {
                            Ok(Poll::Ready(el))
                        }
                    }
                    count => Err(ProbeError::StrictModeViolation {
                        locator: locator.to_string(),
                        count,
                    }),
                }
            },
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sim::SimulatedDriver;
    use std::time::Duration;

    const APP: &str = "http://sim.local/frontend/project-6";

    async fn page() -> Page {
        let page = Page::new(Box::new(SimulatedDriver::new()))
            .with_base_url("http://sim.local")
            .with_locator_options(LocatorOptions {
                timeout: Duration::from_millis(100),
                poll_interval: Duration::from_millis(5),
            });
        page.goto("/frontend/project-6").await.unwrap();
        page
    }

    mod url_tests {
        use super::*;

        #[test]
        fn test_resolve_relative_and_absolute() {
            let page = Page::new(Box::new(SimulatedDriver::new())).with_base_url("http://h/");
            assert_eq!(page.resolve_url("/a/b"), "http://h/a/b");
            assert_eq!(page.resolve_url("a"), "http://h/a");
            assert_eq!(page.resolve_url("https://x/y"), "https://x/y");
            assert_eq!(page.resolve_url("about:blank"), "about:blank");
        }

        #[tokio::test]
        async fn test_goto_records_url() {
            let page = page().await;
            assert_eq!(page.url().await.unwrap(), APP);
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_and_press_adds_row() {
            let page = page().await;
            let input = page.locator("#input-add");
            page.fill(&input, "Buy milk").await.unwrap();
            page.press(&input, Key::Enter).await.unwrap();

            let rows = page.locator(".todo-item:not(.has-text-danger)");
            assert_eq!(page.count(&rows).await.unwrap(), 1);
            assert_eq!(page.inner_text(&rows).await.unwrap(), "Buy milk");
        }

        #[tokio::test]
        async fn test_strict_violation_is_immediate() {
            let page = page().await;
            let input = page.locator("#input-add");
            for label in ["a", "b"] {
                page.fill(&input, label).await.unwrap();
                page.press(&input, Key::Enter).await.unwrap();
            }
            let rows = page
                .locator(".todo-item:not(.has-text-danger)")
                .with_timeout(Duration::from_secs(30));

            let started = std::time::Instant::now();
            let err = page.click(&rows).await.unwrap_err();
            assert!(matches!(
                err,
                ProbeError::StrictModeViolation { count: 2, .. }
            ));
            assert!(started.elapsed() < Duration::from_secs(5));
        }

        #[tokio::test]
        async fn test_click_hidden_control_times_out() {
            let page = page().await;
            let input = page.locator("#input-add");
            page.fill(&input, "Task 1").await.unwrap();
            page.press(&input, Key::Enter).await.unwrap();

            let destroy = page.locator(".todo-item .destroy");
            let err = page.click(&destroy).await.unwrap_err();
            match err {
                ProbeError::Timeout { observed, .. } => assert!(observed.contains("hidden")),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_missing_element_times_out() {
            let page = page().await;
            let err = page
                .inner_text(&page.locator("#does-not-exist"))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { ms: 100, .. }));
        }
    }

    mod read_tests {
        use super::*;

        #[tokio::test]
        async fn test_is_visible_without_match_is_false() {
            let page = page().await;
            assert!(!page.is_visible(&page.locator(".is-danger")).await.unwrap());
            assert!(page.is_visible(&page.locator(".panel")).await.unwrap());
        }

        #[tokio::test]
        async fn test_is_enabled_and_attribute() {
            let page = page().await;
            assert!(page.is_enabled(&page.locator("#add-btn")).await.unwrap());
            assert_eq!(
                page.get_attribute(&page.locator(".panel"), "id")
                    .await
                    .unwrap()
                    .as_deref(),
                Some("panel")
            );
        }
    }
}
