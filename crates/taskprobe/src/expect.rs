//! Retrying assertions (Playwright's `expect()`).
//!
//! `expect(&page, &locator).to_have_text("My Tasks").await?` re-queries the
//! locator until the condition holds or the locator timeout elapses, then
//! fails with the expected and last observed state.

use crate::driver::ElementSnapshot;
use crate::locator::{normalize_whitespace, Locator};
use crate::page::Page;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{wait_until, Poll, WaitOptions};
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

/// Assertion builder bound to a page and a locator
#[derive(Debug)]
pub struct Expect<'a> {
    page: &'a Page,
    locator: Locator,
}

/// Create an expectation for a locator
#[must_use]
pub fn expect<'a>(page: &'a Page, locator: &Locator) -> Expect<'a> {
    Expect {
        page,
        locator: locator.clone(),
    }
}

/// Assert two plain values are equal
pub fn expect_eq<T: PartialEq + Debug>(what: &str, expected: T, actual: T) -> ProbeResult<()> {
    if expected == actual {
        return Ok(());
    }
    Err(ProbeError::AssertionFailed {
        assertion: "to_equal".to_string(),
        locator: what.to_string(),
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    })
}

impl Expect<'_> {
    /// Override how long to keep retrying
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.locator = self.locator.with_timeout(timeout);
        self
    }

    /// Exactly one element, rendered
    pub async fn to_be_visible(&self) -> ProbeResult<()> {
        self.single("to_be_visible", "visible".to_string(), |el| {
            if el.visible {
                None
            } else {
                Some(format!("<{}> is hidden", el.tag_name))
            }
        })
        .await
    }

    /// No element, or a single hidden one
    pub async fn to_be_hidden(&self) -> ProbeResult<()> {
        self.retry("to_be_hidden", "hidden".to_string(), |matches| match matches {
            [] => Ok(Poll::Ready(())),
            [el] if !el.visible => Ok(Poll::Ready(())),
            [el] => Ok(Poll::Pending(format!("<{}> is visible", el.tag_name))),
            many => Err(self.strict(many.len())),
        })
        .await
    }

    /// Exactly one element, not disabled
    pub async fn to_be_enabled(&self) -> ProbeResult<()> {
        self.single("to_be_enabled", "enabled".to_string(), |el| {
            if el.enabled {
                None
            } else {
                Some(format!("<{}> is disabled", el.tag_name))
            }
        })
        .await
    }

    /// Exactly one element whose whitespace-normalized text equals `expected`
    pub async fn to_have_text(&self, expected: &str) -> ProbeResult<()> {
        let want = normalize_whitespace(expected);
        self.single("to_have_text", format!("{want:?}"), |el| {
            let got = normalize_whitespace(&el.inner_text);
            (got != want).then(|| format!("{got:?}"))
        })
        .await
    }

    /// Exactly one element whose text contains `expected`
    pub async fn to_contain_text(&self, expected: &str) -> ProbeResult<()> {
        let want = normalize_whitespace(expected);
        self.single("to_contain_text", format!("text containing {want:?}"), |el| {
            let got = normalize_whitespace(&el.inner_text);
            (!got.contains(&want)).then(|| format!("{got:?}"))
        })
        .await
    }

    /// Exactly one element with `name="value"`
    pub async fn to_have_attribute(&self, name: &str, value: &str) -> ProbeResult<()> {
        self.single(
            "to_have_attribute",
            format!("{name}={value:?}"),
            |el| match el.attribute(name) {
                Some(found) if found == value => None,
                Some(found) => Some(format!("{name}={found:?}")),
                None => Some(format!("no {name} attribute")),
            },
        )
        .await
    }

    /// The locator resolves to exactly `count` elements
    pub async fn to_have_count(&self, count: usize) -> ProbeResult<()> {
        self.retry("to_have_count", count.to_string(), |matches| {
            Ok(if matches.len() == count {
                Poll::Ready(())
            } else {
                Poll::Pending(matches.len().to_string())
            })
        })
        .await
    }

    fn strict(&self, count: usize) -> ProbeError {
        ProbeError::StrictModeViolation {
            locator: self.locator.to_string(),
            count,
        }
    }

    /// Retry a check on a single element; `mismatch` describes what was seen
    /// when the element does not satisfy it.
    async fn single<F>(&self, assertion: &str, expected: String, mismatch: F) -> ProbeResult<()>
    where
        F: Fn(&ElementSnapshot) -> Option<String> + Sync,
    {
        self.retry(assertion, expected, |matches| match matches {
            [] => Ok(Poll::Pending("no matching elements".to_string())),
            [el] => Ok(mismatch(el).map_or(Poll::Ready(()), Poll::Pending)),
            many => Err(self.strict(many.len())),
        })
        .await
    }

    async fn retry<F>(&self, assertion: &str, expected: String, check: F) -> ProbeResult<()>
    where
        F: Fn(&[ElementSnapshot]) -> ProbeResult<Poll<()>> + Sync,
    {
        let driver = self.page.driver();
        let locator = &self.locator;
        let check = &check;
        let outcome = wait_until(
            WaitOptions::from(*locator.options()),
            format!("{locator} {assertion}"),
            move || async move {
                let matches = driver.query(locator).await?;
                check(&matches)
            },
        )
        .await;

        match outcome {
            Ok(()) => {
                debug!(locator = %locator, assertion, "assertion passed");
                Ok(())
            }
            Err(ProbeError::Timeout { observed, .. }) => Err(ProbeError::AssertionFailed {
                assertion: assertion.to_string(),
                locator: locator.to_string(),
                expected,
                actual: observed,
            }),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::Key;
    use crate::locator::LocatorOptions;
    use crate::sim::SimulatedDriver;

    async fn page() -> Page {
        let page = Page::new(Box::new(SimulatedDriver::new()))
            .with_base_url("http://sim.local")
            .with_locator_options(LocatorOptions {
                timeout: Duration::from_millis(60),
                poll_interval: Duration::from_millis(5),
            });
        page.goto("/frontend/project-6").await.unwrap();
        page
    }

    async fn add(page: &Page, text: &str) {
        let input = page.locator("#input-add");
        page.fill(&input, text).await.unwrap();
        page.press(&input, Key::Enter).await.unwrap();
    }

    fn assert_failed(err: ProbeError, want_assertion: &str, want_actual: &str) {
        match err {
            ProbeError::AssertionFailed {
                assertion, actual, ..
            } => {
                assert_eq!(assertion, want_assertion);
                assert_eq!(actual, want_actual);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_expect_eq() {
            assert!(expect_eq("row count", 1, 1).is_ok());
            let err = expect_eq("row count", 1, 2).unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains("row count"));
        }
    }

    mod locator_tests {
        use super::*;

        #[tokio::test]
        async fn test_initial_state_passes() {
            let page = page().await;
            expect(&page, &page.locator(".panel")).to_be_visible().await.unwrap();
            expect(&page, &page.locator(".panel-heading"))
                .to_have_text("My Tasks")
                .await
                .unwrap();
            expect(&page, &page.locator("#search")).to_be_enabled().await.unwrap();
            expect(&page, &page.locator(".is-danger")).to_be_hidden().await.unwrap();
            expect(&page, &page.locator(".todo-item:not(.has-text-danger)"))
                .to_have_count(0)
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_text_mismatch_reports_actual() {
            let page = page().await;
            let err = expect(&page, &page.locator(".panel-heading"))
                .to_have_text("Your Tasks")
                .await
                .unwrap_err();
            assert_failed(err, "to_have_text", "\"My Tasks\"");
        }

        #[tokio::test]
        async fn test_count_mismatch_reports_actual() {
            let page = page().await;
            add(&page, "Task 1").await;
            let err = expect(&page, &page.locator(".todo-item:not(.has-text-danger)"))
                .to_have_count(3)
                .await
                .unwrap_err();
            assert_failed(err, "to_have_count", "1");
        }

        #[tokio::test]
        async fn test_attribute_and_contain_text() {
            let page = page().await;
            add(&page, "Task 1").await;
            let toggle = page.locator(".toggle");
            expect(&page, &toggle).to_contain_text("Task").await.unwrap();

            let err = expect(&page, &toggle)
                .to_have_attribute("style", "text-decoration: line-through;")
                .await
                .unwrap_err();
            assert_failed(err, "to_have_attribute", "no style attribute");

            page.click(&toggle).await.unwrap();
            expect(&page, &toggle)
                .to_have_attribute("style", "text-decoration: line-through;")
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_missing_element_fails_visible() {
            let page = page().await;
            let err = expect(&page, &page.locator(".is-danger"))
                .with_timeout(Duration::from_millis(20))
                .to_be_visible()
                .await
                .unwrap_err();
            assert_failed(err, "to_be_visible", "no matching elements");
        }

        #[tokio::test]
        async fn test_multiple_matches_are_strict() {
            let page = page().await;
            add(&page, "Task 1").await;
            add(&page, "Task 2").await;
            let err = expect(&page, &page.locator(".toggle"))
                .to_have_text("Task 1")
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ProbeError::StrictModeViolation { count: 2, .. }
            ));
        }
    }
}
