//! End-to-end runs of the scenario suite on the simulated backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use taskprobe::scenarios;
use taskprobe::sim::AppOptions;
use taskprobe::todo_page::{duplicate_warning, EMPTY_STATE, LENGTH_WARNING, LONG_TASK};
use taskprobe::{
    expect, ElementSnapshot, Key, Locator, LocatorOptions, Page, PageDriver, PageFactory,
    ProbeError, ProbeResult, Reporter, SimulatedBrowser, SimulatedDriver, SuiteConfig,
    TestHarness, TodoPage,
};
use tokio::sync::mpsc;

fn fast_config() -> SuiteConfig {
    SuiteConfig::new()
        .with_base_url("http://sim.local")
        .with_timeout_ms(150)
        .with_poll_interval_ms(5)
}

async fn open(browser: &SimulatedBrowser) -> TodoPage {
    let page = Page::new(browser.new_page().await.unwrap())
        .with_base_url("http://sim.local")
        .with_locator_options(LocatorOptions {
            timeout: Duration::from_millis(150),
            poll_interval: Duration::from_millis(5),
        });
    let todo = TodoPage::new(page);
    todo.goto().await.unwrap();
    todo
}

// ============================================================================
// Suite
// ============================================================================

#[tokio::test]
async fn test_suite_passes_and_reports() {
    let results = TestHarness::new(fast_config().with_jobs(5))
        .run(&SimulatedBrowser::new(), &scenarios::filter(None))
        .await;
    assert!(results.all_passed(), "{:?}", results.failures());

    let reporter = Reporter::new(&results);
    assert!(reporter.summary().contains("5/5 passed (100.0%)"));
    let xml = reporter.render_junit();
    assert_eq!(xml.matches("<testcase ").count(), 5);
    assert!(!xml.contains("<failure"));
}

#[tokio::test]
async fn test_each_scenario_runs_alone() {
    for scenario in scenarios::all() {
        let results = TestHarness::new(fast_config())
            .run(&SimulatedBrowser::new(), &[scenario])
            .await;
        assert!(results.all_passed(), "{}: {:?}", scenario.id, results.failures());
    }
}

#[tokio::test]
async fn test_shorter_length_limit_breaks_validation_scenario() {
    let browser = SimulatedBrowser::with_options(AppOptions {
        max_chars: 5,
        ..AppOptions::default()
    });
    let results = TestHarness::new(fast_config())
        .run(&browser, &scenarios::filter(Some("validation")))
        .await;
    assert_eq!(results.failed_count(), 1);
}

/// An input event waiting to reach the application
enum Event {
    Fill(Locator, String),
    Press(Locator, Key),
    Hover(Locator),
    Click(Locator),
}

/// Simulated page whose input events land a few milliseconds after the
/// driver call returns, like a framework re-rendering on the next tick
struct DeferredDriver {
    inner: Arc<SimulatedDriver>,
    events: mpsc::UnboundedSender<Event>,
}

impl DeferredDriver {
    fn new(lag: Duration) -> Self {
        let inner = Arc::new(SimulatedDriver::new());
        let app = Arc::clone(&inner);
        let (events, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tokio::time::sleep(lag).await;
                let _ = match event {
                    Event::Fill(locator, text) => app.fill(&locator, &text).await,
                    Event::Press(locator, key) => app.press(&locator, key).await,
                    Event::Hover(locator) => app.hover(&locator).await,
                    Event::Click(locator) => app.click(&locator).await,
                };
            }
        });
        Self { inner, events }
    }

    fn send(&self, event: Event) -> ProbeResult<()> {
        self.events
            .send(event)
            .map_err(|_| ProbeError::page("event queue closed"))
    }
}

#[async_trait]
impl PageDriver for DeferredDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        self.inner.navigate(url).await
    }

    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>> {
        self.inner.query(locator).await
    }

    async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        self.send(Event::Fill(locator.clone(), text.to_string()))
    }

    async fn press(&self, locator: &Locator, key: Key) -> ProbeResult<()> {
        self.send(Event::Press(locator.clone(), key))
    }

    async fn hover(&self, locator: &Locator) -> ProbeResult<()> {
        self.send(Event::Hover(locator.clone()))
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.send(Event::Click(locator.clone()))
    }

    async fn screenshot(&self) -> ProbeResult<Option<Vec<u8>>> {
        self.inner.screenshot().await
    }

    async fn current_url(&self) -> ProbeResult<String> {
        self.inner.current_url().await
    }

    async fn close(&self) -> ProbeResult<()> {
        self.inner.close().await
    }
}

struct DeferredBrowser;

#[async_trait]
impl PageFactory for DeferredBrowser {
    fn name(&self) -> &str {
        "deferred"
    }

    async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
        Ok(Box::new(DeferredDriver::new(Duration::from_millis(5))))
    }
}

#[tokio::test]
async fn test_suite_passes_when_events_render_late() {
    let config = SuiteConfig::new()
        .with_base_url("http://sim.local")
        .with_timeout_ms(2000)
        .with_poll_interval_ms(5)
        .with_jobs(5);
    let results = TestHarness::new(config)
        .run(&DeferredBrowser, &scenarios::filter(None))
        .await;
    assert!(results.all_passed(), "{:?}", results.failures());
    assert_eq!(results.total(), 5);
}

#[tokio::test]
async fn test_disabled_add_button_breaks_modal_scenario() {
    let browser = SimulatedBrowser::with_options(AppOptions {
        add_button_disabled: true,
        ..AppOptions::default()
    });
    let results = TestHarness::new(fast_config())
        .run(&browser, &scenarios::filter(Some("modal")))
        .await;
    assert_eq!(results.failed_count(), 1);
}

// ============================================================================
// Page model against the simulated app
// ============================================================================

#[tokio::test]
async fn test_pages_are_isolated() {
    let browser = SimulatedBrowser::new();
    let first = open(&browser).await;
    let second = open(&browser).await;
    first.add_multiple(2).await.unwrap();
    expect(first.page(), &first.todo_item).to_have_count(2).await.unwrap();
    expect(second.page(), &second.todo_item).to_have_count(0).await.unwrap();
}

#[tokio::test]
async fn test_validation_messages() {
    let todo = open(&SimulatedBrowser::new()).await;

    todo.add_todo(LONG_TASK).await.unwrap();
    expect(todo.page(), &todo.warning_message)
        .to_have_text(LENGTH_WARNING)
        .await
        .unwrap();
    expect(todo.page(), &todo.todo_item).to_have_count(0).await.unwrap();

    todo.add_multiple(1).await.unwrap();
    todo.add_todo("Task 1").await.unwrap();
    expect(todo.page(), &todo.warning_message)
        .to_have_text(&duplicate_warning("Task 1"))
        .await
        .unwrap();
    expect(todo.page(), &todo.todo_item).to_have_count(1).await.unwrap();
}

#[tokio::test]
async fn test_empty_state_assertion_fails_with_rows_present() {
    let todo = open(&SimulatedBrowser::new()).await;
    todo.add_multiple(1).await.unwrap();
    let err = expect(todo.page(), &todo.empty_list)
        .to_have_text(EMPTY_STATE)
        .await
        .unwrap_err();
    assert!(err.is_assertion(), "{err}");
}

#[tokio::test]
async fn test_ambiguous_click_is_a_strict_mode_violation() {
    let todo = open(&SimulatedBrowser::new()).await;
    todo.add_multiple(2).await.unwrap();
    let err = todo.page().click(&todo.task_checked).await.unwrap_err();
    assert!(matches!(err, ProbeError::StrictModeViolation { .. }), "{err}");
}

#[tokio::test]
async fn test_closed_page_rejects_actions() {
    let todo = open(&SimulatedBrowser::new()).await;
    let page = todo.into_page();
    page.close().await.unwrap();
    assert!(page.url().await.is_err());
}

#[tokio::test]
async fn test_disabled_control_fails_enabled_assertion() {
    let todo = open(&SimulatedBrowser::with_options(AppOptions {
        add_button_disabled: true,
        ..AppOptions::default()
    }))
    .await;
    expect(todo.page(), &todo.input_box).to_be_enabled().await.unwrap();

    let err = expect(todo.page(), &todo.add_button)
        .to_be_enabled()
        .await
        .unwrap_err();
    match err {
        ProbeError::AssertionFailed { assertion, actual, .. } => {
            assert_eq!(assertion, "to_be_enabled");
            assert!(actual.contains("<button> is disabled"), "{actual}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_click_on_disabled_control_times_out() {
    let todo = open(&SimulatedBrowser::with_options(AppOptions {
        add_button_disabled: true,
        ..AppOptions::default()
    }))
    .await;
    todo.page().fill(&todo.input_box, "Task 1").await.unwrap();

    let err = todo.page().click(&todo.add_button).await.unwrap_err();
    match err {
        ProbeError::Timeout { observed, .. } => {
            assert!(observed.contains("is disabled"), "{observed}");
        }
        other => panic!("unexpected error: {other}"),
    }
    expect(todo.page(), &todo.todo_item).to_have_count(0).await.unwrap();
}
