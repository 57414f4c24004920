//! Test harness for running scenario suites.
//!
//! Every scenario gets its own page from a [`PageFactory`], is navigated to
//! the application and handed to its entry point wrapped in a [`TodoPage`].
//! Scenarios run concurrently up to `jobs`; results come back in the order
//! the scenarios were given.

use crate::config::SuiteConfig;
use crate::driver::PageFactory;
use crate::page::Page;
use crate::result::ProbeError;
use crate::scenarios::Scenario;
use crate::todo_page::TodoPage;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Scenario outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// Scenario passed
    Passed,
    /// Scenario failed
    Failed,
    /// Not run because an earlier scenario failed
    Skipped,
}

impl ScenarioStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario id
    pub id: String,
    /// Scenario name
    pub name: String,
    /// Outcome
    pub status: ScenarioStatus,
    /// Error message if failed
    pub error: Option<String>,
    /// Wall time
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Failure screenshot, when one was captured
    pub screenshot: Option<PathBuf>,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn passed(scenario: &Scenario, duration: Duration) -> Self {
        Self::new(scenario, ScenarioStatus::Passed, None, duration)
    }

    /// Create a failing result
    #[must_use]
    pub fn failed(scenario: &Scenario, duration: Duration, error: impl Into<String>) -> Self {
        Self::new(scenario, ScenarioStatus::Failed, Some(error.into()), duration)
    }

    /// Create a skipped result
    #[must_use]
    pub fn skipped(scenario: &Scenario) -> Self {
        Self::new(scenario, ScenarioStatus::Skipped, None, Duration::ZERO)
    }

    fn new(
        scenario: &Scenario,
        status: ScenarioStatus,
        error: Option<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: scenario.id.to_string(),
            name: scenario.name.to_string(),
            status,
            error,
            duration,
            screenshot: None,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Results from running a suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Backend the pages came from
    pub backend: String,
    /// Application URL
    pub app_url: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Individual results, in scenario order
    pub results: Vec<ScenarioResult>,
    /// Total duration
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if every scenario that ran passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| !r.status.is_failed())
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Count skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| r.status.is_failed()).collect()
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Harness for running scenario suites
#[derive(Debug, Clone, Default)]
pub struct TestHarness {
    config: SuiteConfig,
}

impl TestHarness {
    /// Harness driven by `config`
    #[must_use]
    pub const fn new(config: SuiteConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run `scenarios` against pages from `factory`
    pub async fn run(&self, factory: &dyn PageFactory, scenarios: &[&Scenario]) -> SuiteResults {
        let started_at = Utc::now();
        let start = Instant::now();
        let jobs = self.config.jobs.max(1);
        info!(
            suite = %self.config.suite_name,
            backend = factory.name(),
            scenarios = scenarios.len(),
            jobs,
            "starting suite"
        );

        let stop = AtomicBool::new(false);
        let stop = &stop;
        let mut indexed: Vec<(usize, ScenarioResult)> = stream::iter(scenarios.iter().enumerate())
            .map(|(i, scenario)| async move { (i, self.run_one(factory, scenario, stop).await) })
            .buffer_unordered(jobs)
            .collect()
            .await;
        indexed.sort_by_key(|(i, _)| *i);

        let results = SuiteResults {
            suite_name: self.config.suite_name.clone(),
            backend: factory.name().to_string(),
            app_url: self.config.app_url(),
            started_at,
            results: indexed.into_iter().map(|(_, r)| r).collect(),
            duration: start.elapsed(),
        };

        if results.all_passed() {
            info!(
                passed = results.passed_count(),
                duration_ms = results.duration.as_millis() as u64,
                "suite passed"
            );
        } else {
            warn!(
                failed = results.failed_count(),
                skipped = results.skipped_count(),
                "suite failed"
            );
        }
        results
    }

    async fn run_one(
        &self,
        factory: &dyn PageFactory,
        scenario: &Scenario,
        stop: &AtomicBool,
    ) -> ScenarioResult {
        if self.config.fail_fast && stop.load(Ordering::SeqCst) {
            debug!(scenario = scenario.id, "skipped after earlier failure");
            return ScenarioResult::skipped(scenario);
        }

        info!(scenario = scenario.id, "running");
        let start = Instant::now();

        let driver = match factory.new_page().await {
            Ok(driver) => driver,
            Err(e) => {
                stop.store(true, Ordering::SeqCst);
                warn!(scenario = scenario.id, error = %e, "could not open page");
                return ScenarioResult::failed(scenario, start.elapsed(), e.to_string());
            }
        };
        let todo = TodoPage::new(
            Page::new(driver)
                .with_base_url(self.config.base_url.clone())
                .with_locator_options(self.config.locator_options()),
        );

        let limit = self.config.scenario_timeout();
        let outcome = tokio::time::timeout(limit, async {
            todo.page().goto(&self.config.app_path).await?;
            (scenario.run)(&todo).await
        })
        .await
        .unwrap_or_else(|_| {
            Err(ProbeError::Timeout {
                ms: self.config.scenario_timeout_ms,
                waiting_for: format!("scenario {}", scenario.id),
                observed: "scenario still running".to_string(),
            })
        });

        let mut result = match outcome {
            Ok(()) => {
                info!(scenario = scenario.id, elapsed_ms = start.elapsed().as_millis() as u64, "passed");
                ScenarioResult::passed(scenario, start.elapsed())
            }
            Err(e) => {
                stop.store(true, Ordering::SeqCst);
                warn!(scenario = scenario.id, error = %e, "failed");
                let mut failed = ScenarioResult::failed(scenario, start.elapsed(), e.to_string());
                failed.screenshot = self.capture(todo.page(), scenario.id).await;
                failed
            }
        };

        if let Err(e) = todo.page().close().await {
            debug!(scenario = scenario.id, error = %e, "page close failed");
        }
        result.duration = start.elapsed();
        result
    }

    /// Save a screenshot into the artifacts directory, if configured and
    /// supported by the backend
    async fn capture(&self, page: &Page, id: &str) -> Option<PathBuf> {
        let dir = self.config.artifacts_dir.as_ref()?;
        let bytes = match page.screenshot().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(scenario = id, error = %e, "screenshot failed");
                return None;
            }
        };
        let path = dir.join(format!("{id}.png"));
        let written = std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&path, bytes));
        match written {
            Ok(()) => {
                info!(scenario = id, path = %path.display(), "saved failure screenshot");
                Some(path)
            }
            Err(e) => {
                warn!(scenario = id, error = %e, "could not save screenshot");
                None
            }
        }
    }
}
