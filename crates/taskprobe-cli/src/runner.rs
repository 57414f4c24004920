//! Scenario runner: picks the backend, drives the harness and prints results

use crate::commands::Backend;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use taskprobe::{
    scenarios, Reporter, Scenario, SimulatedBrowser, SuiteConfig, SuiteResults, TestHarness,
};
use tracing::info;

/// Runs the selected scenarios and reports them on the terminal
#[derive(Debug)]
pub struct TestRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl TestRunner {
    /// Create a new test runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Scenarios a filter selects; an unmatched filter is an error
    pub fn select(filter: Option<&str>) -> CliResult<Vec<&'static Scenario>> {
        let selected = scenarios::filter(filter);
        if selected.is_empty() {
            return Err(CliError::invalid_argument(format!(
                "no scenario matches '{}'",
                filter.unwrap_or_default()
            )));
        }
        Ok(selected)
    }

    /// Run the scenarios selected by `filter` on `backend`
    pub async fn run(
        &mut self,
        suite: &SuiteConfig,
        backend: Backend,
        filter: Option<&str>,
    ) -> CliResult<SuiteResults> {
        suite.validate()?;
        let selected = Self::select(filter)?;
        let harness = TestHarness::new(suite.clone());

        self.reporter.header("Running scenarios");
        if self.config.verbosity.is_verbose() {
            self.reporter.info(&format!("application: {}", suite.app_url()));
        }
        self.reporter
            .start_spinner(&format!("{} scenario(s) on {backend:?}", selected.len()));

        let results = match backend {
            Backend::Simulated => Ok(harness.run(&SimulatedBrowser::new(), &selected).await),
            Backend::Chromium => Self::run_chromium(&harness, &selected).await,
        };
        self.reporter.finish();
        let results = results?;

        for result in &results.results {
            self.reporter.scenario(result);
        }
        self.reporter.summary(&results);
        info!(summary = %Reporter::new(&results).summary(), "run finished");
        Ok(results)
    }

    #[cfg(feature = "browser")]
    async fn run_chromium(
        harness: &TestHarness,
        selected: &[&Scenario],
    ) -> CliResult<SuiteResults> {
        let browser = taskprobe::ChromiumBrowser::launch(harness.config().browser.clone()).await?;
        let results = harness.run(&browser, selected).await;
        browser.close().await?;
        Ok(results)
    }

    #[cfg(not(feature = "browser"))]
    async fn run_chromium(
        _harness: &TestHarness,
        _selected: &[&Scenario],
    ) -> CliResult<SuiteResults> {
        Err(CliError::invalid_argument(
            "the chromium backend is not enabled. Rebuild with --features browser",
        ))
    }
}
