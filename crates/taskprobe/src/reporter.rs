//! Suite reports: one-line summary, JSON and JUnit XML.

use crate::harness::{ScenarioStatus, SuiteResults};
use crate::result::ProbeResult;
use std::path::Path;

/// Renders [`SuiteResults`] in the supported formats
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a> {
    results: &'a SuiteResults,
}

impl<'a> Reporter<'a> {
    /// Create a reporter for a finished run
    #[must_use]
    pub const fn new(results: &'a SuiteResults) -> Self {
        Self { results }
    }

    /// Share of scenarios that passed, in `0.0..=1.0`
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let total = self.results.total();
        if total == 0 {
            return 1.0;
        }
        self.results.passed_count() as f64 / total as f64
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{}: {}/{} passed ({:.1}%)",
            self.results.suite_name,
            self.results.passed_count(),
            self.results.total(),
            self.pass_rate() * 100.0
        );
        let skipped = self.results.skipped_count();
        if skipped > 0 {
            line.push_str(&format!(", {skipped} skipped"));
        }
        line.push_str(&format!(" in {:.2}s", self.results.duration.as_secs_f64()));
        line
    }

    /// Render the JSON report
    pub fn render_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self.results)?)
    }

    /// Write the JSON report
    pub fn write_json(&self, output_path: &Path) -> ProbeResult<()> {
        std::fs::write(output_path, self.render_json()?)?;
        Ok(())
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}" timestamp="{}">"#,
            escape_xml(&self.results.suite_name),
            self.results.total(),
            self.results.failed_count(),
            self.results.skipped_count(),
            self.results.duration.as_secs_f64(),
            self.results.started_at.format("%Y-%m-%dT%H:%M:%S")
        ));
        xml.push('\n');

        for result in &self.results.results {
            xml.push_str(&format!(
                r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
                escape_xml(&result.id),
                escape_xml(&result.name),
                result.duration.as_secs_f64()
            ));
            xml.push('\n');

            match result.status {
                ScenarioStatus::Failed => {
                    let error = result.error.as_deref().unwrap_or("failed");
                    xml.push_str(&format!(
                        r#"    <failure message="{}">{}</failure>"#,
                        escape_xml(error),
                        escape_xml(error)
                    ));
                    xml.push('\n');
                }
                ScenarioStatus::Skipped => xml.push_str("    <skipped/>\n"),
                ScenarioStatus::Passed => {}
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Write the JUnit XML report
    pub fn write_junit(&self, output_path: &Path) -> ProbeResult<()> {
        std::fs::write(output_path, self.render_junit())?;
        Ok(())
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::harness::ScenarioResult;
    use crate::scenarios;
    use chrono::Utc;
    use std::time::Duration;

    fn sample() -> SuiteResults {
        let all = scenarios::all();
        SuiteResults {
            suite_name: "Todo <suite>".to_string(),
            backend: "simulated".to_string(),
            app_url: "http://sim.local/frontend/project-6".to_string(),
            started_at: Utc::now(),
            results: vec![
                ScenarioResult::passed(&all[0], Duration::from_millis(120)),
                ScenarioResult::failed(
                    &all[1],
                    Duration::from_millis(80),
                    "expected \"No task found!\", got \"\"",
                ),
                ScenarioResult::skipped(&all[2]),
            ],
            duration: Duration::from_millis(200),
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn test_summary() {
            let results = sample();
            let summary = Reporter::new(&results).summary();
            assert!(summary.starts_with("Todo <suite>: 1/3 passed (33.3%)"), "{summary}");
            assert!(summary.contains("1 skipped"));
        }

        #[test]
        fn test_pass_rate_empty() {
            let mut results = sample();
            results.results.clear();
            assert!((Reporter::new(&results).pass_rate() - 1.0).abs() < f64::EPSILON);
        }
    }

    mod json_tests {
        use super::*;

        #[test]
        fn test_render_json() {
            let results = sample();
            let json: serde_json::Value =
                serde_json::from_str(&Reporter::new(&results).render_json().unwrap()).unwrap();
            assert_eq!(json["backend"], "simulated");
            assert_eq!(json["duration_ms"], 200);
            assert_eq!(json["results"][0]["id"], "modal-verification");
            assert_eq!(json["results"][1]["status"], "failed");
            assert_eq!(json["results"][2]["status"], "skipped");
        }

        #[test]
        fn test_write_json() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("report.json");
            Reporter::new(&sample()).write_json(&path).unwrap();
            assert!(std::fs::read_to_string(path).unwrap().contains("single-task"));
        }
    }

    mod junit_tests {
        use super::*;

        #[test]
        fn test_render_junit() {
            let results = sample();
            let xml = Reporter::new(&results).render_junit();
            assert!(xml.contains(r#"name="Todo &lt;suite&gt;""#));
            assert!(xml.contains(r#"tests="3" failures="1" skipped="1""#));
            assert!(xml.contains(r#"classname="single-task""#));
            assert!(xml.contains("&quot;No task found!&quot;"));
            assert!(xml.contains("<skipped/>"));
            assert!(xml.trim_end().ends_with("</testsuite>"));
        }

        #[test]
        fn test_write_junit() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("junit.xml");
            Reporter::new(&sample()).write_junit(&path).unwrap();
            assert!(std::fs::read_to_string(path).unwrap().starts_with("<?xml"));
        }
    }

    mod escape_xml_tests {
        use super::*;

        #[test]
        fn test_escape_special_chars() {
            assert_eq!(escape_xml("a & b"), "a &amp; b");
            assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
            assert_eq!(escape_xml("it's"), "it&apos;s");
        }

        #[test]
        fn test_no_escape_needed() {
            assert_eq!(escape_xml("plain text"), "plain text");
        }
    }
}
