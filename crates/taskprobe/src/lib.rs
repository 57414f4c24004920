//! Taskprobe: page-object browser tests for a todo web application.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    TASKPROBE Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenarios  │    │ TodoPage   │    │ Page       │            │
//! │   │ + expect() │───►│ (page      │───►│ auto-wait, │            │
//! │   │            │    │  object)   │    │ strictness │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │ PageDriver        │
//! │                              ┌──────────────┴──────────────┐    │
//! │                              ▼                             ▼    │
//! │                      ┌──────────────┐            ┌────────────┐ │
//! │                      │ Chromium/CDP │            │ Simulated  │ │
//! │                      └──────────────┘            └────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskprobe::{expect, Page, SimulatedDriver, TodoPage};
//!
//! # async fn demo() -> taskprobe::ProbeResult<()> {
//! let page = Page::new(Box::new(SimulatedDriver::new())).with_base_url("http://sim.local");
//! let todo = TodoPage::new(page);
//! todo.goto().await?;
//! todo.add_todo("Task 1").await?;
//! expect(todo.page(), &todo.todo_item).to_have_text("Task 1").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[cfg(feature = "browser")]
pub mod browser;
pub mod config;
pub mod driver;
pub mod expect;
pub mod harness;
pub mod locator;
pub mod page;
pub mod reporter;
mod result;
pub mod scenarios;
pub mod sim;
pub mod todo_page;
pub mod wait;

#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumDriver};
pub use config::{BrowserConfig, SuiteConfig};
pub use driver::{ElementSnapshot, Key, PageDriver, PageFactory};
pub use expect::{expect, expect_eq, Expect};
pub use harness::{ScenarioResult, ScenarioStatus, SuiteResults, TestHarness};
pub use locator::{Locator, LocatorOptions};
pub use page::Page;
pub use reporter::Reporter;
pub use result::{ProbeError, ProbeResult};
pub use scenarios::Scenario;
pub use sim::{SimulatedBrowser, SimulatedDriver};
pub use todo_page::{PageObject, TodoPage};
pub use wait::{wait_until, Poll, WaitOptions};
