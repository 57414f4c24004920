//! Page object for the todo application.
//!
//! Wraps a [`Page`] and exposes the application's locators plus the user
//! actions the scenarios are written in. All state lives in the DOM; every
//! method re-queries it.

use crate::driver::Key;
use crate::locator::Locator;
use crate::page::Page;
use crate::result::ProbeResult;
use tracing::{debug, warn};

/// Panel heading
pub const MODAL_HEADING: &str = "My Tasks";

/// Text of the empty-list row
pub const EMPTY_STATE: &str = "No task found!";

/// Warning shown for tasks over the length limit
pub const LENGTH_WARNING: &str = "Error: Todo cannot be more than 30 characters!";

/// Inline style of a completed task
pub const COMPLETED_STYLE: &str = "text-decoration: line-through;";

/// A task text well over the length limit
pub const LONG_TASK: &str =
    "This task is really long, probably more than like thirty characters or something";

/// Path of the application under the base URL
pub const TODO_APP_PATH: &str = "/frontend/project-6";

/// Warning shown when `item` is already on the list
#[must_use]
pub fn duplicate_warning(item: &str) -> String {
    format!("Error: You already have {item} in your todo list.")
}

/// Trait for page objects representing a page or component in the UI.
pub trait PageObject {
    /// URL path this page is served under
    fn url_pattern(&self) -> &str;

    /// How long navigation to the page may take (in milliseconds)
    fn load_timeout_ms(&self) -> u64 {
        30_000
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The todo application's single page
#[derive(Debug)]
pub struct TodoPage {
    page: Page,
    /// `#input-add`
    pub input_box: Locator,
    /// Task rows, excluding the empty-state row
    pub todo_item: Locator,
    /// The panel holding the whole application
    pub todo_modal: Locator,
    /// Panel title
    pub modal_heading: Locator,
    /// `#add-btn`
    pub add_button: Locator,
    /// `#search`
    pub task_search: Locator,
    /// Empty-state row
    pub empty_list: Locator,
    /// Task toggles (the task text, struck through when completed)
    pub task_checked: Locator,
    /// Task text spans
    pub todo_task: Locator,
    /// "Remove completed tasks" button
    pub clear_button: Locator,
    /// Validation banner
    pub warning_message: Locator,
}

impl PageObject for TodoPage {
    fn url_pattern(&self) -> &str {
        TODO_APP_PATH
    }

    fn page_name(&self) -> &str {
        "TodoPage"
    }
}

impl TodoPage {
    /// Bind the page model to a page
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            input_box: page.locator("#input-add"),
            todo_item: page.locator(".todo-item:not(.has-text-danger)"),
            todo_modal: page.locator(".panel"),
            modal_heading: page.locator(".panel-heading"),
            add_button: page.locator("#add-btn"),
            task_search: page.locator("#search"),
            empty_list: page.locator(".panel > .has-text-danger"),
            task_checked: page.locator(".toggle"),
            todo_task: page.locator("#panel .mr-auto"),
            clear_button: page.locator("#clear"),
            warning_message: page.locator(".is-danger"),
            page,
        }
    }

    /// The underlying page
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// Give the page back, e.g. to close it
    #[must_use]
    pub fn into_page(self) -> Page {
        self.page
    }

    /// Label `add_multiple` gives the i-th task (1-based)
    #[must_use]
    pub fn task_label(i: usize) -> String {
        format!("Task {i}")
    }

    /// Open the application
    pub async fn goto(&self) -> ProbeResult<()> {
        debug!(page = self.page_name(), "loading page object");
        self.page.goto(self.url_pattern()).await
    }

    /// Type `text` and submit it with Enter
    pub async fn add_todo(&self, text: &str) -> ProbeResult<()> {
        self.page.fill(&self.input_box, text).await?;
        self.page.press(&self.input_box, Key::Enter).await
    }

    /// Add `Task 1` through `Task n`, one after another
    pub async fn add_multiple(&self, n: usize) -> ProbeResult<()> {
        for i in 1..=n {
            self.add_todo(&Self::task_label(i)).await?;
        }
        Ok(())
    }

    /// Hover the row containing `text` and toggle it.
    ///
    /// Does nothing when no row matches.
    pub async fn check_task(&self, text: &str) -> ProbeResult<()> {
        let todo = self.todo_item.filter_has_text(text);
        if self.page.count(&todo).await? == 0 {
            warn!(text, "check_task: no matching row");
            return Ok(());
        }
        self.page.hover(&todo).await?;
        self.page.click(&todo.locator(".toggle")).await
    }

    /// Toggle `Task 1` through `Task n`
    pub async fn check_multiple(&self, n: usize) -> ProbeResult<()> {
        for i in 1..=n {
            self.check_task(&Self::task_label(i)).await?;
        }
        Ok(())
    }

    /// Hover the row containing `text` and delete it.
    ///
    /// Does nothing when no row matches.
    pub async fn remove(&self, text: &str) -> ProbeResult<()> {
        let todo = self.todo_item.filter_has_text(text);
        if self.page.count(&todo).await? == 0 {
            warn!(text, "remove: no matching row");
            return Ok(());
        }
        self.page.hover(&todo).await?;
        self.page.click(&todo.locator(".destroy")).await
    }

    /// Delete rows until none are left, always acting on the current first row
    pub async fn remove_all(&self) -> ProbeResult<()> {
        while self.page.count(&self.todo_item).await? > 0 {
            self.page.hover(&self.todo_item.first()).await?;
            self.page
                .click(&self.todo_item.locator(".destroy").first())
                .await?;
        }
        Ok(())
    }

    /// Type into the search field
    pub async fn search(&self, text: &str) -> ProbeResult<()> {
        self.page.fill(&self.task_search, text).await
    }

    /// Remove every completed task
    pub async fn clear_selected(&self) -> ProbeResult<()> {
        self.page.click(&self.clear_button).await
    }
}
