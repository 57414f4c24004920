//! The todo application's end-to-end scenarios.
//!
//! Each scenario receives a freshly loaded [`TodoPage`] and shares nothing
//! with the others, so the harness may run them in any order or in parallel.

use crate::expect::{expect, expect_eq};
use crate::result::ProbeResult;
use crate::todo_page::{
    duplicate_warning, TodoPage, COMPLETED_STYLE, EMPTY_STATE, LENGTH_WARNING, LONG_TASK,
    MODAL_HEADING,
};
use futures::future::BoxFuture;
use std::fmt;

/// Scenario entry point
pub type ScenarioFn = for<'a> fn(&'a TodoPage) -> BoxFuture<'a, ProbeResult<()>>;

/// A registered scenario
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Stable identifier used for filtering and reports
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Entry point
    pub run: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

static SCENARIOS: [Scenario; 5] = [
    Scenario {
        id: "modal-verification",
        name: "Todo-App Modal Verification",
        run: modal_verification,
    },
    Scenario {
        id: "single-task",
        name: "Single Task Addition and Removal",
        run: single_task,
    },
    Scenario {
        id: "multiple-tasks",
        name: "Multiple Task Operations",
        run: multiple_tasks,
    },
    Scenario {
        id: "search-filter",
        name: "Search and Filter Functionality",
        run: search_filter,
    },
    Scenario {
        id: "validation",
        name: "Task Validation and Error Handling",
        run: validation,
    },
];

/// Every scenario, in registry order
#[must_use]
pub fn all() -> &'static [Scenario] {
    &SCENARIOS
}

/// Look up a scenario by id
#[must_use]
pub fn find(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}

/// Scenarios whose id or name contains `pattern` (case-insensitive); all of
/// them when `pattern` is `None`
#[must_use]
pub fn filter(pattern: Option<&str>) -> Vec<&'static Scenario> {
    let Some(pattern) = pattern.map(str::to_lowercase) else {
        return SCENARIOS.iter().collect();
    };
    SCENARIOS
        .iter()
        .filter(|s| s.id.contains(&pattern) || s.name.to_lowercase().contains(&pattern))
        .collect()
}

fn modal_verification(todo: &TodoPage) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let page = todo.page();
        expect(page, &todo.todo_modal).to_be_visible().await?;
        expect(page, &todo.modal_heading)
            .to_have_text(MODAL_HEADING)
            .await?;

        expect(page, &todo.input_box).to_be_enabled().await?;
        expect(page, &todo.add_button).to_be_enabled().await?;
        expect(page, &todo.task_search).to_be_enabled().await?;

        expect_eq("task count", 0, page.count(&todo.todo_item).await?)?;
        expect(page, &todo.empty_list).to_have_text(EMPTY_STATE).await
    })
}

fn single_task(todo: &TodoPage) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let page = todo.page();
        todo.add_multiple(1).await?;

        let new_task = page.inner_text(&todo.todo_item).await?;
        expect(page, &todo.todo_item)
            .to_contain_text(&new_task)
            .await?;
        expect(page, &todo.todo_item).to_have_count(1).await?;

        todo.check_task(&new_task).await?;
        expect(page, &todo.task_checked)
            .to_have_attribute("style", COMPLETED_STYLE)
            .await?;

        todo.remove(&new_task).await?;
        expect(page, &todo.todo_item).to_have_count(0).await?;
        expect(page, &todo.empty_list).to_have_text(EMPTY_STATE).await
    })
}

fn multiple_tasks(todo: &TodoPage) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let page = todo.page();
        todo.add_multiple(5).await?;

        expect(page, &todo.todo_item).to_have_count(5).await?;
        for i in 1..=5 {
            let row = todo.todo_item.filter_has_text(TodoPage::task_label(i));
            expect(page, &row).to_be_visible().await?;
        }

        todo.check_multiple(5).await?;
        todo.clear_selected().await?;

        expect(page, &todo.todo_item).to_have_count(0).await?;
        expect(page, &todo.empty_list).to_have_text(EMPTY_STATE).await
    })
}

fn search_filter(todo: &TodoPage) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let page = todo.page();
        todo.add_multiple(5).await?;

        expect(page, &todo.todo_item).to_have_count(5).await?;
        for i in 1..=5 {
            let row = todo.todo_item.filter_has_text(TodoPage::task_label(i));
            expect(page, &row).to_be_visible().await?;
        }

        let new_task = page.inner_text(&todo.todo_item.first()).await?;
        todo.search(&new_task).await?;

        expect(page, &todo.todo_item).to_have_text(&new_task).await?;
        expect(page, &todo.todo_item).to_have_count(1).await
    })
}

fn validation(todo: &TodoPage) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let page = todo.page();

        todo.add_todo("").await?;
        expect_eq("task count", 0, page.count(&todo.todo_item).await?)?;
        expect(page, &todo.empty_list).to_have_text(EMPTY_STATE).await?;

        todo.add_todo(LONG_TASK).await?;
        expect(page, &todo.warning_message).to_be_visible().await?;
        expect(page, &todo.warning_message)
            .to_have_text(LENGTH_WARNING)
            .await?;

        todo.add_multiple(1).await?;
        let repeat_task = page.inner_text(&todo.todo_item).await?;
        expect(page, &todo.todo_item).to_have_count(1).await?;

        todo.add_multiple(1).await?;
        expect(page, &todo.warning_message).to_be_visible().await?;
        expect(page, &todo.warning_message)
            .to_have_text(&duplicate_warning(&repeat_task))
            .await?;
        expect(page, &todo.todo_item).to_have_count(1).await
    })
}
