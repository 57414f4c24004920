//! Property tests for the page model on the simulated backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use std::future::Future;
use std::time::Duration;
use taskprobe::todo_page::{duplicate_warning, EMPTY_STATE, LENGTH_WARNING};
use taskprobe::{expect, LocatorOptions, Page, SimulatedDriver, TodoPage};

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(future)
}

async fn open() -> TodoPage {
    let page = Page::new(Box::new(SimulatedDriver::new()))
        .with_base_url("http://sim.local")
        .with_locator_options(LocatorOptions {
            timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(5),
        });
    let todo = TodoPage::new(page);
    todo.goto().await.unwrap();
    todo
}

async fn rows(todo: &TodoPage) -> Vec<String> {
    todo.page().all_inner_texts(&todo.todo_item).await.unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_add_multiple_adds_each_label_once(n in 1usize..=5) {
        let texts = block_on(async {
            let todo = open().await;
            todo.add_multiple(n).await.unwrap();
            rows(&todo).await
        });
        let expected: Vec<String> = (1..=n).map(TodoPage::task_label).collect();
        prop_assert_eq!(texts, expected);
    }

    #[test]
    fn prop_length_limit(text in "[a-z]{1,40}") {
        let (texts, warning) = block_on(async {
            let todo = open().await;
            todo.add_todo(&text).await.unwrap();
            let warning = if todo.page().count(&todo.warning_message).await.unwrap() > 0 {
                Some(todo.page().inner_text(&todo.warning_message).await.unwrap())
            } else {
                None
            };
            (rows(&todo).await, warning)
        });
        if text.chars().count() <= 30 {
            prop_assert_eq!(texts, vec![text]);
            prop_assert_eq!(warning, None);
        } else {
            prop_assert!(texts.is_empty());
            prop_assert_eq!(warning.as_deref(), Some(LENGTH_WARNING));
        }
    }

    #[test]
    fn prop_duplicates_never_add_a_row(n in 1usize..=4, pick in 1usize..=4) {
        let pick = pick.min(n);
        let label = TodoPage::task_label(pick);
        let (count, warning) = block_on(async {
            let todo = open().await;
            todo.add_multiple(n).await.unwrap();
            todo.add_todo(&label.to_uppercase()).await.unwrap();
            (
                todo.page().count(&todo.todo_item).await.unwrap(),
                todo.page().inner_text(&todo.warning_message).await.unwrap(),
            )
        });
        prop_assert_eq!(count, n);
        prop_assert_eq!(warning, duplicate_warning(&label.to_uppercase()));
    }

    #[test]
    fn prop_remove_all_empties_the_list(n in 0usize..=5, checked in 0usize..=5) {
        block_on(async {
            let todo = open().await;
            todo.add_multiple(n).await.unwrap();
            todo.check_multiple(checked.min(n)).await.unwrap();
            todo.remove_all().await.unwrap();
            expect(todo.page(), &todo.todo_item).to_have_count(0).await.unwrap();
            expect(todo.page(), &todo.empty_list)
                .to_have_text(EMPTY_STATE)
                .await
                .unwrap();
        });
    }

    #[test]
    fn prop_search_shows_only_matching_rows(n in 1usize..=5, pick in 1usize..=5) {
        let pick = pick.min(n);
        let label = TodoPage::task_label(pick);
        let texts = block_on(async {
            let todo = open().await;
            todo.add_multiple(n).await.unwrap();
            todo.search(&label).await.unwrap();
            rows(&todo).await
        });
        prop_assert_eq!(texts, vec![label]);
    }
}
