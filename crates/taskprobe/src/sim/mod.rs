//! Simulated browser backend.
//!
//! An in-memory rendition of the todo application's DOM contract, so the page
//! model and scenarios run deterministically without a browser or network.

mod app;
mod dom;
mod driver;
mod selector;

pub use app::{AppOptions, Control, Rendered, Task, TodoApp, APP_PATH, MAX_TASK_CHARS};
pub use dom::{Document, Element, NodeId};
pub use driver::{SimulatedBrowser, SimulatedDriver};
pub use selector::Selector;
