//! In-memory todo application.
//!
//! Holds the application state and renders it to a fresh [`Document`] after
//! every event, the way a client-side framework re-renders its view. Events
//! are addressed to [`Control`]s, which the renderer maps onto element ids.

use super::dom::{Document, Element, NodeId};
use crate::driver::Key;
use crate::locator::text_matches;
use crate::result::{ProbeError, ProbeResult};
use std::collections::HashMap;

/// Path the application is served under
pub const APP_PATH: &str = "/frontend/project-6";

/// Longest accepted task text, in characters
pub const MAX_TASK_CHARS: usize = 30;

/// Rendering knobs, mostly for exercising failure paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppOptions {
    /// Panel heading text
    pub heading: String,
    /// Length limit for new tasks
    pub max_chars: usize,
    /// Render `#add-btn` disabled
    pub add_button_disabled: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            heading: "My Tasks".to_string(),
            max_chars: MAX_TASK_CHARS,
            add_button_disabled: false,
        }
    }
}

/// One todo entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Display text
    pub text: String,
    /// Checked off
    pub completed: bool,
}

/// Interactive parts of the view. Row indices address `TodoApp::tasks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// `#input-add`
    AddInput,
    /// `#add-btn`
    AddButton,
    /// `#search`
    SearchInput,
    /// `#clear`
    ClearButton,
    /// A task row
    Row(usize),
    /// The row's text span, which toggles completion
    Toggle(usize),
    /// The row's delete button
    Destroy(usize),
}

impl Control {
    const fn row(self) -> Option<usize> {
        match self {
            Self::Row(i) | Self::Toggle(i) | Self::Destroy(i) => Some(i),
            _ => None,
        }
    }
}

/// A rendered view plus the element-to-control map for dispatching events
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    /// The element tree
    pub document: Document,
    controls: HashMap<NodeId, Control>,
}

impl Rendered {
    /// The control owning `node`, searching up through its ancestors
    #[must_use]
    pub fn control_for(&self, node: NodeId) -> Option<Control> {
        std::iter::once(node)
            .chain(self.document.ancestors(node))
            .find_map(|n| self.controls.get(&n).copied())
    }
}

/// Application state
#[derive(Debug, Clone, Default)]
pub struct TodoApp {
    options: AppOptions,
    tasks: Vec<Task>,
    input: String,
    search: String,
    warning: Option<String>,
    hovered: Option<usize>,
}

impl TodoApp {
    /// Fresh application with no tasks
    #[must_use]
    pub fn new(options: AppOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Current tasks in insertion order
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Current warning banner text
    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Type into an input, replacing its value
    pub fn fill(&mut self, control: Control, text: &str) -> ProbeResult<()> {
        match control {
            Control::AddInput => self.input = text.to_string(),
            Control::SearchInput => self.search = text.to_string(),
            other => {
                return Err(ProbeError::input(format!(
                    "cannot fill {other:?}: not an input"
                )))
            }
        }
        Ok(())
    }

    /// Key press on a focused control
    pub fn press(&mut self, control: Control, key: Key) {
        if control == Control::AddInput && key == Key::Enter {
            self.submit();
        }
    }

    /// Pointer over a control; only one row is hovered at a time
    pub fn hover(&mut self, control: Control) {
        self.hovered = control.row();
    }

    /// Pointer click, which also moves the pointer onto the control
    pub fn click(&mut self, control: Control) {
        self.hover(control);
        match control {
            Control::AddButton => self.submit(),
            Control::ClearButton => {
                self.tasks.retain(|t| !t.completed);
                self.hovered = None;
            }
            Control::Toggle(i) => {
                if let Some(task) = self.tasks.get_mut(i) {
                    task.completed = !task.completed;
                }
            }
            Control::Destroy(i) => {
                if i < self.tasks.len() {
                    let _ = self.tasks.remove(i);
                }
                self.hovered = None;
            }
            Control::AddInput | Control::SearchInput | Control::Row(_) => {}
        }
    }

    fn submit(&mut self) {
        let text = self.input.trim().to_string();
        self.input.clear();
        if text.is_empty() {
            return;
        }
        if text.chars().count() > self.options.max_chars {
            self.warning = Some(format!(
                "Error: Todo cannot be more than {} characters!",
                self.options.max_chars
            ));
            return;
        }
        if self
            .tasks
            .iter()
            .any(|t| t.text.to_lowercase() == text.to_lowercase())
        {
            self.warning = Some(format!("Error: You already have {text} in your todo list."));
            return;
        }
        self.warning = None;
        self.tasks.push(Task {
            text,
            completed: false,
        });
    }

    fn visible_rows(&self) -> impl Iterator<Item = (usize, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| self.search.is_empty() || text_matches(&t.text, &self.search))
    }

    /// Render the current state
    #[must_use]
    pub fn render(&self) -> Rendered {
        let mut doc = Document::new();
        let mut controls = HashMap::new();

        let panel = doc.append(
            doc.body(),
            Element::new("div").with_id("panel").with_class("panel"),
        );
        let _ = doc.append(
            panel,
            Element::new("p")
                .with_class("panel-heading")
                .with_text(self.options.heading.clone()),
        );

        let add_block = doc.append(panel, Element::new("div").with_class("panel-block"));
        let input = doc.append(
            add_block,
            Element::new("input")
                .with_id("input-add")
                .with_class("input")
                .with_attr("type", "text")
                .with_attr("placeholder", "Type your todo here")
                .with_attr("value", self.input.clone()),
        );
        let _ = controls.insert(input, Control::AddInput);
        let add = doc.append(
            add_block,
            Element::new("button")
                .with_id("add-btn")
                .with_class("button is-link")
                .with_text("ADD")
                .disabled(self.options.add_button_disabled),
        );
        let _ = controls.insert(add, Control::AddButton);

        if let Some(warning) = &self.warning {
            let _ = doc.append(
                panel,
                Element::new("div")
                    .with_class("notification is-danger")
                    .with_text(warning.clone()),
            );
        }

        let search_block = doc.append(panel, Element::new("div").with_class("panel-block"));
        let search = doc.append(
            search_block,
            Element::new("input")
                .with_id("search")
                .with_class("input")
                .with_attr("type", "text")
                .with_attr("placeholder", "Search Tasks")
                .with_attr("value", self.search.clone()),
        );
        let _ = controls.insert(search, Control::SearchInput);

        let mut shown = 0;
        for (i, task) in self.visible_rows() {
            shown += 1;
            let row = doc.append(
                panel,
                Element::new("div").with_class("panel-block todo-item"),
            );
            let _ = controls.insert(row, Control::Row(i));
            let _ = doc.append(row, Element::new("span").with_class("panel-icon"));
            let mut label = Element::new("span")
                .with_class("mr-auto toggle")
                .with_text(task.text.clone());
            if task.completed {
                label = label.with_attr("style", "text-decoration: line-through;");
            }
            let toggle = doc.append(row, label);
            let _ = controls.insert(toggle, Control::Toggle(i));
            let destroy = doc.append(
                row,
                Element::new("button")
                    .with_class("destroy delete")
                    .hidden(self.hovered != Some(i)),
            );
            let _ = controls.insert(destroy, Control::Destroy(i));
        }
        if shown == 0 {
            let _ = doc.append(
                panel,
                Element::new("div")
                    .with_class("panel-block todo-item has-text-danger")
                    .with_text("No task found!"),
            );
        }

        let clear_block = doc.append(panel, Element::new("div").with_class("panel-block"));
        let clear = doc.append(
            clear_block,
            Element::new("button")
                .with_id("clear")
                .with_class("button is-link is-outlined is-fullwidth")
                .with_text("Remove completed tasks!"),
        );
        let _ = controls.insert(clear, Control::ClearButton);

        Rendered {
            document: doc,
            controls,
        }
    }
}
