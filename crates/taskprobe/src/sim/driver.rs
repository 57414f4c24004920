//! [`PageDriver`] over the in-memory todo application.

use super::app::{AppOptions, Control, Rendered, TodoApp, APP_PATH};
use super::dom::NodeId;
use super::selector::Selector;
use crate::driver::{ElementSnapshot, Key, PageDriver, PageFactory};
use crate::locator::{text_matches, Locator, Step};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    url: String,
    app: Option<TodoApp>,
    rendered: Rendered,
    closed: bool,
}

impl State {
    fn resolve(&self, locator: &Locator) -> ProbeResult<Vec<NodeId>> {
        let doc = &self.rendered.document;
        let mut current: Option<Vec<NodeId>> = None;
        for step in locator.steps() {
            current = Some(match step {
                Step::Css(css) => {
                    let selector = Selector::parse(css)?;
                    match current {
                        None => doc.query_all(None, &selector),
                        Some(scopes) => {
                            let mut found: Vec<NodeId> = Vec::new();
                            for scope in scopes {
                                for id in doc.query_all(Some(scope), &selector) {
                                    if !found.contains(&id) {
                                        found.push(id);
                                    }
                                }
                            }
                            doc.sort_document_order(&mut found);
                            found
                        }
                    }
                }
                Step::HasText(text) => current
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|id| text_matches(&doc.text_content(*id), text))
                    .collect(),
                Step::Nth(index) => current
                    .unwrap_or_default()
                    .get(*index)
                    .map(|id| vec![*id])
                    .unwrap_or_default(),
            });
        }
        Ok(current.unwrap_or_default())
    }

    fn snapshot(&self, id: NodeId) -> ElementSnapshot {
        let doc = &self.rendered.document;
        let element = doc.element(id);
        ElementSnapshot {
            tag_name: element.tag.clone(),
            inner_text: doc.inner_text(id),
            text_content: doc.text_content(id),
            visible: doc.is_visible(id),
            enabled: !element.disabled,
            attributes: element.attributes.clone(),
        }
    }

    /// First match, which must be visible, and the control it belongs to
    fn target(&self, locator: &Locator) -> ProbeResult<Option<Control>> {
        let Some(id) = self.resolve(locator)?.into_iter().next() else {
            return Err(ProbeError::NotActionable {
                locator: locator.to_string(),
                reason: "no matching element".to_string(),
            });
        };
        if !self.rendered.document.is_visible(id) {
            return Err(ProbeError::NotActionable {
                locator: locator.to_string(),
                reason: "element is not visible".to_string(),
            });
        }
        Ok(self.rendered.control_for(id))
    }

    fn dispatch(
        &mut self,
        locator: &Locator,
        event: impl FnOnce(&mut TodoApp, Control) -> ProbeResult<()>,
    ) -> ProbeResult<()> {
        let control = self.target(locator)?;
        let url = &self.url;
        let app = self
            .app
            .as_mut()
            .ok_or_else(|| ProbeError::page(format!("no application loaded at {url}")))?;
        if let Some(control) = control {
            event(app, control)?;
        }
        self.rendered = app.render();
        Ok(())
    }
}

/// A page served by the simulated backend
#[derive(Debug, Default)]
pub struct SimulatedDriver {
    options: AppOptions,
    state: Mutex<State>,
}

impl SimulatedDriver {
    /// Driver for the stock application
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver whose application renders with `options`
    #[must_use]
    pub fn with_options(options: AppOptions) -> Self {
        Self {
            options,
            state: Mutex::default(),
        }
    }

    fn lock(&self) -> ProbeResult<MutexGuard<'_, State>> {
        let state = self
            .state
            .lock()
            .map_err(|_| ProbeError::page("simulated page state poisoned"))?;
        if state.closed {
            return Err(ProbeError::page("page has been closed"));
        }
        Ok(state)
    }
}

/// Path component of an absolute URL, without query or fragment
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.find('/').map_or("", |i| &rest[i..]);
    path.split(['?', '#']).next().unwrap_or_default()
}

#[async_trait]
impl PageDriver for SimulatedDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.lock()?;
        if url == "about:blank" {
            state.app = None;
            state.rendered = Rendered::default();
        } else if url_path(url).trim_end_matches('/').ends_with(APP_PATH) {
            let app = TodoApp::new(self.options.clone());
            state.rendered = app.render();
            state.app = Some(app);
        } else {
            return Err(ProbeError::Navigation {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            });
        }
        state.url = url.to_string();
        debug!(url, "simulated navigation");
        Ok(())
    }

    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>> {
        let state = self.lock()?;
        Ok(state
            .resolve(locator)?
            .into_iter()
            .map(|id| state.snapshot(id))
            .collect())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        self.lock()?.dispatch(locator, |app, control| app.fill(control, text))
    }

    async fn press(&self, locator: &Locator, key: Key) -> ProbeResult<()> {
        self.lock()?.dispatch(locator, |app, control| {
            app.press(control, key);
            Ok(())
        })
    }

    async fn hover(&self, locator: &Locator) -> ProbeResult<()> {
        self.lock()?.dispatch(locator, |app, control| {
            app.hover(control);
            Ok(())
        })
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.lock()?.dispatch(locator, |app, control| {
            app.click(control);
            Ok(())
        })
    }

    async fn screenshot(&self) -> ProbeResult<Option<Vec<u8>>> {
        let _state = self.lock()?;
        Ok(None)
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.lock()?.url.clone())
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.closed = true;
        state.app = None;
        Ok(())
    }
}

/// Hands out independent simulated pages
#[derive(Debug, Clone, Default)]
pub struct SimulatedBrowser {
    options: AppOptions,
}

impl SimulatedBrowser {
    /// Browser serving the stock application
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Browser whose pages render with `options`
    #[must_use]
    pub const fn with_options(options: AppOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl PageFactory for SimulatedBrowser {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
        Ok(Box::new(SimulatedDriver::with_options(self.options.clone())))
    }
}
