//! Real Chromium backend over the Chrome DevTools Protocol.
//!
//! Element queries run the locator's JavaScript query and return snapshots;
//! hover and click are real CDP mouse events at the element's center, so
//! `:hover` styles and pointer listeners fire the way they do for a user.

#![allow(clippy::cast_possible_truncation, clippy::missing_errors_doc)]

use crate::config::BrowserConfig;
use crate::driver::{ElementSnapshot, Key, PageDriver, PageFactory};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

fn page_err(e: impl Display) -> ProbeError {
    ProbeError::page(e.to_string())
}

fn input_err(e: impl Display) -> ProbeError {
    ProbeError::input(e.to_string())
}

/// JavaScript turning an element into an [`ElementSnapshot`]
const SNAPSHOT_JS: &str = "(el) => {\n\
    const style = getComputedStyle(el);\n\
    const box = el.getBoundingClientRect();\n\
    const attributes = {};\n\
    for (const a of el.attributes) attributes[a.name] = a.value;\n\
    return {\n\
        tag_name: el.tagName.toLowerCase(),\n\
        inner_text: el.innerText || '',\n\
        text_content: el.textContent || '',\n\
        visible: style.visibility !== 'hidden' && style.display !== 'none' && box.width > 0 && box.height > 0,\n\
        enabled: !el.disabled,\n\
        attributes,\n\
    };\n\
}";

#[derive(Debug, Clone, Copy, Deserialize)]
struct Point {
    x: f64,
    y: f64,
}

/// A launched Chromium process
#[derive(Debug)]
pub struct ChromiumBrowser {
    config: BrowserConfig,
    inner: Arc<Mutex<CdpBrowser>>,
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launch Chromium
    pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        info!(headless = config.headless, "chromium launched");
        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Get the browser configuration
    #[must_use]
    pub const fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Close the browser and wait for its event loop to finish
    pub async fn close(self) -> ProbeResult<()> {
        {
            let mut browser = self.inner.lock().await;
            let _ = browser.close().await.map_err(page_err)?;
        }
        if let Err(e) = self.handle.await {
            warn!(error = %e, "CDP handler task panicked");
        }
        Ok(())
    }
}

#[async_trait]
impl PageFactory for ChromiumBrowser {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
        let page = self
            .inner
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(page_err)?;
        Ok(Box::new(ChromiumDriver { page }))
    }
}

/// One Chromium tab
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    page: CdpPage,
}

impl ChromiumDriver {
    async fn eval<T: DeserializeOwned>(&self, expr: String) -> ProbeResult<T> {
        let result = self
            .page
            .evaluate(expr)
            .await
            .map_err(|e| ProbeError::Evaluation {
                message: e.to_string(),
            })?;
        result.into_value().map_err(|e| ProbeError::Evaluation {
            message: e.to_string(),
        })
    }

    /// Run `body` with `el` bound to the locator's first match; `null` when
    /// nothing matches
    fn on_first(locator: &Locator, body: &str) -> String {
        format!(
            "(() => {{ const el = {}[0]; if (!el) return null; {body} }})()",
            locator.to_js_query()
        )
    }

    async fn expect_target<T: DeserializeOwned>(
        &self,
        locator: &Locator,
        body: &str,
    ) -> ProbeResult<T> {
        let found: Option<T> = self.eval(Self::on_first(locator, body)).await?;
        found.ok_or_else(|| ProbeError::NotActionable {
            locator: locator.to_string(),
            reason: "no matching element".to_string(),
        })
    }

    async fn center(&self, locator: &Locator) -> ProbeResult<Point> {
        self.expect_target(
            locator,
            "el.scrollIntoView({ block: 'center', inline: 'center' }); \
             const r = el.getBoundingClientRect(); \
             return { x: r.left + r.width / 2, y: r.top + r.height / 2 };",
        )
        .await
    }

    async fn mouse(&self, kind: DispatchMouseEventType, at: Point) -> ProbeResult<()> {
        let mut builder = DispatchMouseEventParams::builder()
            .r#type(kind.clone())
            .x(at.x)
            .y(at.y);
        if kind != DispatchMouseEventType::MouseMoved {
            builder = builder.button(MouseButton::Left).click_count(1);
        }
        let params = builder.build().map_err(input_err)?;
        let _ = self.page.execute(params).await.map_err(input_err)?;
        Ok(())
    }

    async fn key(&self, kind: DispatchKeyEventType, key: Key) -> ProbeResult<()> {
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind.clone())
            .key(key.name())
            .code(key.name())
            .windows_virtual_key_code(key.key_code());
        if matches!(kind, DispatchKeyEventType::KeyDown) {
            builder = builder.text(key.text());
        }
        let params = builder.build().map_err(input_err)?;
        let _ = self.page.execute(params).await.map_err(input_err)?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let _ = self
            .page
            .goto(url)
            .await
            .map_err(|e| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementSnapshot>> {
        self.eval(format!(
            "{}.map({SNAPSHOT_JS})",
            locator.to_js_query()
        ))
        .await
    }

    async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        let value = serde_json::to_string(text)?;
        // The native setter keeps framework-managed inputs in sync.
        let body = format!(
            "el.focus(); \
             const proto = Object.getPrototypeOf(el); \
             const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
             setter.call(el, {value}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true;"
        );
        let _: bool = self.expect_target(locator, &body).await?;
        Ok(())
    }

    async fn press(&self, locator: &Locator, key: Key) -> ProbeResult<()> {
        let _: bool = self
            .expect_target(locator, "el.focus(); return true;")
            .await?;
        self.key(DispatchKeyEventType::KeyDown, key).await?;
        self.key(DispatchKeyEventType::KeyUp, key).await
    }

    async fn hover(&self, locator: &Locator) -> ProbeResult<()> {
        let at = self.center(locator).await?;
        self.mouse(DispatchMouseEventType::MouseMoved, at).await
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let at = self.center(locator).await?;
        self.mouse(DispatchMouseEventType::MouseMoved, at).await?;
        self.mouse(DispatchMouseEventType::MousePressed, at).await?;
        self.mouse(DispatchMouseEventType::MouseReleased, at).await
    }

    async fn screenshot(&self) -> ProbeResult<Option<Vec<u8>>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })?;
        Ok(Some(bytes))
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(page_err)?
            .unwrap_or_default())
    }

    async fn close(&self) -> ProbeResult<()> {
        self.page.clone().close().await.map_err(page_err)
    }
}
