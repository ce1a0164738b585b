//! Headless Chromium sessions over the DevTools protocol.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use prospekt_core::AppConfig;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use super::session::{BrowserLauncher, BrowserSession, ElementQuery, PageImage, QueryMatches};
use crate::client::{ACCEPT_LANGUAGE_DE, DESKTOP_CHROME_UA};
use crate::error::BrowserError;

const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;

/// Status of the main document, read from the navigation timing entry.
const NAVIGATION_STATUS_JS: &str = "JSON.stringify((function () {
  var entry = performance.getEntriesByType('navigation')[0];
  return entry && entry.responseStatus ? entry.responseStatus : null;
})())";

/// Number of loaded resources once the document is complete, else `null`.
const LOAD_STATE_JS: &str = "JSON.stringify(document.readyState === 'complete'
  ? performance.getEntriesByType('resource').length
  : null)";

/// Polls for a quiet network after navigation, at most 10 s in total.
const QUIET_POLL_ATTEMPTS: u32 = 40;
const QUIET_POLL_INTERVAL: Duration = Duration::from_millis(250);

const IMAGES_JS: &str = "JSON.stringify(Array.prototype.map.call(document.images, function (img) {
  var rect = img.getBoundingClientRect();
  var style = window.getComputedStyle(img);
  return {
    src: img.getAttribute('src') || '',
    alt: img.getAttribute('alt') || '',
    visible: rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden'
  };
}))";

/// Launches a fresh headless Chromium per discovery run.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    chrome_path: Option<PathBuf>,
    request_timeout: Duration,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(chrome_path: Option<PathBuf>, request_timeout: Duration) -> Self {
        Self {
            chrome_path,
            request_timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.chrome_path.clone(),
            Duration::from_secs(config.browser_timeout_secs),
        )
    }

    fn browser_config(&self) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .arg("--lang=de-DE")
            .arg(format!("--user-agent={DESKTOP_CHROME_UA}"))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .viewport(Viewport {
                width: WINDOW_WIDTH,
                height: WINDOW_HEIGHT,
                ..Viewport::default()
            })
            .request_timeout(self.request_timeout);
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(BrowserError::Config)
    }
}

impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self) -> Result<ChromiumSession, BrowserError> {
        let (browser, mut handler) = Browser::launch(self.browser_config()?).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "browser handler event failed");
                }
            }
        });

        let page = match open_blank_page(&browser).await {
            Ok(page) => page,
            Err(e) => {
                let session = ChromiumSession {
                    browser,
                    page: None,
                    handler,
                };
                if let Err(close_err) = session.close().await {
                    tracing::warn!(error = %close_err, "failed to close browser after setup error");
                }
                return Err(e);
            }
        };

        tracing::debug!("headless browser started");
        Ok(ChromiumSession {
            browser,
            page: Some(page),
            handler,
        })
    }
}

async fn open_blank_page(browser: &Browser) -> Result<Page, BrowserError> {
    let page = browser.new_page("about:blank").await?;
    let headers = Headers::new(serde_json::json!({ "Accept-Language": ACCEPT_LANGUAGE_DE }));
    page.execute(SetExtraHttpHeadersParams::new(headers)).await?;
    Ok(page)
}

/// Resource-count samples between polls. The page counts as quiet once it
/// has finished loading and the count did not change since the last sample.
#[derive(Debug, Default)]
struct QuietTracker {
    last: Option<usize>,
}

impl QuietTracker {
    fn observe(&mut self, sample: Option<usize>) -> bool {
        let quiet = sample.is_some() && sample == self.last;
        self.last = sample;
        quiet
    }
}

/// One browser process with a single page.
pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, BrowserError> {
        self.page
            .as_ref()
            .ok_or_else(|| BrowserError::Config("browser page is not open".to_owned()))
    }

    /// Evaluates an expression that returns a JSON string and decodes it.
    /// Waits until the document has loaded and no new resources arrived
    /// between two polls. Gives up quietly when the page keeps loading.
    async fn wait_for_network_quiet(&self) {
        let mut tracker = QuietTracker::default();
        for _ in 0..QUIET_POLL_ATTEMPTS {
            tokio::time::sleep(QUIET_POLL_INTERVAL).await;
            match self.eval_json::<Option<usize>>("load state", LOAD_STATE_JS.to_owned()).await {
                Ok(sample) if tracker.observe(sample) => return,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "could not read load state");
                    return;
                }
            }
        }
        tracing::debug!("network did not go quiet; continuing");
    }

    async fn eval_json<T: DeserializeOwned>(
        &self,
        context: &str,
        expression: String,
    ) -> Result<T, BrowserError> {
        let script_error = |source| BrowserError::Script {
            context: context.to_owned(),
            source,
        };
        let raw: String = self
            .page()?
            .evaluate_expression(expression)
            .await?
            .into_value()
            .map_err(script_error)?;
        serde_json::from_str(&raw).map_err(script_error)
    }
}

impl BrowserSession for ChromiumSession {
    async fn open(&self, url: &str) -> Result<Option<u16>, BrowserError> {
        self.page()?.goto(url).await?;
        self.wait_for_network_quiet().await;
        self.eval_json("navigation status", NAVIGATION_STATUS_JS.to_owned())
            .await
    }

    async fn scroll_height(&self) -> Result<f64, BrowserError> {
        self.eval_json(
            "scroll height",
            "JSON.stringify(document.body.scrollHeight)".to_owned(),
        )
        .await
    }

    async fn scroll_to(&self, y: f64) -> Result<(), BrowserError> {
        self.page()?
            .evaluate_expression(format!("window.scrollTo(0, {y})"))
            .await?;
        Ok(())
    }

    async fn query(
        &self,
        query: ElementQuery<'_>,
        limit: usize,
    ) -> Result<QueryMatches, BrowserError> {
        let selector = serde_json::to_string(query.selector()).map_err(|source| {
            BrowserError::Script {
                context: "selector encoding".to_owned(),
                source,
            }
        })?;
        let collect = match query {
            ElementQuery::Css(_) => {
                "nodes = Array.prototype.slice.call(document.querySelectorAll(selector));"
            }
            ElementQuery::XPath(_) => {
                "var snapshot = document.evaluate(selector, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
  for (var i = 0; i < snapshot.snapshotLength; i++) { nodes.push(snapshot.snapshotItem(i)); }"
            }
        };
        let expression = format!(
            "JSON.stringify((function () {{
  var selector = {selector};
  var nodes = [];
  {collect}
  return {{
    count: nodes.length,
    outer_html: nodes.slice(0, {limit}).map(function (node) {{ return node.outerHTML || ''; }})
  }};
}})())"
        );
        self.eval_json(query.selector(), expression).await
    }

    async fn images(&self) -> Result<Vec<PageImage>, BrowserError> {
        self.eval_json("images", IMAGES_JS.to_owned()).await
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(self.page()?.content().await?)
    }

    async fn close(mut self) -> Result<(), BrowserError> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!(error = %e, "browser process did not exit cleanly");
        }
        self.handler.abort();
        closed?;
        tracing::debug!("headless browser closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_after_two_equal_samples() {
        let mut tracker = QuietTracker::default();
        assert!(!tracker.observe(Some(12)));
        assert!(tracker.observe(Some(12)));
    }

    #[test]
    fn growing_resource_count_is_not_quiet() {
        let mut tracker = QuietTracker::default();
        assert!(!tracker.observe(Some(3)));
        assert!(!tracker.observe(Some(7)));
        assert!(!tracker.observe(Some(9)));
        assert!(tracker.observe(Some(9)));
    }

    #[test]
    fn loading_document_is_never_quiet() {
        let mut tracker = QuietTracker::default();
        assert!(!tracker.observe(None));
        assert!(!tracker.observe(None));
        assert!(!tracker.observe(Some(4)));
        assert!(tracker.observe(Some(4)));
    }
}
