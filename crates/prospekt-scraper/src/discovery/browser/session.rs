//! The page-automation surface the browser strategy needs.
//!
//! Kept deliberately small so the strategy can be driven by a scripted fake
//! in tests; [`super::chromium`] provides the real implementation.

use serde::Deserialize;

use crate::error::BrowserError;

/// How a selector string is evaluated in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementQuery<'a> {
    Css(&'a str),
    XPath(&'a str),
}

impl ElementQuery<'_> {
    #[must_use]
    pub fn selector(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }
}

/// Result of evaluating one [`ElementQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QueryMatches {
    /// Total number of matching elements in the page.
    pub count: usize,
    /// Outer HTML of the first matches, capped by the query limit.
    pub outer_html: Vec<String>,
}

/// An `<img>` element as rendered in the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageImage {
    /// Raw `src` attribute, empty when absent.
    pub src: String,
    /// Raw `alt` attribute, empty when absent.
    pub alt: String,
    /// Whether the element has a non-empty box and is not hidden.
    pub visible: bool,
}

#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    /// Navigates to `url` and returns the HTTP status of the main document,
    /// or `None` when the browser did not report one.
    async fn open(&self, url: &str) -> Result<Option<u16>, BrowserError>;

    /// Current `document.body.scrollHeight`.
    async fn scroll_height(&self) -> Result<f64, BrowserError>;

    async fn scroll_to(&self, y: f64) -> Result<(), BrowserError>;

    /// Evaluates `query`, returning the total count and the outer HTML of at
    /// most `limit` matches in document order.
    async fn query(&self, query: ElementQuery<'_>, limit: usize)
        -> Result<QueryMatches, BrowserError>;

    /// Every `<img>` in document order.
    async fn images(&self) -> Result<Vec<PageImage>, BrowserError>;

    /// Serialized DOM of the current page.
    async fn content(&self) -> Result<String, BrowserError>;

    /// Shuts the session down. Called exactly once on every exit path.
    async fn close(self) -> Result<(), BrowserError>;
}

#[allow(async_fn_in_trait)]
pub trait BrowserLauncher {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session, BrowserError>;
}
