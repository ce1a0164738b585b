//! Fallback path: render the listing page in a headless browser.
//!
//! Used when the plain HTTP fetch yields nothing, typically because the
//! listing is assembled client-side. The page is opened, scrolled to trigger
//! lazy loading, and probed with ordered selector groups; elements are
//! re-parsed from their outer HTML and run through the same block extractor as
//! the HTTP path. If no selector produces a record, leaflet-looking images are
//! turned into minimal records instead.

mod chromium;
pub mod session;

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use prospekt_core::dates::{fallback_window, format_date, scan_full_dates, try_parse_date_range};
use prospekt_core::{AppConfig, Clock, DelayRange, LeafletFields, LeafletRecord};
use regex::Regex;
use reqwest::Url;
use scraper::Html;

pub use chromium::{ChromiumLauncher, ChromiumSession};
pub use session::{BrowserLauncher, BrowserSession, ElementQuery, PageImage, QueryMatches};

use super::http::parse_base_url;
use super::{dump_html, DiscoveryStrategy};
use crate::error::{BrowserError, ScraperError};
use crate::extract::{resolve_url, DiscoveredBlock};
use crate::pacing::pause;
use crate::shop::extract_shop_name;

/// Periods a text fragment needs before it is treated as the date line.
/// Rendered blocks carry more punctuation than the static listing.
const DATE_MIN_PERIODS: usize = 4;

/// Elements examined per matching selector.
const ELEMENTS_PER_SELECTOR: usize = 10;

/// Images turned into records by the last-resort heuristic.
const MAX_IMAGE_RECORDS: usize = 10;

const SCROLL_STEPS: u32 = 10;

/// Scroll position, as a share of the page height, revisited after reaching
/// the bottom.
const SCROLL_REVISIT_FRACTION: f64 = 0.7;

const UNKNOWN_STORE: &str = "Unknown store";

const DEBUG_HTML_FILE: &str = "browser_page.html";

/// Selector groups, tried in order. A group stops at its first selector that
/// yields records; the search stops at the first group that does.
const SELECTOR_GROUPS: [&[ElementQuery<'static>]; 6] = [
    &[
        ElementQuery::XPath("//div[contains(text(), 'Prospekt')]"),
        ElementQuery::XPath("//div[contains(text(), 'Vorschau')]"),
    ],
    &[
        ElementQuery::XPath("//a[contains(text(), 'Zeige den Prospekt')]"),
        ElementQuery::XPath("//button[contains(text(), 'Zeige den Prospekt')]"),
    ],
    &[
        ElementQuery::Css(".aktuelle-prospekte-item"),
        ElementQuery::Css(".prospekt-item"),
        ElementQuery::Css(".prospektitem"),
    ],
    &[
        ElementQuery::Css(".col-sm-4 .item"),
        ElementQuery::Css(".col-md-3 .item"),
        ElementQuery::Css(".grid-item"),
    ],
    &[
        ElementQuery::Css("article.module"),
        ElementQuery::Css("article.item"),
        ElementQuery::Css("div.item"),
    ],
    &[
        ElementQuery::Css(".row .prospekt-container"),
        ElementQuery::Css(".leaflet-preview-container"),
    ],
];

static LEAFLET_IMAGE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)prospekt|leaflet|flyer|katalog|angebot|aktion")
        .expect("valid leaflet image regex")
});

/// Randomized waits applied while the page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserPacing {
    /// After navigation, before the first scroll.
    pub settle: DelayRange,
    /// Between the incremental scroll steps.
    pub scroll_step: DelayRange,
    /// After each jump to the bottom of the page.
    pub bottom_linger: DelayRange,
    /// After the jump back up to 70 % of the page.
    pub revisit_linger: DelayRange,
}

impl BrowserPacing {
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            settle: DelayRange::new(2_000, 3_000),
            scroll_step: DelayRange::new(500, 1_000),
            bottom_linger: DelayRange::new(1_000, 1_000),
            revisit_linger: DelayRange::new(500, 500),
        }
    }

    /// No waiting at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            settle: DelayRange::zero(),
            scroll_step: DelayRange::zero(),
            bottom_linger: DelayRange::zero(),
            revisit_linger: DelayRange::zero(),
        }
    }
}

impl Default for BrowserPacing {
    fn default() -> Self {
        Self::standard()
    }
}

pub struct BrowserStrategy<L = ChromiumLauncher> {
    launcher: L,
    base_url: Url,
    pacing: BrowserPacing,
    placeholder_thumbnail: String,
    debug_html_dir: Option<PathBuf>,
    clock: Arc<dyn Clock>,
}

impl BrowserStrategy<ChromiumLauncher> {
    /// Builds a Chromium-backed strategy from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `base_url` is not an absolute
    /// URL.
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, ScraperError> {
        Self::with_launcher(ChromiumLauncher::from_config(config), config, clock)
    }
}

impl<L: BrowserLauncher> BrowserStrategy<L> {
    /// Builds the strategy around an arbitrary session launcher.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `base_url` is not an absolute
    /// URL.
    pub fn with_launcher(
        launcher: L,
        config: &AppConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            launcher,
            base_url: parse_base_url(&config.base_url)?,
            pacing: BrowserPacing::standard(),
            placeholder_thumbnail: config.placeholder_thumbnail.clone(),
            debug_html_dir: config.debug_html_dir.clone(),
            clock,
        })
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: BrowserPacing) -> Self {
        self.pacing = pacing;
        self
    }

    async fn collect(&self, session: &L::Session) -> Vec<LeafletRecord> {
        match session.open(self.base_url.as_str()).await {
            Ok(Some(status)) if status < 400 => {
                tracing::debug!(status, "page loaded");
            }
            Ok(status) => {
                tracing::error!(status = ?status, "error loading page");
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(error = %e, "error loading page");
                return Vec::new();
            }
        }

        pause(self.pacing.settle).await;
        self.scroll(session).await;

        if self.debug_html_dir.is_some() {
            match session.content().await {
                Ok(html) => dump_html(self.debug_html_dir.as_deref(), DEBUG_HTML_FILE, &html).await,
                Err(e) => tracing::warn!(error = %e, "could not read rendered HTML"),
            }
        }

        let records = self.match_selector_groups(session).await;
        if !records.is_empty() {
            return records;
        }

        tracing::info!("no leaflets found by selectors, searching images");
        self.match_images(session).await
    }

    /// Scrolls down in steps, then bottom, 70 %, bottom again, so lazy
    /// content has a chance to load. Failures are logged and end scrolling.
    async fn scroll(&self, session: &L::Session) {
        if let Err(e) = self.try_scroll(session).await {
            tracing::error!(error = %e, "error when scrolling the page");
        }
    }

    async fn try_scroll(&self, session: &L::Session) -> Result<(), BrowserError> {
        let height = session.scroll_height().await?;
        for step in 1..=SCROLL_STEPS {
            session
                .scroll_to(height * f64::from(step) / f64::from(SCROLL_STEPS))
                .await?;
            pause(self.pacing.scroll_step).await;
        }

        session.scroll_to(session.scroll_height().await?).await?;
        pause(self.pacing.bottom_linger).await;
        session
            .scroll_to(session.scroll_height().await? * SCROLL_REVISIT_FRACTION)
            .await?;
        pause(self.pacing.revisit_linger).await;
        session.scroll_to(session.scroll_height().await?).await?;
        pause(self.pacing.bottom_linger).await;
        Ok(())
    }

    async fn match_selector_groups(&self, session: &L::Session) -> Vec<LeafletRecord> {
        let mut records = Vec::new();

        for group in SELECTOR_GROUPS {
            for query in group {
                let selector = query.selector();
                tracing::info!(selector, "searching leaflets by selector");

                let matches = match session.query(*query, ELEMENTS_PER_SELECTOR).await {
                    Ok(matches) => matches,
                    Err(e) => {
                        tracing::error!(selector, error = %e, "error when using selector");
                        continue;
                    }
                };
                if matches.count == 0 {
                    continue;
                }
                tracing::info!(selector, count = matches.count, "found items by selector");

                for (index, outer_html) in matches.outer_html.iter().enumerate() {
                    match self.record_from_html(outer_html) {
                        Some(record) if !records.contains(&record) => {
                            tracing::info!(
                                title = record.title(),
                                valid_from = record.valid_from(),
                                valid_to = record.valid_to(),
                                "added leaflet"
                            );
                            records.push(record);
                        }
                        Some(_) => {}
                        None => tracing::debug!(
                            selector,
                            element = index + 1,
                            "skipping element without text or image"
                        ),
                    }
                }

                if !records.is_empty() {
                    break;
                }
            }

            if !records.is_empty() {
                break;
            }
        }

        records
    }

    /// Builds a record from one element's outer HTML. `None` when the
    /// element has neither text nor a usable image.
    fn record_from_html(&self, outer_html: &str) -> Option<LeafletRecord> {
        let fragment = Html::parse_fragment(outer_html);
        let block = DiscoveredBlock::new(fragment.root_element());

        let image = block.usable_thumbnail(&self.base_url);
        if block.texts().is_empty() && image.is_none() {
            return None;
        }

        let title = block.title();
        let shop_name = extract_shop_name(&title, block.texts());
        let (from, to) = self.validity_window(&block);

        Some(LeafletRecord::new(
            LeafletFields {
                title,
                thumbnail: image.unwrap_or_else(|| self.placeholder_thumbnail.clone()),
                shop_name,
                valid_from: format_date(from),
                valid_to: format_date(to),
                parsed_time: None,
            },
            self.clock.as_ref(),
        ))
    }

    /// Strict parse of the date line, then any two full dates anywhere in
    /// the block, then the default window.
    fn validity_window(
        &self,
        block: &DiscoveredBlock<'_>,
    ) -> (chrono::NaiveDate, chrono::NaiveDate) {
        let clock = self.clock.as_ref();
        if let Some(range) = try_parse_date_range(block.date_text(DATE_MIN_PERIODS), clock) {
            return range;
        }
        if let Some(range) = scan_full_dates(&block.texts().join(" ")) {
            tracing::debug!("dates recovered from block text");
            return range;
        }
        fallback_window(clock)
    }

    async fn match_images(&self, session: &L::Session) -> Vec<LeafletRecord> {
        let images = match session.images().await {
            Ok(images) => images,
            Err(e) => {
                tracing::error!(error = %e, "error reading page images");
                return Vec::new();
            }
        };
        tracing::info!(count = images.len(), "images found on the page");

        let suitable: Vec<&PageImage> = images.iter().filter(|img| is_leaflet_image(img)).collect();
        tracing::info!(count = suitable.len(), "suitable images found");

        let (from, to) = fallback_window(self.clock.as_ref());
        let mut records = Vec::new();
        for image in suitable.into_iter().take(MAX_IMAGE_RECORDS) {
            let thumbnail = match resolve_url(&self.base_url, &image.src) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!(src = %image.src, error = %e, "image processing error");
                    continue;
                }
            };
            let shop_name = if image.alt.trim().is_empty() {
                UNKNOWN_STORE.to_owned()
            } else {
                image.alt.clone()
            };
            let record = LeafletRecord::new(
                LeafletFields {
                    title: format!("Prospekt {shop_name}"),
                    thumbnail,
                    shop_name,
                    valid_from: format_date(from),
                    valid_to: format_date(to),
                    parsed_time: None,
                },
                self.clock.as_ref(),
            );
            if !records.contains(&record) {
                tracing::info!(shop_name = record.shop_name(), "added leaflet from image");
                records.push(record);
            }
        }
        records
    }
}

/// Visible image with a `src` whose source or alt text looks like a leaflet.
fn is_leaflet_image(image: &PageImage) -> bool {
    image.visible
        && !image.src.is_empty()
        && (LEAFLET_IMAGE_HINT.is_match(&image.src) || LEAFLET_IMAGE_HINT.is_match(&image.alt))
}

impl<L: BrowserLauncher> DiscoveryStrategy for BrowserStrategy<L> {
    fn name(&self) -> &'static str {
        "browser"
    }

    #[tracing::instrument(name = "browser_discovery", skip(self), fields(url = %self.base_url))]
    async fn discover(&self) -> Vec<LeafletRecord> {
        tracing::info!("opening page in headless browser");
        let session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "could not start headless browser");
                return Vec::new();
            }
        };

        let records = self.collect(&session).await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "error closing headless browser");
        }
        if records.is_empty() {
            tracing::warn!("no leaflets found; consider changing the URL or scraping method");
        }
        records
    }
}
