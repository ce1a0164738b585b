//! Fast path: fetch the listing page over HTTP and parse it in-process.

use std::path::PathBuf;
use std::sync::Arc;

use prospekt_core::dates::parse_date_range;
use prospekt_core::{AppConfig, Clock, DelayRange, LeafletFields, LeafletRecord};
use reqwest::Url;
use scraper::Html;

use super::candidates::collect_candidates;
use super::{dump_html, DiscoveryStrategy};
use crate::client::PageClient;
use crate::error::ScraperError;
use crate::extract::DiscoveredBlock;
use crate::pacing::pause;
use crate::shop::extract_shop_name;

/// Periods a text fragment needs before it is treated as the date line.
const DATE_MIN_PERIODS: usize = 2;

const DEBUG_HTML_FILE: &str = "http_page.html";

pub struct HttpStrategy {
    client: PageClient,
    base_url: Url,
    request_delay: DelayRange,
    placeholder_thumbnail: String,
    debug_html_dir: Option<PathBuf>,
    clock: Arc<dyn Clock>,
}

impl HttpStrategy {
    /// Builds the strategy from the application configuration.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] — `base_url` is not an absolute URL.
    /// - [`ScraperError::Http`] — the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, ScraperError> {
        let client = PageClient::new(
            config.http_timeout_secs,
            config.http_max_retries,
            config.http_backoff_base_ms,
        )?;
        let base_url = parse_base_url(&config.base_url)?;
        Ok(Self {
            client,
            base_url,
            request_delay: config.request_delay,
            placeholder_thumbnail: config.placeholder_thumbnail.clone(),
            debug_html_dir: config.debug_html_dir.clone(),
            clock,
        })
    }
}

impl DiscoveryStrategy for HttpStrategy {
    fn name(&self) -> &'static str {
        "http"
    }

    #[tracing::instrument(name = "http_discovery", skip(self), fields(url = %self.base_url))]
    async fn discover(&self) -> Vec<LeafletRecord> {
        pause(self.request_delay).await;
        tracing::info!("loading page");

        let html = match self.client.fetch_page(self.base_url.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(error = %e, "error loading page");
                return Vec::new();
            }
        };
        dump_html(self.debug_html_dir.as_deref(), DEBUG_HTML_FILE, &html).await;

        let records = extract_leaflets(
            &html,
            &self.base_url,
            &self.placeholder_thumbnail,
            self.clock.as_ref(),
        );
        if records.is_empty() {
            tracing::warn!("no leaflets found with the HTTP strategy");
        }
        records
    }
}

/// Parses a listing page and builds one record per usable candidate block.
#[must_use]
pub fn extract_leaflets(
    html: &str,
    base_url: &Url,
    placeholder_thumbnail: &str,
    clock: &dyn Clock,
) -> Vec<LeafletRecord> {
    let doc = Html::parse_document(html);
    let mut records = Vec::new();

    for (index, element) in collect_candidates(&doc).into_iter().enumerate() {
        let block = DiscoveredBlock::new(element);
        match record_from_block(&block, base_url, placeholder_thumbnail, clock) {
            Some(record) => {
                tracing::info!(
                    title = record.title(),
                    valid_from = record.valid_from(),
                    valid_to = record.valid_to(),
                    "added leaflet"
                );
                records.push(record);
            }
            None => tracing::debug!(block = index + 1, "skipping block without text"),
        }
    }

    records
}

fn record_from_block(
    block: &DiscoveredBlock<'_>,
    base_url: &Url,
    placeholder_thumbnail: &str,
    clock: &dyn Clock,
) -> Option<LeafletRecord> {
    if block.texts().is_empty() {
        return None;
    }

    let thumbnail = block
        .usable_thumbnail(base_url)
        .unwrap_or_else(|| placeholder_thumbnail.to_owned());
    let title = block.title();
    let shop_name = extract_shop_name(&title, block.texts());
    let (valid_from, valid_to) = parse_date_range(block.date_text(DATE_MIN_PERIODS), clock);

    Some(LeafletRecord::new(
        LeafletFields {
            title,
            thumbnail,
            shop_name,
            valid_from,
            valid_to,
            parsed_time: None,
        },
        clock,
    ))
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ScraperError> {
    Url::parse(raw).map_err(|e| ScraperError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
