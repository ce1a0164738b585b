use std::path::PathBuf;

/// Default listing page: the hypermarket category of the aggregator.
pub const DEFAULT_BASE_URL: &str = "https://www.prospektmaschine.de/hypermarkte/";

/// Thumbnail used when a leaflet block carries no usable image.
pub const DEFAULT_PLACEHOLDER_THUMBNAIL: &str =
    "https://www.prospektmaschine.de/static/images/default-leaflet.jpg";

/// Inclusive range of milliseconds from which a randomized pause is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that never sleeps. Used by tests and dry runs.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,
    pub http_backoff_base_ms: u64,
    pub request_delay: DelayRange,
    pub browser_timeout_secs: u64,
    pub chrome_path: Option<PathBuf>,
    pub placeholder_thumbnail: String,
    pub debug_html_dir: Option<PathBuf>,
}
