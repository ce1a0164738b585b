pub mod client;
pub mod discovery;
pub mod error;
pub mod extract;
mod pacing;
pub mod pipeline;
mod rate_limit;
pub mod shop;

pub use client::PageClient;
pub use discovery::browser::{BrowserPacing, BrowserStrategy, ChromiumLauncher};
pub use discovery::http::HttpStrategy;
pub use discovery::DiscoveryStrategy;
pub use error::{BrowserError, ScraperError};
pub use pipeline::{run_pipeline, PipelineError};
pub use shop::extract_shop_name;
