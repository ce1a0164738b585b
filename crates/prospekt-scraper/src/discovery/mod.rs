//! Leaflet discovery strategies.
//!
//! Each strategy turns the configured listing page into normalized
//! [`LeafletRecord`]s on its own; the pipeline composes them by ordered
//! fallback. A strategy never fails outward: a page it cannot read yields an
//! empty list.

pub mod browser;
mod candidates;
pub mod http;

use std::path::Path;

use prospekt_core::LeafletRecord;

#[allow(async_fn_in_trait)]
pub trait DiscoveryStrategy {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn discover(&self) -> Vec<LeafletRecord>;
}

/// Writes `html` to `dir/file_name` when a debug directory is configured.
/// Failures are logged and otherwise ignored.
pub(crate) async fn dump_html(dir: Option<&Path>, file_name: &str, html: &str) {
    let Some(dir) = dir else {
        return;
    };
    let path = dir.join(file_name);
    let written = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, html).await
    }
    .await;
    match written {
        Ok(()) => tracing::debug!(path = %path.display(), "saved page HTML"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not save page HTML"),
    }
}
