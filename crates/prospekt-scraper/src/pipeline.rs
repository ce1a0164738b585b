//! Ordered-fallback orchestration of the discovery strategies.

use prospekt_core::{Clock, LeafletRecord};
use thiserror::Error;

use crate::discovery::DiscoveryStrategy;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no leaflets found by the {primary} or {fallback} strategy")]
    NoLeaflets {
        primary: &'static str,
        fallback: &'static str,
    },
}

/// Runs `primary`, and `fallback` exactly once if the primary found nothing.
///
/// Records without a `parsed_time` are stamped with one timestamp taken when
/// the run starts.
///
/// # Errors
///
/// Returns [`PipelineError::NoLeaflets`] when both strategies come back empty.
pub async fn run_pipeline<P, F>(
    primary: &P,
    fallback: &F,
    clock: &dyn Clock,
) -> Result<Vec<LeafletRecord>, PipelineError>
where
    P: DiscoveryStrategy,
    F: DiscoveryStrategy,
{
    run(primary, fallback, &clock.timestamp()).await
}

#[tracing::instrument(name = "run", skip_all, fields(started = %run_started))]
async fn run<P, F>(
    primary: &P,
    fallback: &F,
    run_started: &str,
) -> Result<Vec<LeafletRecord>, PipelineError>
where
    P: DiscoveryStrategy,
    F: DiscoveryStrategy,
{
    let mut records = discover_with_fallback(primary, fallback).await?;
    for record in &mut records {
        record.stamp_parsed_time(run_started);
    }
    tracing::info!(count = records.len(), "leaflet discovery finished");
    Ok(records)
}

async fn discover_with_fallback<P, F>(
    primary: &P,
    fallback: &F,
) -> Result<Vec<LeafletRecord>, PipelineError>
where
    P: DiscoveryStrategy,
    F: DiscoveryStrategy,
{
    tracing::info!(strategy = primary.name(), "starting leaflet discovery");
    let records = primary.discover().await;
    if !records.is_empty() {
        return Ok(records);
    }

    tracing::info!(
        strategy = fallback.name(),
        "{} strategy found nothing; trying fallback",
        primary.name()
    );
    let records = fallback.discover().await;
    if !records.is_empty() {
        return Ok(records);
    }

    tracing::error!("no leaflets found");
    Err(PipelineError::NoLeaflets {
        primary: primary.name(),
        fallback: fallback.name(),
    })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
