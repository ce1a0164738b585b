mod export;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use prospekt_core::{AppConfig, Clock, SystemClock};
use prospekt_scraper::{run_pipeline, BrowserStrategy, HttpStrategy};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "prospekt")]
#[command(about = "Collect current retail leaflets and export them as JSON and JavaScript")]
struct Cli {
    /// Path of the JSON output; the JavaScript module is written next to it.
    #[arg(short, long, default_value = "./output.json")]
    output: PathBuf,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match prospekt_core::load_app_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config, cli.verbose) {
        eprintln!("could not initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("scraping failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins, then `--verbose`, then the configured level.
fn init_tracing(config: &AppConfig, verbose: bool) -> anyhow::Result<()> {
    let fallback = if verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let http = HttpStrategy::from_config(config, Arc::clone(&clock))
        .context("failed to build HTTP strategy")?;
    let browser = BrowserStrategy::from_config(config, Arc::clone(&clock))
        .context("failed to build browser strategy")?;

    let records = run_pipeline(&http, &browser, clock.as_ref()).await?;
    tracing::info!(count = records.len(), "leaflets collected");

    export::export_json(&records, &cli.output)?;
    tracing::info!(path = %cli.output.display(), "exported JSON");

    let js_path = export::js_output_path(&cli.output);
    export::export_javascript(&records, &js_path)?;
    tracing::info!(path = %js_path.display(), "exported JavaScript module");

    Ok(())
}

#[cfg(test)]
mod tests;
