use std::path::PathBuf;

use crate::app_config::{
    AppConfig, DelayRange, DEFAULT_BASE_URL, DEFAULT_PLACEHOLDER_THUMBNAIL,
};
use crate::url::validate_url;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// configuration pointed at the hypermarket listing.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let optional_path = |var: &str| -> Option<PathBuf> {
        lookup(var)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
    };

    let base_url = validate_url(or_default("PROSPEKT_BASE_URL", DEFAULT_BASE_URL).trim());
    if base_url.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROSPEKT_BASE_URL".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let log_level = or_default("PROSPEKT_LOG_LEVEL", "info");
    let http_timeout_secs = parse_u64("PROSPEKT_HTTP_TIMEOUT_SECS", "15")?;
    let http_max_retries = parse_u32("PROSPEKT_HTTP_MAX_RETRIES", "5")?;
    let http_backoff_base_ms = parse_u64("PROSPEKT_HTTP_BACKOFF_BASE_MS", "500")?;

    let delay_min_ms = parse_u64("PROSPEKT_REQUEST_DELAY_MIN_MS", "2000")?;
    let delay_max_ms = parse_u64("PROSPEKT_REQUEST_DELAY_MAX_MS", "5000")?;
    if delay_min_ms > delay_max_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROSPEKT_REQUEST_DELAY_MIN_MS".to_string(),
            reason: format!(
                "minimum delay {delay_min_ms}ms exceeds maximum delay {delay_max_ms}ms"
            ),
        });
    }

    let browser_timeout_secs = parse_u64("PROSPEKT_BROWSER_TIMEOUT_SECS", "60")?;
    let chrome_path = optional_path("PROSPEKT_CHROME_PATH");
    let placeholder_thumbnail = or_default(
        "PROSPEKT_PLACEHOLDER_THUMBNAIL",
        DEFAULT_PLACEHOLDER_THUMBNAIL,
    );
    let debug_html_dir = optional_path("PROSPEKT_DEBUG_HTML_DIR");

    Ok(AppConfig {
        base_url,
        log_level,
        http_timeout_secs,
        http_max_retries,
        http_backoff_base_ms,
        request_delay: DelayRange::new(delay_min_ms, delay_max_ms),
        browser_timeout_secs,
        chrome_path,
        placeholder_thumbnail,
        debug_html_dir,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
