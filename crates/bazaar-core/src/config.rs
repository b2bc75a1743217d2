use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a valid
/// local-only configuration.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates can leave keys blank.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
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

    let env = parse_environment(&or_default("BAZAAR_ENV", "development"))?;
    let log_level = or_default("BAZAAR_LOG_LEVEL", "info");

    let api_base_url = optional("BAZAAR_API_BASE_URL");
    if let Some(url) = &api_base_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidEnvVar {
                var: "BAZAAR_API_BASE_URL".to_string(),
                reason: format!("expected an http(s) URL, got \"{url}\""),
            });
        }
    }
    let demo_user = optional("BAZAAR_DEMO_USER");

    let request_timeout_secs = parse_u64("BAZAAR_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("BAZAAR_USER_AGENT", "bazaar/0.1 (commerce-data-layer)");
    let max_retries = parse_u32("BAZAAR_MAX_RETRIES", "0")?;
    let retry_backoff_base_ms = parse_u64("BAZAAR_RETRY_BACKOFF_BASE_MS", "250")?;

    let local_store_dir = PathBuf::from(or_default("BAZAAR_LOCAL_STORE_DIR", "./.bazaar"));
    let catalog_path = PathBuf::from(or_default("BAZAAR_CATALOG_PATH", "./config/catalog.yaml"));

    let bind_addr = or_default("BAZAAR_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "BAZAAR_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        demo_user,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        local_store_dir,
        catalog_path,
        bind_addr,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BAZAAR_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
