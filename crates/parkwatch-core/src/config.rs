use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PARKWATCH_ENV", "development"))?;

    let api_base_url = match lookup("PARKWATCH_API_BASE_URL") {
        Ok(url) => url,
        Err(_) if env == Environment::Production => {
            return Err(ConfigError::MissingEnvVar(
                "PARKWATCH_API_BASE_URL".to_string(),
            ));
        }
        Err(_) => DEFAULT_API_BASE_URL.to_string(),
    };
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "PARKWATCH_API_BASE_URL",
            format!("'{api_base_url}' must start with http:// or https://"),
        ));
    }

    let bind_addr = or_default("PARKWATCH_BIND_ADDR", "127.0.0.1:8080")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("PARKWATCH_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("PARKWATCH_LOG_LEVEL", "info");

    let refresh_interval_secs = parse_u64("PARKWATCH_REFRESH_INTERVAL_SECS", "3")?;
    if refresh_interval_secs == 0 {
        return Err(invalid(
            "PARKWATCH_REFRESH_INTERVAL_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let request_timeout_secs = parse_u64("PARKWATCH_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("PARKWATCH_USER_AGENT", "parkwatch/0.1 (operations-dashboard)");
    let api_max_retries = parse_u32("PARKWATCH_API_MAX_RETRIES", "0")?;
    let api_retry_backoff_ms = parse_u64("PARKWATCH_API_RETRY_BACKOFF_MS", "500")?;
    let gps_timeout_secs = parse_u64("PARKWATCH_GPS_TIMEOUT_SECS", "10")?;
    let gps_max_age_secs = parse_u64("PARKWATCH_GPS_MAX_AGE_SECS", "60")?;
    let gazetteer_path = lookup("PARKWATCH_GAZETTEER_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        env,
        api_base_url,
        bind_addr,
        log_level,
        refresh_interval_secs,
        request_timeout_secs,
        user_agent,
        api_max_retries,
        api_retry_backoff_ms,
        gps_timeout_secs,
        gps_max_age_secs,
        gazetteer_path,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PARKWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
