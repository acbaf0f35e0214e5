use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Base URL of the parking backend, e.g. `http://127.0.0.1:5000`.
    pub api_base_url: String,
    /// Address the page-facing HTTP surface listens on.
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub api_max_retries: u32,
    pub api_retry_backoff_ms: u64,
    pub gps_timeout_secs: u64,
    pub gps_max_age_secs: u64,
    /// Alternate gazetteer YAML; the embedded table is used when unset.
    pub gazetteer_path: Option<PathBuf>,
}

impl AppConfig {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    #[must_use]
    pub fn gps_timeout(&self) -> Duration {
        Duration::from_secs(self.gps_timeout_secs)
    }

    #[must_use]
    pub fn gps_max_age(&self) -> Duration {
        Duration::from_secs(self.gps_max_age_secs)
    }
}
