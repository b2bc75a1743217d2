use std::net::SocketAddr;
use std::path::PathBuf;

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the remote commerce API. `None` means every store starts
    /// in local-only mode and catalog queries go straight to the fallback.
    pub api_base_url: Option<String>,
    /// Value sent in the `x-demo-user` header, if set.
    pub demo_user: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub local_store_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Returns `true` when a remote endpoint is configured.
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.api_base_url.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("demo_user", &self.demo_user.as_ref().map(|_| "[redacted]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("local_store_dir", &self.local_store_dir)
            .field("catalog_path", &self.catalog_path)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
