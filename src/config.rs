use std::env;
use std::time::Duration;

/// AppConfig
///
/// Holds the client's entire configuration state. The struct is immutable once
/// loaded and is handed to the application root, which owns every store built
/// from it.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the REST backend (e.g. "https://api.example.com/api").
    pub api_base_url: String,
    // Base URL used to resolve backend-relative asset keys (images, files).
    pub assets_base_url: String,
    // Runtime environment marker. Controls fallback behavior at load time.
    pub env: Env,
    // Per-request transport timeout. No other deadline logic exists.
    pub request_timeout: Duration,
}

/// Env
///
/// Defines the runtime context: permissive localhost defaults in development,
/// mandatory explicit configuration in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Default for AppConfig {
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup, without requiring any environment variables.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            assets_base_url: "http://localhost:8000/static".to_string(),
            env: Env::Local,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// The canonical function for initializing configuration at startup.
    /// Reads all parameters from environment variables and fails fast.
    ///
    /// # Panics
    /// Panics if a variable required for the current runtime environment
    /// (especially Production) is not set. Starting with an incomplete
    /// configuration is never allowed.
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        match env {
            Env::Local => Self {
                api_base_url: env::var("API_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
                // Local asset resolution defaults to the dev backend's static mount.
                assets_base_url: env::var("ASSETS_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8000/static".to_string()),
                env: Env::Local,
                request_timeout,
            },
            Env::Production => {
                let api_base_url =
                    env::var("API_BASE_URL").expect("FATAL: API_BASE_URL required in production");
                // Assets fall back to the API host when no CDN is configured.
                let assets_base_url =
                    env::var("ASSETS_BASE_URL").unwrap_or_else(|_| api_base_url.clone());
                Self {
                    api_base_url,
                    assets_base_url,
                    env: Env::Production,
                    request_timeout,
                }
            }
        }
    }

    /// Resolves a backend-relative asset key (e.g. "avatars/u1.png") against
    /// the configured assets base URL.
    pub fn asset_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.assets_base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }
}
