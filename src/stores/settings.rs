use tokio::sync::Mutex;

use crate::coalesce::RequestCoalescer;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::SiteSettings;

const SETTINGS_KEY: &str = "site_settings";

/// SettingsStore
///
/// The one read path with stronger guarantees than the entity stores: the
/// result is cached in memory for the life of the store, and overlapping
/// fetches are coalesced so concurrent callers produce exactly one network
/// call. `invalidate` drops the cache; the next call fetches again.
pub struct SettingsStore {
    http: HttpClient,
    coalescer: RequestCoalescer<SiteSettings>,
    cached: Mutex<Option<SiteSettings>>,
}

impl SettingsStore {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            coalescer: RequestCoalescer::new(),
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached settings, or fetches them (coalesced) on a miss.
    /// Errors are not cached; a failed fetch leaves the next caller free to
    /// retry.
    pub async fn get(&self) -> Result<SiteSettings, ApiError> {
        if let Some(settings) = self.cached.lock().await.clone() {
            return Ok(settings);
        }

        let http = self.http.clone();
        let settings = self
            .coalescer
            .run(SETTINGS_KEY, || async move { http.get("/settings").await })
            .await?;

        *self.cached.lock().await = Some(settings.clone());
        Ok(settings)
    }

    /// Drops the cached value, forcing the next `get` to hit the backend.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
