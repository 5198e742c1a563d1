use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::error::ApiError;

/// HttpClient
///
/// The single REST boundary of the crate. Wraps `reqwest::Client` with:
/// - the configured base URL and transport timeout,
/// - bearer-token attachment from a shared slot the session store writes,
/// - JSON decoding behind the schema boundary (malformed bodies become
///   `ApiError::Decode`, never partial data),
/// - status-code mapping through `ApiError::from_status`,
/// - the centralized session-invalid interceptor.
///
/// The interceptor is the single source of truth for "session invalid": any
/// authenticated request answered with 401 emits exactly one event on the
/// expiry channel per login epoch. The session store is the only subscriber.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    expiry: Arc<ExpiryLatch>,
}

/// One-shot-per-epoch latch around the expiry channel. `trip` fires the
/// channel only while armed; `arm` re-enables it on the next login.
struct ExpiryLatch {
    tripped: AtomicBool,
    tx: watch::Sender<u64>,
}

impl ExpiryLatch {
    fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            tripped: AtomicBool::new(false),
            tx,
        }
    }

    fn trip(&self) {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            let epoch = *self.tx.borrow() + 1;
            let _ = self.tx.send(epoch);
        }
    }

    fn arm(&self) {
        self.tripped.store(false, Ordering::SeqCst);
    }
}

impl HttpClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let inner = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            inner,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
            expiry: Arc::new(ExpiryLatch::new()),
        })
    }

    // --- Token slot ---

    /// Installs or clears the bearer token. Installing a token re-arms the
    /// expiry latch so the next 401 is reported again.
    pub fn set_token(&self, token: Option<String>) {
        let arming = token.is_some();
        *self.token.write().expect("token slot poisoned") = token;
        if arming {
            self.expiry.arm();
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().expect("token slot poisoned").clone()
    }

    /// Subscribes to session-invalid events. The value is an opaque epoch
    /// counter; receivers react to the change, not the number.
    pub fn subscribe_expiry(&self) -> watch::Receiver<u64> {
        self.expiry.tx.subscribe()
    }

    // --- Request surface ---

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.execute(self.request(Method::GET, path)).await?;
        Self::decode(resp).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &impl Serialize,
    ) -> Result<T, ApiError> {
        let resp = self
            .execute(self.request(Method::GET, path).query(query))
            .await?;
        Self::decode(resp).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let resp = self
            .execute(self.request(Method::POST, path).json(body))
            .await?;
        Self::decode(resp).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let resp = self
            .execute(self.request(Method::PUT, path).json(body))
            .await?;
        Self::decode(resp).await
    }

    /// DELETE returns no body on success (204 or empty 200).
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let resp = self
            .execute(self.request(Method::POST, path).multipart(form))
            .await?;
        Self::decode(resp).await
    }

    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let resp = self
            .execute(self.request(Method::PUT, path).multipart(form))
            .await?;
        Self::decode(resp).await
    }

    // --- Internals ---

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.inner.request(method, url)
    }

    /// Sends the request and funnels every non-2xx outcome through the one
    /// mapping point. A 401 on a request that carried a token trips the
    /// expiry latch; unauthenticated calls (the OTP endpoints) never do.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let token = self.token();
        let authenticated = token.is_some();
        let builder = match token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        };

        let resp = builder.send().await.map_err(|e| {
            tracing::error!("transport failure: {e}");
            ApiError::Network(e.to_string())
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        if err.is_auth_failure() && authenticated {
            tracing::warn!("authenticated request rejected with 401, invalidating session");
            self.expiry.trip();
        } else if status != StatusCode::UNAUTHORIZED {
            tracing::debug!(status = status.as_u16(), "request failed: {err}");
        }
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
