// --- Module Structure ---

// Core client services and components.
pub mod auth;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod models;
pub mod notify;
pub mod session;
pub mod storage;

// Per-entity state containers.
pub mod stores;

use std::sync::Arc;

// --- Public Re-exports ---

// Makes the core types easily accessible to an embedding shell.
pub use auth::AuthService;
pub use coalesce::{CancelHandle, RequestCoalescer};
pub use config::{AppConfig, Env};
pub use error::ApiError;
pub use guard::{Access, DenyReason, RoleGuard};
pub use http::HttpClient;
pub use models::Role;
pub use notify::{Notice, NoticeLevel, Notifier};
pub use session::{SessionState, SessionStore};
pub use storage::{FileStorage, KeyValueStorage, MockStorage, StorageState};
pub use stores::{ResourceStore, SettingsStore, StoreState};

use models::{
    AvatarUpload, Blog, Certificate, Exam, Faq, OfflineSession, Product, Profile, Report, Term,
    Ticket, UserAccount,
};
use storage::LOCALE_KEY;

/// Panel
///
/// The application root. Owns the lifecycle of every service and state
/// container: the HTTP client, the auth flow, the session store (already
/// subscribed to the expiry channel), the notifier, and the settings cache.
/// Entity stores are constructed on demand, one container per bounded
/// entity, so nothing in this crate lives at module scope.
pub struct Panel {
    pub config: AppConfig,
    pub http: HttpClient,
    pub auth: AuthService,
    pub session: Arc<SessionStore>,
    pub notifier: Notifier,
    pub settings: SettingsStore,
    storage: StorageState,
}

impl Panel {
    /// Assembles the client core. The storage implementation is injected so
    /// a shell chooses where durable state lives (a file next to the app, an
    /// in-memory mock in tests).
    pub fn new(config: AppConfig, storage: StorageState) -> Result<Self, ApiError> {
        let http = HttpClient::new(&config)?;
        let auth = AuthService::new(http.clone());
        let notifier = Notifier::new();

        let session = Arc::new(SessionStore::new(http.clone(), storage.clone()));
        Arc::clone(&session).listen_for_expiry();

        let settings = SettingsStore::new(http.clone());

        Ok(Self {
            config,
            http,
            auth,
            session,
            notifier,
            settings,
            storage,
        })
    }

    /// Startup resume: re-enters the session from a durably stored token if
    /// one exists.
    pub async fn initialize(&self) {
        self.session.initialize().await;
    }

    /// The full OTP completion step: exchanges phone + code for a token and
    /// resolves the session. `AuthService::request_code` is the first half.
    pub async fn login_with_otp(&self, phone: &str, code: &str) -> Result<(), ApiError> {
        let token = self.auth.exchange_code(phone, code).await?;
        self.session.login(token.token).await
    }

    /// Updates the caller's profile picture and refreshes the cached profile.
    pub async fn upload_avatar(&self, upload: AvatarUpload) -> Result<Profile, ApiError> {
        let profile: Profile = self
            .http
            .put_multipart("/profile/avatar", upload.into_form())
            .await?;
        // Keep the session's cached identity in sync with the new picture.
        let _ = self.session.refresh_profile().await;
        Ok(profile)
    }

    // --- Locale preference ---

    pub async fn set_locale(&self, locale: &str) {
        if let Err(e) = self.storage.set(LOCALE_KEY, locale).await {
            tracing::warn!("failed to persist locale: {e}");
        }
    }

    pub async fn locale(&self) -> Option<String> {
        self.storage.get(LOCALE_KEY).await
    }

    // --- Entity store constructors ---

    pub fn terms(&self) -> ResourceStore<Term> {
        self.store()
    }

    pub fn exams(&self) -> ResourceStore<Exam> {
        self.store()
    }

    pub fn users(&self) -> ResourceStore<UserAccount> {
        self.store()
    }

    pub fn blogs(&self) -> ResourceStore<Blog> {
        self.store()
    }

    pub fn tickets(&self) -> ResourceStore<Ticket> {
        self.store()
    }

    pub fn offline_sessions(&self) -> ResourceStore<OfflineSession> {
        self.store()
    }

    pub fn reports(&self) -> ResourceStore<Report> {
        self.store()
    }

    pub fn products(&self) -> ResourceStore<Product> {
        self.store()
    }

    pub fn certificates(&self) -> ResourceStore<Certificate> {
        self.store()
    }

    pub fn faqs(&self) -> ResourceStore<Faq> {
        self.store()
    }

    fn store<T: stores::AdminResource>(&self) -> ResourceStore<T> {
        ResourceStore::new(self.http.clone(), self.notifier.clone())
    }
}
