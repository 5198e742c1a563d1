use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use uuid::Uuid;

use crate::coalesce::CancelHandle;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::ListQuery;
use crate::notify::Notifier;

/// AdminResource
///
/// Implemented by every entity that gets a CRUD store. Binds the entity type
/// to its backend collection path and a human-readable label for notices.
pub trait AdminResource: DeserializeOwned + Clone + Send + Sync + 'static {
    const PATH: &'static str;
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
}

/// StoreState
///
/// The uniform shape every entity container exposes: a loading flag, the last
/// fetch error as a display-ready message, the cached list, and the entity a
/// detail screen selected.
#[derive(Debug, Clone)]
pub struct StoreState<T> {
    pub loading: bool,
    pub error: Option<String>,
    pub items: Vec<T>,
    pub selected: Option<T>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            items: Vec::new(),
            selected: None,
        }
    }
}

/// ResourceStore
///
/// One injectable state container per entity, constructed by the application
/// root; nothing lives at module scope. Reads follow the absorb policy: a
/// failed fetch lands in `error` state and is not rethrown. Mutations follow
/// the rethrow policy: the failure is published as a transient notice and
/// returned to the calling form so it can reset its own submit state.
///
/// Two overlapping loads are not de-duplicated; whichever resolves later
/// overwrites state. A load given a cancelled handle touches nothing.
pub struct ResourceStore<T: AdminResource> {
    http: HttpClient,
    notifier: Notifier,
    state: watch::Sender<StoreState<T>>,
}

impl<T: AdminResource> ResourceStore<T> {
    pub fn new(http: HttpClient, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            http,
            notifier,
            state,
        }
    }

    pub fn state(&self) -> StoreState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState<T>> {
        self.state.subscribe()
    }

    // --- Reads (absorbed) ---

    /// Fetches the entity list into `items`.
    pub async fn load(&self, query: &ListQuery, cancel: &CancelHandle) {
        if cancel.is_cancelled() {
            return;
        }
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result: Result<Vec<T>, ApiError> = self.http.get_query(T::PATH, query).await;
        if cancel.is_cancelled() {
            // The consumer went away while the request was in flight.
            return;
        }
        match result {
            Ok(items) => self.state.send_modify(|s| {
                s.loading = false;
                s.items = items;
            }),
            Err(err) => {
                tracing::error!("failed to load {} list: {err}", T::LABEL);
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(err.user_message());
                });
            }
        }
    }

    /// Fetches a single entity into `selected`.
    pub async fn load_one(&self, id: Uuid, cancel: &CancelHandle) {
        if cancel.is_cancelled() {
            return;
        }
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result: Result<T, ApiError> = self.http.get(&Self::item_path(id)).await;
        if cancel.is_cancelled() {
            return;
        }
        match result {
            Ok(item) => self.state.send_modify(|s| {
                s.loading = false;
                s.selected = Some(item);
            }),
            Err(err) => {
                tracing::error!("failed to load {} {id}: {err}", T::LABEL);
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(err.user_message());
                });
            }
        }
    }

    // --- Mutations (notified and rethrown) ---

    pub async fn create<B: Serialize>(&self, body: &B) -> Result<T, ApiError> {
        let created: T = self.finish_mutation(self.http.post(T::PATH, body).await)?;
        self.state.send_modify(|s| s.items.insert(0, created.clone()));
        Ok(created)
    }

    pub async fn update<B: Serialize>(&self, id: Uuid, body: &B) -> Result<T, ApiError> {
        let updated: T =
            self.finish_mutation(self.http.put(&Self::item_path(id), body).await)?;
        self.replace(updated.clone());
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.finish_mutation(self.http.delete(&Self::item_path(id)).await)?;
        self.state.send_modify(|s| {
            s.items.retain(|item| item.id() != id);
            if s.selected.as_ref().map(|sel| sel.id()) == Some(id) {
                s.selected = None;
            }
        });
        Ok(())
    }

    /// Create with file fields (multipart body).
    pub async fn create_multipart(
        &self,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let created: T = self.finish_mutation(self.http.post_multipart(T::PATH, form).await)?;
        self.state.send_modify(|s| s.items.insert(0, created.clone()));
        Ok(created)
    }

    /// Update with file fields (multipart body).
    pub async fn update_multipart(
        &self,
        id: Uuid,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let updated: T = self
            .finish_mutation(self.http.put_multipart(&Self::item_path(id), form).await)?;
        self.replace(updated.clone());
        Ok(updated)
    }

    // --- Sub-resources ---

    /// Lists a sub-collection of one entity (e.g. a ticket's messages).
    pub async fn load_related<R: DeserializeOwned>(
        &self,
        id: Uuid,
        sub: &str,
    ) -> Result<Vec<R>, ApiError> {
        self.http.get(&format!("{}/{id}/{sub}", T::PATH)).await
    }

    /// Creates into a sub-collection of one entity (e.g. a ticket reply).
    pub async fn create_related<B: Serialize, R: DeserializeOwned>(
        &self,
        id: Uuid,
        sub: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        self.finish_mutation(self.http.post(&format!("{}/{id}/{sub}", T::PATH), body).await)
    }

    // --- Internals ---

    fn item_path(id: Uuid) -> String {
        format!("{}/{id}", T::PATH)
    }

    /// Applies the mutation error policy in one place: publish a notice,
    /// then hand the error back to the caller.
    fn finish_mutation<R>(&self, result: Result<R, ApiError>) -> Result<R, ApiError> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::error!("{} mutation failed: {err}", T::LABEL);
                self.notifier
                    .error(format!("{} failed: {}", T::LABEL, err.user_message()));
                Err(err)
            }
        }
    }

    fn replace(&self, updated: T) {
        self.state.send_modify(|s| {
            if let Some(slot) = s.items.iter_mut().find(|item| item.id() == updated.id()) {
                *slot = updated.clone();
            }
            if s.selected.as_ref().map(|sel| sel.id()) == Some(updated.id()) {
                s.selected = Some(updated.clone());
            }
        });
    }
}
