use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use academy_client::{
    AppConfig, ApiError, CancelHandle, MockStorage, Panel, SessionState, StorageState,
    models::ListQuery, storage::SESSION_TOKEN_KEY,
};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

const VALID_CODE: &str = "4321";
const ISSUED_TOKEN: &str = "tok-123";

// --- Mock Backend ---

// The in-process stand-in for the REST backend. The OTP code and issued token
// are fixed; `revoked` simulates server-side token revocation after login.
#[derive(Default)]
struct MockBackend {
    revoked: AtomicBool,
}

fn bearer_ok(state: &MockBackend, headers: &HeaderMap) -> bool {
    if state.revoked.load(Ordering::SeqCst) {
        return false;
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {ISSUED_TOKEN}"))
        .unwrap_or(false)
}

async fn send_otp(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    let phone = body["phone"].as_str().unwrap_or_default();
    // The backend, not the client, is the arbiter of phone format.
    if phone.len() == 11 && phone.starts_with("09") {
        (
            StatusCode::OK,
            Json(json!({ "message": "code sent", "ttl_seconds": 120 })),
        )
    } else {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "invalid phone number" })),
        )
    }
}

async fn verify_otp(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    if body["code"].as_str() == Some(VALID_CODE) {
        (StatusCode::OK, Json(json!({ "token": ISSUED_TOKEN })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "code rejected" })),
        )
    }
}

async fn profile(State(state): State<Arc<MockBackend>>, headers: HeaderMap) -> impl IntoResponse {
    if !bearer_ok(&state, &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "unauthorized" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "role": "admin",
            "first_name": "Sara",
            "last_name": "Moradi",
            "phone": "09123456789",
            "email": "sara@example.com",
            "avatar": null
        })),
    )
}

async fn list_terms(State(state): State<Arc<MockBackend>>, headers: HeaderMap) -> impl IntoResponse {
    if !bearer_ok(&state, &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "unauthorized" })),
        );
    }
    (StatusCode::OK, Json(json!([])))
}

async fn set_avatar(State(state): State<Arc<MockBackend>>, headers: HeaderMap) -> impl IntoResponse {
    if !bearer_ok(&state, &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "unauthorized" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "role": "admin",
            "first_name": "Sara",
            "last_name": "Moradi",
            "phone": "09123456789",
            "email": "sara@example.com",
            "avatar": "avatars/sara.png"
        })),
    )
}

async fn spawn_backend() -> (String, Arc<MockBackend>) {
    let state = Arc::new(MockBackend::default());
    let router = Router::new()
        .route("/send_otp", post(send_otp))
        .route("/verify_otp", post(verify_otp))
        .route("/profile", get(profile))
        .route("/profile/avatar", axum::routing::put(set_avatar))
        .route("/admin/terms", get(list_terms))
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "academy_client=debug".into());
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
}

fn panel_with(api_base_url: String, storage: StorageState) -> Panel {
    let config = AppConfig {
        api_base_url,
        ..AppConfig::default()
    };
    Panel::new(config, storage).expect("Failed to build panel")
}

// --- Tests ---

#[tokio::test]
async fn test_otp_flow_reaches_authenticated() {
    init_tracing();
    let (addr, _backend) = spawn_backend().await;
    let storage: StorageState = Arc::new(MockStorage::new());
    let panel = panel_with(addr, storage.clone());

    let ack = panel.auth.request_code("09123456789").await.unwrap();
    assert_eq!(ack.message, "code sent");

    panel.login_with_otp("09123456789", VALID_CODE).await.unwrap();

    match panel.session.state() {
        SessionState::Authenticated(profile) => {
            assert_eq!(profile.first_name, "Sara");
            assert_eq!(profile.role, academy_client::Role::Admin);
        }
        other => panic!("expected authenticated session, got {other:?}"),
    }

    // The durably stored token matches the one the backend issued.
    assert_eq!(
        storage.get(SESSION_TOKEN_KEY).await.as_deref(),
        Some(ISSUED_TOKEN)
    );
}

#[tokio::test]
async fn test_invalid_phone_is_rejected_by_backend() {
    let (addr, _backend) = spawn_backend().await;
    let panel = panel_with(addr, Arc::new(MockStorage::new()));

    let err = panel.auth.request_code("12345").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_wrong_code_leaves_session_anonymous() {
    let (addr, _backend) = spawn_backend().await;
    let storage: StorageState = Arc::new(MockStorage::new());
    let panel = panel_with(addr, storage.clone());

    let err = panel
        .login_with_otp("09123456789", "9999")
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::InvalidCredentials);
    assert_eq!(panel.session.state(), SessionState::Anonymous);
    assert!(storage.get(SESSION_TOKEN_KEY).await.is_none());
}

#[tokio::test]
async fn test_logout_clears_token_and_is_idempotent() {
    let (addr, _backend) = spawn_backend().await;
    let storage: StorageState = Arc::new(MockStorage::new());
    let panel = panel_with(addr, storage.clone());

    panel.login_with_otp("09123456789", VALID_CODE).await.unwrap();
    assert!(panel.session.state().is_authenticated());

    panel.session.logout().await;
    assert_eq!(panel.session.state(), SessionState::Anonymous);
    assert!(storage.get(SESSION_TOKEN_KEY).await.is_none());

    // A second logout must not error or change anything.
    panel.session.logout().await;
    assert_eq!(panel.session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_revoked_token_forces_anonymous_exactly_once() {
    init_tracing();
    let (addr, backend) = spawn_backend().await;
    let panel = panel_with(addr, Arc::new(MockStorage::new()));

    panel.login_with_otp("09123456789", VALID_CODE).await.unwrap();

    let mut session_rx = panel.session.subscribe();
    session_rx.mark_unchanged();
    let mut expiry_rx = panel.http.subscribe_expiry();
    expiry_rx.mark_unchanged();

    // The backend revokes the token; the next authenticated call sees 401.
    backend.revoked.store(true, Ordering::SeqCst);
    let terms = panel.terms();
    terms.load(&ListQuery::all(), &CancelHandle::new()).await;

    // The fetch failure is absorbed into store state.
    assert!(terms.state().error.is_some());

    // The interceptor fired once and the session fell back to anonymous.
    tokio::time::timeout(Duration::from_secs(2), expiry_rx.changed())
        .await
        .expect("expected a session-invalid event")
        .unwrap();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            session_rx.changed().await.unwrap();
            if *session_rx.borrow() == SessionState::Anonymous {
                break;
            }
        }
    })
    .await
    .expect("expected the session to become anonymous");

    // A second 401 does not emit a second event until the next login.
    terms.load(&ListQuery::all(), &CancelHandle::new()).await;
    let second = tokio::time::timeout(Duration::from_millis(300), expiry_rx.changed()).await;
    assert!(second.is_err(), "the expiry event must fire exactly once");
}

#[tokio::test]
async fn test_initialize_resumes_from_stored_token() {
    let (addr, _backend) = spawn_backend().await;
    let storage: StorageState = Arc::new(MockStorage::new());
    storage.set(SESSION_TOKEN_KEY, ISSUED_TOKEN).await.unwrap();

    let panel = panel_with(addr, storage);
    panel.initialize().await;

    assert!(panel.session.state().is_authenticated());
}

#[tokio::test]
async fn test_initialize_with_stale_token_discards_it() {
    let (addr, backend) = spawn_backend().await;
    backend.revoked.store(true, Ordering::SeqCst);

    let storage: StorageState = Arc::new(MockStorage::new());
    storage.set(SESSION_TOKEN_KEY, ISSUED_TOKEN).await.unwrap();

    let panel = panel_with(addr, storage.clone());
    panel.initialize().await;

    // The resume attempt resolves to a terminal non-authenticated state and
    // the unusable token is gone from durable storage.
    assert!(matches!(panel.session.state(), SessionState::Error(_)));
    assert!(storage.get(SESSION_TOKEN_KEY).await.is_none());
    assert!(panel.http.token().is_none());
}

#[tokio::test]
async fn test_profile_refresh_and_avatar_upload() {
    let (addr, _backend) = spawn_backend().await;
    let panel = panel_with(addr, Arc::new(MockStorage::new()));
    panel.login_with_otp("09123456789", VALID_CODE).await.unwrap();

    // Refresh re-fetches without disturbing the authenticated state.
    let profile = panel.session.refresh_profile().await.unwrap();
    assert_eq!(profile.last_name, "Moradi");
    assert!(panel.session.state().is_authenticated());

    let updated = panel
        .upload_avatar(academy_client::models::AvatarUpload {
            file_name: "sara.png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        })
        .await
        .unwrap();
    assert_eq!(updated.avatar.as_deref(), Some("avatars/sara.png"));
}

#[tokio::test]
async fn test_locale_preference_round_trips_through_storage() {
    let (addr, _backend) = spawn_backend().await;
    let panel = panel_with(addr, Arc::new(MockStorage::new()));

    assert!(panel.locale().await.is_none());
    panel.set_locale("fa").await;
    assert_eq!(panel.locale().await.as_deref(), Some("fa"));
}

#[tokio::test]
async fn test_initialize_without_token_settles_anonymous() {
    let (addr, _backend) = spawn_backend().await;
    let panel = panel_with(addr, Arc::new(MockStorage::new()));

    panel.initialize().await;
    assert_eq!(panel.session.state(), SessionState::Anonymous);
}
