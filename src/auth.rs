use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{CodeRequested, SendOtpRequest, SessionToken, VerifyOtpRequest};

/// AuthService
///
/// The two-step one-time-password flow. The backend is the sole arbiter of
/// both phone format and code correctness; this service performs no local
/// validation and never guesses success or failure.
#[derive(Clone)]
pub struct AuthService {
    http: HttpClient,
}

impl AuthService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Triggers out-of-band delivery of a one-time code for the phone number.
    ///
    /// Fails with `ApiError::Validation` when the backend rejects the phone
    /// format, `ApiError::Network` on transport failure.
    pub async fn request_code(&self, phone: &str) -> Result<CodeRequested, ApiError> {
        tracing::info!("requesting one-time code");
        self.http
            .post("/send_otp", &SendOtpRequest { phone })
            .await
    }

    /// Exchanges phone + submitted code for an opaque session token.
    ///
    /// A backend rejection of the code (wrong or expired, however the backend
    /// encodes it) surfaces as `ApiError::InvalidCredentials`; transport
    /// failures stay `ApiError::Network`.
    pub async fn exchange_code(&self, phone: &str, code: &str) -> Result<SessionToken, ApiError> {
        match self
            .http
            .post::<SessionToken>("/verify_otp", &VerifyOtpRequest { phone, code })
            .await
        {
            Ok(token) => {
                tracing::info!("one-time code accepted");
                Ok(token)
            }
            Err(ApiError::Authorization) | Err(ApiError::Validation(_)) => {
                tracing::warn!("one-time code rejected by backend");
                Err(ApiError::InvalidCredentials)
            }
            Err(other) => Err(other),
        }
    }
}
