use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Identity & Auth Schemas ---

/// Role
///
/// The RBAC field carried by every profile. Panels are gated on sets of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    #[default]
    User,
}

/// Profile
///
/// The authenticated user's canonical identity record, fetched once per
/// session from `GET /profile` and refreshed on demand. Immutable from the
/// role guard's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    // The phone number is the primary identifier in the OTP flow.
    pub phone: String,
    pub email: Option<String>,
    // Backend-relative asset key, resolved via AppConfig::asset_url.
    pub avatar: Option<String>,
}

/// CodeRequested
///
/// Acknowledgement returned by `POST /send_otp`. Delivery of the code itself
/// happens out of band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRequested {
    pub message: String,
    // Seconds until the delivered code expires, when the backend reports it.
    pub ttl_seconds: Option<u64>,
}

/// SessionToken
///
/// The opaque credential returned by `POST /verify_otp`. The client never
/// inspects its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOtpRequest<'a> {
    pub phone: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub phone: &'a str,
    pub code: &'a str,
}

// --- Listing ---

/// ListQuery
///
/// Query parameters accepted by every list endpoint. `None` fields are
/// omitted from the query string.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            page: None,
            search: Some(term.into()),
        }
    }
}

// --- Core Entity Schemas ---

/// Term
///
/// A course term: the unit students enroll in and most other entities hang off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Term {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    // FK to the teacher's profile.
    pub teacher_id: Uuid,
    pub price: i64,
    pub capacity: i32,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Exam
///
/// A timed exam attached to a term. Questions are a sub-resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Exam {
    pub id: Uuid,
    pub term_id: Uuid,
    pub title: String,
    pub duration_minutes: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// ExamQuestion
///
/// One question within an exam. The optional attachment is a backend-relative
/// asset key uploaded via multipart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExamQuestion {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    pub attachment: Option<String>,
}

/// UserAccount
///
/// A managed account as seen from the admin panel. Distinct from `Profile`,
/// which is the caller's own identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserAccount {
    pub id: Uuid,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Blog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub cover_image: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// TicketStatus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Answered,
    Closed,
}

/// Ticket
///
/// A support thread opened by a user. Messages are a sub-resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// TicketMessage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TicketMessage {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// OfflineSession
///
/// A recorded class session attached to a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OfflineSession {
    pub id: Uuid,
    pub term_id: Uuid,
    pub title: String,
    pub video_url: String,
    pub held_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Report
///
/// A study report submitted by a student for a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Report {
    pub id: Uuid,
    pub student_id: Uuid,
    pub term_id: Uuid,
    pub summary: String,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Certificate
///
/// Issued per student per term; the file itself is uploaded via multipart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Certificate {
    pub id: Uuid,
    pub student_id: Uuid,
    pub term_id: Uuid,
    pub title: String,
    pub file: Option<String>,
    pub issued_at: DateTime<Utc>,
}

/// Faq
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub published: bool,
}

/// SiteSettings
///
/// Site-wide presentation settings. The one entity whose store caches and
/// de-duplicates reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SiteSettings {
    pub site_title: String,
    pub logo: Option<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub about: String,
}

// --- Request Payloads (Input Schemas) ---

/// CreateTermRequest
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateTermRequest {
    pub title: String,
    pub description: String,
    pub teacher_id: Uuid,
    pub price: i64,
    pub capacity: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// UpdateTermRequest
///
/// Partial update payload. `Option<T>` plus `skip_serializing_if` keeps only
/// the provided fields in the JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTermRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// CreateTicketRequest
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub body: String,
}

/// TicketReplyRequest
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TicketReplyRequest {
    pub body: String,
}

/// UpdateProfileRequest
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// --- Multipart Upload Payloads ---

/// CertificateUpload
///
/// Everything needed to issue a certificate, including the document bytes.
/// Converted to a multipart form at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct CertificateUpload {
    pub student_id: Uuid,
    pub term_id: Uuid,
    pub title: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CertificateUpload {
    pub fn into_form(self) -> reqwest::multipart::Form {
        reqwest::multipart::Form::new()
            .text("student_id", self.student_id.to_string())
            .text("term_id", self.term_id.to_string())
            .text("title", self.title)
            .part(
                "file",
                reqwest::multipart::Part::bytes(self.bytes).file_name(self.file_name),
            )
    }
}

/// AvatarUpload
///
/// A profile picture change, sent as multipart to the profile endpoint.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    pub fn into_form(self) -> reqwest::multipart::Form {
        reqwest::multipart::Form::new().part(
            "avatar",
            reqwest::multipart::Part::bytes(self.bytes).file_name(self.file_name),
        )
    }
}
