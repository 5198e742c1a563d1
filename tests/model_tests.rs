use academy_client::Role;
use academy_client::models::{
    CertificateUpload, ListQuery, Profile, SessionToken, TicketStatus, UpdateTermRequest,
};
use uuid::Uuid;

#[test]
fn test_role_uses_lowercase_wire_names() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), r#""teacher""#);

    let parsed: Role = serde_json::from_str(r#""student""#).unwrap();
    assert_eq!(parsed, Role::Student);
}

#[test]
fn test_update_term_request_omits_absent_fields() {
    // Partial updates must only carry the provided fields.
    let partial = UpdateTermRequest {
        title: Some("New Title Only".to_string()),
        ..UpdateTermRequest::default()
    };

    let json_output = serde_json::to_string(&partial).unwrap();
    assert!(json_output.contains(r#""title":"New Title Only""#));
    assert!(!json_output.contains("description"));
    assert!(!json_output.contains("capacity"));
}

#[test]
fn test_list_query_omits_absent_params() {
    let all = serde_json::to_value(ListQuery::all()).unwrap();
    assert_eq!(all, serde_json::json!({}));

    let searched = serde_json::to_value(ListQuery::search("rust")).unwrap();
    assert_eq!(searched, serde_json::json!({ "search": "rust" }));
}

#[test]
fn test_session_token_wire_shape() {
    let token: SessionToken = serde_json::from_str(r#"{ "token": "opaque-xyz" }"#).unwrap();
    assert_eq!(token.token, "opaque-xyz");
}

#[test]
fn test_profile_tolerates_missing_optional_fields() {
    // Backends that omit null fields entirely must still parse.
    let raw = format!(
        r#"{{
            "id": "{}",
            "role": "teacher",
            "first_name": "Ali",
            "last_name": "Rahimi",
            "phone": "09120000000"
        }}"#,
        Uuid::new_v4()
    );

    let profile: Profile = serde_json::from_str(&raw).unwrap();
    assert_eq!(profile.role, Role::Teacher);
    assert!(profile.email.is_none());
    assert!(profile.avatar.is_none());
}

#[test]
fn test_ticket_status_wire_names_and_default() {
    assert_eq!(TicketStatus::default(), TicketStatus::Open);
    assert_eq!(
        serde_json::to_string(&TicketStatus::Answered).unwrap(),
        r#""answered""#
    );
    let parsed: TicketStatus = serde_json::from_str(r#""closed""#).unwrap();
    assert_eq!(parsed, TicketStatus::Closed);
}

#[test]
fn test_certificate_upload_builds_a_multipart_form() {
    let upload = CertificateUpload {
        student_id: Uuid::new_v4(),
        term_id: Uuid::new_v4(),
        title: "Rust 101 Completion".to_string(),
        file_name: "cert.pdf".to_string(),
        bytes: vec![0x25, 0x50, 0x44, 0x46],
    };

    // Form construction must not panic; the boundary is generated lazily.
    let form = upload.into_form();
    assert!(!form.boundary().is_empty());
}
