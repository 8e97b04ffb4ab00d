//! Tests for domain error construction, classification and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn invalid_request_constructor_sets_code() {
    let err = DomainError::invalid_request("bad");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.status(), None);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = DomainError::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(
        result,
        Err(DomainErrorValidationError::EmptyMessage)
    ));
}

#[rstest]
fn new_substitutes_generic_text_for_blank_messages() {
    let err = DomainError::new(ErrorCode::RemoteFailure, "");
    assert_eq!(err.message(), GENERIC_FAILURE_MESSAGE);
    assert_eq!(err.code(), ErrorCode::RemoteFailure);
}

#[rstest]
#[case(400, ErrorCode::InvalidRequest)]
#[case(401, ErrorCode::Unauthorized)]
#[case(403, ErrorCode::Forbidden)]
#[case(404, ErrorCode::NotFound)]
#[case(409, ErrorCode::Conflict)]
#[case(422, ErrorCode::InvalidRequest)]
#[case(500, ErrorCode::RemoteFailure)]
#[case(503, ErrorCode::ServiceUnavailable)]
fn http_statuses_map_to_codes(#[case] status: u16, #[case] expected: ErrorCode) {
    assert_eq!(ErrorCode::from_http_status(status), expected);
}

#[rstest]
fn display_shows_message_only() {
    let err = DomainError::not_found("Activity not found").with_status(404);
    assert_eq!(err.to_string(), "Activity not found");
}

#[rstest]
fn serialises_with_camel_case_and_optional_status() {
    let err = DomainError::unauthorized("Token expired").with_status(401);
    let value = serde_json::to_value(&err).expect("error serialises");
    assert_eq!(
        value,
        json!({"code": "unauthorized", "message": "Token expired", "status": 401})
    );

    let bare = serde_json::to_value(DomainError::storage("disk full")).expect("serialises");
    assert_eq!(bare, json!({"code": "storage", "message": "disk full"}));
}

#[rstest]
fn deserialising_rejects_blank_messages() {
    let result =
        serde_json::from_value::<DomainError>(json!({"code": "not_found", "message": "  "}));
    assert!(result.is_err());
}
