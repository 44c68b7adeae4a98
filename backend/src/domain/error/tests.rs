//! Tests for the domain error payload and its conversions.

use super::*;
use crate::domain::{FieldError, SignupField};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn field_errors() -> FieldErrors {
    [
        (SignupField::Email, FieldError::InvalidFormat),
        (SignupField::FullName, FieldError::Required),
    ]
    .into_iter()
    .collect()
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = DomainError::try_new(ErrorCode::InternalError, "   ");
    assert_eq!(result, Err(DomainErrorValidationError::EmptyMessage));
}

#[rstest]
fn validation_error_exposes_field_map(field_errors: FieldErrors) {
    let error = DomainError::validation(&field_errors);

    assert_eq!(error.code(), ErrorCode::ValidationFailed);
    assert_eq!(
        error.details(),
        Some(&json!({ "fullName": "required", "email": "invalid format" }))
    );
}

#[rstest]
fn gateway_errors_map_to_submission_failures() {
    let error = DomainError::from(&SubmissionGatewayError::unavailable("timeout"));

    assert_eq!(error.code(), ErrorCode::SubmissionFailed);
    assert_eq!(error.message(), "submission service unavailable: timeout");
}

#[rstest]
fn repository_errors_map_to_persistence_failures() {
    let error = DomainError::from(&RegistrationStateRepositoryError::query("disk full"));

    assert_eq!(error.code(), ErrorCode::PersistenceFailed);
    assert_eq!(
        error.to_string(),
        "registration state storage operation failed: disk full"
    );
}

#[rstest]
fn serialises_with_snake_case_code(field_errors: FieldErrors) {
    let value = serde_json::to_value(DomainError::validation(&field_errors)).expect("serialise");

    assert_eq!(
        value,
        json!({
            "code": "validation_failed",
            "message": "signup fields failed validation",
            "details": { "fullName": "required", "email": "invalid format" },
        })
    );
}

#[rstest]
fn omits_absent_details() {
    let value = serde_json::to_value(DomainError::not_found("no registrant")).expect("serialise");
    assert_eq!(value, json!({ "code": "not_found", "message": "no registrant" }));
}

#[rstest]
fn deserialisation_enforces_non_empty_message() {
    let result: Result<DomainError, _> =
        serde_json::from_value(json!({ "code": "internal_error", "message": "" }));
    assert!(result.is_err());
}
