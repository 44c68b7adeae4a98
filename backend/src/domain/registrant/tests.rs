//! Tests for the registrant data model.

use super::*;
use crate::domain::test_fixtures::{ada_fields, fixture_timestamp, validated};
use chrono::Duration;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn ada() -> Registrant {
    let code = ReferralCode::new("SUBX1N7").expect("valid code");
    Registrant::new(validated(&ada_fields()), code, fixture_timestamp())
}

#[fixture]
fn ada_json() -> Value {
    json!({
        "fullName": "Ada Lovelace",
        "email": "ada@example.com",
        "phoneNumber": "08012345678",
        "incomeRange": "50000-100000",
        "referralCode": "SUBX1N7",
        "dateJoined": "2026-02-24T10:30:00.000Z",
    })
}

#[rstest]
#[case("Ada Lovelace")]
#[case("  Ada  ")]
#[case("李小龙")]
fn full_name_is_kept_verbatim(#[case] raw: &str) {
    let name = FullName::new(raw).expect("non-blank name");
    assert_eq!(name.as_ref(), raw);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
fn blank_full_name_is_rejected(#[case] raw: &str) {
    assert_eq!(FullName::new(raw), Err(RegistrantValidationError::EmptyFullName));
}

#[rstest]
#[case("ada@example.com")]
#[case("a@b.c")]
#[case("first.last+tag@sub.example.ng")]
fn well_formed_email_is_accepted(#[case] raw: &str) {
    assert!(EmailAddress::new(raw).is_ok());
}

#[rstest]
#[case("", RegistrantValidationError::EmptyEmail)]
#[case("  ", RegistrantValidationError::EmptyEmail)]
#[case("ada", RegistrantValidationError::InvalidEmail)]
#[case("ada@example", RegistrantValidationError::InvalidEmail)]
#[case("@example.com", RegistrantValidationError::InvalidEmail)]
#[case("a b@c.d", RegistrantValidationError::InvalidEmail)]
#[case(" ada@example.com", RegistrantValidationError::InvalidEmail)]
fn malformed_email_is_rejected(#[case] raw: &str, #[case] expected: RegistrantValidationError) {
    assert_eq!(EmailAddress::new(raw), Err(expected));
}

#[rstest]
#[case("08012345678", "08012345678")]
#[case("0801-234-5678", "08012345678")]
#[case("+234 (801) 234-5678", "2348012345678")]
#[case("123456789012345", "123456789012345")]
fn phone_number_digits_are_extracted(#[case] raw: &str, #[case] digits: &str) {
    let phone = PhoneNumber::new(raw).expect("valid phone number");
    assert_eq!(phone.as_ref(), raw);
    assert_eq!(phone.digits(), digits);
}

#[rstest]
#[case("", RegistrantValidationError::EmptyPhoneNumber)]
#[case("123456789", RegistrantValidationError::InvalidPhoneNumber { digits: 9 })]
#[case("1234567890123456", RegistrantValidationError::InvalidPhoneNumber { digits: 16 })]
#[case("phone", RegistrantValidationError::InvalidPhoneNumber { digits: 0 })]
fn phone_number_digit_count_is_enforced(
    #[case] raw: &str,
    #[case] expected: RegistrantValidationError,
) {
    assert_eq!(PhoneNumber::new(raw), Err(expected));
}

#[rstest]
fn empty_income_range_is_rejected() {
    assert_eq!(
        IncomeRangeId::new(""),
        Err(RegistrantValidationError::EmptyIncomeRange)
    );
}

#[rstest]
fn registrant_serialises_as_camel_case(ada: Registrant, ada_json: Value) {
    let value = serde_json::to_value(&ada).expect("serialise");
    assert_eq!(value, ada_json);
}

#[rstest]
fn registrant_deserialises_from_camel_case(ada: Registrant, ada_json: Value) {
    let restored: Registrant = serde_json::from_value(ada_json).expect("deserialise");
    assert_eq!(restored, ada);
}

#[rstest]
fn unknown_registrant_fields_are_ignored(ada: Registrant, mut ada_json: Value) {
    if let Some(object) = ada_json.as_object_mut() {
        object.insert("referredBy".to_owned(), json!("SUBX9"));
    }
    let restored: Registrant = serde_json::from_value(ada_json).expect("deserialise");
    assert_eq!(restored, ada);
}

#[rstest]
#[case("email", json!("not-an-email"))]
#[case("fullName", json!(" "))]
#[case("phoneNumber", json!("12"))]
#[case("referralCode", json!("ABC123"))]
#[case("dateJoined", json!("yesterday"))]
fn invalid_stored_registrant_is_rejected(
    mut ada_json: Value,
    #[case] field: &str,
    #[case] replacement: Value,
) {
    if let Some(object) = ada_json.as_object_mut() {
        object.insert(field.to_owned(), replacement);
    }
    assert!(serde_json::from_value::<Registrant>(ada_json).is_err());
}

#[rstest]
fn missing_registrant_field_is_rejected(mut ada_json: Value) {
    if let Some(object) = ada_json.as_object_mut() {
        object.remove("incomeRange");
    }
    assert!(serde_json::from_value::<Registrant>(ada_json).is_err());
}

#[rstest]
fn date_joined_keeps_millisecond_precision() {
    let at = fixture_timestamp() + Duration::microseconds(123_456);
    let code = ReferralCode::new("SUBX1N7").expect("valid code");
    let registrant = Registrant::new(validated(&ada_fields()), code, at);

    assert_eq!(
        registrant.date_joined(),
        fixture_timestamp() + Duration::milliseconds(123)
    );

    let value = serde_json::to_value(&registrant).expect("serialise");
    assert_eq!(
        value.get("dateJoined").and_then(Value::as_str),
        Some("2026-02-24T10:30:00.123Z")
    );
}

#[rstest]
fn offset_timestamps_are_normalised_to_utc(ada: Registrant, mut ada_json: Value) {
    if let Some(object) = ada_json.as_object_mut() {
        object.insert("dateJoined".to_owned(), json!("2026-02-24T11:30:00.000+01:00"));
    }
    let restored: Registrant = serde_json::from_value(ada_json).expect("deserialise");
    assert_eq!(restored.date_joined(), ada.date_joined());
}
