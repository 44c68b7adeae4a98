//! Field validation for signup submissions.
//!
//! Validation is pure: it inspects the four raw fields and reports one
//! [`FieldError`] per failing field. An empty [`FieldErrors`] is the only
//! success signal; a [`ValidatedSignup`] can only be obtained alongside it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::income_range::IncomeRangeCatalogue;
use super::registrant::{
    EmailAddress, FullName, IncomeRangeId, PhoneNumber, RegistrantValidationError,
};

/// Raw field values as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupFields {
    /// Free-text full name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Phone number in any punctuation.
    pub phone_number: String,
    /// Income bracket identifier from the catalogue.
    pub income_range: String,
}

/// Form field identifiers, serialised with their camelCase form names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignupField {
    /// `fullName`
    FullName,
    /// `email`
    Email,
    /// `phoneNumber`
    PhoneNumber,
    /// `incomeRange`
    IncomeRange,
}

impl SignupField {
    /// Every field, in form order.
    pub const ALL: [Self; 4] = [
        Self::FullName,
        Self::Email,
        Self::PhoneNumber,
        Self::IncomeRange,
    ];

    /// The field's form name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::PhoneNumber => "phoneNumber",
            Self::IncomeRange => "incomeRange",
        }
    }
}

impl fmt::Display for SignupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldError {
    /// The field is blank, or the income range is not in the catalogue.
    #[serde(rename = "required")]
    Required,
    /// The field is present but does not match its format rule.
    #[serde(rename = "invalid format")]
    InvalidFormat,
}

impl FieldError {
    /// Message shown inline next to the field.
    pub fn message(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::InvalidFormat => "invalid format",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&RegistrantValidationError> for FieldError {
    fn from(value: &RegistrantValidationError) -> Self {
        match value {
            RegistrantValidationError::EmptyFullName
            | RegistrantValidationError::EmptyEmail
            | RegistrantValidationError::EmptyPhoneNumber
            | RegistrantValidationError::EmptyIncomeRange => Self::Required,
            RegistrantValidationError::InvalidEmail
            | RegistrantValidationError::InvalidPhoneNumber { .. }
            | RegistrantValidationError::InvalidReferralCode
            | RegistrantValidationError::InvalidDateJoined => Self::InvalidFormat,
        }
    }
}

/// Per-field validation failures. Fields that pass have no entry.
///
/// Serialises as a JSON object such as `{"email": "required"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<SignupField, FieldError>);

impl FieldErrors {
    /// Whether every field passed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Error recorded for `field`, if it failed.
    pub fn get(&self, field: SignupField) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    /// Failing fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = (SignupField, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }

    fn capture<T>(
        &mut self,
        field: SignupField,
        result: Result<T, RegistrantValidationError>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.0.insert(field, FieldError::from(&error));
                None
            }
        }
    }
}

impl FromIterator<(SignupField, FieldError)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (SignupField, FieldError)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Signup whose four fields passed validation.
///
/// This is the precondition token for adding a registrant to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSignup {
    full_name: FullName,
    email: EmailAddress,
    phone_number: PhoneNumber,
    income_range: IncomeRangeId,
}

impl ValidatedSignup {
    /// Validate raw fields against the rules and the income catalogue.
    ///
    /// # Examples
    /// ```
    /// use subx_backend::domain::{
    ///     FieldError, IncomeRangeCatalogue, SignupField, SignupFields, ValidatedSignup,
    /// };
    ///
    /// let fields = SignupFields {
    ///     full_name: "Ada Lovelace".into(),
    ///     email: String::new(),
    ///     phone_number: "08012345678".into(),
    ///     income_range: "50000-100000".into(),
    /// };
    /// let errors = ValidatedSignup::try_from_fields(&fields, &IncomeRangeCatalogue::default())
    ///     .expect_err("email is blank");
    /// assert_eq!(errors.get(SignupField::Email), Some(FieldError::Required));
    /// assert_eq!(errors.len(), 1);
    /// ```
    pub fn try_from_fields(
        fields: &SignupFields,
        catalogue: &IncomeRangeCatalogue,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();

        let full_name = errors.capture(
            SignupField::FullName,
            FullName::new(fields.full_name.as_str()),
        );
        let email = errors.capture(SignupField::Email, EmailAddress::new(fields.email.as_str()));
        let phone_number = errors.capture(
            SignupField::PhoneNumber,
            PhoneNumber::new(fields.phone_number.as_str()),
        );
        let income_range = errors.capture(
            SignupField::IncomeRange,
            catalogued_income_range(&fields.income_range, catalogue),
        );

        match (full_name, email, phone_number, income_range) {
            (Some(full_name), Some(email), Some(phone_number), Some(income_range)) => Ok(Self {
                full_name,
                email,
                phone_number,
                income_range,
            }),
            _ => Err(errors),
        }
    }

    /// Validated email, the input to referral code generation.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub(crate) fn into_parts(self) -> (FullName, EmailAddress, PhoneNumber, IncomeRangeId) {
        (
            self.full_name,
            self.email,
            self.phone_number,
            self.income_range,
        )
    }
}

fn catalogued_income_range(
    value: &str,
    catalogue: &IncomeRangeCatalogue,
) -> Result<IncomeRangeId, RegistrantValidationError> {
    if !catalogue.contains(value) {
        return Err(RegistrantValidationError::EmptyIncomeRange);
    }
    IncomeRangeId::new(value)
}

/// Validate `fields`, returning the failing fields. Empty means valid.
pub fn validate_signup(fields: &SignupFields, catalogue: &IncomeRangeCatalogue) -> FieldErrors {
    ValidatedSignup::try_from_fields(fields, catalogue)
        .err()
        .unwrap_or_default()
}
