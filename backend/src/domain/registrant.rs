//! Registrant data model.
//!
//! A registrant is one completed, validated signup. Every field is write-once:
//! the type only exposes getters, and the referral code and join timestamp are
//! stamped exactly once when the record is created.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::referral::ReferralCode;
use super::signup_validation::ValidatedSignup;

/// Validation errors returned by the registrant field constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrantValidationError {
    /// The full name is blank.
    #[error("full name must not be empty")]
    EmptyFullName,
    /// The email is blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// The email does not match the address pattern.
    #[error("email must look like local@domain.tld with no whitespace")]
    InvalidEmail,
    /// The phone number is blank.
    #[error("phone number must not be empty")]
    EmptyPhoneNumber,
    /// The phone number has too few or too many digits.
    #[error("phone number must contain between 10 and 15 digits, found {digits}")]
    InvalidPhoneNumber {
        /// Digits found after stripping separators.
        digits: usize,
    },
    /// The income range identifier is blank.
    #[error("income range must not be empty")]
    EmptyIncomeRange,
    /// The referral code is not in `SUBX` format.
    #[error("referral code must be SUBX followed by one to six characters A-Z or 0-9")]
    InvalidReferralCode,
    /// The join timestamp does not parse.
    #[error("date joined must be an RFC 3339 timestamp")]
    InvalidDateJoined,
}

/// Minimum number of digits in a phone number once separators are stripped.
pub const PHONE_DIGITS_MIN: usize = 10;
/// Maximum number of digits in a phone number once separators are stripped.
pub const PHONE_DIGITS_MAX: usize = 15;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Anchored so whitespace anywhere in the value is rejected.
        let pattern = r"^\S+@\S+\.\S+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Registrant's full name, kept exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a [`FullName`]; blank input is rejected.
    pub fn new(full_name: impl Into<String>) -> Result<Self, RegistrantValidationError> {
        let full_name = full_name.into();
        if full_name.trim().is_empty() {
            return Err(RegistrantValidationError::EmptyFullName);
        }
        Ok(Self(full_name))
    }
}

/// Contact email address in `local@domain.tld` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    ///
    /// The emptiness check trims the input; the format check does not, so
    /// leading or trailing whitespace fails as an invalid format.
    pub fn new(email: impl Into<String>) -> Result<Self, RegistrantValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(RegistrantValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&email) {
            return Err(RegistrantValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

/// Phone number as submitted, with 10 to 15 digits once separators are removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a [`PhoneNumber`].
    ///
    /// # Examples
    /// ```
    /// use subx_backend::domain::PhoneNumber;
    ///
    /// let phone = PhoneNumber::new("+234 (801) 234-5678").expect("13 digits");
    /// assert_eq!(phone.digits(), "2348012345678");
    /// ```
    pub fn new(phone_number: impl Into<String>) -> Result<Self, RegistrantValidationError> {
        let phone_number = phone_number.into();
        if phone_number.trim().is_empty() {
            return Err(RegistrantValidationError::EmptyPhoneNumber);
        }
        let digits = phone_number.chars().filter(char::is_ascii_digit).count();
        if !(PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&digits) {
            return Err(RegistrantValidationError::InvalidPhoneNumber { digits });
        }
        Ok(Self(phone_number))
    }

    /// The number with every non-digit character stripped.
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }
}

/// Identifier of an income bracket. Catalogue membership is checked by the
/// signup validator, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IncomeRangeId(String);

impl IncomeRangeId {
    /// Construct an [`IncomeRangeId`]; empty input is rejected.
    pub fn new(income_range: impl Into<String>) -> Result<Self, RegistrantValidationError> {
        let income_range = income_range.into();
        if income_range.trim().is_empty() {
            return Err(RegistrantValidationError::EmptyIncomeRange);
        }
        Ok(Self(income_range))
    }
}

macro_rules! string_newtype_conversions {
    ($($name:ident),* $(,)?) => {
        $(
            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_ref())
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl TryFrom<String> for $name {
                type Error = RegistrantValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }
        )*
    };
}

string_newtype_conversions!(FullName, EmailAddress, PhoneNumber, IncomeRangeId);

/// One completed signup.
///
/// ## Invariants
/// - All fields are write-once; there are no setters.
/// - `date_joined` carries millisecond precision so that persisted documents
///   round-trip exactly.
///
/// Serialises as a camelCase object (`fullName`, `email`, `phoneNumber`,
/// `incomeRange`, `referralCode`, `dateJoined`). Unknown fields are ignored
/// on read so older or newer documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistrantDto", into = "RegistrantDto")]
pub struct Registrant {
    full_name: FullName,
    email: EmailAddress,
    phone_number: PhoneNumber,
    income_range: IncomeRangeId,
    referral_code: ReferralCode,
    date_joined: DateTime<Utc>,
}

impl Registrant {
    /// Build a registrant from a validated signup and its derived fields.
    pub fn new(
        signup: ValidatedSignup,
        referral_code: ReferralCode,
        date_joined: DateTime<Utc>,
    ) -> Self {
        let (full_name, email, phone_number, income_range) = signup.into_parts();
        Self {
            full_name,
            email,
            phone_number,
            income_range,
            referral_code,
            date_joined: date_joined.trunc_subsecs(3),
        }
    }

    /// Full name as submitted.
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Contact email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Phone number as submitted.
    pub fn phone_number(&self) -> &PhoneNumber {
        &self.phone_number
    }

    /// Selected income bracket.
    pub fn income_range(&self) -> &IncomeRangeId {
        &self.income_range
    }

    /// Referral code assigned at creation.
    pub fn referral_code(&self) -> &ReferralCode {
        &self.referral_code
    }

    /// Moment the registrant signed up.
    pub fn date_joined(&self) -> DateTime<Utc> {
        self.date_joined
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrantDto {
    full_name: String,
    email: String,
    phone_number: String,
    income_range: String,
    referral_code: String,
    date_joined: String,
}

impl From<Registrant> for RegistrantDto {
    fn from(value: Registrant) -> Self {
        let Registrant {
            full_name,
            email,
            phone_number,
            income_range,
            referral_code,
            date_joined,
        } = value;
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            income_range: income_range.into(),
            referral_code: referral_code.into(),
            date_joined: date_joined.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl TryFrom<RegistrantDto> for Registrant {
    type Error = RegistrantValidationError;

    fn try_from(value: RegistrantDto) -> Result<Self, Self::Error> {
        let date_joined = DateTime::parse_from_rfc3339(&value.date_joined)
            .map_err(|_| RegistrantValidationError::InvalidDateJoined)?
            .with_timezone(&Utc);

        Ok(Self {
            full_name: FullName::new(value.full_name)?,
            email: EmailAddress::new(value.email)?,
            phone_number: PhoneNumber::new(value.phone_number)?,
            income_range: IncomeRangeId::new(value.income_range)?,
            referral_code: ReferralCode::new(value.referral_code)?,
            date_joined: date_joined.trunc_subsecs(3),
        })
    }
}

#[cfg(test)]
mod tests;
