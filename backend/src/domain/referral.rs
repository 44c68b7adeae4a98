//! Referral codes and shareable invite links.
//!
//! Codes are a salted additive checksum of the registrant's email, rendered in
//! base 36. They are human-shareable and practically distinct within one
//! installation, not unique: two emails whose characters sum to the same value
//! in the same millisecond yield the same code.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::registrant::RegistrantValidationError;

/// Literal prefix carried by every referral code.
pub const REFERRAL_CODE_PREFIX: &str = "SUBX";
/// Maximum number of base-36 characters following the prefix.
pub const REFERRAL_CODE_BODY_MAX: usize = 6;
/// Base URL invite links are built from.
pub const DEFAULT_REFERRAL_BASE_URL: &str = "https://subx.ng/r/";

const SHARE_MESSAGE_PREFIX: &str = "I just joined Subx, Nigeria's biggest real estate investment community. Join me with my referral link: ";

static REFERRAL_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn referral_code_regex() -> &'static Regex {
    REFERRAL_CODE_RE.get_or_init(|| {
        let pattern = "^SUBX[A-Z0-9]{1,6}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("referral code regex failed to compile: {error}"))
    })
}

/// Referral code in the form `SUBX` followed by one to six of `A-Z0-9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferralCode(String);

impl ReferralCode {
    /// Validate and construct a [`ReferralCode`] from an existing value.
    pub fn new(code: impl Into<String>) -> Result<Self, RegistrantValidationError> {
        let code = code.into();
        if !referral_code_regex().is_match(&code) {
            return Err(RegistrantValidationError::InvalidReferralCode);
        }
        Ok(Self(code))
    }
}

impl AsRef<str> for ReferralCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ReferralCode> for String {
    fn from(value: ReferralCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for ReferralCode {
    type Error = RegistrantValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Derive the referral code for `email` signing up at `at`.
///
/// The email is salted with the timestamp's integer millisecond value, the
/// code points of the salted string are summed, and the sum is rendered in
/// uppercase base 36. The first six characters follow the `SUBX` prefix; a
/// shorter rendering is used as is.
///
/// # Examples
/// ```
/// use chrono::DateTime;
/// use subx_backend::domain::generate_referral_code;
///
/// let at = DateTime::from_timestamp_millis(1_771_929_000_000).expect("valid timestamp");
/// let code = generate_referral_code("ada@example.com", at);
/// assert_eq!(code.as_ref(), "SUBX1N7");
/// ```
pub fn generate_referral_code(email: &str, at: DateTime<Utc>) -> ReferralCode {
    let salted = format!("{email}{}", at.timestamp_millis());
    let checksum = salted
        .chars()
        .fold(0_u64, |sum, ch| sum.saturating_add(u64::from(u32::from(ch))));
    ReferralCode(format!("{REFERRAL_CODE_PREFIX}{}", referral_body(checksum)))
}

fn referral_body(checksum: u64) -> String {
    encode_base36(checksum)
        .chars()
        .take(REFERRAL_CODE_BODY_MAX)
        .collect()
}

fn encode_base36(mut value: u64) -> String {
    let mut digits = Vec::new();
    loop {
        let remainder = u32::try_from(value % 36).unwrap_or_default();
        let digit = char::from_digit(remainder, 36).unwrap_or('0');
        digits.push(digit.to_ascii_uppercase());
        value /= 36;
        if value == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

/// Absolute base URL that invite links are appended to.
///
/// ## Invariants
/// - Parses as an absolute URL.
/// - Always ends with `/`, so `<base><code>` is a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralBaseUrl(String);

impl ReferralBaseUrl {
    /// Parse a base URL, appending a trailing slash when it is missing.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(raw.trim())?;
        let mut base = parsed.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self(base))
    }
}

impl Default for ReferralBaseUrl {
    fn default() -> Self {
        Self(DEFAULT_REFERRAL_BASE_URL.to_owned())
    }
}

impl AsRef<str> for ReferralBaseUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Shareable invite link for a referral code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralLink(String);

impl ReferralLink {
    /// Build `<base><code>`. Pure string construction.
    pub fn new(base: &ReferralBaseUrl, code: &ReferralCode) -> Self {
        Self(format!("{}{}", base.as_ref(), code.as_ref()))
    }

    /// Invitation text handed to share-sheet collaborators.
    pub fn share_message(&self) -> String {
        format!("{SHARE_MESSAGE_PREFIX}{}", self.0)
    }
}

impl AsRef<str> for ReferralLink {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReferralLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
