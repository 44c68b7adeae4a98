//! Domain primitives and aggregates.
//!
//! Purpose: Define the signup engine's entities and the operations that keep
//! them consistent. Types are immutable once constructed; invariants and
//! serialisation contracts (serde) are documented on each type.
//!
//! Public surface:
//! - Registrant (alias to `registrant::Registrant`): one completed signup.
//! - SignupFields / ValidatedSignup: raw and validated form input.
//! - RegistrationStore: registrants, signup counter, active registrant.
//! - WaitlistService: the owned engine instance wired to persistence.
//! - SubmissionFlow: the validate, submit, commit state machine.
//! - DomainError (alias to `error::DomainError`): transport agnostic error.

pub mod error;
pub mod income_range;
pub mod ports;
pub mod referral;
pub mod registrant;
pub mod registration_store;
pub mod signup_validation;
pub mod submission;
pub mod waitlist_service;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::income_range::{
    DEFAULT_INCOME_RANGE, IncomeRangeCatalogue, IncomeRangeCatalogueError, IncomeRangeOption,
};
pub use self::referral::{
    DEFAULT_REFERRAL_BASE_URL, ReferralBaseUrl, ReferralCode, ReferralLink,
    generate_referral_code,
};
pub use self::registrant::{
    EmailAddress, FullName, IncomeRangeId, PhoneNumber, Registrant, RegistrantValidationError,
};
pub use self::registration_store::{
    DEFAULT_BASELINE_SIGNUP_COUNT, RegistrationStore, StoreSnapshot,
};
pub use self::signup_validation::{
    FieldError, FieldErrors, SignupField, SignupFields, ValidatedSignup, validate_signup,
};
pub use self::submission::{
    FORM_ERROR_MESSAGE, SubmissionFlow, SubmissionOutcome, SubmissionPhase,
};
pub use self::waitlist_service::{Committed, WaitlistOptions, WaitlistService};
