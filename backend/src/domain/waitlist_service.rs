//! Waitlist engine: the single owned registration store wired to persistence.
//!
//! [`WaitlistService`] is the one place the store is mutated. It reads the
//! persisted state once at startup and writes the full state after every
//! committed mutation. A failed write is reported on the returned
//! [`Committed`] value and never rolls the in-memory state back.
//!
//! The service takes `&mut self` for mutations, so a host that shares it
//! across tasks must wrap it in a mutex around each call.

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, info, warn};

use super::income_range::IncomeRangeCatalogue;
use super::ports::{RegistrationStateRepository, RegistrationStateRepositoryError};
use super::referral::{ReferralBaseUrl, ReferralCode, ReferralLink, generate_referral_code};
use super::registrant::Registrant;
use super::registration_store::{DEFAULT_BASELINE_SIGNUP_COUNT, RegistrationStore};
use super::signup_validation::{FieldErrors, SignupFields, ValidatedSignup, validate_signup};

/// Result of a committed mutation together with its persistence outcome.
#[derive(Debug)]
#[must_use]
pub struct Committed<T> {
    value: T,
    persistence: Result<(), RegistrationStateRepositoryError>,
}

impl<T> Committed<T> {
    fn new(value: T, persistence: Result<(), RegistrationStateRepositoryError>) -> Self {
        Self { value, persistence }
    }

    /// The committed value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Discard the persistence outcome and keep the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Whether the committed state reached durable storage.
    pub fn is_persisted(&self) -> bool {
        self.persistence.is_ok()
    }

    /// The persistence failure, if the write did not succeed.
    pub fn persistence_error(&self) -> Option<&RegistrationStateRepositoryError> {
        self.persistence.as_ref().err()
    }
}

/// Startup options for [`WaitlistService::start`].
#[derive(Debug, Clone)]
pub struct WaitlistOptions {
    catalogue: IncomeRangeCatalogue,
    baseline_count: u64,
    referral_base: ReferralBaseUrl,
}

impl WaitlistOptions {
    /// Options using the built-in catalogue, baseline, and link base.
    pub fn new() -> Self {
        Self {
            catalogue: IncomeRangeCatalogue::default(),
            baseline_count: DEFAULT_BASELINE_SIGNUP_COUNT,
            referral_base: ReferralBaseUrl::default(),
        }
    }

    /// Replace the income range catalogue.
    #[must_use]
    pub fn with_catalogue(mut self, catalogue: IncomeRangeCatalogue) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// Counter value used when no persisted state exists.
    #[must_use]
    pub fn with_baseline_count(mut self, baseline_count: u64) -> Self {
        self.baseline_count = baseline_count;
        self
    }

    /// Base URL for invite links.
    #[must_use]
    pub fn with_referral_base(mut self, referral_base: ReferralBaseUrl) -> Self {
        self.referral_base = referral_base;
        self
    }
}

impl Default for WaitlistOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The signup engine instance.
pub struct WaitlistService<R> {
    store: RegistrationStore,
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    catalogue: IncomeRangeCatalogue,
    referral_base: ReferralBaseUrl,
}

impl<R> WaitlistService<R>
where
    R: RegistrationStateRepository,
{
    /// Restore the store from `repository`, or start from defaults.
    ///
    /// Missing state starts a fresh store at the configured baseline. State
    /// that cannot be read or decoded is logged and also replaced by defaults,
    /// so startup never fails on storage.
    pub async fn start(repository: Arc<R>, clock: Arc<dyn Clock>, options: WaitlistOptions) -> Self {
        let WaitlistOptions {
            catalogue,
            baseline_count,
            referral_base,
        } = options;

        let store = match repository.load().await {
            Ok(Some(snapshot)) => {
                let store = RegistrationStore::from_snapshot(snapshot);
                info!(
                    signup_count = store.signup_count(),
                    registrants = store.registrants().len(),
                    "restored waitlist state"
                );
                store
            }
            Ok(None) => {
                info!(
                    signup_count = baseline_count,
                    "no persisted waitlist state; starting from defaults"
                );
                RegistrationStore::new(baseline_count)
            }
            Err(err) => {
                error!(
                    error = %err,
                    signup_count = baseline_count,
                    "failed to restore waitlist state; starting from defaults"
                );
                RegistrationStore::new(baseline_count)
            }
        };

        Self {
            store,
            repository,
            clock,
            catalogue,
            referral_base,
        }
    }

    /// Check raw fields. Pure: the store is not touched.
    pub fn validate(&self, fields: &SignupFields) -> FieldErrors {
        validate_signup(fields, &self.catalogue)
    }

    /// Validate raw fields into the token [`WaitlistService::add_user`] takes.
    pub fn validated(&self, fields: &SignupFields) -> Result<ValidatedSignup, FieldErrors> {
        ValidatedSignup::try_from_fields(fields, &self.catalogue)
    }

    /// Record a new registrant and persist the updated state.
    ///
    /// The referral code and join time come from one clock reading. The
    /// append, counter bump, and active pointer update happen together before
    /// the persistence write is awaited.
    pub async fn add_user(&mut self, signup: ValidatedSignup) -> Committed<Registrant> {
        let joined_at = self.clock.utc();
        let referral_code = generate_referral_code(signup.email().as_ref(), joined_at);
        let registrant = self.store.add_user(signup, referral_code, joined_at);
        info!(
            referral_code = %registrant.referral_code(),
            signup_count = self.store.signup_count(),
            "registrant added"
        );

        let persistence = self.persist().await;
        Committed::new(registrant, persistence)
    }

    /// Clear registrants and the active registrant, keeping the counter.
    pub async fn reset(&mut self) -> Committed<()> {
        self.store.reset();
        info!(
            signup_count = self.store.signup_count(),
            "waitlist session data reset"
        );

        let persistence = self.persist().await;
        Committed::new((), persistence)
    }

    async fn persist(&self) -> Result<(), RegistrationStateRepositoryError> {
        let snapshot = self.store.snapshot();
        self.repository.save(&snapshot).await.inspect_err(|err| {
            warn!(error = %err, "failed to persist waitlist state");
        })
    }
}

impl<R> WaitlistService<R> {
    /// First registrant holding `code`, if any.
    pub fn get_by_referral_code(&self, code: &str) -> Option<&Registrant> {
        self.store.get_by_referral_code(code)
    }

    /// Historical signup counter.
    pub fn signup_count(&self) -> u64 {
        self.store.signup_count()
    }

    /// The current user: the most recently added registrant.
    pub fn active_registrant(&self) -> Option<&Registrant> {
        self.store.active_registrant()
    }

    /// Registrants in signup order.
    pub fn registrants(&self) -> &[Registrant] {
        self.store.registrants()
    }

    /// Invite link for the active registrant.
    pub fn referral_link(&self) -> Option<ReferralLink> {
        self.active_registrant()
            .map(|registrant| self.referral_link_for(registrant.referral_code()))
    }

    /// Invite link for any referral code under the configured base.
    pub fn referral_link_for(&self, code: &ReferralCode) -> ReferralLink {
        ReferralLink::new(&self.referral_base, code)
    }

    /// Income brackets offered on the form.
    pub fn catalogue(&self) -> &IncomeRangeCatalogue {
        &self.catalogue
    }
}
