//! In-memory registration store.
//!
//! The store owns the ordered registrant list, the signup counter, and the
//! active-registrant pointer. Every mutation goes through [`RegistrationStore::add_user`]
//! or [`RegistrationStore::reset`], neither of which can fail or yield midway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::referral::ReferralCode;
use super::registrant::Registrant;
use super::signup_validation::ValidatedSignup;

/// Simulated signups that predate this installation.
pub const DEFAULT_BASELINE_SIGNUP_COUNT: u64 = 137_582;

/// Persisted shape of the store.
///
/// Serialises to a document with exactly three top-level fields:
/// `registrants`, `signupCount`, and `activeRegistrant` (object or `null`).
/// Unknown fields are ignored on read. Registrant records that no longer
/// validate are skipped with a warning so the counter is still restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoreSnapshotDto")]
pub struct StoreSnapshot {
    /// Registrants in signup order.
    pub registrants: Vec<Registrant>,
    /// Historical signup counter, including the baseline.
    pub signup_count: u64,
    /// Most recently added registrant, if any.
    pub active_registrant: Option<Registrant>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreSnapshotDto {
    #[serde(default)]
    registrants: Vec<Value>,
    signup_count: u64,
    #[serde(default)]
    active_registrant: Option<Value>,
}

impl From<StoreSnapshotDto> for StoreSnapshot {
    fn from(value: StoreSnapshotDto) -> Self {
        let registrants = value
            .registrants
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| decode_registrant(record, Some(index)))
            .collect();
        let active_registrant = value
            .active_registrant
            .and_then(|record| decode_registrant(record, None));

        Self {
            registrants,
            signup_count: value.signup_count,
            active_registrant,
        }
    }
}

fn decode_registrant(record: Value, index: Option<usize>) -> Option<Registrant> {
    serde_json::from_value(record)
        .inspect_err(|err| {
            warn!(
                index,
                error = %err,
                "skipping persisted registrant that no longer validates"
            );
        })
        .ok()
}

/// Session-scoped signup state.
///
/// ## Invariants
/// - `registrants` is append-only; only [`RegistrationStore::reset`] removes
///   entries, and it removes all of them.
/// - `signup_count` grows by exactly one per [`RegistrationStore::add_user`]
///   and is never lowered, not even by a reset.
/// - The active registrant is an index into `registrants`, never a second
///   copy, so the two cannot diverge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationStore {
    registrants: Vec<Registrant>,
    signup_count: u64,
    active_index: Option<usize>,
}

impl RegistrationStore {
    /// Fresh store with no registrants and the counter at `baseline`.
    pub fn new(baseline: u64) -> Self {
        Self {
            registrants: Vec::new(),
            signup_count: baseline,
            active_index: None,
        }
    }

    /// Rebuild a store from persisted state.
    ///
    /// The active registrant is matched against the list, newest first. A
    /// snapshot whose active registrant is not in the list restores with no
    /// active registrant.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let StoreSnapshot {
            registrants,
            signup_count,
            active_registrant,
        } = snapshot;

        let active_index = active_registrant.and_then(|active| {
            let index = registrants.iter().rposition(|candidate| *candidate == active);
            if index.is_none() {
                warn!(
                    referral_code = %active.referral_code(),
                    "persisted active registrant is not in the registrant list; clearing it"
                );
            }
            index
        });

        Self {
            registrants,
            signup_count,
            active_index,
        }
    }

    /// Capture the full state for persistence.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            registrants: self.registrants.clone(),
            signup_count: self.signup_count,
            active_registrant: self.active_registrant().cloned(),
        }
    }

    /// Registrants in signup order.
    pub fn registrants(&self) -> &[Registrant] {
        &self.registrants
    }

    /// Historical signup counter.
    pub fn signup_count(&self) -> u64 {
        self.signup_count
    }

    /// The most recently added registrant in this session.
    pub fn active_registrant(&self) -> Option<&Registrant> {
        self.active_index
            .and_then(|index| self.registrants.get(index))
    }

    /// Append a registrant for `signup`, bump the counter, and make it active.
    ///
    /// Never deduplicates: each call creates exactly one new registrant.
    pub fn add_user(
        &mut self,
        signup: ValidatedSignup,
        referral_code: ReferralCode,
        joined_at: DateTime<Utc>,
    ) -> Registrant {
        let registrant = Registrant::new(signup, referral_code, joined_at);
        let index = self.registrants.len();
        self.registrants.push(registrant.clone());
        self.signup_count = self.signup_count.saturating_add(1);
        self.active_index = Some(index);
        registrant
    }

    /// First registrant holding `code`. Absence is a normal outcome.
    pub fn get_by_referral_code(&self, code: &str) -> Option<&Registrant> {
        self.registrants
            .iter()
            .find(|registrant| registrant.referral_code().as_ref() == code)
    }

    /// Drop session data: registrants and the active pointer.
    ///
    /// The signup counter is left untouched because it tracks historical
    /// signups rather than the current list.
    pub fn reset(&mut self) {
        self.registrants.clear();
        self.active_index = None;
    }
}

impl Default for RegistrationStore {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_SIGNUP_COUNT)
    }
}
