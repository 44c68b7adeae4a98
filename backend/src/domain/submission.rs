//! Signup submission flow.
//!
//! The flow walks `Idle → Validating → {Invalid → Idle, Submitting}` and then
//! `Submitting → {Success → Idle, Failure → Idle}`. Validation and the gateway
//! round trip have no side effects; the store is mutated in exactly one step,
//! after the gateway succeeds. Dropping a `submit` future before that step
//! leaves the store untouched and returns the flow to `Idle`.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{RegistrationStateRepository, SubmissionGateway, SubmissionGatewayError};
use super::registrant::Registrant;
use super::signup_validation::{FieldErrors, SignupFields};
use super::waitlist_service::{Committed, WaitlistService};

/// Form-level message shown when the submission round trip fails.
pub const FORM_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Phase of the submission state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// No submission in progress.
    Idle,
    /// Fields are being checked.
    Validating,
    /// Validation failed.
    Invalid,
    /// Waiting on the gateway.
    Submitting,
    /// The registrant was recorded.
    Success,
    /// The gateway failed.
    Failure,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Invalid => "invalid",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Failure => "failure",
        };
        f.write_str(name)
    }
}

/// How a submission ended.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Validation failed; the gateway was never called.
    Invalid(FieldErrors),
    /// The gateway failed; nothing was recorded.
    Failed {
        /// Form-level message for the visitor.
        message: &'static str,
        /// Underlying gateway failure.
        error: SubmissionGatewayError,
    },
    /// The registrant was recorded.
    Registered(Committed<Registrant>),
}

/// Drives one submission at a time through a [`SubmissionGateway`].
pub struct SubmissionFlow<G> {
    gateway: Arc<G>,
    phase: SubmissionPhase,
    transitions: Vec<SubmissionPhase>,
}

impl<G> SubmissionFlow<G>
where
    G: SubmissionGateway,
{
    /// Create an idle flow over `gateway`.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            phase: SubmissionPhase::Idle,
            transitions: Vec::new(),
        }
    }

    /// Current phase. `Idle` between submissions.
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Phases entered during the most recent submission, in order.
    pub fn transitions(&self) -> &[SubmissionPhase] {
        &self.transitions
    }

    /// Validate `fields`, submit them through the gateway, then record them.
    pub async fn submit<R>(
        &mut self,
        service: &mut WaitlistService<R>,
        fields: &SignupFields,
    ) -> SubmissionOutcome
    where
        R: RegistrationStateRepository,
    {
        let mut flow = InFlight(self);
        flow.transitions.clear();
        flow.enter(SubmissionPhase::Validating);

        let signup = match service.validated(fields) {
            Ok(signup) => signup,
            Err(errors) => {
                flow.enter(SubmissionPhase::Invalid);
                flow.enter(SubmissionPhase::Idle);
                return SubmissionOutcome::Invalid(errors);
            }
        };

        flow.enter(SubmissionPhase::Submitting);
        let gateway = Arc::clone(&flow.gateway);
        if let Err(error) = gateway.submit(&signup).await {
            warn!(error = %error, "signup submission failed");
            flow.enter(SubmissionPhase::Failure);
            flow.enter(SubmissionPhase::Idle);
            return SubmissionOutcome::Failed {
                message: FORM_ERROR_MESSAGE,
                error,
            };
        }

        let committed = service.add_user(signup).await;
        flow.enter(SubmissionPhase::Success);
        flow.enter(SubmissionPhase::Idle);
        SubmissionOutcome::Registered(committed)
    }
}

impl<G> SubmissionFlow<G> {
    fn enter(&mut self, phase: SubmissionPhase) {
        debug!(from = %self.phase, to = %phase, "submission phase change");
        self.phase = phase;
        self.transitions.push(phase);
    }
}

/// Returns the flow to `Idle` if a submission is dropped part-way.
struct InFlight<'a, G>(&'a mut SubmissionFlow<G>);

impl<G> Deref for InFlight<'_, G> {
    type Target = SubmissionFlow<G>;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<G> DerefMut for InFlight<'_, G> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0
    }
}

impl<G> Drop for InFlight<'_, G> {
    fn drop(&mut self) {
        if self.0.phase != SubmissionPhase::Idle {
            debug!(phase = %self.0.phase, "submission abandoned");
            self.0.enter(SubmissionPhase::Idle);
        }
    }
}
