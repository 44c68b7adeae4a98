//! Port for the network round trip that precedes a signup commit.

use async_trait::async_trait;

use crate::domain::ValidatedSignup;

use super::define_port_error;

define_port_error! {
    /// Errors raised by submission gateways.
    pub enum SubmissionGatewayError {
        /// The remote service could not be reached.
        Unavailable { message: String } => "submission service unavailable: {message}",
        /// The remote service refused the submission.
        Rejected { message: String } => "submission rejected: {message}",
    }
}

/// Port for forwarding a validated signup before it is recorded locally.
///
/// A gateway must not touch the registration store. Its failure leaves the
/// store exactly as it was.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Submit `signup`, resolving once the round trip completes.
    async fn submit(&self, signup: &ValidatedSignup) -> Result<(), SubmissionGatewayError>;
}

/// Gateway that accepts everything immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubmissionGateway;

#[async_trait]
impl SubmissionGateway for FixtureSubmissionGateway {
    async fn submit(&self, _signup: &ValidatedSignup) -> Result<(), SubmissionGatewayError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{ada_fields, validated};

    #[tokio::test]
    async fn fixture_gateway_accepts_submissions() {
        FixtureSubmissionGateway
            .submit(&validated(&ada_fields()))
            .await
            .expect("fixture gateway should accept");
    }

    #[test]
    fn rejected_error_formats_message() {
        let error = SubmissionGatewayError::rejected("waitlist closed");
        assert_eq!(error.to_string(), "submission rejected: waitlist closed");
    }
}
