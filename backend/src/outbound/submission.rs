//! Simulated submission gateway.
//!
//! The waitlist has no remote backend yet; the gateway waits for a fixed
//! delay and then resolves, so callers exercise the same asynchronous path a
//! real network round trip would take.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ValidatedSignup;
use crate::domain::ports::{SubmissionGateway, SubmissionGatewayError};

/// Default latency of the simulated round trip.
pub const DEFAULT_SUBMISSION_DELAY: Duration = Duration::from_millis(1_000);

/// Gateway that sleeps for `delay` and then accepts or fails.
#[derive(Debug, Clone)]
pub struct SimulatedSubmissionGateway {
    delay: Duration,
    failure: Option<String>,
}

impl SimulatedSubmissionGateway {
    /// Gateway that accepts every signup after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failure: None,
        }
    }

    /// Gateway that reports the service as unavailable after `delay`.
    pub fn failing(delay: Duration, message: impl Into<String>) -> Self {
        Self {
            delay,
            failure: Some(message.into()),
        }
    }
}

impl Default for SimulatedSubmissionGateway {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMISSION_DELAY)
    }
}

#[async_trait]
impl SubmissionGateway for SimulatedSubmissionGateway {
    async fn submit(&self, _signup: &ValidatedSignup) -> Result<(), SubmissionGatewayError> {
        debug!(delay = ?self.delay, "simulating submission");
        tokio::time::sleep(self.delay).await;
        match &self.failure {
            Some(message) => Err(SubmissionGatewayError::unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{ada_fields, validated};
    use rstest::rstest;

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn waits_for_the_configured_delay() {
        let gateway = SimulatedSubmissionGateway::default();
        let started = tokio::time::Instant::now();

        gateway
            .submit(&validated(&ada_fields()))
            .await
            .expect("simulated submission succeeds");

        assert!(started.elapsed() >= DEFAULT_SUBMISSION_DELAY);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn failing_gateway_reports_unavailable() {
        let gateway = SimulatedSubmissionGateway::failing(Duration::from_millis(5), "offline");

        let error = gateway
            .submit(&validated(&ada_fields()))
            .await
            .expect_err("configured to fail");
        assert_eq!(error, SubmissionGatewayError::unavailable("offline"));
    }
}
