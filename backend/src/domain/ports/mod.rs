//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod registration_state_repository;
mod submission_gateway;

#[cfg(test)]
pub use registration_state_repository::MockRegistrationStateRepository;
pub use registration_state_repository::{
    FixtureRegistrationStateRepository, RegistrationStateRepository,
    RegistrationStateRepositoryError,
};
#[cfg(test)]
pub use submission_gateway::MockSubmissionGateway;
pub use submission_gateway::{
    FixtureSubmissionGateway, SubmissionGateway, SubmissionGatewayError,
};
