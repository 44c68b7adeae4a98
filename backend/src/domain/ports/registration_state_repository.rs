//! Port for durable registration state.
//!
//! The [`RegistrationStateRepository`] trait is the store's persistence
//! contract: read the full state once at startup, write the full state after
//! every committed mutation. There is a single writer, so adapters need no
//! read-modify-write protection; their one duty is a lossless round trip.

use async_trait::async_trait;

use crate::domain::StoreSnapshot;

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration state adapters.
    pub enum RegistrationStateRepositoryError {
        /// Storage backend could not be reached or opened.
        Connection { message: String } =>
            "registration state storage unavailable: {message}",
        /// Reading or writing the durable slot failed.
        Query { message: String } =>
            "registration state storage operation failed: {message}",
        /// Stored document could not be encoded or decoded.
        Serialization { message: String } =>
            "registration state serialization failed: {message}",
    }
}

/// Port for loading and saving the registration store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationStateRepository: Send + Sync {
    /// Load the persisted state.
    ///
    /// Returns `None` when nothing has been saved yet; callers then start from
    /// the documented defaults.
    async fn load(&self) -> Result<Option<StoreSnapshot>, RegistrationStateRepositoryError>;

    /// Replace the persisted state with `snapshot`.
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), RegistrationStateRepositoryError>;
}

/// Fixture implementation for testing without durable storage.
///
/// Lookups always return `None` and saves are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRegistrationStateRepository;

#[async_trait]
impl RegistrationStateRepository for FixtureRegistrationStateRepository {
    async fn load(&self) -> Result<Option<StoreSnapshot>, RegistrationStateRepositoryError> {
        Ok(None)
    }

    async fn save(
        &self,
        _snapshot: &StoreSnapshot,
    ) -> Result<(), RegistrationStateRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegistrationStore;
    use rstest::rstest;

    #[tokio::test]
    async fn fixture_repository_load_returns_none() {
        let repo = FixtureRegistrationStateRepository;
        let loaded = repo.load().await.expect("fixture load should succeed");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn fixture_repository_accepts_saves() {
        let repo = FixtureRegistrationStateRepository;
        repo.save(&RegistrationStore::default().snapshot())
            .await
            .expect("fixture save should succeed");
    }

    #[rstest]
    fn serialization_error_formats_message() {
        let error = RegistrationStateRepositoryError::serialization("expected value at line 1");
        assert_eq!(
            error.to_string(),
            "registration state serialization failed: expected value at line 1"
        );
    }
}
