//! Registration state repository over a [`KeyValueStore`].

use async_trait::async_trait;
use tracing::debug;

use crate::domain::StoreSnapshot;
use crate::domain::ports::{RegistrationStateRepository, RegistrationStateRepositoryError};

use super::key_value_store::{KeyValueStore, KeyValueStoreError};

/// Key under which the whole registration state document is stored.
pub const REGISTRATION_STATE_KEY: &str = "subx-user-storage";

fn map_store_error(error: KeyValueStoreError) -> RegistrationStateRepositoryError {
    match error {
        KeyValueStoreError::Worker { message } => {
            RegistrationStateRepositoryError::connection(message)
        }
        KeyValueStoreError::NotText { .. } => {
            RegistrationStateRepositoryError::serialization(error.to_string())
        }
        KeyValueStoreError::InvalidKey { .. } | KeyValueStoreError::Io { .. } => {
            RegistrationStateRepositoryError::query(error.to_string())
        }
    }
}

/// Stores the [`StoreSnapshot`] as one JSON document under
/// [`REGISTRATION_STATE_KEY`].
#[derive(Debug, Clone)]
pub struct KeyValueRegistrationStateRepository<K> {
    store: K,
    key: String,
}

impl<K> KeyValueRegistrationStateRepository<K>
where
    K: KeyValueStore,
{
    /// Repository using the default key.
    pub fn new(store: K) -> Self {
        Self::with_key(store, REGISTRATION_STATE_KEY)
    }

    /// Repository using a custom key.
    pub fn with_key(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Backing store.
    pub fn store(&self) -> &K {
        &self.store
    }
}

#[async_trait]
impl<K> RegistrationStateRepository for KeyValueRegistrationStateRepository<K>
where
    K: KeyValueStore,
{
    async fn load(&self) -> Result<Option<StoreSnapshot>, RegistrationStateRepositoryError> {
        let Some(document) = self.store.get(&self.key).await.map_err(map_store_error)? else {
            debug!(key = %self.key, "no persisted registration state");
            return Ok(None);
        };
        serde_json::from_str(&document)
            .map(Some)
            .map_err(|error| RegistrationStateRepositoryError::serialization(error.to_string()))
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), RegistrationStateRepositoryError> {
        let document = serde_json::to_string(snapshot)
            .map_err(|error| RegistrationStateRepositoryError::serialization(error.to_string()))?;
        self.store
            .set(&self.key, &document)
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{ada_fields, fixture_timestamp, validated};
    use crate::domain::{RegistrationStore, generate_referral_code};
    use crate::outbound::persistence::InMemoryKeyValueStore;
    use rstest::{fixture, rstest};
    use serde_json::Value;

    #[fixture]
    fn repository() -> KeyValueRegistrationStateRepository<InMemoryKeyValueStore> {
        KeyValueRegistrationStateRepository::new(InMemoryKeyValueStore::new())
    }

    fn populated_snapshot() -> StoreSnapshot {
        let mut store = RegistrationStore::default();
        let at = fixture_timestamp();
        store.add_user(
            validated(&ada_fields()),
            generate_referral_code("ada@example.com", at),
            at,
        );
        store.snapshot()
    }

    #[rstest]
    #[tokio::test]
    async fn empty_store_loads_nothing(
        repository: KeyValueRegistrationStateRepository<InMemoryKeyValueStore>,
    ) {
        assert_eq!(repository.load().await.expect("load"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn saved_snapshot_loads_back(
        repository: KeyValueRegistrationStateRepository<InMemoryKeyValueStore>,
    ) {
        let snapshot = populated_snapshot();
        repository.save(&snapshot).await.expect("save");

        assert_eq!(repository.load().await.expect("load"), Some(snapshot));
    }

    #[rstest]
    #[tokio::test]
    async fn document_is_stored_under_the_state_key(
        repository: KeyValueRegistrationStateRepository<InMemoryKeyValueStore>,
    ) {
        repository.save(&populated_snapshot()).await.expect("save");

        let raw = repository
            .store()
            .get(REGISTRATION_STATE_KEY)
            .await
            .expect("get")
            .expect("document stored");
        let value: Value = serde_json::from_str(&raw).expect("stored JSON");
        assert_eq!(
            value.get("signupCount").and_then(Value::as_u64),
            Some(137_583)
        );
    }

    #[rstest]
    #[case("{not json")]
    #[case("{\"registrants\": []}")]
    #[case("{\"signupCount\": -1}")]
    #[tokio::test]
    async fn corrupt_documents_report_serialization_errors(
        repository: KeyValueRegistrationStateRepository<InMemoryKeyValueStore>,
        #[case] document: &str,
    ) {
        repository
            .store()
            .set(REGISTRATION_STATE_KEY, document)
            .await
            .expect("seed");

        let error = repository.load().await.expect_err("corrupt document");
        assert!(matches!(
            error,
            RegistrationStateRepositoryError::Serialization { .. }
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn counter_survives_an_outdated_registrant_record(
        repository: KeyValueRegistrationStateRepository<InMemoryKeyValueStore>,
    ) {
        let document = r#"{
            "registrants": [{
                "fullName": "Ada Lovelace",
                "email": "ada@example.com",
                "phoneNumber": "08012345678",
                "incomeRange": "50000-100000",
                "dateJoined": "2026-02-24T10:30:00.000Z"
            }],
            "signupCount": 137600,
            "activeRegistrant": null
        }"#;
        repository
            .store()
            .set(REGISTRATION_STATE_KEY, document)
            .await
            .expect("seed");

        let snapshot = repository
            .load()
            .await
            .expect("load")
            .expect("document present");
        assert_eq!(snapshot.signup_count, 137_600);
        assert!(snapshot.registrants.is_empty());

        let mut store = RegistrationStore::from_snapshot(snapshot);
        store.reset();
        repository.save(&store.snapshot()).await.expect("save");

        let raw = repository
            .store()
            .get(REGISTRATION_STATE_KEY)
            .await
            .expect("get")
            .expect("document stored");
        let value: Value = serde_json::from_str(&raw).expect("stored JSON");
        assert_eq!(
            value.get("signupCount").and_then(Value::as_u64),
            Some(137_600)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_key_surfaces_as_query_error() {
        let repository =
            KeyValueRegistrationStateRepository::with_key(InMemoryKeyValueStore::new(), "bad key");

        let error = repository
            .save(&populated_snapshot())
            .await
            .expect_err("invalid key");
        assert!(matches!(error, RegistrationStateRepositoryError::Query { .. }));
    }
}
