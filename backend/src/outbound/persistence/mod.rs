//! Durable storage for the registration state.
//!
//! The state lives as one JSON document under a single key in a
//! [`KeyValueStore`]. The file-backed store is the production adapter; the
//! in-memory store backs tests and ephemeral sessions.

mod file_key_value_store;
mod key_value_registration_state_repository;
mod key_value_store;

pub use file_key_value_store::FileKeyValueStore;
pub use key_value_registration_state_repository::{
    KeyValueRegistrationStateRepository, REGISTRATION_STATE_KEY,
};
pub use key_value_store::{InMemoryKeyValueStore, KeyValueStore, KeyValueStoreError};
