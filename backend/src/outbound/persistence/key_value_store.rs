//! String key-value storage abstraction.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised by [`KeyValueStore`] implementations.
#[derive(Debug, Error)]
pub enum KeyValueStoreError {
    /// The key cannot be mapped onto the backing storage.
    #[error("storage key {key:?} must be non-empty ASCII letters, digits, '-' or '_'")]
    InvalidKey {
        /// Rejected key.
        key: String,
    },
    /// Filesystem access failed.
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        /// Path that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The stored bytes are not UTF-8 text.
    #[error("stored value for {key:?} is not valid UTF-8")]
    NotText {
        /// Key whose value is unreadable.
        key: String,
    },
    /// The blocking worker running the operation did not complete.
    #[error("storage worker failed: {message}")]
    Worker {
        /// Join failure reported by the runtime.
        message: String,
    },
}

impl KeyValueStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Validate a storage key. Keys double as file stems, so they are restricted
/// to a portable character set.
pub(crate) fn check_key(key: &str) -> Result<(), KeyValueStoreError> {
    let portable = !key.is_empty()
        && key
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_');
    if portable {
        Ok(())
    } else {
        Err(KeyValueStoreError::InvalidKey {
            key: key.to_owned(),
        })
    }
}

/// Durable slot of string values addressed by key.
///
/// `set` replaces the whole value; a reader never observes a partial write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` when nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError>;
}

/// Process-local store that forgets everything on drop.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        check_key(key)?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        check_key(key)?;
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
