//! Directory-backed key-value store.
//!
//! Each key maps to `<key>.json` inside one capability-scoped directory.
//! Writes go to a uniquely named staging file first and are then renamed over
//! the target, so readers see either the old value or the new one.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use super::key_value_store::{KeyValueStore, KeyValueStoreError, check_key};

fn value_file_name(key: &str) -> String {
    format!("{key}.json")
}

fn staging_file_name(key: &str) -> String {
    format!(".{key}.tmp-{}", Uuid::new_v4().simple())
}

/// [`KeyValueStore`] persisting values as files under a root directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: Arc<Dir>,
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, KeyValueStoreError> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|error| KeyValueStoreError::io(&root, error))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .map_err(|error| KeyValueStoreError::io(&root, error))?;
        Ok(Self {
            dir: Arc::new(dir),
            root,
        })
    }

    /// Directory holding the stored values.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    async fn run_blocking<T, F>(&self, operation: F) -> Result<T, KeyValueStoreError>
    where
        F: FnOnce(&Dir) -> Result<T, KeyValueStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || operation(&dir))
            .await
            .map_err(|error| KeyValueStoreError::Worker {
                message: error.to_string(),
            })?
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        check_key(key)?;
        let file_name = value_file_name(key);
        let path = self.root.join(&file_name);
        let key = key.to_owned();

        self.run_blocking(move |dir| {
            let bytes = match dir.read(&file_name) {
                Ok(bytes) => bytes,
                Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(error) => return Err(KeyValueStoreError::io(path, error)),
            };
            String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| KeyValueStoreError::NotText { key })
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        check_key(key)?;
        let file_name = value_file_name(key);
        let staging = staging_file_name(key);
        let root = self.root.clone();
        let value = value.to_owned();

        self.run_blocking(move |dir| {
            dir.write(&staging, value.as_bytes())
                .map_err(|error| KeyValueStoreError::io(root.join(&staging), error))?;
            if let Err(error) = dir.rename(&staging, dir, &file_name) {
                let _cleanup_result = dir.remove_file(&staging);
                return Err(KeyValueStoreError::io(root.join(&file_name), error));
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn entries(root: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(root)
            .expect("read dir")
            .map(|entry| {
                entry
                    .expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    #[rstest]
    #[tokio::test]
    async fn missing_key_reads_as_none(temp_dir: TempDir) {
        let store = FileKeyValueStore::open(temp_dir.path()).expect("open store");
        assert_eq!(store.get("subx-user-storage").await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn set_writes_one_file_per_key(temp_dir: TempDir) {
        let store = FileKeyValueStore::open(temp_dir.path()).expect("open store");

        store.set("subx-user-storage", "{\"a\":1}").await.expect("set");
        store.set("subx-user-storage", "{\"a\":2}").await.expect("set");

        assert_eq!(
            store.get("subx-user-storage").await.expect("get").as_deref(),
            Some("{\"a\":2}")
        );
        assert_eq!(entries(temp_dir.path()), ["subx-user-storage.json"]);
    }

    #[rstest]
    #[tokio::test]
    async fn values_survive_reopening(temp_dir: TempDir) {
        let root = temp_dir.path().join("nested").join("state");
        FileKeyValueStore::open(&root)
            .expect("open store")
            .set("slot", "kept")
            .await
            .expect("set");

        let reopened = FileKeyValueStore::open(&root).expect("reopen store");
        assert_eq!(reopened.root(), root.as_path());
        assert_eq!(reopened.get("slot").await.expect("get").as_deref(), Some("kept"));
    }

    #[rstest]
    #[tokio::test]
    async fn binary_contents_are_reported(temp_dir: TempDir) {
        std::fs::write(temp_dir.path().join("slot.json"), [0xff, 0xfe, 0x00]).expect("seed file");
        let store = FileKeyValueStore::open(temp_dir.path()).expect("open store");

        let error = store.get("slot").await.expect_err("non-UTF-8 contents");
        assert!(matches!(error, KeyValueStoreError::NotText { key } if key == "slot"));
    }

    #[rstest]
    #[tokio::test]
    async fn path_like_keys_are_refused(temp_dir: TempDir) {
        let store = FileKeyValueStore::open(temp_dir.path()).expect("open store");

        let error = store.set("../outside", "x").await.expect_err("invalid key");
        assert!(matches!(error, KeyValueStoreError::InvalidKey { .. }));
        assert!(entries(temp_dir.path()).is_empty());
    }

    #[rstest]
    fn opening_a_file_as_root_fails(temp_dir: TempDir) {
        let file = temp_dir.path().join("not-a-dir");
        std::fs::write(&file, "x").expect("seed file");

        let error = FileKeyValueStore::open(&file).expect_err("root is a file");
        assert!(matches!(error, KeyValueStoreError::Io { path, .. } if path == file));
    }
}
