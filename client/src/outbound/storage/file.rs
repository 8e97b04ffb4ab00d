//! cap-std backed storage adapter.
//!
//! All keys live in one JSON object file. Writes stage the whole object in a
//! uniquely named sibling file and rename it over the live file, so readers
//! see either the old map or the new one.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::ports::{KeyValueStorage, StorageError};
use crate::domain::tracking::lock_state;

/// Name of the file holding the stored map.
pub const STORE_FILENAME: &str = "session.json";

/// Durable storage rooted in one directory.
pub struct FileStorage {
    dir: Dir,
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the directory cannot be created or
    /// opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|error| io_error(root, &error))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|error| io_error(root, &error))?;
        Ok(Self {
            dir,
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Directory this storage writes into.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match self.dir.read_to_string(STORE_FILENAME) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(error) => return Err(io_error(&self.root.join(STORE_FILENAME), &error)),
        };
        serde_json::from_str(&raw).map_err(|error| {
            StorageError::corrupt(format!(
                "{}: {error}",
                self.root.join(STORE_FILENAME).display()
            ))
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec(map)
            .map_err(|error| StorageError::corrupt(format!("failed to encode entries: {error}")))?;
        let staged = format!(".{STORE_FILENAME}.tmp-{}", Uuid::new_v4().simple());
        self.dir
            .write(&staged, encoded)
            .map_err(|error| io_error(&self.root.join(&staged), &error))?;
        self.dir
            .rename(&staged, &self.dir, STORE_FILENAME)
            .map_err(|error| {
                let _cleanup_result = self.dir.remove_file(&staged);
                io_error(&self.root.join(STORE_FILENAME), &error)
            })
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
        let _guard = lock_state(&self.write_lock);
        let mut map = self.read_map()?;
        map.extend(entries);
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = lock_state(&self.write_lock);
        match self.dir.remove_file(STORE_FILENAME) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(&self.root.join(STORE_FILENAME), &error)),
        }
    }
}

fn io_error(path: &Path, error: &io::Error) -> StorageError {
    StorageError::io(format!("{}: {error}", path.display()))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn storage_dir() -> TempDir {
        TempDir::new().expect("temp dir")
    }

    fn entry(key: &str, value: &str) -> (String, String) {
        (key.to_owned(), value.to_owned())
    }

    #[rstest]
    fn missing_file_reads_as_empty(storage_dir: TempDir) {
        let storage = FileStorage::open(storage_dir.path()).expect("open storage");
        assert_eq!(storage.get("token").expect("read"), None);
    }

    #[rstest]
    fn values_survive_reopening(storage_dir: TempDir) {
        let storage = FileStorage::open(storage_dir.path()).expect("open storage");
        storage
            .set_many(vec![entry("token", "abc"), entry("user", "{}")])
            .expect("write");
        drop(storage);

        let reopened = FileStorage::open(storage_dir.path()).expect("reopen storage");
        assert_eq!(reopened.get("token").expect("read").as_deref(), Some("abc"));
        assert_eq!(reopened.get("user").expect("read").as_deref(), Some("{}"));
    }

    #[rstest]
    fn clear_removes_everything_and_is_idempotent(storage_dir: TempDir) {
        let storage = FileStorage::open(storage_dir.path()).expect("open storage");
        storage.set_many(vec![entry("token", "abc")]).expect("write");
        storage.clear().expect("clear");
        storage.clear().expect("second clear");
        assert_eq!(storage.get("token").expect("read"), None);
        assert!(!storage_dir.path().join(STORE_FILENAME).exists());
    }

    #[rstest]
    fn writes_leave_no_staging_files(storage_dir: TempDir) {
        let storage = FileStorage::open(storage_dir.path()).expect("open storage");
        storage.set_many(vec![entry("token", "one")]).expect("write");
        storage.set_many(vec![entry("token", "two")]).expect("overwrite");
        let names: Vec<String> = std::fs::read_dir(storage_dir.path())
            .expect("list dir")
            .map(|item| item.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![STORE_FILENAME.to_owned()]);
        assert_eq!(storage.get("token").expect("read").as_deref(), Some("two"));
    }

    #[rstest]
    fn corrupt_contents_are_reported(storage_dir: TempDir) {
        std::fs::write(storage_dir.path().join(STORE_FILENAME), "not json").expect("seed file");
        let storage = FileStorage::open(storage_dir.path()).expect("open storage");
        let error = storage.get("token").expect_err("corrupt file must fail");
        assert!(error.is_corrupt());
    }
}
