// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed JSON document store.
//!
//! Every document lives in its own `<collection>/<id>.json` file. Writes go
//! to a uniquely named temp file first and are renamed into place, so a
//! reader never observes a half-written document.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::StoragePaths;

/// Error type for document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Storage not initialized")]
    NotInitialized,
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(e.to_string()),
            io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(e.to_string()),
            _ => StorageError::Io(e),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone)]
pub struct DocumentStore {
    paths: StoragePaths,
    initialized: bool,
}

impl DocumentStore {
    /// Create a new DocumentStore instance.
    ///
    /// Does NOT initialize the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Create every collection directory. Idempotent.
    pub fn initialize(&mut self) -> StorageResult<()> {
        let dirs = [
            self.paths.users_dir(),
            self.paths.user_emails_dir(),
            self.paths.projects_dir(),
            self.paths.sprints_dir(),
            self.paths.tasks_dir(),
            self.paths.audit_dir(),
        ];

        for dir in dirs {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Write-read-delete check of the data directory.
    pub fn health_check(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let test_file = self
            .paths
            .root()
            .join(format!(".health_check.{}", uuid::Uuid::new_v4().simple()));
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::IntegrityViolation(
                "Health check data mismatch".to_string(),
            ));
        }

        Ok(())
    }

    // ========== Generic JSON Operations ==========

    /// Read a JSON file and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let value = serde_json::from_reader(reader)?;
        Ok(value)
    }

    /// Write a JSON file (atomic write via rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Unique temp name so concurrent writers never share a temp file.
        let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Create a JSON file that must not exist yet.
    ///
    /// Uses `create_new`, so two concurrent callers racing for the same path
    /// get exactly one success and one `AlreadyExists`.
    pub fn create_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        Ok(())
    }

    /// Check if a file exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        File::open(path.as_ref()).is_ok()
    }

    /// Delete a file.
    pub fn delete(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        fs::remove_file(path.as_ref())?;
        Ok(())
    }

    /// List the ids (file stems) of all files with `extension` in `dir`.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StorageResult<Vec<String>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != extension) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Load every JSON document in a collection directory.
    ///
    /// Documents that fail to parse are skipped with a warning rather than
    /// failing the whole listing.
    pub fn list_json<T: DeserializeOwned>(&self, dir: impl AsRef<Path>) -> StorageResult<Vec<T>> {
        let dir = dir.as_ref();
        let mut documents = Vec::new();
        for id in self.list_files(dir, "json")? {
            match self.read_json(dir.join(format!("{id}.json"))) {
                Ok(document) => documents.push(document),
                // Deleted between listing and reading.
                Err(StorageError::NotFound(_)) => {}
                Err(e) => {
                    tracing::warn!(error = %e, document = %id, "Skipping unreadable document");
                }
            }
        }
        Ok(documents)
    }

    /// Read raw bytes from a file.
    pub fn read_raw(&self, path: impl AsRef<Path>) -> StorageResult<Vec<u8>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        Ok(fs::read(path.as_ref())?)
    }

    /// Append raw bytes to a file, creating it (and its parents) if needed.
    pub fn append_raw(&self, path: impl AsRef<Path>, data: &[u8]) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    fn test_store() -> (TempDir, DocumentStore) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let mut store = DocumentStore::new(StoragePaths::new(temp.path()));
        store.initialize().expect("Failed to initialize test storage");
        (temp, store)
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        id: String,
        value: i32,
    }

    #[test]
    fn initialize_creates_directories() {
        let (_temp, store) = test_store();

        assert!(store.paths().users_dir().exists());
        assert!(store.paths().user_emails_dir().exists());
        assert!(store.paths().projects_dir().exists());
        assert!(store.paths().sprints_dir().exists());
        assert!(store.paths().tasks_dir().exists());
        assert!(store.paths().audit_dir().exists());
    }

    #[test]
    fn write_and_read_json() {
        let (_temp, store) = test_store();
        let data = TestData {
            id: "test-1".to_string(),
            value: 42,
        };

        let path = store.paths().project("test-1");
        store.write_json(&path, &data).unwrap();

        let read: TestData = store.read_json(&path).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn write_json_overwrites_and_leaves_no_temp_files() {
        let (_temp, store) = test_store();
        let path = store.paths().task("t1");

        for value in 0..3 {
            store
                .write_json(&path, &TestData { id: "t1".into(), value })
                .unwrap();
        }

        let read: TestData = store.read_json(&path).unwrap();
        assert_eq!(read.value, 2);
        let entries = fs::read_dir(store.paths().tasks_dir()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn create_json_refuses_existing_file() {
        let (_temp, store) = test_store();
        let path = store.paths().user_email("key");
        let data = TestData {
            id: "u1".into(),
            value: 1,
        };

        store.create_json(&path, &data).unwrap();
        let second = store.create_json(&path, &data);
        assert!(matches!(second, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn read_missing_document_is_not_found() {
        let (_temp, store) = test_store();
        let result = store.read_json::<TestData>(store.paths().project("nope"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn health_check_works() {
        let (_temp, store) = test_store();
        store.health_check().expect("Health check should pass");
    }

    #[test]
    fn concurrent_health_checks_do_not_collide() {
        let (_temp, store) = test_store();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| (0..25).all(|_| store.health_check().is_ok()))
                })
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap());
            }
        });

        let leftovers = fs::read_dir(store.paths().root())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".health_check"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn list_json_returns_all_documents() {
        let (_temp, store) = test_store();

        for i in 1..=3 {
            store
                .write_json(store.paths().sprint(&format!("s-{i}")), &TestData {
                    id: format!("s-{i}"),
                    value: i,
                })
                .unwrap();
        }
        fs::write(store.paths().sprints_dir().join("broken.json"), b"{not json").unwrap();

        let mut docs: Vec<TestData> = store.list_json(store.paths().sprints_dir()).unwrap();
        docs.sort_by_key(|d| d.value);
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].id, "s-1");
        assert_eq!(docs[2].id, "s-3");
    }

    #[test]
    fn append_raw_accumulates() {
        let (_temp, store) = test_store();
        let path = store.paths().audit_events_file("2026-01-01");

        store.append_raw(&path, b"one\n").unwrap();
        store.append_raw(&path, b"two\n").unwrap();

        assert_eq!(store.read_raw(&path).unwrap(), b"one\ntwo\n");
    }

    #[test]
    fn delete_file_removes_it() {
        let (_temp, store) = test_store();
        let path = store.paths().project("to-delete");
        store
            .write_json(&path, &TestData {
                id: "del".to_string(),
                value: 0,
            })
            .unwrap();

        assert!(store.exists(&path));
        store.delete(&path).unwrap();
        assert!(!store.exists(&path));
    }

    #[test]
    fn uninitialized_storage_returns_error() {
        let store = DocumentStore::new(StoragePaths::new("/tmp/never-init"));

        let result = store.read_json::<TestData>("/tmp/any.json");
        assert!(matches!(result, Err(StorageError::NotInitialized)));
    }
}
