//! Durable session snapshots.
//!
//! A session keeps exactly one record: who it was, what it was called,
//! the host's retained history and the last host a client talked to. It
//! is rewritten whole on every change and read once at startup.
//!
//! Loading is best effort. A missing, unreadable or malformed record is
//! the same as no record: the session starts fresh.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use peerchat_protocol::{Envelope, PeerId};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::PersistError;

/// File name used by [`FileStore::in_dir`].
pub const SNAPSHOT_FILE: &str = "peer-chat-data.json";

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// The persisted shape of a session.
///
/// ```text
/// { "peerId": "9f2c…" | null, "name": "Alice",
///   "messages": [ …host only… ], "lastHostId": "h1" | null }
/// ```
///
/// Every field is optional on read, so older or hand-edited records still
/// load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSnapshot {
    pub peer_id: Option<PeerId>,
    pub name: String,
    pub messages: Vec<Envelope>,
    pub last_host_id: Option<PeerId>,
}

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// Somewhere to keep the single snapshot record.
///
/// Implementors move raw text. [`load`](Self::load) and
/// [`save`](Self::save) handle the JSON.
pub trait SnapshotStore: Send + 'static {
    /// The stored text, or `None` if nothing is stored.
    fn read(&self) -> Result<Option<String>, PersistError>;

    /// Replaces the stored text.
    fn write(&mut self, contents: &str) -> Result<(), PersistError>;

    /// Erases the record. Erasing nothing is not an error.
    fn clear(&mut self) -> Result<(), PersistError>;

    /// Reads and parses the snapshot. Never fails: problems are logged and
    /// reported as `None`.
    fn load(&self) -> Option<SessionSnapshot> {
        let text = match self.read() {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "could not read session snapshot");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "ignoring malformed session snapshot");
                None
            }
        }
    }

    /// Serializes and writes the snapshot.
    fn save(&mut self, snapshot: &SessionSnapshot) -> Result<(), PersistError> {
        let text = serde_json::to_string_pretty(snapshot)?;
        self.write(&text)
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Keeps the snapshot in a JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Stores the snapshot at exactly `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stores the snapshot as [`SNAPSHOT_FILE`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SNAPSHOT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn read(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Keeps the snapshot text in memory.
///
/// Clones share the same record, so a test can hand one clone to a session
/// and inspect or tamper with the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `contents`, well-formed or not.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// The raw stored text.
    pub fn contents(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, PersistError> {
        Ok(self.lock().clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), PersistError> {
        *self.lock() = Some(contents.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerchat_protocol::Payload;
    use tempfile::TempDir;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            peer_id: Some(PeerId::new("h1")),
            name: "Alice".into(),
            messages: vec![Envelope::new(
                Payload::chat("hi"),
                PeerId::new("c1"),
                "Bob",
                10,
            )],
            last_host_id: None,
        }
    }

    #[test]
    fn test_file_store_save_then_load_restores_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::in_dir(dir.path());

        store.save(&snapshot()).unwrap();

        assert_eq!(store.load(), Some(snapshot()));
        assert_eq!(store.path().file_name().unwrap(), SNAPSHOT_FILE);
    }

    #[test]
    fn test_file_store_creates_missing_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::in_dir(dir.path().join("nested").join("deeper"));

        store.save(&snapshot()).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn test_file_store_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(dir.path());

        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_file_store_load_malformed_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_file_store_clear_removes_file_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::in_dir(dir.path());
        store.save(&snapshot()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(!store.path().exists());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_snapshot_json_uses_camel_case_keys() {
        let value = serde_json::to_value(snapshot()).unwrap();

        assert_eq!(value["peerId"], "h1");
        assert_eq!(value["name"], "Alice");
        assert!(value["lastHostId"].is_null());
        assert_eq!(value["messages"][0]["event"], "chat");
    }

    #[test]
    fn test_snapshot_missing_fields_default() {
        let snap: SessionSnapshot = serde_json::from_str(r#"{"name":"Zed"}"#).unwrap();

        assert_eq!(snap.name, "Zed");
        assert_eq!(snap.peer_id, None);
        assert!(snap.messages.is_empty());
    }

    #[test]
    fn test_memory_store_clones_share_record() {
        let observer = MemoryStore::new();
        let mut store = observer.clone();

        store.save(&snapshot()).unwrap();
        assert!(observer.contents().is_some());

        store.clear().unwrap();
        assert_eq!(observer.contents(), None);
    }

    #[test]
    fn test_memory_store_malformed_contents_load_as_none() {
        let store = MemoryStore::with_contents("[1, 2");
        assert_eq!(store.load(), None);
    }
}
