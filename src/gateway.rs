//! Boundaries to the host platform.
//!
//! The core never touches the UI or the filesystem directly. It goes through
//! three collaborators:
//!   PersistentStore - durable copy of the whole store, loaded once at startup
//!                     and saved after every batch of mutations
//!   UserPrompt      - asks the user what to do with colliding candidates
//!   FileGateway     - platform file picking (read) and export writing
//!
//! Local implementations backed by plain files are provided for desktop use
//! and tests; mobile shells plug in their own.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::GatewayError;
use crate::reconcile::Decision;
use crate::store::StoreSnapshot;

/// File name of the persisted store inside the data directory.
pub const STORE_FILE_NAME: &str = "tagify-contacts.json";

// =============================================================================
// Traits
// =============================================================================

pub trait PersistentStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<StoreSnapshot>, GatewayError>;

    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), GatewayError>;
}

#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Ask once how to handle `count` colliding candidates. A dismissed
    /// dialog answers `Decision::Cancelled`; there is no timeout.
    async fn confirm_collision(&self, count: usize) -> Decision;
}

pub trait FileGateway: Send + Sync {
    /// Raw bytes of the document the user picked.
    fn read(&self) -> Result<Vec<u8>, GatewayError>;

    /// Write an export and return where it landed.
    fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, GatewayError>;
}

// =============================================================================
// JSON file persistence
// =============================================================================

/// Persists the store as pretty-printed JSON at `{dir}/tagify-contacts.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STORE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy an unreadable store file aside so the next save cannot destroy it.
    fn quarantine(&self) {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        let backup = self
            .path
            .with_file_name(format!("{}.corrupt-{}", STORE_FILE_NAME, stamp));
        match std::fs::copy(&self.path, &backup) {
            Ok(_) => log::warn!("Copied unreadable store to {}", backup.display()),
            Err(e) => log::error!("Failed to back up {}: {}", self.path.display(), e),
        }
    }
}

impl PersistentStore for JsonFileStore {
    fn load(&self) -> Result<Option<StoreSnapshot>, GatewayError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| GatewayError::Read {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(&content) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                self.quarantine();
                Err(GatewayError::Corrupt {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), GatewayError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        crate::util::atomic_write_str(&self.path, &content).map_err(|source| {
            GatewayError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        log::debug!(
            "Saved {} contacts to {}",
            snapshot.contacts.len(),
            self.path.display()
        );
        Ok(())
    }
}

// =============================================================================
// Local files
// =============================================================================

/// Reads the file most recently selected with [`LocalFileGateway::select`]
/// and writes exports into a fixed directory.
#[derive(Debug)]
pub struct LocalFileGateway {
    export_dir: PathBuf,
    selected: Mutex<Option<PathBuf>>,
}

impl LocalFileGateway {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            selected: Mutex::new(None),
        }
    }

    /// Record the file the user picked for the next `read`.
    pub fn select(&self, path: impl Into<PathBuf>) {
        *self.selected.lock() = Some(path.into());
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

impl FileGateway for LocalFileGateway {
    fn read(&self) -> Result<Vec<u8>, GatewayError> {
        let path = self
            .selected
            .lock()
            .clone()
            .ok_or(GatewayError::NoFileSelected)?;
        std::fs::read(&path).map_err(|source| GatewayError::Read { path, source })
    }

    fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, GatewayError> {
        let path = self.export_dir.join(filename);
        crate::util::atomic_write(&path, bytes).map_err(|source| GatewayError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

// =============================================================================
// Prompts
// =============================================================================

/// Answers every collision prompt with the same decision. For headless
/// imports and scripted flows.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub Decision);

#[async_trait]
impl UserPrompt for FixedDecision {
    async fn confirm_collision(&self, count: usize) -> Decision {
        log::info!("{} colliding contacts, answering {:?}", count, self.0);
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ContactDraft, ContactStore};
    use tempfile::TempDir;

    #[test]
    fn test_json_store_missing_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let persistence = JsonFileStore::in_dir(dir.path());

        let mut contacts = ContactStore::new();
        contacts
            .add(ContactDraft::new("Ana").with_phone("555-1").with_tag("Plumber"))
            .unwrap();
        persistence.save(&contacts.snapshot()).unwrap();

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded, contacts.snapshot());

        let raw = std::fs::read_to_string(persistence.path()).unwrap();
        assert!(raw.contains("\"phoneNumber\": \"555-1\""));
        assert!(!raw.contains("familyName"));
    }

    #[test]
    fn test_json_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let persistence = JsonFileStore::in_dir(dir.path());
        std::fs::write(persistence.path(), "{ nope").unwrap();
        assert!(matches!(persistence.load(), Err(GatewayError::Corrupt { .. })));

        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_local_gateway_requires_selection() {
        let dir = TempDir::new().unwrap();
        let files = LocalFileGateway::new(dir.path());
        assert!(matches!(files.read(), Err(GatewayError::NoFileSelected)));
    }

    #[test]
    fn test_local_gateway_read_and_write() {
        let dir = TempDir::new().unwrap();
        let files = LocalFileGateway::new(dir.path().join("exports"));

        let written = files.write("contacts.json", b"{}").unwrap();
        assert_eq!(written, dir.path().join("exports").join("contacts.json"));

        files.select(&written);
        assert_eq!(files.read().unwrap(), b"{}");

        // Same name again replaces the file whole, leaving no temp files
        files.write("contacts.json", b"{\"contacts\":[]}").unwrap();
        assert_eq!(files.read().unwrap(), b"{\"contacts\":[]}");
        let entries = std::fs::read_dir(dir.path().join("exports")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_local_gateway_missing_file() {
        let dir = TempDir::new().unwrap();
        let files = LocalFileGateway::new(dir.path());
        files.select(dir.path().join("absent.json"));
        assert!(matches!(files.read(), Err(GatewayError::Read { .. })));
    }

    #[tokio::test]
    async fn test_fixed_decision() {
        let prompt = FixedDecision(Decision::Overwrite);
        assert_eq!(prompt.confirm_collision(3).await, Decision::Overwrite);
    }
}
