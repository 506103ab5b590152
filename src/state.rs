use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use parking_lot::Mutex;

use crate::error::{GatewayError, ImportError, MutationError};
use crate::gateway::{FileGateway, JsonFileStore, LocalFileGateway, PersistentStore, UserPrompt};
use crate::reconcile::ImportResult;
use crate::store::{Contact, ContactDraft, ContactPatch, ContactStore, StoreSnapshot, Tag};
use crate::types::Config;

/// Application state shared by the UI action handlers.
///
/// Owns the contact store and its persistence handle. Every mutation is
/// saved once it completes; an import is saved once after the whole batch.
/// A mutation whose save fails is undone in memory.
pub struct AppState {
    config: Mutex<Config>,
    /// Where `update_config` writes. `None` keeps config changes in memory.
    config_path: Option<PathBuf>,
    /// Held across the collision prompt, so edits queue behind an import.
    store: tokio::sync::Mutex<ContactStore>,
    persistence: Box<dyn PersistentStore>,
    import_in_flight: AtomicBool,
}

impl AppState {
    /// Build state from an explicit config and persistence backend.
    ///
    /// Unreadable saved data is logged and the app starts with an empty store.
    pub fn open(config: Config, persistence: Box<dyn PersistentStore>) -> Self {
        let store = match persistence.load() {
            Ok(Some(snapshot)) => {
                let store = ContactStore::from_snapshot(snapshot);
                log::info!(
                    "Loaded {} contacts, {} tags",
                    store.len(),
                    store.all_tags().len()
                );
                store
            }
            Ok(None) => ContactStore::new(),
            Err(e) => {
                log::error!("Failed to load saved contacts: {e}. Starting empty.");
                ContactStore::new()
            }
        };

        Self {
            config: Mutex::new(config),
            config_path: None,
            store: tokio::sync::Mutex::new(store),
            persistence,
            import_in_flight: AtomicBool::new(false),
        }
    }

    /// Open with `~/.tagify/config.json` and the JSON store it points at.
    pub fn open_default() -> Result<Self, GatewayError> {
        let config = load_config()?;
        let persistence = JsonFileStore::in_dir(&config.resolve_data_dir()?);
        let mut state = Self::open(config, Box::new(persistence));
        state.config_path = Some(config_path()?);
        Ok(state)
    }

    // =========================================================================
    // Config
    // =========================================================================

    pub fn config(&self) -> Config {
        self.config.lock().clone()
    }

    /// Apply `mutator` to the config and write it back atomically.
    pub fn update_config(&self, mutator: impl FnOnce(&mut Config)) -> Result<Config, GatewayError> {
        let mut guard = self.config.lock();
        let mut config = guard.clone();
        mutator(&mut config);

        if let Some(ref path) = self.config_path {
            let content = serde_json::to_string_pretty(&config)?;
            crate::util::atomic_write_str(path, &content).map_err(|source| {
                GatewayError::Write {
                    path: path.clone(),
                    source,
                }
            })?;
        }

        *guard = config.clone();
        Ok(config)
    }

    /// File gateway writing exports to the configured export directory.
    pub fn local_file_gateway(&self) -> Result<LocalFileGateway, GatewayError> {
        Ok(LocalFileGateway::new(self.config.lock().resolve_export_dir()?))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.store.lock().await.snapshot()
    }

    pub async fn contact(&self, id: &str) -> Option<Contact> {
        self.store.lock().await.get(id).cloned()
    }

    pub async fn all_tags(&self) -> Vec<Tag> {
        self.store.lock().await.all_tags().to_vec()
    }

    pub async fn tag_suggestions(&self, prefix: &str) -> Vec<Tag> {
        let store = self.store.lock().await;
        crate::queries::tag_suggestions(&store, prefix)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn find_contacts_by_name(&self, query: &str) -> Vec<Contact> {
        let store = self.store.lock().await;
        crate::queries::find_contacts_by_name(&store, query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn find_contacts_by_tag(&self, query: &str) -> Vec<Contact> {
        let store = self.store.lock().await;
        crate::queries::find_contacts_by_tag(&store, query)
            .into_iter()
            .cloned()
            .collect()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn add_contact(&self, draft: ContactDraft) -> Result<String, MutationError> {
        self.mutate(|store| store.add(draft)).await
    }

    pub async fn update_contact(&self, id: &str, patch: ContactPatch) -> Result<(), MutationError> {
        self.mutate(|store| store.update(id, patch)).await
    }

    pub async fn delete_contact(&self, id: &str) -> Result<Contact, MutationError> {
        self.mutate(|store| store.remove(id)).await
    }

    pub async fn add_tag_to_contact(&self, contact_id: &str, name: &str) -> Result<Tag, MutationError> {
        self.mutate(|store| store.add_tag_to_contact(contact_id, name))
            .await
    }

    pub async fn remove_tag_from_contact(
        &self,
        contact_id: &str,
        tag_id: &str,
    ) -> Result<bool, MutationError> {
        self.mutate(|store| store.remove_tag_from_contact(contact_id, tag_id))
            .await
    }

    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut ContactStore) -> Result<T, crate::error::StoreError>,
    ) -> Result<T, MutationError> {
        let mut store = self.store.lock().await;
        let before = store.clone();
        let value = f(&mut *store)?;
        if let Err(e) = self.persistence.save(&store.snapshot()) {
            log::error!("Edit not saved, rolling back: {}", e);
            *store = before;
            return Err(e.into());
        }
        Ok(value)
    }

    // =========================================================================
    // Import / export
    // =========================================================================

    /// Read a document through `files`, reconcile it into the store (asking
    /// `prompt` once if anything collides), then save. If the save fails the
    /// store is put back as it was before the import.
    ///
    /// Only one import runs at a time; a second call while the first is
    /// still pending fails with `ImportError::InProgress`.
    pub async fn import(
        &self,
        files: &dyn FileGateway,
        prompt: &dyn UserPrompt,
    ) -> Result<ImportResult, ImportError> {
        let _guard = ImportGuard::acquire(&self.import_in_flight)?;

        let raw = files.read()?;

        let mut store = self.store.lock().await;
        let before = store.clone();
        let result = crate::reconcile::import_document(&mut store, &raw, prompt).await?;

        if result.added_count + result.merged_count > 0 {
            if let Err(e) = self.persistence.save(&store.snapshot()) {
                log::error!("Import not saved, rolling back: {}", e);
                *store = before;
                return Err(e.into());
            }
        }

        log::info!("{}", result.status_message());
        Ok(result)
    }

    /// Serialize the store and hand it to `files`. Returns where it landed.
    pub async fn export(&self, files: &dyn FileGateway) -> Result<PathBuf, GatewayError> {
        let now = Utc::now();
        let document = {
            let store = self.store.lock().await;
            crate::export::serialize_at(&store, now)
        };
        let json = crate::export::to_json(&document)?;
        let prefix = self.config.lock().export_file_prefix.clone();
        let filename = crate::export::export_file_name(&prefix, now);

        let location = files.write(&filename, json.as_bytes())?;
        log::info!(
            "Exported {} contacts to {}",
            document.contacts.len(),
            location.display()
        );
        Ok(location)
    }
}

/// Clears the in-flight flag when the import finishes, however it finishes.
struct ImportGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ImportGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ImportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ImportError::InProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Get the state directory (~/.tagify)
pub fn state_dir() -> Result<PathBuf, GatewayError> {
    let home = dirs::home_dir().ok_or(GatewayError::HomeDirNotFound)?;
    Ok(home.join(".tagify"))
}

/// Get the canonical config file path (~/.tagify/config.json)
pub fn config_path() -> Result<PathBuf, GatewayError> {
    Ok(state_dir()?.join("config.json"))
}

/// Load configuration from ~/.tagify/config.json, falling back to defaults
/// when the file does not exist.
pub fn load_config() -> Result<Config, GatewayError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path).map_err(|source| GatewayError::Read {
        path: path.clone(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|e| GatewayError::Corrupt {
        path,
        reason: e.to_string(),
    })
}
