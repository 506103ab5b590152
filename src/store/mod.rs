//! In-memory contact store and global tag vocabulary.
//!
//! `ContactStore` is the single owner of contacts and tags. Callers hold it
//! behind whatever handle suits them (`AppState` keeps it behind a tokio
//! mutex) and persist it through a `PersistentStore` after each batch of
//! mutations. The store itself never touches disk.
//!
//! Invariants:
//! - a contact id is assigned by `add` and never changes or gets reused;
//! - within a contact, tag names are unique case-insensitively;
//! - every tag attached to any contact is in the vocabulary, and the
//!   vocabulary never shrinks.

mod contacts;
mod tags;
pub mod types;

pub use types::*;

#[derive(Debug, Clone, Default)]
pub struct ContactStore {
    contacts: Vec<Contact>,
    tags: Vec<Tag>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted state.
    ///
    /// Contact tags missing from the saved vocabulary are registered, and
    /// duplicate tags inside a contact are collapsed, so a hand-edited file
    /// cannot break the store invariants.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut store = Self {
            contacts: Vec::with_capacity(snapshot.contacts.len()),
            tags: Vec::with_capacity(snapshot.tags.len()),
        };

        for tag in snapshot.tags {
            if tag.name.trim().is_empty() || store.find_tag(&tag.name).is_some() {
                continue;
            }
            store.tags.push(tag);
        }

        for mut contact in snapshot.contacts {
            let mut kept: Vec<Tag> = Vec::with_capacity(contact.tags.len());
            for tag in contact.tags {
                if tag.name.trim().is_empty() {
                    continue;
                }
                let key = crate::util::tag_key(&tag.name);
                if kept.iter().any(|t| crate::util::tag_key(&t.name) == key) {
                    continue;
                }
                match store.find_tag(&tag.name) {
                    Some(known) => kept.push(known.clone()),
                    None => {
                        store.tags.push(tag.clone());
                        kept.push(tag);
                    }
                }
            }
            contact.tags = kept;
            store.contacts.push(contact);
        }

        store
    }

    /// Clone the current state into its persisted shape.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            contacts: self.contacts.clone(),
            tags: self.tags.clone(),
        }
    }

    /// All contacts in insertion order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// The tag vocabulary in first-use order.
    pub fn all_tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
