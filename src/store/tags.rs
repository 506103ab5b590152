use uuid::Uuid;

use super::*;
use crate::util::tag_key;

impl ContactStore {
    // =========================================================================
    // Tag vocabulary
    // =========================================================================

    /// Look up a vocabulary tag by name, ignoring case.
    pub fn find_tag(&self, name: &str) -> Option<&Tag> {
        let key = tag_key(name);
        self.tags.iter().find(|t| tag_key(&t.name) == key)
    }

    /// Return the vocabulary tag for `name`, registering it on first use.
    fn intern_tag(&mut self, name: &str) -> Tag {
        if let Some(tag) = self.find_tag(name) {
            return tag.clone();
        }
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        log::debug!("Registered new tag '{}'", tag.name);
        self.tags.push(tag.clone());
        tag
    }

    /// Resolve drafts to vocabulary tags, skipping blank names and
    /// collapsing case-insensitive duplicates (first spelling wins).
    pub(super) fn resolve_tags(&mut self, drafts: &[TagDraft]) -> Vec<Tag> {
        let mut resolved: Vec<Tag> = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let name = draft.name.trim();
            if name.is_empty() {
                continue;
            }
            let tag = self.intern_tag(name);
            if resolved.iter().any(|t| t.id == tag.id) {
                continue;
            }
            resolved.push(tag);
        }
        resolved
    }

    // =========================================================================
    // Per-contact tag edits
    // =========================================================================

    /// Attach a tag to a contact. Reuses the vocabulary entry when the name
    /// is already known; does nothing if the contact already carries it.
    pub fn add_tag_to_contact(&mut self, contact_id: &str, name: &str) -> Result<Tag, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::BlankTagName);
        }
        let index = self
            .contacts
            .iter()
            .position(|c| c.id == contact_id)
            .ok_or_else(|| StoreError::NotFound(contact_id.to_string()))?;

        let tag = self.intern_tag(name);
        let contact = &mut self.contacts[index];
        if !contact.has_tag(&tag.name) {
            contact.tags.push(tag.clone());
        }
        Ok(tag)
    }

    /// Detach a tag (by id) from a contact. Returns whether anything was
    /// removed. The vocabulary is left untouched.
    pub fn remove_tag_from_contact(
        &mut self,
        contact_id: &str,
        tag_id: &str,
    ) -> Result<bool, StoreError> {
        let contact = self
            .contacts
            .iter_mut()
            .find(|c| c.id == contact_id)
            .ok_or_else(|| StoreError::NotFound(contact_id.to_string()))?;
        let before = contact.tags.len();
        contact.tags.retain(|t| t.id != tag_id);
        Ok(contact.tags.len() != before)
    }
}
