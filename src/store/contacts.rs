use uuid::Uuid;

use super::*;

impl ContactStore {
    // =========================================================================
    // Contacts
    // =========================================================================

    /// Insert a new contact and return its freshly assigned id.
    ///
    /// Tags are resolved against the vocabulary (unknown names are
    /// registered) and collapsed case-insensitively.
    pub fn add(&mut self, draft: ContactDraft) -> Result<String, StoreError> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::BlankName);
        }

        let tags = self.resolve_tags(&draft.tags);
        let id = Uuid::new_v4().to_string();
        self.contacts.push(Contact {
            id: id.clone(),
            name: draft.name,
            family_name: non_empty(draft.family_name),
            phone_number: non_empty(draft.phone_number),
            phone_number2: non_empty(draft.phone_number2),
            tags,
        });
        Ok(id)
    }

    /// Apply a shallow partial update. A present `tags` list replaces the
    /// contact's tags outright; callers that want a union compute it first.
    pub fn update(&mut self, id: &str, patch: ContactPatch) -> Result<(), StoreError> {
        let index = self
            .contacts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(ref name) = patch.name {
            if name.trim().is_empty() {
                return Err(StoreError::BlankName);
            }
        }

        // Resolve before borrowing the contact mutably
        let tags = patch.tags.as_deref().map(|drafts| self.resolve_tags(drafts));

        let contact = &mut self.contacts[index];
        if let Some(name) = patch.name {
            contact.name = name;
        }
        if let Some(family_name) = patch.family_name {
            contact.family_name = non_empty(family_name);
        }
        if let Some(phone) = patch.phone_number {
            contact.phone_number = non_empty(phone);
        }
        if let Some(phone) = patch.phone_number2 {
            contact.phone_number2 = non_empty(phone);
        }
        if let Some(tags) = tags {
            contact.tags = tags;
        }
        Ok(())
    }

    /// Delete a contact. Its tags stay in the vocabulary.
    pub fn remove(&mut self, id: &str) -> Result<Contact, StoreError> {
        let index = self
            .contacts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.contacts.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// First contact whose name matches case-insensitively and whose family
    /// name either matches case-insensitively or is absent on one side.
    pub fn find_by_identity(&self, name: &str, family_name: Option<&str>) -> Option<&Contact> {
        if name.is_empty() {
            return None;
        }
        let name = name.to_lowercase();
        let family = family_name
            .filter(|f| !f.is_empty())
            .map(|f| f.to_lowercase());

        self.contacts.iter().find(|c| {
            if c.name.to_lowercase() != name {
                return false;
            }
            match (family.as_deref(), c.family_name.as_deref()) {
                (Some(wanted), Some(stored)) if !stored.is_empty() => {
                    stored.to_lowercase() == wanted
                }
                _ => true,
            }
        })
    }

    /// First contact carrying `number` as either phone field (exact match).
    pub fn find_by_phone(&self, number: &str) -> Option<&Contact> {
        if number.is_empty() {
            return None;
        }
        self.contacts.iter().find(|c| {
            c.phone_number.as_deref() == Some(number) || c.phone_number2.as_deref() == Some(number)
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(drafts: Vec<ContactDraft>) -> ContactStore {
        let mut store = ContactStore::new();
        for draft in drafts {
            store.add(draft).unwrap();
        }
        store
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut store = ContactStore::new();
        let a = store.add(ContactDraft::new("Ana")).unwrap();
        let b = store.add(ContactDraft::new("Ana")).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&a).unwrap().name, "Ana");
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut store = ContactStore::new();
        assert_eq!(store.add(ContactDraft::new("   ")), Err(StoreError::BlankName));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_collapses_duplicate_tags() {
        let mut store = ContactStore::new();
        let id = store
            .add(ContactDraft::new("Ana").with_tag("Plumber").with_tag("plumber"))
            .unwrap();
        let contact = store.get(&id).unwrap();
        assert_eq!(contact.tags.len(), 1);
        assert_eq!(contact.tags[0].name, "Plumber");
        assert_eq!(store.all_tags().len(), 1);
    }

    #[test]
    fn test_add_reuses_vocabulary_tag() {
        let mut store = ContactStore::new();
        let a = store.add(ContactDraft::new("Ana").with_tag("Plumber")).unwrap();
        let b = store.add(ContactDraft::new("Bob").with_tag("PLUMBER")).unwrap();
        let tag_a = &store.get(&a).unwrap().tags[0];
        let tag_b = &store.get(&b).unwrap().tags[0];
        assert_eq!(tag_a, tag_b);
        assert_eq!(tag_b.name, "Plumber");
        assert_eq!(store.all_tags().len(), 1);
    }

    #[test]
    fn test_add_drops_empty_optional_fields() {
        let mut store = ContactStore::new();
        let id = store
            .add(ContactDraft::new("Ana").with_family_name("").with_phone(""))
            .unwrap();
        let contact = store.get(&id).unwrap();
        assert!(contact.family_name.is_none());
        assert!(contact.phone_number.is_none());
    }

    #[test]
    fn test_update_is_shallow() {
        let mut store = ContactStore::new();
        let id = store
            .add(
                ContactDraft::new("Ana")
                    .with_family_name("Silva")
                    .with_phone("555-1")
                    .with_tag("Plumber"),
            )
            .unwrap();

        store
            .update(
                &id,
                ContactPatch {
                    phone_number2: Some(Some("555-2".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();

        let contact = store.get(&id).unwrap();
        assert_eq!(contact.family_name.as_deref(), Some("Silva"));
        assert_eq!(contact.phone_number.as_deref(), Some("555-1"));
        assert_eq!(contact.phone_number2.as_deref(), Some("555-2"));
        assert_eq!(contact.tags.len(), 1);
    }

    #[test]
    fn test_update_can_clear_field() {
        let mut store = ContactStore::new();
        let id = store.add(ContactDraft::new("Ana").with_phone("555-1")).unwrap();
        store
            .update(
                &id,
                ContactPatch {
                    phone_number: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(store.get(&id).unwrap().phone_number.is_none());
    }

    #[test]
    fn test_update_tags_replace_and_register() {
        let mut store = ContactStore::new();
        let id = store
            .add(ContactDraft::new("Ana").with_tag("Plumber").with_tag("Tutor"))
            .unwrap();

        store
            .update(&id, ContactPatch::tags(vec![TagDraft::new("Electrician")]))
            .unwrap();

        let contact = store.get(&id).unwrap();
        let names: Vec<&str> = contact.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Electrician"]);
        // Vocabulary keeps everything ever used
        assert_eq!(store.all_tags().len(), 3);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut store = ContactStore::new();
        let err = store.update("missing", ContactPatch::default()).unwrap_err();
        assert_eq!(err, StoreError::NotFound("missing".to_string()));
    }

    #[test]
    fn test_update_rejects_blank_name_without_side_effects() {
        let mut store = ContactStore::new();
        let id = store.add(ContactDraft::new("Ana")).unwrap();
        let patch = ContactPatch {
            name: Some(" ".to_string()),
            tags: Some(vec![TagDraft::new("New")]),
            ..Default::default()
        };
        assert_eq!(store.update(&id, patch), Err(StoreError::BlankName));
        assert_eq!(store.get(&id).unwrap().name, "Ana");
        assert!(store.all_tags().is_empty());
    }

    #[test]
    fn test_remove_keeps_vocabulary() {
        let mut store = ContactStore::new();
        let id = store.add(ContactDraft::new("Ana").with_tag("Plumber")).unwrap();
        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.name, "Ana");
        assert!(store.is_empty());
        assert_eq!(store.all_tags().len(), 1);
        assert!(store.remove(&id).is_err());
    }

    #[test]
    fn test_find_by_identity_case_insensitive() {
        let store = store_with(vec![ContactDraft::new("Ana").with_family_name("Silva")]);
        assert!(store.find_by_identity("ana", Some("SILVA")).is_some());
        assert!(store.find_by_identity("ana", None).is_some());
        assert!(store.find_by_identity("ana", Some("Costa")).is_none());
        assert!(store.find_by_identity("", None).is_none());
    }

    #[test]
    fn test_find_by_identity_stored_family_absent() {
        let store = store_with(vec![ContactDraft::new("Ana")]);
        assert!(store.find_by_identity("Ana", Some("Silva")).is_some());
    }

    #[test]
    fn test_find_by_phone_checks_both_fields() {
        let store = store_with(vec![
            ContactDraft::new("Ana").with_phone("555-1"),
            ContactDraft::new("Bob").with_phone2("555-2"),
        ]);
        assert_eq!(store.find_by_phone("555-1").unwrap().name, "Ana");
        assert_eq!(store.find_by_phone("555-2").unwrap().name, "Bob");
        assert!(store.find_by_phone("555").is_none());
        assert!(store.find_by_phone("").is_none());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let store = store_with(vec![
            ContactDraft::new("Ana").with_tag("Plumber"),
            ContactDraft::new("Bob").with_phone("555-1"),
        ]);
        let restored = ContactStore::from_snapshot(store.snapshot());
        assert_eq!(restored.contacts(), store.contacts());
        assert_eq!(restored.all_tags(), store.all_tags());
    }

    #[test]
    fn test_from_snapshot_repairs_vocabulary() {
        let snapshot = StoreSnapshot {
            contacts: vec![Contact {
                id: "c1".to_string(),
                name: "Ana".to_string(),
                family_name: None,
                phone_number: None,
                phone_number2: None,
                tags: vec![
                    Tag { id: "t1".to_string(), name: "Plumber".to_string() },
                    Tag { id: "t2".to_string(), name: "plumber".to_string() },
                ],
            }],
            tags: vec![],
        };
        let store = ContactStore::from_snapshot(snapshot);
        assert_eq!(store.get("c1").unwrap().tags.len(), 1);
        assert_eq!(store.all_tags().len(), 1);
        assert_eq!(store.all_tags()[0].id, "t1");
    }
}
