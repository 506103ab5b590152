use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by [`super::ContactStore`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Contact not found: {0}")]
    NotFound(String),

    #[error("Contact name must not be blank")]
    BlankName,

    #[error("Tag name must not be blank")]
    BlankTagName,
}

/// A tag from the global vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number2: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Contact {
    /// Case-insensitive tag membership.
    pub fn has_tag(&self, name: &str) -> bool {
        let key = crate::util::tag_key(name);
        self.tags.iter().any(|t| crate::util::tag_key(&t.name) == key)
    }

    /// "Name Family" when a family name is set, else just the name.
    pub fn display_name(&self) -> String {
        match self.family_name.as_deref() {
            Some(family) if !family.is_empty() => format!("{} {}", self.name, family),
            _ => self.name.clone(),
        }
    }
}

/// A tag reference that has not been resolved against the vocabulary yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDraft {
    pub name: String,
}

impl TagDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<&Tag> for TagDraft {
    fn from(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
        }
    }
}

/// A contact without a store identity: manual entry or an import candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number2: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagDraft>,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    pub fn with_phone2(mut self, phone: impl Into<String>) -> Self {
        self.phone_number2 = Some(phone.into());
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(TagDraft::new(name));
        self
    }
}

/// Partial update for [`super::ContactStore::update`].
///
/// Optional fields use a double `Option`: `None` leaves the field alone,
/// `Some(None)` clears it. `tags`, when present, replaces the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub family_name: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
    pub phone_number2: Option<Option<String>>,
    pub tags: Option<Vec<TagDraft>>,
}

impl ContactPatch {
    pub fn tags(tags: Vec<TagDraft>) -> Self {
        Self {
            tags: Some(tags),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.family_name.is_none()
            && self.phone_number.is_none()
            && self.phone_number2.is_none()
            && self.tags.is_none()
    }
}

/// Persisted shape of the store (`tagify-contacts.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}
