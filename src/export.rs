//! Canonical export document.
//!
//! `{ "contacts": [...], "exportDate": "<RFC 3339>" }`, contacts in store
//! order with ids and tag ids included. Feeding an export back through the
//! importer reproduces the same contacts.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Contact, ContactStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDocument {
    pub contacts: Vec<Contact>,
    pub export_date: String,
}

/// Snapshot the store as an export document stamped with the current time.
pub fn serialize(store: &ContactStore) -> ContactDocument {
    serialize_at(store, Utc::now())
}

pub fn serialize_at(store: &ContactStore, at: DateTime<Utc>) -> ContactDocument {
    ContactDocument {
        contacts: store.contacts().to_vec(),
        export_date: at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Pretty-printed JSON, two-space indent.
pub fn to_json(document: &ContactDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// `{prefix}-YYYY-MM-DD.json`
pub fn export_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.json", prefix, at.format("%Y-%m-%d"))
}
