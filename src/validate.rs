//! Import document validation.
//!
//! Turns raw bytes into an ordered list of well-formed candidates:
//!
//! ```json
//! { "contacts": [ { "name": "Ana", "familyName": "Silva",
//!                   "phoneNumber": "555-1", "tags": [{ "name": "Plumber" }] } ],
//!   "exportDate": "2026-01-01T00:00:00Z" }
//! ```
//!
//! Structural problems with the document as a whole are fatal
//! (`FormatError`). Problems with a single entry only drop that entry.

use serde_json::{Map, Value};

use crate::error::FormatError;
use crate::store::{ContactDraft, TagDraft};
use crate::util::tag_key;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Candidates accepted from one document, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBatch {
    pub candidates: Vec<ContactDraft>,
    /// Entries rejected by the per-entry check.
    pub dropped: usize,
    /// `exportDate` of the source document, when it carried one.
    pub export_date: Option<String>,
}

impl ValidatedBatch {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Parse and validate an import document.
pub fn validate(raw: &[u8]) -> Result<ValidatedBatch, FormatError> {
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    let document: Value =
        serde_json::from_slice(raw).map_err(|e| FormatError::NotParseable(e.to_string()))?;

    let entries = document
        .get("contacts")
        .and_then(Value::as_array)
        .ok_or(FormatError::MissingContactsList)?;

    let mut candidates = Vec::with_capacity(entries.len());
    let mut dropped = 0;
    for (index, entry) in entries.iter().enumerate() {
        match candidate_from_entry(entry) {
            Some(candidate) => candidates.push(candidate),
            None => {
                log::debug!("Dropping import entry {}: missing name or tags list", index);
                dropped += 1;
            }
        }
    }

    if candidates.is_empty() {
        return Err(FormatError::NoValidContacts);
    }

    let export_date = document
        .get("exportDate")
        .and_then(Value::as_str)
        .map(str::to_string);

    log::info!(
        "Validated import document: {} candidates, {} dropped",
        candidates.len(),
        dropped
    );

    Ok(ValidatedBatch {
        candidates,
        dropped,
        export_date,
    })
}

/// An entry is valid iff it has a non-empty string `name` and a `tags` list.
fn candidate_from_entry(entry: &Value) -> Option<ContactDraft> {
    let obj = entry.as_object()?;
    let name = obj.get("name")?.as_str().filter(|n| !n.is_empty())?;
    let raw_tags = obj.get("tags")?.as_array()?;

    Some(ContactDraft {
        name: name.to_string(),
        family_name: optional_string(obj, "familyName"),
        phone_number: optional_string(obj, "phoneNumber"),
        phone_number2: optional_string(obj, "phoneNumber2"),
        tags: coerce_tags(raw_tags),
    })
}

fn optional_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Coerce tag entries to `{name}`: objects with a string name and bare
/// strings are kept, anything else is discarded. Duplicates collapse to the
/// first spelling.
fn coerce_tags(raw: &[Value]) -> Vec<TagDraft> {
    let mut tags: Vec<TagDraft> = Vec::with_capacity(raw.len());
    for value in raw {
        let name = match value {
            Value::String(s) => s.as_str(),
            Value::Object(o) => match o.get("name").and_then(Value::as_str) {
                Some(s) => s,
                None => continue,
            },
            _ => continue,
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let key = tag_key(name);
        if tags.iter().any(|t| tag_key(&t.name) == key) {
            continue;
        }
        tags.push(TagDraft::new(name));
    }
    tags
}
