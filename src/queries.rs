//! Read-only lookups over the store: name search, tag search and tag
//! autocomplete.
//!
//! Matching is case-insensitive and ignores accents, so "electricien"
//! finds contacts tagged "Électricien".

use crate::store::{Contact, ContactStore, Tag};
use crate::util::fold_for_search;

/// Contacts whose "{name} {familyName}" contains `query`.
pub fn find_contacts_by_name<'a>(store: &'a ContactStore, query: &str) -> Vec<&'a Contact> {
    let needle = fold_for_search(query.trim());
    if needle.is_empty() {
        return Vec::new();
    }
    store
        .contacts()
        .iter()
        .filter(|c| {
            let full = format!("{} {}", c.name, c.family_name.as_deref().unwrap_or(""));
            fold_for_search(&full).contains(&needle)
        })
        .collect()
}

/// Contacts carrying any tag whose name contains `query`.
pub fn find_contacts_by_tag<'a>(store: &'a ContactStore, query: &str) -> Vec<&'a Contact> {
    let needle = fold_for_search(query.trim());
    if needle.is_empty() {
        return Vec::new();
    }
    store
        .contacts()
        .iter()
        .filter(|c| c.tags.iter().any(|t| fold_for_search(&t.name).contains(&needle)))
        .collect()
}

/// Vocabulary tags starting with `prefix`, in first-use order. A blank
/// prefix returns the whole vocabulary.
pub fn tag_suggestions<'a>(store: &'a ContactStore, prefix: &str) -> Vec<&'a Tag> {
    let prefix = fold_for_search(prefix.trim());
    store
        .all_tags()
        .iter()
        .filter(|t| fold_for_search(&t.name).starts_with(&prefix))
        .collect()
}
