//! Import collision detection.
//!
//! A candidate collides with a stored contact when, checked in this order:
//! 1. names match case-insensitively and family names match or are absent
//!    on either side;
//! 2. its `phoneNumber` equals either phone of a stored contact;
//! 3. its `phoneNumber2` equals either phone of a stored contact.
//!
//! Only the first match is reported. Candidates are checked against the
//! store, never against each other.

use serde::Serialize;

use crate::store::{Contact, ContactDraft, ContactStore};

/// Which identity key produced a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKey {
    Name,
    PhoneNumber,
    PhoneNumber2,
}

impl MatchKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKey::Name => "name",
            MatchKey::PhoneNumber => "phoneNumber",
            MatchKey::PhoneNumber2 => "phoneNumber2",
        }
    }
}

/// A stored contact matched by a candidate.
#[derive(Debug, Clone, Copy)]
pub struct CollisionMatch<'a> {
    pub existing: &'a Contact,
    pub key: MatchKey,
}

/// Find the stored contact `candidate` collides with, if any.
pub fn find_collision<'a>(
    candidate: &ContactDraft,
    store: &'a ContactStore,
) -> Option<CollisionMatch<'a>> {
    if let Some(existing) =
        store.find_by_identity(&candidate.name, candidate.family_name.as_deref())
    {
        return Some(CollisionMatch {
            existing,
            key: MatchKey::Name,
        });
    }

    if let Some(existing) = candidate
        .phone_number
        .as_deref()
        .and_then(|phone| store.find_by_phone(phone))
    {
        return Some(CollisionMatch {
            existing,
            key: MatchKey::PhoneNumber,
        });
    }

    candidate
        .phone_number2
        .as_deref()
        .and_then(|phone| store.find_by_phone(phone))
        .map(|existing| CollisionMatch {
            existing,
            key: MatchKey::PhoneNumber2,
        })
}
