//! Import reconciliation.
//!
//! One import runs through these phases:
//!
//! ```text
//! Validating -> Partitioning -> DirectApply                  -> Done
//!                            -> AwaitingDecision -> Applying -> Done
//! (any fatal FormatError while validating)                   -> Failed
//! ```
//!
//! Candidates are split into those that are new to the store and those that
//! collide with a stored contact (see `identity`). When there are
//! collisions the user is asked exactly once, for the whole batch, whether to
//! skip them or merge their tags into the matching contacts. Merging never
//! touches the existing contact's id, name, family name, or phone numbers.
//!
//! Every record is applied on its own: a store rejection is recorded as a
//! `RecordApplyError` and the rest of the batch carries on.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::error::{FormatError, StoreError};
use crate::gateway::UserPrompt;
use crate::identity::{find_collision, MatchKey};
use crate::store::{ContactDraft, ContactPatch, ContactStore, TagDraft};
use crate::util::tag_key;

/// The user's answer for a batch with collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    Skip,
    Overwrite,
    /// Dialog dismissed. Behaves exactly like `Skip`.
    Cancelled,
}

impl Decision {
    /// Whether colliding candidates get their tags merged.
    pub fn merges(self) -> bool {
        matches!(self, Decision::Overwrite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportPhase {
    Validating,
    Partitioning,
    DirectApply,
    AwaitingDecision,
    Applying,
    Done,
    Failed,
}

/// A candidate that matched nothing in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Position in the validated batch.
    pub index: usize,
    pub contact: ContactDraft,
}

/// A candidate paired with the stored contact it collides with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub index: usize,
    pub candidate: ContactDraft,
    pub existing_id: String,
    pub key: MatchKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub unique: Vec<Candidate>,
    pub collisions: Vec<Collision>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.unique.len() + self.collisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_collisions(&self) -> bool {
        !self.collisions.is_empty()
    }
}

/// A single record that could not be applied. Soft: the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("Failed to apply contact #{index} ({name}): {source}")]
pub struct RecordApplyError {
    pub index: usize,
    pub name: String,
    #[serde(rename = "reason", serialize_with = "serialize_display")]
    pub source: StoreError,
}

fn serialize_display<S: Serializer>(err: &StoreError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Outcome of one import. `added_count`, `merged_count`, `skipped_count`,
/// and `failures.len()` are disjoint and sum to the number of candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub added_count: usize,
    pub merged_count: usize,
    pub skipped_count: usize,
    pub failures: Vec<RecordApplyError>,
    /// `None` when the batch had no collisions and no question was asked.
    pub decision: Option<Decision>,
    pub phase: ImportPhase,
    pub added_ids: Vec<String>,
}

impl ImportResult {
    fn new(decision: Option<Decision>) -> Self {
        Self {
            added_count: 0,
            merged_count: 0,
            skipped_count: 0,
            failures: Vec::new(),
            decision,
            phase: ImportPhase::Applying,
            added_ids: Vec::new(),
        }
    }

    pub fn soft_failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of candidates accounted for.
    pub fn total(&self) -> usize {
        self.added_count + self.merged_count + self.skipped_count + self.failures.len()
    }

    /// One-line status for the user, e.g. "2 contacts imported, 1 duplicate skipped".
    pub fn status_message(&self) -> String {
        let mut msg = format!("{} imported", plural(self.added_count, "contact"));
        if self.merged_count > 0 {
            msg.push_str(&format!(", {} merged", plural(self.merged_count, "duplicate")));
        }
        if self.skipped_count > 0 {
            msg.push_str(&format!(", {} skipped", plural(self.skipped_count, "duplicate")));
        }
        if !self.failures.is_empty() {
            msg.push_str(&format!(", {} failed", self.failures.len()));
        }
        msg
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

// =============================================================================
// Partition
// =============================================================================

/// Split candidates into new ones and collisions, each checked against the
/// store as it is now.
pub fn partition(store: &ContactStore, candidates: Vec<ContactDraft>) -> Partition {
    log::debug!("Import phase: {:?}", ImportPhase::Partitioning);
    let mut out = Partition::default();
    for (index, candidate) in candidates.into_iter().enumerate() {
        match find_collision(&candidate, store) {
            Some(hit) => {
                log::debug!(
                    "Candidate #{} '{}' collides with {} by {}",
                    index,
                    candidate.name,
                    hit.existing.id,
                    hit.key.as_str()
                );
                let existing_id = hit.existing.id.clone();
                out.collisions.push(Collision {
                    index,
                    candidate,
                    existing_id,
                    key: hit.key,
                });
            }
            None => out.unique.push(Candidate {
                index,
                contact: candidate,
            }),
        }
    }
    out
}

// =============================================================================
// Merge
// =============================================================================

/// Union `incoming` tags into an existing contact.
///
/// Only names the contact does not already carry (case-insensitively) are
/// appended, after the existing tags and in incoming order. Returns how many
/// tags were added; with nothing new the contact is not written at all.
pub fn merge_tags(
    store: &mut ContactStore,
    existing_id: &str,
    incoming: &[TagDraft],
) -> Result<usize, StoreError> {
    let existing = store
        .get(existing_id)
        .ok_or_else(|| StoreError::NotFound(existing_id.to_string()))?;

    let mut new_tags: Vec<TagDraft> = Vec::new();
    for tag in incoming {
        let key = tag_key(&tag.name);
        if key.is_empty()
            || existing.has_tag(&tag.name)
            || new_tags.iter().any(|t| tag_key(&t.name) == key)
        {
            continue;
        }
        new_tags.push(tag.clone());
    }

    if new_tags.is_empty() {
        return Ok(0);
    }

    let added = new_tags.len();
    let mut union: Vec<TagDraft> = existing.tags.iter().map(TagDraft::from).collect();
    union.extend(new_tags);
    store.update(existing_id, ContactPatch::tags(union))?;
    Ok(added)
}

// =============================================================================
// Apply
// =============================================================================

/// Apply a partition given the user's decision.
///
/// A batch with collisions but no decision is treated as cancelled (skip).
/// A decision supplied for a batch without collisions is ignored.
pub fn apply(
    store: &mut ContactStore,
    partition: Partition,
    decision: Option<Decision>,
) -> ImportResult {
    let decision = if partition.has_collisions() {
        Some(decision.unwrap_or(Decision::Cancelled))
    } else {
        None
    };
    log::debug!(
        "Import phase: {:?}",
        if decision.is_some() {
            ImportPhase::Applying
        } else {
            ImportPhase::DirectApply
        }
    );

    let mut result = ImportResult::new(decision);

    match decision {
        Some(d) if d.merges() => {
            for collision in partition.collisions {
                match merge_tags(store, &collision.existing_id, &collision.candidate.tags) {
                    Ok(added) => {
                        if added == 0 {
                            log::debug!(
                                "Candidate #{} brings no new tags for {}",
                                collision.index,
                                collision.existing_id
                            );
                        }
                        result.merged_count += 1;
                    }
                    Err(source) => {
                        let failure = RecordApplyError {
                            index: collision.index,
                            name: collision.candidate.name,
                            source,
                        };
                        log::warn!("{}", failure);
                        result.failures.push(failure);
                    }
                }
            }
        }
        Some(_) => {
            result.skipped_count = partition.collisions.len();
        }
        None => {}
    }

    for Candidate { index, contact } in partition.unique {
        let name = contact.name.clone();
        match store.add(contact) {
            Ok(id) => {
                result.added_count += 1;
                result.added_ids.push(id);
            }
            Err(source) => {
                let failure = RecordApplyError {
                    index,
                    name,
                    source,
                };
                log::warn!("{}", failure);
                result.failures.push(failure);
            }
        }
    }

    result.phase = ImportPhase::Done;
    log::info!(
        "Import done: {} added, {} merged, {} skipped, {} failed",
        result.added_count,
        result.merged_count,
        result.skipped_count,
        result.failures.len()
    );
    result
}

// =============================================================================
// Entry points
// =============================================================================

/// Partition, ask for one decision if anything collides, then apply.
pub async fn reconcile(
    store: &mut ContactStore,
    candidates: Vec<ContactDraft>,
    prompt: &dyn UserPrompt,
) -> ImportResult {
    let partition = partition(store, candidates);
    let decision = if partition.has_collisions() {
        log::debug!(
            "Import phase: {:?} ({} collisions)",
            ImportPhase::AwaitingDecision,
            partition.collisions.len()
        );
        Some(prompt.confirm_collision(partition.collisions.len()).await)
    } else {
        None
    };
    apply(store, partition, decision)
}

/// Validate a raw document and reconcile it into the store. A format error
/// aborts before anything is applied.
pub async fn import_document(
    store: &mut ContactStore,
    raw: &[u8],
    prompt: &dyn UserPrompt,
) -> Result<ImportResult, FormatError> {
    log::debug!("Import phase: {:?}", ImportPhase::Validating);
    let batch = match crate::validate::validate(raw) {
        Ok(batch) => batch,
        Err(e) => {
            log::warn!("Import phase: {:?}: {}", ImportPhase::Failed, e);
            return Err(e);
        }
    };
    Ok(reconcile(store, batch.candidates, prompt).await)
}
