//! Last-writer-wins reconciliation of a local vault snapshot with a cloud backup.
//!
//! Recency is decided per entity: `updated_at` for live copies, `deleted_at`
//! for tombstones. Every comparison is strict, so ties keep the local state.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{DeletedItem, DeletedItemKind, Entity, Item, Tag, VaultBackup};


/// Mutations for one entity kind, each list sorted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityChanges<E> {
    pub to_add: Vec<E>,
    pub to_update: Vec<E>,
    pub to_delete: Vec<E>,
}

impl<E> Default for EntityChanges<E> {
    fn default() -> Self {
        Self {
            to_add: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }
}

impl<E: Entity> EntityChanges<E> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_update.len() + self.to_delete.len()
    }

    /// Entities to bulk-upsert: additions followed by updates.
    pub fn upserts(&self) -> impl Iterator<Item = &E> {
        self.to_add.iter().chain(&self.to_update)
    }

    /// Applies these changes to one collection: upserts by id, trashed copies replace live ones.
    #[must_use]
    pub fn apply_to(&self, current: &[E]) -> Vec<E> {
        let mut by_id: BTreeMap<String, E> = current
            .iter()
            .map(|entity| (entity.id().to_string(), entity.clone()))
            .collect();
        for entity in self.upserts().chain(&self.to_delete) {
            by_id.insert(entity.id().to_string(), entity.clone());
        }
        by_id.into_values().collect()
    }

    fn sort(&mut self) {
        for list in [&mut self.to_add, &mut self.to_update, &mut self.to_delete] {
            list.sort_by(|a, b| a.id().cmp(b.id()));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudMergeResult {
    pub items: EntityChanges<Item>,
    pub tags: EntityChanges<Tag>,
    /// Complete tombstone ledger to persist, newest deletion first.
    pub deleted_items: Vec<DeletedItem>,
}

impl CloudMergeResult {
    /// True when no live entity needs to change. The tombstone ledger is not considered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.tags.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> MergeSummary {
        MergeSummary {
            items_added: self.items.to_add.len(),
            items_updated: self.items.to_update.len(),
            items_deleted: self.items.to_delete.len(),
            tags_added: self.tags.to_add.len(),
            tags_updated: self.tags.to_update.len(),
            tags_deleted: self.tags.to_delete.len(),
            tombstones: self.deleted_items.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub items_added: usize,
    pub items_updated: usize,
    pub items_deleted: usize,
    pub tags_added: usize,
    pub tags_updated: usize,
    pub tags_deleted: usize,
    pub tombstones: usize,
}

pub struct CloudMerger;

impl CloudMerger {
    #[must_use]
    pub fn merge(local: &VaultBackup, cloud: &VaultBackup) -> CloudMergeResult {
        merge(local, cloud)
    }
}

/// Computes the mutations that bring `local` in line with the merged state of both snapshots.
///
/// Pure and total: the output depends only on the contents of the two
/// snapshots, never on the order of their collections.
#[must_use]
pub fn merge(local: &VaultBackup, cloud: &VaultBackup) -> CloudMergeResult {
    let items = merge_entities::<Item>(local, cloud);
    let tags = merge_entities::<Tag>(local, cloud);

    let revived: HashSet<&str> = items
        .to_add
        .iter()
        .map(Entity::id)
        .chain(tags.to_add.iter().map(Entity::id))
        .collect();
    let deleted_items = merge_tombstones(local.deleted_items(), cloud.deleted_items(), &revived);

    CloudMergeResult {
        items,
        tags,
        deleted_items,
    }
}

fn merge_entities<E: Entity>(local: &VaultBackup, cloud: &VaultBackup) -> EntityChanges<E> {
    let local_by_id = index_entities(E::collection(local));
    let cloud_by_id = index_entities(E::collection(cloud));
    let local_deleted = index_tombstones(local.deleted_items(), &E::KIND);
    let cloud_deleted = index_tombstones(cloud.deleted_items(), &E::KIND);

    let mut changes = EntityChanges::default();

    for (id, cloud_entity) in &cloud_by_id {
        if local_by_id.contains_key(id) {
            continue;
        }
        let stays_deleted = local_deleted
            .get(id)
            .is_some_and(|deleted_at| *deleted_at >= cloud_entity.updated_at());
        if !stays_deleted {
            changes.to_add.push((*cloud_entity).clone());
        }
    }

    for (id, &local_entity) in &local_by_id {
        let newer_cloud = cloud_by_id
            .get(id)
            .copied()
            .filter(|cloud_entity| cloud_entity.updated_at() > local_entity.updated_at());
        let latest = newer_cloud.unwrap_or(local_entity);
        match cloud_deleted.get(id) {
            Some(&deleted_at) if deleted_at > latest.updated_at() => {
                changes.to_delete.push(latest.clone().trashed(deleted_at));
            }
            _ => {
                if let Some(cloud_entity) = newer_cloud {
                    changes.to_update.push(cloud_entity.clone());
                }
            }
        }
    }

    changes.sort();
    changes
}

/// Union of both ledgers without revived ids, newest first, one entry per id.
///
/// Deduplication is by id alone while merge decisions are per kind. If an item
/// and a tag share an id (malformed: ids are unique within a vault), only the
/// newest of their tombstones survives and the older kind's decision may flip
/// on the next pass.
fn merge_tombstones(
    local: &[DeletedItem],
    cloud: &[DeletedItem],
    revived: &HashSet<&str>,
) -> Vec<DeletedItem> {
    let mut merged: Vec<DeletedItem> = local
        .iter()
        .chain(cloud)
        .filter(|tombstone| !revived.contains(tombstone.id.as_str()))
        .cloned()
        .collect();
    merged.sort_by(|a, b| {
        b.deleted_at
            .cmp(&a.deleted_at)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
    });
    let mut seen = HashSet::with_capacity(merged.len());
    merged.retain(|tombstone| seen.insert(tombstone.id.clone()));
    merged
}

/// Ids are unique by invariant; if a payload repeats one, the newest copy wins
/// and equal timestamps fall back to the entity ordering, so input order never matters.
fn index_entities<E: Entity>(entities: &[E]) -> HashMap<&str, &E> {
    let mut index: HashMap<&str, &E> = HashMap::with_capacity(entities.len());
    for entity in entities {
        index
            .entry(entity.id())
            .and_modify(|current| {
                if (entity.updated_at(), entity) > (current.updated_at(), *current) {
                    *current = entity;
                }
            })
            .or_insert(entity);
    }
    index
}

fn index_tombstones<'a>(
    tombstones: &'a [DeletedItem],
    kind: &DeletedItemKind,
) -> HashMap<&'a str, i64> {
    let mut index: HashMap<&str, i64> = HashMap::new();
    for tombstone in tombstones.iter().filter(|tombstone| &tombstone.kind == kind) {
        index
            .entry(tombstone.id.as_str())
            .and_modify(|deleted_at| *deleted_at = (*deleted_at).max(tombstone.deleted_at))
            .or_insert(tombstone.deleted_at);
    }
    index
}

impl VaultBackup {
    /// The snapshot a store holds after applying `result` to `self`.
    ///
    /// Collections come back sorted by id and the tombstone ledger is
    /// swapped for the merged one.
    #[must_use]
    pub fn apply(&self, result: &CloudMergeResult) -> Self {
        let mut next = self.clone();
        next.items = Some(result.items.apply_to(self.items()));
        next.tags = Some(result.tags.apply_to(self.tags()));
        next.deleted_items = Some(result.deleted_items.clone());
        next
    }
}
