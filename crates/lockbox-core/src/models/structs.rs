use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DeletedItemKind, Entity};
use crate::constants::BACKUP_SCHEMA_VERSION;

/// Decrypted item payload. Never inspected by the merge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemContent {
    Login {
        name: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        uris: Vec<String>,
        #[serde(default)]
        notes: Option<String>,
    },
    SecureNote {
        name: String,
        #[serde(default)]
        text: Option<String>,
    },
    PaymentCard {
        name: String,
        #[serde(default)]
        cardholder: Option<String>,
        #[serde(default)]
        number: Option<String>,
        #[serde(default)]
        expiration: Option<String>,
        #[serde(default)]
        security_code: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
}

impl ItemContent {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Login { name, .. }
            | Self::SecureNote { name, .. }
            | Self::PaymentCard { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub vault_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    /// Trash flag. Content-level only; tombstones decide physical removal.
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub deleted_at: Option<i64>,
    pub content: ItemContent,
}

impl Item {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        vault_id: impl Into<String>,
        updated_at: i64,
        content: ItemContent,
    ) -> Self {
        Self {
            id: id.into(),
            vault_id: vault_id.into(),
            created_at: updated_at,
            updated_at,
            deleted: false,
            deleted_at: None,
            content,
        }
    }
}

impl Entity for Item {
    const KIND: DeletedItemKind = DeletedItemKind::Item;

    fn id(&self) -> &str {
        &self.id
    }

    fn vault_id(&self) -> &str {
        &self.vault_id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn trashed(mut self, deleted_at: i64) -> Self {
        self.deleted = true;
        self.deleted_at = Some(deleted_at);
        self.updated_at = self.updated_at.max(deleted_at);
        self
    }

    fn collection(backup: &VaultBackup) -> &[Self] {
        backup.items()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub vault_id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub position: u32,
    pub updated_at: i64,
    #[serde(default)]
    pub deleted_at: Option<i64>,
}

impl Tag {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        vault_id: impl Into<String>,
        name: impl Into<String>,
        updated_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            vault_id: vault_id.into(),
            name: name.into(),
            color: None,
            position: 0,
            updated_at,
            deleted_at: None,
        }
    }
}

impl Entity for Tag {
    const KIND: DeletedItemKind = DeletedItemKind::Tag;

    fn id(&self) -> &str {
        &self.id
    }

    fn vault_id(&self) -> &str {
        &self.vault_id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn trashed(mut self, deleted_at: i64) -> Self {
        self.deleted_at = Some(deleted_at);
        self.updated_at = self.updated_at.max(deleted_at);
        self
    }

    fn collection(backup: &VaultBackup) -> &[Self] {
        backup.tags()
    }
}

/// Tombstone: the only record of an entity once it is gone from the live collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DeletedItemKind,
    pub deleted_at: i64,
}

impl DeletedItem {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: DeletedItemKind, deleted_at: i64) -> Self {
        Self {
            id: id.into(),
            kind,
            deleted_at,
        }
    }

    #[must_use]
    pub fn item(id: impl Into<String>, deleted_at: i64) -> Self {
        Self::new(id, DeletedItemKind::Item, deleted_at)
    }

    #[must_use]
    pub fn tag(id: impl Into<String>, deleted_at: i64) -> Self {
        Self::new(id, DeletedItemKind::Tag, deleted_at)
    }
}

/// Point-in-time state of one vault, local or as decrypted from the cloud.
///
/// A `None` collection means "not part of this payload" and reads as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultBackup {
    pub schema_version: u32,
    pub vault_id: String,
    #[serde(default)]
    pub origin_device_id: Option<Uuid>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub items: Option<Vec<Item>>,
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
    #[serde(default)]
    pub deleted_items: Option<Vec<DeletedItem>>,
}

impl VaultBackup {
    #[must_use]
    pub fn empty(vault_id: impl Into<String>) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            schema_version: BACKUP_SCHEMA_VERSION,
            vault_id: vault_id.into(),
            origin_device_id: None,
            created_at: now,
            updated_at: now,
            items: None,
            tags: None,
            deleted_items: None,
        }
    }

    #[must_use]
    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = Some(items);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn with_deleted_items(mut self, deleted_items: Vec<DeletedItem>) -> Self {
        self.deleted_items = Some(deleted_items);
        self
    }

    /// Marks this snapshot as written by `device_id` at `at` with the current schema.
    #[must_use]
    pub fn stamped(mut self, device_id: Uuid, at: i64) -> Self {
        self.schema_version = BACKUP_SCHEMA_VERSION;
        self.origin_device_id = Some(device_id);
        self.updated_at = at;
        self
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        self.items.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        self.tags.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn deleted_items(&self) -> &[DeletedItem] {
        self.deleted_items.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty() && self.tags().is_empty() && self.deleted_items().is_empty()
    }
}
