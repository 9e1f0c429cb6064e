use async_trait::async_trait;
use lockbox_core::{DeletedItem, EntityChanges, Item, Tag, VaultBackup};

use crate::backup::SealedBackup;
use crate::error::{StoreError, TransportError};
use crate::settings::CloudAccount;

/// Local persistent vault storage as seen by sync.
///
/// Each write applies atomically for its entity kind.
#[async_trait]
pub trait LocalVaultStore: Send + Sync {
    /// Full snapshot including trashed entities and the tombstone ledger.
    async fn snapshot(&self, vault_id: &str) -> Result<VaultBackup, StoreError>;

    async fn apply_items(
        &self,
        vault_id: &str,
        changes: &EntityChanges<Item>,
    ) -> Result<(), StoreError>;

    async fn apply_tags(&self, vault_id: &str, changes: &EntityChanges<Tag>)
        -> Result<(), StoreError>;

    /// Clears the tombstone ledger and stores `deleted_items` in its place.
    async fn replace_deleted_items(
        &self,
        vault_id: &str,
        deleted_items: &[DeletedItem],
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CloudBackupStore: Send + Sync {
    /// `None` when nothing has been uploaded for the vault yet.
    async fn fetch(
        &self,
        account: &CloudAccount,
        vault_id: &str,
    ) -> Result<Option<SealedBackup>, TransportError>;

    async fn upload(
        &self,
        account: &CloudAccount,
        backup: SealedBackup,
    ) -> Result<(), TransportError>;
}
