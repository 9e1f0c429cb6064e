//! In-process stores for tests and offline tooling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lockbox_core::{DeletedItem, EntityChanges, Item, Tag, VaultBackup};
use tokio::sync::RwLock;

use crate::backup::SealedBackup;
use crate::error::{StoreError, TransportError};
use crate::settings::CloudAccount;
use crate::store::{CloudBackupStore, LocalVaultStore};

#[derive(Default)]
pub struct MemoryVaultStore {
    vaults: RwLock<HashMap<String, VaultBackup>>,
}

impl MemoryVaultStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, backup: VaultBackup) {
        self.vaults
            .write()
            .await
            .insert(backup.vault_id.clone(), backup);
    }

    pub async fn get(&self, vault_id: &str) -> Option<VaultBackup> {
        self.vaults.read().await.get(vault_id).cloned()
    }

    async fn update<F>(&self, vault_id: &str, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut VaultBackup) + Send,
    {
        let mut vaults = self.vaults.write().await;
        let backup = vaults
            .get_mut(vault_id)
            .ok_or_else(|| StoreError::VaultNotFound(vault_id.to_string()))?;
        apply(backup);
        Ok(())
    }
}

#[async_trait]
impl LocalVaultStore for MemoryVaultStore {
    async fn snapshot(&self, vault_id: &str) -> Result<VaultBackup, StoreError> {
        self.get(vault_id)
            .await
            .ok_or_else(|| StoreError::VaultNotFound(vault_id.to_string()))
    }

    async fn apply_items(
        &self,
        vault_id: &str,
        changes: &EntityChanges<Item>,
    ) -> Result<(), StoreError> {
        self.update(vault_id, |backup| {
            backup.items = Some(changes.apply_to(backup.items()));
        })
        .await
    }

    async fn apply_tags(&self, vault_id: &str, changes: &EntityChanges<Tag>)
        -> Result<(), StoreError> {
        self.update(vault_id, |backup| {
            backup.tags = Some(changes.apply_to(backup.tags()));
        })
        .await
    }

    async fn replace_deleted_items(
        &self,
        vault_id: &str,
        deleted_items: &[DeletedItem],
    ) -> Result<(), StoreError> {
        self.update(vault_id, |backup| {
            backup.deleted_items = Some(deleted_items.to_vec());
        })
        .await
    }
}

/// Cloud storage keyed by vault id. Accounts are not distinguished.
#[derive(Default)]
pub struct MemoryCloudStore {
    backups: RwLock<HashMap<String, SealedBackup>>,
    uploads: AtomicUsize,
}

impl MemoryCloudStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a backup without counting it as an upload.
    pub async fn put(&self, backup: SealedBackup) {
        self.backups
            .write()
            .await
            .insert(backup.vault_id.clone(), backup);
    }

    pub async fn get(&self, vault_id: &str) -> Option<SealedBackup> {
        self.backups.read().await.get(vault_id).cloned()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudBackupStore for MemoryCloudStore {
    async fn fetch(
        &self,
        _account: &CloudAccount,
        vault_id: &str,
    ) -> Result<Option<SealedBackup>, TransportError> {
        Ok(self.get(vault_id).await)
    }

    async fn upload(
        &self,
        _account: &CloudAccount,
        backup: SealedBackup,
    ) -> Result<(), TransportError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.put(backup).await;
        Ok(())
    }
}
