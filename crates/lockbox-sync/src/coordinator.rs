use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use lockbox_core::{
    is_supported_schema, merge, MergeSummary, VaultBackup, BACKUP_SCHEMA_VERSION,
    MIN_SUPPORTED_SCHEMA_VERSION,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::backup::{BackupCipher, SealedBackup};
use crate::error::SyncError;
use crate::settings::{CloudAccount, SyncSettings};
use crate::store::{CloudBackupStore, LocalVaultStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub vault_id: String,
    pub summary: MergeSummary,
    /// False when the cloud already held the merged state.
    pub uploaded: bool,
    pub synced_at: i64,
}

/// Runs sync passes for vaults, at most one at a time per vault.
pub struct SyncCoordinator {
    settings: SyncSettings,
    local: Arc<dyn LocalVaultStore>,
    cloud: Arc<dyn CloudBackupStore>,
    cipher: Arc<dyn BackupCipher>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SyncCoordinator {
    pub fn new(
        settings: SyncSettings,
        local: Arc<dyn LocalVaultStore>,
        cloud: Arc<dyn CloudBackupStore>,
        cipher: Arc<dyn BackupCipher>,
    ) -> Self {
        Self {
            settings,
            local,
            cloud,
            cipher,
            locks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Reconciles the local vault with its cloud backup and uploads the result.
    ///
    /// Concurrent calls for the same vault queue behind each other. Failures
    /// before the merge leave local storage untouched.
    pub async fn sync(&self, vault_id: &str) -> Result<SyncReport, SyncError> {
        let lock = self.vault_lock(vault_id).await;
        let _guard = lock.lock().await;

        info!(
            event = "sync_started",
            vault_id,
            device_id = %self.settings.device_id
        );
        let result = self.run(vault_id).await;
        match &result {
            Ok(report) => info!(
                event = "sync_finished",
                vault_id,
                uploaded = report.uploaded,
                tombstones = report.summary.tombstones
            ),
            Err(err) => warn!(
                event = "sync_aborted",
                vault_id,
                code = err.as_code(),
                local_untouched = err.local_untouched(),
                error = %err
            ),
        }
        result
    }

    async fn vault_lock(&self, vault_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(vault_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn run(&self, vault_id: &str) -> Result<SyncReport, SyncError> {
        let account = self.settings.cloud.as_ref().ok_or(SyncError::AccountMissing)?;
        let cloud_backup = self.fetch_cloud(account, vault_id).await?;

        let local = self.local.snapshot(vault_id).await?;
        let cloud_state = cloud_backup
            .clone()
            .unwrap_or_else(|| VaultBackup::empty(vault_id));
        let result = merge(&local, &cloud_state);
        let summary = result.summary();

        self.local.apply_items(vault_id, &result.items).await?;
        self.local.apply_tags(vault_id, &result.tags).await?;
        self.local
            .replace_deleted_items(vault_id, &result.deleted_items)
            .await?;
        info!(
            event = "sync_merge_applied",
            vault_id,
            items_added = summary.items_added,
            items_updated = summary.items_updated,
            items_deleted = summary.items_deleted,
            tags_added = summary.tags_added,
            tags_updated = summary.tags_updated,
            tags_deleted = summary.tags_deleted
        );

        let merged = self.local.snapshot(vault_id).await?;
        let uploaded = match &cloud_backup {
            Some(cloud) if cloud_is_current(cloud, &merged) => {
                info!(event = "sync_upload_skipped", vault_id);
                false
            }
            _ => {
                let now = Utc::now().timestamp_millis();
                let sealed = self
                    .cipher
                    .seal(&merged.stamped(self.settings.device_id, now))
                    .map_err(SyncError::Seal)?;
                self.cloud
                    .upload(account, sealed)
                    .await
                    .map_err(SyncError::Upload)?;
                true
            }
        };

        Ok(SyncReport {
            vault_id: vault_id.to_string(),
            summary,
            uploaded,
            synced_at: Utc::now().timestamp_millis(),
        })
    }

    /// Fetches and opens the cloud backup, checking the clear header first.
    async fn fetch_cloud(
        &self,
        account: &CloudAccount,
        vault_id: &str,
    ) -> Result<Option<VaultBackup>, SyncError> {
        let Some(sealed) = self.cloud.fetch(account, vault_id).await? else {
            info!(event = "sync_cloud_empty", vault_id, provider = account.provider());
            return Ok(None);
        };
        self.check_header(&sealed)?;

        let backup = self.cipher.open(&sealed)?;
        if backup.vault_id != vault_id {
            return Err(SyncError::VaultMismatch {
                expected: vault_id.to_string(),
                found: backup.vault_id,
            });
        }
        Ok(Some(backup))
    }

    fn check_header(&self, sealed: &SealedBackup) -> Result<(), SyncError> {
        if !is_supported_schema(sealed.schema_version) {
            return Err(SyncError::UnsupportedSchema {
                found: sealed.schema_version,
                min: MIN_SUPPORTED_SCHEMA_VERSION,
                max: BACKUP_SCHEMA_VERSION,
            });
        }
        if let Some(origin) = sealed.origin_device_id {
            if origin != self.settings.device_id && !self.settings.multi_device_sync {
                return Err(SyncError::MultiDeviceNotEntitled { origin });
            }
        }
        Ok(())
    }
}

/// True when uploading `merged` would not change what the cloud holds.
fn cloud_is_current(cloud: &VaultBackup, merged: &VaultBackup) -> bool {
    if cloud.schema_version != BACKUP_SCHEMA_VERSION {
        return false;
    }
    let cloud_ledger: HashSet<_> = cloud.deleted_items().iter().collect();
    let merged_ledger: HashSet<_> = merged.deleted_items().iter().collect();
    cloud_ledger == merged_ledger && merge(cloud, merged).is_empty()
}
