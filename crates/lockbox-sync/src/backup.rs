use chrono::Utc;
use lockbox_core::VaultBackup;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CipherError;

/// Encrypted backup as stored in the cloud.
///
/// The header stays in clear so schema and origin checks run before decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedBackup {
    pub schema_version: u32,
    pub vault_id: String,
    #[serde(default)]
    pub origin_device_id: Option<Uuid>,
    pub uploaded_at: i64,
    pub payload: Vec<u8>,
}

impl SealedBackup {
    /// Builds the clear header for `backup` around an already encrypted payload.
    #[must_use]
    pub fn for_backup(backup: &VaultBackup, payload: Vec<u8>) -> Self {
        Self {
            schema_version: backup.schema_version,
            vault_id: backup.vault_id.clone(),
            origin_device_id: backup.origin_device_id,
            uploaded_at: Utc::now().timestamp_millis(),
            payload,
        }
    }
}

/// Envelope encryption of backups with the local vault keys.
pub trait BackupCipher: Send + Sync {
    fn open(&self, sealed: &SealedBackup) -> Result<VaultBackup, CipherError>;
    fn seal(&self, backup: &VaultBackup) -> Result<SealedBackup, CipherError>;
}
