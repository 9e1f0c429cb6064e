use uuid::Uuid;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("device id is not configured (set device_id or LOCKBOX_DEVICE_ID)")]
    DeviceIdMissing,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("vault not found: {0}")]
    VaultNotFound(String),
    #[error("storage failure: {message}")]
    Internal { message: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("cloud storage rejected credentials")]
    Unauthorized,
    #[error("cloud request failed: {message}")]
    Request { message: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("backup key does not match this vault")]
    KeyMismatch,
    #[error("malformed backup payload: {message}")]
    Malformed { message: String },
}

/// Reasons a sync pass stops.
///
/// `Storage`, `Seal` and `Upload` may leave the merge applied locally; every
/// other variant is raised before the first local write.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("no cloud account configured")]
    AccountMissing,
    #[error("unsupported backup schema {found} (supported {min}..={max})")]
    UnsupportedSchema { found: u32, min: u32, max: u32 },
    #[error("backup written by device {origin}; multi-device sync is not enabled")]
    MultiDeviceNotEntitled { origin: Uuid },
    #[error("backup decryption failed: {0}")]
    Decryption(#[from] CipherError),
    #[error("backup belongs to vault {found}, expected {expected}")]
    VaultMismatch { expected: String, found: String },
    #[error("cloud transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("local storage failed: {0}")]
    Storage(#[from] StoreError),
    #[error("sealing merged backup failed: {0}")]
    Seal(CipherError),
    #[error("merged backup upload failed: {0}")]
    Upload(TransportError),
}

impl SyncError {
    #[must_use]
    pub const fn as_code(&self) -> &'static str {
        match self {
            Self::AccountMissing => "account_missing",
            Self::UnsupportedSchema { .. } => "unsupported_schema",
            Self::MultiDeviceNotEntitled { .. } => "multi_device_not_entitled",
            Self::Decryption(_) => "decryption_failed",
            Self::VaultMismatch { .. } => "vault_mismatch",
            Self::Transport(_) => "transport_failed",
            Self::Storage(_) => "storage_failed",
            Self::Seal(_) => "seal_failed",
            Self::Upload(_) => "upload_failed",
        }
    }

    /// Whether local storage is guaranteed untouched by the failed pass.
    #[must_use]
    pub const fn local_untouched(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::Seal(_) | Self::Upload(_))
    }
}
