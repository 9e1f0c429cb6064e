#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod backup;
pub mod coordinator;
pub mod error;
pub mod memory;
pub mod settings;
pub mod store;

pub use crate::backup::{BackupCipher, SealedBackup};
pub use crate::coordinator::{SyncCoordinator, SyncReport};
pub use crate::error::{CipherError, SettingsError, StoreError, SyncError, TransportError};
pub use crate::memory::{MemoryCloudStore, MemoryVaultStore};
pub use crate::settings::{CloudAccount, SyncSettings};
pub use crate::store::{CloudBackupStore, LocalVaultStore};
