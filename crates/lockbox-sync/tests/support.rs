#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lockbox_core::{DeletedItem, EntityChanges, Item, ItemContent, Tag, VaultBackup};
use lockbox_sync::{
    BackupCipher, CipherError, CloudAccount, CloudBackupStore, LocalVaultStore, MemoryCloudStore,
    MemoryVaultStore, SealedBackup, StoreError, SyncCoordinator, SyncSettings, TransportError,
};
use tokio::sync::Barrier;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

pub const VAULT_ID: &str = "vault-1";
pub const VAULT_KEY: &str = "vault-key";

pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("lockbox_sync=debug"))
            .with_test_writer()
            .try_init();
    });
}

pub fn device_id() -> Uuid {
    Uuid::from_u128(0x0190_d7a4_6a1e_7c3b_9c1a_1f2e_3d4c_5b6a)
}

pub fn other_device_id() -> Uuid {
    Uuid::from_u128(0x0190_d7a4_6a1e_7c3b_9c1a_aaaa_bbbb_cccc)
}

pub fn account() -> CloudAccount {
    CloudAccount::WebDav {
        url: "https://dav.example.com/vaults".to_string(),
        username: Some("alice".to_string()),
    }
}

pub fn settings() -> SyncSettings {
    SyncSettings::new(device_id()).with_cloud(account())
}

pub fn login(id: &str, updated_at: i64) -> Item {
    Item::new(
        id,
        VAULT_ID,
        updated_at,
        ItemContent::Login {
            name: format!("login {id}"),
            username: Some("alice".to_string()),
            password: Some("hunter2".to_string()),
            uris: vec!["https://example.com".to_string()],
            notes: None,
        },
    )
}

pub fn tag(id: &str, updated_at: i64) -> Tag {
    Tag::new(id, VAULT_ID, format!("tag {id}"), updated_at)
}

/// Stand-in for the vault envelope: the key travels in front of a JSON body.
pub struct JsonCipher {
    key: String,
}

impl JsonCipher {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

impl BackupCipher for JsonCipher {
    fn open(&self, sealed: &SealedBackup) -> Result<VaultBackup, CipherError> {
        let prefix = format!("{}\n", self.key);
        let body = sealed
            .payload
            .strip_prefix(prefix.as_bytes())
            .ok_or(CipherError::KeyMismatch)?;
        serde_json::from_slice(body).map_err(|err| CipherError::Malformed {
            message: err.to_string(),
        })
    }

    fn seal(&self, backup: &VaultBackup) -> Result<SealedBackup, CipherError> {
        let mut payload = format!("{}\n", self.key).into_bytes();
        let body = serde_json::to_vec(backup).map_err(|err| CipherError::Malformed {
            message: err.to_string(),
        })?;
        payload.extend(body);
        Ok(SealedBackup::for_backup(backup, payload))
    }
}

/// Seals `backup` with the test key as if another device had uploaded it.
pub fn sealed(backup: &VaultBackup) -> SealedBackup {
    JsonCipher::new(VAULT_KEY)
        .seal(backup)
        .expect("seal backup")
}

pub fn open(sealed: &SealedBackup) -> VaultBackup {
    JsonCipher::new(VAULT_KEY).open(sealed).expect("open backup")
}

/// Cloud store whose calls can be switched to fail.
#[derive(Default)]
pub struct FlakyCloudStore {
    pub inner: MemoryCloudStore,
    pub fail_fetch: AtomicBool,
    pub fail_upload: AtomicBool,
}

#[async_trait]
impl CloudBackupStore for FlakyCloudStore {
    async fn fetch(
        &self,
        account: &CloudAccount,
        vault_id: &str,
    ) -> Result<Option<SealedBackup>, TransportError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(TransportError::Request {
                message: "connection reset".to_string(),
            });
        }
        self.inner.fetch(account, vault_id).await
    }

    async fn upload(
        &self,
        account: &CloudAccount,
        backup: SealedBackup,
    ) -> Result<(), TransportError> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(TransportError::Unauthorized);
        }
        self.inner.upload(account, backup).await
    }
}

/// Local store that records how many `apply_items` calls overlap.
pub struct TrackingVaultStore {
    pub inner: MemoryVaultStore,
    active: AtomicUsize,
    max_active: AtomicUsize,
    delay: Duration,
    barrier: Option<Arc<Barrier>>,
}

impl TrackingVaultStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryVaultStore::new(),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            delay,
            barrier: None,
        }
    }

    /// Every `apply_items` call waits until `parties` calls are in flight.
    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalVaultStore for TrackingVaultStore {
    async fn snapshot(&self, vault_id: &str) -> Result<VaultBackup, StoreError> {
        self.inner.snapshot(vault_id).await
    }

    async fn apply_items(
        &self,
        vault_id: &str,
        changes: &EntityChanges<Item>,
    ) -> Result<(), StoreError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        tokio::time::sleep(self.delay).await;
        let result = self.inner.apply_items(vault_id, changes).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn apply_tags(&self, vault_id: &str, changes: &EntityChanges<Tag>)
        -> Result<(), StoreError> {
        self.inner.apply_tags(vault_id, changes).await
    }

    async fn replace_deleted_items(
        &self,
        vault_id: &str,
        deleted_items: &[DeletedItem],
    ) -> Result<(), StoreError> {
        self.inner.replace_deleted_items(vault_id, deleted_items).await
    }
}

pub struct Harness {
    pub local: Arc<MemoryVaultStore>,
    pub cloud: Arc<FlakyCloudStore>,
    pub coordinator: SyncCoordinator,
}

impl Harness {
    pub async fn new(local: VaultBackup) -> Self {
        Self::with_settings(local, settings(), VAULT_KEY).await
    }

    pub async fn with_settings(local: VaultBackup, settings: SyncSettings, key: &str) -> Self {
        init_tracing();
        let local_store = Arc::new(MemoryVaultStore::new());
        local_store.insert(local).await;
        let cloud = Arc::new(FlakyCloudStore::default());
        let coordinator = SyncCoordinator::new(
            settings,
            local_store.clone(),
            cloud.clone(),
            Arc::new(JsonCipher::new(key)),
        );
        Self {
            local: local_store,
            cloud,
            coordinator,
        }
    }

    pub async fn seed_cloud(&self, backup: &VaultBackup) {
        self.cloud.inner.put(sealed(backup)).await;
    }

    pub async fn local_state(&self) -> VaultBackup {
        self.local.get(VAULT_ID).await.expect("local vault")
    }

    pub async fn cloud_state(&self) -> VaultBackup {
        let sealed = self.cloud.inner.get(VAULT_ID).await.expect("cloud backup");
        open(&sealed)
    }
}
