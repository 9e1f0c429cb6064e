use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::SettingsError;

mod env_config;

pub const DEFAULT_CONFIG_PATH: &str = "lockbox.yaml";

/// Cloud account the vault backup lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum CloudAccount {
    GoogleDrive {
        account: String,
    },
    #[serde(rename = "webdav")]
    WebDav {
        url: String,
        #[serde(default)]
        username: Option<String>,
    },
}

impl CloudAccount {
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        match self {
            Self::GoogleDrive { .. } => "google_drive",
            Self::WebDav { .. } => "webdav",
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::GoogleDrive { account } => {
                if account.trim().is_empty() {
                    return Err("google drive account must not be empty".to_string());
                }
            }
            Self::WebDav { url, .. } => {
                let url = url.trim();
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(format!("webdav url must include http:// or https://: {url}"));
                }
            }
        }
        Ok(())
    }
}

/// On-disk shape of the sync configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub device_id: Option<Uuid>,
    #[serde(default)]
    pub multi_device_sync: bool,
    #[serde(default)]
    pub cloud: Option<CloudAccount>,
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub device_id: Uuid,
    /// Plan entitlement: accept backups written by other devices.
    pub multi_device_sync: bool,
    pub cloud: Option<CloudAccount>,
}

impl SyncSettings {
    #[must_use]
    pub fn new(device_id: Uuid) -> Self {
        Self {
            device_id,
            multi_device_sync: false,
            cloud: None,
        }
    }

    #[must_use]
    pub fn with_cloud(mut self, account: CloudAccount) -> Self {
        self.cloud = Some(account);
        self
    }

    #[must_use]
    pub fn with_multi_device_sync(mut self, enabled: bool) -> Self {
        self.multi_device_sync = enabled;
        self
    }

    pub fn from_env() -> Result<Self, SettingsError> {
        let config_path =
            env::var("LOCKBOX_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = env_config::load_config(&config_path);
        env_config::apply_env_overrides(&mut config);
        Self::from_config(config)
    }

    /// The device id must be stable across runs: backups stamped by one id are
    /// rejected under another unless multi-device sync is enabled.
    pub fn from_config(config: SyncConfig) -> Result<Self, SettingsError> {
        let Some(device_id) = config.device_id else {
            warn!(event = "config_missing", field = "device_id");
            return Err(SettingsError::DeviceIdMissing);
        };
        let cloud = match config.cloud {
            Some(account) => match account.validate() {
                Ok(()) => Some(account),
                Err(err) => {
                    warn!(event = "config_invalid", field = "cloud", error = %err);
                    None
                }
            },
            None => None,
        };
        Ok(Self {
            device_id,
            multi_device_sync: config.multi_device_sync,
            cloud,
        })
    }
}
