use std::env;
use std::fs;
use std::path::Path;

use tracing::warn;
use uuid::Uuid;

use super::{CloudAccount, SyncConfig};

pub(super) fn load_config(path: &str) -> SyncConfig {
    if !Path::new(path).exists() {
        return SyncConfig::default();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(event = "config_read_failed", path, error = %err);
            return SyncConfig::default();
        }
    };
    match serde_yaml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            warn!(event = "config_parse_failed", path, error = %err);
            SyncConfig::default()
        }
    }
}

pub(super) fn apply_env_overrides(config: &mut SyncConfig) {
    if let Ok(value) = env::var("LOCKBOX_DEVICE_ID") {
        match Uuid::parse_str(value.trim()) {
            Ok(device_id) => config.device_id = Some(device_id),
            Err(_) => warn!(event = "config_invalid", field = "LOCKBOX_DEVICE_ID", value = %value),
        }
    }
    if let Ok(value) = env::var("LOCKBOX_MULTI_DEVICE_SYNC") {
        if let Some(enabled) = parse_bool(&value) {
            config.multi_device_sync = enabled;
        } else {
            warn!(
                event = "config_invalid",
                field = "LOCKBOX_MULTI_DEVICE_SYNC",
                value = %value
            );
        }
    }
    apply_cloud_env_overrides(config);
}

fn apply_cloud_env_overrides(config: &mut SyncConfig) {
    let provider = env::var("LOCKBOX_CLOUD_PROVIDER")
        .ok()
        .map(|value| normalize_enum(&value));
    let gdrive_account = non_empty_env("LOCKBOX_GDRIVE_ACCOUNT");
    let webdav_url = non_empty_env("LOCKBOX_WEBDAV_URL");
    let webdav_username = non_empty_env("LOCKBOX_WEBDAV_USERNAME");

    match provider.as_deref() {
        None => {}
        Some("none") => {
            config.cloud = None;
            return;
        }
        Some("google_drive" | "gdrive") => {
            if !matches!(config.cloud, Some(CloudAccount::GoogleDrive { .. })) {
                match gdrive_account.clone() {
                    Some(account) => config.cloud = Some(CloudAccount::GoogleDrive { account }),
                    None => warn!(event = "config_missing", field = "LOCKBOX_GDRIVE_ACCOUNT"),
                }
            }
        }
        Some("webdav") => {
            if !matches!(config.cloud, Some(CloudAccount::WebDav { .. })) {
                match webdav_url.clone() {
                    Some(url) => {
                        config.cloud = Some(CloudAccount::WebDav {
                            url,
                            username: None,
                        })
                    }
                    None => warn!(event = "config_missing", field = "LOCKBOX_WEBDAV_URL"),
                }
            }
        }
        Some(other) => {
            warn!(event = "config_invalid", field = "LOCKBOX_CLOUD_PROVIDER", value = %other);
        }
    }

    match config.cloud.as_mut() {
        Some(CloudAccount::GoogleDrive { account }) => {
            if let Some(value) = gdrive_account {
                *account = value;
            }
        }
        Some(CloudAccount::WebDav { url, username }) => {
            if let Some(value) = webdav_url {
                *url = value;
            }
            if webdav_username.is_some() {
                *username = webdav_username;
            }
        }
        None => {}
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn normalize_enum(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace('-', "_")
}
