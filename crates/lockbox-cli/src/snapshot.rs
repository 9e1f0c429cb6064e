use std::fs;
use std::path::Path;

use anyhow::Context;
use lockbox_core::{
    is_supported_schema, VaultBackup, BACKUP_SCHEMA_VERSION, MIN_SUPPORTED_SCHEMA_VERSION,
};

pub(crate) fn read_snapshot(path: &Path) -> anyhow::Result<VaultBackup> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let backup: VaultBackup = serde_json::from_str(&contents)
        .with_context(|| format!("parse snapshot {}", path.display()))?;
    if !is_supported_schema(backup.schema_version) {
        anyhow::bail!(
            "unsupported schema version {} in {} (supported {}..={})",
            backup.schema_version,
            path.display(),
            MIN_SUPPORTED_SCHEMA_VERSION,
            BACKUP_SCHEMA_VERSION
        );
    }
    Ok(backup)
}

/// Loads both snapshots and checks they describe the same vault.
pub(crate) fn read_pair(local: &Path, cloud: &Path) -> anyhow::Result<(VaultBackup, VaultBackup)> {
    let local = read_snapshot(local)?;
    let cloud = read_snapshot(cloud)?;
    if local.vault_id != cloud.vault_id {
        anyhow::bail!(
            "snapshots belong to different vaults: local {}, cloud {}",
            local.vault_id,
            cloud.vault_id
        );
    }
    Ok((local, cloud))
}

pub(crate) fn write_snapshot(path: &Path, backup: &VaultBackup) -> anyhow::Result<()> {
    let mut contents = serde_json::to_string_pretty(backup)?;
    contents.push('\n');
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
