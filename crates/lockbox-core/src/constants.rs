/// Backup schema written by this build.
pub const BACKUP_SCHEMA_VERSION: u32 = 4;

/// Oldest backup schema this build can still read and merge.
pub const MIN_SUPPORTED_SCHEMA_VERSION: u32 = 3;

#[must_use]
pub const fn is_supported_schema(version: u32) -> bool {
    version >= MIN_SUPPORTED_SCHEMA_VERSION && version <= BACKUP_SCHEMA_VERSION
}
