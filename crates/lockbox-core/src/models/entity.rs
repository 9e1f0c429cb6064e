use super::{DeletedItemKind, VaultBackup};

/// Capability shared by every live vault entity the merge engine reconciles.
///
/// The merge only reads identity and timestamps; content is cloned as is.
/// `Ord` is a total tie-break between copies of one id with equal `updated_at`.
pub trait Entity: Clone + Ord {
    /// Tombstone kind that records deletions of this entity type.
    const KIND: DeletedItemKind;

    fn id(&self) -> &str;

    fn vault_id(&self) -> &str;

    /// Last modification, unix milliseconds.
    fn updated_at(&self) -> i64;

    fn is_deleted(&self) -> bool;

    /// Copy of this entity moved to trash at `deleted_at`.
    ///
    /// `updated_at` advances to the deletion time so the trashed copy is
    /// never older than the tombstone that produced it.
    #[must_use]
    fn trashed(self, deleted_at: i64) -> Self;

    /// The collection of this entity type inside a snapshot.
    fn collection(backup: &VaultBackup) -> &[Self];
}
