use std::fmt::Write;

use lockbox_core::{CloudMergeResult, Entity, EntityChanges, MergeSummary};

pub(crate) fn render_result(result: &CloudMergeResult) -> String {
    let mut out = String::new();
    render_changes(&mut out, "items", &result.items);
    render_changes(&mut out, "tags", &result.tags);
    let _ = writeln!(out, "tombstones: {}", result.deleted_items.len());
    for tombstone in &result.deleted_items {
        let _ = writeln!(
            out,
            "  {:<24} {:<6} {}",
            tombstone.id,
            tombstone.kind.as_str(),
            tombstone.deleted_at
        );
    }
    out
}

fn render_changes<E: Entity>(out: &mut String, label: &str, changes: &EntityChanges<E>) {
    let _ = writeln!(
        out,
        "{label}: +{} ~{} -{}",
        changes.to_add.len(),
        changes.to_update.len(),
        changes.to_delete.len()
    );
    for (action, list) in [
        ("add", &changes.to_add),
        ("update", &changes.to_update),
        ("delete", &changes.to_delete),
    ] {
        for entity in list {
            let _ = writeln!(out, "  {action:<6} {}", entity.id());
        }
    }
}

pub(crate) fn summary_line(summary: &MergeSummary) -> String {
    format!(
        "items +{} ~{} -{}, tags +{} ~{} -{}, tombstones {}",
        summary.items_added,
        summary.items_updated,
        summary.items_deleted,
        summary.tags_added,
        summary.tags_updated,
        summary.tags_deleted,
        summary.tombstones
    )
}
