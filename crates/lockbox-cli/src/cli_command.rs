use chrono::Utc;
use lockbox_core::CloudMerger;
use lockbox_sync::SyncSettings;

use crate::cli_args::{ApplyArgs, Command, MergeArgs};
use crate::format::{render_result, summary_line};
use crate::snapshot::{read_pair, write_snapshot};

pub(crate) fn handle_command(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Merge(args) => handle_merge(args),
        Command::Apply(args) => handle_apply(args),
    }
}

fn handle_merge(args: MergeArgs) -> anyhow::Result<()> {
    let (local, cloud) = read_pair(&args.snapshots.local, &args.snapshots.cloud)?;
    let result = CloudMerger::merge(&local, &cloud);
    tracing::info!(
        event = "snapshots_merged",
        vault_id = %local.vault_id,
        changes = result.items.len() + result.tags.len()
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_result(&result));
    }
    Ok(())
}

fn handle_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let (local, cloud) = read_pair(&args.snapshots.local, &args.snapshots.cloud)?;
    let device_id = match args.device_id {
        Some(device_id) => device_id,
        None => SyncSettings::from_env()?.device_id,
    };
    let result = CloudMerger::merge(&local, &cloud);
    let merged = local
        .apply(&result)
        .stamped(device_id, Utc::now().timestamp_millis());
    write_snapshot(&args.out, &merged)?;
    tracing::info!(
        event = "snapshot_applied",
        vault_id = %merged.vault_id,
        device_id = %device_id,
        out = %args.out.display()
    );
    println!("{} -> {}", summary_line(&result.summary()), args.out.display());
    Ok(())
}
