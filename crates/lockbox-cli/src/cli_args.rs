use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "lockbox")]
#[command(about = "Offline tools for lockbox vault snapshots")]
pub struct Cli {
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Show what merging a cloud snapshot would change locally")]
    Merge(MergeArgs),
    #[command(about = "Merge a cloud snapshot into a local one and write the result")]
    Apply(ApplyArgs),
}

#[derive(Args)]
pub struct SnapshotArgs {
    #[arg(long, help = "Decrypted local snapshot (JSON)")]
    pub local: PathBuf,
    #[arg(long, help = "Decrypted cloud snapshot (JSON)")]
    pub cloud: PathBuf,
}

#[derive(Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub snapshots: SnapshotArgs,
    #[arg(long, help = "Print the full merge result as JSON")]
    pub json: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub snapshots: SnapshotArgs,
    #[arg(long)]
    pub out: PathBuf,
    #[arg(long, env = "LOCKBOX_DEVICE_ID", help = "Device recorded as the snapshot origin")]
    pub device_id: Option<Uuid>,
}
