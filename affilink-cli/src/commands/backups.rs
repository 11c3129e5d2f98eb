use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use affilink_store::SnapshotId;

use crate::CliError;

use super::Context;

pub(crate) fn run_backups_list(ctx: &Context) -> Result<(), CliError> {
    let backups = ctx.backups();
    let snapshots = backups.list_snapshots()?;

    log::info!(
        "{}",
        "Snapshots".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "  Directory: {} (keeping {})",
        backups.dir().display(),
        backups.retention()
    );
    crate::log_blank();

    if snapshots.is_empty() {
        log::info!("  No snapshots yet.");
        return Ok(());
    }
    for (i, snapshot) in snapshots.iter().enumerate() {
        let marker = if i == 0 { "latest" } else { "" };
        log::info!(
            "  {}  {}  {}",
            snapshot.id.if_supports_color(Stdout, |t| t.cyan()),
            snapshot.created_at().format("%Y-%m-%d %H:%M:%S UTC"),
            marker.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}

pub(crate) fn run_backups_restore(ctx: &Context, id: &str) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;
    let id: SnapshotId = if id == "latest" {
        store
            .backups()
            .list_snapshots()?
            .first()
            .map(|s| s.id)
            .ok_or_else(|| CliError::other("No snapshots to restore"))?
    } else {
        id.parse()?
    };

    store.restore(&id)?;
    log::info!(
        "{} {} record(s) from snapshot {}",
        "Restored".if_supports_color(Stdout, |t| t.green()),
        store.table().len(),
        id
    );
    log::info!("The replaced state was saved as a new snapshot.");
    Ok(())
}
