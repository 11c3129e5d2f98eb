use std::fs::File;
use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use affilink_store::{RejectReason, apply_updates, auto_fill, plan_auto_fill, read_updates};

use crate::CliError;

use super::Context;

pub(crate) fn run_autofill(ctx: &Context, dry_run: bool) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;

    if dry_run {
        let plan = plan_auto_fill(store.table(), store.rules());
        for (id, slug) in &plan.assignments {
            log::info!(
                "  {:<12} {}",
                id,
                slug.if_supports_color(Stdout, |t| t.cyan())
            );
        }
        log_skipped(&plan.skipped);
        crate::log_blank();
        log::info!(
            "Would assign {} slug(s). {}",
            plan.assignments.len(),
            "(dry run, nothing written)".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    let outcome = auto_fill(&mut store)?;
    log_skipped(&outcome.skipped);
    log::info!(
        "{} {} slug(s)",
        "Assigned".if_supports_color(Stdout, |t| t.green()),
        outcome.updated.len()
    );
    Ok(())
}

fn log_skipped(skipped: &[String]) {
    if !skipped.is_empty() {
        log::warn!(
            "Skipped {} product(s) whose name yields no slug: {}",
            skipped.len(),
            skipped.join(", ")
        );
    }
}

pub(crate) fn run_apply(ctx: &Context, updates_path: &Path) -> Result<(), CliError> {
    let file = File::open(updates_path).map_err(|e| {
        CliError::input(format!("Cannot open {}: {}", updates_path.display(), e))
    })?;
    let updates = read_updates(file)
        .map_err(|e| CliError::input(format!("{}: {}", updates_path.display(), e)))?;
    if updates.is_empty() {
        log::info!("No updates in {}", updates_path.display());
        return Ok(());
    }

    let mut store = ctx.open_store()?;
    let outcome = apply_updates(&mut store, updates)?;

    for rejection in &outcome.rejected {
        let reason = match &rejection.reason {
            RejectReason::UnknownId => "unknown id".to_string(),
            RejectReason::RepeatedId => "id already updated earlier in the file".to_string(),
            RejectReason::Invalid(reason) => reason.to_string(),
        };
        log::warn!(
            "{} → '{}' rejected: {}",
            rejection.update.id,
            rejection.update.slug,
            reason
        );
    }
    log::info!(
        "{} {} update(s), rejected {}",
        "Applied".if_supports_color(Stdout, |t| t.green()),
        outcome.applied.len(),
        outcome.rejected.len()
    );
    Ok(())
}
